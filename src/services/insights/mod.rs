//! Natural-language taste summaries
//!
//! The engine hands an aggregated [`TasteProfile`] to a [`NarrativeGenerator`] and
//! treats the returned text as opaque. Generators are swappable: the OpenAI one
//! for production, a template one for offline runs, and a Redis-cached wrapper
//! around either.
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{Category, FoodCard, ItemKind},
};

pub mod cached;
pub mod openai;
pub mod template;

pub use cached::CachedNarrator;
pub use openai::OpenAiNarrator;
pub use template::TemplateNarrator;

/// The item a session ended on with a super swipe
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SuperPick {
    pub id: i64,
    pub name: String,
    pub ingredients: Vec<String>,
    #[serde(rename = "type")]
    pub kind: ItemKind,
}

impl From<&FoodCard> for SuperPick {
    fn from(food: &FoodCard) -> Self {
        Self {
            id: food.id,
            name: food.name.clone(),
            ingredients: food.ingredients.clone(),
            kind: ItemKind::Food,
        }
    }
}

impl From<&Category> for SuperPick {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            ingredients: Vec::new(),
            kind: ItemKind::Category,
        }
    }
}

/// Aggregated likes and dislikes of one session, in ledger order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TasteProfile {
    pub session_id: String,
    pub liked_foods: Vec<FoodCard>,
    pub liked_categories: Vec<Category>,
    pub disliked_foods: Vec<FoodCard>,
    pub disliked_categories: Vec<Category>,
    pub super_pick: Option<SuperPick>,
}

impl TasteProfile {
    /// Number of ledger entries the profile was built from
    pub fn swipe_count(&self) -> usize {
        self.liked_foods.len()
            + self.liked_categories.len()
            + self.disliked_foods.len()
            + self.disliked_categories.len()
    }
}

/// Turns a taste profile into a short narrative
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn summarize(&self, profile: &TasteProfile) -> AppResult<String>;

    /// Generator name for logging
    fn name(&self) -> &'static str;

    /// Drops anything retained for an ended session
    async fn forget(&self, _session_id: &str) -> AppResult<()> {
        Ok(())
    }
}

fn describe_foods(foods: &[FoodCard]) -> String {
    foods
        .iter()
        .map(|f| format!("{} ({})", f.name, f.ingredients.join(", ")))
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_categories(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prompt sent to chat-style generators
pub fn build_prompt(profile: &TasteProfile) -> String {
    let super_text = profile
        .super_pick
        .as_ref()
        .map(|pick| format!("{} ({})", pick.name, pick.ingredients.join(", ")))
        .unwrap_or_else(|| "none".to_string());

    format!(
        "User liked the following foods: {}\n\
         User liked the following categories: {}\n\
         User disliked the following foods: {}\n\
         User disliked the following categories: {}\n\
         Final chosen food or category (super swiped): {}\n\
         Infer the user's taste preference and current food mood in 2 short sentences.\n\
         Be friendly, natural and non-repetitive.",
        describe_foods(&profile.liked_foods),
        describe_categories(&profile.liked_categories),
        describe_foods(&profile.disliked_foods),
        describe_categories(&profile.disliked_categories),
        super_text,
    )
}
