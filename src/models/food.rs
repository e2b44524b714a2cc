use serde::{Deserialize, Serialize};

use super::CategoryId;

pub type FoodId = i64;

/// A catalog entry as stored, embedding included
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Food {
    pub id: FoodId,
    pub name: String,
    pub ingredients: Vec<String>,
    pub category_id: Option<CategoryId>,
    /// Populated asynchronously by the embedding backfill
    pub embedding: Option<Vec<f32>>,
}

impl Food {
    pub fn card(&self) -> FoodCard {
        FoodCard {
            id: self.id,
            name: self.name.clone(),
            ingredients: self.ingredients.clone(),
        }
    }
}

/// The presentable part of a food
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct FoodCard {
    pub id: FoodId,
    pub name: String,
    pub ingredients: Vec<String>,
}

/// A food to be inserted by ingestion
#[derive(Debug, Clone, PartialEq)]
pub struct NewFood {
    pub name: String,
    pub ingredients: Vec<String>,
    pub category_id: Option<CategoryId>,
    pub nutrition: Option<serde_json::Value>,
}

/// Text inputs for computing a food's embedding
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FoodSource {
    pub id: FoodId,
    pub name: String,
    pub ingredients: Vec<String>,
    pub category_name: Option<String>,
}

impl FoodSource {
    /// Text fed to the embedding service
    pub fn embedding_text(&self) -> String {
        let mut text = format!("{}. Ingredients: {}.", self.name, self.ingredients.join(", "));
        if let Some(category) = &self.category_name {
            text.push_str(&format!(" Category: {}.", category));
        }
        text
    }
}
