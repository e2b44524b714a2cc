use crate::{
    error::AppResult,
    services::insights::{NarrativeGenerator, TasteProfile},
};

/// Offline summary assembled from the profile itself
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

fn list(names: Vec<&str>) -> String {
    match names.as_slice() {
        [] => String::new(),
        [one] => one.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

#[async_trait::async_trait]
impl NarrativeGenerator for TemplateNarrator {
    async fn summarize(&self, profile: &TasteProfile) -> AppResult<String> {
        let liked: Vec<&str> = profile
            .liked_categories
            .iter()
            .map(|c| c.name.as_str())
            .chain(profile.liked_foods.iter().map(|f| f.name.as_str()))
            .collect();
        let disliked: Vec<&str> = profile
            .disliked_categories
            .iter()
            .map(|c| c.name.as_str())
            .chain(profile.disliked_foods.iter().map(|f| f.name.as_str()))
            .collect();

        let mut text = if liked.is_empty() {
            "You are still exploring and nothing has won you over yet.".to_string()
        } else {
            format!("You are drawn to {}.", list(liked))
        };

        if !disliked.is_empty() {
            text.push_str(&format!(" You steered clear of {}.", list(disliked)));
        }

        if let Some(pick) = &profile.super_pick {
            text.push_str(&format!(" Tonight it is {}.", pick.name));
        }

        Ok(text)
    }

    fn name(&self) -> &'static str {
        "template"
    }
}
