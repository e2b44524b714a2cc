use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

pub mod category;
pub mod food;
pub mod session;

pub use category::{Category, CategoryId, CategoryScope};
pub use food::{Food, FoodCard, FoodId, FoodSource, NewFood};
pub use session::{SessionId, SessionState, SwipeRecord};

// ============================================================================
// Swipe vocabulary
// ============================================================================

/// A user's decision on a presented item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    /// Reject
    Left,
    /// Accept
    Right,
    /// Strong accept
    Super,
}

impl SwipeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
            SwipeDirection::Super => "super",
        }
    }

    /// Whether this swipe counts towards the liked side of a taste profile
    pub fn is_positive(&self) -> bool {
        matches!(self, SwipeDirection::Right | SwipeDirection::Super)
    }
}

impl Display for SwipeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SwipeDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(SwipeDirection::Left),
            "right" => Ok(SwipeDirection::Right),
            "super" => Ok(SwipeDirection::Super),
            other => Err(AppError::InvalidInput(format!(
                "Invalid swipe action: {}",
                other
            ))),
        }
    }
}

/// What kind of item a swipe targets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Category,
    Food,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Category => "category",
            ItemKind::Food => "food",
        }
    }
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" => Ok(ItemKind::Category),
            "food" => Ok(ItemKind::Food),
            other => Err(AppError::InvalidInput(format!("Invalid item type: {}", other))),
        }
    }
}

// ============================================================================
// Recommendation output
// ============================================================================

/// The item presented to the user next
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    Category(Category),
    Food(FoodCard),
}

impl Recommendation {
    pub fn kind(&self) -> ItemKind {
        match self {
            Recommendation::Category(_) => ItemKind::Category,
            Recommendation::Food(_) => ItemKind::Food,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Recommendation::Category(category) => category.id,
            Recommendation::Food(food) => food.id,
        }
    }
}

/// Wire shape of a recommendation returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub id: i64,
    pub name: String,
    /// Always empty for categories
    pub ingredients: Vec<String>,
    #[serde(rename = "type")]
    pub kind: ItemKind,
}

impl From<Recommendation> for RecommendationResponse {
    fn from(recommendation: Recommendation) -> Self {
        match recommendation {
            Recommendation::Category(category) => Self {
                id: category.id,
                name: category.name,
                ingredients: Vec::new(),
                kind: ItemKind::Category,
            },
            Recommendation::Food(food) => Self {
                id: food.id,
                name: food.name,
                ingredients: food.ingredients,
                kind: ItemKind::Food,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_str() {
        assert_eq!("left".parse::<SwipeDirection>().unwrap(), SwipeDirection::Left);
        assert_eq!("right".parse::<SwipeDirection>().unwrap(), SwipeDirection::Right);
        assert_eq!("super".parse::<SwipeDirection>().unwrap(), SwipeDirection::Super);
    }

    #[test]
    fn test_direction_rejects_unknown() {
        let err = "up".parse::<SwipeDirection>().unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_direction_positive() {
        assert!(!SwipeDirection::Left.is_positive());
        assert!(SwipeDirection::Right.is_positive());
        assert!(SwipeDirection::Super.is_positive());
    }

    #[test]
    fn test_item_kind_from_str() {
        assert_eq!("food".parse::<ItemKind>().unwrap(), ItemKind::Food);
        assert_eq!("category".parse::<ItemKind>().unwrap(), ItemKind::Category);
        assert!("dessert".parse::<ItemKind>().is_err());
    }

    #[test]
    fn test_category_response_has_no_ingredients() {
        let recommendation = Recommendation::Category(Category {
            id: 4,
            name: "Desserts".to_string(),
            parent_id: None,
        });
        let response = RecommendationResponse::from(recommendation);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "category");
        assert_eq!(json["ingredients"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_food_response_serialization() {
        let recommendation = Recommendation::Food(FoodCard {
            id: 12,
            name: "Tiramisu".to_string(),
            ingredients: vec!["mascarpone".to_string(), "espresso".to_string()],
        });
        assert_eq!(recommendation.kind(), ItemKind::Food);
        assert_eq!(recommendation.id(), 12);

        let json = serde_json::to_value(RecommendationResponse::from(recommendation)).unwrap();
        assert_eq!(json["type"], "food");
        assert_eq!(json["name"], "Tiramisu");
        assert_eq!(json["ingredients"][1], "espresso");
    }
}
