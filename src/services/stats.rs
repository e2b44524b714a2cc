use serde::Serialize;

use crate::{
    db::SwipeStore,
    error::AppResult,
    models::{Category, FoodCard, SwipeDirection},
    services::insights::{NarrativeGenerator, SuperPick, TasteProfile},
};

/// End-of-session rollup
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionStats {
    /// Left and right swipes plus the concluding super swipe
    pub total_swipes: usize,
    pub left_swipes: usize,
    pub right_swipes: usize,
    /// `None` when the narrative generator failed
    pub insights: Option<String>,
    #[serde(rename = "superlike")]
    pub super_pick: Option<SuperPick>,
}

struct Tally {
    profile: TasteProfile,
    left: usize,
    right: usize,
}

fn tally(
    session_id: &str,
    category_swipes: Vec<(Category, SwipeDirection)>,
    food_swipes: Vec<(FoodCard, SwipeDirection)>,
) -> Tally {
    // Food superlikes take precedence over category superlikes
    let super_pick = food_swipes
        .iter()
        .find(|(_, d)| *d == SwipeDirection::Super)
        .map(|(food, _)| SuperPick::from(food))
        .or_else(|| {
            category_swipes
                .iter()
                .find(|(_, d)| *d == SwipeDirection::Super)
                .map(|(category, _)| SuperPick::from(category))
        });

    // Super swipes count towards neither side
    let directions = category_swipes
        .iter()
        .map(|(_, d)| *d)
        .chain(food_swipes.iter().map(|(_, d)| *d));
    let (mut left, mut right) = (0, 0);
    for direction in directions {
        match direction {
            SwipeDirection::Left => left += 1,
            SwipeDirection::Right => right += 1,
            SwipeDirection::Super => {}
        }
    }

    // Split both ledgers into liked and disliked
    let mut profile = TasteProfile {
        session_id: session_id.to_string(),
        super_pick,
        ..TasteProfile::default()
    };
    for (category, direction) in category_swipes {
        if direction.is_positive() {
            profile.liked_categories.push(category);
        } else {
            profile.disliked_categories.push(category);
        }
    }
    for (food, direction) in food_swipes {
        if direction.is_positive() {
            profile.liked_foods.push(food);
        } else {
            profile.disliked_foods.push(food);
        }
    }

    Tally {
        profile,
        left,
        right,
    }
}

/// Counts swipes across both ledgers and asks the narrative generator for an insight
///
/// Store failures propagate; generator failures are logged and reported as a
/// missing insight.
pub async fn collect(
    store: &dyn SwipeStore,
    narrator: &dyn NarrativeGenerator,
    session_id: &str,
) -> AppResult<SessionStats> {
    let category_swipes = store.category_swipes(session_id).await?;
    let food_swipes = store.food_swipes(session_id).await?;
    let Tally {
        profile,
        left,
        right,
    } = tally(session_id, category_swipes, food_swipes);

    // A failing generator must not fail the stats
    let insights = match narrator.summarize(&profile).await {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(
                session_id = %session_id,
                generator = narrator.name(),
                error = %e,
                "Taste insight unavailable"
            );
            None
        }
    };

    tracing::info!(
        session_id = %session_id,
        left_swipes = left,
        right_swipes = right,
        "Session stats collected"
    );

    Ok(SessionStats {
        total_swipes: 1 + left + right,
        left_swipes: left,
        right_swipes: right,
        insights,
        super_pick: profile.super_pick,
    })
}
