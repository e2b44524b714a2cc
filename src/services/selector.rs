use crate::{
    db::SwipeStore,
    error::AppResult,
    models::{CategoryId, FoodCard},
    services::{
        intent,
        picker::{pick_owned, Picker},
    },
};

/// Picks the next unvisited food
///
/// With a meaningful intent vector this is the nearest unvisited food in the
/// whole catalog; the category is ignored. Otherwise it is a random unvisited
/// food of `category_id`. `None` means the chosen branch has nothing left.
pub async fn select_food(
    store: &dyn SwipeStore,
    picker: &dyn Picker,
    session_id: &str,
    category_id: CategoryId,
    intent_vector: Option<&[f32]>,
) -> AppResult<Option<FoodCard>> {
    match intent_vector.filter(|v| intent::is_meaningful(v)) {
        Some(vector) => {
            let food = store.nearest_unvisited_food(session_id, vector).await?;
            tracing::debug!(
                session_id = %session_id,
                food_id = ?food.as_ref().map(|f| f.id),
                "Nearest-neighbour food selection"
            );
            Ok(food)
        }
        None => {
            let candidates = store
                .unvisited_foods_in_category(session_id, category_id)
                .await?;
            tracing::debug!(
                session_id = %session_id,
                category_id,
                candidates = candidates.len(),
                "Random food selection"
            );
            Ok(pick_owned(picker, candidates))
        }
    }
}
