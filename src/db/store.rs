//! Storage abstraction for the swipe engine
//!
//! The recommendation engine only talks to storage through these traits, so the
//! Postgres backend and the in-memory backend are interchangeable. Every "pick one
//! of the unvisited X" lookup returns the whole candidate set from a single query;
//! the caller picks among them with an injected [`Picker`](crate::services::Picker).
use crate::{
    error::AppResult,
    models::{
        Category, CategoryId, CategoryScope, FoodCard, FoodId, FoodSource, NewFood,
        SessionState, SwipeDirection,
    },
};

/// Read/write access needed by a running session
#[async_trait::async_trait]
pub trait SwipeStore: Send + Sync {
    // ── Sessions ──────────────────────────────────────────────────────────

    /// Registers a session id. Creating an existing session is a no-op.
    async fn create_session(&self, session_id: &str) -> AppResult<()>;

    async fn session_exists(&self, session_id: &str) -> AppResult<bool>;

    /// Removes a session together with its ledgers and memory row
    async fn delete_session(&self, session_id: &str) -> AppResult<()>;

    // ── Category tree ─────────────────────────────────────────────────────

    /// Direct children of `parent_id`, or the roots when `None`
    async fn categories_by_parent(&self, parent_id: Option<CategoryId>)
        -> AppResult<Vec<Category>>;

    /// Parent of a category. Unknown ids and roots both yield `None`.
    async fn category_parent(&self, id: CategoryId) -> AppResult<Option<CategoryId>>;

    /// Categories in `scope` that never appear in the session's category ledger
    async fn unvisited_categories(
        &self,
        session_id: &str,
        scope: CategoryScope,
    ) -> AppResult<Vec<Category>>;

    // ── Foods ─────────────────────────────────────────────────────────────

    /// Foods of one category that never appear in the session's food ledger
    async fn unvisited_foods_in_category(
        &self,
        session_id: &str,
        category_id: CategoryId,
    ) -> AppResult<Vec<FoodCard>>;

    /// The unvisited food closest to `vector` across the whole catalog
    async fn nearest_unvisited_food(
        &self,
        session_id: &str,
        vector: &[f32],
    ) -> AppResult<Option<FoodCard>>;

    async fn food_embedding(&self, id: FoodId) -> AppResult<Option<Vec<f32>>>;

    // ── Ledgers ───────────────────────────────────────────────────────────

    /// Appends to the category ledger. Returns `false` when the session already
    /// swiped this category and nothing was written.
    async fn append_category_swipe(
        &self,
        session_id: &str,
        category_id: CategoryId,
        direction: SwipeDirection,
    ) -> AppResult<bool>;

    /// Appends to the food ledger. Returns `false` when the session already
    /// swiped this food and nothing was written.
    async fn append_food_swipe(
        &self,
        session_id: &str,
        food_id: FoodId,
        direction: SwipeDirection,
    ) -> AppResult<bool>;

    async fn count_food_swipes(&self, session_id: &str) -> AppResult<i64>;

    /// Swiped categories in ledger order
    async fn category_swipes(&self, session_id: &str)
        -> AppResult<Vec<(Category, SwipeDirection)>>;

    /// Swiped foods in ledger order
    async fn food_swipes(&self, session_id: &str) -> AppResult<Vec<(FoodCard, SwipeDirection)>>;

    // ── Session memory ────────────────────────────────────────────────────

    /// Reads the memory row, inserting a null-initialised one when missing
    async fn load_session_memory(&self, session_id: &str) -> AppResult<SessionState>;

    /// Overwrites the memory row. A missing row is silently left alone.
    async fn save_session_memory(&self, session_id: &str, state: &SessionState)
        -> AppResult<()>;
}

/// Catalog writes used by ingestion
#[async_trait::async_trait]
pub trait CatalogWriter: Send + Sync {
    /// Returns the id of the `(name, parent)` category, creating it if needed
    async fn get_or_create_category(
        &self,
        name: &str,
        parent_id: Option<CategoryId>,
    ) -> AppResult<CategoryId>;

    async fn insert_food(&self, food: &NewFood) -> AppResult<FoodId>;

    /// Foods still waiting for an embedding, ordered by id
    async fn foods_without_embedding(&self) -> AppResult<Vec<FoodSource>>;

    async fn set_food_embedding(&self, id: FoodId, embedding: &[f32]) -> AppResult<()>;
}
