use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::{
    db::{CatalogWriter, SwipeStore},
    error::{AppError, AppResult},
    models::{
        Category, CategoryId, CategoryScope, Food, FoodCard, FoodId, FoodSource, ItemKind,
        NewFood, SessionState, SwipeDirection, SwipeRecord,
    },
};

/// Process-local store with the same semantics as the Postgres backend
///
/// Backs the unit and HTTP test suites.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    categories: Vec<Category>,
    foods: Vec<Food>,
    sessions: HashSet<String>,
    ledger: Vec<SwipeRecord>,
    memory: HashMap<String, SessionState>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn swiped(&self, session_id: &str, kind: ItemKind, target_id: i64) -> bool {
        self.ledger
            .iter()
            .any(|r| r.session_id == session_id && r.kind == kind && r.target_id == target_id)
    }

    fn append(
        &mut self,
        session_id: &str,
        kind: ItemKind,
        target_id: i64,
        direction: SwipeDirection,
    ) -> bool {
        if self.swiped(session_id, kind, target_id) {
            return false;
        }
        self.ledger.push(SwipeRecord {
            session_id: session_id.to_string(),
            target_id,
            kind,
            direction,
            swiped_at: Utc::now(),
        });
        true
    }

    fn ledger_for<'a>(
        &'a self,
        session_id: &'a str,
        kind: ItemKind,
    ) -> impl Iterator<Item = &'a SwipeRecord> + 'a {
        self.ledger
            .iter()
            .filter(move |r| r.session_id == session_id && r.kind == kind)
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| AppError::Internal("In-memory store lock poisoned".to_string()))
    }

    /// Adds a category and returns its id
    pub fn add_category(&self, name: &str, parent_id: Option<CategoryId>) -> CategoryId {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = inner.next_id();
        inner.categories.push(Category {
            id,
            name: name.to_string(),
            parent_id,
        });
        id
    }

    /// Adds a food and returns its id
    pub fn add_food(
        &self,
        name: &str,
        ingredients: &[&str],
        category_id: Option<CategoryId>,
        embedding: Option<Vec<f32>>,
    ) -> FoodId {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = inner.next_id();
        inner.foods.push(Food {
            id,
            name: name.to_string(),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            category_id,
            embedding,
        });
        id
    }

    /// Snapshot of a session's memory row, if one exists
    pub fn session_memory(&self, session_id: &str) -> Option<SessionState> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.memory.get(session_id).cloned()
    }

    /// Snapshot of a session's ledger entries in append order
    pub fn ledger(&self, session_id: &str) -> Vec<SwipeRecord> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .ledger
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl SwipeStore for InMemoryStore {
    async fn create_session(&self, session_id: &str) -> AppResult<()> {
        self.lock()?.sessions.insert(session_id.to_string());
        Ok(())
    }

    async fn session_exists(&self, session_id: &str) -> AppResult<bool> {
        Ok(self.lock()?.sessions.contains(session_id))
    }

    async fn delete_session(&self, session_id: &str) -> AppResult<()> {
        let mut inner = self.lock()?;
        inner.sessions.remove(session_id);
        inner.memory.remove(session_id);
        inner.ledger.retain(|r| r.session_id != session_id);
        Ok(())
    }

    async fn categories_by_parent(
        &self,
        parent_id: Option<CategoryId>,
    ) -> AppResult<Vec<Category>> {
        Ok(self
            .lock()?
            .categories
            .iter()
            .filter(|c| c.parent_id == parent_id)
            .cloned()
            .collect())
    }

    async fn category_parent(&self, id: CategoryId) -> AppResult<Option<CategoryId>> {
        Ok(self
            .lock()?
            .categories
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| c.parent_id))
    }

    async fn unvisited_categories(
        &self,
        session_id: &str,
        scope: CategoryScope,
    ) -> AppResult<Vec<Category>> {
        let inner = self.lock()?;
        Ok(inner
            .categories
            .iter()
            .filter(|c| match scope {
                CategoryScope::Any => true,
                CategoryScope::ChildrenOf(parent) => c.parent_id == Some(parent),
            })
            .filter(|c| !inner.swiped(session_id, ItemKind::Category, c.id))
            .cloned()
            .collect())
    }

    async fn unvisited_foods_in_category(
        &self,
        session_id: &str,
        category_id: CategoryId,
    ) -> AppResult<Vec<FoodCard>> {
        let inner = self.lock()?;
        Ok(inner
            .foods
            .iter()
            .filter(|f| f.category_id == Some(category_id))
            .filter(|f| !inner.swiped(session_id, ItemKind::Food, f.id))
            .map(Food::card)
            .collect())
    }

    async fn nearest_unvisited_food(
        &self,
        session_id: &str,
        vector: &[f32],
    ) -> AppResult<Option<FoodCard>> {
        let inner = self.lock()?;
        let nearest = inner
            .foods
            .iter()
            .filter(|f| !inner.swiped(session_id, ItemKind::Food, f.id))
            .map(|f| {
                let distance = f
                    .embedding
                    .as_deref()
                    .map(|e| squared_distance(e, vector))
                    .unwrap_or(f32::INFINITY);
                (distance, f)
            })
            .min_by(|(da, fa), (db, fb)| da.total_cmp(db).then(fa.id.cmp(&fb.id)));

        Ok(nearest.map(|(_, f)| f.card()))
    }

    async fn food_embedding(&self, id: FoodId) -> AppResult<Option<Vec<f32>>> {
        Ok(self
            .lock()?
            .foods
            .iter()
            .find(|f| f.id == id)
            .and_then(|f| f.embedding.clone()))
    }

    async fn append_category_swipe(
        &self,
        session_id: &str,
        category_id: CategoryId,
        direction: SwipeDirection,
    ) -> AppResult<bool> {
        Ok(self
            .lock()?
            .append(session_id, ItemKind::Category, category_id, direction))
    }

    async fn append_food_swipe(
        &self,
        session_id: &str,
        food_id: FoodId,
        direction: SwipeDirection,
    ) -> AppResult<bool> {
        Ok(self
            .lock()?
            .append(session_id, ItemKind::Food, food_id, direction))
    }

    async fn count_food_swipes(&self, session_id: &str) -> AppResult<i64> {
        Ok(self.lock()?.ledger_for(session_id, ItemKind::Food).count() as i64)
    }

    async fn category_swipes(
        &self,
        session_id: &str,
    ) -> AppResult<Vec<(Category, SwipeDirection)>> {
        let inner = self.lock()?;
        Ok(inner
            .ledger_for(session_id, ItemKind::Category)
            .filter_map(|r| {
                inner
                    .categories
                    .iter()
                    .find(|c| c.id == r.target_id)
                    .map(|c| (c.clone(), r.direction))
            })
            .collect())
    }

    async fn food_swipes(&self, session_id: &str) -> AppResult<Vec<(FoodCard, SwipeDirection)>> {
        let inner = self.lock()?;
        Ok(inner
            .ledger_for(session_id, ItemKind::Food)
            .filter_map(|r| {
                inner
                    .foods
                    .iter()
                    .find(|f| f.id == r.target_id)
                    .map(|f| (f.card(), r.direction))
            })
            .collect())
    }

    async fn load_session_memory(&self, session_id: &str) -> AppResult<SessionState> {
        let mut inner = self.lock()?;
        if !inner.sessions.contains(session_id) {
            return Err(AppError::NotFound(format!(
                "Session {} has no memory row",
                session_id
            )));
        }
        Ok(inner
            .memory
            .entry(session_id.to_string())
            .or_default()
            .clone())
    }

    async fn save_session_memory(&self, session_id: &str, state: &SessionState) -> AppResult<()> {
        if let Some(row) = self.lock()?.memory.get_mut(session_id) {
            *row = state.clone();
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CatalogWriter for InMemoryStore {
    async fn get_or_create_category(
        &self,
        name: &str,
        parent_id: Option<CategoryId>,
    ) -> AppResult<CategoryId> {
        let mut inner = self.lock()?;
        if let Some(existing) = inner
            .categories
            .iter()
            .find(|c| c.name == name && c.parent_id == parent_id)
        {
            return Ok(existing.id);
        }
        let id = inner.next_id();
        inner.categories.push(Category {
            id,
            name: name.to_string(),
            parent_id,
        });
        Ok(id)
    }

    async fn insert_food(&self, food: &NewFood) -> AppResult<FoodId> {
        let mut inner = self.lock()?;
        let id = inner.next_id();
        inner.foods.push(Food {
            id,
            name: food.name.clone(),
            ingredients: food.ingredients.clone(),
            category_id: food.category_id,
            embedding: None,
        });
        Ok(id)
    }

    async fn foods_without_embedding(&self) -> AppResult<Vec<FoodSource>> {
        let inner = self.lock()?;
        Ok(inner
            .foods
            .iter()
            .filter(|f| f.embedding.is_none())
            .map(|f| FoodSource {
                id: f.id,
                name: f.name.clone(),
                ingredients: f.ingredients.clone(),
                category_name: f.category_id.and_then(|cid| {
                    inner
                        .categories
                        .iter()
                        .find(|c| c.id == cid)
                        .map(|c| c.name.clone())
                }),
            })
            .collect())
    }

    async fn set_food_embedding(&self, id: FoodId, embedding: &[f32]) -> AppResult<()> {
        let mut inner = self.lock()?;
        match inner.foods.iter_mut().find(|f| f.id == id) {
            Some(food) => {
                food.embedding = Some(embedding.to_vec());
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Food {} not found", id))),
        }
    }
}
