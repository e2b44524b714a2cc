use crate::{
    db::SwipeStore,
    error::AppResult,
    models::{ItemKind, Recommendation, SwipeDirection},
    services::{
        insights::NarrativeGenerator,
        intent,
        memory::SessionMemory,
        picker::Picker,
        selector,
        stats::{self, SessionStats},
        traversal::{self, Step},
    },
};

/// Upper bound on cursor resets within one `next` call
///
/// A reset always lands in root selection, which either presents a category or
/// reports exhaustion, so two rounds suffice. The bound only guards against a
/// store that keeps returning a dangling cursor.
const MAX_SELECTION_ROUNDS: usize = 3;

/// Session recommendation state machine
///
/// Short-lived: build one per request. Session memory is read once per instance
/// and written back whenever the cursor or intent vector changes.
pub struct SwipeBrain<'a> {
    session_id: &'a str,
    store: &'a dyn SwipeStore,
    picker: &'a dyn Picker,
    memory: SessionMemory,
}

impl<'a> SwipeBrain<'a> {
    pub fn new(session_id: &'a str, store: &'a dyn SwipeStore, picker: &'a dyn Picker) -> Self {
        Self {
            session_id,
            store,
            picker,
            memory: SessionMemory::new(session_id),
        }
    }

    /// Returns the next item to show, or `None` once the session is exhausted
    ///
    /// Choosing a category from the root-selection state commits it as the new
    /// cursor. Running out of foods in the current branch clears the cursor and
    /// starts over from root selection.
    pub async fn next(&mut self) -> AppResult<Option<Recommendation>> {
        for _ in 0..MAX_SELECTION_ROUNDS {
            // Load the cursor (cached after the first round)
            let mut state = self.memory.load(self.store).await?;
            let cursor = state.current_category;

            match traversal::advance(self.store, self.picker, self.session_id, cursor).await? {
                Step::Present(category) => {
                    // Only a root selection moves the cursor; children are just shown
                    if cursor.is_none() {
                        state.current_category = Some(category.id);
                        self.memory.commit(self.store, state).await?;
                    }
                    tracing::debug!(
                        session_id = %self.session_id,
                        category_id = category.id,
                        "Presenting category"
                    );
                    return Ok(Some(Recommendation::Category(category)));
                }
                Step::Exhausted => {
                    tracing::info!(session_id = %self.session_id, "Session exhausted");
                    return Ok(None);
                }
                Step::Leaf(category_id) => {
                    // Leaf reached: serve a food, by intent if there is one
                    let food = selector::select_food(
                        self.store,
                        self.picker,
                        self.session_id,
                        category_id,
                        state.intent_vector.as_deref(),
                    )
                    .await?;

                    if let Some(food) = food {
                        tracing::debug!(
                            session_id = %self.session_id,
                            food_id = food.id,
                            "Presenting food"
                        );
                        return Ok(Some(Recommendation::Food(food)));
                    }

                    tracing::debug!(
                        session_id = %self.session_id,
                        category_id,
                        "No foods left in branch, resetting cursor"
                    );
                    // Branch exhausted: clear the cursor and retry from the roots
                    state.current_category = None;
                    self.memory.commit(self.store, state).await?;
                }
            }
        }

        tracing::warn!(
            session_id = %self.session_id,
            rounds = MAX_SELECTION_ROUNDS,
            "Selection did not settle, treating session as exhausted"
        );
        Ok(None)
    }

    /// Records a swipe and moves the session state accordingly
    ///
    /// Category swipes move the cursor; food swipes fold the food's embedding
    /// into the intent vector. A repeated swipe on an already swiped item is
    /// ignored. The ledger append and the memory write are separate operations.
    pub async fn update(
        &mut self,
        item_id: i64,
        direction: SwipeDirection,
        kind: ItemKind,
    ) -> AppResult<()> {
        let mut state = self.memory.load(self.store).await?;

        match kind {
            ItemKind::Category => {
                // Record first; a duplicate leaves the session untouched
                let recorded = self
                    .store
                    .append_category_swipe(self.session_id, item_id, direction)
                    .await?;
                if !recorded {
                    tracing::debug!(session_id = %self.session_id, item_id, "Duplicate category swipe ignored");
                    return Ok(());
                }

                state.current_category =
                    traversal::transition(self.store, self.picker, item_id, direction).await?;
            }
            ItemKind::Food => {
                let recorded = self
                    .store
                    .append_food_swipe(self.session_id, item_id, direction)
                    .await?;
                if !recorded {
                    tracing::debug!(session_id = %self.session_id, item_id, "Duplicate food swipe ignored");
                    return Ok(());
                }

                // Foods without an embedding count towards `n` but carry no signal
                if let Some(embedding) = self.store.food_embedding(item_id).await? {
                    let n = self.store.count_food_swipes(self.session_id).await?;
                    state.intent_vector = Some(intent::fold(
                        state.intent_vector.as_deref(),
                        &embedding,
                        direction,
                        n,
                    )?);
                }
            }
        }

        tracing::info!(
            session_id = %self.session_id,
            item_id,
            kind = %kind,
            direction = %direction,
            cursor = ?state.current_category,
            "Swipe recorded"
        );

        // Persist the moved cursor / folded vector
        self.memory.commit(self.store, state).await
    }

    /// Read-only rollup of the session's ledgers with a narrative insight
    pub async fn get_stats(&self, narrator: &dyn NarrativeGenerator) -> AppResult<SessionStats> {
        stats::collect(self.store, narrator, self.session_id).await
    }
}
