//! Category tree walk.
//!
//! The session cursor (`current_category`) drives what is shown next:
//! no cursor means "pick any unvisited category", a cursor with unvisited
//! children means "show one of them", anything else means the walk has reached
//! a leaf and food selection takes over.

use crate::{
    db::SwipeStore,
    error::AppResult,
    models::{Category, CategoryId, CategoryScope, SwipeDirection},
    services::picker::{pick_owned, Picker},
};

/// Outcome of looking at the cursor
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A category to show the user
    Present(Category),
    /// The cursor has no unvisited children; serve foods from it
    Leaf(CategoryId),
    /// No unvisited category is left anywhere
    Exhausted,
}

/// Decides the next category step from the cursor without moving it
pub async fn advance(
    store: &dyn SwipeStore,
    picker: &dyn Picker,
    session_id: &str,
    cursor: Option<CategoryId>,
) -> AppResult<Step> {
    match cursor {
        None => {
            let candidates = store
                .unvisited_categories(session_id, CategoryScope::Any)
                .await?;
            Ok(pick_owned(picker, candidates).map_or(Step::Exhausted, Step::Present))
        }
        Some(current) => {
            let children = store
                .unvisited_categories(session_id, CategoryScope::ChildrenOf(current))
                .await?;
            Ok(pick_owned(picker, children).map_or(Step::Leaf(current), Step::Present))
        }
    }
}

/// Where the cursor goes after the user swipes a category
///
/// - `right` descends to a random child, or stays on the swiped category when
///   it has none.
/// - `left`/`super` move sideways to a random sibling, else up to the parent.
///   A root with no parent moves to another random root, and the cursor is
///   cleared when it was the only root.
pub async fn transition(
    store: &dyn SwipeStore,
    picker: &dyn Picker,
    swiped: CategoryId,
    direction: SwipeDirection,
) -> AppResult<Option<CategoryId>> {
    match direction {
        SwipeDirection::Right => {
            let children = store.categories_by_parent(Some(swiped)).await?;
            Ok(Some(pick_owned(picker, children).map_or(swiped, |c| c.id)))
        }
        SwipeDirection::Left | SwipeDirection::Super => {
            let parent = store.category_parent(swiped).await?;
            let peers: Vec<Category> = store
                .categories_by_parent(parent)
                .await?
                .into_iter()
                .filter(|c| c.id != swiped)
                .collect();

            let peer = pick_owned(picker, peers).map(|c| c.id);
            Ok(peer.or(parent))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use crate::services::picker::{FirstPicker, RandomPicker};

    struct Tree {
        store: InMemoryStore,
        mains: CategoryId,
        curries: CategoryId,
        noodles: CategoryId,
        desserts: CategoryId,
    }

    fn tree() -> Tree {
        let store = InMemoryStore::new();
        let mains = store.add_category("Mains", None);
        let curries = store.add_category("Curries", Some(mains));
        let noodles = store.add_category("Noodles", Some(mains));
        let desserts = store.add_category("Desserts", None);
        Tree {
            store,
            mains,
            curries,
            noodles,
            desserts,
        }
    }

    #[tokio::test]
    async fn test_right_descends_to_a_child() {
        let t = tree();
        for _ in 0..20 {
            let cursor = transition(&t.store, &RandomPicker, t.mains, SwipeDirection::Right)
                .await
                .unwrap();
            assert!(cursor == Some(t.curries) || cursor == Some(t.noodles));
        }
    }

    #[tokio::test]
    async fn test_right_on_leaf_stays() {
        let t = tree();
        let cursor = transition(&t.store, &RandomPicker, t.curries, SwipeDirection::Right)
            .await
            .unwrap();
        assert_eq!(cursor, Some(t.curries));
    }

    #[tokio::test]
    async fn test_left_moves_to_sibling() {
        let t = tree();
        let cursor = transition(&t.store, &RandomPicker, t.curries, SwipeDirection::Left)
            .await
            .unwrap();
        assert_eq!(cursor, Some(t.noodles));
    }

    #[tokio::test]
    async fn test_super_behaves_like_left() {
        let t = tree();
        let cursor = transition(&t.store, &RandomPicker, t.noodles, SwipeDirection::Super)
            .await
            .unwrap();
        assert_eq!(cursor, Some(t.curries));
    }

    #[tokio::test]
    async fn test_left_without_sibling_moves_to_parent() {
        let store = InMemoryStore::new();
        let root = store.add_category("Breakfast", None);
        let only = store.add_category("Pancakes", Some(root));
        let cursor = transition(&store, &RandomPicker, only, SwipeDirection::Left)
            .await
            .unwrap();
        assert_eq!(cursor, Some(root));
    }

    #[tokio::test]
    async fn test_left_on_root_moves_to_other_root() {
        let t = tree();
        let cursor = transition(&t.store, &RandomPicker, t.mains, SwipeDirection::Left)
            .await
            .unwrap();
        assert_eq!(cursor, Some(t.desserts));
    }

    #[tokio::test]
    async fn test_left_on_only_root_clears_cursor() {
        let store = InMemoryStore::new();
        let root = store.add_category("Everything", None);
        let cursor = transition(&store, &RandomPicker, root, SwipeDirection::Left)
            .await
            .unwrap();
        assert_eq!(cursor, None);
    }

    #[tokio::test]
    async fn test_advance_without_cursor_presents_unvisited() {
        let t = tree();
        t.store.create_session("s1").await.unwrap();
        t.store
            .append_category_swipe("s1", t.mains, SwipeDirection::Right)
            .await
            .unwrap();

        let step = advance(&t.store, &FirstPicker, "s1", None).await.unwrap();
        match step {
            Step::Present(category) => assert_eq!(category.id, t.curries),
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_advance_reaches_leaf_when_children_visited() {
        let t = tree();
        for child in [t.curries, t.noodles] {
            t.store
                .append_category_swipe("s1", child, SwipeDirection::Left)
                .await
                .unwrap();
        }
        let step = advance(&t.store, &FirstPicker, "s1", Some(t.mains))
            .await
            .unwrap();
        assert_eq!(step, Step::Leaf(t.mains));
    }

    #[tokio::test]
    async fn test_advance_exhausted() {
        let t = tree();
        for id in [t.mains, t.curries, t.noodles, t.desserts] {
            t.store
                .append_category_swipe("s1", id, SwipeDirection::Left)
                .await
                .unwrap();
        }
        let step = advance(&t.store, &FirstPicker, "s1", None).await.unwrap();
        assert_eq!(step, Step::Exhausted);
    }
}
