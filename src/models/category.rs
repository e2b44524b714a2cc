use serde::{Deserialize, Serialize};

pub type CategoryId = i64;

/// A node of the category forest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// `None` for roots
    pub parent_id: Option<CategoryId>,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Which part of the tree an unvisited-category lookup covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryScope {
    /// Every category in the forest, at any depth
    Any,
    /// Direct children of one category
    ChildrenOf(CategoryId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_root() {
        let root = Category {
            id: 1,
            name: "Mains".to_string(),
            parent_id: None,
        };
        let child = Category {
            id: 2,
            name: "Curries".to_string(),
            parent_id: Some(1),
        };
        assert!(root.is_root());
        assert!(!child.is_root());
    }
}
