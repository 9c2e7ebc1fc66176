//! Index descriptions used by the [`Database`](crate::core::Database) trait.

use serde::{Deserialize, Serialize};

/// Direction (or kind) of an indexed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexDirection {
    /// Ascending key.
    Ascending,
    /// Descending key.
    Descending,
    /// Full-text key, backing the `search` operator.
    Text,
}

/// An index on a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Index name.
    pub name: String,

    /// Indexed keys in priority order.
    pub keys: Vec<(String, IndexDirection)>,

    /// Whether indexed values must be unique.
    #[serde(default)]
    pub unique: bool,
}

impl IndexSpec {
    /// Creates an index without keys.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: Vec::new(),
            unique: false,
        }
    }

    /// Appends a key.
    pub fn with_key(mut self, field: impl Into<String>, direction: IndexDirection) -> Self {
        self.keys.push((field.into(), direction));
        self
    }

    /// Marks the index as unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_builder() {
        let index = IndexSpec::new("querySearch")
            .with_key("title", IndexDirection::Text)
            .with_key("description", IndexDirection::Text);

        assert_eq!(index.keys.len(), 2);
        assert!(!index.unique);
        assert!(IndexSpec::new("byId").unique().unique);
    }
}
