use crate::models::{Category, Priority};
use serde::{Deserialize, Serialize};

/// Keywords that place a function into one tier/category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub category: Category,
    pub priority: Priority,
    /// Tested in order; matching is a case-insensitive substring test
    pub keywords: Vec<String>,
}

impl KeywordGroup {
    pub fn new(category: Category, priority: Priority, keywords: &[&str]) -> Self {
        Self {
            category,
            priority,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn matches(&self, lowered_name: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| lowered_name.contains(keyword.to_lowercase().as_str()))
    }
}

/// Assigns a priority tier and category to a function name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    /// Evaluated in order, first matching group wins
    groups: Vec<KeywordGroup>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Self::default_groups())
    }
}

impl Classifier {
    pub fn new(groups: Vec<KeywordGroup>) -> Self {
        Self { groups }
    }

    /// Classify a bare function name.
    ///
    /// Group order biases towards protocol: `getParser` is P0 even though it
    /// also contains the utility keyword `get`.
    pub fn classify(&self, name: &str) -> (Priority, Category) {
        let lowered = name.to_lowercase();

        self.groups
            .iter()
            .find(|group| group.matches(&lowered))
            .map(|group| (group.priority, group.category))
            .unwrap_or((Priority::P3, Category::Utility))
    }

    /// Protocol -> business -> network -> utility
    pub fn default_groups() -> Vec<KeywordGroup> {
        vec![
            KeywordGroup::new(
                Category::Protocol,
                Priority::P0,
                &["parse", "decode", "serialize", "deserialize", "encode", "unpack", "pack"],
            ),
            KeywordGroup::new(
                Category::Business,
                Priority::P1,
                &["handle", "process", "execute", "transition", "validate"],
            ),
            KeywordGroup::new(
                Category::Network,
                Priority::P2,
                &["send", "receive", "read", "write", "connect", "accept", "async"],
            ),
            KeywordGroup::new(
                Category::Utility,
                Priority::P3,
                &["to", "from", "convert", "format", "get", "set", "is", "has"],
            ),
        ]
    }
}
