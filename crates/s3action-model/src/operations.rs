//! Semantic action type discriminator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved `SearchAction` query that lists buckets instead of objects.
pub const LIST_BUCKETS_QUERY: &str = "list-buckets";

/// All supported Schema.org action types.
///
/// Each value of the JSON-LD `@type` discriminator maps to exactly one
/// object-store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    /// Upload a local file (or inline content) into the store.
    #[serde(rename = "CreateAction")]
    Create,
    /// Fetch an object from the store into a local file.
    #[serde(rename = "DownloadAction")]
    Download,
    /// Remove an object from the store.
    #[serde(rename = "DeleteAction")]
    Delete,
    /// List objects under a prefix (or list buckets).
    #[serde(rename = "SearchAction")]
    Search,
}

impl ActionType {
    /// Returns the JSON-LD `@type` string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CreateAction",
            Self::Download => "DownloadAction",
            Self::Delete => "DeleteAction",
            Self::Search => "SearchAction",
        }
    }

    /// Parse a JSON-LD `@type` string into an `ActionType`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "CreateAction" => Some(Self::Create),
            "DownloadAction" => Some(Self::Download),
            "DeleteAction" => Some(Self::Delete),
            "SearchAction" => Some(Self::Search),
            _ => None,
        }
    }

    /// Short operation name used in logs.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Create => "upload",
            Self::Download => "download",
            Self::Delete => "delete",
            Self::Search => "list",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_resolve_all_action_types() {
        let types = [
            ("CreateAction", ActionType::Create),
            ("DownloadAction", ActionType::Download),
            ("DeleteAction", ActionType::Delete),
            ("SearchAction", ActionType::Search),
        ];
        for (name, expected) in types {
            assert_eq!(ActionType::from_name(name), Some(expected), "failed for {name}");
            assert_eq!(expected.as_str(), name);
        }
    }

    #[test]
    fn test_should_reject_unknown_action_type() {
        assert_eq!(ActionType::from_name("UpdateAction"), None);
        assert_eq!(ActionType::from_name("createaction"), None);
        assert_eq!(ActionType::from_name(""), None);
    }

    #[test]
    fn test_should_serialize_as_json_ld_type() {
        let json = serde_json::to_string(&ActionType::Download).unwrap();
        assert_eq!(json, "\"DownloadAction\"");
    }
}
