use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One unit of tracked work as returned by the external issue store.
///
/// Records are immutable per fetch cycle; the engine never mutates them
/// locally, it only rebuilds derived structures from fresh fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Typed relationships to other issues, in store order.
    #[serde(default, alias = "dependencies")]
    pub relationships: Vec<Relationship>,
    #[serde(alias = "created")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "updated")]
    pub updated_at: DateTime<Utc>,
}

impl IssueRecord {
    pub fn is_active(&self) -> bool {
        self.status == Status::InProgress
    }
}

/// Issue status. Values the store reports that we don't recognize are
/// preserved verbatim so a newer store doesn't break rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Open,
    InProgress,
    Blocked,
    Deferred,
    Closed,
    Unknown(String),
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        match s.to_lowercase().replace('-', "_").as_str() {
            "open" => Self::Open,
            "in_progress" => Self::InProgress,
            "blocked" => Self::Blocked,
            "deferred" => Self::Deferred,
            "closed" | "done" => Self::Closed,
            _ => Self::Unknown(s),
        }
    }
}

impl From<Status> for String {
    fn from(s: Status) -> Self {
        match s {
            Status::Open => "open".to_string(),
            Status::InProgress => "in_progress".to_string(),
            Status::Blocked => "blocked".to_string(),
            Status::Deferred => "deferred".to_string(),
            Status::Closed => "closed".to_string(),
            Status::Unknown(raw) => raw,
        }
    }
}

impl Status {
    pub fn display_name(&self) -> &str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Blocked => "Blocked",
            Self::Deferred => "Deferred",
            Self::Closed => "Closed",
            Self::Unknown(raw) => raw,
        }
    }

    /// Terminal statuses can't block anything.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Ordering for detail lists (children, blockers, dependents).
    pub fn sort_order(&self) -> u8 {
        match self {
            Self::InProgress => 0,
            Self::Open => 1,
            Self::Blocked => 2,
            Self::Deferred => 3,
            Self::Closed => 4,
            Self::Unknown(_) => 5,
        }
    }

    /// Statuses settable from the status-change menu.
    pub fn all_known() -> impl Iterator<Item = Self> {
        [
            Self::Open,
            Self::InProgress,
            Self::Blocked,
            Self::Deferred,
            Self::Closed,
        ]
        .into_iter()
    }
}

/// Issue priority as reported by the store: a small integer, lower = more
/// urgent. Kept raw rather than enumerated so store-specific scales survive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Priority(pub u8);

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// A typed relationship from one issue to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(alias = "id", alias = "target_id")]
    pub target: String,
    #[serde(rename = "type", default)]
    pub rel_type: RelationType,
}

impl Relationship {
    pub fn new(target: impl Into<String>, rel_type: RelationType) -> Self {
        Self {
            target: target.into(),
            rel_type,
        }
    }
}

/// Relationship type. Unrecognized values are preserved and treated as
/// decorative (non-structural, non-blocking) for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum RelationType {
    /// Declared on the child: target is my parent.
    ParentChild,
    /// Declared on the parent: target is my child. Some stores report the
    /// edge from this side; the builder accepts either and dedupes.
    ParentOf,
    Blocks,
    #[default]
    Related,
    DiscoveredFrom,
    Duplicates,
    Supersedes,
    Unknown(String),
}

impl From<String> for RelationType {
    fn from(s: String) -> Self {
        match s.to_lowercase().replace('_', "-").as_str() {
            "parent-child" | "parent" => Self::ParentChild,
            "parent-of" | "has-child" => Self::ParentOf,
            "blocks" => Self::Blocks,
            "related" => Self::Related,
            "discovered-from" => Self::DiscoveredFrom,
            "duplicates" => Self::Duplicates,
            "supersedes" => Self::Supersedes,
            _ => Self::Unknown(s),
        }
    }
}

impl From<RelationType> for String {
    fn from(r: RelationType) -> Self {
        match r {
            RelationType::ParentChild => "parent-child".to_string(),
            RelationType::ParentOf => "parent-of".to_string(),
            RelationType::Blocks => "blocks".to_string(),
            RelationType::Related => "related".to_string(),
            RelationType::DiscoveredFrom => "discovered-from".to_string(),
            RelationType::Duplicates => "duplicates".to_string(),
            RelationType::Supersedes => "supersedes".to_string(),
            RelationType::Unknown(raw) => raw,
        }
    }
}

impl RelationType {
    pub fn display_name(&self) -> &str {
        match self {
            Self::ParentChild => "parent-child",
            Self::ParentOf => "parent-of",
            Self::Blocks => "blocks",
            Self::Related => "related",
            Self::DiscoveredFrom => "discovered-from",
            Self::Duplicates => "duplicates",
            Self::Supersedes => "supersedes",
            Self::Unknown(raw) => raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip_known() {
        let s: Status = "in_progress".to_string().into();
        assert_eq!(s, Status::InProgress);
        let back: String = s.into();
        assert_eq!(back, "in_progress");
    }

    #[test]
    fn test_status_unknown_preserved_verbatim() {
        let s: Status = "wontfix".to_string().into();
        assert_eq!(s, Status::Unknown("wontfix".to_string()));
        let back: String = s.into();
        assert_eq!(back, "wontfix");
    }

    #[test]
    fn test_status_accepts_hyphenated() {
        let s: Status = "in-progress".to_string().into();
        assert_eq!(s, Status::InProgress);
    }

    #[test]
    fn test_relation_type_unknown_preserved() {
        let r: RelationType = "caused-by".to_string().into();
        assert_eq!(r, RelationType::Unknown("caused-by".to_string()));
    }

    #[test]
    fn test_only_closed_is_terminal() {
        assert!(Status::Closed.is_terminal());
        assert!(!Status::Blocked.is_terminal());
        assert!(!Status::Deferred.is_terminal());
        assert!(!Status::Unknown("triage".into()).is_terminal());
    }
}
