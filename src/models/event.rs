use serde::Deserialize;

/// Values needed to persist a new event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub cid: i64,
    /// 0 when added by an anonymous visitor
    pub owner_uid: i64,
    pub subject: String,
    pub description: String,
}

/// POST /events form body
#[derive(Debug, Deserialize)]
pub struct EventCreateForm {
    pub cid: i64,
    pub subject: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One requested deletion target, as it appeared in the query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    /// Decoded value, shown back to the user
    pub raw: String,
    /// `None` when the value is not an integer id
    pub id: Option<i64>,
}

/// Result of one requested deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed(String),
    NotRemoved(String),
}

/// Everything the delete handler reports back, in request order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeleteReport {
    pub outcomes: Vec<DeleteOutcome>,
}

impl DeleteReport {
    pub fn removed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DeleteOutcome::Removed(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
