use serde::{Deserialize, Serialize};

/// One headline extracted from an upstream listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    pub link: String,
    /// Publish timestamp or label as given upstream; `None` when it could not be recovered
    pub published: Option<String>,
}

/// Why a strategy contributed nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AttemptFailure {
    /// The strategy ran but found no usable records
    Empty,
    /// Transport or parse failure, with its message
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyAttempt {
    pub strategy: String,
    pub failure: AttemptFailure,
}

/// Result of running the strategy chain for one query.
///
/// A value of this type means the chain was tried; "not yet tried" is the
/// absence of a value (e.g. a cache miss).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedOutcome {
    Found {
        strategy: String,
        records: Vec<Record>,
    },
    Empty {
        attempts: Vec<StrategyAttempt>,
    },
}

impl FeedOutcome {
    /// Records to display; empty for [`FeedOutcome::Empty`]
    pub fn records(&self) -> &[Record] {
        match self {
            FeedOutcome::Found { records, .. } => records,
            FeedOutcome::Empty { .. } => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FeedOutcome::Empty { .. })
    }

    pub fn strategy(&self) -> Option<&str> {
        match self {
            FeedOutcome::Found { strategy, .. } => Some(strategy),
            FeedOutcome::Empty { .. } => None,
        }
    }
}
