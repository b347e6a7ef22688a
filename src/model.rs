// src/model.rs

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// What version control knows about a single path.
///
/// Every field may be empty: history is best effort and an empty value means
/// "unknown", never "no authors".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    pub authors: BTreeSet<String>,
    /// Time of the oldest commit touching the path
    pub created: Option<DateTime<Utc>>,
    /// Time of the newest commit touching the path
    pub modified: Option<DateTime<Utc>>,
}

impl History {
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty() && self.created.is_none() && self.modified.is_none()
    }

    /// Widens the time range to include a commit made at `time`.
    pub(crate) fn record(&mut self, author: Option<&str>, time: DateTime<Utc>) {
        if let Some(author) = author {
            self.authors.insert(author.to_string());
        }
        self.created = Some(self.created.map_or(time, |t| t.min(time)));
        self.modified = Some(self.modified.map_or(time, |t| t.max(time)));
    }
}

/// Test coverage of one sample program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestStatus {
    /// The language has no usable test configuration.
    NoData,
    /// The language is explicitly excluded from automated testing.
    Untestable { reason: Option<String> },
    Tested,
    NotTested,
}

impl TestStatus {
    pub fn is_tested(&self) -> bool {
        matches!(self, TestStatus::Tested)
    }
}
