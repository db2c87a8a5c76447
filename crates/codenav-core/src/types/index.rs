//! Index-run identity and metadata.

use serde::{Deserialize, Serialize};

/// Storage id of one ingested dump.
pub type IndexId = i64;

/// Caller-supplied metadata for an ingest. All fields are optional;
/// `created_at` defaults to the database clock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexMeta {
    pub repo: Option<String>,
    pub commit: Option<String>,
    /// Unix seconds.
    pub created_at: Option<i64>,
}

impl IndexMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    pub fn with_created_at(mut self, unix_secs: i64) -> Self {
        self.created_at = Some(unix_secs);
        self
    }
}
