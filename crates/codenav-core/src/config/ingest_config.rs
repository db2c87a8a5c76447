//! Ingestion configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IngestConfig {
    /// Run the occurrence derivation pass after commit. Default: true.
    pub derive_occurrences: Option<bool>,
    /// Lines between progress events. Default: 100_000.
    pub progress_every: Option<usize>,
}

impl IngestConfig {
    pub fn effective_derive_occurrences(&self) -> bool {
        self.derive_occurrences.unwrap_or(true)
    }

    pub fn effective_progress_every(&self) -> usize {
        self.progress_every.unwrap_or(100_000).max(1)
    }
}
