//! Query configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QueryConfig {
    /// Limit used by symbol search when the caller passes none. Default: 50.
    pub default_search_limit: Option<usize>,
    /// Hard cap on symbol search results. Default: 1000.
    pub max_search_limit: Option<usize>,
}

impl QueryConfig {
    pub fn effective_default_search_limit(&self) -> usize {
        self.default_search_limit.unwrap_or(50)
    }

    pub fn effective_max_search_limit(&self) -> usize {
        self.max_search_limit.unwrap_or(1000)
    }

    /// Resolve a caller-supplied limit against the default and the cap.
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or_else(|| self.effective_default_search_limit())
            .min(self.effective_max_search_limit())
    }
}
