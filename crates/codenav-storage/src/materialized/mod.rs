//! Derived tables rebuilt from the ingested graph.

pub mod occurrences;
