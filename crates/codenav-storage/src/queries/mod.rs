//! Query modules for each table.

pub mod documents;
pub mod hover;
pub mod index_runs;
pub mod items;
pub mod monikers;
pub mod occurrences;
pub mod packages;
pub mod ranges;
pub mod result_sets;
pub mod stats;
pub mod symbols;
