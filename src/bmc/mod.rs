//! Ranking of foreign master candidates
//!
//! This module tracks the remote masters seen by one port
//! ([`foreign_master`]) and ranks them with the dataset comparison algorithm
//! ([`dataset_comparison`]). The cross-port state decision itself belongs to
//! the clock aggregate.

pub mod dataset_comparison;
pub(crate) mod foreign_master;

pub use dataset_comparison::ComparisonDataset;
pub use foreign_master::ForeignMaster;
