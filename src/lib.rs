//! Testlens library crate
//!
//! Quality engine for test artifacts: a deterministic conformance checker
//! for single test definitions and a corpus-level optimizer that finds
//! duplicates, conflicts, stale cases and coverage gaps. The language-model
//! collaborator lives behind the `oracle` seam so everything else stays
//! reproducible and testable offline.

pub mod config;
pub mod conformance;
pub mod optimize;
pub mod oracle;
pub mod testcase;
