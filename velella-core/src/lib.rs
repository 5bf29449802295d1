//! Shared primitives for the velella motif analysis workspace.
//!
//! `velella-core` provides the foundation the domain crates build on:
//!
//! - **Error types**: [`VelellaError`] and [`Result`] for structured error handling
//! - **Log-space probabilities**: [`Log2Prob`] for stable accumulation of tiny masses
//! - **Binned median**: [`binned_median`], an O(n) weighted median over a fixed histogram

pub mod error;
pub mod median;
pub mod prob;

pub use error::{Result, VelellaError};
pub use median::binned_median;
pub use prob::Log2Prob;
