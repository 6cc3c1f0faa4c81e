//! In-memory query/filter engine over loaded collections.
//!
//! # Responsibility
//! - Match records against field criteria and a free-text search term.
//! - Declare which fields each record type exposes to filtering.
//!
//! # Invariants
//! - Results are an order-preserving subsequence of the input.
//! - Blank criteria match every record.

pub mod fields;
pub mod filter;
