//! Batch Publisher
//!
//! Drives the pipeline over a whole corpus: each document flows
//! loader -> normalizer -> validator -> publish call -> outcome record,
//! and outcomes accumulate into a [`BatchReport`] independent of
//! individual failures.
//!
//! [`BatchReport`]: crate::types::BatchReport

pub mod batch;
pub mod check;
pub mod report;

pub use batch::{run_batch, BatchOptions, BatchRunOutput, DocumentAudit};
pub use check::{run_check, CheckOutcome, CheckReport};
