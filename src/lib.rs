//! Sick-leave lifecycle and reimbursement engine.
//!
//! This crate registers employee sick-leave records, links extensions into
//! chains, splits each record's days between the employer and the paying
//! insurer (EPS or ARL), values the insurer's share from the employee's
//! salary, and tracks the record through transcription and collection.
//! Read-only projections build the monthly reimbursement report and the
//! operations dashboard.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod report;
pub mod storage;
