//! Sick-leave lifecycle: the transition table and the engine that applies it.
//!
//! All mutations of a [`SickLeaveRecord`](crate::models::SickLeaveRecord)
//! go through [`SickLeaveEngine`], which writes a tracking entry with every
//! change and takes the acting user as an explicit parameter.

mod engine;
mod outcome;
mod transitions;

pub use engine::SickLeaveEngine;
pub use outcome::{AmountMismatchWarning, CollectionOutcome, RegisteredSickLeave, SickLeaveDetail};
pub use transitions::{LifecycleAction, allowed_actions, apply_transition, next_status};
