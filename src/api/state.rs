//! Application state for the sick-leave API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::lifecycle::SickLeaveEngine;
use crate::storage::{InMemoryRepository, InMemorySalaryDirectory};

/// The engine served by the HTTP API.
pub type ServedEngine = SickLeaveEngine<InMemoryRepository, InMemorySalaryDirectory>;

/// Shared application state.
///
/// Holds the engine, which owns the repository, the salary directory and
/// the loaded policy configuration.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<ServedEngine>,
}

impl AppState {
    /// Creates a new application state around an engine.
    pub fn new(engine: ServedEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Returns the engine.
    pub fn engine(&self) -> &ServedEngine {
        &self.engine
    }
}
