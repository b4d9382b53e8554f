//! HTTP API for the sick-leave engine.
//!
//! This module exposes the lifecycle operations, the reimbursement report
//! and the dashboard as JSON endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    CancelRequest, CollectionRequest, CreateExtensionRequest, CreateSickLeaveRequest,
    DashboardQuery, DocumentRequest, NoteRequest, TranscriptionRequest,
};
pub use response::{ApiError, ApiErrorResponse, SickLeaveDetailView, TrackingEntryView};
pub use state::{AppState, ServedEngine};
