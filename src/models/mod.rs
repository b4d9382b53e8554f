//! Core data models for the sick-leave engine.
//!
//! This module contains all the domain models used throughout the engine.

mod derived;
mod report;
mod sick_leave;
mod tracking;

pub use derived::{BandSlice, CalculationStep, DerivedFigures, Payer, ValuationStatus};
pub use report::{
    DashboardSummary, EntityTotal, LeaveSummary, PendingStage, ReimbursementReport,
    ReportLineItem, ReportQuery, SickLeaveQuery,
};
pub use sick_leave::{
    IllnessType, NewExtension, NewSickLeave, SickLeaveRecord, SickLeaveStatus, inclusive_days,
};
pub use tracking::{TrackingAction, TrackingEntry};
