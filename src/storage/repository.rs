//! Persistence port for sick-leave records and their tracking log.
//!
//! The engine only talks to storage through [`SickLeaveRepository`], so the
//! in-memory adapter can be swapped for a database-backed one. Implementations
//! must make each write atomic: a record change and its tracking entry either
//! both commit or neither does.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{SickLeaveRecord, SickLeaveStatus, TrackingEntry};

/// Storage operations needed by the lifecycle engine.
///
/// Failures other than the constraint violations listed below are reported
/// as `EngineError::Storage` and propagated unchanged by the engine.
pub trait SickLeaveRepository: Send + Sync {
    /// Looks up a record by id.
    fn get(&self, id: Uuid) -> EngineResult<Option<SickLeaveRecord>>;

    /// All records of an employee, most recent start date first.
    fn find_by_employee(&self, employee_id: &str) -> EngineResult<Vec<SickLeaveRecord>>;

    /// All records in a status, ordered by start date.
    fn find_by_status(&self, status: SickLeaveStatus) -> EngineResult<Vec<SickLeaveRecord>>;

    /// All records issued between `from` and `to` inclusive, ordered by start date.
    fn find_by_issue_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<SickLeaveRecord>>;

    /// The record whose `previous_sick_leave_id` is `id`, if any.
    fn find_successor(&self, id: Uuid) -> EngineResult<Option<SickLeaveRecord>>;

    /// The tracking log of a record, oldest first.
    fn tracking_for(&self, id: Uuid) -> EngineResult<Vec<TrackingEntry>>;

    /// Inserts a new record together with its first tracking entry.
    ///
    /// Fails with `ChainBranch` if the record's predecessor already has a
    /// direct successor.
    fn insert_with_tracking(
        &self,
        record: SickLeaveRecord,
        entry: TrackingEntry,
    ) -> EngineResult<()>;

    /// Replaces a record and appends a tracking entry, returning the stored
    /// record with its revision bumped.
    ///
    /// Fails with `ConcurrentModification` unless the stored record is still
    /// at `expected_revision`, and with `RecordNotFound` if it does not exist.
    fn update_with_tracking(
        &self,
        record: SickLeaveRecord,
        expected_revision: u64,
        entry: TrackingEntry,
    ) -> EngineResult<SickLeaveRecord>;

    /// Appends a tracking entry to an existing record.
    fn append_tracking(&self, entry: TrackingEntry) -> EngineResult<()>;

    /// Allocates the next record sequence number for a year, starting at 1.
    fn next_sequence(&self, year: i32) -> EngineResult<u32>;
}
