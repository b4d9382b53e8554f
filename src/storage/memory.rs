//! In-memory repository adapter.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{SickLeaveRecord, SickLeaveStatus, TrackingEntry};

use super::repository::SickLeaveRepository;

#[derive(Debug, Default)]
struct Store {
    records: HashMap<Uuid, SickLeaveRecord>,
    /// predecessor id -> successor id
    successors: HashMap<Uuid, Uuid>,
    tracking: HashMap<Uuid, Vec<TrackingEntry>>,
    sequences: HashMap<i32, u32>,
}

/// Repository holding everything behind a single lock.
///
/// Every write takes the write lock for its whole check-then-commit
/// sequence, which makes the successor uniqueness check and the revision
/// comparison atomic with the write.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, Store>> {
        self.store.read().map_err(|_| EngineError::Storage {
            message: "repository lock poisoned".to_string(),
        })
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, Store>> {
        self.store.write().map_err(|_| EngineError::Storage {
            message: "repository lock poisoned".to_string(),
        })
    }

    fn collect_sorted<F>(&self, predicate: F) -> EngineResult<Vec<SickLeaveRecord>>
    where
        F: Fn(&SickLeaveRecord) -> bool,
    {
        let store = self.read()?;
        let mut records: Vec<SickLeaveRecord> = store
            .records
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.record_number.cmp(&b.record_number))
        });
        Ok(records)
    }
}

impl SickLeaveRepository for InMemoryRepository {
    fn get(&self, id: Uuid) -> EngineResult<Option<SickLeaveRecord>> {
        Ok(self.read()?.records.get(&id).cloned())
    }

    fn find_by_employee(&self, employee_id: &str) -> EngineResult<Vec<SickLeaveRecord>> {
        let mut records = self.collect_sorted(|r| r.employee_id == employee_id)?;
        records.reverse();
        Ok(records)
    }

    fn find_by_status(&self, status: SickLeaveStatus) -> EngineResult<Vec<SickLeaveRecord>> {
        self.collect_sorted(|r| r.status == status)
    }

    fn find_by_issue_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<SickLeaveRecord>> {
        self.collect_sorted(|r| r.issue_date >= from && r.issue_date <= to)
    }

    fn find_successor(&self, id: Uuid) -> EngineResult<Option<SickLeaveRecord>> {
        let store = self.read()?;
        Ok(store
            .successors
            .get(&id)
            .and_then(|successor| store.records.get(successor))
            .cloned())
    }

    fn tracking_for(&self, id: Uuid) -> EngineResult<Vec<TrackingEntry>> {
        let store = self.read()?;
        let mut entries = store.tracking.get(&id).cloned().unwrap_or_default();
        entries.sort_by(|a, b| a.action_date.cmp(&b.action_date));
        Ok(entries)
    }

    fn insert_with_tracking(
        &self,
        record: SickLeaveRecord,
        entry: TrackingEntry,
    ) -> EngineResult<()> {
        let mut store = self.write()?;

        if store.records.contains_key(&record.id) {
            return Err(EngineError::Storage {
                message: format!("duplicate sick leave id {}", record.id),
            });
        }
        if let Some(previous) = record.previous_sick_leave_id {
            if let Some(existing) = store.successors.get(&previous) {
                return Err(EngineError::ChainBranch {
                    previous_id: previous,
                    existing_successor: *existing,
                });
            }
            store.successors.insert(previous, record.id);
        }

        store.tracking.entry(record.id).or_default().push(entry);
        store.records.insert(record.id, record);
        Ok(())
    }

    fn update_with_tracking(
        &self,
        mut record: SickLeaveRecord,
        expected_revision: u64,
        entry: TrackingEntry,
    ) -> EngineResult<SickLeaveRecord> {
        let mut store = self.write()?;

        let current = store
            .records
            .get(&record.id)
            .ok_or(EngineError::RecordNotFound { id: record.id })?;
        if current.revision != expected_revision {
            return Err(EngineError::ConcurrentModification {
                record_id: record.id,
            });
        }

        record.revision = expected_revision + 1;
        store.tracking.entry(record.id).or_default().push(entry);
        store.records.insert(record.id, record.clone());
        Ok(record)
    }

    fn append_tracking(&self, entry: TrackingEntry) -> EngineResult<()> {
        let mut store = self.write()?;
        if !store.records.contains_key(&entry.sick_leave_id) {
            return Err(EngineError::RecordNotFound {
                id: entry.sick_leave_id,
            });
        }
        store
            .tracking
            .entry(entry.sick_leave_id)
            .or_default()
            .push(entry);
        Ok(())
    }

    fn next_sequence(&self, year: i32) -> EngineResult<u32> {
        let mut store = self.write()?;
        let sequence = store.sequences.entry(year).or_insert(0);
        *sequence += 1;
        Ok(*sequence)
    }
}
