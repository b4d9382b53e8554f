//! The sick-leave lifecycle engine.
//!
//! Every mutating operation follows the same read-validate-write sequence:
//! load the record, check the transition table and the operation's
//! preconditions, then hand the new record and its tracking entry to the
//! repository in a single atomic write. Nothing is written when a check
//! fails.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{ChainResolution, Evaluation, collect_extensions, evaluate_record, resolve_chain};
use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    DashboardSummary, LeaveSummary, NewExtension, NewSickLeave, PendingStage,
    ReimbursementReport, ReportQuery, SickLeaveQuery, SickLeaveRecord, SickLeaveStatus,
    TrackingAction, TrackingEntry,
};
use crate::report::{
    EvaluatedRecord, aggregate_reimbursement, leave_summary, month_bounds, summarize_dashboard,
};
use crate::storage::{SalaryDirectory, SickLeaveRepository};

use super::outcome::{
    AmountMismatchWarning, CollectionOutcome, RegisteredSickLeave, SickLeaveDetail,
};
use super::transitions::{LifecycleAction, allowed_actions, apply_transition};

/// Coordinates validation, chain checks, calculation and persistence.
///
/// # Example
///
/// ```
/// use sick_leave_engine::config::ConfigLoader;
/// use sick_leave_engine::lifecycle::SickLeaveEngine;
/// use sick_leave_engine::models::{IllnessType, NewSickLeave, SickLeaveStatus};
/// use sick_leave_engine::storage::{InMemoryRepository, InMemorySalaryDirectory};
/// use chrono::NaiveDate;
///
/// let engine = SickLeaveEngine::new(
///     InMemoryRepository::new(),
///     InMemorySalaryDirectory::new(),
///     ConfigLoader::statutory(),
/// );
///
/// let registered = engine
///     .create(
///         NewSickLeave {
///             employee_id: "emp_001".to_string(),
///             leave_request_origin_id: None,
///             start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///             end_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
///             issue_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///             diagnosis_code: Some("J11".to_string()),
///             diagnosis_description: "Influenza".to_string(),
///             illness_type: IllnessType::GeneralIllness,
///             issuing_entity: "IPS Central".to_string(),
///             paying_entity: Some("EPS Sura".to_string()),
///             notes: None,
///             document_paths: vec![],
///         },
///         "hr_admin",
///     )
///     .unwrap();
///
/// assert_eq!(registered.record.record_number, "INC-2024-0001");
/// assert_eq!(registered.record.status, SickLeaveStatus::Active);
/// assert_eq!(registered.figures.company_days, 2);
/// ```
#[derive(Debug)]
pub struct SickLeaveEngine<R, S> {
    repository: R,
    salaries: S,
    config: ConfigLoader,
}

impl<R, S> SickLeaveEngine<R, S>
where
    R: SickLeaveRepository,
    S: SalaryDirectory,
{
    /// Creates an engine over the given collaborators.
    pub fn new(repository: R, salaries: S, config: ConfigLoader) -> Self {
        Self {
            repository,
            salaries,
            config,
        }
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Registers a new sick-leave record in `Active`.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty actor or required field, or `end_date < start_date`
    /// - `ScheduleNotFound` if no band schedule covers the start date
    pub fn create(&self, input: NewSickLeave, actor: &str) -> EngineResult<RegisteredSickLeave> {
        let actor = require_text("actor", actor)?;
        let employee_id = require_text("employee_id", &input.employee_id)?;
        let diagnosis_description =
            require_text("diagnosis_description", &input.diagnosis_description)?;
        let issuing_entity = require_text("issuing_entity", &input.issuing_entity)?;
        validate_date_range(input.start_date, input.end_date)?;
        validate_document_paths(&input.document_paths)?;

        let record = SickLeaveRecord {
            id: Uuid::new_v4(),
            record_number: String::new(),
            employee_id,
            leave_request_origin_id: optional_text(input.leave_request_origin_id),
            previous_sick_leave_id: None,
            start_date: input.start_date,
            end_date: input.end_date,
            issue_date: input.issue_date,
            diagnosis_code: optional_text(input.diagnosis_code),
            diagnosis_description,
            illness_type: input.illness_type,
            issuing_entity,
            paying_entity: optional_text(input.paying_entity),
            status: SickLeaveStatus::Active,
            transcription_date: None,
            file_number: None,
            collection_date: None,
            amount_paid: None,
            notes: optional_text(input.notes),
            document_paths: input.document_paths,
            created_by: actor.clone(),
            created_at: Utc::now(),
            revision: 0,
        };

        self.register(record, TrackingAction::Created, &actor)
    }

    /// Registers an extension of `previous_id`.
    ///
    /// Employee, illness type and paying entity are inherited from the
    /// predecessor.
    ///
    /// # Errors
    ///
    /// - `RecordNotFound` if the predecessor does not exist
    /// - `InvalidTransition` if the predecessor is cancelled
    /// - `ChainBranch` if the predecessor already has an extension
    /// - `ChainContinuity` unless the extension starts the day after the predecessor ends
    /// - `Validation` for an empty actor or required field, or `end_date < start_date`
    pub fn create_extension(
        &self,
        previous_id: Uuid,
        input: NewExtension,
        actor: &str,
    ) -> EngineResult<RegisteredSickLeave> {
        let actor = require_text("actor", actor)?;
        let diagnosis_description =
            require_text("diagnosis_description", &input.diagnosis_description)?;
        let issuing_entity = require_text("issuing_entity", &input.issuing_entity)?;
        validate_date_range(input.start_date, input.end_date)?;
        validate_document_paths(&input.document_paths)?;

        let previous = self.load(previous_id)?;
        if previous.status == SickLeaveStatus::Cancelled {
            warn!(record_id = %previous_id, "extension of cancelled sick leave rejected");
            return Err(EngineError::InvalidTransition {
                record_id: previous_id,
                from: previous.status,
                action: "extend".to_string(),
            });
        }
        if let Some(existing) = self.repository.find_successor(previous_id)? {
            warn!(record_id = %previous_id, existing = %existing.id, "branching extension rejected");
            return Err(EngineError::ChainBranch {
                previous_id,
                existing_successor: existing.id,
            });
        }
        let expected_start = previous.end_date + Duration::days(1);
        if input.start_date != expected_start {
            warn!(record_id = %previous_id, %expected_start, actual_start = %input.start_date, "discontinuous extension rejected");
            return Err(EngineError::ChainContinuity {
                previous_id,
                expected_start,
                actual_start: input.start_date,
            });
        }

        let record = SickLeaveRecord {
            id: Uuid::new_v4(),
            record_number: String::new(),
            employee_id: previous.employee_id.clone(),
            leave_request_origin_id: None,
            previous_sick_leave_id: Some(previous_id),
            start_date: input.start_date,
            end_date: input.end_date,
            issue_date: input.issue_date,
            diagnosis_code: optional_text(input.diagnosis_code),
            diagnosis_description,
            illness_type: previous.illness_type,
            issuing_entity,
            paying_entity: previous.paying_entity.clone(),
            status: SickLeaveStatus::Active,
            transcription_date: None,
            file_number: None,
            collection_date: None,
            amount_paid: None,
            notes: optional_text(input.notes),
            document_paths: input.document_paths,
            created_by: actor.clone(),
            created_at: Utc::now(),
            revision: 0,
        };

        self.register(record, TrackingAction::ExtensionCreated, &actor)
    }

    /// Evaluates, numbers and stores a new record with its first tracking entry.
    fn register(
        &self,
        mut record: SickLeaveRecord,
        action: TrackingAction,
        actor: &str,
    ) -> EngineResult<RegisteredSickLeave> {
        let evaluation = self.evaluate_record(&record)?;

        let sequence = self.repository.next_sequence(record.issue_date.year())?;
        record.record_number = format!("INC-{}-{:04}", record.issue_date.year(), sequence);

        let figures = evaluation.figures;
        let description = match action {
            TrackingAction::ExtensionCreated => format!(
                "Registered extension {} ({} days, episode day {})",
                record.record_number, figures.total_days, figures.total_accumulated_days
            ),
            _ => format!(
                "Registered {} ({} days)",
                record.record_number, figures.total_days
            ),
        };
        let entry = TrackingEntry::new(record.id, action, description, actor).with_data(
            serde_json::json!({
                "previous_sick_leave_id": record.previous_sick_leave_id,
                "company_days": figures.company_days,
                "insurer_days": figures.insurer_days,
                "payment_percentage": figures.payment_percentage.to_string(),
                "payer": figures.payer,
                "total_to_collect": figures.total_to_collect.map(|t| t.to_string()),
                "total_accumulated_days": figures.total_accumulated_days
            }),
        );

        self.repository
            .insert_with_tracking(record.clone(), entry)
            .inspect_err(|e| warn!(record_id = %record.id, error = %e, "sick leave insert rejected"))?;

        info!(
            record_id = %record.id,
            record_number = %record.record_number,
            employee_id = %record.employee_id,
            is_extension = record.is_extension(),
            performed_by = actor,
            "sick leave registered"
        );

        Ok(RegisteredSickLeave { record, figures })
    }

    /// Moves an `Active` record to `Transcribed`.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the record is `Active`
    /// - `Validation` if `transcription_date` is before the issue date
    pub fn register_transcription(
        &self,
        id: Uuid,
        transcription_date: NaiveDate,
        file_number: Option<String>,
        actor: &str,
    ) -> EngineResult<SickLeaveRecord> {
        let actor = require_text("actor", actor)?;
        let record = self.load(id)?;
        let next = self.transition(&record, LifecycleAction::Transcribe)?;

        if transcription_date < record.issue_date {
            return Err(EngineError::validation(
                "transcription_date",
                format!("must not be before the issue date {}", record.issue_date),
            ));
        }

        let file_number = optional_text(file_number);
        let mut updated = record.clone();
        updated.status = next;
        updated.transcription_date = Some(transcription_date);
        updated.file_number = file_number.clone();

        let description = match &file_number {
            Some(number) => format!("Transcribed with file number {}", number),
            None => "Transcribed".to_string(),
        };
        let entry = TrackingEntry::new(id, TrackingAction::Transcribed, description, &actor)
            .with_data(serde_json::json!({
                "transcription_date": transcription_date.to_string(),
                "file_number": file_number
            }));

        self.commit(updated, record.revision, entry, &actor)
    }

    /// Moves a `Transcribed` record to `Collected`.
    ///
    /// Returns an [`AmountMismatchWarning`] alongside the record when the
    /// amount paid differs from the computed amount by more than the
    /// configured tolerance. Unvalued records never produce a warning.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the record is `Transcribed`
    /// - `Validation` if `collection_date` is before the transcription date
    ///   or `amount_paid` is negative
    pub fn register_collection(
        &self,
        id: Uuid,
        collection_date: NaiveDate,
        amount_paid: Decimal,
        actor: &str,
    ) -> EngineResult<CollectionOutcome> {
        let actor = require_text("actor", actor)?;
        let record = self.load(id)?;
        let next = self.transition(&record, LifecycleAction::Collect)?;

        let transcription_date = record.transcription_date.ok_or_else(|| {
            EngineError::validation("transcription_date", "record has no transcription date")
        })?;
        if collection_date < transcription_date {
            return Err(EngineError::validation(
                "collection_date",
                format!("must not be before the transcription date {}", transcription_date),
            ));
        }
        if amount_paid < Decimal::ZERO {
            return Err(EngineError::validation("amount_paid", "must not be negative"));
        }

        let figures = self.evaluate_record(&record)?.figures;
        let tolerance = self.config.settings().amount_tolerance;
        let warning = figures.total_to_collect.and_then(|expected| {
            let difference = amount_paid - expected;
            (difference.abs() > tolerance).then_some(AmountMismatchWarning {
                record_id: id,
                expected,
                paid: amount_paid,
                difference,
                tolerance,
            })
        });

        let mut updated = record.clone();
        updated.status = next;
        updated.collection_date = Some(collection_date);
        updated.amount_paid = Some(amount_paid);

        let entry = TrackingEntry::new(
            id,
            TrackingAction::Collected,
            format!("Collected ${}", amount_paid),
            &actor,
        )
        .with_data(serde_json::json!({
            "collection_date": collection_date.to_string(),
            "amount_paid": amount_paid.to_string(),
            "expected": figures.total_to_collect.map(|t| t.to_string()),
            "mismatch": warning.as_ref().map(|w| w.difference.to_string())
        }));

        let record = self.commit(updated, record.revision, entry, &actor)?;

        if let Some(w) = &warning {
            warn!(
                record_id = %id,
                expected = %w.expected,
                paid = %w.paid,
                difference = %w.difference,
                "collected amount does not match computed amount"
            );
        }

        Ok(CollectionOutcome { record, warning })
    }

    /// Cancels an `Active` or `Transcribed` record.
    ///
    /// The reason is recorded in the tracking entry and appended to the
    /// record's notes as `[CANCELLED] reason`.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` from `Collected` or `Cancelled`
    /// - `Validation` for an empty reason
    pub fn cancel(&self, id: Uuid, reason: &str, actor: &str) -> EngineResult<SickLeaveRecord> {
        let actor = require_text("actor", actor)?;
        let reason = require_text("reason", reason)?;
        let record = self.load(id)?;
        let next = self.transition(&record, LifecycleAction::Cancel)?;

        let marker = format!("[CANCELLED] {}", reason);
        let mut updated = record.clone();
        updated.status = next;
        updated.notes = Some(match &record.notes {
            Some(notes) => format!("{}\n{}", notes, marker),
            None => marker,
        });

        let entry = TrackingEntry::new(
            id,
            TrackingAction::Cancelled,
            format!("Cancelled: {}", reason),
            &actor,
        )
        .with_data(serde_json::json!({
            "reason": reason,
            "previous_status": record.status
        }));

        self.commit(updated, record.revision, entry, &actor)
    }

    /// Appends a free-text note to a record's tracking log.
    ///
    /// Allowed in every status; never changes the record.
    pub fn add_note(&self, id: Uuid, text: &str, actor: &str) -> EngineResult<TrackingEntry> {
        let actor = require_text("actor", actor)?;
        let text = require_text("text", text)?;
        self.load(id)?;

        let entry = TrackingEntry::new(id, TrackingAction::Note, text, &actor);
        self.repository.append_tracking(entry.clone())?;

        info!(record_id = %id, performed_by = %actor, "note added");
        Ok(entry)
    }

    /// Attaches an opaque document reference to a record.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if the record is cancelled
    /// - `Validation` for an empty path
    pub fn attach_document(
        &self,
        id: Uuid,
        path: &str,
        actor: &str,
    ) -> EngineResult<SickLeaveRecord> {
        let actor = require_text("actor", actor)?;
        let path = require_text("path", path)?;
        let record = self.load(id)?;

        if record.status == SickLeaveStatus::Cancelled {
            warn!(record_id = %id, "document attachment to cancelled sick leave rejected");
            return Err(EngineError::InvalidTransition {
                record_id: id,
                from: record.status,
                action: "attach a document to".to_string(),
            });
        }

        let mut updated = record.clone();
        updated.document_paths.push(path.clone());

        let entry = TrackingEntry::new(
            id,
            TrackingAction::DocumentAttached,
            format!("Attached {}", path),
            &actor,
        )
        .with_data(serde_json::json!({ "path": path }));

        self.commit(updated, record.revision, entry, &actor)
    }

    /// Looks up a record.
    pub fn get(&self, id: Uuid) -> EngineResult<SickLeaveRecord> {
        self.load(id)
    }

    /// Resolves a record's extension chain.
    pub fn resolve_chain(&self, id: Uuid) -> EngineResult<ChainResolution> {
        let record = self.load(id)?;
        resolve_chain(&record, |ancestor| self.repository.get(ancestor))
    }

    /// Everything known about a record.
    pub fn detail(&self, id: Uuid) -> EngineResult<SickLeaveDetail> {
        let record = self.load(id)?;
        let Evaluation { chain, figures } = self.evaluate_record(&record)?;
        let extensions = collect_extensions(id, |current| self.repository.find_successor(current))?;
        let tracking = self.repository.tracking_for(id)?;

        Ok(SickLeaveDetail {
            allowed_actions: allowed_actions(record.status),
            record,
            chain,
            figures,
            extensions,
            tracking,
        })
    }

    /// The tracking log of a record, oldest first.
    pub fn tracking(&self, id: Uuid) -> EngineResult<Vec<TrackingEntry>> {
        self.load(id)?;
        self.repository.tracking_for(id)
    }

    /// All records of an employee, most recent first.
    pub fn list_for_employee(&self, employee_id: &str) -> EngineResult<Vec<SickLeaveRecord>> {
        self.repository.find_by_employee(employee_id)
    }

    /// Lists the records matching every filter in `query` as summary rows
    /// computed as of a date, most recent start date first.
    ///
    /// # Errors
    ///
    /// - `Validation` if `from` is after `to`
    pub fn list(&self, query: &SickLeaveQuery, as_of: NaiveDate) -> EngineResult<Vec<LeaveSummary>> {
        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(EngineError::validation(
                    "from",
                    format!("{} is after to {}", from, to),
                ));
            }
        }

        let employee_id = query
            .employee_id
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());
        let pending_status = query.pending.map(PendingStage::status);

        let mut records = match employee_id {
            Some(employee_id) => self.repository.find_by_employee(employee_id)?,
            None => {
                let statuses = match query.status.or(pending_status) {
                    Some(status) => vec![status],
                    None => SickLeaveStatus::ALL.to_vec(),
                };
                let mut records = Vec::new();
                for status in statuses {
                    records.extend(self.repository.find_by_status(status)?);
                }
                records
            }
        };

        records.retain(|r| {
            query.status.is_none_or(|status| r.status == status)
                && pending_status.is_none_or(|status| r.status == status)
                && query.illness_type.is_none_or(|t| r.illness_type == t)
                && query.from.is_none_or(|from| r.start_date >= from)
                && query.to.is_none_or(|to| r.end_date <= to)
        });
        records.sort_by(|a, b| {
            b.start_date
                .cmp(&a.start_date)
                .then_with(|| b.record_number.cmp(&a.record_number))
        });

        let window = self.config.settings().expiry_window_days;
        Ok(records
            .iter()
            .map(|record| leave_summary(record, as_of, window))
            .collect())
    }

    /// Builds the reimbursement report for an issue month.
    pub fn reimbursement_report(&self, query: &ReportQuery) -> EngineResult<ReimbursementReport> {
        let (first, last) = month_bounds(query.year, query.month)?;
        let records: Vec<SickLeaveRecord> = self
            .repository
            .find_by_issue_date_range(first, last)?
            .into_iter()
            .filter(|r| r.status != SickLeaveStatus::Cancelled)
            .collect();

        let evaluated = self.evaluate_all(records)?;
        aggregate_reimbursement(query, &evaluated)
    }

    /// Builds the dashboard summary as of a date.
    pub fn dashboard(&self, as_of: NaiveDate) -> EngineResult<DashboardSummary> {
        let mut records = Vec::new();
        for status in [
            SickLeaveStatus::Active,
            SickLeaveStatus::Transcribed,
            SickLeaveStatus::Collected,
        ] {
            records.extend(self.repository.find_by_status(status)?);
        }

        let evaluated = self.evaluate_all(records)?;
        summarize_dashboard(as_of, &evaluated, self.config.settings().expiry_window_days)
    }

    fn evaluate_all(&self, records: Vec<SickLeaveRecord>) -> EngineResult<Vec<EvaluatedRecord>> {
        records
            .into_iter()
            .map(|record| {
                let figures = self.evaluate_record(&record)?.figures;
                Ok(EvaluatedRecord { record, figures })
            })
            .collect()
    }

    fn evaluate_record(&self, record: &SickLeaveRecord) -> EngineResult<Evaluation> {
        evaluate_record(
            record,
            |id| self.repository.get(id),
            &self.config,
            &self.salaries,
        )
    }

    fn load(&self, id: Uuid) -> EngineResult<SickLeaveRecord> {
        self.repository
            .get(id)?
            .ok_or(EngineError::RecordNotFound { id })
    }

    fn transition(
        &self,
        record: &SickLeaveRecord,
        action: LifecycleAction,
    ) -> EngineResult<SickLeaveStatus> {
        apply_transition(record.id, record.status, action).inspect_err(|e| {
            warn!(record_id = %record.id, %action, error = %e, "transition rejected")
        })
    }

    fn commit(
        &self,
        record: SickLeaveRecord,
        expected_revision: u64,
        entry: TrackingEntry,
        actor: &str,
    ) -> EngineResult<SickLeaveRecord> {
        let action = entry.action_type;
        let id = record.id;
        let record = self
            .repository
            .update_with_tracking(record, expected_revision, entry)
            .inspect_err(|e| warn!(record_id = %id, error = %e, "sick leave update rejected"))?;

        info!(
            record_id = %record.id,
            ?action,
            status = %record.status,
            performed_by = actor,
            "sick leave updated"
        );
        Ok(record)
    }
}

fn require_text(field: &str, value: &str) -> EngineResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_date_range(start: NaiveDate, end: NaiveDate) -> EngineResult<()> {
    if end < start {
        return Err(EngineError::validation(
            "end_date",
            format!("{} is before start_date {}", end, start),
        ));
    }
    Ok(())
}

fn validate_document_paths(paths: &[String]) -> EngineResult<()> {
    if paths.iter().any(|p| p.trim().is_empty()) {
        return Err(EngineError::validation(
            "document_paths",
            "must not contain empty paths",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IllnessType;
    use crate::storage::{InMemoryRepository, InMemorySalaryDirectory};
    use std::str::FromStr;

    type TestEngine = SickLeaveEngine<InMemoryRepository, InMemorySalaryDirectory>;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_engine() -> TestEngine {
        let salaries = InMemorySalaryDirectory::new().with_salary(
            "emp_001",
            date(2020, 1, 1),
            dec("1500000"),
        );
        SickLeaveEngine::new(InMemoryRepository::new(), salaries, ConfigLoader::statutory())
    }

    fn new_sick_leave(start: NaiveDate, end: NaiveDate) -> NewSickLeave {
        NewSickLeave {
            employee_id: "emp_001".to_string(),
            leave_request_origin_id: None,
            start_date: start,
            end_date: end,
            issue_date: start,
            diagnosis_code: Some("M54.5".to_string()),
            diagnosis_description: "Low back pain".to_string(),
            illness_type: IllnessType::GeneralIllness,
            issuing_entity: "IPS Central".to_string(),
            paying_entity: Some("EPS Sura".to_string()),
            notes: None,
            document_paths: vec![],
        }
    }

    fn new_extension(start: NaiveDate, end: NaiveDate) -> NewExtension {
        NewExtension {
            start_date: start,
            end_date: end,
            issue_date: start,
            diagnosis_code: None,
            diagnosis_description: "Low back pain, follow-up".to_string(),
            issuing_entity: "IPS Central".to_string(),
            notes: None,
            document_paths: vec![],
        }
    }

    fn create_root(engine: &TestEngine) -> SickLeaveRecord {
        engine
            .create(new_sick_leave(date(2024, 1, 1), date(2024, 1, 5)), "hr_admin")
            .unwrap()
            .record
    }

    fn transcribe(engine: &TestEngine, id: Uuid) -> SickLeaveRecord {
        engine
            .register_transcription(id, date(2024, 1, 8), Some("RAD-001".to_string()), "hr_admin")
            .unwrap()
    }

    #[test]
    fn test_create_assigns_number_and_logs_creation() {
        let engine = create_test_engine();

        let registered = engine
            .create(new_sick_leave(date(2024, 1, 1), date(2024, 1, 5)), "hr_admin")
            .unwrap();
        let second = engine
            .create(new_sick_leave(date(2024, 2, 1), date(2024, 2, 3)), "hr_admin")
            .unwrap();

        assert_eq!(registered.record.record_number, "INC-2024-0001");
        assert_eq!(second.record.record_number, "INC-2024-0002");
        assert_eq!(registered.record.created_by, "hr_admin");
        assert_eq!(registered.figures.total_to_collect, Some(dec("100005.00")));

        let tracking = engine.tracking(registered.record.id).unwrap();
        assert_eq!(tracking.len(), 1);
        assert_eq!(tracking[0].action_type, TrackingAction::Created);
        assert_eq!(tracking[0].performed_by, "hr_admin");
        assert_eq!(tracking[0].additional_data.as_ref().unwrap()["company_days"], 2);
    }

    #[test]
    fn test_create_rejects_inverted_dates() {
        let engine = create_test_engine();

        let result = engine.create(new_sick_leave(date(2024, 1, 5), date(2024, 1, 1)), "hr_admin");

        match result {
            Err(EngineError::Validation { field, .. }) => assert_eq!(field, "end_date"),
            other => panic!("Expected Validation error, got {:?}", other),
        }
        assert!(engine.list_for_employee("emp_001").unwrap().is_empty());
    }

    #[test]
    fn test_create_requires_actor_and_fields() {
        let engine = create_test_engine();

        assert!(matches!(
            engine.create(new_sick_leave(date(2024, 1, 1), date(2024, 1, 5)), "  "),
            Err(EngineError::Validation { .. })
        ));

        let mut input = new_sick_leave(date(2024, 1, 1), date(2024, 1, 5));
        input.diagnosis_description = String::new();
        match engine.create(input, "hr_admin") {
            Err(EngineError::Validation { field, .. }) => {
                assert_eq!(field, "diagnosis_description")
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_single_day_record() {
        let engine = create_test_engine();

        let registered = engine
            .create(new_sick_leave(date(2024, 1, 1), date(2024, 1, 1)), "hr_admin")
            .unwrap();

        assert_eq!(registered.figures.total_days, 1);
        assert_eq!(registered.figures.company_days, 1);
        assert_eq!(registered.figures.insurer_days, 0);
    }

    #[test]
    fn test_extension_inherits_and_accumulates() {
        let engine = create_test_engine();
        let root = create_root(&engine);

        let extension = engine
            .create_extension(root.id, new_extension(date(2024, 1, 6), date(2024, 1, 15)), "hr_admin")
            .unwrap();

        assert_eq!(extension.record.previous_sick_leave_id, Some(root.id));
        assert_eq!(extension.record.employee_id, "emp_001");
        assert_eq!(extension.record.illness_type, IllnessType::GeneralIllness);
        assert_eq!(extension.record.paying_entity.as_deref(), Some("EPS Sura"));
        assert!(extension.figures.is_extension);
        assert_eq!(extension.figures.total_accumulated_days, 15);
        assert_eq!(extension.figures.company_days, 0);

        let tracking = engine.tracking(extension.record.id).unwrap();
        assert_eq!(tracking[0].action_type, TrackingAction::ExtensionCreated);
    }

    #[test]
    fn test_extension_with_gap_is_rejected() {
        let engine = create_test_engine();
        let root = create_root(&engine);

        let result =
            engine.create_extension(root.id, new_extension(date(2024, 1, 8), date(2024, 1, 10)), "hr_admin");

        match result {
            Err(EngineError::ChainContinuity {
                expected_start,
                actual_start,
                ..
            }) => {
                assert_eq!(expected_start, date(2024, 1, 6));
                assert_eq!(actual_start, date(2024, 1, 8));
            }
            other => panic!("Expected ChainContinuity, got {:?}", other),
        }
    }

    #[test]
    fn test_extension_overlapping_predecessor_is_rejected() {
        let engine = create_test_engine();
        let root = create_root(&engine);

        let result =
            engine.create_extension(root.id, new_extension(date(2024, 1, 5), date(2024, 1, 10)), "hr_admin");

        assert!(matches!(result, Err(EngineError::ChainContinuity { .. })));
    }

    #[test]
    fn test_second_extension_of_same_record_is_chain_branch() {
        let engine = create_test_engine();
        let root = create_root(&engine);
        let first = engine
            .create_extension(root.id, new_extension(date(2024, 1, 6), date(2024, 1, 10)), "hr_admin")
            .unwrap();

        let result =
            engine.create_extension(root.id, new_extension(date(2024, 1, 6), date(2024, 1, 12)), "hr_admin");

        match result {
            Err(EngineError::ChainBranch {
                existing_successor, ..
            }) => assert_eq!(existing_successor, first.record.id),
            other => panic!("Expected ChainBranch, got {:?}", other),
        }
    }

    #[test]
    fn test_extension_of_cancelled_record_is_rejected() {
        let engine = create_test_engine();
        let root = create_root(&engine);
        engine.cancel(root.id, "duplicate", "hr_admin").unwrap();

        let result =
            engine.create_extension(root.id, new_extension(date(2024, 1, 6), date(2024, 1, 10)), "hr_admin");

        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    }

    #[test]
    fn test_extension_of_missing_record_is_not_found() {
        let engine = create_test_engine();

        let result = engine.create_extension(
            Uuid::new_v4(),
            new_extension(date(2024, 1, 6), date(2024, 1, 10)),
            "hr_admin",
        );

        assert!(matches!(result, Err(EngineError::RecordNotFound { .. })));
    }

    #[test]
    fn test_full_lifecycle() {
        let engine = create_test_engine();
        let root = create_root(&engine);

        let transcribed = transcribe(&engine, root.id);
        assert_eq!(transcribed.status, SickLeaveStatus::Transcribed);
        assert_eq!(transcribed.file_number.as_deref(), Some("RAD-001"));

        let outcome = engine
            .register_collection(root.id, date(2024, 2, 1), dec("100005.00"), "treasury")
            .unwrap();
        assert_eq!(outcome.record.status, SickLeaveStatus::Collected);
        assert_eq!(outcome.record.amount_paid, Some(dec("100005.00")));
        assert!(outcome.warning.is_none());

        let actions: Vec<TrackingAction> = engine
            .tracking(root.id)
            .unwrap()
            .into_iter()
            .map(|e| e.action_type)
            .collect();
        assert_eq!(
            actions,
            vec![
                TrackingAction::Created,
                TrackingAction::Transcribed,
                TrackingAction::Collected
            ]
        );
    }

    #[test]
    fn test_transcription_before_issue_date_is_rejected() {
        let engine = create_test_engine();
        let root = create_root(&engine);

        let result = engine.register_transcription(root.id, date(2023, 12, 31), None, "hr_admin");

        assert!(matches!(result, Err(EngineError::Validation { .. })));
        assert_eq!(engine.get(root.id).unwrap().status, SickLeaveStatus::Active);
        assert_eq!(engine.tracking(root.id).unwrap().len(), 1);
    }

    #[test]
    fn test_collection_before_transcription_date_is_rejected() {
        let engine = create_test_engine();
        let root = create_root(&engine);
        transcribe(&engine, root.id);

        let result = engine.register_collection(root.id, date(2024, 1, 7), dec("100005"), "treasury");

        match result {
            Err(EngineError::Validation { field, .. }) => assert_eq!(field, "collection_date"),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_collection_from_active_is_invalid_transition() {
        let engine = create_test_engine();
        let root = create_root(&engine);

        let result = engine.register_collection(root.id, date(2024, 2, 1), dec("100005"), "treasury");

        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    }

    #[test]
    fn test_amount_mismatch_warns_without_blocking() {
        let engine = create_test_engine();
        let root = create_root(&engine);
        transcribe(&engine, root.id);

        let outcome = engine
            .register_collection(root.id, date(2024, 2, 1), dec("90000"), "treasury")
            .unwrap();

        assert_eq!(outcome.record.status, SickLeaveStatus::Collected);
        let warning = outcome.warning.unwrap();
        assert_eq!(warning.expected, dec("100005.00"));
        assert_eq!(warning.difference, dec("-10005.00"));
    }

    #[test]
    fn test_amount_within_tolerance_does_not_warn() {
        let engine = create_test_engine();
        let root = create_root(&engine);
        transcribe(&engine, root.id);

        let outcome = engine
            .register_collection(root.id, date(2024, 2, 1), dec("100004.50"), "treasury")
            .unwrap();

        assert!(outcome.warning.is_none());
    }

    #[test]
    fn test_unvalued_collection_never_warns() {
        let engine = create_test_engine();
        let mut input = new_sick_leave(date(2024, 1, 1), date(2024, 1, 5));
        input.employee_id = "emp_404".to_string();
        let record = engine.create(input, "hr_admin").unwrap().record;
        transcribe(&engine, record.id);

        let outcome = engine
            .register_collection(record.id, date(2024, 2, 1), dec("1"), "treasury")
            .unwrap();

        assert!(outcome.warning.is_none());
    }

    #[test]
    fn test_cancel_appends_reason_to_notes() {
        let engine = create_test_engine();
        let mut input = new_sick_leave(date(2024, 1, 1), date(2024, 1, 5));
        input.notes = Some("Delivered by email".to_string());
        let record = engine.create(input, "hr_admin").unwrap().record;

        let cancelled = engine.cancel(record.id, "Duplicate certificate", "hr_admin").unwrap();

        assert_eq!(cancelled.status, SickLeaveStatus::Cancelled);
        assert_eq!(
            cancelled.notes.as_deref(),
            Some("Delivered by email\n[CANCELLED] Duplicate certificate")
        );
        let tracking = engine.tracking(record.id).unwrap();
        assert_eq!(tracking[1].action_type, TrackingAction::Cancelled);
        assert_eq!(
            tracking[1].additional_data.as_ref().unwrap()["reason"],
            "Duplicate certificate"
        );
    }

    #[test]
    fn test_terminal_states_reject_transitions_without_writing() {
        let engine = create_test_engine();
        let cancelled = create_root(&engine);
        engine.cancel(cancelled.id, "error", "hr_admin").unwrap();

        let collected = engine
            .create(new_sick_leave(date(2024, 3, 1), date(2024, 3, 5)), "hr_admin")
            .unwrap()
            .record;
        engine
            .register_transcription(collected.id, date(2024, 3, 6), None, "hr_admin")
            .unwrap();
        engine
            .register_collection(collected.id, date(2024, 3, 20), dec("100005"), "treasury")
            .unwrap();

        for id in [cancelled.id, collected.id] {
            let before = engine.get(id).unwrap();
            let log_len = engine.tracking(id).unwrap().len();

            let attempts = [
                engine
                    .register_transcription(id, date(2024, 4, 1), None, "hr_admin")
                    .err(),
                engine
                    .register_collection(id, date(2024, 4, 1), dec("1"), "hr_admin")
                    .err(),
                engine.cancel(id, "again", "hr_admin").err(),
            ];
            for error in attempts {
                assert!(matches!(error, Some(EngineError::InvalidTransition { .. })));
            }

            assert_eq!(engine.get(id).unwrap(), before);
            assert_eq!(engine.tracking(id).unwrap().len(), log_len);
        }
    }

    #[test]
    fn test_add_note_in_any_state() {
        let engine = create_test_engine();
        let root = create_root(&engine);
        engine.cancel(root.id, "error", "hr_admin").unwrap();

        let entry = engine.add_note(root.id, "Called the EPS", "hr_assistant").unwrap();

        assert_eq!(entry.action_type, TrackingAction::Note);
        assert_eq!(entry.performed_by, "hr_assistant");
        assert_eq!(engine.get(root.id).unwrap().status, SickLeaveStatus::Cancelled);
        assert_eq!(engine.tracking(root.id).unwrap().len(), 3);
    }

    #[test]
    fn test_attach_document() {
        let engine = create_test_engine();
        let root = create_root(&engine);

        let updated = engine
            .attach_document(root.id, "docs/inc-2024-0001.pdf", "hr_admin")
            .unwrap();

        assert_eq!(updated.document_paths, vec!["docs/inc-2024-0001.pdf".to_string()]);
        let tracking = engine.tracking(root.id).unwrap();
        assert_eq!(tracking[1].action_type, TrackingAction::DocumentAttached);
    }

    #[test]
    fn test_attach_document_to_cancelled_record_is_rejected() {
        let engine = create_test_engine();
        let root = create_root(&engine);
        engine.cancel(root.id, "error", "hr_admin").unwrap();

        let result = engine.attach_document(root.id, "docs/late.pdf", "hr_admin");

        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    }

    #[test]
    fn test_concurrent_attachments_keep_record_and_log_in_step() {
        for _ in 0..50 {
            let engine = create_test_engine();
            let id = create_root(&engine).id;

            let results: Vec<EngineResult<SickLeaveRecord>> = std::thread::scope(|scope| {
                let handles: Vec<_> = (0..8)
                    .map(|i| {
                        let engine = &engine;
                        scope.spawn(move || {
                            engine.attach_document(id, &format!("docs/scan-{}.pdf", i), "hr_admin")
                        })
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });

            let attached = results.iter().filter(|r| r.is_ok()).count();
            assert!(attached >= 1);
            for result in &results {
                if let Err(err) = result {
                    assert!(matches!(err, EngineError::ConcurrentModification { .. }));
                }
            }

            let mut stored = engine.get(id).unwrap().document_paths;
            let mut logged: Vec<String> = engine
                .tracking(id)
                .unwrap()
                .into_iter()
                .filter(|e| e.action_type == TrackingAction::DocumentAttached)
                .filter_map(|e| e.additional_data)
                .filter_map(|data| data["path"].as_str().map(str::to_string))
                .collect();
            stored.sort();
            logged.sort();

            assert_eq!(stored.len(), attached);
            assert_eq!(stored, logged);
            assert_eq!(engine.get(id).unwrap().revision, attached as u64);
        }
    }

    #[test]
    fn test_update_from_stale_read_is_rejected() {
        let engine = create_test_engine();
        let root = create_root(&engine);
        engine
            .attach_document(root.id, "docs/first.pdf", "hr_admin")
            .unwrap();

        // A writer still holding the pre-attachment copy
        let mut stale = root.clone();
        stale.notes = Some("overwrite".to_string());
        let entry = TrackingEntry::new(root.id, TrackingAction::Note, "stale", "hr_admin");
        let result = engine.commit(stale, root.revision, entry, "hr_admin");

        assert!(matches!(
            result,
            Err(EngineError::ConcurrentModification { .. })
        ));
        let stored = engine.get(root.id).unwrap();
        assert_eq!(stored.document_paths, vec!["docs/first.pdf".to_string()]);
        assert!(stored.notes.is_none());
        assert_eq!(engine.tracking(root.id).unwrap().len(), 2);
    }

    #[test]
    fn test_detail_includes_chain_and_extensions() {
        let engine = create_test_engine();
        let root = create_root(&engine);
        let second = engine
            .create_extension(root.id, new_extension(date(2024, 1, 6), date(2024, 1, 15)), "hr_admin")
            .unwrap()
            .record;
        let third = engine
            .create_extension(second.id, new_extension(date(2024, 1, 16), date(2024, 1, 25)), "hr_admin")
            .unwrap()
            .record;

        let root_detail = engine.detail(root.id).unwrap();
        let third_detail = engine.detail(third.id).unwrap();

        assert_eq!(root_detail.extensions.len(), 2);
        assert_eq!(root_detail.extensions[1].id, third.id);
        assert_eq!(
            root_detail.allowed_actions,
            vec![LifecycleAction::Transcribe, LifecycleAction::Cancel]
        );
        assert_eq!(third_detail.chain.root_id, root.id);
        assert_eq!(third_detail.chain.prior_cumulative_days, 15);
        assert_eq!(third_detail.figures.total_accumulated_days, 25);
        assert_eq!(third_detail.figures.audit_trace.len(), 3);
        assert_eq!(engine.resolve_chain(third.id).unwrap().ancestors.len(), 2);
    }

    #[test]
    fn test_reimbursement_report_by_issue_month() {
        let engine = create_test_engine();
        let root = create_root(&engine);
        engine
            .create_extension(root.id, new_extension(date(2024, 1, 6), date(2024, 1, 15)), "hr_admin")
            .unwrap();
        let cancelled = engine
            .create(new_sick_leave(date(2024, 1, 20), date(2024, 1, 30)), "hr_admin")
            .unwrap()
            .record;
        engine.cancel(cancelled.id, "error", "hr_admin").unwrap();

        let report = engine
            .reimbursement_report(&ReportQuery {
                year: 2024,
                month: 1,
                paying_entity: None,
            })
            .unwrap();

        assert_eq!(report.total_records, 2);
        assert_eq!(report.grand_total, dec("433355.00"));
        assert_eq!(report.entity_totals.len(), 1);
    }

    #[test]
    fn test_list_combines_filters() {
        let engine = create_test_engine();
        let root = create_root(&engine);
        transcribe(&engine, root.id);
        let extension = engine
            .create_extension(root.id, new_extension(date(2024, 1, 6), date(2024, 1, 15)), "hr_admin")
            .unwrap()
            .record;
        let mut accident = new_sick_leave(date(2024, 2, 1), date(2024, 2, 10));
        accident.illness_type = IllnessType::WorkAccident;
        accident.paying_entity = Some("ARL Positiva".to_string());
        let accident = engine.create(accident, "hr_admin").unwrap().record;
        let cancelled = engine
            .create(new_sick_leave(date(2024, 3, 1), date(2024, 3, 5)), "hr_admin")
            .unwrap()
            .record;
        engine.cancel(cancelled.id, "error", "hr_admin").unwrap();
        let as_of = date(2024, 1, 14);

        let all = engine.list(&SickLeaveQuery::default(), as_of).unwrap();
        let ids: Vec<Uuid> = all.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![cancelled.id, accident.id, extension.id, root.id]);

        let active = engine
            .list(
                &SickLeaveQuery {
                    status: Some(SickLeaveStatus::Active),
                    ..Default::default()
                },
                as_of,
            )
            .unwrap();
        assert_eq!(active.len(), 2);
        assert!(active[1].expires_soon);

        let pending_collection = engine
            .list(
                &SickLeaveQuery {
                    pending: Some(PendingStage::Collection),
                    ..Default::default()
                },
                as_of,
            )
            .unwrap();
        assert_eq!(pending_collection.len(), 1);
        assert_eq!(pending_collection[0].id, root.id);

        let january_general = engine
            .list(
                &SickLeaveQuery {
                    employee_id: Some("emp_001".to_string()),
                    illness_type: Some(IllnessType::GeneralIllness),
                    from: Some(date(2024, 1, 1)),
                    to: Some(date(2024, 1, 31)),
                    ..Default::default()
                },
                as_of,
            )
            .unwrap();
        let ids: Vec<Uuid> = january_general.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![extension.id, root.id]);
    }

    #[test]
    fn test_list_rejects_inverted_range() {
        let engine = create_test_engine();

        let result = engine.list(
            &SickLeaveQuery {
                from: Some(date(2024, 2, 1)),
                to: Some(date(2024, 1, 1)),
                ..Default::default()
            },
            date(2024, 1, 1),
        );

        match result {
            Err(EngineError::Validation { field, .. }) => assert_eq!(field, "from"),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_dashboard_counts() {
        let engine = create_test_engine();
        let root = create_root(&engine);
        transcribe(&engine, root.id);
        engine
            .create(new_sick_leave(date(2024, 1, 10), date(2024, 1, 20)), "hr_admin")
            .unwrap();

        let summary = engine.dashboard(date(2024, 1, 18)).unwrap();

        assert_eq!(summary.active, 1);
        assert_eq!(summary.pending_collection, 1);
        assert_eq!(summary.pending_collection_amount, dec("100005.00"));
        assert_eq!(summary.upcoming_expiry.len(), 1);
        assert_eq!(summary.sick_days_this_month, 16);
    }
}
