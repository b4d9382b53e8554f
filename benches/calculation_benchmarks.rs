//! Performance benchmarks for the sick-leave engine.
//!
//! Covers the pure calculations (day split, chain evaluation, report
//! aggregation) and the HTTP registration path end to end.
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use chrono::{Duration, NaiveDate, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;
use uuid::Uuid;

use sick_leave_engine::api::{create_router, AppState};
use sick_leave_engine::calculation::{calculate_day_split, evaluate_record, RecordArena};
use sick_leave_engine::config::{BandSchedule, ConfigLoader};
use sick_leave_engine::lifecycle::SickLeaveEngine;
use sick_leave_engine::models::{IllnessType, ReportQuery, SickLeaveRecord, SickLeaveStatus};
use sick_leave_engine::report::{aggregate_reimbursement, EvaluatedRecord};
use sick_leave_engine::storage::{InMemoryRepository, InMemorySalaryDirectory};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn create_salaries(employees: usize) -> InMemorySalaryDirectory {
    (0..employees).fold(InMemorySalaryDirectory::new(), |salaries, i| {
        salaries.with_salary(
            &format!("emp_{:04}", i),
            date(2020, 1, 1),
            Decimal::from(1_500_000 + 10_000 * i as i64),
        )
    })
}

fn create_record(
    employee_id: &str,
    start: NaiveDate,
    days: i64,
    previous: Option<Uuid>,
) -> SickLeaveRecord {
    SickLeaveRecord {
        id: Uuid::new_v4(),
        record_number: String::new(),
        employee_id: employee_id.to_string(),
        leave_request_origin_id: None,
        previous_sick_leave_id: previous,
        start_date: start,
        end_date: start + Duration::days(days - 1),
        issue_date: start,
        diagnosis_code: None,
        diagnosis_description: "Influenza".to_string(),
        illness_type: IllnessType::GeneralIllness,
        issuing_entity: "IPS Central".to_string(),
        paying_entity: Some("EPS Sura".to_string()),
        status: SickLeaveStatus::Active,
        transcription_date: None,
        file_number: None,
        collection_date: None,
        amount_paid: None,
        notes: None,
        document_paths: vec![],
        created_by: "bench".to_string(),
        created_at: Utc::now(),
        revision: 0,
    }
}

/// A contiguous chain of `links` records of `days` days each.
fn create_chain(links: usize, days: i64) -> Vec<SickLeaveRecord> {
    let mut records: Vec<SickLeaveRecord> = Vec::with_capacity(links);
    let mut start = date(2024, 1, 1);
    for _ in 0..links {
        let previous = records.last().map(|r| r.id);
        let record = create_record("emp_0000", start, days, previous);
        start = record.end_date + Duration::days(1);
        records.push(record);
    }
    records
}

/// Benchmark: day split for records at various episode positions.
fn bench_day_split(c: &mut Criterion) {
    let schedule = BandSchedule::statutory(date(2024, 1, 1));
    let mut group = c.benchmark_group("day_split");

    for prior in [0u32, 85, 175] {
        group.bench_with_input(BenchmarkId::new("prior_days", prior), &prior, |b, prior| {
            b.iter(|| {
                calculate_day_split(
                    black_box(IllnessType::GeneralIllness),
                    black_box(10),
                    black_box(*prior),
                    &schedule,
                    2,
                )
            })
        });
    }

    group.finish();
}

/// Benchmark: evaluating the last record of chains of increasing length.
fn bench_chain_evaluation(c: &mut Criterion) {
    let config = ConfigLoader::statutory();
    let salaries = create_salaries(1);
    let mut group = c.benchmark_group("chain_evaluation");

    for links in [1usize, 4, 16, 64] {
        let records = create_chain(links, 10);
        let arena = RecordArena::new(&records);
        let Some(last) = records.last() else {
            continue;
        };

        group.throughput(Throughput::Elements(links as u64));
        group.bench_with_input(BenchmarkId::new("links", links), &links, |b, _| {
            b.iter(|| evaluate_record(black_box(last), |id| arena.get(id), &config, &salaries))
        });
    }

    group.finish();
}

/// Benchmark: monthly report over 1000 evaluated records.
fn bench_report_aggregation(c: &mut Criterion) {
    let config = ConfigLoader::statutory();
    let salaries = create_salaries(100);

    let records: Vec<SickLeaveRecord> = (0..1000)
        .map(|i| {
            let mut record = create_record(
                &format!("emp_{:04}", i % 100),
                date(2024, 1, 1) + Duration::days(i64::from(i % 28)),
                3 + i64::from(i % 20),
                None,
            );
            if i % 2 == 0 {
                record.paying_entity = Some("EPS Sanitas".to_string());
            }
            record
        })
        .collect();
    let arena = RecordArena::new(&records);
    let evaluated: Vec<EvaluatedRecord> = records
        .iter()
        .filter_map(|record| {
            evaluate_record(record, |id| arena.get(id), &config, &salaries)
                .ok()
                .map(|evaluation| EvaluatedRecord {
                    record: record.clone(),
                    figures: evaluation.figures,
                })
        })
        .collect();
    let query = ReportQuery {
        year: 2024,
        month: 1,
        paying_entity: None,
    };

    let mut group = c.benchmark_group("report");
    group.throughput(Throughput::Elements(evaluated.len() as u64));
    group.bench_function("aggregate_1000", |b| {
        b.iter(|| aggregate_reimbursement(black_box(&query), black_box(&evaluated)))
    });
    group.finish();
}

/// Benchmark: POST /sick-leaves through the router.
fn bench_http_registration(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let config = ConfigLoader::load("./config/co_sick_leave").expect("Failed to load config");
    let state = AppState::new(SickLeaveEngine::new(
        InMemoryRepository::new(),
        create_salaries(1),
        config,
    ));
    let router = create_router(state);
    let body = serde_json::json!({
        "employee_id": "emp_0000",
        "start_date": "2024-01-01",
        "end_date": "2024-01-05",
        "issue_date": "2024-01-01",
        "diagnosis_description": "Influenza",
        "illness_type": "general_illness",
        "issuing_entity": "IPS Central",
        "paying_entity": "EPS Sura",
        "performed_by": "bench"
    })
    .to_string();

    c.bench_function("http_register", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/sick-leaves")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_day_split,
    bench_chain_evaluation,
    bench_report_aggregation,
    bench_http_registration,
);
criterion_main!(benches);
