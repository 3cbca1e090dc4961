//! Performance benchmarks for the payroll withholding engine.
//!
//! This benchmark suite verifies that the calculation engine meets performance targets:
//! - Bracket walk: < 5μs mean
//! - Internal pipeline for one pay event: < 100μs mean
//! - Single HTTP calculation: < 1ms mean
//! - Batch of 100 pay events: < 100ms mean
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use payroll_withholding::api::{AppState, create_router};
use payroll_withholding::calculation::{apply_brackets, compute_internal_withholding};
use payroll_withholding::config::TaxTables;
use payroll_withholding::engine::DisabledEngine;
use payroll_withholding::models::{FilingStatus, PayEvent, PayFrequency, TaxProfile};
use payroll_withholding::store::InMemoryStore;
use payroll_withholding::withholding::WithholdingService;

use axum::{body::Body, http::Request};
use tower::ServiceExt;

fn load_tables() -> TaxTables {
    TaxTables::load("./config/tax_tables").expect("Failed to load tax tables")
}

/// Creates a test state backed by the seeded workers and no external engine.
fn create_test_state() -> AppState {
    let store =
        InMemoryStore::from_seed_file("./config/workers.yaml").expect("Failed to load workers");
    AppState::new(WithholdingService::with_store(
        Arc::new(store),
        Arc::new(DisabledEngine),
        Arc::new(load_tables()),
    ))
}

fn pay_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
}

fn request_body(employee_id: &str, gross_pay: u32) -> serde_json::Value {
    serde_json::json!({
        "employeeId": employee_id,
        "grossPay": gross_pay,
        "payPeriod": "biweekly",
        "payDate": "2024-06-14"
    })
}

/// Benchmark: Bracket walk across income levels.
///
/// Target: < 5μs mean
fn bench_brackets(c: &mut Criterion) {
    let tables = load_tables();
    let rows = tables.federal_brackets(2024, FilingStatus::Single);

    let mut group = c.benchmark_group("apply_brackets");

    for income in ["12000", "52000", "250000", "1000000"] {
        let income_dec = Decimal::from_str(income).unwrap();
        group.bench_with_input(BenchmarkId::new("income", income), &income_dec, |b, income| {
            b.iter(|| black_box(apply_brackets(black_box(*income), rows)))
        });
    }

    group.finish();
}

/// Benchmark: Full internal pipeline for one pay event.
///
/// Target: < 100μs mean
fn bench_internal_pipeline(c: &mut Criterion) {
    let tables = load_tables();

    let mut profile = TaxProfile::new("emp_bench", FilingStatus::HeadOfHousehold, "CA");
    profile.w4_step2_checkbox = true;
    profile.w4_dependents_amount = Decimal::from(2000);
    let event = PayEvent::new(Decimal::from(3000), PayFrequency::Biweekly, pay_date());

    c.bench_function("internal_pipeline", |b| {
        b.iter(|| black_box(compute_internal_withholding(&profile, &event, &tables)))
    });
}

/// Benchmark: Single calculation through the HTTP API.
///
/// Target: < 1ms mean
fn bench_single_calculation(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(create_test_state());
    let body = request_body("emp_001", 2000).to_string();

    c.bench_function("single_calculation", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/calculate-tax-withholdings")
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

/// Benchmark: Batch of 100 pay events across the seeded workers.
///
/// Target: < 100ms mean
fn bench_batch_100(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(create_test_state());

    let employees = ["emp_001", "emp_002", "emp_003"];
    let requests: Vec<serde_json::Value> = (0..100u32)
        .map(|i| request_body(employees[i as usize % employees.len()], 1000 + i * 50))
        .collect();
    let body = serde_json::json!({ "requests": requests }).to_string();

    let mut group = c.benchmark_group("batch_processing");
    group.throughput(Throughput::Elements(100));
    group.sample_size(20);

    group.bench_function("batch_100", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/calculate-tax-withholdings/batch")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_brackets,
    bench_internal_pipeline,
    bench_single_calculation,
    bench_batch_100,
);
criterion_main!(benches);
