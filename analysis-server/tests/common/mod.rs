//! Shared fixtures: a temp work dir with a fresh ledger database and cache file

#![allow(dead_code)]

use analysis_server::{Config, ServerState};
use shared::models::{AnalysisRequest, AnalysisType};
use sqlx::SqlitePool;
use tempfile::TempDir;

pub struct TestEnv {
    // Keeps the temp directory alive for the duration of the test
    pub dir: TempDir,
    pub state: ServerState,
}

impl TestEnv {
    pub fn pool(&self) -> &SqlitePool {
        &self.state.db.pool
    }
}

pub async fn setup() -> TestEnv {
    let dir = tempfile::tempdir().expect("create temp dir");
    let work_dir = dir.path().to_string_lossy().to_string();
    let config = Config::with_overrides(work_dir, 0);
    let state = ServerState::initialize(&config)
        .await
        .expect("initialize server state");
    TestEnv { dir, state }
}

pub async fn inbound(pool: &SqlitePool, supplier: &str, product: &str, quantity: i64, unit_price: f64, date: &str) {
    sqlx::query(
        "INSERT INTO inbound_records (supplier_code, product_model, quantity, unit_price, inbound_date) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(supplier)
    .bind(product)
    .bind(quantity)
    .bind(unit_price)
    .bind(date)
    .execute(pool)
    .await
    .expect("insert inbound row");
}

pub async fn outbound(pool: &SqlitePool, customer: &str, product: &str, quantity: i64, unit_price: f64, date: &str) {
    sqlx::query(
        "INSERT INTO outbound_records (customer_code, product_model, quantity, unit_price, outbound_date) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(customer)
    .bind(product)
    .bind(quantity)
    .bind(unit_price)
    .bind(date)
    .execute(pool)
    .await
    .expect("insert outbound row");
}

pub async fn partner(pool: &SqlitePool, code: &str, short_name: &str, full_name: &str, kind: i64) {
    sqlx::query("INSERT INTO partners (code, short_name, full_name, type) VALUES (?, ?, ?, ?)")
        .bind(code)
        .bind(short_name)
        .bind(full_name)
        .bind(kind)
        .execute(pool)
        .await
        .expect("insert partner");
}

pub async fn product(pool: &SqlitePool, code: &str, model: &str) {
    sqlx::query("INSERT INTO products (code, product_model) VALUES (?, ?)")
        .bind(code)
        .bind(model)
        .execute(pool)
        .await
        .expect("insert product");
}

/// January 2024 outbound request
pub fn sales_request(customer: Option<&str>, product: Option<&str>) -> AnalysisRequest {
    AnalysisRequest {
        start_date: Some("2024-01-01".into()),
        end_date: Some("2024-01-31".into()),
        customer_code: customer.map(Into::into),
        supplier_code: None,
        product_model: product.map(Into::into),
        analysis_type: AnalysisType::Outbound,
    }
}

/// January 2024 inbound request
pub fn purchase_request(supplier: Option<&str>, product: Option<&str>) -> AnalysisRequest {
    AnalysisRequest {
        start_date: Some("2024-01-01".into()),
        end_date: Some("2024-01-31".into()),
        customer_code: None,
        supplier_code: supplier.map(Into::into),
        product_model: product.map(Into::into),
        analysis_type: AnalysisType::Inbound,
    }
}
