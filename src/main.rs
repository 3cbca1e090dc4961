use std::env;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use payroll_withholding::api::{AppState, create_router};
use payroll_withholding::config::{EngineConfig, TaxTables};
use payroll_withholding::engine::SymmetryEngine;
use payroll_withholding::store::InMemoryStore;
use payroll_withholding::withholding::WithholdingService;

const ENV_TAX_TABLES: &str = "PAYROLL_TAX_TABLES";
const ENV_SEED_FILE: &str = "PAYROLL_SEED_FILE";
const ENV_BIND_ADDR: &str = "PAYROLL_BIND_ADDR";

const DEFAULT_TAX_TABLES: &str = "./config/tax_tables";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Initialise the tracing subscriber, honouring `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let tables_path = env::var(ENV_TAX_TABLES).unwrap_or_else(|_| DEFAULT_TAX_TABLES.to_string());
    let tables = TaxTables::load(&tables_path)
        .with_context(|| format!("loading tax tables from {}", tables_path))?;
    info!(path = %tables_path, years = ?tables.years(), "Tax tables loaded");

    let store = match env::var(ENV_SEED_FILE) {
        Ok(path) => InMemoryStore::from_seed_file(&path)
            .with_context(|| format!("loading worker seed file {}", path))?,
        Err(_) => {
            warn!("{} not set, starting with an empty worker store", ENV_SEED_FILE);
            InMemoryStore::new()
        }
    };

    let engine = SymmetryEngine::new(EngineConfig::from_env());
    if engine.is_configured() {
        info!(
            environment = engine.config().environment.as_str(),
            "External tax engine configured"
        );
    } else {
        warn!("External tax engine not configured, using internal calculators only");
    }

    let service = WithholdingService::with_store(
        Arc::new(store),
        Arc::new(engine),
        Arc::new(tables),
    );
    let router = create_router(AppState::new(service));

    let bind_addr = env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;
    info!(addr = %bind_addr, "Payroll withholding service listening");

    axum::serve(listener, router).await?;

    Ok(())
}
