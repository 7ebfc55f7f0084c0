//! Relief intake - load and expiry sweep
//!
//! Opens a session against the configured database, removes expired water
//! allocations, loads the registry and reports what was found.
//!
//! # Usage
//!
//! ```bash
//! RELIEF_DATABASE_URL=postgres://... cargo run --bin relief-sweep
//! ```
//!
//! # Environment Variables
//!
//! * `RELIEF_DATABASE_URL` - PostgreSQL connection string
//! * `RELIEF_MAX_CONNECTIONS` - Pool size (default: 1)
//! * `RELIEF_FAILURE_LOG` - Failure log path (default: relief-failures.log)
//! * `RELIEF_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)

use std::sync::Arc;

use anyhow::Context;
use core_kernel::{HealthCheckable, SystemClock};
use domain_relief::ReliefRegistry;
use infra_db::{
    create_pool, run_migrations, FailureLog, PersistenceGateway, PostgresReliefStore, ReliefConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = ReliefConfig::from_env().context("loading configuration")?;
    init_tracing(&config.log_level);

    tracing::info!(failure_log = %config.failure_log.display(), "Starting relief sweep");

    let pool = create_pool(config.database())
        .await
        .context("connecting to database")?;
    run_migrations(&pool).await.context("applying migrations")?;

    let store = PostgresReliefStore::new(pool);
    let health = store.health_check().await;
    if !health.is_healthy() {
        anyhow::bail!(
            "database unhealthy: {}",
            health.message.unwrap_or_default()
        );
    }

    let clock = Arc::new(SystemClock);
    let mut gateway = PersistenceGateway::new(
        store,
        FailureLog::with_clock(config.failure_log.clone(), clock.clone()),
        clock.clone(),
    );

    let mut registry = ReliefRegistry::new(clock);
    let report = gateway.load_into(&mut registry).await;

    tracing::info!(
        expired_allocations_removed = report.expired_allocations_removed,
        locations = report.locations,
        persons = report.persons,
        family_groups = registry.family_groups().count(),
        supplies = report.supplies,
        unplaced_stock = registry.stock().len(),
        medical_records = report.medical_records,
        inquiries = report.inquiries,
        "Registry loaded"
    );
    for orphan in &report.orphans {
        tracing::warn!(%orphan, "Orphaned row");
    }

    gateway.close().await;
    Ok(())
}

/// Initializes the tracing subscriber
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
