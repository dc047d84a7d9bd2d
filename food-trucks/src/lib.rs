pub mod geocoder;
pub mod models;
pub mod nearest;
pub mod seed;

use std::path::{Path, PathBuf};
use std::pin::Pin;

use sqlx::SqlitePool;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub use geocoder::{GeocodeError, Geocoder, NominatimClient};
pub use models::food_trucks::{FoodTruck, FoodTrucks, StoreError};
pub use nearest::{Coordinate, DEFAULT_CLOSEST, Located, find_closest, geodesic_distance_km};
use seed::{PERMIT_CSV_URL, SeedError};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(
        "Seed file {} not found and no database exists yet. Download it from {} and place it there.",
        .0.display(),
        PERMIT_CSV_URL
    )]
    MissingSeed(PathBuf),

    #[error("Failed to seed the database: {0}")]
    Seed(#[from] SeedError),

    #[error("Failed to migrate the database: {0}")]
    Migrate(#[from] MigrateError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to remove partially seeded database: {0}")]
    Cleanup(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub database_path: PathBuf,
    pub seed_csv_path: PathBuf,
    pub max_connections: u32,
}

/// Opens the food truck store, creating and seeding it from the permit export on first run.
///
/// A new store that fails to migrate or seed is deleted again so the next start retries from
/// scratch.
#[tracing::instrument(skip_all, fields(database = %options.database_path.display()))]
pub async fn open_store(options: &StoreOptions) -> Result<SqlitePool, StartupError> {
    open_store_with(options, &MIGRATOR).await
}

async fn open_store_with(
    options: &StoreOptions,
    migrator: &Migrator,
) -> Result<SqlitePool, StartupError> {
    let fresh = !options.database_path.exists();

    if fresh && !options.seed_csv_path.exists() {
        return Err(StartupError::MissingSeed(options.seed_csv_path.clone()));
    }

    let connect_options = SqliteConnectOptions::new()
        .filename(&options.database_path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(options.max_connections)
        .connect_with(connect_options)
        .await?;

    if !fresh {
        migrator.run(&pool).await?;
        tracing::info!("using existing database");
        return Ok(pool);
    }

    tracing::info!(seed = %options.seed_csv_path.display(), "creating database from permit export");
    if let Err(e) = initialise_store(&pool, migrator, &options.seed_csv_path).await {
        tracing::error!(error = %e, "database setup failed, removing database");
        pool.close().await;
        std::fs::remove_file(&options.database_path)?;
        return Err(e);
    }

    Ok(pool)
}

/// Migrates and seeds a freshly created store. Any error leaves the file for the caller to remove.
async fn initialise_store(
    pool: &SqlitePool,
    migrator: &Migrator,
    csv_path: &Path,
) -> Result<u64, StartupError> {
    migrator.run(pool).await?;

    let mut tx = pool.begin().await?;
    let inserted = seed::seed_from_csv(tx.as_mut(), csv_path).await?;
    tx.commit().await?;

    Ok(inserted)
}

/// A migrated store living only as long as the returned pool.
///
/// Every connection to `sqlite::memory:` is its own database, so the pool is held to a single,
/// never-recycled connection.
pub async fn open_in_memory() -> Result<SqlitePool, StartupError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}
