use std::env::VarError;
use std::fmt::Debug;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use food_trucks::StoreOptions;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store: StoreOptions,
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
    pub geocoder_timeout: Duration,
}

impl Config {
    /// Reads the process environment, honoring a `.env` file.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| dotenvy::var(key))
    }

    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Result<String, dotenvy::Error>,
    {
        let timeout_secs: u64 = try_load(&var, "GEOCODER_TIMEOUT_SECS", 10)?;

        Ok(Self {
            port: try_load(&var, "PORT", 8000)?,
            store: StoreOptions {
                database_path: try_load(&var, "DATABASE_PATH", PathBuf::from("food_trucks.db"))?,
                seed_csv_path: try_load(
                    &var,
                    "SEED_CSV_PATH",
                    PathBuf::from("./data/Mobile_Food_Facility_Permit.csv"),
                )?,
                max_connections: try_load(&var, "DATABASE_MAX_CONNECTIONS", 5)?,
            },
            geocoder_url: try_load(
                &var,
                "GEOCODER_URL",
                "https://nominatim.openstreetmap.org".to_string(),
            )?,
            geocoder_user_agent: try_load(&var, "GEOCODER_USER_AGENT", "address_finder".to_string())?,
            geocoder_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn try_load<F, T>(var: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Result<String, dotenvy::Error>,
    T: FromStr + Debug,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key} value `{raw}`")),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => {
            tracing::info!("{key} not set, using default: {default:?}");
            Ok(default)
        }
        Err(e) => Err(e).with_context(|| format!("failed to read {key}")),
    }
}
