use std::{env, fmt::Display, fs::read_to_string, path::PathBuf, str::FromStr};

use anyhow::{Result, anyhow};
use tracing::{info, warn};

const DEFAULT_PORT: &str = "8000";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_CSV_FILE_PATH: &str = "data/car_data.csv";
const DEFAULT_MODEL_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_PREDICTION_STORE: &str = "redis";
const DEFAULT_PREDICTIONS_KEY: &str = "predictions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Redis,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreKind::Redis),
            "memory" => Ok(StoreKind::Memory),
            other => Err(format!("unknown store '{other}', expected 'redis' or 'memory'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub redis_url: String,
    pub csv_path: PathBuf,
    pub model_url: String,
    pub store: StoreKind,
    pub predictions_key: String,
}

impl Config {
    /// Reads `.env` if present, then the process environment.
    pub fn load() -> Result<Self> {
        match optional_env_file(dotenvy::dotenv()) {
            Ok(Some(path)) => info!("Loaded environment from {}", path.display()),
            Ok(None) => {}
            Err(e) => warn!("Ignoring .env file: {e}"),
        }

        let redis_url = match read_secret("REDIS_URL") {
            Some(url) => url,
            None => try_load("REDIS_URL", DEFAULT_REDIS_URL)?,
        };

        Ok(Self {
            port: try_load("PORT", DEFAULT_PORT)?,
            redis_url,
            csv_path: try_load("CSV_FILE_PATH", DEFAULT_CSV_FILE_PATH)?,
            model_url: try_load("MODEL_URL", DEFAULT_MODEL_URL)?,
            store: try_load("PREDICTION_STORE", DEFAULT_PREDICTION_STORE)?,
            predictions_key: try_load("PREDICTIONS_KEY", DEFAULT_PREDICTIONS_KEY)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            csv_path: PathBuf::from(DEFAULT_CSV_FILE_PATH),
            model_url: DEFAULT_MODEL_URL.to_string(),
            store: StoreKind::Redis,
            predictions_key: DEFAULT_PREDICTIONS_KEY.to_string(),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    parse(key, &raw)
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: Display,
{
    raw.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow!("Environment misconfigured: invalid {key} value '{raw}': {e}")
    })
}

// A missing `.env` is normal, anything else (unreadable, bad syntax) is reported.
fn optional_env_file<T>(loaded: dotenvy::Result<T>) -> dotenvy::Result<Option<T>> {
    match loaded {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

// Docker secrets win over plain environment variables.
fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path).ok().map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::{NamedTempFile, tempdir};

    use super::*;

    #[test]
    fn test_store_kind() {
        assert_eq!("redis".parse::<StoreKind>().unwrap(), StoreKind::Redis);
        assert_eq!(" Memory ".parse::<StoreKind>().unwrap(), StoreKind::Memory);
        assert!("mongo".parse::<StoreKind>().is_err());
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse::<u16>("PORT", "8080").unwrap(), 8080);
        assert!(parse::<u16>("PORT", "eighty").is_err());
        assert!(parse::<u16>("PORT", "70000").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.port, 8000);
        assert_eq!(config.store, StoreKind::Redis);
        assert_eq!(config.csv_path, PathBuf::from("data/car_data.csv"));
    }

    #[test]
    fn test_missing_env_file_is_silent() {
        let dir = tempdir().unwrap();

        let loaded = optional_env_file(dotenvy::from_path(dir.path().join(".env")));

        assert!(matches!(loaded, Ok(None)));
    }

    #[test]
    fn test_malformed_env_file_is_reported() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this line has no assignment").unwrap();

        let loaded = optional_env_file(dotenvy::from_path(file.path()));

        assert!(matches!(loaded, Err(dotenvy::Error::LineParse(..))));
    }
}
