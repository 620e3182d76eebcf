//! Runtime configuration for the mock backend.

use std::{env, path::PathBuf, time::Duration};

use tracing::{info, warn};

/// Default location on disk for the persisted key-value blob.
const DEFAULT_STORAGE_PATH: &str = "data/boardhub.json";
/// Environment variable that overrides [`DEFAULT_STORAGE_PATH`].
const STORAGE_PATH_ENV: &str = "BOARDHUB_STORAGE_PATH";
/// Environment variable that overrides the simulated latency, in milliseconds.
const LATENCY_ENV: &str = "BOARDHUB_LATENCY_MS";
/// Fixed artificial delay applied to store operations by default.
const DEFAULT_LATENCY_MS: u64 = 200;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Where the key-value blob lives on disk.
    pub storage_path: PathBuf,
    /// Simulated network delay added to every store operation.
    pub latency: Duration,
}

impl AppConfig {
    /// Load the configuration from the environment, falling back to defaults.
    pub fn load() -> Self {
        let storage_path = env::var_os(STORAGE_PATH_ENV)
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH));

        let latency = match env::var(LATENCY_ENV) {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(err) => {
                    warn!(
                        value = %raw,
                        error = %err,
                        "invalid latency override; using default"
                    );
                    Duration::from_millis(DEFAULT_LATENCY_MS)
                }
            },
            Err(_) => Duration::from_millis(DEFAULT_LATENCY_MS),
        };

        info!(
            path = %storage_path.display(),
            latency = ?latency,
            "loaded mock backend configuration"
        );

        Self {
            storage_path,
            latency,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            latency: Duration::from_millis(DEFAULT_LATENCY_MS),
        }
    }
}
