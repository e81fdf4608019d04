use std::path::Path;

use tracing::{info, warn};

use crate::error::AppError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://fitness_tracker.db?mode=rwc";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Outcome of reading one layered env file.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvFile {
    Loaded(&'static str),
    Missing(&'static str),
}

/// Loads the env files for the current `ROCKET_PROFILE`, later files
/// overriding earlier ones. Runs before the subscriber exists, so the
/// outcome is returned for `report_environment` to log.
pub fn load_environment() -> Result<Vec<EnvFile>, dotenvy::Error> {
    let is_production =
        dotenvy::var("ROCKET_PROFILE").unwrap_or("development".to_string()) == "production";

    let env_files = if is_production {
        ["config/common.env", "config/prod.env", ".secrets.env"]
    } else {
        ["config/common.env", "config/dev.env", ".secrets.env"]
    };

    env_files.into_iter().map(load_env_file).collect()
}

fn load_env_file(path: &'static str) -> Result<EnvFile, dotenvy::Error> {
    if !Path::new(path).exists() {
        return Ok(EnvFile::Missing(path));
    }

    dotenvy::from_filename_override(path)?;
    Ok(EnvFile::Loaded(path))
}

pub fn report_environment(files: &[EnvFile]) {
    for file in files {
        match file {
            EnvFile::Loaded(path) => info!("Loaded environment from: {}", path),
            EnvFile::Missing(path) => {
                warn!("Warning: Environment file {} not found, skipping", path)
            }
        }
    }
}

/// Where the store lives and how many connections the pool may open.
#[derive(Debug, Clone, PartialEq)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl DbConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url =
            dotenvy::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let max_connections = match dotenvy::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw.trim().parse::<u32>().map_err(|e| {
                AppError::Internal(format!(
                    "DATABASE_MAX_CONNECTIONS must be a positive integer, got '{}': {}",
                    raw, e
                ))
            })?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        if max_connections == 0 {
            return Err(AppError::Internal(
                "DATABASE_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            max_connections,
        })
    }
}
