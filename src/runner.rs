//! Startup checks run before the web UI is launched.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{self, Config, API_KEY_VAR};

#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("{} not found.\nCreate a {} with:\n{}=your_groq_key", .0.display(), .0.display(), API_KEY_VAR)]
    MissingEnvFile(PathBuf),
    #[error("{0}")]
    EnvFile(anyhow::Error),
    #[error("{0}")]
    Config(anyhow::Error),
    #[error("{} is not set in {}", API_KEY_VAR, .0.display())]
    MissingApiKey(PathBuf),
}

/// Require the credential file, load it, and require the API key.
///
/// Each passed check is reported through `report` so the caller decides
/// how diagnostics are shown.
pub fn preflight(env_file: &Path, report: impl FnMut(&str)) -> Result<Config, PreflightError> {
    preflight_with(env_file, config::env_var, report)
}

/// [`preflight`] with the process environment supplied by `env`. Variables
/// already set there win over the file.
pub fn preflight_with(
    env_file: &Path,
    env: impl Fn(&str) -> Option<String>,
    mut report: impl FnMut(&str),
) -> Result<Config, PreflightError> {
    if !env_file.is_file() {
        return Err(PreflightError::MissingEnvFile(env_file.to_path_buf()));
    }
    let from_file = config::read_env_file(env_file).map_err(PreflightError::EnvFile)?;
    report(&format!("{} found", env_file.display()));

    let config = Config::from_lookup(|name| env(name).or_else(|| from_file.get(name).cloned()))
        .map_err(PreflightError::Config)?;
    if config.api_key.is_none() {
        return Err(PreflightError::MissingApiKey(env_file.to_path_buf()));
    }
    report(&format!("{} is set", API_KEY_VAR));
    Ok(config)
}
