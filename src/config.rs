use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::apis::{crossref, openalex};

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_LLM_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_TEMPERATURE: f64 = 0.2;
pub const DEFAULT_MAX_STEPS: usize = 6;
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub llm_url: String,
    pub temperature: f64,
    pub max_steps: usize,
    pub bind: SocketAddr,
    pub openalex_url: String,
    pub crossref_url: String,
    pub openalex_email: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_var)
    }

    /// Build the configuration from any variable source. Blank values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env_opt = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let temperature = match env_opt("SCHOLAR_CITE_TEMPERATURE") {
            Some(t) => t.parse().with_context(|| format!("Invalid SCHOLAR_CITE_TEMPERATURE: {}", t))?,
            None => DEFAULT_TEMPERATURE,
        };
        let max_steps = match env_opt("SCHOLAR_CITE_MAX_STEPS") {
            Some(n) => n.parse().with_context(|| format!("Invalid SCHOLAR_CITE_MAX_STEPS: {}", n))?,
            None => DEFAULT_MAX_STEPS,
        };
        let bind = env_opt("SCHOLAR_CITE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind.parse().with_context(|| format!("Invalid SCHOLAR_CITE_BIND: {}", bind))?;

        Ok(Self {
            api_key: env_opt(API_KEY_VAR),
            model: env_opt("SCHOLAR_CITE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_url: env_opt("SCHOLAR_CITE_LLM_URL").unwrap_or_else(|| DEFAULT_LLM_URL.to_string()),
            temperature,
            max_steps,
            bind,
            openalex_url: env_opt("SCHOLAR_CITE_OPENALEX_URL")
                .unwrap_or_else(|| openalex::BASE_URL.to_string()),
            crossref_url: env_opt("SCHOLAR_CITE_CROSSREF_URL")
                .unwrap_or_else(|| crossref::BASE_URL.to_string()),
            openalex_email: env_opt("OPENALEX_EMAIL"),
        })
    }

    /// Point every upstream (LLM, OpenAlex, Crossref) at one mock server.
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            api_key: Some("test-key".to_string()),
            model: DEFAULT_MODEL.to_string(),
            llm_url: base_url.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_steps: DEFAULT_MAX_STEPS,
            bind: SocketAddr::from(([127, 0, 0, 1], 0)),
            openalex_url: base_url.to_string(),
            crossref_url: base_url.to_string(),
            openalex_email: None,
        }
    }
}

/// Load `path` into the process environment. Variables already set win.
pub fn load_env_file(path: &Path) -> Result<PathBuf> {
    dotenvy::from_path(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(path.to_path_buf())
}

/// Parse `path` without touching the process environment.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let entries = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    entries
        .map(|entry| entry.with_context(|| format!("Failed to parse {}", path.display())))
        .collect()
}

pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
