pub mod crossref;
pub mod openalex;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Fixed per-call timeout for every upstream request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Number of hits requested from each search endpoint.
pub const SEARCH_ROWS: u32 = 5;

/// One hit from a search endpoint. Every key is always serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub doi: String,
    pub url: String,
}

/// Full metadata for a single work, the input of every citation format.
///
/// Deserialization is lenient so that search hits and hand-edited objects
/// coming back from the model can be fed to the formatters as well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkMetadata {
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_authors")]
    pub authors: Vec<String>,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub journal: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub doi: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub url: String,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[async_trait]
pub trait PaperSource: Send + Sync {
    fn name(&self) -> &str;
    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>, SourceError>;
}

/// Build the shared HTTP client used by the upstream clients.
pub fn build_client(user_agent: &str) -> Result<reqwest::Client, SourceError> {
    Ok(reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// GET `request`, fail on non-2xx, and decode the body as `T`.
pub(crate) async fn get_json<T>(request: reqwest::RequestBuilder) -> Result<T, SourceError>
where
    T: serde::de::DeserializeOwned,
{
    let resp = request.send().await?.error_for_status()?;
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| SourceError::Parse(e.to_string()))
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_authors<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `2021`, `"2021"`, `""` and `null`.
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawYear {
        Number(i64),
        Text(String),
    }

    match Option::<RawYear>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawYear::Number(n)) => i32::try_from(n)
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("year out of range: {}", n))),
        Some(RawYear::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(RawYear::Text(s)) => s
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid year: {}", s))),
    }
}
