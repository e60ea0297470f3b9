use super::{get_json, PaperSource, SearchResultItem, SourceError, WorkMetadata, SEARCH_ROWS};
use async_trait::async_trait;
use serde::Deserialize;

pub const BASE_URL: &str = "https://api.crossref.org";

/// Search results only list this many authors per hit.
const SEARCH_AUTHOR_CAP: usize = 3;

pub struct CrossRefClient {
    client: reqwest::Client,
    base_url: String,
}

impl CrossRefClient {
    pub fn new(base_url: impl Into<String>, email: Option<&str>) -> Result<Self, SourceError> {
        let ua = match email {
            Some(e) => format!("scholar-cite/0.1 (mailto:{})", e),
            None => "scholar-cite/0.1".to_string(),
        };
        Ok(Self {
            client: super::build_client(&ua)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a single DOI to its full metadata record.
    pub async fn get_work(&self, doi: &str) -> Result<WorkMetadata, SourceError> {
        let doi = doi.trim();
        if doi.is_empty() {
            return Err(SourceError::InvalidInput("DOI is empty".into()));
        }
        tracing::debug!("Crossref lookup: {}", doi);
        let resp: CRWorkResponse =
            get_json(self.client.get(format!("{}/works/{}", self.base_url, doi_path(doi)))).await?;
        Ok(item_to_metadata(resp.message))
    }
}

/// Percent-encode each `/`-separated piece of a DOI so `?`, `#` and `%`
/// stay inside the path.
fn doi_path(doi: &str) -> String {
    doi.split('/')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Deserialize)]
struct CRSearchResponse {
    #[serde(default)]
    message: CRMessage,
}
#[derive(Deserialize, Default)]
struct CRMessage {
    #[serde(default)]
    items: Vec<CRItem>,
}
#[derive(Deserialize)]
struct CRWorkResponse {
    message: CRItem,
}
#[derive(Deserialize)]
struct CRItem {
    #[serde(rename = "DOI")]
    doi: Option<String>,
    title: Option<Vec<String>>,
    author: Option<Vec<CRAuthor>>,
    issued: Option<CRDate>,
    #[serde(rename = "container-title")]
    container_title: Option<Vec<String>>,
}
#[derive(Deserialize)]
struct CRAuthor {
    given: Option<String>,
    family: Option<String>,
}
#[derive(Deserialize)]
struct CRDate {
    #[serde(rename = "date-parts")]
    date_parts: Option<Vec<Vec<serde_json::Value>>>,
}

fn join_title(title: Option<Vec<String>>) -> String {
    title.unwrap_or_default().join(" ")
}

fn author_name(a: &CRAuthor) -> String {
    format!("{}, {}",
        a.family.as_deref().unwrap_or(""),
        a.given.as_deref().unwrap_or(""))
}

/// First element of the first `date-parts` row; null, missing or empty gives `None`.
fn issued_year(issued: Option<&CRDate>) -> Option<i32> {
    issued
        .and_then(|d| d.date_parts.as_ref())
        .and_then(|p| p.first())
        .and_then(|p| p.first())
        .and_then(|v| v.as_i64())
        .and_then(|y| i32::try_from(y).ok())
}

fn doi_url(doi: &str) -> String {
    format!("https://doi.org/{}", doi)
}

fn item_to_result(item: CRItem) -> SearchResultItem {
    let year = issued_year(item.issued.as_ref());
    let authors = item.author.as_deref().unwrap_or_default()
        .iter()
        .take(SEARCH_AUTHOR_CAP)
        .map(author_name)
        .collect();
    let doi = item.doi.unwrap_or_default();
    SearchResultItem {
        title: Some(join_title(item.title)),
        authors,
        year,
        url: doi_url(&doi),
        doi,
    }
}

fn item_to_metadata(item: CRItem) -> WorkMetadata {
    let year = issued_year(item.issued.as_ref());
    let authors = item.author.as_deref().unwrap_or_default()
        .iter()
        .map(author_name)
        .collect();
    let journal = item.container_title
        .and_then(|t| t.into_iter().next())
        .unwrap_or_default();
    let doi = item.doi.unwrap_or_default();
    WorkMetadata {
        title: join_title(item.title),
        authors,
        year,
        journal,
        url: doi_url(&doi),
        doi,
    }
}

#[async_trait]
impl PaperSource for CrossRefClient {
    fn name(&self) -> &str { "crossref" }

    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>, SourceError> {
        let rows = SEARCH_ROWS.to_string();
        tracing::debug!("Crossref search: {}", query);
        let resp: CRSearchResponse = get_json(self.client
            .get(format!("{}/works", self.base_url))
            .query(&[("query", query), ("rows", rows.as_str())]))
            .await?;
        Ok(resp.message.items.into_iter().map(item_to_result).collect())
    }
}
