use super::{get_json, PaperSource, SearchResultItem, SourceError, SEARCH_ROWS};
use async_trait::async_trait;
use serde::Deserialize;

pub const BASE_URL: &str = "https://api.openalex.org";

pub struct OpenAlexClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAlexClient {
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
}

#[derive(Deserialize)]
struct OAResponse {
    #[serde(default)]
    results: Vec<OAWork>,
}

#[derive(Deserialize)]
struct OAWork {
    title: Option<String>,
    authorships: Option<Vec<OAAuthorship>>,
    publication_year: Option<i32>,
    doi: Option<String>,
    primary_location: Option<OALocation>,
}

#[derive(Deserialize)]
struct OAAuthorship {
    author: OAAuthor,
}
#[derive(Deserialize)]
struct OAAuthor {
    display_name: Option<String>,
}
#[derive(Deserialize)]
struct OALocation {
    landing_page_url: Option<String>,
}

// The DOI is kept in the https://doi.org/ form OpenAlex returns.
fn oa_to_item(w: OAWork) -> SearchResultItem {
    SearchResultItem {
        title: w.title,
        authors: w
            .authorships
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| a.author.display_name)
            .collect(),
        year: w.publication_year,
        doi: w.doi.unwrap_or_default(),
        url: w
            .primary_location
            .and_then(|l| l.landing_page_url)
            .unwrap_or_default(),
    }
}

#[async_trait]
impl PaperSource for OpenAlexClient {
    fn name(&self) -> &str { "openalex" }

    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>, SourceError> {
        let per_page = SEARCH_ROWS.to_string();
        tracing::debug!("OpenAlex search: {}", query);
        let resp: OAResponse = get_json(self.client
            .get(format!("{}/works", self.base_url))
            .query(&[
                ("search", query),
                ("per_page", per_page.as_str()),
                ("sort", "relevance_score:desc"),
            ]))
            .await?;
        Ok(resp.results.into_iter().map(oa_to_item).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
      "meta": {"count": 2},
      "results": [
        {
          "id": "https://openalex.org/W1",
          "title": "Graph Neural Networks in Healthcare",
          "publication_year": 2021,
          "doi": "https://doi.org/10.1234/gnn",
          "primary_location": {"landing_page_url": "https://example.org/gnn"},
          "authorships": [
            {"author": {"display_name": "Ada Lovelace"}},
            {"author": {"display_name": null}},
            {"author": {"display_name": "Alan Turing"}}
          ]
        },
        {
          "id": "https://openalex.org/W2",
          "title": null,
          "publication_year": null,
          "doi": null,
          "primary_location": null
        }
      ]
    }"#;

    #[test]
    fn test_parse_openalex_results() {
        let resp: OAResponse = serde_json::from_str(SAMPLE).unwrap();
        let items: Vec<_> = resp.results.into_iter().map(oa_to_item).collect();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.title.as_deref(), Some("Graph Neural Networks in Healthcare"));
        assert_eq!(first.authors, vec!["Ada Lovelace", "Alan Turing"]);
        assert_eq!(first.year, Some(2021));
        assert_eq!(first.doi, "https://doi.org/10.1234/gnn");
        assert_eq!(first.url, "https://example.org/gnn");

        let second = &items[1];
        assert_eq!(second.title, None);
        assert!(second.authors.is_empty());
        assert_eq!(second.year, None);
        assert_eq!(second.doi, "");
        assert_eq!(second.url, "");
    }

    #[test]
    fn test_missing_results_is_empty() {
        let resp: OAResponse = serde_json::from_str(r#"{"meta": {}}"#).unwrap();
        assert!(resp.results.is_empty());
    }
}
