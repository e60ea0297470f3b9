//! The tools the model may call, their text contracts, and dispatch by name.
//!
//! Every tool resolves to a [`ToolOutcome`]. Successful fetches render as the
//! bare JSON payload, citation tools as the citation text, and every failure
//! as `{"error": "<message>"}`.

use std::fmt::Display;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::apis::crossref::CrossRefClient;
use crate::apis::openalex::OpenAlexClient;
use crate::apis::{PaperSource, SearchResultItem, SourceError, WorkMetadata};
use crate::citation::CitationFormat;
use crate::config::Config;

/// Discriminated result shared by every tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolOutcome<T> {
    Ok(T),
    Error(String),
}

impl<T> ToolOutcome<T> {
    pub fn is_error(&self) -> bool {
        matches!(self, ToolOutcome::Error(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ToolOutcome<U> {
        match self {
            ToolOutcome::Ok(v) => ToolOutcome::Ok(f(v)),
            ToolOutcome::Error(e) => ToolOutcome::Error(e),
        }
    }

    /// Render the text handed back to the model.
    pub fn into_text_with(self, render: impl FnOnce(T) -> String) -> String {
        match self {
            ToolOutcome::Ok(v) => render(v),
            ToolOutcome::Error(e) => error_json(&e),
        }
    }
}

impl ToolOutcome<String> {
    pub fn into_text(self) -> String {
        self.into_text_with(|s| s)
    }
}

impl<T, E: Display> From<Result<T, E>> for ToolOutcome<T> {
    fn from(r: Result<T, E>) -> Self {
        match r {
            Ok(v) => ToolOutcome::Ok(v),
            Err(e) => ToolOutcome::Error(e.to_string()),
        }
    }
}

pub fn error_json(message: &str) -> String {
    json!({ "error": message }).to_string()
}

fn pretty<T: Serialize>(value: &T) -> ToolOutcome<String> {
    serde_json::to_string_pretty(value).into()
}

// ── Tool arguments ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryArgs {
    #[schemars(description = "Free-text search query")]
    pub query: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DoiArgs {
    #[schemars(description = "DOI of the work, e.g. 10.1145/3534678.3539479")]
    pub doi: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MetadataArgs {
    #[schemars(description = "Work metadata as a JSON string with title, authors, year, journal, doi and url")]
    pub metadata_json: String,
}

// ── Registry ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    OpenalexSearch,
    CrossrefSearch,
    FetchByDoi,
    MakeBibtex,
    MakeRis,
    MakeCslJson,
}

impl ToolName {
    pub const ALL: [ToolName; 6] = [
        ToolName::OpenalexSearch,
        ToolName::CrossrefSearch,
        ToolName::FetchByDoi,
        ToolName::MakeBibtex,
        ToolName::MakeRis,
        ToolName::MakeCslJson,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::OpenalexSearch => "openalex_search",
            ToolName::CrossrefSearch => "crossref_search",
            ToolName::FetchByDoi => "fetch_by_doi",
            ToolName::MakeBibtex => "make_bibtex",
            ToolName::MakeRis => "make_ris",
            ToolName::MakeCslJson => "make_csl_json",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().replace('-', "_");
        Self::ALL.into_iter().find(|t| t.as_str().eq_ignore_ascii_case(&name))
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolName::OpenalexSearch => "Search OpenAlex for academic papers by keyword.",
            ToolName::CrossrefSearch => "Search Crossref for papers by title, author, or keyword.",
            ToolName::FetchByDoi => "Fetch detailed metadata for a paper using DOI.",
            ToolName::MakeBibtex => "Convert metadata JSON to a BibTeX entry.",
            ToolName::MakeRis => "Convert metadata JSON to an RIS record.",
            ToolName::MakeCslJson => "Convert metadata JSON to a CSL-JSON item.",
        }
    }

    /// Name of the single argument each tool takes.
    pub fn param(self) -> &'static str {
        match self {
            ToolName::OpenalexSearch | ToolName::CrossrefSearch => "query",
            ToolName::FetchByDoi => "doi",
            ToolName::MakeBibtex | ToolName::MakeRis | ToolName::MakeCslJson => "metadata_json",
        }
    }

    fn citation_format(self) -> Option<CitationFormat> {
        match self {
            ToolName::MakeBibtex => Some(CitationFormat::Bibtex),
            ToolName::MakeRis => Some(CitationFormat::Ris),
            ToolName::MakeCslJson => Some(CitationFormat::CslJson),
            _ => None,
        }
    }

    /// JSON Schema of the tool's arguments.
    pub fn parameters(self) -> Value {
        let schema = match self {
            ToolName::OpenalexSearch | ToolName::CrossrefSearch => schemars::schema_for!(QueryArgs),
            ToolName::FetchByDoi => schemars::schema_for!(DoiArgs),
            _ => schemars::schema_for!(MetadataArgs),
        };
        let mut value = serde_json::to_value(schema).unwrap_or_else(|_| json!({"type": "object"}));
        if let Some(obj) = value.as_object_mut() {
            obj.remove("$schema");
            obj.remove("title");
        }
        value
    }
}

/// Name, description and argument schema of one tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

pub fn tool_specs() -> Vec<ToolSpec> {
    ToolName::ALL
        .into_iter()
        .map(|t| ToolSpec {
            name: t.as_str(),
            description: t.description(),
            parameters: t.parameters(),
        })
        .collect()
}

/// Parse a metadata record and render it in `format`.
pub fn make_citation(format: CitationFormat, metadata_json: &str) -> ToolOutcome<String> {
    match serde_json::from_str::<WorkMetadata>(metadata_json) {
        Ok(m) => ToolOutcome::Ok(format.render(&m)),
        Err(e) => ToolOutcome::Error(format!("Invalid metadata JSON: {}", e)),
    }
}

pub fn make_bibtex(metadata_json: &str) -> ToolOutcome<String> {
    make_citation(CitationFormat::Bibtex, metadata_json)
}

/// Pull a tool's single argument out of the model-supplied arguments.
///
/// Accepts a bare string, and for `metadata_json` an inline object, since
/// models often pass the record itself instead of its JSON encoding.
fn extract_arg(args: &Value, key: &str) -> Result<String, String> {
    match args {
        Value::String(s) => Ok(s.clone()),
        Value::Object(obj) => match obj.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(v @ (Value::Object(_) | Value::Array(_))) if key == "metadata_json" => Ok(v.to_string()),
            Some(_) => Err(format!("Argument '{}' must be a string", key)),
            None if key == "metadata_json" && obj.contains_key("doi") => Ok(args.to_string()),
            None => Err(format!("Missing argument '{}'", key)),
        },
        _ => Err(format!("Missing argument '{}'", key)),
    }
}

/// The upstream clients behind the fetch tools.
pub struct Tools {
    openalex: OpenAlexClient,
    crossref: CrossRefClient,
}

impl Tools {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        let email = config.openalex_email.as_deref();
        Ok(Self {
            openalex: OpenAlexClient::new(&config.openalex_url, email)?,
            crossref: CrossRefClient::new(&config.crossref_url, email)?,
        })
    }

    pub async fn openalex_search(&self, query: &str) -> ToolOutcome<Vec<SearchResultItem>> {
        search_outcome(&self.openalex, query).await
    }

    pub async fn crossref_search(&self, query: &str) -> ToolOutcome<Vec<SearchResultItem>> {
        search_outcome(&self.crossref, query).await
    }

    pub async fn fetch_by_doi(&self, doi: &str) -> ToolOutcome<WorkMetadata> {
        let result = self.crossref.get_work(doi).await;
        if let Err(ref e) = result {
            tracing::warn!("DOI lookup failed for {}: {}", doi.trim(), e);
        }
        result.into()
    }

    /// Run one tool and render its success payload as text.
    pub async fn run(&self, tool: ToolName, arg: &str) -> ToolOutcome<String> {
        tracing::info!("Running tool {}", tool.as_str());
        match tool {
            ToolName::OpenalexSearch => self.openalex_search(arg).await.into_pretty(),
            ToolName::CrossrefSearch => self.crossref_search(arg).await.into_pretty(),
            ToolName::FetchByDoi => self.fetch_by_doi(arg).await.into_pretty(),
            other => match other.citation_format() {
                Some(format) => make_citation(format, arg),
                None => ToolOutcome::Error(format!("Unsupported tool: {}", other.as_str())),
            },
        }
    }

    /// Dispatch a call by tool name with JSON-encoded arguments.
    ///
    /// Unknown tools and bad arguments come back as error payloads so the
    /// model can see and react to them.
    pub async fn call(&self, name: &str, arguments: &str) -> String {
        let Some(tool) = ToolName::parse(name) else {
            tracing::warn!("Model requested unknown tool {}", name);
            return error_json(&format!("Unknown tool: {}", name));
        };
        let args: Value = if arguments.trim().is_empty() {
            json!({})
        } else {
            match serde_json::from_str(arguments) {
                Ok(v) => v,
                Err(e) => return error_json(&format!("Invalid tool arguments: {}", e)),
            }
        };
        match extract_arg(&args, tool.param()) {
            Ok(arg) => self.run(tool, &arg).await.into_text(),
            Err(e) => error_json(&e),
        }
    }
}

impl<T: Serialize> ToolOutcome<T> {
    fn into_pretty(self) -> ToolOutcome<String> {
        match self {
            ToolOutcome::Ok(v) => pretty(&v),
            ToolOutcome::Error(e) => ToolOutcome::Error(e),
        }
    }
}

async fn search_outcome(source: &dyn PaperSource, query: &str) -> ToolOutcome<Vec<SearchResultItem>> {
    let result = source.search(query).await;
    match &result {
        Ok(items) => tracing::info!("{} returned {} results", source.name(), items.len()),
        Err(e) => tracing::warn!("{} search failed: {}", source.name(), e),
    }
    result.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_json_shape() {
        let v: Value = serde_json::from_str(&error_json("boom \"quoted\"")).unwrap();
        assert_eq!(v, json!({"error": "boom \"quoted\""}));
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let ok: ToolOutcome<u32> = ToolOutcome::Ok(3);
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({"ok": 3}));
        let err: ToolOutcome<u32> = ToolOutcome::Error("nope".into());
        assert_eq!(serde_json::to_value(&err).unwrap(), json!({"error": "nope"}));
    }

    #[test]
    fn test_make_bibtex_author_join() {
        let out = make_bibtex(r#"{"title": "T", "authors": ["Doe, J.", "Roe, A."], "doi": "10.1/ab/cd"}"#);
        let text = out.into_text();
        assert!(text.starts_with("@article{10.1_ab_cd,"));
        assert!(text.contains("author={ Doe, J. and Roe, A. }"));
    }

    #[test]
    fn test_make_bibtex_without_doi() {
        let text = make_bibtex(r#"{"title": "No DOI"}"#).into_text();
        assert!(text.starts_with("@article{,"));
    }

    #[test]
    fn test_make_bibtex_invalid_json_is_error_payload() {
        let out = make_bibtex("{not json");
        assert!(out.is_error());
        let v: Value = serde_json::from_str(&out.into_text()).unwrap();
        assert!(v["error"].as_str().unwrap().starts_with("Invalid metadata JSON"));
    }

    #[test]
    fn test_parse_tool_names() {
        assert_eq!(ToolName::parse("fetch_by_doi"), Some(ToolName::FetchByDoi));
        assert_eq!(ToolName::parse("make-csl-json"), Some(ToolName::MakeCslJson));
        assert_eq!(ToolName::parse("OpenAlex_Search"), Some(ToolName::OpenalexSearch));
        assert_eq!(ToolName::parse("web_search"), None);
    }

    #[test]
    fn test_parameters_schema() {
        let schema = ToolName::FetchByDoi.parameters();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["doi"]["type"], "string");
        assert_eq!(schema["required"], json!(["doi"]));
        assert!(schema.get("$schema").is_none());
    }

    #[test]
    fn test_tool_specs_cover_every_tool() {
        let names: Vec<_> = tool_specs().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["openalex_search", "crossref_search", "fetch_by_doi", "make_bibtex", "make_ris", "make_csl_json"]);
    }

    #[test]
    fn test_extract_arg_forms() {
        assert_eq!(extract_arg(&json!({"query": "gnn"}), "query").unwrap(), "gnn");
        assert_eq!(extract_arg(&json!("10.1/x"), "doi").unwrap(), "10.1/x");
        let inline = extract_arg(&json!({"metadata_json": {"doi": "10.1/x"}}), "metadata_json").unwrap();
        assert_eq!(serde_json::from_str::<Value>(&inline).unwrap()["doi"], "10.1/x");
        let bare = extract_arg(&json!({"doi": "10.1/x", "title": "T"}), "metadata_json").unwrap();
        assert_eq!(serde_json::from_str::<Value>(&bare).unwrap()["title"], "T");
        assert!(extract_arg(&json!({}), "query").is_err());
        assert!(extract_arg(&json!({"query": 5}), "query").is_err());
    }
}
