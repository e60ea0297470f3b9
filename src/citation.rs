//! Citation rendering for [`WorkMetadata`].
//!
//! Field values are inserted verbatim. BibTeX special characters (braces,
//! backslashes) in titles are not escaped.

use serde_json::{json, Map, Value};

use crate::apis::WorkMetadata;

/// Citation formats offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationFormat {
    Bibtex,
    Ris,
    CslJson,
}

impl CitationFormat {
    pub const ALL: [CitationFormat; 3] =
        [CitationFormat::Bibtex, CitationFormat::Ris, CitationFormat::CslJson];

    pub fn label(self) -> &'static str {
        match self {
            CitationFormat::Bibtex => "BibTeX",
            CitationFormat::Ris => "RIS",
            CitationFormat::CslJson => "CSL-JSON",
        }
    }

    /// Form field name used by the web UI.
    pub fn key(self) -> &'static str {
        match self {
            CitationFormat::Bibtex => "bibtex",
            CitationFormat::Ris => "ris",
            CitationFormat::CslJson => "csl_json",
        }
    }

    pub fn render(self, m: &WorkMetadata) -> String {
        match self {
            CitationFormat::Bibtex => format_bibtex(m),
            CitationFormat::Ris => format_ris(m),
            CitationFormat::CslJson => format_csl_json(m),
        }
    }
}

/// DOI with every `/` replaced by `_`; empty when there is no DOI.
pub fn citation_key(doi: &str) -> String {
    doi.replace('/', "_")
}

fn year_text(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_default()
}

pub fn format_bibtex(m: &WorkMetadata) -> String {
    format!(
        "@article{{{key},\n  title={{ {title} }},\n  author={{ {authors} }},\n  year={{ {year} }},\n  journal={{ {journal} }},\n  doi={{ {doi} }},\n  url={{ {url} }}\n}}",
        key = citation_key(&m.doi),
        title = m.title,
        authors = m.authors.join(" and "),
        year = year_text(m.year),
        journal = m.journal,
        doi = m.doi,
        url = m.url,
    )
}

pub fn format_ris(m: &WorkMetadata) -> String {
    let mut output = String::from("TY  - JOUR\n");
    for author in &m.authors {
        output.push_str(&format!("AU  - {}\n", author));
    }
    output.push_str(&format!("TI  - {}\n", m.title));
    if let Some(year) = m.year {
        output.push_str(&format!("PY  - {}\n", year));
    }
    if !m.journal.is_empty() {
        output.push_str(&format!("JO  - {}\n", m.journal));
    }
    if !m.doi.is_empty() {
        output.push_str(&format!("DO  - {}\n", m.doi));
    }
    if !m.url.is_empty() {
        output.push_str(&format!("UR  - {}\n", m.url));
    }
    output.push_str("ER  - ");
    output
}

/// Split "Family, Given" into a CSL name; anything else is kept as a literal.
fn csl_name(author: &str) -> Value {
    match author.split_once(',') {
        Some((family, given)) => {
            let mut name = Map::new();
            name.insert("family".into(), json!(family.trim()));
            if !given.trim().is_empty() {
                name.insert("given".into(), json!(given.trim()));
            }
            Value::Object(name)
        }
        None => json!({ "literal": author.trim() }),
    }
}

pub fn csl_item(m: &WorkMetadata) -> Value {
    let mut item = Map::new();
    item.insert("id".into(), json!(citation_key(&m.doi)));
    item.insert("type".into(), json!("article-journal"));
    if !m.title.is_empty() {
        item.insert("title".into(), json!(m.title));
    }
    if !m.authors.is_empty() {
        item.insert("author".into(), Value::Array(m.authors.iter().map(|a| csl_name(a)).collect()));
    }
    if let Some(year) = m.year {
        item.insert("issued".into(), json!({ "date-parts": [[year]] }));
    }
    for (key, value) in [("container-title", &m.journal), ("DOI", &m.doi), ("URL", &m.url)] {
        if !value.is_empty() {
            item.insert(key.into(), json!(value));
        }
    }
    Value::Object(item)
}

pub fn format_csl_json(m: &WorkMetadata) -> String {
    let items = Value::Array(vec![csl_item(m)]);
    serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
}
