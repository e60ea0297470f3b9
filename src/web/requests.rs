//! Turn form input into the natural-language request sent to the agent.
//!
//! The result limit and the chosen formats are hints for the model only;
//! the fetch tools always request the same number of rows.

use crate::citation::CitationFormat;

pub const MIN_LIMIT: u8 = 1;
pub const MAX_LIMIT: u8 = 10;
pub const DEFAULT_LIMIT: u8 = 5;

/// Formats pre-selected on the DOI tab.
pub const DEFAULT_FORMATS: [CitationFormat; 2] = [CitationFormat::Bibtex, CitationFormat::CslJson];

/// Build the search request, or `None` when the query is blank.
pub fn search_request(query: &str, use_openalex: bool, use_crossref: bool, limit: u8) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    let mut parts = vec![format!("search: {}", query)];
    if use_openalex {
        parts.push("Use OpenAlex.".to_string());
    }
    if use_crossref {
        parts.push("Use Crossref.".to_string());
    }
    parts.push(format!("Limit each source to {}.", limit.clamp(MIN_LIMIT, MAX_LIMIT)));
    Some(parts.join(" "))
}

/// Read the slider value. Out-of-range numbers are clamped and anything
/// unparseable falls back to the default.
pub fn parse_limit(raw: Option<&str>) -> u8 {
    match raw.map(str::trim).filter(|r| !r.is_empty()).map(str::parse::<i64>) {
        Some(Ok(n)) => n.clamp(i64::from(MIN_LIMIT), i64::from(MAX_LIMIT)) as u8,
        _ => DEFAULT_LIMIT,
    }
}

/// Build the DOI request, or `None` when the DOI is blank.
pub fn citation_request(doi: &str, formats: &[CitationFormat]) -> Option<String> {
    let doi = doi.trim();
    if doi.is_empty() {
        return None;
    }
    let mut ask = format!("Resolve this DOI and prepare citations: {}", doi);
    if !formats.is_empty() {
        let labels: Vec<_> = formats.iter().map(|f| f.label()).collect();
        ask.push_str(&format!(" Formats: {}.", labels.join(", ")));
    }
    Some(ask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(Some("3")), 3);
        assert_eq!(parse_limit(Some(" 7 ")), 7);
        assert_eq!(parse_limit(Some("300")), MAX_LIMIT);
        assert_eq!(parse_limit(Some("-4")), MIN_LIMIT);
        assert_eq!(parse_limit(Some("abc")), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("")), DEFAULT_LIMIT);
        assert_eq!(parse_limit(None), DEFAULT_LIMIT);
    }

    #[test]
    fn test_search_request_both_sources() {
        assert_eq!(
            search_request("  graph neural networks ", true, true, 5).unwrap(),
            "search: graph neural networks Use OpenAlex. Use Crossref. Limit each source to 5."
        );
    }

    #[test]
    fn test_search_request_single_source() {
        assert_eq!(
            search_request("gnn", false, true, 3).unwrap(),
            "search: gnn Use Crossref. Limit each source to 3."
        );
        assert_eq!(
            search_request("gnn", false, false, 1).unwrap(),
            "search: gnn Limit each source to 1."
        );
    }

    #[test]
    fn test_search_request_clamps_limit() {
        assert!(search_request("q", true, false, 42).unwrap().ends_with("Limit each source to 10."));
        assert!(search_request("q", true, false, 0).unwrap().ends_with("Limit each source to 1."));
    }

    #[test]
    fn test_blank_inputs_rejected() {
        assert_eq!(search_request("   ", true, true, 5), None);
        assert_eq!(citation_request("\t", &DEFAULT_FORMATS), None);
    }

    #[test]
    fn test_citation_request() {
        assert_eq!(
            citation_request(" 10.1145/3534678.3539479 ", &[]).unwrap(),
            "Resolve this DOI and prepare citations: 10.1145/3534678.3539479"
        );
        assert_eq!(
            citation_request("10.1/x", &DEFAULT_FORMATS).unwrap(),
            "Resolve this DOI and prepare citations: 10.1/x Formats: BibTeX, CSL-JSON."
        );
    }
}
