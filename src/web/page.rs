//! Server-rendered HTML for the two-tab form.

use crate::citation::CitationFormat;

use super::requests::{DEFAULT_FORMATS, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT};

pub const TITLE: &str = "Academic Search & Citation Manager";
pub const CITATION_TIP: &str =
    "Tip: Ask me for specific styles (APA/IEEE) and I\u{2019}ll guide you using these exports.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Search,
    Citations,
}

/// What to show under a tab's form after a submit.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Warning(String),
    Reply(String),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct SearchView {
    pub query: String,
    pub use_openalex: bool,
    pub use_crossref: bool,
    pub limit: u8,
    pub notice: Option<Notice>,
}

impl Default for SearchView {
    fn default() -> Self {
        Self {
            query: String::new(),
            use_openalex: true,
            use_crossref: true,
            limit: DEFAULT_LIMIT,
            notice: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CitationView {
    pub doi: String,
    pub formats: Vec<CitationFormat>,
    pub notice: Option<Notice>,
}

impl Default for CitationView {
    fn default() -> Self {
        Self {
            doi: String::new(),
            formats: DEFAULT_FORMATS.to_vec(),
            notice: None,
        }
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn checked(on: bool) -> &'static str {
    if on { " checked" } else { "" }
}

fn render_notice(notice: Option<&Notice>, tip: Option<&str>) -> String {
    match notice {
        None => String::new(),
        Some(Notice::Warning(w)) => format!("<p class=\"warning\">{}</p>", escape(w)),
        Some(Notice::Error(e)) => format!("<p class=\"error\">Error: {}</p>", escape(e)),
        Some(Notice::Reply(r)) => {
            let caption = tip
                .map(|t| format!("<p class=\"caption\">{}</p>", escape(t)))
                .unwrap_or_default();
            format!("<pre class=\"reply\">{}</pre>{}", escape(r), caption)
        }
    }
}

fn render_search(view: &SearchView) -> String {
    format!(
        r#"<h2>Search articles</h2>
<form method="post" action="/search">
  <label>Query <input type="text" name="query" value="{query}" placeholder="e.g., transformer interpretability healthcare 2022"></label>
  <div class="sources">
    <label><input type="checkbox" name="openalex" value="on"{oa}> OpenAlex</label>
    <label><input type="checkbox" name="crossref" value="on"{cr}> Crossref</label>
  </div>
  <label>Results per source <input type="range" name="limit" min="{min}" max="{max}" value="{limit}" oninput="this.nextElementSibling.value=this.value"><output>{limit}</output></label>
  <button type="submit">Search</button>
</form>
{notice}"#,
        query = escape(&view.query),
        oa = checked(view.use_openalex),
        cr = checked(view.use_crossref),
        min = MIN_LIMIT,
        max = MAX_LIMIT,
        limit = view.limit,
        notice = render_notice(view.notice.as_ref(), None),
    )
}

fn render_citations(view: &CitationView) -> String {
    let formats: String = CitationFormat::ALL
        .iter()
        .map(|f| {
            format!(
                "    <label><input type=\"checkbox\" name=\"{}\" value=\"on\"{}> {}</label>\n",
                f.key(),
                checked(view.formats.contains(f)),
                f.label()
            )
        })
        .collect();
    format!(
        r#"<h2>Fetch &amp; format by DOI</h2>
<form method="post" action="/citations">
  <label>DOI <input type="text" name="doi" value="{doi}" placeholder="10.1145/3534678.3539479"></label>
  <fieldset class="formats"><legend>Formats</legend>
{formats}  </fieldset>
  <button type="submit">Generate</button>
</form>
{notice}"#,
        doi = escape(&view.doi),
        formats = formats,
        notice = render_notice(view.notice.as_ref(), Some(CITATION_TIP)),
    )
}

const STYLE: &str = "body{font-family:sans-serif;max-width:760px;margin:2rem auto;padding:0 1rem}\
.tabs>input{display:none}.tabs>label.tab{display:inline-block;padding:.5rem 1rem;cursor:pointer;border-bottom:2px solid transparent}\
.tabs>input:checked+label.tab{border-bottom-color:#e4572e;font-weight:bold}\
.panel{display:none;padding-top:1rem}#tab-search:checked~#panel-search,#tab-doi:checked~#panel-doi{display:block}\
form label{display:block;margin:.5rem 0}input[type=text]{width:100%}\
pre.reply{white-space:pre-wrap;background:#f6f6f6;padding:1rem}.warning{color:#a15c00}.error{color:#b00020}.caption{color:#666;font-size:.9em}";

pub fn render_page(active: Tab, search: &SearchView, citations: &CitationView) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<h1>&#128218; {title}</h1>
<div class="tabs">
<input type="radio" name="tab" id="tab-search"{search_on}><label class="tab" for="tab-search">&#128270; Search</label>
<input type="radio" name="tab" id="tab-doi"{doi_on}><label class="tab" for="tab-doi">&#129534; DOI &rarr; Citations</label>
<section class="panel" id="panel-search">
{search}
</section>
<section class="panel" id="panel-doi">
{citations}
</section>
</div>
</body>
</html>
"#,
        title = escape(TITLE),
        style = STYLE,
        search_on = checked(active == Tab::Search),
        doi_on = checked(active == Tab::Citations),
        search = render_search(search),
        citations = render_citations(citations),
    )
}
