//! Web front-end: a Search tab and a DOI → Citations tab, each turning the
//! form into one request for the agent and showing its last reply.

pub mod page;
pub mod requests;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::agent::{self, Agent};
use crate::citation::CitationFormat;
use page::{CitationView, Notice, SearchView, Tab};
use requests::{citation_request, parse_limit, search_request};

#[derive(Clone)]
pub struct AppState {
    agent: Arc<dyn Agent>,
}

impl AppState {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self { agent }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    query: String,
    openalex: Option<String>,
    crossref: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CitationForm {
    #[serde(default)]
    doi: String,
    bibtex: Option<String>,
    ris: Option<String>,
    csl_json: Option<String>,
}

impl CitationForm {
    fn formats(&self) -> Vec<CitationFormat> {
        [
            (CitationFormat::Bibtex, &self.bibtex),
            (CitationFormat::Ris, &self.ris),
            (CitationFormat::CslJson, &self.csl_json),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_some())
        .map(|(f, _)| f)
        .collect()
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", post(search))
        .route("/citations", post(citations))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind `addr` and serve the UI until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Web UI listening on http://{}", listener.local_addr()?);
    axum::serve(listener, build_router(state))
        .await
        .context("Web server failed")
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

async fn index() -> Html<String> {
    Html(page::render_page(Tab::Search, &SearchView::default(), &CitationView::default()))
}

async fn run_agent(state: &AppState, request: &str) -> Notice {
    match agent::ask(state.agent.as_ref(), request).await {
        Ok(reply) => Notice::Reply(reply),
        Err(e) => {
            tracing::warn!("Agent turn failed: {}", e);
            Notice::Error(e.to_string())
        }
    }
}

async fn search(State(state): State<AppState>, Form(form): Form<SearchForm>) -> Html<String> {
    let mut view = SearchView {
        query: form.query,
        use_openalex: form.openalex.is_some(),
        use_crossref: form.crossref.is_some(),
        limit: parse_limit(form.limit.as_deref()),
        notice: None,
    };
    view.notice = Some(
        match search_request(&view.query, view.use_openalex, view.use_crossref, view.limit) {
            Some(request) => run_agent(&state, &request).await,
            None => Notice::Warning("Enter a query.".into()),
        },
    );
    Html(page::render_page(Tab::Search, &view, &CitationView::default()))
}

async fn citations(State(state): State<AppState>, Form(form): Form<CitationForm>) -> Html<String> {
    let formats = form.formats();
    let notice = match citation_request(&form.doi, &formats) {
        Some(request) => run_agent(&state, &request).await,
        None => Notice::Warning("Enter a DOI.".into()),
    };
    let view = CitationView { doi: form.doi, formats, notice: Some(notice) };
    Html(page::render_page(Tab::Citations, &SearchView::default(), &view))
}
