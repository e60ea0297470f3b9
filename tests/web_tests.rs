//! Router tests with a scripted agent standing in for the model.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::util::ServiceExt; // for `oneshot`

use scholar_cite::agent::{Agent, AgentError, Message};
use scholar_cite::web::{build_router, AppState};

/// Records every request and answers with a fixed reply.
struct ScriptedAgent {
    reply: Option<String>,
    fail: bool,
    seen: Mutex<Vec<String>>,
}

impl ScriptedAgent {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self { reply: Some(reply.to_string()), fail: false, seen: Mutex::new(Vec::new()) })
    }

    fn silent() -> Arc<Self> {
        Arc::new(Self { reply: None, fail: false, seen: Mutex::new(Vec::new()) })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { reply: None, fail: true, seen: Mutex::new(Vec::new()) })
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn invoke(&self, mut messages: Vec<Message>) -> Result<Vec<Message>, AgentError> {
        let last = messages.last().and_then(|m| m.content.clone()).unwrap_or_default();
        self.seen.lock().unwrap().push(last);
        if self.fail {
            return Err(AgentError::EmptyResponse);
        }
        if let Some(reply) = &self.reply {
            messages.push(Message::assistant(reply.clone()));
        }
        Ok(messages)
    }
}

async fn post_form(agent: Arc<ScriptedAgent>, uri: &str, form: &str) -> (StatusCode, String) {
    let app = build_router(AppState::new(agent));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_index_and_health() {
    let app = build_router(AppState::new(ScriptedAgent::silent()));
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Academic Search &amp; Citation Manager"));
    assert!(html.contains("action=\"/search\""));
    assert!(html.contains("action=\"/citations\""));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_search_builds_request_and_shows_reply() {
    let agent = ScriptedAgent::replying("- **GNNs for Health** (2021)");
    let (status, html) = post_form(
        agent.clone(),
        "/search",
        "query=graph+neural+networks&openalex=on&crossref=on&limit=3",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        agent.seen(),
        ["search: graph neural networks Use OpenAlex. Use Crossref. Limit each source to 3."]
    );
    assert!(html.contains("- **GNNs for Health** (2021)"));
    assert!(html.contains("value=\"graph neural networks\""));
}

#[tokio::test]
async fn test_search_with_one_source() {
    let agent = ScriptedAgent::replying("ok");
    post_form(agent.clone(), "/search", "query=transformers&crossref=on").await;
    assert_eq!(agent.seen(), ["search: transformers Use Crossref. Limit each source to 5."]);
}

#[tokio::test]
async fn test_blank_query_warns_without_calling_agent() {
    let agent = ScriptedAgent::replying("unused");
    let (_, html) = post_form(agent.clone(), "/search", "query=+++&openalex=on").await;
    assert!(agent.seen().is_empty());
    assert!(html.contains("Enter a query."));
}

#[tokio::test]
async fn test_citations_request_and_tip() {
    let agent = ScriptedAgent::replying("```bibtex\n@article{10.1145_3534678.3539479,\n}\n```");
    let (status, html) = post_form(
        agent.clone(),
        "/citations",
        "doi=+10.1145%2F3534678.3539479+&bibtex=on&csl_json=on",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        agent.seen(),
        ["Resolve this DOI and prepare citations: 10.1145/3534678.3539479 Formats: BibTeX, CSL-JSON."]
    );
    assert!(html.contains("@article{10.1145_3534678.3539479,"));
    assert!(html.contains("APA/IEEE"));
}

#[tokio::test]
async fn test_blank_doi_warns() {
    let agent = ScriptedAgent::replying("unused");
    let (_, html) = post_form(agent.clone(), "/citations", "doi=&bibtex=on").await;
    assert!(agent.seen().is_empty());
    assert!(html.contains("Enter a DOI."));
}

#[tokio::test]
async fn test_no_assistant_message_shows_fallback() {
    let (_, html) = post_form(ScriptedAgent::silent(), "/search", "query=anything&openalex=on").await;
    assert!(html.contains("No response."));
}

#[tokio::test]
async fn test_agent_failure_is_shown() {
    let (status, html) = post_form(ScriptedAgent::failing(), "/citations", "doi=10.1%2Fx").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Error: LLM returned no choices"));
}

#[tokio::test]
async fn test_out_of_range_limit_is_clamped() {
    let agent = ScriptedAgent::replying("ok");
    let (status, html) = post_form(agent.clone(), "/search", "query=gnn&openalex=on&limit=300").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("ok"));

    post_form(agent.clone(), "/search", "query=gnn&openalex=on&limit=abc").await;
    assert_eq!(
        agent.seen(),
        [
            "search: gnn Use OpenAlex. Limit each source to 10.",
            "search: gnn Use OpenAlex. Limit each source to 5.",
        ]
    );
}
