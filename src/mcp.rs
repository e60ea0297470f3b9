//! The tool registry served over the Model Context Protocol (stdio).

use std::sync::Arc;

use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters,
    model::*, tool, tool_handler, tool_router,
    ErrorData as McpError, ServerHandler,
};

use crate::tools::{DoiArgs, MetadataArgs, QueryArgs, ToolName, ToolOutcome, Tools};

#[derive(Clone)]
pub struct CitationServer {
    tool_router: ToolRouter<Self>,
    tools: Arc<Tools>,
}

fn to_result(outcome: ToolOutcome<String>) -> CallToolResult {
    let is_error = outcome.is_error();
    let content = vec![Content::text(outcome.into_text())];
    if is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

#[tool_router]
impl CitationServer {
    pub fn new(tools: Arc<Tools>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            tools,
        }
    }

    async fn run(&self, tool: ToolName, arg: &str) -> Result<CallToolResult, McpError> {
        Ok(to_result(self.tools.run(tool, arg).await))
    }

    #[tool(description = "Search OpenAlex for academic papers by keyword.")]
    async fn openalex_search(
        &self,
        Parameters(params): Parameters<QueryArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolName::OpenalexSearch, &params.query).await
    }

    #[tool(description = "Search Crossref for papers by title, author, or keyword.")]
    async fn crossref_search(
        &self,
        Parameters(params): Parameters<QueryArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolName::CrossrefSearch, &params.query).await
    }

    #[tool(description = "Fetch detailed metadata for a paper using DOI.")]
    async fn fetch_by_doi(
        &self,
        Parameters(params): Parameters<DoiArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolName::FetchByDoi, &params.doi).await
    }

    #[tool(description = "Convert metadata JSON to a BibTeX entry.")]
    async fn make_bibtex(
        &self,
        Parameters(params): Parameters<MetadataArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolName::MakeBibtex, &params.metadata_json).await
    }

    #[tool(description = "Convert metadata JSON to an RIS record.")]
    async fn make_ris(
        &self,
        Parameters(params): Parameters<MetadataArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolName::MakeRis, &params.metadata_json).await
    }

    #[tool(description = "Convert metadata JSON to a CSL-JSON item.")]
    async fn make_csl_json(
        &self,
        Parameters(params): Parameters<MetadataArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolName::MakeCslJson, &params.metadata_json).await
    }
}

#[tool_handler]
impl ServerHandler for CitationServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Search OpenAlex and Crossref, resolve DOIs to metadata, and render \
                 BibTeX, RIS, or CSL-JSON citations from that metadata."
                    .into(),
            ),
        }
    }
}
