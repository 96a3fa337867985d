//! MCP tool handlers. Every `#[tool]` method lives in the one `#[tool_router]` impl block.

use rmcp::{handler::server::wrapper::Parameters, tool, tool_router};
use screen_nav::format::format_stats;

use crate::params::SearchScreenSpecParams;
use crate::server::ScreenServer;

#[tool_router]
impl ScreenServer {
    #[tool(
        description = "Find a design screen spec by screen id (e.g. 'CONT-05_04_54') or by keywords in Korean or English, optionally scoped by project and version. Returns either one confirmed screen with its description and a code_search_hint, or a numbered list of candidates. Answer a list by calling again with just the number as the query (e.g. '2'). Screens found in the design files but missing from the local index are added to it."
    )]
    async fn search_screen_spec(
        &self,
        Parameters(params): Parameters<SearchScreenSpecParams>,
    ) -> Result<String, String> {
        if params.query.trim().is_empty() {
            return Err("query must not be empty".into());
        }
        let request = params.into_request();
        self.with_resolver(move |resolver| resolver.query(&request).map(|o| o.render()))
            .await?
            .map_err(|e| e.to_string())
    }

    #[tool(
        description = "Show screen index statistics: total screens, last update, and screen counts per project and version."
    )]
    async fn screen_index_stats(&self) -> Result<String, String> {
        self.with_resolver(|resolver| resolver.stats().map(|s| format_stats(&s)))
            .await?
            .map_err(|e| e.to_string())
    }

    #[tool(
        description = "Reload the screen index from disk, e.g. after running `screen-spec collect`. Returns the new statistics."
    )]
    async fn reload_screen_index(&self) -> Result<String, String> {
        self.with_resolver(|resolver| {
            let path = resolver.index_path().display().to_string();
            resolver
                .reload()
                .map(|s| format!("Reloaded screen index from {}\n\n{}", path, format_stats(&s)))
        })
        .await?
        .map_err(|e| e.to_string())
    }
}

impl ScreenServer {
    /// Accessor for the tool router generated by `#[tool_router]`, which is
    /// private to this module while `new()` lives in server.rs.
    pub(crate) fn create_tool_router() -> rmcp::handler::server::router::tool::ToolRouter<Self> {
        Self::tool_router()
    }
}
