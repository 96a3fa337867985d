//! `ScreenServer` state, non-tool methods, and the `ServerHandler` impl.

use anyhow::{Context, Result};
use rmcp::{ServerHandler, model::ServerInfo, tool_handler};
use screen_core::config::ScreenConfig;
use screen_resolve::Resolver;
use screen_tree::HttpDocumentProvider;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

pub(crate) type ScreenResolver = Resolver<HttpDocumentProvider>;

/// The screen spec MCP server state.
#[derive(Clone)]
pub(crate) struct ScreenServer {
    pub(crate) project_root: PathBuf,
    /// Queries run one at a time; the resolver owns the index and the
    /// pending choices.
    pub(crate) resolver: Arc<Mutex<ScreenResolver>>,
    pub(crate) tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
}

impl std::fmt::Debug for ScreenServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenServer")
            .field("project_root", &self.project_root)
            .field("resolver", &"...")
            .finish()
    }
}

impl ScreenServer {
    /// Create a server for `project_root`. The index is loaded on first use.
    pub(crate) fn new(project_root: PathBuf) -> Result<Self> {
        let config = ScreenConfig::load(&project_root)
            .with_context(|| format!("failed to load config under {}", project_root.display()))?;
        let index_path = config.index_path(&project_root);
        if config.remote.token.is_empty() {
            tracing::warn!("FIGMA_TOKEN is not set; remote lookups will fail");
        }
        tracing::info!("screen index: {}", index_path.display());

        let provider = HttpDocumentProvider::new(&config.remote);
        let resolver = Resolver::new(config, index_path, provider);
        Ok(Self {
            project_root,
            resolver: Arc::new(Mutex::new(resolver)),
            tool_router: Self::create_tool_router(),
        })
    }

    /// Run `f` against the resolver on the blocking pool. Remote calls are
    /// synchronous HTTP and must stay off the async runtime.
    pub(crate) async fn with_resolver<T, F>(&self, f: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&mut ScreenResolver) -> T + Send + 'static,
    {
        let resolver = Arc::clone(&self.resolver);
        tokio::task::spawn_blocking(move || {
            let mut guard = resolver.blocking_lock();
            f(&mut *guard)
        })
        .await
        .map_err(|e| format!("tool task failed: {e}"))
    }
}

#[tool_handler]
impl ServerHandler for ScreenServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(include_str!("prompts/server_instructions.md").into()),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
