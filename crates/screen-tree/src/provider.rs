//! Remote document provider abstraction.
//!
//! [`HttpDocumentProvider`] talks to the Figma REST API with blocking HTTP via
//! `ureq`. Tests substitute an in-memory provider.

use crate::node::DocumentNode;
use screen_core::config::RemoteConfig;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound for one response body. Whole-file trees can be large.
const MAX_BODY_BYTES: u64 = 512 * 1024 * 1024;

/// Errors from remote document calls.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("response parse error: {0}")]
    Parse(String),
    #[error("node {node_id} missing from response for file {file_id}")]
    NodeMissing { file_id: String, node_id: String },
    #[error("missing configuration: {0}")]
    Config(&'static str),
}

impl FetchError {
    /// The remote refused the request because the tree at this depth is too big.
    pub fn is_payload_too_large(&self) -> bool {
        match self {
            Self::Api { status, message } => {
                *status == 400 && message.to_lowercase().contains("request too large")
            }
            _ => false,
        }
    }
}

/// A project visible to the configured team.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteProject {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
}

/// A file inside a project. Its name carries the release version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFile {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub last_modified: String,
}

fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    match Value::deserialize(de)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Abstraction over the remote document service.
pub trait DocumentProvider: Send + Sync {
    /// Fetch a whole file (`node_id = None`) or one node's subtree, limited
    /// to `depth` levels.
    fn fetch_tree(
        &self,
        file_id: &str,
        node_id: Option<&str>,
        depth: u32,
    ) -> Result<DocumentNode, FetchError>;

    /// Projects of the configured team.
    fn list_projects(&self) -> Result<Vec<RemoteProject>, FetchError>;

    /// Files of one project.
    fn list_files(&self, project_id: &str) -> Result<Vec<RemoteFile>, FetchError>;
}

impl<P: DocumentProvider + ?Sized> DocumentProvider for Arc<P> {
    fn fetch_tree(
        &self,
        file_id: &str,
        node_id: Option<&str>,
        depth: u32,
    ) -> Result<DocumentNode, FetchError> {
        (**self).fetch_tree(file_id, node_id, depth)
    }

    fn list_projects(&self) -> Result<Vec<RemoteProject>, FetchError> {
        (**self).list_projects()
    }

    fn list_files(&self, project_id: &str) -> Result<Vec<RemoteFile>, FetchError> {
        (**self).list_files(project_id)
    }
}

/// Figma REST API provider.
pub struct HttpDocumentProvider {
    api_base: String,
    token: String,
    team_id: String,
    agent: ureq::Agent,
}

impl std::fmt::Debug for HttpDocumentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDocumentProvider")
            .field("api_base", &self.api_base)
            .field("team_id", &self.team_id)
            .finish()
    }
}

impl HttpDocumentProvider {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            team_id: config.team_id.clone(),
            agent: ureq::Agent::new_with_config(
                ureq::config::Config::builder()
                    .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
                    .http_status_as_error(false)
                    .build(),
            ),
        }
    }

    fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        if self.token.is_empty() {
            return Err(FetchError::Config("FIGMA_TOKEN is not set"));
        }

        let url = format!("{}/{}", self.api_base, path);
        let mut request = self.agent.get(&url).header("X-Figma-Token", &self.token);
        for (key, value) in query {
            request = request.query(*key, value);
        }
        tracing::debug!("GET {}", url);

        let mut response = request
            .call()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        let status = response.status().as_u16();
        if status >= 400 {
            let text = response
                .body_mut()
                .with_config()
                .limit(MAX_BODY_BYTES)
                .read_to_string()
                .map_err(|e| FetchError::Http(e.to_string()))?;
            return Err(FetchError::Api {
                status,
                message: error_message(&text),
            });
        }

        response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_json()
            .map_err(|e| match e {
                ureq::Error::Json(e) => FetchError::Parse(e.to_string()),
                other => FetchError::Http(other.to_string()),
            })
    }
}

/// Pull the human-readable message out of an error body.
fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    ["err", "message", "error"]
        .iter()
        .find_map(|key| json.get(*key).and_then(|v| v.as_str()))
        .map(String::from)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Detach `key` from a response object and deserialize it.
fn take_field<T: serde::de::DeserializeOwned>(value: &mut Value, key: &str) -> Result<T, FetchError> {
    let field = value
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| FetchError::Parse(format!("response has no `{key}` field")))?;
    serde_json::from_value(field).map_err(|e| FetchError::Parse(e.to_string()))
}

impl DocumentProvider for HttpDocumentProvider {
    fn fetch_tree(
        &self,
        file_id: &str,
        node_id: Option<&str>,
        depth: u32,
    ) -> Result<DocumentNode, FetchError> {
        let depth = depth.to_string();
        match node_id {
            None => {
                let mut json = self.get_json(&format!("files/{file_id}"), &[("depth", depth)])?;
                take_field(&mut json, "document")
            }
            Some(node_id) => {
                let mut json = self.get_json(
                    &format!("files/{file_id}/nodes"),
                    &[("ids", node_id.to_string()), ("depth", depth)],
                )?;
                let mut node = json
                    .get_mut("nodes")
                    .and_then(|nodes| nodes.get_mut(node_id))
                    .filter(|n| !n.is_null())
                    .map(Value::take)
                    .ok_or_else(|| FetchError::NodeMissing {
                        file_id: file_id.to_string(),
                        node_id: node_id.to_string(),
                    })?;
                take_field(&mut node, "document")
            }
        }
    }

    fn list_projects(&self) -> Result<Vec<RemoteProject>, FetchError> {
        if self.team_id.is_empty() {
            return Err(FetchError::Config("FIGMA_TEAM_ID is not set"));
        }
        let mut json = self.get_json(&format!("teams/{}/projects", self.team_id), &[])?;
        take_field(&mut json, "projects")
    }

    fn list_files(&self, project_id: &str) -> Result<Vec<RemoteFile>, FetchError> {
        let mut json = self.get_json(&format!("projects/{project_id}/files"), &[])?;
        take_field(&mut json, "files")
    }
}
