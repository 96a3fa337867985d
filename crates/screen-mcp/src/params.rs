//! MCP tool parameter structs, deserialized from JSON-RPC calls.

use schemars::JsonSchema;
use screen_resolve::QueryRequest;
use serde::Deserialize;

/// Parameters for the `search_screen_spec` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchScreenSpecParams {
    /// What to look for: a screen id (e.g. "CONT-05_04_54"), keywords in Korean or English
    /// (e.g. "콘트라베이스 3.0.6 사용자 관리"), or a number answering the previous choice list.
    pub(crate) query: String,
    /// Project name or alias (e.g. "contrabass", "비올라"). Detected from the query when omitted.
    pub(crate) project: Option<String>,
    /// Release version "X.Y.Z". Detected from the query when omitted.
    pub(crate) version: Option<String>,
    /// Confirm a single match without asking (default: true). Only applies when the version
    /// was given explicitly.
    pub(crate) auto_confirm: Option<bool>,
    /// Caller id keeping numbered choices apart between conversations (default: shared).
    pub(crate) session: Option<String>,
}

impl SearchScreenSpecParams {
    pub(crate) fn into_request(self) -> QueryRequest {
        QueryRequest {
            query: self.query,
            project: self.project,
            version: self.version,
            auto_confirm: self.auto_confirm.unwrap_or(true),
            session: self.session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_confirm_defaults_to_true() {
        let params: SearchScreenSpecParams =
            serde_json::from_value(serde_json::json!({ "query": "alert policy" })).unwrap();
        let request = params.into_request();
        assert!(request.auto_confirm);
        assert_eq!(request.project, None);
        assert_eq!(request.session, None);
    }

    #[test]
    fn test_camel_case_fields() {
        let params: SearchScreenSpecParams = serde_json::from_value(serde_json::json!({
            "query": "사용자 관리",
            "project": "cont",
            "version": "3.0.6",
            "autoConfirm": false,
            "session": "chat-42"
        }))
        .unwrap();
        let request = params.into_request();
        assert!(!request.auto_confirm);
        assert_eq!(request.version.as_deref(), Some("3.0.6"));
        assert_eq!(request.session.as_deref(), Some("chat-42"));
    }
}
