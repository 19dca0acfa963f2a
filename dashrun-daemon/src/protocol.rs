//! JSON documents exchanged with the dashboard.
//!
//! Requests are `{"action": "<name>"}`. Every response carries `success`;
//! the remaining fields depend on the action and are omitted when unset.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The actions the dashboard buttons trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    UpdateConversations,
    UpdateDocs,
    GithubSync,
}

impl Action {
    pub const ALL: [Action; 3] = [
        Action::UpdateConversations,
        Action::UpdateDocs,
        Action::GithubSync,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::UpdateConversations => "update_conversations",
            Action::UpdateDocs => "update_docs",
            Action::GithubSync => "github_sync",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `POST /` body. A missing, null or non-string `action` is treated like an
/// unknown one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub action: Option<Value>,
}

impl ActionRequest {
    /// The requested name; non-string values are rendered as JSON text so
    /// they can be reported back.
    pub fn action_name(&self) -> Option<String> {
        match self.action.as_ref()? {
            Value::Null => None,
            Value::String(name) => Some(name.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Response document for every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Activities recorded by a conversation update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_updated: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_files: Option<Vec<String>>,
    /// `"sync"` or `"created"` for a GitHub sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Failure for anything unexpected at the HTTP layer.
    pub fn server_error(detail: impl fmt::Display) -> Self {
        Self::failure(format!("server error: {detail}"))
    }

    pub fn unrecognized(name: Option<&str>) -> Self {
        match name {
            Some(name) => Self::failure(format!("unrecognized action: {name}")),
            None => Self::failure("unrecognized action"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_roundtrip() {
        for action in Action::ALL {
            assert_eq!(Action::parse(action.as_str()), Some(action));
        }
        assert_eq!(Action::parse("unknown_action"), None);
        assert_eq!(Action::parse("UPDATE_DOCS"), None);
    }

    #[test]
    fn unset_fields_are_omitted() {
        let json = serde_json::to_value(ActionResponse::ok("done")).expect("encode");
        assert_eq!(json, serde_json::json!({"success": true, "message": "done"}));
    }

    #[test]
    fn request_without_action_decodes() {
        let req: ActionRequest = serde_json::from_str("{}").expect("decode");
        assert_eq!(req.action_name(), None);
        let req: ActionRequest = serde_json::from_str(r#"{"action":null}"#).expect("decode");
        assert_eq!(req.action_name(), None);
        let req: ActionRequest =
            serde_json::from_str(r#"{"action":"update_docs","extra":true}"#).expect("decode");
        assert_eq!(req.action_name().as_deref(), Some("update_docs"));
    }

    #[test]
    fn non_string_action_decodes_as_unknown_name() {
        for (body, name) in [
            (r#"{"action":5}"#, "5"),
            (r#"{"action":true}"#, "true"),
            (r#"{"action":["update_docs"]}"#, r#"["update_docs"]"#),
        ] {
            let req: ActionRequest = serde_json::from_str(body).expect("decode");
            let decoded = req.action_name();
            assert_eq!(decoded.as_deref(), Some(name));
            assert_eq!(decoded.as_deref().and_then(Action::parse), None);
        }
    }

    #[test]
    fn unrecognized_names_the_action() {
        let resp = ActionResponse::unrecognized(Some("unknown_action"));
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("unrecognized action: unknown_action"));
    }
}
