//! Remote repository creation through the hosting provider's API.
//!
//! ```text
//! POST {api_base}/user/repos      Authorization: Bearer <token>
//!   201 → {clone_url, html_url}   persisted to automation/github_config.json
//!   422 → already exists
//!   *   → status + body surfaced as-is
//! ```

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use dashrun_core::settings::GitHubSettings;
use dashrun_core::{ConfigStore, GitHubConfig, RepoName};

use crate::error::SyncError;

/// Request body for repository creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRepository {
    pub name: String,
    pub description: String,
    pub private: bool,
    pub auto_init: bool,
    pub has_issues: bool,
    pub has_wiki: bool,
    pub has_downloads: bool,
}

impl NewRepository {
    pub fn from_settings(github: &GitHubSettings) -> Self {
        Self {
            name: github.repo_name.0.clone(),
            description: github.description.clone(),
            private: github.private,
            auto_init: false,
            has_issues: true,
            has_wiki: true,
            has_downloads: true,
        }
    }
}

/// Status and raw body of a provider reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    pub status: u16,
    pub body: String,
}

/// The part of a 201 reply the workflow uses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedRepository {
    pub clone_url: String,
    #[serde(default)]
    pub html_url: String,
}

/// Creates repositories on a hosting provider.
pub trait HostingProvider {
    /// Send one creation request. Non-2xx statuses are `Ok` replies; `Err`
    /// is reserved for transport failures.
    fn create_repository(&self, token: &str, repo: &NewRepository) -> Result<ApiReply, SyncError>;
}

// ---------------------------------------------------------------------------
// GitHub REST implementation
// ---------------------------------------------------------------------------

pub struct GitHubApi {
    agent: ureq::Agent,
    api_base: String,
}

impl GitHubApi {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(github: &GitHubSettings) -> Self {
        Self::new(github.api_base.clone(), Duration::from_secs(github.timeout_secs))
    }
}

impl HostingProvider for GitHubApi {
    fn create_repository(&self, token: &str, repo: &NewRepository) -> Result<ApiReply, SyncError> {
        let url = format!("{}/user/repos", self.api_base);
        tracing::info!(name = %repo.name, "creating remote repository");
        let result = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {token}"))
            .set("Accept", "application/vnd.github.v3+json")
            .set("User-Agent", concat!("dashrun/", env!("CARGO_PKG_VERSION")))
            .send_json(repo);

        match result {
            Ok(resp) => {
                let status = resp.status();
                let body = resp
                    .into_string()
                    .map_err(|e| SyncError::Network(e.to_string()))?;
                Ok(ApiReply { status, body })
            }
            Err(ureq::Error::Status(status, resp)) => Ok(ApiReply {
                status,
                body: resp.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(transport)) => Err(SyncError::Network(transport.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// create_remote
// ---------------------------------------------------------------------------

/// Create `repo` and persist the resulting config record.
///
/// A blank or absent `token` fails with [`SyncError::MissingToken`] before
/// any request is made. A record that cannot be saved is logged; the created
/// repository is still returned.
pub fn create_remote(
    provider: &dyn HostingProvider,
    store: &dyn ConfigStore,
    token: Option<&str>,
    token_env: &str,
    repo: &NewRepository,
) -> Result<CreatedRepository, SyncError> {
    let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
        return Err(SyncError::MissingToken {
            env_var: token_env.to_string(),
        });
    };

    let reply = provider.create_repository(token, repo)?;
    match reply.status {
        201 => {
            let created: CreatedRepository = serde_json::from_str(&reply.body)
                .map_err(|e| SyncError::InvalidApiResponse(e.to_string()))?;
            let record = GitHubConfig {
                github_token: Some(token.to_string()),
                repo_name: Some(RepoName::from(repo.name.as_str())),
                repo_url: Some(created.clone_url.clone()),
                created_at: Some(Utc::now()),
            };
            if let Err(err) = store.save(&record) {
                tracing::warn!(error = %err, "repository created but config not saved");
            }
            tracing::info!(url = %created.html_url, "remote repository created");
            Ok(created)
        }
        422 => Err(SyncError::RepositoryExists {
            name: repo.name.clone(),
        }),
        status => Err(SyncError::Api {
            status,
            body: reply.body,
        }),
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::RefCell;

    use super::*;

    /// Provider answering every request with one fixed reply.
    pub(crate) struct FixedProvider {
        reply: ApiReply,
        pub(crate) requests: RefCell<Vec<(String, NewRepository)>>,
    }

    impl FixedProvider {
        pub(crate) fn new(status: u16, body: &str) -> Self {
            Self {
                reply: ApiReply {
                    status,
                    body: body.to_string(),
                },
                requests: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn created(clone_url: &str) -> Self {
            Self::new(
                201,
                &serde_json::json!({ "clone_url": clone_url, "html_url": clone_url.trim_end_matches(".git") })
                    .to_string(),
            )
        }
    }

    impl HostingProvider for FixedProvider {
        fn create_repository(&self, token: &str, repo: &NewRepository) -> Result<ApiReply, SyncError> {
            self.requests
                .borrow_mut()
                .push((token.to_string(), repo.clone()));
            Ok(self.reply.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FixedProvider;
    use super::*;
    use dashrun_core::MemoryConfigStore;
    use rstest::rstest;

    fn repo() -> NewRepository {
        NewRepository::from_settings(&GitHubSettings::default())
    }

    #[test]
    fn request_body_matches_provider_fields() {
        let body = serde_json::to_value(repo()).unwrap();
        assert_eq!(body["name"], "trading-project-002");
        assert_eq!(body["auto_init"], false);
        assert_eq!(body["has_wiki"], true);
        assert_eq!(body["private"], false);
    }

    #[test]
    fn missing_token_never_calls_provider() {
        let provider = FixedProvider::created("https://github.com/u/r.git");
        let store = MemoryConfigStore::new();
        for token in [None, Some(""), Some("   ")] {
            let err = create_remote(&provider, &store, token, "GITHUB_TOKEN", &repo()).unwrap_err();
            assert!(matches!(err, SyncError::MissingToken { .. }));
        }
        assert!(provider.requests.borrow().is_empty());
    }

    #[test]
    fn created_repository_is_persisted() {
        let provider = FixedProvider::created("https://github.com/u/trading-project-002.git");
        let store = MemoryConfigStore::new();
        let created = create_remote(&provider, &store, Some("tok"), "GITHUB_TOKEN", &repo()).unwrap();
        assert_eq!(created.clone_url, "https://github.com/u/trading-project-002.git");

        let saved = store.current().expect("record saved");
        assert_eq!(saved.token(), Some("tok"));
        assert_eq!(saved.url(), Some("https://github.com/u/trading-project-002.git"));
        assert!(saved.created_at.is_some());
        assert_eq!(provider.requests.borrow()[0].0, "tok");
    }

    #[rstest]
    #[case::conflict(422, r#"{"message":"Repository creation failed."}"#, "already exists")]
    #[case::bad_credentials(401, r#"{"message":"Bad credentials"}"#, "401 - {\"message\":\"Bad credentials\"}")]
    #[case::server_fault(500, "upstream unavailable", "500 - upstream unavailable")]
    #[case::ok_is_not_created(200, r#"{"clone_url":"https://github.com/u/r.git"}"#, "200 - ")]
    fn non_created_status_is_an_error_and_nothing_is_saved(
        #[case] status: u16,
        #[case] body: &str,
        #[case] message: &str,
    ) {
        let provider = FixedProvider::new(status, body);
        let store = MemoryConfigStore::new();
        let err = create_remote(&provider, &store, Some("tok"), "GITHUB_TOKEN", &repo()).unwrap_err();
        match status {
            422 => assert!(matches!(err, SyncError::RepositoryExists { .. }), "got: {err}"),
            _ => assert!(matches!(err, SyncError::Api { status: s, .. } if s == status), "got: {err}"),
        }
        assert!(err.to_string().contains(message), "got: {err}");
        assert!(store.current().is_none());
        assert_eq!(provider.requests.borrow().len(), 1);
    }

    #[test]
    fn malformed_success_body_is_invalid_response() {
        let provider = FixedProvider::new(201, "{}");
        let err = create_remote(&provider, &MemoryConfigStore::new(), Some("tok"), "GITHUB_TOKEN", &repo())
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidApiResponse(_)));
    }

    #[test]
    fn unreachable_api_is_a_network_error() {
        let api = GitHubApi::new("http://127.0.0.1:9", Duration::from_secs(2));
        let err = api.create_repository("tok", &repo()).unwrap_err();
        assert!(matches!(err, SyncError::Network(_)), "got: {err}");
    }
}
