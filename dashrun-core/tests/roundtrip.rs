//! Decoding tests for hand-edited documents under `automation/`.
//!
//! Each `#[case]` is isolated — no shared state.

use dashrun_core::{settings, GitHubConfig, Settings};
use rstest::rstest;
use tempfile::TempDir;

fn write_settings(root: &TempDir, yaml: &str) {
    let dir = dashrun_core::paths::automation_dir(root.path());
    std::fs::create_dir_all(&dir).expect("mkdir");
    std::fs::write(dashrun_core::paths::settings_path(root.path()), yaml).expect("write");
}

// ---------------------------------------------------------------------------
// Settings overrides
// ---------------------------------------------------------------------------

#[rstest]
#[case("empty", "", 8080, "main", false)]
#[case("port_only", "server:\n  port: 9000\n", 9000, "main", false)]
#[case("branches", "github:\n  primary_branch: trunk\n", 8080, "trunk", false)]
#[case("private", "github:\n  private: true\n", 8080, "main", true)]
#[case(
    "everything",
    "server:\n  host: 0.0.0.0\n  port: 7000\ngithub:\n  primary_branch: dev\n  private: true\nidentity:\n  name: Me\n",
    7000,
    "dev",
    true
)]
fn settings_overrides(
    #[case] label: &str,
    #[case] yaml: &str,
    #[case] port: u16,
    #[case] branch: &str,
    #[case] private: bool,
) {
    let root = TempDir::new().expect("tempdir");
    write_settings(&root, yaml);
    let loaded: Settings =
        settings::load_at(root.path()).unwrap_or_else(|e| panic!("[{label}] load failed: {e}"));
    assert_eq!(loaded.server.port, port, "[{label}] port");
    assert_eq!(loaded.github.primary_branch, branch, "[{label}] branch");
    assert_eq!(loaded.github.private, private, "[{label}] private");
    assert_eq!(loaded.github.fallback_branch, "master", "[{label}] fallback untouched");
}

#[test]
fn partial_identity_keeps_default_email() {
    let root = TempDir::new().expect("tempdir");
    write_settings(&root, "identity:\n  name: Analyst\n");
    let loaded = settings::load_at(root.path()).expect("load");
    assert_eq!(loaded.identity.name, "Analyst");
    assert_eq!(loaded.identity.email, "trading.project.002@example.com");
}

// ---------------------------------------------------------------------------
// GitHub config record variants
// ---------------------------------------------------------------------------

#[rstest]
#[case("empty_object", "{}", None, None)]
#[case("token_only", r#"{"github_token":"t1"}"#, Some("t1"), None)]
#[case(
    "full_record",
    r#"{"github_token":"t2","repo_name":"trading-project-002","repo_url":"https://github.com/u/r.git","created_at":"2025-09-01T08:00:00Z"}"#,
    Some("t2"),
    Some("https://github.com/u/r.git")
)]
#[case(
    "unknown_keys_ignored",
    r#"{"repo_url":"https://github.com/u/r.git","extra":1}"#,
    None,
    Some("https://github.com/u/r.git")
)]
fn github_config_variants(
    #[case] label: &str,
    #[case] json: &str,
    #[case] token: Option<&str>,
    #[case] url: Option<&str>,
) {
    let cfg: GitHubConfig =
        serde_json::from_str(json).unwrap_or_else(|e| panic!("[{label}] decode failed: {e}"));
    assert_eq!(cfg.token(), token, "[{label}] token");
    assert_eq!(cfg.url(), url, "[{label}] url");
}
