//! End-to-end tests over a real TCP listener on an ephemeral port.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashrun_daemon::{serve, Action, ActionHandler, ActionResponse, ProjectActions};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Counts calls and the largest number of actions seen running at once.
#[derive(Default)]
struct Recorder {
    calls: AtomicUsize,
    running: AtomicUsize,
    max_running: AtomicUsize,
}

impl ActionHandler for Recorder {
    fn handle(&self, action: Action) -> ActionResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(40));
        self.running.fetch_sub(1, Ordering::SeqCst);
        if action == Action::GithubSync {
            panic!("hosting API exploded");
        }
        ActionResponse::ok(action.as_str())
    }
}

struct Server {
    addr: SocketAddr,
    shutdown: broadcast::Sender<()>,
    handle: JoinHandle<Result<(), dashrun_daemon::DaemonError>>,
}

impl Server {
    async fn start(handler: Arc<dyn ActionHandler>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let (shutdown, _) = broadcast::channel(4);
        let handle = tokio::spawn(serve(listener, handler, shutdown.clone()));
        Self {
            addr,
            shutdown,
            handle,
        }
    }

    fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    async fn stop(self) {
        let _ = self.shutdown.send(());
        self.handle
            .await
            .expect("join")
            .expect("server exits cleanly");
    }
}

/// Blocking POST; `Err` when the connection failed before a response arrived.
fn try_post(url: &str, body: &str) -> Result<(u16, Option<String>, Value), ureq::Transport> {
    let result = ureq::post(url)
        .set("Content-Type", "application/json")
        .send_string(body);
    let resp = match result {
        Ok(resp) => resp,
        Err(ureq::Error::Status(_, resp)) => resp,
        Err(ureq::Error::Transport(err)) => return Err(err),
    };
    let status = resp.status();
    let origin = resp.header("Access-Control-Allow-Origin").map(str::to_string);
    let json: Value = resp.into_json().expect("json body");
    Ok((status, origin, json))
}

/// Blocking POST; returns (status, ACAO header, body).
fn post(url: &str, body: &str) -> (u16, Option<String>, Value) {
    try_post(url, body).unwrap_or_else(|err| panic!("transport error: {err}"))
}

async fn post_async(url: String, body: impl Into<String>) -> (u16, Option<String>, Value) {
    let body = body.into();
    tokio::task::spawn_blocking(move || post(&url, &body))
        .await
        .expect("client task")
}

// ---------------------------------------------------------------------------
// 1. Routing
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unknown_action_is_a_structured_failure() {
    let recorder = Arc::new(Recorder::default());
    let server = Server::start(recorder.clone()).await;

    let (status, origin, body) = post_async(server.url(), r#"{"action":"unknown_action"}"#).await;
    assert_eq!(status, 200);
    assert_eq!(origin.as_deref(), Some("*"));
    assert_eq!(body["success"], json!(false));
    assert!(!body["error"].as_str().unwrap_or_default().is_empty());
    assert_eq!(recorder.calls.load(Ordering::SeqCst), 0);

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn known_action_reaches_the_handler() {
    let recorder = Arc::new(Recorder::default());
    let server = Server::start(recorder.clone()).await;

    let (status, _, body) = post_async(server.url(), r#"{"action":"update_docs"}"#).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"success": true, "message": "update_docs"}));
    assert_eq!(recorder.calls.load(Ordering::SeqCst), 1);

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn options_returns_cors_preflight() {
    let server = Server::start(Arc::new(Recorder::default())).await;
    let url = server.url();

    let (status, origin, methods) = tokio::task::spawn_blocking(move || {
        let resp = ureq::request("OPTIONS", &url).call().expect("options");
        (
            resp.status(),
            resp.header("Access-Control-Allow-Origin").map(str::to_string),
            resp.header("Access-Control-Allow-Methods").map(str::to_string),
        )
    })
    .await
    .expect("client task");
    assert_eq!(status, 200);
    assert_eq!(origin.as_deref(), Some("*"));
    assert_eq!(methods.as_deref(), Some("POST, GET, OPTIONS"));

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn get_is_method_not_allowed() {
    let server = Server::start(Arc::new(Recorder::default())).await;
    let url = server.url();

    let status = tokio::task::spawn_blocking(move || match ureq::get(&url).call() {
        Ok(resp) => resp.status(),
        Err(ureq::Error::Status(code, _)) => code,
        Err(err) => panic!("transport error: {err}"),
    })
    .await
    .expect("client task");
    assert_eq!(status, 405);

    server.stop().await;
}

// ---------------------------------------------------------------------------
// 2. Failures at the HTTP boundary
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn malformed_body_is_a_server_error() {
    let server = Server::start(Arc::new(Recorder::default())).await;

    let (status, origin, body) = post_async(server.url(), "{not json").await;
    assert_eq!(status, 500);
    assert_eq!(origin.as_deref(), Some("*"));
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap_or_default().starts_with("server error:"));

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_action_is_a_server_error_and_the_server_survives() {
    let server = Server::start(Arc::new(Recorder::default())).await;

    let (status, _, body) = post_async(server.url(), r#"{"action":"github_sync"}"#).await;
    assert_eq!(status, 500);
    assert!(body["error"].as_str().unwrap_or_default().contains("action panicked"));

    let (status, _, body) = post_async(server.url(), r#"{"action":"update_conversations"}"#).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], json!(true));

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn non_string_action_is_unrecognized() {
    let recorder = Arc::new(Recorder::default());
    let server = Server::start(recorder.clone()).await;

    let (status, origin, body) = post_async(server.url(), r#"{"action": 5}"#).await;
    assert_eq!(status, 200);
    assert_eq!(origin.as_deref(), Some("*"));
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("unrecognized action: 5"));
    assert_eq!(recorder.calls.load(Ordering::SeqCst), 0);

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn oversized_body_is_rejected_before_dispatch() {
    let recorder = Arc::new(Recorder::default());
    let server = Server::start(recorder.clone()).await;

    let payload = format!(r#"{{"action":"update_docs","pad":"{}"}}"#, "x".repeat(70 * 1024));
    let url = server.url();
    let outcome = tokio::task::spawn_blocking(move || try_post(&url, &payload))
        .await
        .expect("client task");
    // The server may close before the client finishes writing.
    if let Ok((status, _, body)) = outcome {
        assert_eq!(status, 500);
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].as_str().unwrap_or_default().starts_with("server error:"));
    }
    assert_eq!(recorder.calls.load(Ordering::SeqCst), 0);

    let (status, _, _) = post_async(server.url(), r#"{"action":"update_docs"}"#).await;
    assert_eq!(status, 200);

    server.stop().await;
}

// ---------------------------------------------------------------------------
// 3. Serialization of actions
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_run_one_action_at_a_time() {
    let recorder = Arc::new(Recorder::default());
    let server = Server::start(recorder.clone()).await;

    let requests: Vec<_> = (0..4)
        .map(|_| tokio::spawn(post_async(server.url(), r#"{"action":"update_docs"}"#)))
        .collect();
    for request in requests {
        let (status, _, _) = request.await.expect("request task");
        assert_eq!(status, 200);
    }
    assert_eq!(recorder.calls.load(Ordering::SeqCst), 4);
    assert_eq!(recorder.max_running.load(Ordering::SeqCst), 1);

    server.stop().await;
}

// ---------------------------------------------------------------------------
// 4. Production handler
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn update_docs_converts_project_markdown() {
    let root = tempfile::TempDir::new().expect("root");
    std::fs::write(root.path().join("prd.md"), "# PRD\n\n| a | b |\n|---|---|\n| 1 | 2 |\n")
        .expect("write");
    let server = Server::start(Arc::new(ProjectActions::new(root.path()))).await;

    let (status, _, body) = post_async(server.url(), r#"{"action":"update_docs"}"#).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["files_updated"], json!(1));
    assert_eq!(body["updated_files"], json!(["prd.html"]));
    let html = std::fs::read_to_string(root.path().join("prd.html")).expect("page");
    assert!(html.contains("<table>"));

    let (_, _, again) = post_async(server.url(), r#"{"action":"update_docs"}"#).await;
    assert_eq!(again["files_updated"], json!(0));

    server.stop().await;
}
