use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::actions::{self, ActionHandler, ProjectActions};
use crate::error::{io_err, DaemonError};
use crate::protocol::{ActionRequest, ActionResponse};

/// Requests waiting for the processor; callers beyond this wait on `send`.
const QUEUE_DEPTH: usize = 16;

/// Largest request body read before the connection is answered with an error.
const MAX_BODY_BYTES: usize = 64 * 1024;

struct ActionJob {
    name: Option<String>,
    respond_to: oneshot::Sender<Result<ActionResponse, String>>,
}

/// Start the HTTP runtime for `root` and block the current thread until it
/// exits.
pub fn start_blocking(root: PathBuf, addr: SocketAddr) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(root, addr))
}

/// Bind `addr` and serve the production actions until Ctrl-C.
pub async fn run(root: PathBuf, addr: SocketAddr) -> Result<(), DaemonError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| DaemonError::Bind { addr, source })?;
    let local = listener.local_addr().map_err(|e| io_err("listener", e))?;
    tracing::info!(addr = %local, root = %root.display(), "dashboard endpoint listening");

    let (shutdown_tx, _) = broadcast::channel::<()>(16);
    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(DaemonError::Protocol(format!("ctrl-c handler failed: {err}"))),
                    }
                }
            }
        })
    };

    let handler: Arc<dyn ActionHandler> = Arc::new(ProjectActions::new(root));
    let served = serve(listener, handler, shutdown_tx.clone()).await;
    let _ = shutdown_tx.send(());
    handle_join("signal_handler", signal_handle.await)?;
    served
}

/// Serve dashboard requests on `listener` until `shutdown` fires.
///
/// Connections are handled concurrently; actions run one at a time on the
/// blocking pool.
pub async fn serve(
    listener: TcpListener,
    handler: Arc<dyn ActionHandler>,
    shutdown: broadcast::Sender<()>,
) -> Result<(), DaemonError> {
    let (job_tx, job_rx) = mpsc::channel::<ActionJob>(QUEUE_DEPTH);

    let processor_handle = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let result = action_processor_task(handler, job_rx, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let listener_handle = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let result = listener_task(listener, job_tx, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let (processor_result, listener_result) = tokio::join!(processor_handle, listener_handle);
    handle_join("action_processor", processor_result)?;
    handle_join("listener", listener_result)?;
    Ok(())
}

async fn action_processor_task(
    handler: Arc<dyn ActionHandler>,
    mut job_rx: mpsc::Receiver<ActionJob>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            maybe_job = job_rx.recv() => {
                let Some(job) = maybe_job else { break };
                let handler = handler.clone();
                let name = job.name.clone();
                let outcome = tokio::task::spawn_blocking(move || {
                    actions::dispatch(handler.as_ref(), name.as_deref())
                })
                .await
                .map_err(|err| {
                    tracing::error!(action = ?job.name, error = %err, "action task failed");
                    if err.is_panic() {
                        "action panicked".to_string()
                    } else {
                        err.to_string()
                    }
                });
                let _ = job.respond_to.send(outcome);
            }
        }
    }
    Ok(())
}

async fn listener_task(
    listener: TcpListener,
    job_tx: mpsc::Sender<ActionJob>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(err) => {
                        tracing::warn!(error = %err, "accept failed");
                        continue;
                    }
                };
                let job_tx = job_tx.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req| handle_request(req, job_tx.clone()));
                    if let Err(err) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        tracing::debug!(%peer, error = %err, "connection closed with error");
                    }
                });
            }
        }
    }
    Ok(())
}

async fn handle_request(
    req: Request<Incoming>,
    job_tx: mpsc::Sender<ActionJob>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let response = match method {
        Method::OPTIONS => preflight(),
        Method::POST => match read_action(req).await {
            Ok(request) => match enqueue(&job_tx, request.action_name()).await {
                Ok(resp) => json_response(StatusCode::OK, &resp),
                Err(err) => {
                    json_response(StatusCode::INTERNAL_SERVER_ERROR, &ActionResponse::server_error(err))
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "rejecting request body");
                json_response(StatusCode::INTERNAL_SERVER_ERROR, &ActionResponse::server_error(err))
            }
        },
        other => json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &ActionResponse::failure(format!("method {other} not allowed")),
        ),
    };
    Ok(response)
}

async fn read_action(req: Request<Incoming>) -> Result<ActionRequest, DaemonError> {
    let body = Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|err| DaemonError::Protocol(format!("cannot read body: {err}")))?
        .to_bytes();
    Ok(serde_json::from_slice(&body)?)
}

async fn enqueue(
    job_tx: &mpsc::Sender<ActionJob>,
    name: Option<String>,
) -> Result<ActionResponse, DaemonError> {
    let (respond_to, response_rx) = oneshot::channel();
    job_tx
        .send(ActionJob { name, respond_to })
        .await
        .map_err(|_| DaemonError::ChannelClosed("action queue"))?;
    response_rx
        .await
        .map_err(|_| DaemonError::ChannelClosed("action response"))?
        .map_err(DaemonError::Protocol)
}

fn preflight() -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::new()));
    let headers = resp.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, GET, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    resp
}

fn json_response(status: StatusCode, body: &ActionResponse) -> Response<Full<Bytes>> {
    let payload = serde_json::to_vec(body).unwrap_or_else(|err| {
        tracing::error!(error = %err, "cannot encode response");
        br#"{"success":false,"error":"server error: cannot encode response"}"#.to_vec()
    });
    let mut resp = Response::new(Full::new(Bytes::from(payload)));
    *resp.status_mut() = status;
    let headers = resp.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    resp
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Protocol(format!(
            "{task} task join failure: {err}"
        ))),
    }
}

/// Install the `tracing` subscriber on stderr (`RUST_LOG`, default `info`).
/// Safe to call more than once.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Action;

    struct Echo;

    impl ActionHandler for Echo {
        fn handle(&self, action: Action) -> ActionResponse {
            if action == Action::GithubSync {
                panic!("boom");
            }
            ActionResponse::ok(action.as_str())
        }
    }

    fn spawn_processor() -> (mpsc::Sender<ActionJob>, broadcast::Sender<()>) {
        let (job_tx, job_rx) = mpsc::channel(4);
        let (shutdown_tx, _) = broadcast::channel(1);
        let rx = shutdown_tx.subscribe();
        tokio::spawn(action_processor_task(Arc::new(Echo), job_rx, rx));
        (job_tx, shutdown_tx)
    }

    #[tokio::test]
    async fn processor_answers_through_oneshot() {
        let (job_tx, _shutdown) = spawn_processor();
        let resp = enqueue(&job_tx, Some("update_docs".to_string()))
            .await
            .expect("response");
        assert_eq!(resp.message.as_deref(), Some("update_docs"));
    }

    #[tokio::test]
    async fn panicking_action_becomes_protocol_error() {
        let (job_tx, _shutdown) = spawn_processor();
        let err = enqueue(&job_tx, Some("github_sync".to_string()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("action panicked"), "got: {err}");

        let after = enqueue(&job_tx, Some("update_docs".to_string()))
            .await
            .expect("processor survives a panic");
        assert!(after.success);
    }

    #[tokio::test]
    async fn closed_queue_is_reported() {
        let (job_tx, shutdown) = spawn_processor();
        let _ = shutdown.send(());
        job_tx.closed().await;
        let err = enqueue(&job_tx, None).await.unwrap_err();
        assert!(matches!(err, DaemonError::ChannelClosed(_)), "got: {err}");
    }

    #[test]
    fn json_responses_carry_cors_origin() {
        let resp = json_response(StatusCode::OK, &ActionResponse::ok("fine"));
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn preflight_lists_methods_and_headers() {
        let resp = preflight();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_METHODS], "POST, GET, OPTIONS");
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
    }
}
