//! Axum router and API server lifecycle (plain HTTP or TLS).
//! Used by: service.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio_rustls::TlsAcceptor;
use tower::Service;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::guard;
use crate::handlers;
use crate::snapshot::SnapshotStore;
use crate::state::{build_state, AppState};
use crate::tls;

pub fn build_router(state: AppState) -> Router {
    with_middleware(routes(), state)
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/status", get(handlers::status::status))
        .route("/health", get(handlers::health::health))
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::not_found)
}

/// Outermost first: trace, cors (answers preflights), panic translation, auth.
fn with_middleware(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::require_bearer,
        ))
        .layer(CatchPanicLayer::custom(guard::internal_error_from_panic))
        .layer(middleware::from_fn_with_state(state.clone(), guard::cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

struct Running {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Settings are read at every `start`, so a reload takes effect on restart.
pub struct ApiServer {
    store: Arc<SnapshotStore>,
    settings: Settings,
    running: Option<Running>,
}

impl ApiServer {
    pub fn new(store: Arc<SnapshotStore>, settings: Settings) -> Self {
        Self {
            store,
            settings,
            running: None,
        }
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.local_addr)
    }

    /// No-op when already running. On failure nothing is left listening.
    pub async fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        self.try_start()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to start API server"))
    }

    async fn try_start(&mut self) -> Result<()> {
        let state = build_state(Arc::clone(&self.store), &self.settings)?;
        let acceptor = if self.settings.https.enabled {
            Some(tls::load_acceptor(&self.settings)?)
        } else {
            tracing::info!("running in HTTP mode");
            None
        };

        let addr = self.settings.bind_addr();
        let bind_err = |source| Error::Bind {
            addr: addr.clone(),
            source,
        };
        let listener = TcpListener::bind(&addr).await.map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;

        let router = build_router(state);
        let (shutdown, signal) = watch::channel(false);
        let task = match acceptor {
            Some(acceptor) => tokio::spawn(serve_tls(listener, acceptor, router, signal)),
            None => tokio::spawn(serve_plain(listener, router, signal)),
        };

        self.running = Some(Running {
            local_addr,
            shutdown,
            task,
        });
        tracing::info!(%local_addr, "API server started");
        Ok(())
    }

    /// Stops accepting and waits until the listener and every open connection
    /// are closed. No-op when stopped.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running.shutdown.send(true);
        if let Err(e) = running.task.await {
            tracing::warn!(error = %e, "API server task ended abnormally");
        }
        tracing::info!("API server stopped");
    }
}

async fn serve_plain(listener: TcpListener, router: Router, mut signal: watch::Receiver<bool>) {
    let shutdown = async move {
        let _ = signal.changed().await;
    };
    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
    {
        tracing::error!(error = %e, "API server exited with error");
    }
}

/// Returns once the listener is closed and every accepted connection has
/// finished. Idle keep-alive connections are closed on shutdown; in-flight
/// requests complete first.
async fn serve_tls(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    router: Router,
    mut signal: watch::Receiver<bool>,
) {
    let mut connections = JoinSet::new();
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                        continue;
                    }
                };
                connections.spawn(serve_tls_connection(
                    stream,
                    peer,
                    acceptor.clone(),
                    router.clone(),
                    signal.clone(),
                ));
            }
            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = joined {
                    tracing::warn!(error = %e, "connection task ended abnormally");
                }
            }
            _ = signal.changed() => break,
        }
    }

    drop(listener);
    let open = connections.len();
    if open > 0 {
        tracing::debug!(open, "draining TLS connections");
    }
    while let Some(joined) = connections.join_next().await {
        if let Err(e) = joined {
            tracing::warn!(error = %e, "connection task ended abnormally");
        }
    }
}

async fn serve_tls_connection(
    stream: TcpStream,
    peer: SocketAddr,
    acceptor: TlsAcceptor,
    router: Router,
    mut signal: watch::Receiver<bool>,
) {
    let stream = tokio::select! {
        handshake = acceptor.accept(stream) => match handshake {
            Ok(stream) => stream,
            Err(e) => {
                tracing::debug!(%peer, error = %e, "TLS handshake failed");
                return;
            }
        },
        _ = signal.changed() => return,
    };

    let svc = service_fn(move |request: hyper::Request<Incoming>| router.clone().call(request));
    let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), svc);
    tokio::pin!(conn);

    let served = tokio::select! {
        served = conn.as_mut() => served,
        _ = signal.changed() => {
            conn.as_mut().graceful_shutdown();
            conn.await
        }
    };
    if let Err(e) = served {
        tracing::debug!(%peer, error = %e, "connection error");
    }
}
