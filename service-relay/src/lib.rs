pub mod api;
pub mod config;
pub mod error;
pub mod message;
pub mod registry;
pub mod router;
pub mod session;
pub mod sink;
pub mod state;

use api::{
    not_found,
    ws::{WS_PATH, websocket_handler},
};
use axum::{Router, routing};
use config::RelayConfig;
use error::{RelayError, RelayResult};
use session::ChatLog;
use state::{RelayState, init_state};
use tokio::{net::TcpListener, task::JoinHandle};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use valkey_client::MessageLog;

pub struct ServerBuilder {
    tcp_listener: TcpListener,
    router: Router,
    broadcast: JoinHandle<()>,
}

impl ServerBuilder {
    pub async fn new(config: &RelayConfig) -> RelayResult<Self> {
        let tcp_listener = Self::init_tcp_listener(config).await?;
        let log = Self::init_log(config).await?;
        let (state, broadcast) = init_state(log, config.send_timeout, config.persist_timeout);
        let router = init_router(state);

        Ok(Self {
            tcp_listener,
            router,
            broadcast,
        })
    }

    async fn init_tcp_listener(config: &RelayConfig) -> RelayResult<TcpListener> {
        let addr = config.addr();

        TcpListener::bind(&addr)
            .await
            .map_err(|source| RelayError::Bind { addr, source })
    }

    /// Persistence is best effort, so an unreachable log only gets reported here.
    async fn init_log(config: &RelayConfig) -> RelayResult<MessageLog> {
        let log = MessageLog::new(&config.valkey)?;

        match log.ping().await {
            Ok(()) => tracing::info!(endpoint = %config.valkey.endpoint(), "durable log reachable"),
            Err(e) => tracing::error!(
                endpoint = %config.valkey.endpoint(),
                error = %e,
                "durable log unreachable, messages will not be persisted until it recovers"
            ),
        }

        Ok(log)
    }

    pub fn init_tracing() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .compact()
            .with_file(true)
            .with_line_number(true)
            .with_target(false)
            .init();
    }

    pub async fn run(self) -> RelayResult<()> {
        let addr = self.tcp_listener.local_addr().map_err(RelayError::Serve)?;
        tracing::info!("listening on ws://{addr}{WS_PATH}");

        let served = axum::serve(self.tcp_listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(RelayError::Serve);

        self.broadcast.abort();
        served
    }
}

pub fn init_router<L: ChatLog>(state: RelayState<L>) -> Router {
    Router::new()
        .route(WS_PATH, routing::get(websocket_handler::<L>))
        .with_state(state)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await
        }
    }
}
