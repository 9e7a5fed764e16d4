//! `TickfeedServer` - axum HTTP + WebSocket server.

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tickfeed_core::ServerError;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

/// The tickfeed server. Routes are fixed when the router is built.
pub struct TickfeedServer {
    config: ServerConfig,
    state: AppState,
}

impl TickfeedServer {
    pub fn new(config: ServerConfig) -> Self {
        let state = AppState::new(&config);
        Self { config, state }
    }

    /// `/ws` goes to the time feed, everything else to the static assets.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws", get(routes::ws::upgrade))
            .fallback(routes::assets::serve)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let addr = self.config.bind_addr();
        TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })
    }

    /// Bind and serve in the background. Returns the bound address.
    pub async fn listen(
        &self,
    ) -> Result<(SocketAddr, JoinHandle<Result<(), ServerError>>), ServerError> {
        let listener = self.bind().await?;
        let addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind {
                addr: self.config.bind_addr(),
                source,
            })?;
        let router = self.router();
        let handle = tokio::spawn(serve(listener, router));
        Ok((addr, handle))
    }

    /// Bind and serve until the listener fails.
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        tracing::info!(
            target: "tickfeed::startup",
            mode = %self.state.assets.mode(),
            "Serving on {} (assets: {})",
            self.config.bind_addr(),
            self.state.assets
        );
        serve(listener, self.router()).await
    }
}

async fn serve(listener: TcpListener, router: Router) -> Result<(), ServerError> {
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(ServerError::Serve)
}
