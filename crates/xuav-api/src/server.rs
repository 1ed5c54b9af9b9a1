use crate::{create_router, AppState};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;
use xuav_core::Settings;

pub struct Server {
    state: AppState,
    addr: SocketAddr,
}

impl Server {
    pub async fn new(settings: Settings) -> Result<Self> {
        Self::with_state(AppState::new(settings)).await
    }

    /// Serve a prepared state, e.g. one holding a seeded in-memory graph.
    pub async fn with_state(state: AppState) -> Result<Self> {
        let bind = state.settings.bind_address();
        let addr = tokio::net::lookup_host(&bind)
            .await
            .with_context(|| format!("Failed to resolve bind address {}", bind))?
            .next()
            .with_context(|| format!("No socket address for {}", bind))?;

        Ok(Self { state, addr })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn run(self) -> Result<()> {
        let settings = self.state.settings.clone();
        let router = create_router(self.state);

        info!("Starting {} on {}", settings.api.project_name, self.addr);

        let listener = {
            let socket = if self.addr.is_ipv6() {
                tokio::net::TcpSocket::new_v6()
            } else {
                tokio::net::TcpSocket::new_v4()
            }
            .context("Failed to create socket")?;

            let _ = socket.set_reuseaddr(true);
            let _ = socket.set_keepalive(true);

            socket
                .bind(self.addr)
                .with_context(|| format!("Failed to bind {}", self.addr))?;
            socket.listen(1024)?
        };

        info!("Server listening on http://{}", self.addr);
        info!("Catalog API at {} (catalog: {})", settings.api.prefix, settings.database.catalog.path);
        info!(
            "Graph API at {} (graph: {})",
            settings.api.v1_prefix, settings.database.graph.connection
        );
        info!("OpenAPI document at /openapi.json");
        #[cfg(feature = "openapi-ui")]
        info!("Swagger UI at /docs");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
