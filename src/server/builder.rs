//! ServerBuilder for fluent API to build HTTP servers

use super::router::{build_resource_routes, health_routes};
use crate::config::ServerConfig;
use crate::core::store::Store;
use crate::resources::AppState;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the crime API router
///
/// The store is injected here once and handed to every handler through
/// [`AppState`].
///
/// # Example
///
/// ```ignore
/// let store = SqliteStore::connect(&config.database).await?;
///
/// ServerBuilder::new()
///     .with_store(store)
///     .with_config(&config.server)
///     .serve(&config.server.addr())
///     .await?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn Store>>,
    request_timeout: Duration,
    allow_any_origin: bool,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        let defaults = ServerConfig::default();
        Self {
            store: None,
            request_timeout: defaults.request_timeout(),
            allow_any_origin: defaults.allow_any_origin,
            custom_routes: Vec::new(),
        }
    }

    /// Set the store (required)
    pub fn with_store(self, store: impl Store + 'static) -> Self {
        self.with_shared_store(Arc::new(store))
    }

    /// Set a store that is also held elsewhere
    pub fn with_shared_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the per-request deadline
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Answer cross-origin requests from any origin
    pub fn with_cors(mut self, allow_any_origin: bool) -> Self {
        self.allow_any_origin = allow_any_origin;
        self
    }

    /// Apply timeout and CORS settings from configuration
    pub fn with_config(self, config: &ServerConfig) -> Self {
        self.with_request_timeout(config.request_timeout())
            .with_cors(config.allow_any_origin)
    }

    /// Add custom routes to the server
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the router
    ///
    /// This generates:
    /// - Health routes
    /// - Custom routes
    /// - Resource routes
    pub fn build(self) -> Result<Router> {
        let store = self
            .store
            .ok_or_else(|| anyhow::anyhow!("Store is required. Call .with_store()"))?;

        let state = AppState::new(store, self.request_timeout);

        let mut app = health_routes();
        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }
        app = app.merge(build_resource_routes(state));

        if self.allow_any_origin {
            app = app.layer(CorsLayer::permissive());
        }

        Ok(app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http())))
    }

    /// Build the router and serve it until Ctrl+C or SIGTERM
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Now listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
