// Server related imports
use axum::{
    Router,
    routing::{get, get_service, post},
};
use http::{Method, header};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

// General imports
use anyhow::{Context, Result};
use tokio::net::TcpListener;

// From lib
use super::{server_config::ServerConfig, server_state::ServerState};
use crate::handlers::{select_document::select_document, topic_list::topic_list};

pub struct AppBuilder {
    pub app: Router,
}

impl AppBuilder {
    pub fn new(state: ServerState) -> Self {
        // Router
        let app: Router = Router::new()
            .route("/api", post(select_document))
            .route("/api/topics", get(topic_list))
            .with_state(state);
        Self { app }
    }

    pub fn with_fallback(self, dir: &str) -> Self {
        Self {
            app: self.app.fallback(get_service(ServeDir::new(dir))),
        }
    }

    pub fn with_trace_layer(self) -> Self {
        Self {
            app: self.app.layer(TraceLayer::new_for_http()),
        }
    }

    pub fn with_cors_layer(self) -> Self {
        // CORS
        let cors_layer = if cfg!(debug_assertions) {
            CorsLayer::permissive()
        } else {
            let allow_origin = AllowOrigin::any();
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
                .allow_origin(allow_origin)
        };
        Self {
            app: self.app.layer(cors_layer),
        }
    }

    pub fn build(self) -> Router {
        self.app
    }
}

pub struct Server {
    /// Server configuration
    config: ServerConfig,
}

impl Server {
    /// Create a new server from a configuration
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Load the corpus and serve until the listener fails
    pub async fn run(&self) -> Result<()> {
        let state = ServerState::from_config(&self.config)?;
        let app: Router = AppBuilder::new(state)
            .with_fallback(self.config.assets_dir.as_str())
            .with_trace_layer()
            .with_cors_layer()
            .build();

        Self::serve(app, &self.config.address).await
    }

    async fn serve(app: Router, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        tracing::debug!("listening on {}", listener.local_addr()?);
        axum::serve(listener, app).await?;
        Ok(())
    }
}
