//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the inspecting handler on every path
//! - Wire up middleware (tracing)
//! - Bind server to listener with peer addresses attached
//! - Run each request through the inspection pipeline
//! - Forward allowed requests to the upstream
//! - Observability (metrics, audit logging)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::WafConfig;
use crate::error::WafError;
use crate::http::forward::Forwarder;
use crate::http::response;
use crate::inspection::{Decision, InspectionPipeline};
use crate::lifecycle::ShutdownSignal;
use crate::net::ClientId;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<InspectionPipeline>,
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the inspecting proxy.
pub struct WafServer {
    router: Router,
    config: WafConfig,
    pipeline: Arc<InspectionPipeline>,
}

impl WafServer {
    /// Create a new server. Compiles signatures and creates the rate limiter,
    /// which lives as long as the server.
    pub fn new(config: WafConfig) -> Result<Self, WafError> {
        let pipeline = Arc::new(InspectionPipeline::from_config(&config)?);
        let forwarder = Forwarder::new(&config.upstream).map_err(|source| WafError::InvalidUpstream {
            address: config.upstream.address.clone(),
            source,
        })?;

        let state = AppState {
            pipeline: Arc::clone(&pipeline),
            forwarder: Arc::new(forwarder),
        };

        let router = Self::build_router(state);
        Ok(Self {
            router,
            config,
            pipeline,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(inspect_handler))
            .route("/", any(inspect_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The configured router, for driving requests without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Shared pipeline (rate limiter state included).
    pub fn pipeline(&self) -> &Arc<InspectionPipeline> {
        &self.pipeline
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Inspect a request and either reject it or relay it upstream.
async fn inspect_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let client = ClientId::from_request(&request);

    let response = match state.pipeline.evaluate(&client, request).await {
        Ok(evaluation) => match evaluation.decision {
            Decision::Allow => match state.forwarder.forward(&client, evaluation.request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(client = %client, error = %e, "Upstream error");
                    e.into_response()
                }
            },
            Decision::RateLimited => response::too_many_requests(),
            Decision::Blocked(_) => response::forbidden(),
        },
        Err(e) => {
            tracing::warn!(client = %client, error = %e, "Rejected unreadable request body");
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}
