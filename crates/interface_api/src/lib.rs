//! HTTP API Layer
//!
//! REST API for the EVP validation workflow using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: submissions and tracks, role queues, export and reporting
//! - **Middleware**: JWT authentication resolving the caller's role, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: domain errors mapped to status codes with a JSON body
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let service = ValidationService::new(Arc::new(InMemorySubmissionPort::new()));
//! let app = create_router(service, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};

use domain_evp::ValidationService;

use crate::config::ApiConfig;
use crate::middleware::{auth_middleware, audit_middleware};
use crate::handlers::{health, queue, submissions};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: ValidationService,
    pub config: ApiConfig,
}

/// Creates the main API router
pub fn create_router(service: ValidationService, config: ApiConfig) -> Router {
    let state = AppState { service, config };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let submission_routes = Router::new()
        .route("/", post(submissions::open_submission))
        .route("/:id", get(submissions::get_submission))
        .route("/:id/tracks", post(submissions::attach_track))
        .route("/:id/tracks/:track_type/submit", post(submissions::submit_track))
        .route("/:id/tracks/:track_type/decisions", post(submissions::decide))
        .route("/:id/tracks/:track_type/history", get(submissions::track_history));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/submissions", submission_routes)
        .route("/queue", get(queue::role_queue))
        .route("/exports/:track_type", get(queue::export_approved))
        .route("/reports/summary", get(queue::reporting_summary))
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
