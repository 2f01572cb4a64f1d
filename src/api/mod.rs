//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod response;
pub mod routes;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

pub use response::ApiResponse;
pub use routes::create_router;

/// Build the full application: health probes, `/api` routes and layers
pub fn build_router(state: AppState, cors_origin: Option<&str>) -> Result<Router, AppError> {
    // Layers run outermost-last: request id -> cors -> trace -> logging -> handler
    let api_router = create_router().layer(axum::middleware::from_fn(middleware::logging_middleware));

    Ok(Router::new()
        .route("/health", get(routes::health_check))
        .route("/health/ready", get(routes::readiness))
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origin)?)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state))
}

/// Same-origin only unless an origin is configured
fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, AppError> {
    let Some(origin) = origin else {
        return Ok(CorsLayer::new());
    };

    let origin: HeaderValue = origin
        .parse()
        .map_err(|_| AppError::Internal(format!("Invalid CORS origin '{}'", origin)))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_origin_validation() {
        assert!(cors_layer(None).is_ok());
        assert!(cors_layer(Some("https://grabi.dz")).is_ok());
        assert!(cors_layer(Some("bad\norigin")).is_err());
    }
}
