//! API Routes
//!
//! HTTP endpoint definitions. Each handler calls exactly one service.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{CategoryWithSubcategories, ListingView, SuggestionSet};
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::services::TrendingOutcome;
use crate::state::AppState;

use super::response::ApiResponse;

// =========================================================================
// Request types
// =========================================================================

/// `limit` arrives as text so a non-integer value is a 400, not a rejection
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    #[serde(default)]
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingsQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionsQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrackSearchRequest {
    #[serde(default)]
    pub query: Option<String>,
}

/// Malformed query strings answer with the JSON error body
fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> AppResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::InvalidArgument(rejection.body_text()))
}

/// Parse an optional `limit` parameter; blank counts as absent
fn parse_limit(raw: Option<&str>) -> AppResult<Option<i64>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::InvalidArgument(format!("limit must be an integer, got '{}'", value))),
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/:slug", get(get_category))
        .route("/listings", get(list_listings))
        .route("/listings/:id", get(get_listing))
        .route("/search/suggestions", get(search_suggestions))
        .route("/search/track", post(track_search))
        .route("/trending/categories", get(trending_categories))
        .route("/trending/searches", get(trending_searches))
}

// =========================================================================
// Categories
// =========================================================================

async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<CategoryWithSubcategories>>>> {
    let categories = state.categories().get_all_categories().await?;
    Ok(Json(ApiResponse::ok(categories)))
}

async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<CategoryWithSubcategories>>> {
    let category = state.categories().get_category(&slug).await?;
    Ok(Json(ApiResponse::ok(category)))
}

// =========================================================================
// Listings
// =========================================================================

async fn list_listings(
    State(state): State<AppState>,
    query: Result<Query<ListingsQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<Vec<ListingView>>>> {
    let params = query_params(query)?;
    let limit = parse_limit(params.limit.as_deref())?;
    let category = params.category.filter(|slug| !slug.trim().is_empty());

    let listings = state.listings().recent_listings(category, limit).await?;
    Ok(Json(ApiResponse::ok(listings)))
}

async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ListingView>>> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::InvalidArgument(format!("Invalid listing id '{}'", id)))?;

    let listing = state.listings().get_listing(id).await?;
    Ok(Json(ApiResponse::ok(listing)))
}

// =========================================================================
// Search
// =========================================================================

async fn search_suggestions(
    State(state): State<AppState>,
    query: Result<Query<SuggestionsQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<SuggestionSet>>> {
    let params = query_params(query)?;
    let limit = parse_limit(params.limit.as_deref())?;
    let query = params.q.unwrap_or_default();

    let suggestions = state.suggestions().get_suggestions(&query, limit).await?;
    Ok(Json(ApiResponse::ok(suggestions)))
}

async fn track_search(
    State(state): State<AppState>,
    payload: Result<Json<TrackSearchRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<()>>> {
    let Json(request) = payload.map_err(|rejection| AppError::InvalidArgument(rejection.body_text()))?;
    let query = request
        .query
        .ok_or_else(|| AppError::InvalidArgument("query is required".to_string()))?;

    state.tracking().track_search(&query).await?;
    Ok(Json(ApiResponse::done()))
}

// =========================================================================
// Trending
// =========================================================================

/// A masked failure still answers with the outcome body, as a 500
fn trending_response<T: Serialize>(outcome: TrendingOutcome<T>) -> Response {
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(outcome)).into_response()
}

async fn trending_categories(
    State(state): State<AppState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> AppResult<Response> {
    let params = query_params(query)?;
    let limit = parse_limit(params.limit.as_deref())?;
    let outcome = state.trending().get_trending_categories(limit).await?;
    Ok(trending_response(outcome))
}

async fn trending_searches(
    State(state): State<AppState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> AppResult<Response> {
    let params = query_params(query)?;
    let limit = parse_limit(params.limit.as_deref())?;
    let outcome = state.trending().get_trending_searches(limit).await?;
    Ok(trending_response(outcome))
}

// =========================================================================
// Health
// =========================================================================

/// Liveness
pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness: the store must answer a ping
pub async fn readiness(State(state): State<AppState>) -> Response {
    match state.ping_store().await {
        Ok(()) => Json(ApiResponse::ok(serde_json::json!({ "status": "ready" }))).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            let body = ErrorResponse {
                success: false,
                error: "Store unavailable".to_string(),
                error_code: if e.is_timeout() {
                    "store_timeout".to_string()
                } else {
                    "store_unavailable".to_string()
                },
                details: None,
            };
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}
