//! Router Configuration - Centralized route definitions
//!
//! This module builds the Axum router using handlers from the submodules.
//! Routes are organized by domain: public pages, SEO artifacts, and the
//! content management API.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::state::ContentService;
use super::{content_api, health, pages, sitemaps};

/// Application state type alias
pub type AppState = Arc<ContentService>;

/// Build the visitor-facing page and SEO routes
pub fn build_page_routes(state: AppState) -> Router {
    Router::new()
        // =================================================================
        // PAGES
        // =================================================================
        .route("/", get(pages::home))
        .route("/answers", get(pages::answers_hub))
        .route("/answers/{slug}", get(pages::answer_page))
        .route("/categories/{category}", get(pages::category_page))
        .route("/clusters/{slug}", get(pages::cluster_page))
        // =================================================================
        // SEO ARTIFACTS
        // =================================================================
        .route("/sitemap.xml", get(sitemaps::sitemap_index))
        .route("/sitemaps/{file}", get(sitemaps::sitemap_file))
        // =================================================================
        // HEALTH & KUBERNETES PROBES
        // =================================================================
        .route("/health", get(health::health))
        .route("/health/live", get(health::health_live))
        .route("/health/ready", get(health::health_ready))
        // =================================================================
        // METRICS (PROMETHEUS)
        // =================================================================
        .route("/metrics", get(health::metrics_endpoint))
        .with_state(state)
}

/// Build the content management API routes
///
/// These are called by the publishing pipeline. Revalidation carries its own
/// shared-secret check; rate limiting should be applied by the caller.
pub fn build_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/validate-content", post(content_api::validate_content))
        .route("/api/revalidate", post(content_api::revalidate))
        .with_state(state)
}

/// Build the complete router
///
/// Note: This function does NOT apply rate limiting or CORS layers.
/// The caller (main.rs) should apply those layers as needed.
pub fn build_router(state: AppState) -> Router {
    let pages = build_page_routes(state.clone());
    let api = build_api_routes(state);

    Router::new().merge(pages).merge(api)
}
