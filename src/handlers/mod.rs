//! HTTP API Handlers - Modular organization of the server surface
//!
//! Each submodule handles a specific domain of functionality.

// Core modules
pub mod router;
pub mod state;

// Health and utilities
pub mod health;

// Visitor-facing pages and SEO artifacts
pub mod pages;
pub mod sitemaps;

// Content management API
pub mod content_api;

// Re-export commonly used items
pub use router::{build_api_routes, build_page_routes, build_router, AppState};
pub use state::ContentService;
