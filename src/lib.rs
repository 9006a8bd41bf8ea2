//! Deeper Content Server Library
//!
//! Server-rendered mental health Q&A site.
//!
//! # Key Features
//! - Content sanitization pipeline (entity linking, internal links,
//!   external link stripping) applied at render time
//! - Tag-based response cache invalidated by the publishing pipeline
//! - JSON-LD structured data and chunked sitemaps for SEO
//! - Supabase PostgREST upstream; reads degrade to empty on failure

pub mod cache;
pub mod config;
pub mod content;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod schema;
pub mod sitemap;
pub mod tracing_setup;
pub mod validation;

// Re-export dependencies to ensure tests use the same version
pub use chrono;
pub use serde_json;
