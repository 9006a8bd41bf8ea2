//! Configuration management
//!
//! All configurable parameters in one place with environment variable overrides.
//! Follows the principle: sensible defaults, configurable in production.

use std::env;
use tracing::info;

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins (empty = allow all)
    pub allowed_origins: Vec<String>,
    /// Allowed HTTP methods
    pub allowed_methods: Vec<String>,
    /// Allowed headers
    pub allowed_headers: Vec<String>,
    /// Whether to allow credentials
    pub allow_credentials: bool,
    /// Max age for preflight cache (seconds)
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(), // Empty = allow all origins
            allowed_methods: vec![
                "GET".to_string(),
                "POST".to_string(),
                "OPTIONS".to_string(),
            ],
            allowed_headers: vec![
                "Content-Type".to_string(),
                "Authorization".to_string(),
            ],
            allow_credentials: false,
            max_age_seconds: 86400, // 24 hours
        }
    }
}

impl CorsConfig {
    /// Load from environment variables with production safety checks
    ///
    /// In production mode (DEEPER_ENV=production), warns if CORS origins are
    /// not configured to prevent accidentally running with permissive CORS.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(origins) = env::var("DEEPER_CORS_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(methods) = env::var("DEEPER_CORS_METHODS") {
            config.allowed_methods = methods
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(headers) = env::var("DEEPER_CORS_HEADERS") {
            config.allowed_headers = headers
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(val) = env::var("DEEPER_CORS_CREDENTIALS") {
            config.allow_credentials = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = env::var("DEEPER_CORS_MAX_AGE") {
            if let Ok(n) = val.parse() {
                config.max_age_seconds = n;
            }
        }

        let is_production = env::var("DEEPER_ENV")
            .map(|v| {
                let v = v.to_lowercase();
                v == "production" || v == "prod"
            })
            .unwrap_or(false);

        if is_production && config.allowed_origins.is_empty() {
            tracing::warn!(
                "PRODUCTION WARNING: CORS allows all origins. Set DEEPER_CORS_ORIGINS for security."
            );
        }

        config
    }

    /// Check if any origin restrictions are configured
    pub fn is_restricted(&self) -> bool {
        !self.allowed_origins.is_empty()
    }

    /// Convert to tower-http CorsLayer
    pub fn to_layer(&self) -> tower_http::cors::CorsLayer {
        use tower_http::cors::{AllowOrigin, Any, CorsLayer};

        let mut layer = CorsLayer::new();

        if self.allowed_origins.is_empty() {
            // Intentionally permissive - no origins configured
            layer = layer.allow_origin(Any);
        } else {
            let mut valid_origins = Vec::new();
            let mut invalid_origins = Vec::new();

            for origin_str in &self.allowed_origins {
                match origin_str.parse::<axum::http::HeaderValue>() {
                    Ok(origin) => valid_origins.push(origin),
                    Err(_) => invalid_origins.push(origin_str.clone()),
                }
            }

            for invalid in &invalid_origins {
                tracing::warn!("CORS: Invalid origin '{}' - skipping", invalid);
            }

            if valid_origins.is_empty() {
                // All configured origins failed to parse - this is a config error
                // Do NOT fall back to permissive - that would be a security hole
                tracing::error!(
                    "CORS: All {} configured origin(s) failed to parse. \
                     Rejecting all cross-origin requests. Fix DEEPER_CORS_ORIGINS.",
                    self.allowed_origins.len()
                );
                layer =
                    layer.allow_origin(AllowOrigin::list(Vec::<axum::http::HeaderValue>::new()));
            } else {
                if !invalid_origins.is_empty() {
                    tracing::info!(
                        "CORS: Using {} valid origin(s), {} invalid skipped",
                        valid_origins.len(),
                        invalid_origins.len()
                    );
                }
                layer = layer.allow_origin(AllowOrigin::list(valid_origins));
            }
        }

        let methods: Vec<axum::http::Method> = self
            .allowed_methods
            .iter()
            .filter_map(|m| m.parse().ok())
            .collect();
        if methods.is_empty() {
            layer = layer.allow_methods(Any);
        } else {
            layer = layer.allow_methods(methods);
        }

        let headers: Vec<axum::http::HeaderName> = self
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        if headers.is_empty() {
            layer = layer.allow_headers(Any);
        } else {
            layer = layer.allow_headers(headers);
        }

        if self.allow_credentials {
            layer = layer.allow_credentials(true);
        }

        layer = layer.max_age(std::time::Duration::from_secs(self.max_age_seconds));

        layer
    }
}

/// Server configuration loaded from environment with defaults
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host address (default: 127.0.0.1)
    /// Set to 0.0.0.0 for Docker or network-accessible deployments
    pub host: String,

    /// Server port (default: 3030)
    pub port: u16,

    /// Canonical site URL used in sitemaps and structured data
    /// (default: https://www.deeper.global)
    pub site_url: String,

    /// Supabase project URL, e.g. https://xyz.supabase.co (empty = no upstream)
    pub supabase_url: String,

    /// Supabase service role key for PostgREST requests
    pub supabase_service_key: String,

    /// Shared secret required by the cache revalidation endpoint
    pub revalidate_secret: String,

    /// Cache entry time-to-live in seconds (default: 3600)
    pub cache_ttl_secs: u64,

    /// Upstream request timeout in seconds (default: 10)
    pub upstream_timeout_secs: u64,

    /// Rate limit: requests per second (default: 50)
    pub rate_limit_per_second: u64,

    /// Rate limit: burst size (default: 100)
    pub rate_limit_burst: u32,

    /// Maximum concurrent requests (default: 200)
    pub max_concurrent_requests: usize,

    /// Whether running in production mode
    pub is_production: bool,

    /// CORS configuration
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
            site_url: "https://www.deeper.global".to_string(),
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            revalidate_secret: String::new(),
            cache_ttl_secs: 3600, // 1 hour
            upstream_timeout_secs: 10,
            rate_limit_per_second: 50,
            rate_limit_burst: 100,
            max_concurrent_requests: 200,
            is_production: false,
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults
    #[allow(clippy::field_reassign_with_default)] // Environment overrides require mutable config
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Check production mode first
        config.is_production = env::var("DEEPER_ENV")
            .map(|v| {
                let v = v.to_lowercase();
                v == "production" || v == "prod"
            })
            .unwrap_or(false);

        if let Ok(val) = env::var("DEEPER_HOST") {
            config.host = val;
        }

        if let Ok(val) = env::var("DEEPER_PORT") {
            if let Ok(port) = val.parse() {
                config.port = port;
            }
        }

        if let Ok(val) = env::var("DEEPER_SITE_URL") {
            config.site_url = val.trim_end_matches('/').to_string();
        }

        if let Ok(val) = env::var("SUPABASE_URL") {
            config.supabase_url = val.trim_end_matches('/').to_string();
        }

        if let Ok(val) = env::var("SUPABASE_SERVICE_KEY") {
            config.supabase_service_key = val;
        }

        if let Ok(val) = env::var("DEEPER_REVALIDATE_SECRET") {
            config.revalidate_secret = val;
        }

        if let Ok(val) = env::var("DEEPER_CACHE_TTL_SECS") {
            if let Ok(n) = val.parse() {
                config.cache_ttl_secs = n;
            }
        }

        if let Ok(val) = env::var("DEEPER_UPSTREAM_TIMEOUT") {
            if let Ok(n) = val.parse() {
                config.upstream_timeout_secs = n;
            }
        }

        if let Ok(val) = env::var("DEEPER_RATE_LIMIT") {
            if let Ok(n) = val.parse() {
                config.rate_limit_per_second = n;
            }
        }

        if let Ok(val) = env::var("DEEPER_RATE_BURST") {
            if let Ok(n) = val.parse() {
                config.rate_limit_burst = n;
            }
        }

        if let Ok(val) = env::var("DEEPER_MAX_CONCURRENT") {
            if let Ok(n) = val.parse() {
                config.max_concurrent_requests = n;
            }
        }

        config.cors = CorsConfig::from_env();

        if config.is_production && config.revalidate_secret.is_empty() {
            tracing::warn!(
                "PRODUCTION WARNING: DEEPER_REVALIDATE_SECRET is not set; \
                 all revalidation requests will be rejected."
            );
        }

        config
    }

    /// True when an upstream database is configured
    pub fn has_upstream(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }

    /// Log the current configuration
    pub fn log(&self) {
        info!("Configuration:");
        info!(
            "   Mode: {}",
            if self.is_production {
                "PRODUCTION"
            } else {
                "Development"
            }
        );
        info!("   Port: {}", self.port);
        info!("   Site URL: {}", self.site_url);
        if self.has_upstream() {
            info!("   Upstream: {}", self.supabase_url);
        } else {
            info!("   Upstream: not configured (all reads degrade to empty)");
        }
        info!("   Cache TTL: {}s", self.cache_ttl_secs);
        if self.rate_limit_per_second > 0 {
            info!(
                "   Rate limit: {} req/sec (burst: {})",
                self.rate_limit_per_second, self.rate_limit_burst
            );
        } else {
            info!("   Rate limit: disabled");
        }
        info!("   Max concurrent: {}", self.max_concurrent_requests);
        if self.cors.is_restricted() {
            info!("   CORS origins: {:?}", self.cors.allowed_origins);
        } else {
            info!("   CORS: Permissive (all origins allowed)");
        }
    }
}

/// Environment variable documentation
#[allow(unused)] // Public API - available for CLI help output
pub fn print_env_help() {
    println!("Deeper Content Server Configuration Environment Variables:");
    println!();
    println!("  DEEPER_ENV               - Set to 'production' or 'prod' for production mode");
    println!("  DEEPER_HOST              - Bind address (default: 127.0.0.1, use 0.0.0.0 for Docker)");
    println!("  DEEPER_PORT              - Server port (default: 3030)");
    println!("  DEEPER_SITE_URL          - Canonical site URL (default: https://www.deeper.global)");
    println!("  SUPABASE_URL             - Supabase project URL");
    println!("  SUPABASE_SERVICE_KEY     - Supabase service role key");
    println!("  DEEPER_REVALIDATE_SECRET - Shared secret for POST /api/revalidate");
    println!("  DEEPER_CACHE_TTL_SECS    - Cache entry TTL in seconds (default: 3600)");
    println!("  DEEPER_UPSTREAM_TIMEOUT  - Upstream request timeout seconds (default: 10)");
    println!("  DEEPER_RATE_LIMIT        - Requests per second (default: 50)");
    println!("  DEEPER_RATE_BURST        - Burst size (default: 100)");
    println!("  DEEPER_MAX_CONCURRENT    - Max concurrent requests (default: 200)");
    println!();
    println!("CORS Configuration:");
    println!("  DEEPER_CORS_ORIGINS      - Comma-separated allowed origins (default: all)");
    println!("  DEEPER_CORS_METHODS      - Comma-separated allowed methods (default: GET,POST,OPTIONS)");
    println!("  DEEPER_CORS_HEADERS      - Comma-separated allowed headers (default: Content-Type,Authorization)");
    println!("  DEEPER_CORS_CREDENTIALS  - Allow credentials true/false (default: false)");
    println!("  DEEPER_CORS_MAX_AGE      - Preflight cache seconds (default: 86400)");
    println!();
    println!("  RUST_LOG                 - Log level (e.g., info, debug, trace)");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3030);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert!(!config.is_production);
        assert!(!config.has_upstream());
    }

    #[test]
    fn test_site_url_trailing_slash_trimmed() {
        env::set_var("DEEPER_SITE_URL", "https://example.org/");
        let config = ServerConfig::from_env();
        assert_eq!(config.site_url, "https://example.org");
        env::remove_var("DEEPER_SITE_URL");
    }

    #[test]
    fn test_cors_default_is_permissive() {
        let cors = CorsConfig::default();
        assert!(!cors.is_restricted());
        assert!(cors.allowed_origins.is_empty());
        assert!(!cors.allowed_methods.is_empty());
        assert!(!cors.allowed_headers.is_empty());
    }

    #[test]
    fn test_cors_with_origins_is_restricted() {
        let cors = CorsConfig {
            allowed_origins: vec!["https://example.com".to_string()],
            ..Default::default()
        };
        assert!(cors.is_restricted());
    }

    #[test]
    fn test_cors_to_layer_permissive() {
        let cors = CorsConfig::default();
        let _layer = cors.to_layer(); // Should not panic
    }

    #[test]
    fn test_cors_to_layer_restricted() {
        let cors = CorsConfig {
            allowed_origins: vec!["https://example.com".to_string()],
            ..Default::default()
        };
        let _layer = cors.to_layer(); // Should not panic
    }
}
