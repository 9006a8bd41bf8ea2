//! HTTP request tracking middleware for observability

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Middleware to track HTTP request latency and counts
pub async fn track_metrics(req: Request, next: Next) -> Result<Response, StatusCode> {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    // Process request
    let response = next.run(req).await;

    // Record metrics
    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    // Normalize path to avoid high cardinality (group dynamic slugs)
    let normalized_path = normalize_path(&path);

    crate::metrics::HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &normalized_path, &status])
        .observe(duration);

    crate::metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &normalized_path, &status])
        .inc();

    Ok(response)
}

/// Normalize path to prevent metric cardinality explosion
/// /answers/how-to-stop-a-panic-attack -> /answers/{slug}
fn normalize_path(path: &str) -> String {
    let parts: Vec<&str> = path.trim_matches('/').split('/').collect();

    match parts.as_slice() {
        ["answers", _slug] => "/answers/{slug}".to_string(),
        ["categories", _category] => "/categories/{category}".to_string(),
        ["clusters", _slug] => "/clusters/{slug}".to_string(),
        ["sitemaps", _file] => "/sitemaps/{file}".to_string(),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("/answers/how-to-stop-a-panic-attack"),
            "/answers/{slug}"
        );
        assert_eq!(
            normalize_path("/categories/Grief%20%26%20Loss"),
            "/categories/{category}"
        );
        assert_eq!(normalize_path("/clusters/sleep"), "/clusters/{slug}");
        assert_eq!(normalize_path("/sitemaps/answers-0.xml"), "/sitemaps/{file}");
        assert_eq!(normalize_path("/health"), "/health");
        assert_eq!(normalize_path("/sitemap.xml"), "/sitemap.xml");
        assert_eq!(normalize_path("/api/revalidate"), "/api/revalidate");
    }
}
