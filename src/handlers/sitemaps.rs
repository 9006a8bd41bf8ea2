//! Sitemap handlers
//!
//! /sitemap.xml serves the index; /sitemaps/{file} serves either the
//! categories sitemap or a numbered answers chunk.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use super::router::AppState;
use crate::errors::{AppError, Result};
use crate::sitemap;

/// GET /sitemap.xml
pub async fn sitemap_index(State(state): State<AppState>) -> Response {
    let total = state.questions_count().await;
    xml_response(sitemap::sitemap_index(state.site_url(), total))
}

/// GET /sitemaps/{file}
///
/// Accepts "categories.xml" or "answers-{n}.xml". Malformed names are 400,
/// chunk indices past the end are 404.
pub async fn sitemap_file(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response> {
    if file == "categories.xml" {
        let categories = state.categories().await;
        return Ok(xml_response(sitemap::categories_sitemap(
            state.site_url(),
            &categories,
        )));
    }

    let chunk = file
        .strip_prefix("answers-")
        .and_then(|rest| rest.strip_suffix(".xml"))
        .and_then(|n| n.parse::<usize>().ok())
        .ok_or_else(|| AppError::InvalidSitemapChunk(file.clone()))?;

    let entries = state.sitemap_entries().await;
    let xml = sitemap::answers_chunk(state.site_url(), &entries, chunk)
        .ok_or_else(|| AppError::NotFound(format!("sitemap chunk {chunk}")))?;

    Ok(xml_response(xml))
}

fn xml_response(xml: String) -> Response {
    ([(header::CONTENT_TYPE, "application/xml")], xml).into_response()
}
