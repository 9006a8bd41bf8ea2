//! Content management API
//!
//! Pre-publish validation and cache revalidation. Both endpoints are called
//! by the publishing pipeline, not by site visitors.

use axum::{extract::State, response::Json};
use serde::Deserialize;
use tracing::info;

use super::router::AppState;
use crate::cache::tags;
use crate::errors::{AppError, Result, ValidationErrorExt};
use crate::validation::{
    assert_no_external_links, validate_answer, validate_category, validate_slug, validate_title,
};

#[derive(Debug, Deserialize)]
pub struct ValidateContentRequest {
    pub question: Option<String>,
    pub short_answer: Option<String>,
    pub answer: Option<String>,
}

/// POST /api/validate-content
///
/// Rejects content carrying external URLs before it reaches the database.
/// The gate detects, it never cleans: the 400 names the offending field so
/// the author can fix it.
pub async fn validate_content(
    Json(req): Json<ValidateContentRequest>,
) -> Result<Json<serde_json::Value>> {
    let question = req
        .question
        .ok_or_else(|| AppError::MissingField("question".to_string()))?;
    let short_answer = req
        .short_answer
        .ok_or_else(|| AppError::MissingField("short_answer".to_string()))?;

    validate_title(&question).map_validation_err("question")?;
    validate_answer(&short_answer).map_validation_err("short_answer")?;
    if let Some(answer) = &req.answer {
        validate_answer(answer).map_validation_err("answer")?;
    }

    let fields = [
        ("question", Some(&question)),
        ("short_answer", Some(&short_answer)),
        ("answer", req.answer.as_ref()),
    ];
    for (field, value) in fields {
        let Some(value) = value else { continue };
        if assert_no_external_links(field, value).is_err() {
            return Err(AppError::ExternalLinkRejected {
                field: field.to_string(),
            });
        }
    }

    Ok(Json(serde_json::json!({ "valid": true })))
}

#[derive(Debug, Deserialize)]
pub struct RevalidateRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub slug: Option<String>,
    pub secret: Option<String>,
}

/// POST /api/revalidate
///
/// Evicts cached pages by tag after content changes upstream. Requires the
/// shared secret; an empty configured secret rejects everything. Without a
/// slug the whole questions partition is flushed.
pub async fn revalidate(
    State(state): State<AppState>,
    Json(req): Json<RevalidateRequest>,
) -> Result<Json<serde_json::Value>> {
    let configured = &state.config().revalidate_secret;
    let supplied = req.secret.as_deref().unwrap_or("");
    if configured.is_empty() || supplied != configured {
        return Err(AppError::InvalidSecret);
    }

    let kind = req
        .kind
        .ok_or_else(|| AppError::MissingField("type".to_string()))?;
    if !matches!(kind.as_str(), "question" | "category" | "cluster") {
        return Err(AppError::InvalidRevalidateType(kind));
    }

    let evicted = match req.slug {
        None => state.cache().invalidate_tag(tags::QUESTIONS),
        Some(slug) => {
            // Category slugs are human-readable names ("Grief & Loss"),
            // so either shape is accepted here.
            validate_slug(&slug)
                .or_else(|_| validate_category(&slug))
                .map_validation_err("slug")?;

            match kind.as_str() {
                "question" => state.cache().invalidate_tag(&tags::question(&slug)),
                "category" => state.cache().invalidate_tag(&tags::category(&slug)),
                _ => state.cache().invalidate_tag(&tags::cluster(&slug)),
            }
        }
    };

    info!("revalidated {kind}: {evicted} cache entries evicted");

    Ok(Json(serde_json::json!({
        "revalidated": true,
        "evicted": evicted,
    })))
}
