//! Server-rendered page handlers
//!
//! Every page is a minimal HTML document with embedded JSON-LD structured
//! data. Answer bodies pass through the sanitization pipeline at render
//! time; rendered pages never carry an outbound link.

use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use serde::Deserialize;

use super::router::AppState;
use crate::errors::{AppError, Result};
use crate::metrics::{PIPELINE_ENTITIES_FOUND, PIPELINE_LINKS_INSERTED};
use crate::schema;
use crate::validation::{validate_category, validate_slug};

const HUB_PAGE_SIZE: usize = 50;
const RELATED_LIMIT: usize = 5;

/// Homepage: category overview plus the latest questions.
pub async fn home(State(state): State<AppState>) -> Html<String> {
    let stats = state.categories_with_counts().await;
    let latest = state.latest_questions(10).await;
    let site_url = state.site_url();

    let mut body = String::from("<h1>Deeper</h1>\n<h2>Categories</h2>\n<ul>\n");
    for stat in &stats {
        body.push_str(&format!(
            "  <li><a href=\"/categories/{}\">{}</a> ({})</li>\n",
            urlencode(&stat.category),
            escape_html(&stat.category),
            stat.count
        ));
    }
    body.push_str("</ul>\n<h2>Latest answers</h2>\n<ul>\n");
    for q in &latest {
        body.push_str(&format!(
            "  <li><a href=\"/answers/{}\">{}</a></li>\n",
            q.slug,
            escape_html(&q.question)
        ));
    }
    body.push_str("</ul>\n");

    let graph = schema::homepage(site_url, &stats);
    Html(render_page("Deeper", &body, &graph))
}

#[derive(Debug, Deserialize)]
pub struct HubParams {
    #[serde(default)]
    pub page: usize,
}

/// Answers hub: paginated list of all questions, newest first.
pub async fn answers_hub(
    State(state): State<AppState>,
    Query(params): Query<HubParams>,
) -> Html<String> {
    let page = state
        .answers_page(HUB_PAGE_SIZE, HUB_PAGE_SIZE * params.page)
        .await;

    let mut body = String::from("<h1>All answers</h1>\n<ul>\n");
    for q in &page {
        body.push_str(&format!(
            "  <li><a href=\"/answers/{}\">{}</a> <span class=\"category\">{}</span></li>\n",
            q.slug,
            escape_html(&q.question),
            escape_html(&q.category)
        ));
    }
    body.push_str("</ul>\n");
    if page.len() == HUB_PAGE_SIZE {
        body.push_str(&format!(
            "<a href=\"/answers?page={}\" rel=\"next\">Older answers</a>\n",
            params.page + 1
        ));
    }

    let graph = schema::answers_hub(state.site_url(), &page);
    Html(render_page("All answers", &body, &graph))
}

/// One answer page: sanitized body, neighbors, related questions, QAPage
/// structured data.
pub async fn answer_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>> {
    use crate::errors::ValidationErrorExt;
    validate_slug(&slug).map_validation_err("slug")?;

    let detail = state
        .question_detail(&slug)
        .await
        .ok_or_else(|| AppError::NotFound(format!("answer '{slug}'")))?;

    let sanitized = state.policy().sanitize_answer(&detail.answer);
    PIPELINE_LINKS_INSERTED.observe(
        sanitized.html.matches("class=\"internal-link\"").count() as f64,
    );
    PIPELINE_ENTITIES_FOUND.observe(sanitized.entities.len() as f64);

    let neighbors = state.prev_next_in_category(&detail.category, &slug).await;
    let related = state
        .related_questions(&detail.category, &slug, RELATED_LIMIT)
        .await;

    let mut body = format!(
        "<article>\n<h1>{}</h1>\n<p class=\"category\">\
         <a href=\"/categories/{}\">{}</a></p>\n<div class=\"answer\">{}</div>\n</article>\n",
        escape_html(&detail.question),
        urlencode(&detail.category),
        escape_html(&detail.category),
        sanitized.html
    );

    if neighbors.prev.is_some() || neighbors.next.is_some() {
        body.push_str("<nav class=\"neighbors\">\n");
        if let Some(prev) = &neighbors.prev {
            body.push_str(&format!(
                "  <a href=\"/answers/{}\" rel=\"prev\">{}</a>\n",
                prev.slug,
                escape_html(&prev.question)
            ));
        }
        if let Some(next) = &neighbors.next {
            body.push_str(&format!(
                "  <a href=\"/answers/{}\" rel=\"next\">{}</a>\n",
                next.slug,
                escape_html(&next.question)
            ));
        }
        body.push_str("</nav>\n");
    }

    if !related.is_empty() {
        body.push_str("<h2>Related</h2>\n<ul>\n");
        for q in &related {
            body.push_str(&format!(
                "  <li><a href=\"/answers/{}\">{}</a></li>\n",
                q.slug,
                escape_html(&q.question)
            ));
        }
        body.push_str("</ul>\n");
    }

    let graph = schema::question_page(
        state.site_url(),
        &detail,
        &sanitized.html,
        &state.policy().entities,
    );
    Ok(Html(render_page(&detail.question, &body, &graph)))
}

/// Category listing page.
pub async fn category_page(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Html<String>> {
    use crate::errors::ValidationErrorExt;
    validate_category(&category).map_validation_err("category")?;

    let questions = state.questions_in_category(&category).await;

    let mut body = format!("<h1>{}</h1>\n<ul>\n", escape_html(&category));
    for q in &questions {
        body.push_str(&format!(
            "  <li><a href=\"/answers/{}\">{}</a></li>\n",
            q.slug,
            escape_html(&q.question)
        ));
    }
    body.push_str("</ul>\n");
    if questions.is_empty() {
        body.push_str("<p>No answers in this category yet.</p>\n");
    }

    let graph = schema::category_page(state.site_url(), &category, &questions);
    Ok(Html(render_page(&category, &body, &graph)))
}

/// Topic cluster page: questions across categories sharing a cluster slug.
pub async fn cluster_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>> {
    use crate::errors::ValidationErrorExt;
    validate_slug(&slug).map_validation_err("slug")?;

    let questions = state.questions_in_cluster(&slug).await;

    let title = cluster_title(&slug);
    let mut body = format!("<h1>{}</h1>\n<ul>\n", escape_html(&title));
    for q in &questions {
        body.push_str(&format!(
            "  <li><a href=\"/answers/{}\">{}</a> <span class=\"category\">{}</span></li>\n",
            q.slug,
            escape_html(&q.question),
            escape_html(&q.category)
        ));
    }
    body.push_str("</ul>\n");
    if questions.is_empty() {
        body.push_str("<p>No answers in this topic yet.</p>\n");
    }

    let graph = schema::cluster_page(state.site_url(), &slug, &title, &questions);
    Ok(Html(render_page(&title, &body, &graph)))
}

/// "sleep-and-rest" -> "Sleep And Rest"
fn cluster_title(slug: &str) -> String {
    slug.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Wrap page content in the HTML shell with its JSON-LD graph.
fn render_page(title: &str, body: &str, graph: &serde_json::Value) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{} | Deeper</title>\n\
         <script type=\"application/ld+json\">{}</script>\n\
         </head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        graph,
        body
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn urlencode(segment: &str) -> String {
    percent_encoding::utf8_percent_encode(segment, percent_encoding::NON_ALPHANUMERIC).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Grief & Loss"</b>"#),
            "&lt;b&gt;&quot;Grief &amp; Loss&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_cluster_title() {
        assert_eq!(cluster_title("sleep-and-rest"), "Sleep And Rest");
        assert_eq!(cluster_title("anxiety"), "Anxiety");
    }

    #[test]
    fn test_render_page_embeds_json_ld() {
        let graph = serde_json::json!({"@type": "WebSite"});
        let html = render_page("Home", "<p>hi</p>", &graph);
        assert!(html.contains("application/ld+json"));
        assert!(html.contains("\"@type\":\"WebSite\""));
        assert!(html.contains("<title>Home | Deeper</title>"));
    }
}
