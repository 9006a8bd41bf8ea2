//! Upstream database access via Supabase PostgREST
//!
//! All public read methods degrade to empty results on failure: a page
//! renders with no content rather than a 500. Failures are logged and
//! counted, never surfaced to visitors.

use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ServerConfig;
use crate::metrics::{DB_QUERIES_TOTAL, DB_QUERY_DURATION};

/// A published question as listed on hub and category pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub slug: String,
    pub question: String,
    pub category: String,
    #[serde(default)]
    pub cluster: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A question with its full answer HTML, as rendered on an answer page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDetail {
    pub slug: String,
    pub question: String,
    pub answer: String,
    pub category: String,
    #[serde(default)]
    pub cluster: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Minimal record for sitemap generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapEntry {
    pub slug: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A category with its question count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStat {
    pub category: String,
    pub count: u64,
}

/// Adjacent questions within a category, used for prev/next navigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neighbors {
    pub prev: Option<Question>,
    pub next: Option<Question>,
}

/// PostgREST client over the questions table.
pub struct Db {
    client: reqwest::Client,
    rest_url: String,
    service_key: String,
    enabled: bool,
}

impl Db {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()
            .context("failed to build upstream HTTP client")?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", config.supabase_url),
            service_key: config.supabase_service_key.clone(),
            enabled: config.has_upstream(),
        })
    }

    /// GET a PostgREST query and deserialize the JSON array response.
    async fn fetch<T: DeserializeOwned>(&self, table: &str, query: &str) -> Result<Vec<T>> {
        if !self.enabled {
            return Err(anyhow!("upstream database not configured"));
        }

        let start = Instant::now();
        let url = format!("{}/{}?{}", self.rest_url, table, query);

        let result = async {
            let response = self
                .client
                .get(&url)
                .header("apikey", &self.service_key)
                .header("Authorization", format!("Bearer {}", self.service_key))
                .send()
                .await
                .context("upstream request failed")?;

            let status = response.status();
            if !status.is_success() {
                return Err(anyhow!("upstream returned {status} for table '{table}'"));
            }

            response
                .json::<Vec<T>>()
                .await
                .context("failed to decode upstream response")
        }
        .await;

        DB_QUERY_DURATION
            .with_label_values(&[table])
            .observe(start.elapsed().as_secs_f64());
        DB_QUERIES_TOTAL
            .with_label_values(&[table, if result.is_ok() { "ok" } else { "error" }])
            .inc();

        result
    }

    /// Exact row count via the Content-Range header, without fetching rows.
    async fn count(&self, table: &str, filter: &str) -> Result<u64> {
        if !self.enabled {
            return Err(anyhow!("upstream database not configured"));
        }

        let start = Instant::now();
        let url = format!("{}/{}?select=slug&{}", self.rest_url, table, filter);

        let result = async {
            let response = self
                .client
                .get(&url)
                .header("apikey", &self.service_key)
                .header("Authorization", format!("Bearer {}", self.service_key))
                .header("Prefer", "count=exact")
                .header("Range", "0-0")
                .send()
                .await
                .context("upstream count request failed")?;

            let status = response.status();
            // 206 Partial Content is the expected answer for a ranged request.
            if !status.is_success() {
                return Err(anyhow!("upstream returned {status} counting '{table}'"));
            }

            let range = response
                .headers()
                .get("content-range")
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| anyhow!("missing content-range header"))?;

            // Format: "0-0/1234" or "*/1234"
            range
                .rsplit('/')
                .next()
                .and_then(|total| total.parse::<u64>().ok())
                .ok_or_else(|| anyhow!("unparseable content-range: {range}"))
        }
        .await;

        DB_QUERY_DURATION
            .with_label_values(&[table])
            .observe(start.elapsed().as_secs_f64());
        DB_QUERIES_TOTAL
            .with_label_values(&[table, if result.is_ok() { "ok" } else { "error" }])
            .inc();

        result
    }

    /// Latest questions, newest first.
    pub async fn questions(&self, limit: usize) -> Vec<Question> {
        let query = format!(
            "select=slug,question,category,cluster,created_at&order=created_at.desc&limit={limit}"
        );
        match self.fetch("questions", &query).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("questions query failed, serving empty list: {e:#}");
                Vec::new()
            }
        }
    }

    /// A page of questions, newest first.
    pub async fn answers_page(&self, limit: usize, offset: usize) -> Vec<Question> {
        let query = format!(
            "select=slug,question,category,cluster,created_at\
             &order=created_at.desc&limit={limit}&offset={offset}"
        );
        match self.fetch("questions", &query).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("answers page query failed, serving empty list: {e:#}");
                Vec::new()
            }
        }
    }

    /// One question with its full answer, or None when missing or the
    /// upstream is down.
    pub async fn question_by_slug(&self, slug: &str) -> Option<QuestionDetail> {
        let query = format!(
            "select=slug,question,answer,category,cluster,created_at,updated_at\
             &slug=eq.{}&limit=1",
            encode(slug)
        );
        match self.fetch::<QuestionDetail>("questions", &query).await {
            Ok(mut rows) => rows.pop(),
            Err(e) => {
                warn!("question lookup failed for '{slug}': {e:#}");
                None
            }
        }
    }

    /// Distinct category names, alphabetical.
    pub async fn categories(&self) -> Vec<String> {
        #[derive(Deserialize)]
        struct Row {
            category: String,
        }

        let query = "select=category&order=category.asc";
        match self.fetch::<Row>("questions", query).await {
            Ok(rows) => {
                let mut names: Vec<String> = rows.into_iter().map(|r| r.category).collect();
                names.dedup();
                names
            }
            Err(e) => {
                warn!("categories query failed, serving empty list: {e:#}");
                Vec::new()
            }
        }
    }

    /// Categories with question counts, alphabetical.
    pub async fn categories_with_counts(&self) -> Vec<CategoryStat> {
        #[derive(Deserialize)]
        struct Row {
            category: String,
        }

        let query = "select=category&order=category.asc";
        match self.fetch::<Row>("questions", query).await {
            Ok(rows) => {
                let mut stats: Vec<CategoryStat> = Vec::new();
                for row in rows {
                    match stats.last_mut() {
                        Some(last) if last.category == row.category => last.count += 1,
                        _ => stats.push(CategoryStat {
                            category: row.category,
                            count: 1,
                        }),
                    }
                }
                stats
            }
            Err(e) => {
                warn!("category counts query failed, serving empty list: {e:#}");
                Vec::new()
            }
        }
    }

    /// Total published question count, 0 on failure.
    pub async fn questions_count(&self) -> u64 {
        match self.count("questions", "").await {
            Ok(n) => n,
            Err(e) => {
                warn!("question count failed, reporting 0: {e:#}");
                0
            }
        }
    }

    /// Questions in a category, oldest first (stable reading order).
    pub async fn questions_in_category(&self, category: &str) -> Vec<Question> {
        let query = format!(
            "select=slug,question,category,cluster,created_at\
             &category=eq.{}&order=created_at.asc",
            encode(category)
        );
        match self.fetch("questions", &query).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("category query failed for '{category}': {e:#}");
                Vec::new()
            }
        }
    }

    /// Questions in a topic cluster, oldest first.
    pub async fn questions_in_cluster(&self, cluster: &str) -> Vec<Question> {
        let query = format!(
            "select=slug,question,category,cluster,created_at\
             &cluster=eq.{}&order=created_at.asc",
            encode(cluster)
        );
        match self.fetch("questions", &query).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("cluster query failed for '{cluster}': {e:#}");
                Vec::new()
            }
        }
    }

    /// Other questions from the same category, excluding the current slug.
    pub async fn related_questions(&self, category: &str, slug: &str, limit: usize) -> Vec<Question> {
        let query = format!(
            "select=slug,question,category,cluster,created_at\
             &category=eq.{}&slug=neq.{}&order=created_at.desc&limit={limit}",
            encode(category),
            encode(slug)
        );
        match self.fetch("questions", &query).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("related questions query failed for '{slug}': {e:#}");
                Vec::new()
            }
        }
    }

    /// Previous and next question within a category, wrapping at the ends.
    /// A single-question category points both neighbors at nothing.
    pub async fn prev_next_in_category(&self, category: &str, slug: &str) -> Neighbors {
        let siblings = self.questions_in_category(category).await;

        let Some(idx) = siblings.iter().position(|q| q.slug == slug) else {
            return Neighbors { prev: None, next: None };
        };

        if siblings.len() < 2 {
            return Neighbors { prev: None, next: None };
        }

        let prev = siblings[(idx + siblings.len() - 1) % siblings.len()].clone();
        let next = siblings[(idx + 1) % siblings.len()].clone();

        Neighbors {
            prev: Some(prev),
            next: Some(next),
        }
    }

    /// Every question slug with its last-modified timestamp, oldest first,
    /// so sitemap chunk membership is stable as new content is added.
    pub async fn all_questions_for_sitemap(&self) -> Vec<SitemapEntry> {
        let query = "select=slug,updated_at&order=created_at.asc";
        match self.fetch("questions", query).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("sitemap query failed, serving empty list: {e:#}");
                Vec::new()
            }
        }
    }
}

/// Percent-encode a PostgREST filter value.
fn encode(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_filter_values() {
        assert_eq!(encode("Grief & Loss"), "Grief%20%26%20Loss");
        assert_eq!(encode("simple-slug"), "simple%2Dslug");
    }

    #[test]
    fn test_disabled_db_degrades_to_empty() {
        let config = ServerConfig::default();
        let db = Db::new(&config).unwrap();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            assert!(db.questions(10).await.is_empty());
            assert!(db.question_by_slug("anything").await.is_none());
            assert!(db.categories().await.is_empty());
            assert_eq!(db.questions_count().await, 0);
            assert!(db.all_questions_for_sitemap().await.is_empty());

            let neighbors = db.prev_next_in_category("Anxiety", "x").await;
            assert!(neighbors.prev.is_none());
            assert!(neighbors.next.is_none());
        });
    }
}
