//! Shared application state
//!
//! One `ContentService` is built at startup and shared across handlers. It
//! owns the upstream client, the tag cache, and the linking configuration,
//! and fronts every read with cache-aside logic.

use anyhow::Result;

use crate::cache::{tags, TagCache};
use crate::config::ServerConfig;
use crate::content::LinkPolicy;
use crate::db::{CategoryStat, Db, Neighbors, Question, QuestionDetail, SitemapEntry};

pub struct ContentService {
    config: ServerConfig,
    db: Db,
    cache: TagCache,
    policy: LinkPolicy,
}

impl ContentService {
    pub fn new(config: ServerConfig) -> Result<Self> {
        let db = Db::new(&config)?;
        let cache = TagCache::new(config.cache_ttl_secs);

        Ok(Self {
            config,
            db,
            cache,
            policy: LinkPolicy::builtin(),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn cache(&self) -> &TagCache {
        &self.cache
    }

    pub fn policy(&self) -> &LinkPolicy {
        &self.policy
    }

    pub fn site_url(&self) -> &str {
        &self.config.site_url
    }

    /// Latest questions for hub pages, cache-aside under the questions tag.
    pub async fn latest_questions(&self, limit: usize) -> Vec<Question> {
        let key = format!("questions:latest:{limit}");
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        let rows = self.db.questions(limit).await;
        self.cache.put(&key, &rows, vec![tags::QUESTIONS.to_string()]);
        rows
    }

    /// One hub page of questions, newest first.
    pub async fn answers_page(&self, limit: usize, offset: usize) -> Vec<Question> {
        let key = format!("questions:page:{limit}:{offset}");
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        let rows = self.db.answers_page(limit, offset).await;
        self.cache.put(&key, &rows, vec![tags::QUESTIONS.to_string()]);
        rows
    }

    /// One question with its answer. Only found questions are cached, so a
    /// slug published later is visible immediately.
    pub async fn question_detail(&self, slug: &str) -> Option<QuestionDetail> {
        let key = format!("question:detail:{slug}");
        if let Some(cached) = self.cache.get(&key) {
            return Some(cached);
        }

        let detail = self.db.question_by_slug(slug).await?;
        let mut entry_tags = vec![
            tags::QUESTIONS.to_string(),
            tags::question(slug),
            tags::category(&detail.category),
        ];
        if let Some(cluster) = &detail.cluster {
            entry_tags.push(tags::cluster(cluster));
        }
        self.cache.put(&key, &detail, entry_tags);
        Some(detail)
    }

    pub async fn categories_with_counts(&self) -> Vec<CategoryStat> {
        let key = "categories:counts";
        if let Some(cached) = self.cache.get(key) {
            return cached;
        }

        let stats = self.db.categories_with_counts().await;
        self.cache.put(key, &stats, vec![tags::QUESTIONS.to_string()]);
        stats
    }

    pub async fn categories(&self) -> Vec<String> {
        let key = "categories:names";
        if let Some(cached) = self.cache.get(key) {
            return cached;
        }

        let names = self.db.categories().await;
        self.cache.put(key, &names, vec![tags::QUESTIONS.to_string()]);
        names
    }

    pub async fn questions_in_category(&self, category: &str) -> Vec<Question> {
        let key = format!("category:list:{category}");
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        let rows = self.db.questions_in_category(category).await;
        self.cache.put(
            &key,
            &rows,
            vec![tags::QUESTIONS.to_string(), tags::category(category)],
        );
        rows
    }

    pub async fn questions_in_cluster(&self, cluster: &str) -> Vec<Question> {
        let key = format!("cluster:list:{cluster}");
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        let rows = self.db.questions_in_cluster(cluster).await;
        self.cache.put(
            &key,
            &rows,
            vec![tags::QUESTIONS.to_string(), tags::cluster(cluster)],
        );
        rows
    }

    pub async fn related_questions(&self, category: &str, slug: &str, limit: usize) -> Vec<Question> {
        // Small and per-question; rendered inside the cached answer page, so
        // no separate cache entry.
        self.db.related_questions(category, slug, limit).await
    }

    pub async fn prev_next_in_category(&self, category: &str, slug: &str) -> Neighbors {
        self.db.prev_next_in_category(category, slug).await
    }

    pub async fn questions_count(&self) -> u64 {
        let key = "questions:count";
        if let Some(cached) = self.cache.get(key) {
            return cached;
        }

        let count = self.db.questions_count().await;
        self.cache.put(key, &count, vec![tags::QUESTIONS.to_string()]);
        count
    }

    pub async fn sitemap_entries(&self) -> Vec<SitemapEntry> {
        let key = "sitemap:questions";
        if let Some(cached) = self.cache.get(key) {
            return cached;
        }

        let entries = self.db.all_questions_for_sitemap().await;
        self.cache.put(key, &entries, vec![tags::QUESTIONS.to_string()]);
        entries
    }
}
