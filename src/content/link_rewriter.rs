//! Rewrites external encyclopedia anchors to internal category routes.
//!
//! Only the literal wiki anchor pattern is matched; no recursion into nested
//! markup. Anchors with no known mapping are left for the stripper.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};

/// Immutable term → internal category route table.
///
/// Every route is a relative internal path beginning with `/`; lookup is
/// case-insensitive on the term.
pub struct CategoryMap {
    by_term: HashMap<String, &'static str>,
    wiki_anchor: Regex,
}

impl CategoryMap {
    pub fn builtin() -> Self {
        let by_term = builtin_routes()
            .iter()
            .map(|(term, path)| {
                debug_assert!(path.starts_with('/'), "category routes must be relative");
                (term.to_lowercase(), *path)
            })
            .collect();
        Self {
            by_term,
            wiki_anchor: Regex::new(
                r#"<a href="https://en\.wikipedia\.org/wiki/([^"]+)">([^<]+)</a>"#,
            )
            .expect("wiki anchor pattern is valid"),
        }
    }

    /// Look up the internal route for a term (case-insensitive).
    pub fn route_for(&self, term: &str) -> Option<&'static str> {
        self.by_term.get(&term.to_lowercase()).copied()
    }

    /// Internal route for a wiki link, if it should be rewritten.
    /// Visible text takes priority over the URL slug.
    pub fn should_rewrite(&self, url: &str, text: &str) -> Option<&'static str> {
        if !url.starts_with("https://en.wikipedia.org/wiki/") {
            return None;
        }
        let clean = decode(text);
        self.route_for(clean.trim())
    }

    /// Rewrite wiki anchors to internal category links where a mapping
    /// exists; unmatched anchors are returned unchanged.
    pub fn rewrite_links(&self, html: &str) -> String {
        self.wiki_anchor
            .replace_all(html, |caps: &Captures| {
                let slug = &caps[1];
                let text = &caps[2];
                let clean_text = decode(text);
                let clean_text = clean_text.trim();

                if let Some(path) = self.route_for(clean_text) {
                    return internal_anchor(path, clean_text);
                }

                // Fall back to the URL slug, underscores converted to spaces.
                let decoded_slug = decode(slug).replace('_', " ");
                if let Some(path) = self.route_for(&decoded_slug) {
                    return internal_anchor(path, clean_text);
                }

                caps[0].to_string()
            })
            .into_owned()
    }
}

fn internal_anchor(path: &str, text: &str) -> String {
    format!(r#"<a href="{path}" class="internal-link">{text}</a>"#)
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Known mental-health categories mapped to internal routes.
fn builtin_routes() -> &'static [(&'static str, &'static str)] {
    &[
        // Core conditions
        ("Anxiety disorder", "/categories/Anxiety%20%26%20Stress"),
        ("Major depressive disorder", "/categories/Depression"),
        ("Depression", "/categories/Depression"),
        ("Post-traumatic stress disorder", "/categories/Trauma%20%26%20Grief"),
        ("Obsessive-compulsive disorder", "/categories/Intrusive%20Thoughts"),
        ("Bipolar disorder", "/categories/Depression"),
        ("Attention deficit hyperactivity disorder", "/categories/General%20Mental%20Health"),
        ("Autism spectrum disorder", "/categories/General%20Mental%20Health"),
        ("Eating disorder", "/categories/General%20Mental%20Health"),
        ("Substance use disorder", "/categories/Addiction%20%26%20Recovery"),
        ("Schizophrenia", "/categories/General%20Mental%20Health"),
        // Therapies and treatments
        ("Psychotherapy", "/categories/Therapy%20%26%20Mental%20Health"),
        ("Cognitive behavioral therapy", "/categories/Therapy%20%26%20Mental%20Health"),
        ("Dialectical behavior therapy", "/categories/Therapy%20%26%20Mental%20Health"),
        ("Psychiatric medication", "/categories/Mental%20Health%20Treatment"),
        ("Mindfulness", "/categories/Anxiety%20Management"),
        ("Meditation", "/categories/Anxiety%20Management"),
        // Mental health concepts
        ("Self-care", "/categories/Self-Compassion"),
        ("Mental health", "/categories/General%20Mental%20Health"),
        ("Wellness", "/categories/General%20Mental%20Health"),
        ("Psychological resilience", "/categories/Self-Actualization"),
        ("Psychological stress", "/categories/Anxiety%20%26%20Stress"),
        ("Occupational burnout", "/categories/Work%20%26%20Burnout"),
        // Relationships and social
        ("Interpersonal relationship", "/categories/Relationships"),
        ("Communication", "/categories/Communication%20%26%20Conflict"),
        ("Personal boundaries", "/categories/Family%20Boundaries"),
        ("Attachment theory", "/categories/Attachment%20Styles%20%26%20Relationship%20Dynamics"),
        // Life stages and transitions
        ("Adolescence", "/categories/Teens%20%26%20Identity"),
        ("Adult", "/categories/Life%20Transitions"),
        ("Ageing", "/categories/Life%20Transitions"),
        ("Grief", "/categories/Grief%20%26%20Loss"),
        ("Psychological trauma", "/categories/Trauma%20%26%20Grief"),
        // Common variations
        ("Anxiety", "/categories/Anxiety%20%26%20Stress"),
        ("Stress", "/categories/Anxiety%20%26%20Stress"),
        ("Worry", "/categories/Anxiety%20%26%20Worry"),
        ("Therapy", "/categories/Therapy%20%26%20Mental%20Health"),
        ("CBT", "/categories/Therapy%20%26%20Mental%20Health"),
        ("DBT", "/categories/Therapy%20%26%20Mental%20Health"),
        ("Medication", "/categories/Mental%20Health%20Treatment"),
        ("Burnout", "/categories/Work%20%26%20Burnout"),
        ("Relationships", "/categories/Relationships"),
        ("Parenting", "/categories/Parenting"),
        ("Family", "/categories/Family%20%26%20Parenting"),
        ("Work", "/categories/Work%20%26%20Life%20Balance"),
        ("Career", "/categories/Career%20%26%20Purpose"),
        ("Identity", "/categories/Identity%20%26%20Self-Worth"),
        ("Self-worth", "/categories/Self-Worth"),
        ("Self-compassion", "/categories/Self-Compassion"),
        ("Loneliness", "/categories/Loneliness%20%26%20Isolation"),
        ("Isolation", "/categories/Loneliness%20%26%20Isolation"),
        ("Social anxiety", "/categories/Social%20Anxiety"),
        ("Social connection", "/categories/Social%20Connection"),
        ("Social belonging", "/categories/Social%20Belonging"),
        ("Social media", "/categories/Social%20Media"),
        ("Workplace", "/categories/Workplace"),
        ("Workplace mental health", "/categories/Workplace%20Mental%20Health"),
        ("Work stress", "/categories/Work%2C%20Stress%20%26%20Burnout"),
        ("Life purpose", "/categories/Life%20Purpose"),
        ("Life transitions", "/categories/Life%20Transitions"),
        ("Life comparison", "/categories/Life%20Comparison"),
        ("Existential", "/categories/Existential"),
        ("Spiritual doubt", "/categories/Spiritual%20Doubt"),
        ("Spiritual struggle", "/categories/Spiritual%20Struggle%20%2F%20Existential%20Crisis"),
        ("Gender identity", "/categories/Gender%20Identity"),
        ("Gender and sexuality", "/categories/Gender%20%26%20Sexuality"),
        ("Sexuality", "/categories/Sexuality%2C%20Gender%20Identity%2C%20and%20Intimacy"),
        ("Intimacy", "/categories/Sexuality%2C%20Gender%20Identity%2C%20and%20Intimacy"),
        ("Codependency", "/categories/Codependency"),
        ("People pleasing", "/categories/People%20Pleasing"),
        ("Perfectionism", "/categories/Perfectionism%20%26%20Control%20Issues"),
        ("Control issues", "/categories/Perfectionism%20%26%20Control%20Issues"),
        ("Anger", "/categories/Anger%20%26%20Emotional%20Regulation"),
        ("Emotional regulation", "/categories/Emotional%20Regulation"),
        ("Crisis support", "/categories/Crisis%20Support"),
        ("Current events", "/categories/Current%20Events"),
        ("Numbness", "/categories/Depression%20%26%20Numbness"),
        ("Relationship abuse", "/categories/Relationship%20Abuse"),
        ("Relationship balance", "/categories/Relationship%20Balance"),
        ("Relationship comparison", "/categories/Relationship%20Comparison"),
        ("Relationship identity", "/categories/Relationship%20Identity"),
        ("Relationship insecurity", "/categories/Relationship%20Insecurity"),
        ("Relationship communication", "/categories/Relationships%20%26%20Communication"),
        ("Divorce", "/categories/Relationships%20%26%20Divorce"),
        ("Family relationships", "/categories/Family%20Relationships"),
        ("Forgiveness", "/categories/Forgiveness"),
        ("Inner child", "/categories/Inner%20Child%20%26%20Parenting"),
        ("Money", "/categories/Money%20%26%20Self-Worth"),
        ("Physical health", "/categories/Physical%20Health"),
        ("Mental health access", "/categories/Mental%20Health%20Access"),
        ("Therapy navigation", "/categories/Therapy%20Navigation"),
        ("Triggers", "/categories/Trauma%20%26%20Triggers"),
        ("Teen-specific", "/categories/Teen-Specific%20Questions"),
        ("Teens", "/categories/Teens%20%26%20Identity"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_known_anchor_by_text() {
        let map = CategoryMap::builtin();
        let input = r#"<a href="https://en.wikipedia.org/wiki/Grief">Grief</a>"#;
        assert_eq!(
            map.rewrite_links(input),
            r#"<a href="/categories/Grief%20%26%20Loss" class="internal-link">Grief</a>"#
        );
    }

    #[test]
    fn rewrites_by_slug_when_text_unknown() {
        let map = CategoryMap::builtin();
        // Visible text has no mapping; the slug (underscores → spaces) does.
        let input =
            r#"<a href="https://en.wikipedia.org/wiki/Occupational_burnout">feeling done</a>"#;
        assert_eq!(
            map.rewrite_links(input),
            r#"<a href="/categories/Work%20%26%20Burnout" class="internal-link">feeling done</a>"#
        );
    }

    #[test]
    fn text_match_takes_priority_over_slug() {
        let map = CategoryMap::builtin();
        // Text maps to Depression, slug maps to Grief & Loss: text wins.
        let input = r#"<a href="https://en.wikipedia.org/wiki/Grief">Depression</a>"#;
        assert_eq!(
            map.rewrite_links(input),
            r#"<a href="/categories/Depression" class="internal-link">Depression</a>"#
        );
    }

    #[test]
    fn unknown_wiki_anchor_unchanged() {
        let map = CategoryMap::builtin();
        let input = r#"<a href="https://en.wikipedia.org/wiki/Quantum_physics">Quantum physics</a>"#;
        assert_eq!(map.rewrite_links(input), input);
    }

    #[test]
    fn non_wiki_anchor_unchanged() {
        let map = CategoryMap::builtin();
        let input = r#"<a href="https://example.com">Example</a>"#;
        assert_eq!(map.rewrite_links(input), input);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let map = CategoryMap::builtin();
        assert_eq!(map.route_for("grief"), Some("/categories/Grief%20%26%20Loss"));
        assert_eq!(map.route_for("GRIEF"), Some("/categories/Grief%20%26%20Loss"));
        assert_eq!(map.route_for("no such term"), None);
    }

    #[test]
    fn should_rewrite_rejects_non_wiki_urls() {
        let map = CategoryMap::builtin();
        assert_eq!(map.should_rewrite("https://example.com/Grief", "Grief"), None);
        assert_eq!(
            map.should_rewrite("https://en.wikipedia.org/wiki/Grief", "Grief"),
            Some("/categories/Grief%20%26%20Loss")
        );
    }

    #[test]
    fn rewrites_multiple_anchors_in_one_document() {
        let map = CategoryMap::builtin();
        let input = concat!(
            r#"<p><a href="https://en.wikipedia.org/wiki/Psychotherapy">Psychotherapy</a> and "#,
            r#"<a href="https://en.wikipedia.org/wiki/Quantum_physics">physics</a></p>"#
        );
        let out = map.rewrite_links(input);
        assert!(out.contains(r#"<a href="/categories/Therapy%20%26%20Mental%20Health" class="internal-link">Psychotherapy</a>"#));
        assert!(out.contains("Quantum_physics"));
    }
}
