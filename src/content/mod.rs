//! Content sanitization pipeline.
//!
//! Raw answer HTML passes through four ordered stages before it is rendered:
//!
//! 1. Entity linking: first occurrence of each known entity becomes an
//!    external reference link and is reported in a side list.
//! 2. Wikipedia link rewriting: `en.wikipedia.org` anchors become internal
//!    category links.
//! 3. Internal term linking: up to four topic terms become internal answer
//!    links.
//! 4. External link stripping: every remaining outbound URL is removed.
//!
//! Stage order matters. Stage 1 inserts external anchors that stage 4 later
//! unwraps, so the rendered page never links off-site while the entity side
//! list still captures what was recognized.

pub mod entities;
pub mod internal_links;
pub mod link_rewriter;
pub mod strip;

pub use entities::{Entity, EntityLinked, EntityMatch, EntityTable};
pub use internal_links::{TermLinks, MAX_LINKS_PER_DOC};
pub use link_rewriter::CategoryMap;
pub use strip::{contains_external_url, strip_external_links};

use serde::Serialize;

/// Fully sanitized answer HTML plus the entities recognized along the way.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAnswer {
    pub html: String,
    pub entities: Vec<EntityMatch>,
}

/// The complete linking configuration: entity table, Wikipedia category
/// routes, and internal term routes. Built once at startup and shared.
pub struct LinkPolicy {
    pub entities: EntityTable,
    pub categories: CategoryMap,
    pub term_links: TermLinks,
}

impl LinkPolicy {
    pub fn builtin() -> Self {
        Self {
            entities: EntityTable::builtin(),
            categories: CategoryMap::builtin(),
            term_links: TermLinks::builtin(),
        }
    }

    /// Run the full four-stage pipeline over raw answer HTML.
    pub fn sanitize_answer(&self, html: &str) -> SanitizedAnswer {
        let EntityLinked { text, links } = self.entities.generate_entity_links(html);
        let text = self.categories.rewrite_links(&text);
        let text = self.term_links.add_internal_links(&text);
        let html = strip_external_links(&text, false);

        SanitizedAnswer {
            html,
            entities: links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_output_has_no_external_urls() {
        let policy = LinkPolicy::builtin();
        let input = "Anxiety is common. Read [more](https://example.com/x) \
                     or see <a href=\"https://en.wikipedia.org/wiki/Meditation\">meditation</a>.";
        let out = policy.sanitize_answer(input);
        assert!(!contains_external_url(&out.html), "output: {}", out.html);
    }

    #[test]
    fn entities_reported_even_though_their_links_are_stripped() {
        let policy = LinkPolicy::builtin();
        let out = policy.sanitize_answer("Living with anxiety and depression is hard.");
        let terms: Vec<_> = out.entities.iter().map(|e| e.term.as_str()).collect();
        assert!(terms.contains(&"anxiety"));
        assert!(terms.contains(&"depression"));
        // The anchors stage 1 inserted were external and must be gone.
        assert!(!out.html.contains("wikipedia"));
    }

    #[test]
    fn wikipedia_anchors_become_internal_category_links() {
        let policy = LinkPolicy::builtin();
        let out = policy.sanitize_answer(
            r#"Try <a href="https://en.wikipedia.org/wiki/Mindfulness">mindfulness</a> daily."#,
        );
        assert!(out.html.contains(r#"class="internal-link""#), "output: {}", out.html);
        assert!(!out.html.contains("wikipedia"));
    }

    #[test]
    fn internal_link_budget_holds_end_to_end() {
        let policy = LinkPolicy::builtin();
        let out = policy.sanitize_answer(
            "grief therapy sleep stress boundaries gratitude resilience healing",
        );
        assert!(
            out.html.matches(r#"class="internal-link""#).count() <= MAX_LINKS_PER_DOC,
            "output: {}",
            out.html
        );
    }

    #[test]
    fn pipeline_is_deterministic() {
        let policy = LinkPolicy::builtin();
        let input = "Therapy helps with anxiety, grief, and burnout.";
        let a = policy.sanitize_answer(input);
        let b = policy.sanitize_answer(input);
        assert_eq!(a.html, b.html);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let out = LinkPolicy::builtin().sanitize_answer("");
        assert!(out.html.is_empty());
        assert!(out.entities.is_empty());
    }
}
