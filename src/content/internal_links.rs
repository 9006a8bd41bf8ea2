//! Internal term linking: wraps configured topic terms in internal links,
//! capped per document, without double-linking text already inside anchors.
//!
//! The "inside an anchor" check counts raw open/close tags in the text before
//! a match. It is an approximation, not a parse tree: malformed or deeply
//! nested HTML can defeat it. The external contract (budget cap, no
//! double-linking for well-formed input) is what tests pin down.

use regex::Regex;

/// Maximum auto-inserted internal links in one rendered document.
pub const MAX_LINKS_PER_DOC: usize = 4;

/// Immutable topic-term → answer-route table, terms sorted longest-first so
/// "people-pleasing" is matched whole before "pleasing" could fragment it.
pub struct TermLinks {
    terms: Vec<(&'static str, &'static str, Regex)>,
    open_anchor: Regex,
}

impl TermLinks {
    pub fn builtin() -> Self {
        let mut raw: Vec<_> = builtin_term_routes().to_vec();
        // Stable sort keeps table order among equal-length terms.
        raw.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));

        let terms = raw
            .into_iter()
            .map(|(term, path)| {
                debug_assert!(path.starts_with('/'), "term routes must be relative");
                // Terms may contain punctuation (hyphens), so escape them.
                let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term)))
                    .expect("escaped term is a valid pattern");
                (term, path, pattern)
            })
            .collect();

        Self {
            terms,
            open_anchor: Regex::new(r"<a[^>]*>").expect("open anchor pattern is valid"),
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Convert up to [`MAX_LINKS_PER_DOC`] term occurrences into internal
    /// links. Terms are processed longest-first and consume the shared budget
    /// in that order, so the linked subset is deterministic for a given input.
    pub fn add_internal_links(&self, html: &str) -> String {
        if html.is_empty() {
            return html.to_string();
        }

        let mut result = html.to_string();
        let mut link_count = 0usize;

        for (_, path, pattern) in &self.terms {
            if link_count >= MAX_LINKS_PER_DOC {
                break;
            }

            // One string-wide pass per term. Anchor-depth is judged against
            // this pass's input, so links inserted for the same term earlier
            // in the pass do not shift the counts.
            let input = std::mem::take(&mut result);
            let mut out = String::with_capacity(input.len() + 64);
            let mut last = 0;

            for m in pattern.find_iter(&input) {
                out.push_str(&input[last..m.start()]);
                last = m.end();

                let before = &input[..m.start()];
                let opens = self.open_anchor.find_iter(before).count();
                let closes = before.matches("</a>").count();
                let inside_anchor = opens > closes;
                // A match between `<` and `>` sits in an attribute value
                // (e.g. a term inside an earlier link's href): never link it.
                let inside_tag = match (before.rfind('<'), before.rfind('>')) {
                    (Some(open), Some(close)) => open > close,
                    (Some(_), None) => true,
                    _ => false,
                };

                if inside_anchor || inside_tag || link_count >= MAX_LINKS_PER_DOC {
                    out.push_str(m.as_str());
                } else {
                    link_count += 1;
                    out.push_str(&format!(
                        r#"<a href="{}" class="internal-link">{}</a>"#,
                        path,
                        m.as_str()
                    ));
                }
            }
            out.push_str(&input[last..]);
            result = out;
        }

        result
    }
}

/// Topic terms mapped to internal answer routes.
fn builtin_term_routes() -> &'static [(&'static str, &'static str)] {
    &[
        ("panic attack", "/answers/anxiety/how-to-stop-a-panic-attack"),
        ("grounding", "/answers/anxiety/what-is-grounding-and-how-to-use-it"),
        ("burnout", "/answers/work-life/burnout-signs-and-recovery"),
        ("perfectionism", "/answers/identity/perfectionism-how-to-let-go"),
        ("people-pleasing", "/answers/work-life/stop-people-pleasing-at-work"),
        ("emotional numbness", "/answers/depression/emotional-numbness"),
        ("social anxiety", "/answers/relationships/supporting-social-anxiety"),
        ("overthinking", "/answers/anxiety/overthinking-before-bed"),
        ("anxiety", "/answers/anxiety/what-is-anxiety"),
        ("depression", "/answers/depression/what-is-depression"),
        ("stress", "/answers/anxiety/managing-stress"),
        ("therapy", "/answers/therapy/finding-the-right-therapist"),
        ("meditation", "/answers/mindfulness/meditation-for-beginners"),
        ("mindfulness", "/answers/mindfulness/what-is-mindfulness"),
        ("self-care", "/answers/self-care/self-care-practices"),
        ("boundaries", "/answers/relationships/setting-healthy-boundaries"),
        ("communication", "/answers/relationships/improving-communication"),
        ("grief", "/answers/grief/coping-with-loss"),
        ("trauma", "/answers/trauma/understanding-trauma"),
        ("self-worth", "/answers/identity/building-self-worth"),
        ("confidence", "/answers/identity/building-confidence"),
        ("relationships", "/answers/relationships/healthy-relationships"),
        ("parenting", "/answers/parenting/parenting-stress"),
        ("work-life balance", "/answers/work-life/achieving-work-life-balance"),
        ("sleep", "/answers/sleep/improving-sleep-quality"),
        ("anger", "/answers/emotions/managing-anger"),
        ("fear", "/answers/anxiety/understanding-fear"),
        ("loneliness", "/answers/relationships/coping-with-loneliness"),
        ("guilt", "/answers/emotions/dealing-with-guilt"),
        ("shame", "/answers/emotions/overcoming-shame"),
        ("forgiveness", "/answers/relationships/practicing-forgiveness"),
        ("gratitude", "/answers/mindfulness/practicing-gratitude"),
        ("resilience", "/answers/identity/building-resilience"),
        ("change", "/answers/life-transitions/coping-with-change"),
        ("identity", "/answers/identity/finding-your-identity"),
        ("purpose", "/answers/life-transitions/finding-purpose"),
        ("meaning", "/answers/spirituality/finding-meaning"),
        ("faith", "/answers/spirituality/faith-and-mental-health"),
        ("addiction", "/answers/addiction/understanding-addiction"),
        ("recovery", "/answers/addiction/recovery-journey"),
        ("healing", "/answers/healing/healing-process"),
        ("growth", "/answers/personal-growth/personal-growth"),
        ("transformation", "/answers/personal-growth/personal-transformation"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> TermLinks {
        TermLinks::builtin()
    }

    fn count_internal_links(html: &str) -> usize {
        html.matches(r#"class="internal-link""#).count()
    }

    #[test]
    fn budget_never_exceeded() {
        let out = links().add_internal_links("Therapy, therapy, therapy, therapy, therapy");
        assert_eq!(count_internal_links(&out), MAX_LINKS_PER_DOC);
        // The fifth occurrence stays plain text.
        assert!(out.ends_with("therapy"));
    }

    #[test]
    fn budget_shared_across_distinct_terms() {
        let out = links()
            .add_internal_links("anxiety depression stress therapy grief trauma burnout sleep");
        assert_eq!(count_internal_links(&out), MAX_LINKS_PER_DOC);
    }

    #[test]
    fn no_double_linking_inside_existing_anchor() {
        let input = r#"see <a href="/answers/anxiety/what-is-anxiety">anxiety</a> for more"#;
        let out = links().add_internal_links(input);
        // The "anxiety" inside the pre-existing anchor must not be rewrapped.
        assert!(!out.contains(r#"<a href="/answers/anxiety/what-is-anxiety"><a"#));
        assert_eq!(out.matches("<a ").count() + out.matches("<a>").count(), 1);
    }

    #[test]
    fn longest_term_wins_over_contained_term() {
        let out = links().add_internal_links("I struggle with people-pleasing daily");
        assert!(out.contains(
            r#"<a href="/answers/work-life/stop-people-pleasing-at-work" class="internal-link">people-pleasing</a>"#
        ));
        // No separate link fragments inside the longer match.
        assert_eq!(count_internal_links(&out), 1);
    }

    #[test]
    fn whole_word_only() {
        // "angers" must not match the term "anger".
        let out = links().add_internal_links("this angers nobody");
        assert_eq!(count_internal_links(&out), 0);
    }

    #[test]
    fn case_insensitive_and_keeps_original_casing() {
        let out = links().add_internal_links("GRIEF is heavy");
        assert!(out.contains(r#"class="internal-link">GRIEF</a>"#));
    }

    #[test]
    fn deterministic_for_same_input() {
        let input = "anxiety and stress and therapy and grief and sleep";
        assert_eq!(links().add_internal_links(input), links().add_internal_links(input));
    }

    #[test]
    fn empty_input_passes_through() {
        assert_eq!(links().add_internal_links(""), "");
    }

    #[test]
    fn hyphenated_terms_sorted_before_substrings() {
        // "social anxiety" (longer) consumes its occurrence before "anxiety"
        // is attempted, so only the standalone "anxiety" gets its own link.
        let out = links().add_internal_links("social anxiety is not plain anxiety");
        assert!(out.contains(
            r#"<a href="/answers/relationships/supporting-social-anxiety" class="internal-link">social anxiety</a>"#
        ));
        assert!(out.contains(
            r#"<a href="/answers/anxiety/what-is-anxiety" class="internal-link">anxiety</a>"#
        ));
        assert_eq!(count_internal_links(&out), 2);
    }
}
