//! End-to-end tests for the content sanitization pipeline.
//!
//! These exercise the full four-stage pipeline through `LinkPolicy` the way
//! the answer page handler uses it, over inputs that mix markdown links,
//! Wikipedia anchors, entity mentions, and plain prose.

use deeper_content::content::{
    contains_external_url, strip_external_links, LinkPolicy, MAX_LINKS_PER_DOC,
};

fn sanitize(input: &str) -> String {
    LinkPolicy::builtin().sanitize_answer(input).html
}

// ═══════════════════════════════════════════════════════════════════════
// The core guarantee: no outbound links survive
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn no_external_url_survives_any_input_shape() {
    let inputs = [
        "Plain prose about anxiety and sleep.",
        "Read [the study](https://journals.example.org/a/1) for details.",
        r#"See <a href="https://example.com/page?x=1&y=2">this</a> too."#,
        "Bare link: https://example.com/deep/path#frag and more text.",
        r#"<a href="http://example.com">one</a> and [two](https://example.net)"#,
        "Nested markdown [a [b] c](https://example.com/x).",
    ];

    for input in inputs {
        let html = sanitize(input);
        assert!(
            !contains_external_url(&html),
            "input {input:?} produced {html:?}"
        );
    }
}

#[test]
fn stripping_is_idempotent() {
    let input = "Anxiety [link](https://example.com) and \
                 <a href=\"https://en.wikipedia.org/wiki/Sleep\">sleep</a>.";
    let once = sanitize(input);
    let twice = strip_external_links(&once, false);
    assert_eq!(once, twice);
}

#[test]
fn relative_links_pass_through_untouched() {
    let input = r#"Browse <a href="/categories/Sleep">the sleep category</a>."#;
    let html = sanitize(input);
    assert!(html.contains(r#"href="/categories/Sleep""#));
}

// ═══════════════════════════════════════════════════════════════════════
// Entity recognition feeds structured data, not visible links
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn entities_are_reported_with_urls_for_structured_data() {
    let out = LinkPolicy::builtin()
        .sanitize_answer("Mindfulness and meditation both help with insomnia.");

    assert!(!out.entities.is_empty());
    for entity in &out.entities {
        assert!(entity.url.starts_with("https://"), "url {}", entity.url);
        assert!(!entity.name.is_empty());
    }
    // The URLs live in the side list only, never in the rendered HTML.
    assert!(!contains_external_url(&out.html));
}

#[test]
fn each_entity_is_reported_once_per_document() {
    let out = LinkPolicy::builtin().sanitize_answer(
        "Grief after loss, stress at work, and burnout feed each other; \
         grief especially so.",
    );
    let mut terms: Vec<&str> = out.entities.iter().map(|e| e.term.as_str()).collect();
    let before = terms.len();
    terms.sort_unstable();
    terms.dedup();
    assert_eq!(terms.len(), before, "duplicate entity reported");
    assert!(terms.contains(&"grief"));
    assert!(terms.contains(&"stress"));
    assert!(terms.contains(&"burnout"));
}

#[test]
fn repeated_mentions_report_one_entity() {
    let out = LinkPolicy::builtin()
        .sanitize_answer("Anxiety, more anxiety, and yet more anxiety.");
    let count = out
        .entities
        .iter()
        .filter(|e| e.term.eq_ignore_ascii_case("anxiety"))
        .count();
    assert_eq!(count, 1);
}

// ═══════════════════════════════════════════════════════════════════════
// Internal links: rewritten Wikipedia anchors plus budgeted term links
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn wikipedia_anchor_text_survives_as_internal_link() {
    let html = sanitize(
        r#"Try <a href="https://en.wikipedia.org/wiki/Meditation">daily meditation</a>."#,
    );
    assert!(html.contains("daily meditation"));
    assert!(html.contains(r#"class="internal-link""#));
    assert!(!html.contains("wikipedia"));
}

#[test]
fn term_link_budget_holds_for_term_dense_text() {
    let html = sanitize(
        "When grief follows loss, therapy can help. Poor sleep feeds stress, \
         so boundaries matter, as do gratitude, resilience, and healing.",
    );
    let links = html.matches(r#"class="internal-link""#).count();
    assert!(links <= MAX_LINKS_PER_DOC, "found {links} links: {html}");
    assert!(links > 0, "expected at least one internal link: {html}");
}

#[test]
fn internal_links_never_nest() {
    let html = sanitize(
        r#"See <a href="https://en.wikipedia.org/wiki/Grief">grief and therapy</a> notes."#,
    );
    // No anchor may open inside another anchor.
    let mut depth = 0i32;
    let mut rest = html.as_str();
    loop {
        match (rest.find("<a "), rest.find("</a>")) {
            (Some(o), Some(c)) if o < c => {
                depth += 1;
                assert!(depth <= 1, "nested anchor in {html}");
                rest = &rest[o + 3..];
            }
            (Some(o), None) => {
                depth += 1;
                assert!(depth <= 1, "nested anchor in {html}");
                rest = &rest[o + 3..];
            }
            (_, Some(c)) => {
                depth -= 1;
                rest = &rest[c + 4..];
            }
            (None, None) => break,
        }
    }
}

#[test]
fn term_inside_attribute_is_not_linked() {
    let html = sanitize(r#"<img alt="a person in therapy" src="/img/x.png"> Therapy helps."#);
    assert!(html.contains(r#"alt="a person in therapy""#), "got {html}");
}

// ═══════════════════════════════════════════════════════════════════════
// Shape preservation
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn markup_without_links_or_terms_is_unchanged() {
    let input = "<p>Drink water. Rest often. Breathe slowly.</p>";
    assert_eq!(sanitize(input), input);
}

#[test]
fn unicode_prose_survives() {
    let input = "Schlaf ist wichtig. 睡眠很重要. Le sommeil compte.";
    let html = sanitize(input);
    assert!(html.contains("睡眠很重要"));
    assert!(html.contains("Schlaf"));
}

#[test]
fn markdown_link_text_is_kept_when_target_is_stripped() {
    let html = sanitize("Read [this helpful guide](https://example.com/guide) tonight.");
    assert!(html.contains("this helpful guide"));
    assert!(!html.contains("example.com"));
}
