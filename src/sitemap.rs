//! Sitemap XML generation
//!
//! One index at /sitemap.xml pointing at fixed-size answer chunks plus a
//! categories sitemap. Chunk membership is stable: questions are ordered
//! oldest first, so new content only ever appends to the last chunk.

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::db::SitemapEntry;

// Everything except RFC 3986 unreserved characters, so question slugs keep
// their hyphens while category names get their spaces and '&' encoded.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Answer URLs per sitemap chunk.
pub const QUESTIONS_PER_CHUNK: usize = 500;

/// Number of answer chunks needed for a given question count. Zero questions
/// still produce one (empty) chunk so /sitemaps/answers-0.xml always exists.
pub fn chunk_count(total_questions: u64) -> usize {
    let total = total_questions as usize;
    total.div_ceil(QUESTIONS_PER_CHUNK).max(1)
}

/// The sitemap index: categories plus every answer chunk.
pub fn sitemap_index(site_url: &str, total_questions: u64) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );

    xml.push_str(&format!(
        "  <sitemap><loc>{}/sitemaps/categories.xml</loc></sitemap>\n",
        xml_escape(site_url)
    ));

    for i in 0..chunk_count(total_questions) {
        xml.push_str(&format!(
            "  <sitemap><loc>{}/sitemaps/answers-{}.xml</loc></sitemap>\n",
            xml_escape(site_url),
            i
        ));
    }

    xml.push_str("</sitemapindex>\n");
    xml
}

/// One chunk of answer URLs, or None when the chunk index is out of range.
/// Chunk 0 exists even with no questions.
pub fn answers_chunk(site_url: &str, entries: &[SitemapEntry], chunk: usize) -> Option<String> {
    if chunk >= chunk_count(entries.len() as u64) {
        return None;
    }

    let start = chunk * QUESTIONS_PER_CHUNK;
    let end = (start + QUESTIONS_PER_CHUNK).min(entries.len());
    let slice = if start < entries.len() {
        &entries[start..end]
    } else {
        &[]
    };

    let mut xml = urlset_open();
    for entry in slice {
        xml.push_str("  <url>\n");
        xml.push_str(&format!(
            "    <loc>{}/answers/{}</loc>\n",
            xml_escape(site_url),
            xml_escape(&encode_segment(&entry.slug))
        ));
        if let Some(lastmod) = entry.updated_at {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod_date(lastmod)));
        }
        xml.push_str("    <changefreq>monthly</changefreq>\n");
        xml.push_str("    <priority>0.7</priority>\n");
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    Some(xml)
}

/// The categories sitemap.
pub fn categories_sitemap(site_url: &str, categories: &[String]) -> String {
    let mut xml = urlset_open();
    for category in categories {
        xml.push_str("  <url>\n");
        xml.push_str(&format!(
            "    <loc>{}/categories/{}</loc>\n",
            xml_escape(site_url),
            xml_escape(&encode_segment(category))
        ));
        xml.push_str("    <changefreq>weekly</changefreq>\n");
        xml.push_str("    <priority>0.8</priority>\n");
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

fn urlset_open() -> String {
    String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    )
}

fn lastmod_date(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: usize) -> Vec<SitemapEntry> {
        (0..n)
            .map(|i| SitemapEntry {
                slug: format!("question-{i}"),
                updated_at: None,
            })
            .collect()
    }

    #[test]
    fn test_chunk_count() {
        assert_eq!(chunk_count(0), 1);
        assert_eq!(chunk_count(1), 1);
        assert_eq!(chunk_count(500), 1);
        assert_eq!(chunk_count(501), 2);
        assert_eq!(chunk_count(1000), 2);
        assert_eq!(chunk_count(1001), 3);
    }

    #[test]
    fn test_index_lists_all_chunks() {
        let xml = sitemap_index("https://example.org", 1001);
        assert!(xml.contains("/sitemaps/categories.xml"));
        assert!(xml.contains("/sitemaps/answers-0.xml"));
        assert!(xml.contains("/sitemaps/answers-1.xml"));
        assert!(xml.contains("/sitemaps/answers-2.xml"));
        assert!(!xml.contains("/sitemaps/answers-3.xml"));
    }

    #[test]
    fn test_chunk_boundaries() {
        let all = entries(501);

        let first = answers_chunk("https://example.org", &all, 0).unwrap();
        assert_eq!(first.matches("<url>").count(), 500);
        assert!(first.contains("question-0"));
        assert!(first.contains("question-499"));

        let second = answers_chunk("https://example.org", &all, 1).unwrap();
        assert_eq!(second.matches("<url>").count(), 1);
        assert!(second.contains("question-500"));

        assert!(answers_chunk("https://example.org", &all, 2).is_none());
    }

    #[test]
    fn test_empty_dataset_still_has_chunk_zero() {
        let xml = answers_chunk("https://example.org", &[], 0).unwrap();
        assert!(xml.contains("<urlset"));
        assert_eq!(xml.matches("<url>").count(), 0);
        assert!(answers_chunk("https://example.org", &[], 1).is_none());
    }

    #[test]
    fn test_answer_urls_carry_changefreq_and_priority() {
        let xml = answers_chunk("https://example.org", &entries(1), 0).unwrap();
        assert!(xml.contains("<changefreq>monthly</changefreq>"));
        assert!(xml.contains("<priority>0.7</priority>"));
    }

    #[test]
    fn test_slug_hyphens_stay_literal() {
        let entry = SitemapEntry {
            slug: "how-to-stop-a-panic-attack".to_string(),
            updated_at: None,
        };
        let xml = answers_chunk("https://example.org", &[entry], 0).unwrap();
        assert!(xml.contains("/answers/how-to-stop-a-panic-attack</loc>"));
        assert!(!xml.contains("%2D"));
    }

    #[test]
    fn test_categories_sitemap_escapes_names() {
        let xml = categories_sitemap(
            "https://example.org",
            &["Grief & Loss".to_string(), "Anxiety".to_string()],
        );
        assert!(xml.contains("Grief%20%26%20Loss"));
        assert!(!xml.contains("Grief & Loss"));
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
        assert!(xml.contains("<priority>0.8</priority>"));
    }
}
