//! JSON-LD structured data builders
//!
//! Each page embeds a schema.org graph so search engines can render rich
//! results. Builders return `serde_json::Value`; pages serialize them into
//! a `<script type="application/ld+json">` block.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{json, Value};

use crate::content::EntityTable;
use crate::db::{CategoryStat, Question, QuestionDetail};

// RFC 3986 unreserved characters pass through; spaces and '&' in category
// names are encoded so every emitted URL is valid.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Organization node shared by every page graph.
pub fn organization(site_url: &str) -> Value {
    json!({
        "@type": "Organization",
        "@id": format!("{site_url}/#organization"),
        "name": "Deeper",
        "url": site_url,
        "logo": format!("{site_url}/logo.png"),
    })
}

/// Homepage graph: WebSite, Organization, and the category list.
pub fn homepage(site_url: &str, stats: &[CategoryStat]) -> Value {
    json!({
        "@context": "https://schema.org",
        "@graph": [
            {
                "@type": "WebSite",
                "@id": format!("{site_url}/#website"),
                "name": "Deeper",
                "url": site_url,
                "publisher": { "@id": format!("{site_url}/#organization") },
            },
            organization(site_url),
            category_list(site_url, stats),
        ]
    })
}

/// QAPage graph for one answer page.
///
/// The `about` list carries up to five entities recognized in the question
/// and answer text, so the page is semantically tied to known topics.
pub fn question_page(
    site_url: &str,
    detail: &QuestionDetail,
    sanitized_answer: &str,
    entity_table: &EntityTable,
) -> Value {
    let page_url = format!("{site_url}/answers/{}", detail.slug);
    let haystack = format!("{} {}", detail.question, detail.answer);
    let about = about_entities(&haystack, entity_table);

    let mut main_entity = json!({
        "@type": "Question",
        "name": detail.question,
        "answerCount": 1,
        "acceptedAnswer": {
            "@type": "Answer",
            "text": sanitized_answer,
            "dateCreated": detail.created_at.to_rfc3339(),
        },
    });

    if !about.is_empty() {
        main_entity["about"] = Value::Array(about);
    }

    json!({
        "@context": "https://schema.org",
        "@type": "QAPage",
        "@id": page_url,
        "url": page_url,
        "name": detail.question,
        "mainEntity": main_entity,
        "publisher": { "@id": format!("{site_url}/#organization") },
    })
}

/// CollectionPage graph for a category listing.
pub fn category_page(site_url: &str, category: &str, questions: &[Question]) -> Value {
    collection_page(
        site_url,
        category,
        &format!("{site_url}/categories/{}", encode_segment(category)),
        questions,
    )
}

/// CollectionPage graph for a cluster listing. Clusters live under their own
/// route; the display title never appears in the URL.
pub fn cluster_page(site_url: &str, slug: &str, title: &str, questions: &[Question]) -> Value {
    collection_page(
        site_url,
        title,
        &format!("{site_url}/clusters/{}", encode_segment(slug)),
        questions,
    )
}

fn collection_page(site_url: &str, name: &str, page_url: &str, questions: &[Question]) -> Value {
    let items: Vec<Value> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": q.question,
                "url": format!("{site_url}/answers/{}", q.slug),
            })
        })
        .collect();

    json!({
        "@context": "https://schema.org",
        "@type": "CollectionPage",
        "name": name,
        "url": page_url,
        "mainEntity": {
            "@type": "ItemList",
            "numberOfItems": items.len(),
            "itemListElement": items,
        },
        "publisher": { "@id": format!("{site_url}/#organization") },
    })
}

/// FAQPage graph for the answers hub: the latest questions as FAQ entries.
pub fn answers_hub(site_url: &str, questions: &[Question]) -> Value {
    let entries: Vec<Value> = questions
        .iter()
        .map(|q| {
            json!({
                "@type": "Question",
                "name": q.question,
                "url": format!("{site_url}/answers/{}", q.slug),
            })
        })
        .collect();

    json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "url": format!("{site_url}/answers"),
        "mainEntity": entries,
        "publisher": { "@id": format!("{site_url}/#organization") },
    })
}

/// ItemList of categories with their counts, for the homepage.
pub fn category_list(site_url: &str, stats: &[CategoryStat]) -> Value {
    let items: Vec<Value> = stats
        .iter()
        .enumerate()
        .map(|(i, s)| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": s.category,
                "url": format!("{site_url}/categories/{}", encode_segment(&s.category)),
            })
        })
        .collect();

    json!({
        "@type": "ItemList",
        "numberOfItems": items.len(),
        "itemListElement": items,
    })
}

/// Up to five recognized entities, each typed per its table entry
/// (MedicalCondition, MedicalTherapy, Drug, or Thing).
fn about_entities(text: &str, table: &EntityTable) -> Vec<Value> {
    table
        .extract_entities(text)
        .into_iter()
        .map(|e| {
            json!({
                "@type": e.schema_type,
                "name": e.name,
                "sameAs": e.url,
            })
        })
        .collect()
}
