//! Input validation for request payloads
//! Length caps, slug/category shape checks, and the external-URL gate

use anyhow::{anyhow, Result};

use crate::content::contains_external_url;

/// Maximum lengths for security
pub const MAX_SLUG_LENGTH: usize = 256;
pub const MAX_CATEGORY_LENGTH: usize = 128;
pub const MAX_TITLE_LENGTH: usize = 512;
pub const MAX_ANSWER_LENGTH: usize = 100_000; // 100KB of HTML

/// Validate a question or cluster slug
pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.trim().is_empty() {
        return Err(anyhow!("slug cannot be empty"));
    }

    if slug.len() > MAX_SLUG_LENGTH {
        return Err(anyhow!(
            "slug too long: {} chars (max: {})",
            slug.len(),
            MAX_SLUG_LENGTH
        ));
    }

    // Slugs are URL path segments; reject anything that would escape one.
    if !slug
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(anyhow!(
            "slug contains invalid characters (allowed: alphanumeric, -, _)"
        ));
    }

    Ok(())
}

/// Validate a category name (human-readable, may contain spaces and '&')
pub fn validate_category(category: &str) -> Result<()> {
    if category.trim().is_empty() {
        return Err(anyhow!("category cannot be empty"));
    }

    if category.len() > MAX_CATEGORY_LENGTH {
        return Err(anyhow!(
            "category too long: {} chars (max: {})",
            category.len(),
            MAX_CATEGORY_LENGTH
        ));
    }

    Ok(())
}

/// Validate a question title
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(anyhow!("title cannot be empty"));
    }

    if title.len() > MAX_TITLE_LENGTH {
        return Err(anyhow!(
            "title too long: {} chars (max: {})",
            title.len(),
            MAX_TITLE_LENGTH
        ));
    }

    Ok(())
}

/// Validate answer HTML length
pub fn validate_answer(answer: &str) -> Result<()> {
    if answer.trim().is_empty() {
        return Err(anyhow!("answer cannot be empty"));
    }

    if answer.len() > MAX_ANSWER_LENGTH {
        return Err(anyhow!(
            "answer too long: {} bytes (max: {})",
            answer.len(),
            MAX_ANSWER_LENGTH
        ));
    }

    Ok(())
}

/// Reject any value carrying an external URL. Detection, not cleanup:
/// callers fix their content rather than having it silently rewritten.
pub fn assert_no_external_links(field: &str, value: &str) -> Result<()> {
    if contains_external_url(value) {
        return Err(anyhow!("field '{field}' contains an external URL"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("how-to-stop-a-panic-attack").is_ok());
        assert!(validate_slug("slug_with_underscores").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("   ").is_err());
        assert!(validate_slug("has spaces").is_err());
        assert!(validate_slug("path/traversal").is_err());
        assert!(validate_slug(&"x".repeat(MAX_SLUG_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_category() {
        assert!(validate_category("Grief & Loss").is_ok());
        assert!(validate_category("Anxiety").is_ok());
        assert!(validate_category("").is_err());
        assert!(validate_category(&"x".repeat(MAX_CATEGORY_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_title_and_answer() {
        assert!(validate_title("How do I sleep better?").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_answer("<p>Some answer.</p>").is_ok());
        assert!(validate_answer("").is_err());
    }

    #[test]
    fn test_assert_no_external_links() {
        assert!(assert_no_external_links("answer", "clean text").is_ok());
        assert!(assert_no_external_links("answer", "see https://x.com").is_err());
        assert!(assert_no_external_links("answer", "visit www.example.org").is_err());

        let err = assert_no_external_links("question", "http://bad.example").unwrap_err();
        assert!(err.to_string().contains("question"));
    }
}
