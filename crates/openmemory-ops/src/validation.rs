//! Input validation for the facade boundary (§4.8: "the facade performs
//! input validation (size, types)"). Nothing downstream re-checks these;
//! every other crate trusts its callers.
use openmemory_core::errors::{OmError, OmResult};

/// Plaintext content past this size is rejected rather than silently
/// truncated — callers that hit this should chunk on their side.
pub const MAX_CONTENT_BYTES: usize = 64 * 1024;
pub const MAX_TAGS: usize = 64;
pub const MAX_TAG_BYTES: usize = 256;

pub fn validate_content(content: &str) -> OmResult<()> {
    if content.is_empty() {
        return Err(OmError::validation("content must not be empty"));
    }
    if content.len() > MAX_CONTENT_BYTES {
        return Err(OmError::validation(format!(
            "content exceeds {MAX_CONTENT_BYTES} bytes"
        )));
    }
    Ok(())
}

pub fn validate_tags(tags: &[String]) -> OmResult<()> {
    if tags.len() > MAX_TAGS {
        return Err(OmError::validation(format!("too many tags: max {MAX_TAGS}")));
    }
    for tag in tags {
        if tag.is_empty() || tag.len() > MAX_TAG_BYTES {
            return Err(OmError::validation("tag must be non-empty and under the byte limit"));
        }
    }
    Ok(())
}

pub fn validate_metadata(meta: &serde_json::Value) -> OmResult<()> {
    if !meta.is_object() && !meta.is_null() {
        return Err(OmError::validation("metadata must be a JSON object"));
    }
    Ok(())
}

pub fn validate_id(id: &str) -> OmResult<()> {
    if id.is_empty() {
        return Err(OmError::validation("id must not be empty"));
    }
    Ok(())
}

pub fn validate_top_k(k: usize) -> OmResult<()> {
    if k == 0 {
        return Err(OmError::validation("k must be at least 1"));
    }
    Ok(())
}

pub fn validate_boost(boost: f64) -> OmResult<()> {
    if !(0.0..=1.0).contains(&boost) {
        return Err(OmError::validation("boost must be within [0, 1]"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_content() {
        assert!(validate_content("").is_err());
    }

    #[test]
    fn rejects_oversize_content() {
        let huge = "a".repeat(MAX_CONTENT_BYTES + 1);
        assert!(validate_content(&huge).is_err());
    }

    #[test]
    fn rejects_non_object_metadata() {
        assert!(validate_metadata(&serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn accepts_null_metadata() {
        assert!(validate_metadata(&serde_json::Value::Null).is_ok());
    }

    #[test]
    fn rejects_boost_out_of_range() {
        assert!(validate_boost(1.5).is_err());
        assert!(validate_boost(-0.1).is_err());
    }
}
