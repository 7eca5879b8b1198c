use crate::errors::OmResult;

/// Pluggable content-encryption filter at the Store boundary (§9 design
/// notes). Classification/simhash always run on plaintext before this
/// filter is applied on write; reads that return content to callers run
/// it in reverse. The no-op filter is the default when encryption is
/// disabled.
pub trait ContentFilter: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> OmResult<String>;
    fn decrypt(&self, stored: &str) -> OmResult<String>;
}

/// Identity filter used when `ops.encryption_enabled` is false.
pub struct NoopContentFilter;

impl ContentFilter for NoopContentFilter {
    fn encrypt(&self, plaintext: &str) -> OmResult<String> {
        Ok(plaintext.to_string())
    }

    fn decrypt(&self, stored: &str) -> OmResult<String> {
        Ok(stored.to_string())
    }
}
