use crate::models::Classification;

/// Maps text (optionally carrying an explicit sector hint in metadata) to
/// a primary sector, additional sectors, and a confidence estimate. Pure
/// and synchronous — no I/O, so it never needs async.
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str, explicit_sector: Option<&str>) -> Classification;
}
