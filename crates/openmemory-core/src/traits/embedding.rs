use async_trait::async_trait;

use crate::errors::OmResult;

/// A single embedding provider capability. The router/fallback driver in
/// `openmemory-embeddings` wraps a list of these; callers never talk to a
/// provider directly.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one piece of text. Implementations should resize (pad/slice)
    /// to `dimensions()` if their native output differs.
    async fn embed_one(&self, text: &str) -> OmResult<Vec<f32>>;

    /// Batch embedding; providers without native batch support may just
    /// loop over `embed_one`. Default impl does exactly that.
    async fn embed_batch(&self, texts: &[String]) -> OmResult<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for t in texts {
            out.push(self.embed_one(t).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize;

    fn name(&self) -> &str;

    /// Advisory, racy health flag (see §5 shared-resource policy on the
    /// provider health map): the worst case of a stale read is one extra
    /// failing call.
    fn is_available(&self) -> bool {
        true
    }
}
