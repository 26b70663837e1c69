//! The text-completion seam the answer engine depends on

use async_trait::async_trait;

use crate::error::Result;

/// Anything that can turn a system prompt and user content into text
///
/// A failure here is never fatal to an ask; the engine falls back to its
/// rule-based answer.
#[async_trait]
pub trait TextCompleter: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: usize,
        temperature: f32,
    ) -> Result<String>;
}
