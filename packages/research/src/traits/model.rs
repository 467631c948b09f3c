//! Generative model trait.
//!
//! Abstracts the LLM calls the extractor and visual verifier need. The
//! reference OpenAI implementation lives behind the `openai` feature; tests
//! use the scripted mock from [`crate::testing`].

use async_trait::async_trait;

use crate::error::Result;

/// A chat-capable generative model, optionally with vision.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Whether credentials are present. Checked before spending quota.
    fn is_configured(&self) -> bool {
        true
    }

    /// One text completion.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// One completion with image inputs attached to the user turn.
    async fn complete_with_images(
        &self,
        system: &str,
        user: &str,
        image_urls: &[String],
    ) -> Result<String>;
}
