//! Generative AI provider seam.
//!
//! The profiler only needs one capability from the provider: send a prompt
//! with web grounding enabled, get back text plus the citations the provider
//! attached. `GenerativeModel` captures that so the service can run against
//! the real Gemini API or a scripted fake.

pub mod client;

pub use client::GeminiClient;

use async_trait::async_trait;

use crate::error::ProfilerError;
use crate::types::Source;

/// A provider answer: free text (possibly empty) plus grounding citations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generation {
    pub text: String,
    pub sources: Vec<Source>,
}

#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Issue one grounded request for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<Generation, ProfilerError>;
}
