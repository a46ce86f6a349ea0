//! Seam between the extractor and whatever generates text from a document

use std::future::Future;

use serde_json::Value;

/// Everything a single generation call carries
#[derive(Debug, Clone, Copy)]
pub struct GenerateRequest<'a> {
    pub instruction: &'a str,
    pub mime_type: &'a str,
    pub data_base64: &'a str,
    pub response_schema: &'a Value,
}

/// A hosted (or fake) multimodal model.
///
/// `generate` returns the raw response text, which may be empty. Transport and
/// service failures are errors.
pub trait ModelBackend {
    fn generate(&self, request: &GenerateRequest<'_>) -> impl Future<Output = anyhow::Result<String>> + Send;
}
