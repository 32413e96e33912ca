use async_trait::async_trait;

use crate::core::error::ProviderError;
use crate::core::model::ModelId;

/// One round trip to a hosted chat-completion service.
///
/// Implementations are stateless between calls: each `send` carries only the
/// system instruction and the given message, never earlier turns. Every
/// failure comes back as a [`ProviderError`] value.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn send(&self, message: &str) -> Result<String, ProviderError>;

    fn model(&self) -> &ModelId;
}
