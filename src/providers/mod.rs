mod openai;


pub use openai::{OpenAiGateway, RetryPolicy};

use crate::core::config::AppConfig;
use crate::core::error::ProviderError;
use crate::core::model::ModelId;
use crate::core::persona::Persona;
use crate::core::provider::ChatGateway;
use std::sync::Arc;
use std::time::Duration;

/// Create a gateway for one credential/model pair.
/// All models go through the OpenAI-compatible endpoint in `config.base_url`.
pub fn create_gateway(
    config: &AppConfig,
    api_key: &str,
    model_id: &ModelId,
    persona: Persona,
) -> Result<Arc<dyn ChatGateway>, ProviderError> {
    if api_key.is_empty() {
        return Err(ProviderError::MissingApiKey(
            "OPENAI_API_KEY not set. Set via env var, config file or --api-key.".into(),
        ));
    }

    Ok(Arc::new(OpenAiGateway::new(
        api_key.to_string(),
        model_id.clone(),
        config.base_url.clone(),
        persona.instruction().to_string(),
        retry_policy(config),
    )))
}

pub fn retry_policy(config: &AppConfig) -> RetryPolicy {
    RetryPolicy {
        max_retries: config.max_retries,
        initial_delay: Duration::from_secs(config.retry_delay_secs),
    }
}
