use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    MissingCredential(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Throttled or temporarily unavailable (429/502/503). `retry_after_ms`
    /// is the server's `Retry-After`, when it sent one.
    #[error("Rate limited ({status}): {message}")]
    RateLimited {
        status: u16,
        message: String,
        retry_after_ms: Option<u64>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing API key: {0}")]
    MissingApiKey(String),
}

impl ProviderError {
    /// Transport failures and throttling statuses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::RateLimited { .. })
    }

    /// Form reported to the caller once no further attempt follows: a
    /// throttling status becomes a plain API error with the server's text.
    pub fn into_final(self) -> Self {
        match self {
            Self::RateLimited {
                status, message, ..
            } => Self::Api { status, message },
            other => other,
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file error: {0}")]
    File(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
