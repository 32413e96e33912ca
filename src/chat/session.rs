use std::path::PathBuf;

use crate::core::config::AppConfig;
use crate::core::error::{ExportError, ProviderError};
use crate::core::model::ModelId;
use crate::core::persona::Persona;
use crate::core::provider::ChatGateway;
use crate::core::transcript::{Role, Transcript};
use crate::providers;

/// Shown instead of calling the API when no credential was supplied.
pub const MISSING_CREDENTIAL_MESSAGE: &str = "Please enter an API key";

/// Result of one submitted message.
#[derive(Debug)]
pub enum TurnOutcome {
    /// No credential: nothing was sent and the transcript is untouched.
    MissingCredential,
    Completed(Turn),
}

#[derive(Debug)]
pub struct Turn {
    pub reply: Result<String, ProviderError>,
    /// Formatted transcript after both entries were appended
    pub history: String,
}

impl Turn {
    pub fn is_error(&self) -> bool {
        self.reply.is_err()
    }

    pub fn display_reply(&self) -> String {
        render_reply(&self.reply)
    }
}

/// Reply text as shown to the user and recorded in the transcript.
pub fn render_reply(reply: &Result<String, ProviderError>) -> String {
    match reply {
        Ok(text) => text.clone(),
        Err(e) => format!("Error: {e}"),
    }
}

/// State owned by one interactive session.
pub struct ChatSession {
    id: String,
    config: AppConfig,
    persona: Persona,
    transcript: Transcript,
}

impl ChatSession {
    pub fn new(config: AppConfig) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            config,
            persona: Persona::default(),
            transcript: Transcript::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn formatted_history(&self) -> String {
        self.transcript.formatted_history()
    }

    /// Check the credential, then run one turn against a fresh gateway for
    /// `model`.
    pub async fn submit(
        &mut self,
        api_key: Option<&str>,
        model: &ModelId,
        message: &str,
    ) -> TurnOutcome {
        let Some(api_key) = api_key.filter(|k| !k.is_empty()) else {
            tracing::info!(session = %self.id, "message rejected: no API key");
            return TurnOutcome::MissingCredential;
        };

        match providers::create_gateway(&self.config, api_key, model, self.persona) {
            Ok(gateway) => self.submit_with(gateway.as_ref(), message).await,
            Err(e) => {
                tracing::warn!(session = %self.id, error = %e, "could not build gateway");
                TurnOutcome::MissingCredential
            }
        }
    }

    /// Record the user message, ask `gateway`, record the reply (or its
    /// `Error:` rendering) and return both.
    pub async fn submit_with(&mut self, gateway: &dyn ChatGateway, message: &str) -> TurnOutcome {
        tracing::info!(
            session = %self.id,
            model = %gateway.model(),
            persona = %self.persona,
            turn = self.transcript.len() / 2 + 1,
            "submitting message"
        );

        self.transcript.add_message(Role::User, message);
        let reply = gateway.send(message).await;
        self.transcript.add_message(Role::Assistant, render_reply(&reply));

        TurnOutcome::Completed(Turn {
            reply,
            history: self.transcript.formatted_history(),
        })
    }

    /// Write the transcript to `export_dir` (or the working directory) and
    /// return the written path.
    pub fn export(&self) -> Result<PathBuf, ExportError> {
        match &self.config.export_dir {
            Some(dir) => self.transcript.save_in(dir),
            None => self.transcript.save_to_file(),
        }
    }
}
