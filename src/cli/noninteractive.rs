use anyhow::Result;

use crate::chat::{ChatSession, TurnOutcome, MISSING_CREDENTIAL_MESSAGE};
use crate::core::error::AppError;
use crate::core::model::ModelId;

pub async fn run(
    mut session: ChatSession,
    api_key: Option<String>,
    model: ModelId,
    prompt: String,
    output_format: super::OutputFormat,
    export: bool,
) -> Result<()> {
    let turn = match session.submit(api_key.as_deref(), &model, &prompt).await {
        TurnOutcome::Completed(turn) => turn,
        TurnOutcome::MissingCredential => {
            return Err(AppError::MissingCredential(format!(
                "{MISSING_CREDENTIAL_MESSAGE}. Set OPENAI_API_KEY or pass --api-key."
            ))
            .into());
        }
    };

    let export_path = if export {
        Some(session.export().map_err(AppError::from)?)
    } else {
        None
    };

    match output_format {
        super::OutputFormat::Text => {
            match &turn.reply {
                Ok(text) => println!("{text}"),
                Err(_) => eprintln!("\x1b[31;1m{}\x1b[0m", turn.display_reply()),
            }
            if let Some(path) = &export_path {
                eprintln!("\x1b[90mTranscript saved to {}\x1b[0m", path.display());
            }
        }
        super::OutputFormat::Json => {
            let mut output = match &turn.reply {
                Ok(text) => serde_json::json!({ "reply": text }),
                Err(e) => serde_json::json!({ "error": e.to_string() }),
            };
            output["session"] = serde_json::Value::String(session.id().to_string());
            output["model"] = serde_json::Value::String(model.0.clone());
            output["history"] = serde_json::Value::String(turn.history.clone());
            if let Some(path) = &export_path {
                output["export"] = serde_json::Value::String(path.display().to_string());
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
