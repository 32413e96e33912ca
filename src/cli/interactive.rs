use anyhow::Result;
use std::io::{self, BufRead, Write};

use crate::chat::{ChatSession, TurnOutcome, MISSING_CREDENTIAL_MESSAGE};
use crate::core::config::mask_key;
use crate::core::model::{self, ModelChoice, ModelId, MODELS};

fn print_model_menu(current: &ModelId) {
    for (i, m) in MODELS.iter().enumerate() {
        let marker = if m.id == current.0 {
            " \x1b[33m\u{2190} current\x1b[0m"
        } else {
            ""
        };
        eprintln!(
            "    \x1b[1;33m[{}]\x1b[0m \x1b[1m{:<20}\x1b[0m \x1b[90m({}, {})\x1b[0m{}",
            i + 1,
            m.name,
            m.vendor,
            m.id,
            marker,
        );
    }
}

fn announce_model(chosen: &ModelChoice) {
    eprintln!(
        "\n  \x1b[32m\u{2713}\x1b[0m Using \x1b[1;36m{}\x1b[0m \x1b[90m({})\x1b[0m\n",
        chosen.name, chosen.id
    );
}

/// Show the model menu and return the chosen ModelId
fn select_model(default: &ModelId) -> Result<ModelId> {
    eprintln!("\x1b[1;36m  Select a model:\x1b[0m\n");
    print_model_menu(default);
    eprintln!();

    let default_idx = model::position(default);
    eprint!(
        "  \x1b[1mModel \x1b[33m[{}]\x1b[0m\x1b[1m:\x1b[0m ",
        default_idx + 1
    );
    io::stderr().flush().ok();

    let input = read_line_lossy()?;
    let input = input.trim();

    let chosen = if input.is_empty() {
        &MODELS[default_idx]
    } else {
        match model::resolve_choice(input) {
            Some(m) => m,
            None => {
                eprintln!("  \x1b[33mInvalid choice, using default.\x1b[0m");
                &MODELS[default_idx]
            }
        }
    };

    announce_model(chosen);
    Ok(chosen.model_id())
}

/// Show the key status, or ask for one when none was supplied.
/// An empty answer is allowed; every message is then refused until `/key`.
fn prompt_api_key(api_key: &mut Option<String>) -> Result<()> {
    match api_key {
        Some(key) => {
            eprintln!("  \x1b[90mAPI Key: \x1b[36m{}\x1b[0m", mask_key(key));
        }
        None => {
            eprintln!("  \x1b[33mNo API key found.\x1b[0m");
            eprintln!("  \x1b[90mEnv: OPENAI_API_KEY | Config: prompt-creator.json\x1b[0m");
            eprint!("\n  \x1b[1mAPI Key:\x1b[0m ");
            io::stderr().flush().ok();

            let key = read_line_lossy()?.trim().to_string();
            if key.is_empty() {
                eprintln!("  \x1b[33mNo key entered. Use /key before sending messages.\x1b[0m");
            } else {
                *api_key = Some(key);
                eprintln!("  \x1b[32m\u{2713}\x1b[0m Key set for this session.");
            }
        }
    }
    eprintln!();
    Ok(())
}

/// Read a line from stdin, handling non-UTF-8 bytes gracefully
fn read_line_lossy() -> Result<String> {
    let stdin = io::stdin();
    let mut buf = Vec::new();
    match stdin.lock().read_until(b'\n', &mut buf) {
        Ok(0) => Ok(String::new()),
        Ok(_) => Ok(String::from_utf8_lossy(&buf).into_owned()),
        Err(e) => Err(anyhow::anyhow!("Input error: {e}")),
    }
}

/// Drop the trailing newline (and a preceding `\r`), keeping all other
/// whitespace.
fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Read the next message, unmodified apart from the line ending. `None` on
/// EOF.
fn read_prompt() -> Result<Option<String>> {
    eprint!("  \x1b[1;32mcreator>\x1b[0m ");
    io::stderr().flush().ok();

    let stdin = io::stdin();
    let mut buf = Vec::new();
    match stdin.lock().read_until(b'\n', &mut buf) {
        Ok(0) => Ok(None),
        Ok(_) => Ok(Some(
            strip_line_ending(&String::from_utf8_lossy(&buf)).to_string(),
        )),
        Err(e) => Err(anyhow::anyhow!("Input error: {e}")),
    }
}

pub async fn run(
    mut session: ChatSession,
    mut api_key: Option<String>,
    preset_model: Option<ModelId>,
) -> Result<()> {
    eprintln!();

    prompt_api_key(&mut api_key)?;

    let mut model_id = match preset_model {
        Some(id) => id,
        None => select_model(&session.config().default_model)?,
    };

    if model::get_model(&model_id).is_none() {
        eprintln!(
            "  \x1b[33mNote: Model '{}' is not in the model list.\x1b[0m\n",
            model_id
        );
    }

    eprintln!(
        "  \x1b[1;35mPrompt Creator\x1b[0m v{} \x1b[90m(\x1b[1;36m{}\x1b[90m \u{00b7} {} persona)\x1b[0m",
        env!("CARGO_PKG_VERSION"),
        model_id,
        session.persona(),
    );
    eprintln!("  \x1b[90mDescribe what you need, /help for commands, Ctrl-D to exit\x1b[0m");
    eprintln!();

    loop {
        let prompt = match read_prompt()? {
            None => {
                eprintln!("\n  \x1b[90mGoodbye!\x1b[0m");
                break;
            }
            Some(p) if p.trim().is_empty() => continue,
            Some(p) => p,
        };

        let trimmed = prompt.trim();
        if trimmed.starts_with('/') {
            let (command, arg) = match trimmed.split_once(' ') {
                Some((c, a)) => (c, a.trim()),
                None => (trimmed, ""),
            };
            match command {
                "/help" | "/h" => {
                    eprintln!("\n  \x1b[1mCommands:\x1b[0m");
                    eprintln!("    /history     Show the chat history");
                    eprintln!("    /export      Save the chat history to a file");
                    eprintln!("    /model [n]   Show or switch the model");
                    eprintln!("    /key         Change API key");
                    eprintln!("    /exit        Exit\n");
                }
                "/exit" | "/quit" | "/q" => {
                    eprintln!("  \x1b[90mGoodbye!\x1b[0m");
                    break;
                }
                "/history" => {
                    println!("\n{}", session.formatted_history());
                }
                "/export" => match session.export() {
                    Ok(path) => {
                        eprintln!("  \x1b[32m\u{2713}\x1b[0m Saved to \x1b[1m{}\x1b[0m\n", path.display());
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "export failed");
                        eprintln!("  \x1b[31mExport failed: {e}\x1b[0m\n");
                    }
                },
                "/model" if arg.is_empty() => {
                    eprintln!("  Model: \x1b[1;36m{}\x1b[0m\n", model_id);
                    print_model_menu(&model_id);
                    eprintln!();
                }
                "/model" => match model::resolve_choice(arg) {
                    Some(chosen) => {
                        model_id = chosen.model_id();
                        announce_model(chosen);
                    }
                    None => eprintln!("  \x1b[33mUnknown model '{arg}'. Type /model to list.\x1b[0m\n"),
                },
                "/key" => {
                    if let Some(current) = &api_key {
                        eprintln!("  \x1b[90mCurrent: \x1b[36m{}\x1b[0m", mask_key(current));
                    }
                    eprint!("  \x1b[1mNew API Key:\x1b[0m ");
                    io::stderr().flush().ok();
                    let input = read_line_lossy()?.trim().to_string();
                    if input.is_empty() {
                        eprintln!("  \x1b[33mCancelled.\x1b[0m\n");
                    } else {
                        api_key = Some(input);
                        eprintln!("  \x1b[32m\u{2713}\x1b[0m Key updated.\n");
                    }
                }
                _ => {
                    eprintln!("  Unknown command. Type /help\n");
                }
            }
            continue;
        }

        eprint!("\x1b[90mThinking...\x1b[0m");
        io::stderr().flush().ok();

        let outcome = session.submit(api_key.as_deref(), &model_id, &prompt).await;
        eprint!("\r\x1b[K");

        match outcome {
            TurnOutcome::MissingCredential => {
                eprintln!("  \x1b[33m{MISSING_CREDENTIAL_MESSAGE}\x1b[0m \x1b[90m(/key)\x1b[0m\n");
            }
            TurnOutcome::Completed(turn) => {
                if turn.is_error() {
                    eprintln!("\x1b[31;1m{}\x1b[0m", turn.display_reply());
                } else {
                    println!("{}", turn.display_reply());
                }
                println!("\n{}", turn.history);
                eprintln!("  \x1b[90m[/export to save the history]\x1b[0m\n");
            }
        }
    }

    Ok(())
}
