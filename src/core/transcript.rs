use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::error::ExportError;

/// Header line of the rendered transcript.
pub const HISTORY_HEADER: &str = "Chat History";

const ENTRY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "User"),
            Self::Assistant => write!(f, "Assistant"),
        }
    }
}

/// One logged turn. Fields are private so an entry cannot change after it
/// has been appended.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    created_at: DateTime<Local>,
    role: Role,
    content: String,
}

impl TranscriptEntry {
    fn new(role: Role, content: String) -> Self {
        Self {
            created_at: Local::now(),
            role,
            content,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// `YYYY-MM-DD HH:MM:SS` in local time.
    pub fn timestamp(&self) -> String {
        self.created_at.format(ENTRY_TIMESTAMP_FORMAT).to_string()
    }
}

impl fmt::Display for TranscriptEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.timestamp(), self.role, self.content)
    }
}

/// Append-only chat history for one session.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, role: Role, content: impl Into<String>) {
        self.entries.push(TranscriptEntry::new(role, content.into()));
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Content of the most recent assistant entry, if any.
    pub fn last_reply(&self) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.role == Role::Assistant)
            .map(|e| e.content.as_str())
    }

    /// Header, blank line, then one `[timestamp] role: content` block per
    /// entry, each followed by a blank line.
    pub fn formatted_history(&self) -> String {
        let mut out = format!("{HISTORY_HEADER}\n\n");
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push_str("\n\n");
        }
        out
    }

    /// Write the transcript into the working directory and return the
    /// relative filename. A second export within the same second reuses the
    /// name and overwrites the earlier file.
    pub fn save_to_file(&self) -> Result<PathBuf, ExportError> {
        self.write_to(PathBuf::from(export_filename(Local::now())))
    }

    /// Same as [`Transcript::save_to_file`] but inside `dir`.
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        self.write_to(dir.join(export_filename(Local::now())))
    }

    fn write_to(&self, path: PathBuf) -> Result<PathBuf, ExportError> {
        let content = self.formatted_history();
        match std::fs::write(&path, content.as_bytes()) {
            Ok(()) => {
                tracing::info!(path = %path.display(), entries = self.len(), "transcript exported");
                Ok(path)
            }
            Err(source) => Err(ExportError::Io { path, source }),
        }
    }
}

/// `chat_history_<YYYYMMDD_HHMMSS>.txt`
pub fn export_filename(at: DateTime<Local>) -> String {
    format!("chat_history_{}.txt", at.format(FILENAME_TIMESTAMP_FORMAT))
}
