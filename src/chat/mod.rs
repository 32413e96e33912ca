mod session;

#[cfg(test)]
mod tests;

pub use session::{render_reply, ChatSession, Turn, TurnOutcome, MISSING_CREDENTIAL_MESSAGE};
