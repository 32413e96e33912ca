use super::*;
use crate::core::config::AppConfig;
use crate::core::error::ProviderError;
use crate::core::model::ModelId;
use crate::core::provider::ChatGateway;
use crate::core::transcript::Role;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

struct StubGateway {
    model: ModelId,
    reply: Result<String, ProviderError>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl StubGateway {
    fn replying(reply: Result<String, ProviderError>) -> Self {
        Self {
            model: ModelId("gpt-3.5-turbo".into()),
            reply,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatGateway for StubGateway {
    async fn send(&self, message: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(message.to_string());
        self.reply.clone()
    }

    fn model(&self) -> &ModelId {
        &self.model
    }
}

fn completed(outcome: TurnOutcome) -> Turn {
    match outcome {
        TurnOutcome::Completed(turn) => turn,
        TurnOutcome::MissingCredential => panic!("Expected a completed turn"),
    }
}

#[tokio::test]
async fn test_turn_records_user_and_assistant() {
    let mut session = ChatSession::new(AppConfig::default());
    let gateway = StubGateway::replying(Ok("Role: Travel Planner".into()));

    let turn = completed(session.submit_with(&gateway, "help me plan trips").await);
    assert_eq!(turn.reply.as_deref(), Ok("Role: Travel Planner"));
    assert!(!turn.is_error());
    assert_eq!(turn.history, session.formatted_history());

    let entries = session.transcript().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].role(), Role::User);
    assert_eq!(entries[0].content(), "help me plan trips");
    assert_eq!(entries[1].role(), Role::Assistant);
    assert_eq!(entries[1].content(), "Role: Travel Planner");
    assert_eq!(*gateway.seen.lock().unwrap(), vec!["help me plan trips"]);
}

#[tokio::test]
async fn test_gateway_failure_is_recorded_as_error_text() {
    let mut session = ChatSession::new(AppConfig::default());
    let gateway = StubGateway::replying(Err(ProviderError::Http("operation timed out".into())));

    let turn = completed(session.submit_with(&gateway, "hello").await);
    assert!(turn.is_error());
    assert_eq!(turn.display_reply(), "Error: HTTP error: operation timed out");
    assert_eq!(
        session.transcript().last_reply(),
        Some("Error: HTTP error: operation timed out")
    );
    assert!(turn.history.contains("Assistant: Error: HTTP error: operation timed out"));
}

#[tokio::test]
async fn test_missing_credential_skips_gateway_and_transcript() {
    let mut session = ChatSession::new(AppConfig::default());
    let model = ModelId("gpt-4o".into());
    let before = session.formatted_history();

    for key in [None, Some("")] {
        let outcome = session.submit(key, &model, "hello").await;
        assert!(matches!(outcome, TurnOutcome::MissingCredential));
    }

    assert!(session.transcript().is_empty());
    assert_eq!(session.formatted_history(), before);
    assert_eq!(MISSING_CREDENTIAL_MESSAGE, "Please enter an API key");
}

#[tokio::test]
async fn test_only_latest_message_is_sent() {
    let mut session = ChatSession::new(AppConfig::default());
    let gateway = StubGateway::replying(Ok("ok".into()));

    session.submit_with(&gateway, "first").await;
    session.submit_with(&gateway, "second").await;

    assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
    assert_eq!(*gateway.seen.lock().unwrap(), vec!["first", "second"]);
    assert_eq!(session.transcript().len(), 4);
}

#[tokio::test]
async fn test_export_uses_configured_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let config = AppConfig {
        export_dir: Some(tmp.path().to_path_buf()),
        ..Default::default()
    };
    let mut session = ChatSession::new(config);
    let gateway = StubGateway::replying(Ok("hi there".into()));
    session.submit_with(&gateway, "hello").await;

    let path = session.export().unwrap();
    assert_eq!(path.parent(), Some(tmp.path()));
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, session.formatted_history());
}

#[test]
fn test_render_reply() {
    assert_eq!(render_reply(&Ok("plain".into())), "plain");
    let err = ProviderError::Api {
        status: 429,
        message: "quota".into(),
    };
    assert_eq!(render_reply(&Err(err)), "Error: API error (429): quota");
}

#[test]
fn test_sessions_have_distinct_ids() {
    let a = ChatSession::new(AppConfig::default());
    let b = ChatSession::new(AppConfig::default());
    assert_ne!(a.id(), b.id());
    assert!(a.transcript().is_empty());
}
