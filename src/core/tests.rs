use super::config::*;
use super::error::*;
use super::model::*;
use super::persona::*;
use super::transcript::*;
use chrono::{Local, NaiveDateTime, TimeZone};

fn assert_timestamp(ts: &str) {
    assert_eq!(ts.len(), 19, "unexpected timestamp {ts}");
    assert!(
        NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").is_ok(),
        "unexpected timestamp {ts}"
    );
}

#[test]
fn test_empty_transcript_renders_header_only() {
    let transcript = Transcript::new();
    assert!(transcript.is_empty());
    assert_eq!(transcript.formatted_history(), "Chat History\n\n");
    assert!(transcript.last_reply().is_none());
}

#[test]
fn test_user_then_assistant_scenario() {
    let mut transcript = Transcript::new();
    transcript.add_message(Role::User, "hello");
    transcript.add_message(Role::Assistant, "hi there");

    let history = transcript.formatted_history();
    let mut lines = history.lines();
    assert_eq!(lines.next(), Some(HISTORY_HEADER));
    assert_eq!(lines.next(), Some(""));

    let first = lines.next().unwrap();
    assert_eq!(lines.next(), Some(""));
    let second = lines.next().unwrap();
    assert_eq!(lines.next(), Some(""));
    assert_eq!(lines.next(), None);

    assert!(first.starts_with('['));
    assert!(first.ends_with("] User: hello"));
    assert_timestamp(&first[1..20]);
    assert!(second.ends_with("] Assistant: hi there"));
    assert_timestamp(&second[1..20]);

    let entry = &transcript.entries()[0];
    assert_eq!(
        history,
        format!(
            "Chat History\n\n[{}] User: hello\n\n[{}] Assistant: hi there\n\n",
            entry.timestamp(),
            transcript.entries()[1].timestamp()
        )
    );
}

#[test]
fn test_history_preserves_order_and_counts() {
    let mut transcript = Transcript::new();
    for i in 0..25 {
        let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
        transcript.add_message(role, format!("message #{i:02}"));
    }
    assert_eq!(transcript.len(), 25);

    let history = transcript.formatted_history();
    let mut last_pos = 0;
    for i in 0..25 {
        let needle = format!(": message #{i:02}\n");
        assert_eq!(history.matches(&needle).count(), 1, "{needle} not exactly once");
        let pos = history.find(&needle).unwrap();
        assert!(pos > last_pos || i == 0);
        last_pos = pos;
    }
}

#[test]
fn test_history_is_idempotent() {
    let mut transcript = Transcript::new();
    transcript.add_message(Role::User, "");
    transcript.add_message(Role::Assistant, "multi\nline\nreply");

    let first = transcript.formatted_history();
    let second = transcript.formatted_history();
    assert_eq!(first, second);
    assert_eq!(transcript.len(), 2);
    assert!(first.contains("] User: \n\n"));
}

#[test]
fn test_last_reply_tracks_assistant_entries() {
    let mut transcript = Transcript::new();
    transcript.add_message(Role::Assistant, "one");
    transcript.add_message(Role::User, "question");
    assert_eq!(transcript.last_reply(), Some("one"));
    transcript.add_message(Role::Assistant, "two");
    assert_eq!(transcript.last_reply(), Some("two"));
}

#[test]
fn test_role_labels() {
    assert_eq!(Role::User.to_string(), "User");
    assert_eq!(Role::Assistant.to_string(), "Assistant");
}

#[test]
fn test_export_filename_format() {
    let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
    assert_eq!(export_filename(at), "chat_history_20240309_070501.txt");
}

#[test]
fn test_save_writes_formatted_history_utf8() {
    let tmp = tempfile::tempdir().unwrap();
    let mut transcript = Transcript::new();
    transcript.add_message(Role::User, "你好, prompt for a café ☕");
    transcript.add_message(Role::Assistant, "Bonjour");

    let expected = transcript.formatted_history();
    let path = transcript.save_in(tmp.path()).unwrap();

    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("chat_history_"));
    assert!(name.ends_with(".txt"));
    assert_eq!(name.len(), "chat_history_YYYYMMDD_HHMMSS.txt".len());

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes, expected.as_bytes());
}

#[test]
fn test_same_second_exports_may_collide() {
    let tmp = tempfile::tempdir().unwrap();
    let mut transcript = Transcript::new();
    transcript.add_message(Role::User, "first");
    let first_path = transcript.save_in(tmp.path()).unwrap();

    transcript.add_message(Role::Assistant, "second");
    let second_path = transcript.save_in(tmp.path()).unwrap();

    let second_content = std::fs::read_to_string(&second_path).unwrap();
    assert_eq!(second_content, transcript.formatted_history());
    if first_path == second_path {
        // Same second: the later export replaced the earlier one.
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    } else {
        assert!(std::fs::read_to_string(&first_path)
            .unwrap()
            .contains("User: first"));
    }
}

#[test]
fn test_save_into_missing_dir_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("does-not-exist");
    let mut transcript = Transcript::new();
    transcript.add_message(Role::User, "hello");

    let err = transcript.save_in(&missing).unwrap_err();
    let ExportError::Io { path, .. } = &err;
    assert!(path.starts_with(&missing));
    assert!(err.to_string().starts_with("failed to write"));
}

#[test]
fn test_model_catalog() {
    assert_eq!(MODELS.len(), 6);
    assert_eq!(default_model().id, "gpt-3.5-turbo");
    assert_eq!(MODELS[5].id, "claude-3-5-sonnet-20241022");
    assert_eq!(MODELS[5].vendor, ModelVendor::Anthropic);

    assert_eq!(resolve_choice("2").map(|m| m.id), Some("gpt-4o"));
    assert_eq!(resolve_choice(" o1-mini ").map(|m| m.id), Some("o1-mini"));
    assert!(resolve_choice("0").is_none());
    assert!(resolve_choice("7").is_none());
    assert!(resolve_choice("gpt-5").is_none());

    assert_eq!(position(&ModelId("o1-preview".into())), 4);
    assert_eq!(position(&ModelId("unknown".into())), 0);
    assert!(get_model(&ModelId("gpt-4-turbo".into())).is_some());
}

#[test]
fn test_persona_instruction() {
    let text = Persona::General.instruction();
    assert!(text.contains("named \"Creator\""));
    assert!(text.contains("## Workflows"));
    assert_eq!(Persona::default(), Persona::General);
}

#[test]
fn test_config_defaults() {
    let config = AppConfig::default();
    assert!(config.api_key.is_none());
    assert_eq!(config.base_url, "https://open.api.gu28.top/v1");
    assert_eq!(config.default_model.0, "gpt-3.5-turbo");
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.retry_delay_secs, 5);
    assert!(config.export_dir.is_none());
    assert!(!config.debug);
}

#[test]
fn test_config_has_api_key() {
    let mut config = AppConfig::default();
    assert!(!config.has_api_key());

    config.api_key = Some("test-key".into());
    assert!(config.has_api_key());

    config.api_key = Some("".into());
    assert!(!config.has_api_key());
    assert!(config.get_api_key().is_none());
}

#[test]
fn test_config_file_fields_default() {
    let config: AppConfig =
        serde_json::from_str(r#"{"base_url":"http://localhost:8080/v1","max_retries":0}"#).unwrap();
    assert_eq!(config.base_url, "http://localhost:8080/v1");
    assert_eq!(config.max_retries, 0);
    assert_eq!(config.retry_delay_secs, 5);
    assert_eq!(config.default_model.0, "gpt-3.5-turbo");
}

#[test]
fn test_load_config_reads_local_file() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join("prompt-creator.json"),
        r#"{"base_url":"http://127.0.0.1:9/v1","default_model":"gpt-4o","retry_delay_secs":1}"#,
    )
    .unwrap();

    let config = load_config(Some(tmp.path().to_path_buf())).unwrap();
    assert_eq!(config.base_url, "http://127.0.0.1:9/v1");
    assert_eq!(config.default_model.0, "gpt-4o");
    assert_eq!(config.retry_delay_secs, 1);
}

#[test]
fn test_load_config_rejects_invalid_json() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("prompt-creator.json"), "{ not json").unwrap();

    let err = load_config(Some(tmp.path().to_path_buf())).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_mask_key() {
    assert_eq!(mask_key("sk-1234567890abcd"), "sk-1...abcd");
    assert_eq!(mask_key("short"), "****");
}

#[test]
fn test_app_error_wraps_component_errors() {
    let err: AppError = ConfigError::Invalid("prompt-creator.json: expected value".into()).into();
    assert!(matches!(err, AppError::Config(_)));
    assert_eq!(
        err.to_string(),
        "Config error: Invalid configuration: prompt-creator.json: expected value"
    );

    let err: AppError = ProviderError::Api {
        status: 401,
        message: "bad key".into(),
    }
    .into();
    assert_eq!(err.to_string(), "Provider error: API error (401): bad key");
}

#[test]
fn test_throttling_error_becomes_api_error_when_final() {
    let throttled = ProviderError::RateLimited {
        status: 503,
        message: "upstream model overloaded".into(),
        retry_after_ms: Some(5_000),
    };
    assert!(throttled.is_retryable());
    assert_eq!(
        throttled.into_final(),
        ProviderError::Api {
            status: 503,
            message: "upstream model overloaded".into(),
        }
    );

    let transport = ProviderError::Http("connection reset".into());
    assert_eq!(transport.clone().into_final(), transport);
}
