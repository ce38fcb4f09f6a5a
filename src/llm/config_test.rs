use super::*;

// ===== coercion helpers =====

#[test]
fn max_attempts_defaults_when_missing() {
    assert_eq!(parse_max_attempts(None), DEFAULT_MAX_ATTEMPTS);
}

#[test]
fn max_attempts_coerces_non_numeric() {
    assert_eq!(parse_max_attempts(Some("two")), DEFAULT_MAX_ATTEMPTS);
    assert_eq!(parse_max_attempts(Some("")), DEFAULT_MAX_ATTEMPTS);
    assert_eq!(parse_max_attempts(Some("-1")), DEFAULT_MAX_ATTEMPTS);
}

#[test]
fn max_attempts_coerces_zero() {
    assert_eq!(parse_max_attempts(Some("0")), DEFAULT_MAX_ATTEMPTS);
}

#[test]
fn max_attempts_accepts_valid_values() {
    assert_eq!(parse_max_attempts(Some("1")), 1);
    assert_eq!(parse_max_attempts(Some(" 5 ")), 5);
}

#[test]
fn model_list_splits_trims_and_drops_empties() {
    assert_eq!(
        parse_model_list(" a/one , ,b/two,, c/three "),
        vec!["a/one".to_string(), "b/two".to_string(), "c/three".to_string()]
    );
}

#[test]
fn model_list_empty_input_yields_empty_list() {
    assert!(parse_model_list("").is_empty());
    assert!(parse_model_list(" , ,").is_empty());
}

// ===== from_env =====

/// Serializes the tests that mutate process environment variables.
static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

unsafe fn clear_ai_env() {
    unsafe {
        std::env::remove_var("OPENROUTER_API_KEY");
        std::env::remove_var("OPENROUTER_BASE_URL");
        std::env::remove_var("AI_RETRIES");
        std::env::remove_var("AI_RETRY_BACKOFF_MS");
        std::env::remove_var("AI_MODEL_LIST");
        std::env::remove_var("AI_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("AI_CONNECT_TIMEOUT_SECS");
    }
}

#[test]
fn from_env_missing_api_key_errors() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { clear_ai_env() };

    let err = AiConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("OPENROUTER_API_KEY"));
}

#[test]
fn from_env_applies_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_ai_env();
        std::env::set_var("OPENROUTER_API_KEY", "sk-test");
    }

    let cfg = AiConfig::from_env().unwrap();
    assert_eq!(cfg.api_key, "sk-test");
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert_eq!(cfg.max_attempts, DEFAULT_MAX_ATTEMPTS);
    assert_eq!(cfg.backoff, Duration::from_millis(DEFAULT_BACKOFF_MS));
    assert!(cfg.models.is_empty());
    assert_eq!(
        cfg.timeouts,
        GatewayTimeouts {
            request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    );

    unsafe { clear_ai_env() };
}

#[test]
fn from_env_parses_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_ai_env();
        std::env::set_var("OPENROUTER_API_KEY", "sk-test");
        std::env::set_var("OPENROUTER_BASE_URL", "https://example.test/v1/");
        std::env::set_var("AI_RETRIES", "4");
        std::env::set_var("AI_RETRY_BACKOFF_MS", "250");
        std::env::set_var("AI_MODEL_LIST", "primary/model, backup/model");
        std::env::set_var("AI_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("AI_CONNECT_TIMEOUT_SECS", "7");
    }

    let cfg = AiConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, "https://example.test/v1");
    assert_eq!(cfg.max_attempts, 4);
    assert_eq!(cfg.backoff, Duration::from_millis(250));
    assert_eq!(cfg.models, vec!["primary/model".to_string(), "backup/model".to_string()]);
    assert_eq!(cfg.timeouts, GatewayTimeouts { request_secs: 42, connect_secs: 7 });

    unsafe { clear_ai_env() };
}

#[test]
fn from_env_coerces_invalid_retries() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_ai_env();
        std::env::set_var("OPENROUTER_API_KEY", "sk-test");
        std::env::set_var("AI_RETRIES", "lots");
    }

    let cfg = AiConfig::from_env().unwrap();
    assert_eq!(cfg.max_attempts, DEFAULT_MAX_ATTEMPTS);

    unsafe { clear_ai_env() };
}
