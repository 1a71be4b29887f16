use super::*;

// =============================================================================
// env_parse: unique env var names avoid races between parallel tests.
// =============================================================================

#[test]
fn env_parse_missing_returns_default() {
    let val: u16 = env_parse("__TEST_NIKIT_EP_MISSING_4411__", 42);
    assert_eq!(val, 42);
}

#[test]
fn env_parse_present_valid() {
    unsafe { std::env::set_var("__TEST_NIKIT_EP_VALID__", "99") };
    let val: u32 = env_parse("__TEST_NIKIT_EP_VALID__", 0);
    assert_eq!(val, 99);
    unsafe { std::env::remove_var("__TEST_NIKIT_EP_VALID__") };
}

#[test]
fn env_parse_trims_whitespace() {
    unsafe { std::env::set_var("__TEST_NIKIT_EP_WS__", "  8080 ") };
    let val: u16 = env_parse("__TEST_NIKIT_EP_WS__", 0);
    assert_eq!(val, 8080);
    unsafe { std::env::remove_var("__TEST_NIKIT_EP_WS__") };
}

#[test]
fn env_parse_invalid_returns_default() {
    unsafe { std::env::set_var("__TEST_NIKIT_EP_INVALID__", "three") };
    let val: i64 = env_parse("__TEST_NIKIT_EP_INVALID__", 3);
    assert_eq!(val, 3);
    unsafe { std::env::remove_var("__TEST_NIKIT_EP_INVALID__") };
}

// =============================================================================
// AppConfig::from_env: these share process-global variables, so all
// assertions live in one test.
// =============================================================================

#[test]
fn from_env_reads_required_and_optional_values() {
    unsafe {
        std::env::remove_var("DATABASE_URL");
    }
    assert!(matches!(AppConfig::from_env(), Err(ConfigError::Missing("DATABASE_URL"))));

    unsafe {
        std::env::set_var("DATABASE_URL", "postgres://localhost/nikit");
        std::env::remove_var("PORT");
        std::env::remove_var("DB_MAX_CONNECTIONS");
        std::env::set_var("VOTE_CONFIRM_THRESHOLD", "0");
        std::env::remove_var("KAKAO_API_KEY");
    }
    let config = AppConfig::from_env().unwrap();
    assert_eq!(config.database_url, "postgres://localhost/nikit");
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
    assert_eq!(config.vote_confirm_threshold, 1, "threshold is clamped to 1");
    assert!(config.kakao.is_none());

    unsafe {
        std::env::set_var("VOTE_CONFIRM_THRESHOLD", "4");
        std::env::set_var("KAKAO_API_KEY", "secret");
        std::env::remove_var("KAKAO_BASE_URL");
    }
    let config = AppConfig::from_env().unwrap();
    assert_eq!(config.vote_confirm_threshold, 4);
    let kakao = config.kakao.expect("kakao config should be present");
    assert_eq!(kakao.api_key, "secret");
    assert_eq!(kakao.base_url, DEFAULT_KAKAO_BASE_URL);

    unsafe {
        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("VOTE_CONFIRM_THRESHOLD");
        std::env::remove_var("KAKAO_API_KEY");
    }
}
