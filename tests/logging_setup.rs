// tests/logging_setup.rs

use rundag::logging::init_logging;
use rundag::types::LogLevel;

#[test]
fn test_second_global_subscriber_is_an_error() {
    assert!(init_logging(Some(LogLevel::Warn)).is_ok());

    let err = init_logging(None).unwrap_err();
    assert!(err.to_string().contains("failed to install tracing subscriber"));
}
