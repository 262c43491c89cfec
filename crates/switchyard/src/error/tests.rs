//! Unit tests for dispatch error types.

use rstest::rstest;

use super::*;

#[test]
fn conversion_message_includes_value_and_kind() {
    let error = DispatchError::conversion(ParamKind::Date, "not-a-date", "input is out of range");
    let message = error.to_string();
    assert!(
        message.contains("not-a-date"),
        "expected raw value in message: {message}"
    );
    assert!(message.contains("date"), "expected kind in message: {message}");
}

#[test]
fn invocation_message_includes_method() {
    let error = DispatchError::invocation("greet", "boom");
    let message = error.to_string();
    assert!(message.contains("greet"), "expected method in message: {message}");
    assert!(message.contains("boom"), "expected cause in message: {message}");
}

#[test]
fn invalid_pattern_keeps_regex_source() {
    let source = regex::Regex::new("(").expect_err("unbalanced group");
    let error = DispatchError::invalid_pattern("/?($", source);
    assert!(std::error::Error::source(&error).is_some());
}

#[rstest]
#[case::invalid_argument(DispatchError::invalid_argument("path is required"), 2, true)]
#[case::conflict(DispatchError::route_conflict("greet/(int)", "greet"), 2, true)]
#[case::unsupported(DispatchError::unsupported_dispatch("/?x$"), 2, false)]
#[case::conversion(DispatchError::conversion(ParamKind::Int, "x", "invalid digit"), 1, false)]
#[case::invocation(DispatchError::invocation("greet", "boom"), 1, false)]
fn exit_status_separates_configuration_from_dispatch(
    #[case] error: DispatchError,
    #[case] status: i32,
    #[case] registration: bool,
) {
    assert_eq!(error.exit_status(), status);
    assert_eq!(error.is_registration_error(), registration);
}

#[test]
fn dispatch_error_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DispatchError>();
}
