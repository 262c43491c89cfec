//! Unit tests for route pattern synthesis.

use rstest::rstest;

use super::*;
use crate::method::EnumSpec;

const COLOUR: EnumSpec = EnumSpec::new("Colour", &["Red", "Green"]);

#[rstest]
#[case::int(ParamKind::Int, r"-?\d+")]
#[case::long(ParamKind::Long, r"-?\d+")]
#[case::short(ParamKind::Short, r"-?\d+")]
#[case::float(ParamKind::Float, r"-?\d+(\.\d+)?")]
#[case::double(ParamKind::Double, r"-?\d+(\.\d+)?")]
#[case::byte(ParamKind::Byte, r"\d+")]
#[case::boolean(ParamKind::Boolean, "true|false")]
#[case::char(ParamKind::Char, ".{1}")]
#[case::date(ParamKind::Date, ".*")]
#[case::enumeration(ParamKind::Enum(COLOUR), ".*")]
#[case::text(ParamKind::Text, ".*")]
#[case::request(ParamKind::Request, ".*")]
fn alternative_matches_kind_table(#[case] kind: ParamKind, #[case] expected: &str) {
    assert_eq!(alternative(kind), expected);
}

#[test]
fn parameterless_pattern_has_no_trailing_group() {
    assert_eq!(pattern_text("status", &[]), "/?status$");
}

#[test]
fn groups_are_joined_by_slashes() {
    let text = pattern_text("say", &[ParamKind::Text, ParamKind::Char, ParamKind::Byte]);
    assert_eq!(text, r"/?say/(.*)/(.{1})/(\d+)$");
}

#[test]
fn invalid_prefix_fails_at_compile_time() {
    let err = compile("broken(", &[]).expect_err("unbalanced group should fail");
    assert!(matches!(err, DispatchError::InvalidPattern { .. }));
    assert!(err.to_string().contains("broken("));
}

#[rstest]
#[case::bare("greet/42")]
#[case::leading_slash("/greet/42")]
#[case::negative("greet/-7")]
fn int_pattern_accepts_signed_digits(#[case] path: &str) {
    let pattern = compile("greet", &[ParamKind::Int]).expect("compile");
    assert!(pattern.is_match(path), "{path} should match {pattern}");
}

#[test]
fn pattern_matches_after_a_leading_segment() {
    let pattern = compile("greet", &[ParamKind::Int]).expect("compile");
    let captured = pattern.captures("app/greet/42").expect("match");
    assert_eq!(captured, vec![Some("42".to_owned())]);
}

#[rstest]
#[case::letters("greet/abc")]
#[case::trailing_text("greet/42x")]
#[case::other_prefix("hello/42")]
fn int_pattern_rejects_non_numeric(#[case] path: &str) {
    let pattern = compile("greet", &[ParamKind::Int]).expect("compile");
    assert!(pattern.captures(path).is_none(), "{path} should not match");
}

#[test]
fn float_fraction_group_does_not_shift_arguments() {
    let pattern = compile("add", &[ParamKind::Double, ParamKind::Int]).expect("compile");
    let captured = pattern.captures("add/1.5/3").expect("match");
    assert_eq!(captured, vec![Some("1.5".to_owned()), Some("3".to_owned())]);
}

#[test]
fn prefix_groups_are_not_bound_as_arguments() {
    let pattern = compile("(v1|v2)/items", &[ParamKind::Int]).expect("compile");
    let captured = pattern.captures("v2/items/9").expect("match");
    assert_eq!(captured, vec![Some("9".to_owned())]);
}

#[test]
fn empty_text_capture_is_kept() {
    let pattern = compile("echo", &[ParamKind::Text]).expect("compile");
    let captured = pattern.captures("echo/").expect("match");
    assert_eq!(captured, vec![Some(String::new())]);
}

#[test]
fn compiled_pattern_remembers_its_route() {
    let pattern = compile("greet", &[ParamKind::Text, ParamKind::Int]).expect("compile");
    assert_eq!(pattern.prefix(), "greet");
    assert_eq!(pattern.kinds(), &[ParamKind::Text, ParamKind::Int]);
    assert_eq!(pattern.as_str(), r"/?greet/(.*)/(-?\d+)$");
}
