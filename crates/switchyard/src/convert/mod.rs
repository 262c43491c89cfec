//! Conversion of captured path segments into typed arguments.
//!
//! Numeric kinds treat a missing or empty segment as zero, booleans treat it
//! as `false` and characters as NUL. Callers therefore cannot tell an omitted
//! numeric argument from a literal zero. Dates, enums and numbers that are
//! present but malformed fail with [`DispatchError::ConversionFailed`].

mod date;

use std::fmt::Display;
use std::str::FromStr;

use crate::context::{Context, REQUEST_KEY, RESPONSE_KEY};
use crate::error::DispatchError;
use crate::method::ParamKind;
use crate::value::Value;

/// Converts one raw segment to the value expected by `kind`.
///
/// # Errors
///
/// Returns [`DispatchError::ConversionFailed`] for malformed numbers, dates
/// and unknown enum constants.
///
/// # Example
///
/// ```
/// use switchyard::{ParamKind, Value, convert::convert};
///
/// assert_eq!(convert(ParamKind::Int, Some("42")).unwrap(), Value::Int(42));
/// assert_eq!(convert(ParamKind::Int, None).unwrap(), Value::Int(0));
/// assert_eq!(convert(ParamKind::Boolean, Some("TRUE")).unwrap(), Value::Bool(true));
/// ```
pub fn convert(kind: ParamKind, raw: Option<&str>) -> Result<Value, DispatchError> {
    let value = match kind {
        ParamKind::Int => Value::Int(number(kind, raw)?),
        ParamKind::Long => Value::Long(number(kind, raw)?),
        ParamKind::Short => Value::Short(number(kind, raw)?),
        ParamKind::Byte => Value::Byte(number(kind, raw)?),
        ParamKind::Float => Value::Float(number(kind, raw)?),
        ParamKind::Double => Value::Double(number(kind, raw)?),
        ParamKind::Boolean => Value::Bool(raw.is_some_and(|text| text.eq_ignore_ascii_case("true"))),
        ParamKind::Char => Value::Char(raw.and_then(|text| text.chars().next()).unwrap_or('\0')),
        ParamKind::Date => match raw {
            Some(text) => Value::Date(
                date::parse(text).map_err(|message| DispatchError::conversion(kind, text, message))?,
            ),
            None => Value::Absent,
        },
        ParamKind::Enum(spec) => match raw {
            Some(text) => Value::Enum(spec.constant(text).ok_or_else(|| {
                DispatchError::conversion(
                    kind,
                    text,
                    format!("no constant of {} has this name", spec.name()),
                )
            })?),
            None => Value::Absent,
        },
        ParamKind::Text | ParamKind::Request | ParamKind::Response => {
            raw.map_or(Value::Absent, |text| Value::Text(text.to_owned()))
        }
    };
    Ok(value)
}

/// Converts positional raw arguments for a method declaring `kinds`.
///
/// Positions beyond `raw` are treated as absent; extra raw values are
/// ignored. Request and response parameters take the matching context
/// attribute instead of the converted segment whenever one is present.
///
/// # Errors
///
/// Returns the first conversion failure.
pub fn convert_arguments(
    kinds: &[ParamKind],
    raw: &[Option<String>],
    context: Option<&dyn Context>,
) -> Result<Vec<Value>, DispatchError> {
    kinds
        .iter()
        .enumerate()
        .map(|(position, kind)| {
            let segment = raw.get(position).and_then(Option::as_deref);
            if let Some(object) = contextual(*kind, context) {
                return Ok(Value::Object(object));
            }
            convert(*kind, segment)
        })
        .collect()
}

fn contextual(kind: ParamKind, context: Option<&dyn Context>) -> Option<crate::context::Attribute> {
    let key = match kind {
        ParamKind::Request => REQUEST_KEY,
        ParamKind::Response => RESPONSE_KEY,
        _ => return None,
    };
    context?.attribute(key)
}

fn number<T>(kind: ParamKind, raw: Option<&str>) -> Result<T, DispatchError>
where
    T: FromStr + Default,
    T::Err: Display,
{
    match raw {
        None | Some("") => Ok(T::default()),
        Some(text) => text
            .parse()
            .map_err(|error: T::Err| DispatchError::conversion(kind, text, error.to_string())),
    }
}
