//! Timestamp parsing for date parameters.
//!
//! Two layouts are accepted: `yyyy-MM-dd HH:mm:ss`, read as UTC, and the
//! same followed by a space and a zone (`UTC`, `GMT+08:00`, `-0500`, `PST`).
//! The layout is chosen by length alone, so a short value with a trailing
//! zone of a single letter still takes the zoned path.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

const LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Length of the zoned layout descriptor `yyyy-MM-dd HH:mm:ss z`.
pub(crate) const ZONED_LAYOUT_LEN: usize = "yyyy-MM-dd HH:mm:ss z".len();

const HOUR: i32 = 3600;

const ZONE_ABBREVIATIONS: &[(&str, i32)] = &[
    ("EST", -5 * HOUR),
    ("EDT", -4 * HOUR),
    ("CST", -6 * HOUR),
    ("CDT", -5 * HOUR),
    ("MST", -7 * HOUR),
    ("MDT", -6 * HOUR),
    ("PST", -8 * HOUR),
    ("PDT", -7 * HOUR),
    ("BST", HOUR),
    ("CET", HOUR),
    ("CEST", 2 * HOUR),
    ("EET", 2 * HOUR),
    ("EEST", 3 * HOUR),
    ("IST", 5 * HOUR + 1800),
    ("HKT", 8 * HOUR),
    ("SGT", 8 * HOUR),
    ("JST", 9 * HOUR),
    ("AEST", 10 * HOUR),
    ("AEDT", 11 * HOUR),
];

/// Parses `raw` with the layout its length selects.
pub(crate) fn parse(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    if raw.chars().count() < ZONED_LAYOUT_LEN {
        let naive = parse_local(raw)?;
        return Ok(DateTime::<FixedOffset>::from(Utc.from_utc_datetime(&naive)));
    }

    let (stamp, zone) = raw
        .rsplit_once(' ')
        .ok_or_else(|| format!("expected a time zone after '{raw}'"))?;
    let naive = parse_local(stamp)?;
    let offset = zone_offset(zone)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| format!("ambiguous local time '{stamp}'"))
}

fn parse_local(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw, LOCAL_FORMAT).map_err(|error| error.to_string())
}

fn zone_offset(zone: &str) -> Result<FixedOffset, String> {
    let seconds = match zone {
        "UTC" | "GMT" | "UT" | "Z" => 0,
        _ => {
            if let Some(rest) = zone.strip_prefix("GMT").or_else(|| zone.strip_prefix("UTC")) {
                numeric_offset(rest)?
            } else if zone.starts_with(['+', '-']) {
                numeric_offset(zone)?
            } else {
                ZONE_ABBREVIATIONS
                    .iter()
                    .find(|(name, _)| *name == zone)
                    .map(|(_, seconds)| *seconds)
                    .ok_or_else(|| format!("unknown time zone '{zone}'"))?
            }
        }
    };
    FixedOffset::east_opt(seconds).ok_or_else(|| format!("time zone '{zone}' is out of range"))
}

/// Parses `+hh`, `+hhmm` or `+hh:mm` (and the `-` forms) into seconds.
fn numeric_offset(text: &str) -> Result<i32, String> {
    let invalid = || format!("invalid zone offset '{text}'");
    let (sign, digits) = match text.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = match digits.split_once(':') {
        Some((hours, minutes)) => (hours, minutes),
        None if digits.len() > 2 => digits.split_at_checked(digits.len() - 2).ok_or_else(invalid)?,
        None => (digits, "0"),
    };
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..=18).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(invalid());
    }
    Ok(sign * (hours * HOUR + minutes * 60))
}
