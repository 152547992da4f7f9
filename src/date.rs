//! The date codec.
//!
//! Timestamps travel in one of three textual dialects. The writer picks the dialect from the
//! settings; the reader never needs to be told, it recognises the dialect from the token shape.
//!
//! | Dialect | Token written |
//! |---|---|
//! | [`DateDialect::Iso`] | `"1970-01-01T00:00:00Z"` |
//! | [`DateDialect::EpochOffset`] | `"\/Date(0+0000)\/"` |
//! | [`DateDialect::ExpressionLiteral`] | `new Date(0)` (bare, unquoted) |
//!
//! Decoding is best effort and never fails: a token no strategy understands becomes
//! [`sentinel`], `0001-01-01T00:00:00Z`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::Reflect;

/// Seconds between `0001-01-01T00:00:00Z` and the Unix epoch.
const SENTINEL_UNIX_SECONDS: i64 = -62_135_596_800;

const EPOCH_PREFIXES: [&str; 2] = ["\\/Date(", "/Date("];
const EXPRESSION_PREFIX: &str = "new Date(";

/// Textual encodings of a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateDialect {
    /// `"yyyy-MM-ddTHH:mm:ssZ"`, normalized to UTC, seconds precision.
    #[default]
    Iso = 0,
    /// `"\/Date(<ms>±hhmm)\/"`, milliseconds since the Unix epoch plus the timestamp's offset.
    EpochOffset = 1,
    /// `new Date(<ms>)`, a bare script expression.
    ExpressionLiteral = 2,
}

/// The value every unparseable token decodes to.
pub fn sentinel() -> DateTime<Utc> {
    DateTime::from_timestamp(SENTINEL_UNIX_SECONDS, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Encodes `timestamp` as a complete JSON token in `dialect`.
///
/// `Iso` and `EpochOffset` tokens include their quotes; `ExpressionLiteral` is bare.
pub fn encode<Tz: TimeZone>(timestamp: &DateTime<Tz>, dialect: DateDialect) -> String {
    match dialect {
        DateDialect::Iso => timestamp
            .with_timezone(&Utc)
            .format("\"%Y-%m-%dT%H:%M:%SZ\"")
            .to_string(),
        DateDialect::EpochOffset => {
            let offset = timestamp.fixed_offset().offset().local_minus_utc();
            let sign = if offset < 0 { '-' } else { '+' };
            let minutes = offset.unsigned_abs() / 60;
            format!(
                "\"\\/Date({}{sign}{:02}{:02})\\/\"",
                timestamp.timestamp_millis(),
                minutes / 60,
                minutes % 60
            )
        }
        DateDialect::ExpressionLiteral => {
            format!("{EXPRESSION_PREFIX}{})", timestamp.timestamp_millis())
        }
    }
}

/// Decodes a token in any dialect, falling back to [`sentinel`].
pub fn decode(token: &str) -> DateTime<Utc> {
    try_decode(token).unwrap_or_else(|| {
        tracing::debug!(token, "unrecognised date token, using sentinel");
        sentinel()
    })
}

/// Decodes a token in any dialect.
///
/// Attempts, in order: epoch-offset prefix, ISO shape, the common platform formats
/// (RFC 3339, RFC 2822, `Y-m-d H:M:S`, `Y-m-d`), then the script expression form.
pub fn try_decode(token: &str) -> Option<DateTime<Utc>> {
    let token = token.trim().trim_matches('"');

    if let Some(rest) = EPOCH_PREFIXES.iter().find_map(|p| token.strip_prefix(p)) {
        return decode_epoch(rest);
    }

    if looks_like_iso(token) {
        if let Ok(naive) = NaiveDateTime::parse_from_str(token, "%Y-%m-%dT%H:%M:%S%.fZ") {
            return Some(naive.and_utc());
        }
    }

    decode_platform(token).or_else(|| decode_expression(token))
}

fn looks_like_iso(token: &str) -> bool {
    token.contains('T') && token.contains('Z') && token.contains(':')
}

/// `<ms>[±hhmm])...`: only the millisecond component matters.
fn decode_epoch(rest: &str) -> Option<DateTime<Utc>> {
    let digits_end = rest
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
        .map_or(rest.len(), |(i, _)| i);
    let millis = rest[..digits_end].parse::<i64>().ok()?;
    DateTime::from_timestamp_millis(millis)
}

fn decode_platform(token: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(token) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(token) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(token, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `new Date(<ms>)` or `new Date(y, m, d, h, mi, s[, ms])` with a zero-based month.
fn decode_expression(token: &str) -> Option<DateTime<Utc>> {
    let inner = token
        .strip_prefix(EXPRESSION_PREFIX)?
        .trim_end()
        .strip_suffix(')')?
        .trim();

    if !inner.contains(',') {
        return DateTime::from_timestamp_millis(inner.parse::<i64>().ok()?);
    }

    let parts = inner
        .split(',')
        .map(|p| p.trim().parse::<i64>().ok())
        .collect::<Option<Vec<_>>>()?;
    let part = |i: usize, default: i64| parts.get(i).copied().unwrap_or(default);

    let year = i32::try_from(part(0, 1970)).ok()?;
    let month = u32::try_from(part(1, 0) + 1).ok()?;
    let day = u32::try_from(part(2, 1)).ok()?;
    let hour = u32::try_from(part(3, 0)).ok()?;
    let minute = u32::try_from(part(4, 0)).ok()?;
    let second = u32::try_from(part(5, 0)).ok()?;
    let millis = u32::try_from(part(6, 0)).ok()?;

    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_milli_opt(hour, minute, second, millis)
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).single().expect("valid date")
    }

    #[test]
    fn iso_is_utc_with_seconds_precision() {
        let east = FixedOffset::east_opt(2 * 3600).expect("offset");
        let ts = east.with_ymd_and_hms(2021, 3, 4, 7, 8, 9).single().expect("valid");
        assert_eq!(encode(&ts, DateDialect::Iso), "\"2021-03-04T05:08:09Z\"");
    }

    #[test]
    fn epoch_offset_carries_signed_offset() {
        let west = FixedOffset::west_opt(5 * 3600 + 30 * 60).expect("offset");
        let ts = utc(1970, 1, 1, 0, 0, 1).with_timezone(&west);
        assert_eq!(
            encode(&ts, DateDialect::EpochOffset),
            "\"\\/Date(1000-0530)\\/\""
        );
    }

    #[test]
    fn decode_recognises_every_dialect() {
        let ts = utc(2020, 1, 2, 3, 4, 5);
        for dialect in [
            DateDialect::Iso,
            DateDialect::EpochOffset,
            DateDialect::ExpressionLiteral,
        ] {
            assert_eq!(decode(&encode(&ts, dialect)), ts, "{dialect:?}");
        }
    }

    #[test]
    fn decode_unescaped_epoch_and_exploded_expression() {
        assert_eq!(decode("/Date(-1000+0100)/"), utc(1969, 12, 31, 23, 59, 59));
        assert_eq!(
            decode("new Date(2020, 0, 31, 12, 30, 15)"),
            utc(2020, 1, 31, 12, 30, 15)
        );
    }

    #[test]
    fn decode_platform_formats() {
        assert_eq!(decode("2020-05-06"), utc(2020, 5, 6, 0, 0, 0));
        assert_eq!(decode("2020-05-06 07:08:09"), utc(2020, 5, 6, 7, 8, 9));
        assert_eq!(
            decode("2020-05-06T07:08:09+02:00"),
            utc(2020, 5, 6, 5, 8, 9)
        );
    }

    #[test]
    fn garbage_becomes_sentinel() {
        assert_eq!(decode("not a date"), sentinel());
        assert_eq!(decode("new Date(abc)"), sentinel());
        assert_eq!(sentinel().format("%Y-%m-%dT%H:%M:%S").to_string(), "0001-01-01T00:00:00");
    }
}
