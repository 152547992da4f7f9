//! Culture-invariant conversion of string tokens into typed values.
//!
//! This is the single path every literal goes through on its way into a typed member: bare
//! tokens (`42`, `true`, `new Date(0)`) directly, quoted tokens after unescaping. Parsing never
//! consults the host locale: numbers always use `.` as the decimal separator.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::date;
use crate::error::{JsonError, Result};

/// Types that can be built from a single string token.
pub trait FromToken: Sized {
    /// Converts `token` into `Self`.
    fn from_token(token: &str) -> Result<Self>;
}

/// Converts a string token into `T`.
///
/// ```rust
/// use wirejson::convert::convert;
///
/// assert_eq!(convert::<f64>("2.5")?, 2.5);
/// assert_eq!(convert::<bool>("True")?, true);
/// assert_eq!(convert::<String>("as-is")?, "as-is");
/// assert!(convert::<u8>("256").is_err());
/// # Ok::<(), wirejson::JsonError>(())
/// ```
pub fn convert<T: FromToken>(token: &str) -> Result<T> {
    T::from_token(token)
}

macro_rules! impl_parse_token {
    ($($t:ty),*) => {
        $(
            impl FromToken for $t {
                fn from_token(token: &str) -> Result<Self> {
                    token
                        .trim()
                        .parse::<$t>()
                        .map_err(|_| JsonError::conversion::<$t>(token))
                }
            }
        )*
    }
}

impl_parse_token!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64
);

impl FromToken for bool {
    fn from_token(token: &str) -> Result<Self> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if token.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(JsonError::conversion::<bool>(token))
        }
    }
}

impl FromToken for char {
    fn from_token(token: &str) -> Result<Self> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(JsonError::conversion::<char>(token)),
        }
    }
}

/// Text needs no conversion.
impl FromToken for String {
    fn from_token(token: &str) -> Result<Self> {
        Ok(token.to_string())
    }
}

impl FromToken for Uuid {
    fn from_token(token: &str) -> Result<Self> {
        Uuid::parse_str(token.trim()).map_err(|_| JsonError::conversion::<Uuid>(token))
    }
}

// Dates never fail: see `date::decode`.

impl FromToken for DateTime<Utc> {
    fn from_token(token: &str) -> Result<Self> {
        Ok(date::decode(token))
    }
}

impl FromToken for DateTime<FixedOffset> {
    fn from_token(token: &str) -> Result<Self> {
        Ok(date::decode(token).fixed_offset())
    }
}

impl FromToken for DateTime<Local> {
    fn from_token(token: &str) -> Result<Self> {
        Ok(date::decode(token).with_timezone(&Local))
    }
}

impl FromToken for NaiveDateTime {
    fn from_token(token: &str) -> Result<Self> {
        Ok(date::decode(token).naive_utc())
    }
}
