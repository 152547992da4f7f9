// src/rt.rs

//! Runtime utilities for generated code (Macros).
//! Do not use directly.

pub use crate::convert::FromToken;
pub use crate::error::{JsonError, Result};
pub use crate::inspector::{Getter, MemberSchema, Object, Setter};
pub use crate::reader::{FromJson, Incoming, Literal, Parser};
pub use crate::reflect::{Reflect, Tag, ValueRef, Visit};

/// Wraps an accessor setter so its closure is checked against [`Setter`].
pub fn setter<T>(set: Setter<T>) -> Option<Setter<T>> {
    Some(set)
}

/// Resolves an enum token to a declared ordinal.
///
/// The token may be the ordinal itself or a variant name; names match exactly first and then
/// ignoring ASCII case.
pub fn enum_ordinal(token: &str, variants: &[(&str, i64)]) -> Option<i64> {
    let token = token.trim();
    if let Ok(ordinal) = token.parse::<i64>() {
        return variants
            .iter()
            .any(|&(_, v)| v == ordinal)
            .then_some(ordinal);
    }
    variants
        .iter()
        .find(|(name, _)| *name == token)
        .or_else(|| variants.iter().find(|(name, _)| name.eq_ignore_ascii_case(token)))
        .map(|&(_, ordinal)| ordinal)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARIANTS: [(&str, i64); 3] = [("Low", 0), ("High", 5), ("HIGH", 7)];

    #[test]
    fn ordinal_by_number_or_name() {
        assert_eq!(enum_ordinal("5", &VARIANTS), Some(5));
        assert_eq!(enum_ordinal(" Low ", &VARIANTS), Some(0));
        assert_eq!(enum_ordinal("HIGH", &VARIANTS), Some(7));
        assert_eq!(enum_ordinal("high", &VARIANTS), Some(5));
        assert_eq!(enum_ordinal("3", &VARIANTS), None);
        assert_eq!(enum_ordinal("Medium", &VARIANTS), None);
    }
}
