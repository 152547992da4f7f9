//! Serializer configuration.
//!
//! [`JsonSettings`] is a small `Copy` value threaded into every writer and parser. It is fixed
//! when the [`Json`](crate::Json) facade is built and never mutated afterwards.
//!
//! Settings can be assembled in code through [`Json::builder`](crate::Json::builder) or loaded
//! from a JSON file, parsed by the engine itself:
//!
//! ```rust
//! use wirejson::settings::{JsonSettings, MemberPolicy};
//! use wirejson::DateDialect;
//!
//! let settings: JsonSettings = wirejson::from_str(
//!     r#"{"date_dialect": "EpochOffset", "pretty": true, "members": 1}"#,
//! )?;
//! assert_eq!(settings.date_dialect, DateDialect::EpochOffset);
//! assert_eq!(settings.members, MemberPolicy::FieldsOnly);
//! assert_eq!(settings.max_depth, JsonSettings::DEFAULT_MAX_DEPTH);
//! # Ok::<(), wirejson::JsonError>(())
//! ```

use std::path::Path;

use crate::date::DateDialect;
use crate::error::Result;
use crate::inspector::MemberKind;
use crate::Reflect;

/// Which kinds of members take part in (de)serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemberPolicy {
    /// Fields and accessors.
    #[default]
    All = 0,
    /// Struct fields only.
    FieldsOnly = 1,
    /// Declared accessors only.
    AccessorsOnly = 2,
}

impl MemberPolicy {
    /// Returns true if members of `kind` are admitted.
    pub fn admits(self, kind: MemberKind) -> bool {
        match self {
            Self::All => true,
            Self::FieldsOnly => kind == MemberKind::Field,
            Self::AccessorsOnly => kind == MemberKind::Accessor,
        }
    }
}

/// Immutable configuration of a [`Json`](crate::Json) facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct JsonSettings {
    /// Dialect used when writing timestamps. Reading auto-detects the dialect.
    pub date_dialect: DateDialect,
    /// Emit a line break after every field and element.
    pub pretty: bool,
    /// Member kinds admitted when writing and reading composites.
    pub members: MemberPolicy,
    /// Maximum nesting depth of objects and arrays, for both reading and writing.
    pub max_depth: usize,
}

impl JsonSettings {
    /// Default nesting limit.
    pub const DEFAULT_MAX_DEPTH: usize = 128;

    /// Loads settings from a JSON file. Missing keys keep their defaults; unknown keys are
    /// ignored.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        crate::Json::new().load(path)
    }
}

impl Default for JsonSettings {
    fn default() -> Self {
        Self {
            date_dialect: DateDialect::Iso,
            pretty: false,
            members: MemberPolicy::All,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}
