//! # wirejson
//!
//! A self-contained JSON engine for remote-method-invocation payloads: it turns arbitrary
//! object graphs into JSON text and reads JSON text back into typed destinations, without an
//! intermediate document tree and without any external JSON library.
//!
//! ## Overview
//!
//! ```rust
//! use wirejson::{Json, Reflect};
//!
//! #[derive(Reflect, Default, Debug, PartialEq)]
//! struct Order {
//!     id: u32,
//!     items: Vec<String>,
//!     note: Option<String>,
//! }
//!
//! let order = Order { id: 7, items: vec!["tea".into()], note: None };
//! let text = wirejson::to_string(&order)?;
//! assert_eq!(text, r#"{"id":7,"items":["tea"],"note":null}"#);
//!
//! let back: Order = Json::new().deserialize(&text)?;
//! assert_eq!(back, order);
//! # Ok::<(), wirejson::JsonError>(())
//! ```
//!
//! ### Key Features
//!
//! *   **Closed classification:** every value reduces to exactly one [`ValueRef`] (null, bool,
//!     integer, float, string, GUID, enum, date, sequence, map, tabular, composite), and the
//!     writer matches on it exhaustively.
//! *   **Cached member schemas:** `#[derive(Reflect)]` describes a type once; the schema is
//!     registered on first use and shared by every later call ([`inspector`]).
//! *   **Three date dialects:** ISO-8601, `\/Date(ms±hhmm)\/` and `new Date(ms)`. The reader
//!     detects the dialect by itself ([`date`]).
//! *   **Cycle safe:** a container already being written is emitted as `null`.
//! *   **Tolerant reader:** unknown properties are skipped, literals are converted
//!     culture-invariantly into the destination member's type ([`convert`]).
//!
//! ## Wire Shapes
//!
//! | Value | JSON |
//! |---|---|
//! | map | `[{"key":K,"value":V},...]` |
//! | tabular source | `{"Rows":[{"col":v,...},...]}` |
//! | enum | ordinal |
//! | non-finite float | `null` |
//! | cycle | `null` |
//!
//! ## Configuration
//!
//! A [`Json`] facade carries immutable [`JsonSettings`]: date dialect, pretty printing (a line
//! break after every element), member policy and maximum nesting depth. See [`settings`].
//!
//! ### Safety and Error Handling
//!
//! * **Encapsulated Unsafe:** the only `unsafe` is the read-only memory map in `io`.
//! * **No Panics:** No `unwrap()` or `panic!()` calls in the library (enforced by clippy lints).
//! * **Comprehensive Errors:** All failures correspond to a [`JsonError`] type; unparseable
//!   dates degrade to a sentinel instead.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

// Lets generated code name `wirejson::` from inside this crate too.
extern crate self as wirejson;

// --- PUBLIC API MODULES ---
pub mod api;
pub mod convert;
pub mod date;
pub mod error;
pub mod format;
pub mod inspector;
pub mod map;
pub mod reader;
pub mod reflect;
pub mod settings;
pub mod table;
pub mod writer;

// --- INTERNAL IMPLEMENTATION MODULES (Hidden from Docs) ---
#[doc(hidden)]
pub mod io;

// Private modules
mod reflect_impls;

// --- MACRO SUPPORT MODULES ---

/// Runtime utilities used by the derived code.
#[doc(hidden)]
pub mod rt;

// --- RE-EXPORTS ---

pub use api::{from_str, to_string, Json, JsonBuilder};
pub use convert::FromToken;
pub use date::DateDialect;
pub use error::{ErrorPayload, JsonError, Result};
pub use inspector::{MemberSchema, Object};
pub use reader::FromJson;
pub use reflect::{Reflect, ValueRef};
pub use settings::{JsonSettings, MemberPolicy};
pub use table::{Cell, Table};

// Re-export the derive macro so it is accessible as `wirejson::Reflect`
pub use wirejson_derive::Reflect;
