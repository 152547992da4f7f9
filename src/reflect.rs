//! Defines the `Reflect` trait and the closed classification every value is reduced to.
//!
//! The writer never inspects concrete types. It asks a value to classify itself into exactly one
//! [`ValueRef`] and then matches exhaustively on that tag. Containers hand out trait objects
//! ([`Sequence`], [`StringMap`], [`Tabular`], [`Composite`]) so the writer can walk them without
//! knowing their element types.
//!
//! Classification is callback based: [`Reflect::reflect`] passes the `ValueRef` to a visitor
//! instead of returning it. This lets values behind a guard (`RefCell`) classify
//! themselves while the guard is alive, and lets such access fail with a proper error.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use crate::error::Result;
use crate::settings::MemberPolicy;

/// The visitor handed to [`Reflect::reflect`].
pub type Visit<'v> = dyn FnMut(ValueRef<'_>) -> Result<()> + 'v;

/// Callback receiving one element, map value or member value.
pub type VisitValue<'v> = dyn FnMut(&dyn Reflect) -> Result<()> + 'v;

/// A type whose values can be classified for serialization.
///
/// Implemented for the standard scalar, string, collection and smart-pointer types, for
/// `chrono` timestamps and `uuid::Uuid`, and generated by `#[derive(Reflect)]` for structs and
/// fieldless enums.
pub trait Reflect {
    /// Classifies `self` and hands the result to `visit`.
    ///
    /// Implementations call `visit` exactly once.
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()>;

    /// The tag every value of this type classifies as, if it is fixed.
    ///
    /// `None` means the tag depends on the value (`Option<T>` may be `Null`, a dynamic table
    /// cell may be anything).
    fn declared_tag() -> Option<Tag>
    where
        Self: Sized,
    {
        None
    }

    /// Name of the concrete type, used in diagnostics and by the cycle guard.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// The classification tag of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Absent value.
    Null,
    /// `true` / `false`.
    Bool,
    /// Any integral number.
    Integer,
    /// Any floating point number.
    Float,
    /// Text.
    String,
    /// A 128-bit identifier.
    Guid,
    /// A fieldless enum, written as its ordinal.
    Enum,
    /// A timestamp.
    Date,
    /// An ordered sequence of values.
    Sequence,
    /// A string-keyed map.
    Map,
    /// A row/column data source.
    Tabular,
    /// An object with named members.
    Composite,
}

/// An integral value, wide enough for every primitive integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integer {
    /// Signed integers up to 128 bits.
    Signed(i128),
    /// Unsigned integers up to 128 bits.
    Unsigned(u128),
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signed(v) => write!(f, "{v}"),
            Self::Unsigned(v) => write!(f, "{v}"),
        }
    }
}

/// A floating point value. `f32` is kept apart so it prints with its own shortest form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Float {
    /// Single precision.
    F32(f32),
    /// Double precision.
    F64(f64),
}

/// The classification of a single value.
#[derive(Clone, Copy)]
pub enum ValueRef<'a> {
    /// `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Integer(Integer),
    /// A float.
    Float(Float),
    /// A string slice.
    String(&'a str),
    /// A GUID.
    Guid(Uuid),
    /// A fieldless enum's ordinal.
    Enum(i64),
    /// A timestamp with its offset.
    Date(DateTime<FixedOffset>),
    /// An ordered sequence.
    Sequence(&'a dyn Sequence),
    /// A string-keyed map.
    Map(&'a dyn StringMap),
    /// A row/column source.
    Tabular(&'a dyn Tabular),
    /// An object with named members.
    Composite(&'a dyn Composite),
}

impl ValueRef<'_> {
    /// Returns the tag of this classification.
    pub fn tag(&self) -> Tag {
        match self {
            Self::Null => Tag::Null,
            Self::Bool(_) => Tag::Bool,
            Self::Integer(_) => Tag::Integer,
            Self::Float(_) => Tag::Float,
            Self::String(_) => Tag::String,
            Self::Guid(_) => Tag::Guid,
            Self::Enum(_) => Tag::Enum,
            Self::Date(_) => Tag::Date,
            Self::Sequence(_) => Tag::Sequence,
            Self::Map(_) => Tag::Map,
            Self::Tabular(_) => Tag::Tabular,
            Self::Composite(_) => Tag::Composite,
        }
    }
}

impl fmt::Debug for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Integer(v) => f.debug_tuple("Integer").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::String(v) => f.debug_tuple("String").field(v).finish(),
            Self::Guid(v) => f.debug_tuple("Guid").field(v).finish(),
            Self::Enum(v) => f.debug_tuple("Enum").field(v).finish(),
            Self::Date(v) => f.debug_tuple("Date").field(v).finish(),
            Self::Sequence(v) => f.debug_tuple("Sequence").field(&v.type_name()).finish(),
            Self::Map(v) => f.debug_tuple("Map").field(&v.type_name()).finish(),
            Self::Tabular(v) => f.debug_tuple("Tabular").field(&v.type_name()).finish(),
            Self::Composite(v) => f.debug_tuple("Composite").field(&v.type_name()).finish(),
        }
    }
}

/// An ordered sequence of reflectable elements.
pub trait Sequence {
    /// Calls `f` for every element, in order.
    fn for_each_element(&self, f: &mut VisitValue<'_>) -> Result<()>;

    /// Name of the concrete type.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A map whose keys classify as strings.
///
/// The key check happens in the writer: a key that classifies as anything other than
/// [`ValueRef::String`] aborts serialization with [`crate::JsonError::UnsupportedMapKey`].
pub trait StringMap {
    /// Calls `f` with every `(key, value)` pair, in iteration order.
    fn for_each_entry(
        &self,
        f: &mut dyn FnMut(&dyn Reflect, &dyn Reflect) -> Result<()>,
    ) -> Result<()>;

    /// Name of the concrete type.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A row/column data source.
pub trait Tabular {
    /// Column names, in order.
    fn columns(&self) -> Vec<&str>;

    /// Number of rows.
    fn row_count(&self) -> usize;

    /// Hands the cell at `(row, column)` to `f`.
    fn with_cell(&self, row: usize, column: usize, f: &mut VisitValue<'_>) -> Result<()>;

    /// Name of the concrete type.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// An object with named members.
///
/// Implemented for every type deriving `Reflect` through its cached
/// [`MemberSchema`](crate::inspector::MemberSchema).
pub trait Composite {
    /// Calls `f` with the name and value of every readable member admitted by `policy`, in
    /// declaration order.
    fn for_each_member(
        &self,
        policy: MemberPolicy,
        f: &mut dyn FnMut(&str, &dyn Reflect) -> Result<()>,
    ) -> Result<()>;

    /// Name of the concrete type.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
