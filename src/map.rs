//! Key/value maps on the wire.
//!
//! Maps are written as an array of entry objects, `[{"key":K,"value":V},...]`, and read back
//! the same way: the reader collects a flat `Vec<MapEntry<K, V>>` and the destination map is
//! built from the pairs in order.
//!
//! ```rust
//! use std::collections::BTreeMap;
//!
//! let scores = BTreeMap::from([("a".to_string(), 1), ("b".to_string(), 2)]);
//! let text = wirejson::to_string(&scores)?;
//! assert_eq!(text, r#"[{"key":"a","value":1},{"key":"b","value":2}]"#);
//!
//! let back: BTreeMap<String, i32> = wirejson::from_str(&text)?;
//! assert_eq!(back, scores);
//! # Ok::<(), wirejson::JsonError>(())
//! ```

use crate::error::{JsonError, Result};
use crate::inspector::{MemberSchema, Object};
use crate::reader::{FromJson, Parser};
use crate::reflect::{Reflect, Tag, ValueRef, Visit};

/// One `{"key": .., "value": ..}` element of a serialized map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry<K, V> {
    key: Option<K>,
    value: Option<V>,
}

impl<K, V> MapEntry<K, V> {
    /// An entry holding both halves.
    pub fn new(key: K, value: V) -> Self {
        Self {
            key: Some(key),
            value: Some(value),
        }
    }
}

impl<K, V: FromJson> MapEntry<K, V> {
    /// Splits the entry. A missing `value` reads as `null`; a missing `key` is an error.
    pub fn into_pair(self) -> Result<(K, V)> {
        let key = self
            .key
            .ok_or_else(|| JsonError::invalid_operation("map entry without a `key` member"))?;
        let value = match self.value {
            Some(value) => value,
            None => V::null_value()?,
        };
        Ok((key, value))
    }
}

impl<K, V> Default for MapEntry<K, V> {
    fn default() -> Self {
        Self {
            key: None,
            value: None,
        }
    }
}

impl<K, V> Reflect for MapEntry<K, V>
where
    K: Reflect + FromJson + 'static,
    V: Reflect + FromJson + 'static,
{
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        visit(ValueRef::Composite(self))
    }

    fn declared_tag() -> Option<Tag> {
        Some(Tag::Composite)
    }
}

impl<K, V> Object for MapEntry<K, V>
where
    K: Reflect + FromJson + 'static,
    V: Reflect + FromJson + 'static,
{
    fn describe() -> MemberSchema<Self> {
        MemberSchema::<Self>::builder()
            .field::<K>(
                "key",
                |entry, f| f(&entry.key),
                |entry, incoming| {
                    entry.key = Some(K::from_incoming(incoming)?);
                    Ok(())
                },
            )
            .field::<V>(
                "value",
                |entry, f| f(&entry.value),
                |entry, incoming| {
                    entry.value = Some(V::from_incoming(incoming)?);
                    Ok(())
                },
            )
            .build()
    }
}

impl<K, V> FromJson for MapEntry<K, V>
where
    K: Reflect + FromJson + 'static,
    V: Reflect + FromJson + 'static,
{
    fn from_object(parser: &mut Parser<'_>) -> Result<Self> {
        parser.read_object::<Self>()
    }

    fn null_value() -> Result<Self> {
        Ok(Self::default())
    }
}

/// Reads the entries of a serialized map as `(key, value)` pairs, in document order.
pub fn read_pairs<K, V>(parser: &mut Parser<'_>) -> Result<Vec<(K, V)>>
where
    K: Reflect + FromJson + 'static,
    V: Reflect + FromJson + 'static,
{
    parser
        .read_elements::<MapEntry<K, V>>()?
        .into_iter()
        .map(MapEntry::into_pair)
        .collect()
}
