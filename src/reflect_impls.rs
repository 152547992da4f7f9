//! `Reflect` and `FromJson` implementations for standard library and ecosystem types.
//!
//! | Rust type | Classification | Reads from |
//! |---|---|---|
//! | integers, floats, `bool` | `Integer` / `Float` / `Bool` | bare or quoted token |
//! | `String`, `str`, `Cow<str>`, `char` | `String` | any token, text as-is |
//! | `uuid::Uuid` | `Guid` | hyphenated or simple form |
//! | `chrono` timestamps | `Date` | any date dialect |
//! | `Vec`, `VecDeque`, `LinkedList`, sets, slices, `[T; N]` | `Sequence` | array |
//! | `HashMap`, `BTreeMap`, `IndexMap` | `Map` | array of `{"key","value"}` entries |
//! | `Option<T>` | `Null` or `T` | `null` or `T` |
//! | `&T`, `Box<T>`, `Rc<T>`, `Arc<T>`, `RefCell<T>` | as `T` | as `T` |

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::date;
use crate::error::{JsonError, Result};
use crate::map;
use crate::reader::{FromJson, Literal, Parser};
use crate::reflect::{Float, Integer, Reflect, Sequence, StringMap, Tag, ValueRef, Visit, VisitValue};

// --- Scalars ---

macro_rules! impl_integer {
    ($variant:ident($wide:ty): $($t:ty),*) => {
        $(
            impl Reflect for $t {
                fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
                    visit(ValueRef::Integer(Integer::$variant(*self as $wide)))
                }

                fn declared_tag() -> Option<Tag> {
                    Some(Tag::Integer)
                }
            }

            impl FromJson for $t {
                fn from_literal(literal: &Literal<'_>) -> Result<Self> {
                    literal.convert()
                }

                fn null_value() -> Result<Self> {
                    Ok(0)
                }
            }
        )*
    };
}

impl_integer!(Signed(i128): i8, i16, i32, i64, i128, isize);
impl_integer!(Unsigned(u128): u8, u16, u32, u64, u128, usize);

macro_rules! impl_float {
    ($($t:ty => $variant:ident),*) => {
        $(
            impl Reflect for $t {
                fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
                    visit(ValueRef::Float(Float::$variant(*self)))
                }

                fn declared_tag() -> Option<Tag> {
                    Some(Tag::Float)
                }
            }

            impl FromJson for $t {
                fn from_literal(literal: &Literal<'_>) -> Result<Self> {
                    literal.convert()
                }

                fn null_value() -> Result<Self> {
                    Ok(0.0)
                }
            }
        )*
    };
}

impl_float!(f32 => F32, f64 => F64);

impl Reflect for bool {
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        visit(ValueRef::Bool(*self))
    }

    fn declared_tag() -> Option<Tag> {
        Some(Tag::Bool)
    }
}

impl FromJson for bool {
    fn from_literal(literal: &Literal<'_>) -> Result<Self> {
        literal.convert()
    }

    fn null_value() -> Result<Self> {
        Ok(false)
    }
}

impl Reflect for char {
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        let mut buf = [0u8; 4];
        visit(ValueRef::String(self.encode_utf8(&mut buf)))
    }

    fn declared_tag() -> Option<Tag> {
        Some(Tag::String)
    }
}

impl FromJson for char {
    fn from_literal(literal: &Literal<'_>) -> Result<Self> {
        literal.convert()
    }

    fn null_value() -> Result<Self> {
        Ok('\0')
    }
}

impl Reflect for str {
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        visit(ValueRef::String(self))
    }
}

impl Reflect for String {
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        visit(ValueRef::String(self))
    }

    fn declared_tag() -> Option<Tag> {
        Some(Tag::String)
    }
}

impl FromJson for String {
    fn from_literal(literal: &Literal<'_>) -> Result<Self> {
        Ok(literal.text().to_string())
    }

    fn null_value() -> Result<Self> {
        Ok(String::new())
    }
}

impl Reflect for Cow<'_, str> {
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        visit(ValueRef::String(self))
    }

    fn declared_tag() -> Option<Tag> {
        Some(Tag::String)
    }
}

impl FromJson for Cow<'static, str> {
    fn from_literal(literal: &Literal<'_>) -> Result<Self> {
        Ok(Cow::Owned(literal.text().to_string()))
    }

    fn null_value() -> Result<Self> {
        Ok(Cow::Borrowed(""))
    }
}

impl Reflect for () {
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        visit(ValueRef::Null)
    }

    fn declared_tag() -> Option<Tag> {
        Some(Tag::Null)
    }
}

impl FromJson for () {
    fn from_literal(_: &Literal<'_>) -> Result<Self> {
        Ok(())
    }

    fn null_value() -> Result<Self> {
        Ok(())
    }
}

impl Reflect for Uuid {
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        visit(ValueRef::Guid(*self))
    }

    fn declared_tag() -> Option<Tag> {
        Some(Tag::Guid)
    }
}

impl FromJson for Uuid {
    fn from_literal(literal: &Literal<'_>) -> Result<Self> {
        literal.convert()
    }

    fn null_value() -> Result<Self> {
        Ok(Uuid::nil())
    }
}

// --- Dates ---

impl<Tz: TimeZone> Reflect for DateTime<Tz> {
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        visit(ValueRef::Date(self.fixed_offset()))
    }

    fn declared_tag() -> Option<Tag> {
        Some(Tag::Date)
    }
}

impl Reflect for NaiveDateTime {
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        visit(ValueRef::Date(self.and_utc().fixed_offset()))
    }

    fn declared_tag() -> Option<Tag> {
        Some(Tag::Date)
    }
}

macro_rules! impl_date_from_json {
    ($($t:ty => $from_sentinel:expr),*) => {
        $(
            impl FromJson for $t {
                fn from_literal(literal: &Literal<'_>) -> Result<Self> {
                    literal.convert()
                }

                fn null_value() -> Result<Self> {
                    Ok($from_sentinel(date::sentinel()))
                }
            }
        )*
    };
}

impl_date_from_json!(
    DateTime<Utc> => |d: DateTime<Utc>| d,
    DateTime<FixedOffset> => |d: DateTime<Utc>| d.fixed_offset(),
    DateTime<Local> => |d: DateTime<Utc>| d.with_timezone(&Local),
    NaiveDateTime => |d: DateTime<Utc>| d.naive_utc()
);

// --- Option and pointers ---

impl<T: Reflect> Reflect for Option<T> {
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        match self {
            Some(value) => value.reflect(visit),
            None => visit(ValueRef::Null),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Some(value) => value.type_name(),
            None => std::any::type_name::<Self>(),
        }
    }
}

impl<T: FromJson> FromJson for Option<T> {
    fn from_literal(literal: &Literal<'_>) -> Result<Self> {
        T::from_literal(literal).map(Some)
    }

    fn from_object(parser: &mut Parser<'_>) -> Result<Self> {
        T::from_object(parser).map(Some)
    }

    fn from_array(parser: &mut Parser<'_>) -> Result<Self> {
        T::from_array(parser).map(Some)
    }

    fn null_value() -> Result<Self> {
        Ok(None)
    }
}

macro_rules! impl_pointer {
    ($($ptr:ty),*) => {
        $(
            impl<T: Reflect + ?Sized> Reflect for $ptr {
                fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
                    (**self).reflect(visit)
                }

                fn type_name(&self) -> &'static str {
                    (**self).type_name()
                }
            }
        )*
    };
}

impl_pointer!(&T, &mut T, Box<T>, Rc<T>, Arc<T>);

macro_rules! impl_wrapper_from_json {
    ($($wrapper:ident),*) => {
        $(
            impl<T: FromJson> FromJson for $wrapper<T> {
                fn from_literal(literal: &Literal<'_>) -> Result<Self> {
                    T::from_literal(literal).map($wrapper::new)
                }

                fn from_object(parser: &mut Parser<'_>) -> Result<Self> {
                    T::from_object(parser).map($wrapper::new)
                }

                fn from_array(parser: &mut Parser<'_>) -> Result<Self> {
                    T::from_array(parser).map($wrapper::new)
                }

                fn null_value() -> Result<Self> {
                    T::null_value().map($wrapper::new)
                }

                fn from_incoming(incoming: crate::reader::Incoming<'_, '_>) -> Result<Self> {
                    T::from_incoming(incoming).map($wrapper::new)
                }
            }
        )*
    };
}

impl_wrapper_from_json!(Box, Rc, Arc, RefCell);

impl<T: Reflect + ?Sized> Reflect for RefCell<T> {
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        let value = self.try_borrow().map_err(|_| {
            JsonError::Reflection(format!(
                "`{}` is mutably borrowed",
                std::any::type_name::<T>()
            ))
        })?;
        value.reflect(visit)
    }
}

// --- Sequences ---

macro_rules! impl_sequence {
    ($($seq:ident),*) => {
        $(
            impl<T: Reflect> Sequence for $seq<T> {
                fn for_each_element(&self, f: &mut VisitValue<'_>) -> Result<()> {
                    for item in self {
                        f(item)?;
                    }
                    Ok(())
                }
            }

            impl<T: Reflect> Reflect for $seq<T> {
                fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
                    visit(ValueRef::Sequence(self))
                }

                fn declared_tag() -> Option<Tag> {
                    Some(Tag::Sequence)
                }
            }
        )*
    };
}

impl_sequence!(Vec, VecDeque, LinkedList, BTreeSet);

impl<T: Reflect, S> Sequence for HashSet<T, S> {
    fn for_each_element(&self, f: &mut VisitValue<'_>) -> Result<()> {
        for item in self {
            f(item)?;
        }
        Ok(())
    }
}

impl<T: Reflect, S> Reflect for HashSet<T, S> {
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        visit(ValueRef::Sequence(self))
    }

    fn declared_tag() -> Option<Tag> {
        Some(Tag::Sequence)
    }
}

impl<T: Reflect, const N: usize> Sequence for [T; N] {
    fn for_each_element(&self, f: &mut VisitValue<'_>) -> Result<()> {
        self.iter().try_for_each(|item| f(item))
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        visit(ValueRef::Sequence(self))
    }

    fn declared_tag() -> Option<Tag> {
        Some(Tag::Sequence)
    }
}

impl<T: Reflect> Sequence for &[T] {
    fn for_each_element(&self, f: &mut VisitValue<'_>) -> Result<()> {
        self.iter().try_for_each(|item| f(item))
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<[T]>()
    }
}

impl<T: Reflect> Reflect for [T] {
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        let items: &[T] = self;
        visit(ValueRef::Sequence(&items))
    }
}

impl<T: FromJson> FromJson for Vec<T> {
    fn from_array(parser: &mut Parser<'_>) -> Result<Self> {
        parser.read_elements()
    }

    fn null_value() -> Result<Self> {
        Ok(Vec::new())
    }
}

impl<T: FromJson> FromJson for VecDeque<T> {
    fn from_array(parser: &mut Parser<'_>) -> Result<Self> {
        parser.read_elements().map(VecDeque::from)
    }

    fn null_value() -> Result<Self> {
        Ok(VecDeque::new())
    }
}

impl<T: FromJson> FromJson for LinkedList<T> {
    fn from_array(parser: &mut Parser<'_>) -> Result<Self> {
        Ok(parser.read_elements()?.into_iter().collect())
    }

    fn null_value() -> Result<Self> {
        Ok(LinkedList::new())
    }
}

impl<T: FromJson + Ord> FromJson for BTreeSet<T> {
    fn from_array(parser: &mut Parser<'_>) -> Result<Self> {
        Ok(parser.read_elements()?.into_iter().collect())
    }

    fn null_value() -> Result<Self> {
        Ok(BTreeSet::new())
    }
}

impl<T, S> FromJson for HashSet<T, S>
where
    T: FromJson + Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_array(parser: &mut Parser<'_>) -> Result<Self> {
        Ok(parser.read_elements()?.into_iter().collect())
    }

    fn null_value() -> Result<Self> {
        Ok(HashSet::default())
    }
}

impl<T: FromJson, const N: usize> FromJson for [T; N] {
    fn from_array(parser: &mut Parser<'_>) -> Result<Self> {
        let items = parser.read_elements::<T>()?;
        let found = items.len();
        Self::try_from(items).map_err(|_| {
            parser.error(format_args!(
                "array of length {N} cannot hold {found} elements"
            ))
        })
    }

    fn null_value() -> Result<Self> {
        let items = (0..N).map(|_| T::null_value()).collect::<Result<Vec<_>>>()?;
        Self::try_from(items)
            .map_err(|_| JsonError::invalid_operation(format!("cannot build an array of length {N}")))
    }
}

// --- Maps ---

macro_rules! impl_string_map {
    ($($map:ident<K, V $(, $s:ident)?>),*) => {
        $(
            impl<K: Reflect, V: Reflect $(, $s)?> StringMap for $map<K, V $(, $s)?> {
                fn for_each_entry(
                    &self,
                    f: &mut dyn FnMut(&dyn Reflect, &dyn Reflect) -> Result<()>,
                ) -> Result<()> {
                    for (key, value) in self {
                        f(key, value)?;
                    }
                    Ok(())
                }
            }

            impl<K: Reflect, V: Reflect $(, $s)?> Reflect for $map<K, V $(, $s)?> {
                fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
                    visit(ValueRef::Map(self))
                }

                fn declared_tag() -> Option<Tag> {
                    Some(Tag::Map)
                }
            }
        )*
    };
}

impl_string_map!(HashMap<K, V, S>, BTreeMap<K, V>, IndexMap<K, V, S>);

impl<K, V, S> FromJson for HashMap<K, V, S>
where
    K: Reflect + FromJson + Eq + Hash + 'static,
    V: Reflect + FromJson + 'static,
    S: BuildHasher + Default,
{
    fn from_array(parser: &mut Parser<'_>) -> Result<Self> {
        Ok(map::read_pairs(parser)?.into_iter().collect())
    }

    fn null_value() -> Result<Self> {
        Ok(HashMap::default())
    }
}

impl<K, V> FromJson for BTreeMap<K, V>
where
    K: Reflect + FromJson + Ord + 'static,
    V: Reflect + FromJson + 'static,
{
    fn from_array(parser: &mut Parser<'_>) -> Result<Self> {
        Ok(map::read_pairs(parser)?.into_iter().collect())
    }

    fn null_value() -> Result<Self> {
        Ok(BTreeMap::new())
    }
}

impl<K, V, S> FromJson for IndexMap<K, V, S>
where
    K: Reflect + FromJson + Eq + Hash + 'static,
    V: Reflect + FromJson + 'static,
    S: BuildHasher + Default,
{
    fn from_array(parser: &mut Parser<'_>) -> Result<Self> {
        Ok(map::read_pairs(parser)?.into_iter().collect())
    }

    fn null_value() -> Result<Self> {
        Ok(IndexMap::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::JsonSettings;

    fn classify<T: Reflect + ?Sized>(value: &T) -> Tag {
        let mut tag = Tag::Null;
        value
            .reflect(&mut |v| {
                tag = v.tag();
                Ok(())
            })
            .expect("reflect");
        tag
    }

    fn read<T: FromJson>(input: &str) -> Result<T> {
        Parser::new(input, JsonSettings::default()).parse_document()
    }

    #[test]
    fn classification_is_by_kind() {
        assert_eq!(classify(&7u8), Tag::Integer);
        assert_eq!(classify(&-7i64), Tag::Integer);
        assert_eq!(classify(&1.5f32), Tag::Float);
        assert_eq!(classify("text"), Tag::String);
        assert_eq!(classify(&'c'), Tag::String);
        assert_eq!(classify(&Uuid::nil()), Tag::Guid);
        assert_eq!(classify(&Utc::now()), Tag::Date);
        assert_eq!(classify(&[1, 2, 3][..]), Tag::Sequence);
        assert_eq!(classify(&BTreeMap::<String, i32>::new()), Tag::Map);
        assert_eq!(classify(&None::<i32>), Tag::Null);
        assert_eq!(classify(&Some(Rc::new(3))), Tag::Integer);
    }

    #[test]
    fn borrowed_refcell_is_a_reflection_error() {
        let cell = RefCell::new(5);
        let _guard = cell.borrow_mut();
        let err = cell.reflect(&mut |_| Ok(())).expect_err("borrowed");
        assert_eq!(err.kind(), "Reflection");
    }

    #[test]
    fn null_reads_as_the_empty_value() -> Result<()> {
        assert_eq!(read::<i32>("null")?, 0);
        assert_eq!(read::<String>("null")?, "");
        assert_eq!(read::<Option<u8>>("null")?, None);
        assert_eq!(read::<Vec<u8>>("null")?, Vec::<u8>::new());
        assert_eq!(read::<Uuid>("null")?, Uuid::nil());
        assert_eq!(read::<DateTime<Utc>>("null")?, date::sentinel());
        Ok(())
    }

    #[test]
    fn fixed_arrays_check_length() -> Result<()> {
        assert_eq!(read::<[u8; 3]>("[1, 2, 3]")?, [1, 2, 3]);
        let err = read::<[u8; 3]>("[1, 2]").expect_err("short");
        assert_eq!(err.kind(), "InvalidOperation");
        Ok(())
    }

    #[test]
    fn scalars_reject_structures() {
        assert!(read::<i32>("[1]").is_err());
        assert!(read::<String>("{}").is_err());
        assert_eq!(
            read::<u8>("\"x\"").expect_err("not a number").kind(),
            "Conversion"
        );
    }
}
