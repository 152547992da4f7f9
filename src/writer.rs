//! The Write-Side Engine.
//!
//! [`JsonWriter`] turns any [`Reflect`] value into JSON text in one pass. Every value is first
//! classified into a [`ValueRef`], and the writer matches exhaustively on it; there is no other
//! type dispatch.
//!
//! ## Containers
//!
//! Sequences, maps, tabular sources and composites are written element by element, each
//! followed by a separator (`,`, plus a line break when pretty-printing). The last separator is
//! trimmed before the container is closed.
//!
//! ## Cycles
//!
//! Before descending into a container the writer pushes `(address, type name)` onto a visit
//! stack. A container that is already on the stack is written as `null` instead of being
//! entered again, so `a -> b -> a` terminates. The stack is per call, and its height is bounded
//! by the configured maximum depth.

use std::fmt::Write;

use crate::date;
use crate::error::{JsonError, Result};
use crate::format;
use crate::reflect::{Composite, Reflect, Sequence, StringMap, Tabular, ValueRef};
use crate::settings::JsonSettings;

/// Serializes values into a growing string buffer.
#[derive(Debug)]
pub struct JsonWriter {
    out: String,
    settings: JsonSettings,
    visiting: Vec<(usize, &'static str)>,
}

impl JsonWriter {
    /// Creates a writer with an empty buffer.
    pub fn new(settings: JsonSettings) -> Self {
        Self::with_buffer(String::new(), settings)
    }

    /// Creates a writer that appends to `out`.
    pub fn with_buffer(out: String, settings: JsonSettings) -> Self {
        Self {
            out,
            settings,
            visiting: Vec::new(),
        }
    }

    /// Writes one value.
    pub fn write<T: Reflect + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.reflect(&mut |classified| self.write_classified(classified))
    }

    /// Returns the text written so far.
    pub fn finish(self) -> String {
        self.out
    }

    fn write_classified(&mut self, value: ValueRef<'_>) -> Result<()> {
        match value {
            ValueRef::Null => self.out.push_str("null"),
            ValueRef::Bool(v) => self.out.push_str(if v { "true" } else { "false" }),
            ValueRef::Integer(v) => {
                let _ = write!(self.out, "{v}");
            }
            ValueRef::Float(v) => format::write_float(&mut self.out, v),
            ValueRef::String(v) => format::write_quoted(&mut self.out, v),
            ValueRef::Guid(v) => {
                let _ = write!(self.out, "\"{}\"", v.hyphenated());
            }
            ValueRef::Enum(v) => {
                let _ = write!(self.out, "{v}");
            }
            ValueRef::Date(v) => self
                .out
                .push_str(&date::encode(&v, self.settings.date_dialect)),
            ValueRef::Sequence(seq) => {
                self.guarded(address(seq), seq.type_name(), |w| w.write_sequence(seq))?;
            }
            ValueRef::Map(map) => {
                self.guarded(address(map), map.type_name(), |w| w.write_map(map))?;
            }
            ValueRef::Tabular(table) => {
                self.guarded(address(table), table.type_name(), |w| w.write_tabular(table))?;
            }
            ValueRef::Composite(object) => {
                self.guarded(address(object), object.type_name(), |w| {
                    w.write_composite(object)
                })?;
            }
        }
        Ok(())
    }

    /// Runs `body` with `(address, type_name)` on the visit stack, or writes `null` if it is
    /// already there.
    fn guarded(
        &mut self,
        address: usize,
        type_name: &'static str,
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        let key = (address, type_name);
        if self.visiting.contains(&key) {
            tracing::trace!(type_name, "cycle detected, writing null");
            self.out.push_str("null");
            return Ok(());
        }
        if self.visiting.len() >= self.settings.max_depth {
            return Err(JsonError::DepthLimitExceeded(self.settings.max_depth));
        }

        self.visiting.push(key);
        let result = body(self);
        self.visiting.pop();
        result
    }

    fn write_sequence(&mut self, seq: &dyn Sequence) -> Result<()> {
        self.out.push('[');
        let mut count = 0;
        seq.for_each_element(&mut |element| {
            self.write(element)?;
            self.separator();
            count += 1;
            Ok(())
        })?;
        self.trim_separator(count);
        self.out.push(']');
        Ok(())
    }

    fn write_map(&mut self, map: &dyn StringMap) -> Result<()> {
        self.out.push('[');
        let mut count = 0;
        map.for_each_entry(&mut |key, value| {
            self.out.push_str("{\"key\":");
            self.write_key(key)?;
            self.separator();
            self.out.push_str("\"value\":");
            self.write(value)?;
            self.out.push('}');
            self.separator();
            count += 1;
            Ok(())
        })?;
        self.trim_separator(count);
        self.out.push(']');
        Ok(())
    }

    fn write_key(&mut self, key: &dyn Reflect) -> Result<()> {
        let out = &mut self.out;
        key.reflect(&mut |classified| match classified {
            ValueRef::String(text) => {
                format::write_quoted(out, text);
                Ok(())
            }
            _ => Err(JsonError::UnsupportedMapKey(key.type_name())),
        })
    }

    fn write_tabular(&mut self, table: &dyn Tabular) -> Result<()> {
        let columns = table.columns();
        self.out.push_str("{\"Rows\":[");
        for row in 0..table.row_count() {
            self.out.push('{');
            for (column, name) in columns.iter().enumerate() {
                format::write_quoted(&mut self.out, name);
                self.out.push(':');
                table.with_cell(row, column, &mut |cell| self.write(cell))?;
                self.separator();
            }
            self.trim_separator(columns.len());
            self.out.push('}');
            self.separator();
        }
        self.trim_separator(table.row_count());
        self.out.push_str("]}");
        Ok(())
    }

    fn write_composite(&mut self, object: &dyn Composite) -> Result<()> {
        self.out.push('{');
        let mut count = 0;
        object.for_each_member(self.settings.members, &mut |name, value| {
            format::write_quoted(&mut self.out, name);
            self.out.push(':');
            self.write(value)?;
            self.separator();
            count += 1;
            Ok(())
        })?;
        self.trim_separator(count);
        self.out.push('}');
        Ok(())
    }

    fn separator_text(&self) -> &'static str {
        if self.settings.pretty {
            ",\n"
        } else {
            ","
        }
    }

    fn separator(&mut self) {
        let text = self.separator_text();
        self.out.push_str(text);
    }

    /// Drops the separator after the last of `count` items.
    fn trim_separator(&mut self, count: usize) {
        let text = self.separator_text();
        if count > 0 && self.out.ends_with(text) {
            self.out.truncate(self.out.len() - text.len());
        }
    }
}

/// Address of the value behind a trait object, for the cycle guard.
fn address<T: ?Sized>(value: &T) -> usize {
    (value as *const T).cast::<()>() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::JsonSettings;

    fn write<T: Reflect + ?Sized>(value: &T, settings: JsonSettings) -> Result<String> {
        let mut writer = JsonWriter::new(settings);
        writer.write(value)?;
        Ok(writer.finish())
    }

    #[test]
    fn empty_containers_have_nothing_to_trim() -> Result<()> {
        assert_eq!(write(&Vec::<u8>::new(), JsonSettings::default())?, "[]");
        assert_eq!(write(&vec![vec![1], vec![]], JsonSettings::default())?, "[[1],[]]");
        Ok(())
    }

    #[test]
    fn pretty_only_breaks_lines() -> Result<()> {
        let settings = JsonSettings {
            pretty: true,
            ..JsonSettings::default()
        };
        assert_eq!(write(&[1, 2, 3], settings)?, "[1,\n2,\n3]");
        Ok(())
    }

    #[test]
    fn depth_limit_applies_to_containers() {
        let settings = JsonSettings {
            max_depth: 1,
            ..JsonSettings::default()
        };
        assert!(write(&[1], settings).is_ok());
        let err = write(&[[1]], settings).expect_err("too deep");
        assert!(matches!(err, JsonError::DepthLimitExceeded(1)));
    }
}
