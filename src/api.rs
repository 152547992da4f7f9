use std::path::Path;

use crate::date::DateDialect;
use crate::error::Result;
use crate::io::{self, MappedDocument};
use crate::reader::{FromJson, Parser};
use crate::reflect::Reflect;
use crate::settings::{JsonSettings, MemberPolicy};
use crate::writer::JsonWriter;

/// The main entry point: serializes and deserializes with a fixed set of [`JsonSettings`].
///
/// `Json` holds nothing but its settings, so it is `Copy` and can be shared freely between
/// threads. All per-call state (output buffer, visit stack, parse position) lives on the stack
/// of the call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json {
    settings: JsonSettings,
}

impl Json {
    /// A facade with default settings: ISO dates, compact output, all members.
    pub fn new() -> Self {
        Self::default()
    }

    /// A facade with the given settings.
    pub fn with_settings(settings: JsonSettings) -> Self {
        Self { settings }
    }

    /// Starts configuring a facade.
    pub fn builder() -> JsonBuilder {
        JsonBuilder::default()
    }

    /// The settings of this facade.
    pub fn settings(&self) -> &JsonSettings {
        &self.settings
    }

    /// Serializes `value` to JSON text.
    pub fn serialize<T: Reflect + ?Sized>(&self, value: &T) -> Result<String> {
        let mut out = String::new();
        self.serialize_into(value, &mut out)?;
        Ok(out)
    }

    /// Serializes `value`, appending to `out`. On failure `out` keeps whatever was written
    /// before the error.
    pub fn serialize_into<T: Reflect + ?Sized>(&self, value: &T, out: &mut String) -> Result<()> {
        let mut writer = JsonWriter::with_buffer(std::mem::take(out), self.settings);
        let result = writer.write(value);
        *out = writer.finish();
        tracing::trace!(
            type_name = value.type_name(),
            len = out.len(),
            ok = result.is_ok(),
            "serialized value"
        );
        result
    }

    /// Deserializes a document into a `T`.
    pub fn deserialize<T: FromJson>(&self, text: &str) -> Result<T> {
        tracing::trace!(
            type_name = std::any::type_name::<T>(),
            len = text.len(),
            "deserializing document"
        );
        Parser::new(text, self.settings).parse_document()
    }

    /// Serializes `value` and writes it to the file at `path`.
    pub fn save<T, P>(&self, value: &T, path: P) -> Result<()>
    where
        T: Reflect + ?Sized,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = self.serialize(value)?;
        io::write_document(path, &text)?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "saved document");
        Ok(())
    }

    /// Reads the file at `path` and deserializes it into a `T`.
    pub fn load<T, P>(&self, path: P) -> Result<T>
    where
        T: FromJson,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let document = MappedDocument::open(path)?;
        let value = self.deserialize(document.text()?)?;
        tracing::debug!(path = %path.display(), bytes = document.len(), "loaded document");
        Ok(value)
    }
}

/// Configures a [`Json`] facade.
///
/// ```rust
/// use wirejson::{DateDialect, Json};
///
/// let json = Json::builder()
///     .date_dialect(DateDialect::ExpressionLiteral)
///     .pretty(true)
///     .build();
/// assert!(json.settings().pretty);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBuilder {
    settings: JsonSettings,
}

impl JsonBuilder {
    /// Starts from existing settings.
    pub fn from_settings(settings: JsonSettings) -> Self {
        Self { settings }
    }

    /// Dialect used for writing timestamps.
    pub fn date_dialect(mut self, dialect: DateDialect) -> Self {
        self.settings.date_dialect = dialect;
        self
    }

    /// Emit a line break after every field and element.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.settings.pretty = pretty;
        self
    }

    /// Member kinds taking part in (de)serialization.
    pub fn members(mut self, policy: MemberPolicy) -> Self {
        self.settings.members = policy;
        self
    }

    /// Maximum nesting depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.settings.max_depth = depth;
        self
    }

    /// Finishes the facade.
    pub fn build(self) -> Json {
        Json::with_settings(self.settings)
    }
}

/// Serializes `value` with default settings.
pub fn to_string<T: Reflect + ?Sized>(value: &T) -> Result<String> {
    Json::new().serialize(value)
}

/// Deserializes `text` with default settings.
pub fn from_str<T: FromJson>(text: &str) -> Result<T> {
    Json::new().deserialize(text)
}
