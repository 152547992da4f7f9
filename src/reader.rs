//! The Read-Side Engine.
//!
//! A recursive-descent parser that reads a JSON document straight into typed destinations, with
//! no intermediate tree. Objects are read member by member through the destination's
//! [`MemberSchema`](crate::inspector::MemberSchema), driven by the character-level
//! [`ParseState`] machine; arrays are collected into a flat `Vec` of the element type and then
//! materialized by the destination ([`FromJson::from_array`]).
//!
//! ## Leniency
//!
//! * Properties the destination does not know are parsed into [`Discard`] and dropped.
//! * Stray commas are skipped; a *missing* comma between two members is an error.
//! * Bare literals run until the next `,` or closing bracket that is not inside parentheses, so
//!   `new Date(2020, 0, 1)` is one token. A bare literal followed by another value without a
//!   comma (`{"a":1 "b":2}`, `[1 2]`) is a missing comma, not a longer token.
//!
//! Every structural failure is a [`JsonError::InvalidOperation`] carrying the byte position.

use std::borrow::Cow;
use std::fmt;

use crate::convert::{self, FromToken};
use crate::error::{JsonError, Result};
use crate::format;
use crate::inspector::{self, MemberSchema, Object};
use crate::reflect::{Reflect, Tag, ValueRef, Visit};
use crate::settings::{JsonSettings, MemberPolicy};

/// Where the object reader is within the current member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Between members: expecting `"`, `,` or `}`.
    None,
    /// Inside a property name.
    InPropertyName,
    /// After a property name, before its value.
    InPropertyValueTransition,
    /// Inside a quoted value.
    InStringValue,
    /// Inside a bare value.
    InValue,
    /// Inside a nested object or array value.
    InObject,
    /// The closing `}` was consumed.
    EndOfObject,
}

/// A scalar token read from the document.
///
/// Quoted literals hold their unescaped text; bare literals hold the trimmed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal<'s> {
    text: Cow<'s, str>,
    quoted: bool,
}

impl<'s> Literal<'s> {
    /// A bare token such as `42`, `true`, `null` or `new Date(0)`.
    pub fn bare(token: &'s str) -> Self {
        Self {
            text: Cow::Borrowed(token.trim()),
            quoted: false,
        }
    }

    /// The unescaped body of a quoted string.
    pub fn quoted(text: Cow<'s, str>) -> Self {
        Self { text, quoted: true }
    }

    /// The literal's text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true for the bare token `null`.
    pub fn is_null(&self) -> bool {
        !self.quoted && self.text == "null"
    }

    /// Converts the text with [`convert::convert`].
    pub fn convert<T: FromToken>(&self) -> Result<T> {
        convert::convert(&self.text)
    }
}

/// A value on its way into a destination.
pub enum Incoming<'p, 's> {
    /// A scalar token.
    Literal(Literal<'s>),
    /// The parser, positioned just past a `{`. The receiver must read through the matching `}`.
    Object(&'p mut Parser<'s>),
    /// The parser, positioned just past a `[`. The receiver must read through the matching `]`.
    Array(&'p mut Parser<'s>),
}

impl fmt::Debug for Incoming<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => f.debug_tuple("Literal").field(literal).finish(),
            Self::Object(parser) => f.debug_tuple("Object").field(&parser.position()).finish(),
            Self::Array(parser) => f.debug_tuple("Array").field(&parser.position()).finish(),
        }
    }
}

/// A type that can be read from a JSON value.
///
/// Implementations pick the shapes they accept; the defaults reject everything except what
/// [`FromJson::from_incoming`] routes to [`FromJson::null_value`].
pub trait FromJson: Sized {
    /// Builds a value from a non-null scalar token.
    fn from_literal(literal: &Literal<'_>) -> Result<Self> {
        Err(JsonError::conversion::<Self>(literal.text()))
    }

    /// Reads a value from an object. The parser is positioned just past the `{`.
    fn from_object(parser: &mut Parser<'_>) -> Result<Self> {
        Err(parser.error(format_args!(
            "cannot read an object into `{}`",
            std::any::type_name::<Self>()
        )))
    }

    /// Reads a value from an array. The parser is positioned just past the `[`.
    fn from_array(parser: &mut Parser<'_>) -> Result<Self> {
        Err(parser.error(format_args!(
            "cannot materialize an array into `{}`",
            std::any::type_name::<Self>()
        )))
    }

    /// The value a bare `null` reads as.
    fn null_value() -> Result<Self>;

    /// Dispatches on the shape of `incoming`.
    fn from_incoming(incoming: Incoming<'_, '_>) -> Result<Self> {
        match incoming {
            Incoming::Literal(literal) if literal.is_null() => Self::null_value(),
            Incoming::Literal(literal) => Self::from_literal(&literal),
            Incoming::Object(parser) => Self::from_object(parser),
            Incoming::Array(parser) => Self::from_array(parser),
        }
    }
}

/// Sink for values nobody asked for. Reads any shape and keeps nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Discard;

impl Reflect for Discard {
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        visit(ValueRef::Null)
    }

    fn declared_tag() -> Option<Tag> {
        Some(Tag::Null)
    }
}

impl Object for Discard {
    fn describe() -> MemberSchema<Self> {
        MemberSchema::builder().build()
    }
}

impl FromJson for Discard {
    fn from_literal(_: &Literal<'_>) -> Result<Self> {
        Ok(Discard)
    }

    fn from_object(parser: &mut Parser<'_>) -> Result<Self> {
        parser.read_object::<Self>()
    }

    fn from_array(parser: &mut Parser<'_>) -> Result<Self> {
        parser.read_elements::<Self>().map(|_| Discard)
    }

    fn null_value() -> Result<Self> {
        Ok(Discard)
    }
}

/// Returns true if `b` closes the string, tracking backslash escapes in `escaped`.
fn closes_string(b: u8, escaped: &mut bool) -> bool {
    if *escaped {
        *escaped = false;
        false
    } else if b == b'\\' {
        *escaped = true;
        false
    } else {
        b == b'"'
    }
}

/// Returns true if a trimmed bare token is one value: no whitespace, quote or bracket outside
/// parentheses, apart from the space after the `new` keyword.
fn is_single_token(token: &str) -> bool {
    let body = match token.strip_prefix("new") {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_whitespace()) => rest.trim_start(),
        _ => token,
    };
    let mut parens = 0usize;
    for b in body.bytes() {
        match b {
            b'(' => parens += 1,
            b')' => parens = parens.saturating_sub(1),
            b'"' | b'{' | b'[' if parens == 0 => return false,
            b if parens == 0 && b.is_ascii_whitespace() => return false,
            _ => {}
        }
    }
    true
}

/// A cursor over one JSON document.
#[derive(Debug)]
pub struct Parser<'s> {
    input: &'s str,
    pos: usize,
    depth: usize,
    settings: JsonSettings,
}

impl<'s> Parser<'s> {
    /// Creates a parser at the start of `input`.
    pub fn new(input: &'s str, settings: JsonSettings) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
            settings,
        }
    }

    /// The settings this parser reads with.
    pub fn settings(&self) -> &JsonSettings {
        &self.settings
    }

    /// Current byte offset into the document.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Builds an [`JsonError::InvalidOperation`] pointing at the current position.
    pub fn error(&self, msg: impl fmt::Display) -> JsonError {
        JsonError::invalid_operation(format!("{msg} at position {}", self.pos))
    }

    /// Reads the whole document as a `T`.
    ///
    /// The document is a single value surrounded by optional whitespace.
    pub fn parse_document<T: FromJson>(mut self) -> Result<T> {
        self.skip_whitespace();
        let value = match self.peek() {
            None => return Err(JsonError::invalid_operation("empty document")),
            Some(b @ (b'{' | b'[')) => self.descend(b, T::from_incoming)?,
            Some(b'"') => {
                let literal = self.read_quoted()?;
                T::from_incoming(Incoming::Literal(literal))?
            }
            Some(_) => {
                let literal = Literal::bare(&self.input[self.pos..]);
                if !is_single_token(literal.text()) {
                    return Err(self.error("unexpected trailing characters"));
                }
                self.pos = self.input.len();
                T::from_incoming(Incoming::Literal(literal))?
            }
        };

        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.error("unexpected trailing characters"));
        }
        Ok(value)
    }

    /// Reads the members of an object into a fresh `T`, through the matching `}`.
    ///
    /// Members are matched by name against `T`'s schema and the configured member policy;
    /// anything else is discarded.
    pub fn read_object<T: Object>(&mut self) -> Result<T> {
        let schema = inspector::schema::<T>();
        let policy = self.settings.members;
        let input = self.input;
        let bytes = input.as_bytes();

        let mut target = schema.construct();
        let mut state = ParseState::None;
        let mut name: Cow<'s, str> = Cow::Borrowed("");
        let mut start = 0;
        let mut escaped = false;
        let mut parens = 0usize;
        let mut pending_comma = false;

        while state != ParseState::EndOfObject {
            let Some(&b) = bytes.get(self.pos) else {
                return Err(self.error(match state {
                    ParseState::InPropertyName | ParseState::InStringValue => "unterminated string",
                    _ => "unterminated object",
                }));
            };

            match state {
                ParseState::None => match b {
                    b'"' if pending_comma => {
                        return Err(self.error("missing comma between members"));
                    }
                    b'"' => {
                        state = ParseState::InPropertyName;
                        start = self.pos + 1;
                        escaped = false;
                    }
                    b'}' => state = ParseState::EndOfObject,
                    b',' => pending_comma = false,
                    b if b.is_ascii_whitespace() => {}
                    _ => {
                        return Err(self.error(format_args!(
                            "unexpected `{}` in object",
                            self.current_char()
                        )));
                    }
                },

                ParseState::InPropertyName => {
                    if closes_string(b, &mut escaped) {
                        name = format::unescape(&input[start..self.pos])?;
                        state = ParseState::InPropertyValueTransition;
                    }
                }

                ParseState::InPropertyValueTransition => match b {
                    b':' => {}
                    b if b.is_ascii_whitespace() => {}
                    b'"' => {
                        state = ParseState::InStringValue;
                        start = self.pos;
                        escaped = false;
                    }
                    b'{' | b'[' => {
                        state = ParseState::InObject;
                        self.descend(b, |incoming| {
                            Self::assign(schema, &mut target, &name, policy, incoming)
                        })?;
                        state = ParseState::None;
                        pending_comma = true;
                        continue;
                    }
                    b',' | b'}' => {
                        return Err(self.error(format_args!("missing value for `{name}`")));
                    }
                    _ => {
                        state = ParseState::InValue;
                        start = self.pos;
                        parens = 0;
                        continue;
                    }
                },

                ParseState::InStringValue => {
                    if closes_string(b, &mut escaped) {
                        // `start` is the opening quote.
                        let text = format::unescape(&input[start + 1..self.pos])?;
                        Self::assign(
                            schema,
                            &mut target,
                            &name,
                            policy,
                            Incoming::Literal(Literal::quoted(text)),
                        )?;
                        state = ParseState::None;
                        pending_comma = true;
                    }
                }

                ParseState::InValue => match b {
                    b'(' => parens += 1,
                    b')' => parens = parens.saturating_sub(1),
                    b',' | b'}' if parens == 0 => {
                        let literal = Literal::bare(&input[start..self.pos]);
                        if !is_single_token(literal.text()) {
                            return Err(self.error("missing comma between members"));
                        }
                        Self::assign(schema, &mut target, &name, policy, Incoming::Literal(literal))?;
                        if b == b'}' {
                            state = ParseState::EndOfObject;
                        } else {
                            state = ParseState::None;
                            pending_comma = false;
                        }
                    }
                    _ => {}
                },

                ParseState::InObject | ParseState::EndOfObject => {}
            }

            self.pos += 1;
        }

        Ok(target)
    }

    /// Reads the elements of an array, through the matching `]`.
    pub fn read_elements<E: FromJson>(&mut self) -> Result<Vec<E>> {
        let mut items = Vec::new();
        let mut pending_comma = false;

        loop {
            self.skip_whitespace();
            let Some(b) = self.peek() else {
                return Err(self.error("unterminated array"));
            };

            match b {
                b']' => {
                    self.pos += 1;
                    return Ok(items);
                }
                b',' => {
                    self.pos += 1;
                    pending_comma = false;
                    continue;
                }
                _ if pending_comma => {
                    return Err(self.error("missing comma between elements"));
                }
                b'{' | b'[' => items.push(self.descend(b, E::from_incoming)?),
                b'"' => {
                    let literal = self.read_quoted()?;
                    items.push(E::from_incoming(Incoming::Literal(literal))?);
                }
                _ => {
                    let literal = self.read_bare_element()?;
                    items.push(E::from_incoming(Incoming::Literal(literal))?);
                }
            }
            pending_comma = true;
        }
    }

    fn assign<T: Object>(
        schema: &MemberSchema<T>,
        target: &mut T,
        name: &str,
        policy: MemberPolicy,
        incoming: Incoming<'_, '_>,
    ) -> Result<()> {
        match schema.admitted(name, policy) {
            Some(member) => member.write(target, incoming),
            None => {
                tracing::trace!(
                    member = name,
                    type_name = schema.type_name(),
                    "discarding unknown member"
                );
                Discard::from_incoming(incoming).map(drop)
            }
        }
    }

    /// Steps over the opening bracket `open` and hands the nested value to `read`.
    fn descend<R>(
        &mut self,
        open: u8,
        read: impl FnOnce(Incoming<'_, 's>) -> Result<R>,
    ) -> Result<R> {
        if self.depth >= self.settings.max_depth {
            return Err(JsonError::DepthLimitExceeded(self.settings.max_depth));
        }
        self.pos += 1;
        self.depth += 1;
        let value = if open == b'{' {
            read(Incoming::Object(self))
        } else {
            read(Incoming::Array(self))
        };
        self.depth -= 1;
        value
    }

    /// Reads a quoted string starting at the opening quote.
    fn read_quoted(&mut self) -> Result<Literal<'s>> {
        let input = self.input;
        let bytes = input.as_bytes();
        let start = self.pos + 1;
        let mut escaped = false;

        self.pos = start;
        while let Some(&b) = bytes.get(self.pos) {
            if closes_string(b, &mut escaped) {
                let text = format::unescape(&input[start..self.pos])?;
                self.pos += 1;
                return Ok(Literal::quoted(text));
            }
            self.pos += 1;
        }
        Err(self.error("unterminated string"))
    }

    /// Reads a bare array element up to the next top-level `,` or `]`, which is not consumed.
    fn read_bare_element(&mut self) -> Result<Literal<'s>> {
        let input = self.input;
        let bytes = input.as_bytes();
        let start = self.pos;
        let mut parens = 0usize;

        while let Some(&b) = bytes.get(self.pos) {
            match b {
                b'(' => parens += 1,
                b')' => parens = parens.saturating_sub(1),
                b',' | b']' if parens == 0 => {
                    let literal = Literal::bare(&input[start..self.pos]);
                    if !is_single_token(literal.text()) {
                        return Err(self.error("missing comma between elements"));
                    }
                    return Ok(literal);
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(self.error("unterminated array"))
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }
}
