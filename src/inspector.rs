// src/inspector.rs

//! Type introspection: per-type member schemas.
//!
//! A [`MemberSchema`] is the ordered list of members of a composite type, each with a getter,
//! an optional setter and its declared type. Schemas are produced by `#[derive(Reflect)]`
//! (through [`Object::describe`]) and registered the first time [`schema`] is asked for a type.
//! From then on the same `&'static` schema is returned, so neither the writer nor the reader
//! pays for reflection per call.
//!
//! ```rust
//! use wirejson::{inspector, Reflect};
//!
//! #[derive(Reflect, Default, Debug, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let schema = inspector::schema::<Point>();
//! assert_eq!(schema.names().collect::<Vec<_>>(), ["x", "y"]);
//!
//! let mut p = schema.construct();
//! schema.set_token(&mut p, "y", "-7")?;
//! assert_eq!(p, Point { x: 0, y: -7 });
//! # Ok::<(), wirejson::JsonError>(())
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::{OnceLock, PoisonError, RwLock};

use twox_hash::XxHash64;

use crate::error::Result;
use crate::reader::{Discard, FromJson, Incoming, Literal};
use crate::reflect::{Composite, Reflect, Tag, VisitValue};
use crate::settings::MemberPolicy;

/// Reads a member of `T` and hands its value to the callback.
pub type Getter<T> = fn(&T, &mut VisitValue<'_>) -> Result<()>;

/// Assigns a member of `T` from an incoming JSON value.
pub type Setter<T> = fn(&mut T, Incoming<'_, '_>) -> Result<()>;

/// Hasher for the schema name index and the registry.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct XxBuildHasher;

impl BuildHasher for XxBuildHasher {
    type Hasher = XxHash64;

    fn build_hasher(&self) -> XxHash64 {
        XxHash64::with_seed(0)
    }
}

/// A composite type with a derivable member schema.
///
/// Composite destinations must be constructible without arguments, hence the `Default` bound.
pub trait Object: Reflect + Default + 'static {
    /// Builds the member schema. Called once per type by [`schema`].
    fn describe() -> MemberSchema<Self>;
}

/// Whether a member is a struct field or a declared accessor pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// A struct field.
    Field,
    /// A getter (and optional setter) method pair.
    Accessor,
}

/// The declared type of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredType {
    /// Full type name.
    pub type_name: &'static str,
    /// Tag all values of the type classify as, when fixed.
    pub tag: Option<Tag>,
}

impl DeclaredType {
    /// The declared type of `F`.
    pub fn of<F: Reflect>() -> Self {
        Self {
            type_name: std::any::type_name::<F>(),
            tag: F::declared_tag(),
        }
    }
}

/// One member of a composite type.
#[derive(Debug, Clone, Copy)]
pub struct Member<T> {
    name: &'static str,
    kind: MemberKind,
    declared: DeclaredType,
    get: Getter<T>,
    set: Option<Setter<T>>,
}

impl<T> Member<T> {
    /// Name as written on the wire.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Field or accessor.
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Declared type.
    pub fn declared_type(&self) -> DeclaredType {
        self.declared
    }

    /// Returns true if the member can be assigned.
    pub fn is_writable(&self) -> bool {
        self.set.is_some()
    }

    /// Hands the member's current value in `instance` to `f`.
    pub fn read(&self, instance: &T, f: &mut VisitValue<'_>) -> Result<()> {
        (self.get)(instance, f)
    }

    /// Assigns the member from `incoming`. Read-only members consume the value and drop it.
    pub fn write(&self, instance: &mut T, incoming: Incoming<'_, '_>) -> Result<()> {
        match self.set {
            Some(set) => set(instance, incoming),
            None => Discard::from_incoming(incoming).map(drop),
        }
    }
}

/// The ordered members of a composite type.
#[derive(Debug)]
pub struct MemberSchema<T> {
    type_name: &'static str,
    members: Vec<Member<T>>,
    index: HashMap<&'static str, usize, XxBuildHasher>,
}

impl<T: 'static> MemberSchema<T> {
    /// Starts an empty schema for `T`.
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder {
            members: Vec::new(),
        }
    }

    /// Name of the described type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[Member<T>] {
        &self.members
    }

    /// Member names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.members.iter().map(|m| m.name)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the type has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Looks a member up by wire name.
    pub fn member(&self, name: &str) -> Option<&Member<T>> {
        self.index.get(name).map(|&i| &self.members[i])
    }

    /// Looks a member up by wire name, if `policy` admits its kind.
    pub fn admitted(&self, name: &str, policy: MemberPolicy) -> Option<&Member<T>> {
        self.member(name).filter(|m| policy.admits(m.kind))
    }

    /// Hands the value of member `name` to `f`. Returns `false` if there is no such member.
    pub fn get(&self, instance: &T, name: &str, f: &mut VisitValue<'_>) -> Result<bool> {
        match self.member(name) {
            Some(member) => member.read(instance, f).map(|()| true),
            None => Ok(false),
        }
    }

    /// Assigns member `name`. Returns `false` if there is no writable member of that name, in
    /// which case the incoming value is consumed and dropped.
    pub fn set(&self, instance: &mut T, name: &str, incoming: Incoming<'_, '_>) -> Result<bool> {
        match self.member(name).and_then(|m| m.set) {
            Some(set) => set(instance, incoming).map(|()| true),
            None => Discard::from_incoming(incoming).map(|_| false),
        }
    }

    /// Assigns member `name` from a bare string token, converting it to the member's type.
    pub fn set_token(&self, instance: &mut T, name: &str, token: &str) -> Result<bool> {
        self.set(instance, name, Incoming::Literal(Literal::bare(token)))
    }
}

impl<T: Default + 'static> MemberSchema<T> {
    /// Creates a new instance of the described type without arguments.
    pub fn construct(&self) -> T {
        T::default()
    }
}

/// Collects the members of a [`MemberSchema`].
#[derive(Debug)]
pub struct SchemaBuilder<T> {
    members: Vec<Member<T>>,
}

impl<T: 'static> SchemaBuilder<T> {
    /// Adds a struct field.
    pub fn field<F: Reflect>(mut self, name: &'static str, get: Getter<T>, set: Setter<T>) -> Self {
        self.members.push(Member {
            name,
            kind: MemberKind::Field,
            declared: DeclaredType::of::<F>(),
            get,
            set: Some(set),
        });
        self
    }

    /// Adds an accessor. Accessors without a setter are written but never read.
    pub fn accessor<F: Reflect>(
        mut self,
        name: &'static str,
        get: Getter<T>,
        set: Option<Setter<T>>,
    ) -> Self {
        self.members.push(Member {
            name,
            kind: MemberKind::Accessor,
            declared: DeclaredType::of::<F>(),
            get,
            set,
        });
        self
    }

    /// Finishes the schema. On duplicate names the first declaration wins.
    pub fn build(self) -> MemberSchema<T> {
        let mut index = HashMap::with_capacity_and_hasher(self.members.len(), XxBuildHasher);
        for (i, member) in self.members.iter().enumerate() {
            index.entry(member.name).or_insert(i);
        }
        MemberSchema {
            type_name: std::any::type_name::<T>(),
            members: self.members,
            index,
        }
    }
}

type Registry = RwLock<HashMap<TypeId, &'static (dyn Any + Send + Sync), XxBuildHasher>>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Returns the member schema of `T`, registering it on first use.
pub fn schema<T: Object>() -> &'static MemberSchema<T> {
    let registry = REGISTRY.get_or_init(Registry::default);
    let id = TypeId::of::<T>();

    let known = registry
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
        .copied();
    if let Some(schema) = known.and_then(|s| s.downcast_ref::<MemberSchema<T>>()) {
        return schema;
    }

    // `describe` runs unlocked so it never blocks lookups of other types.
    let built = Box::new(T::describe());
    let mut map = registry.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(schema) = map
        .get(&id)
        .copied()
        .and_then(|s| s.downcast_ref::<MemberSchema<T>>())
    {
        // Lost the race; the fresh copy is dropped.
        return schema;
    }

    let built: &'static MemberSchema<T> = Box::leak(built);
    map.insert(id, built);
    tracing::debug!(
        type_name = built.type_name(),
        members = built.len(),
        "registered member schema"
    );
    built
}

impl<T: Object> Composite for T {
    fn for_each_member(
        &self,
        policy: MemberPolicy,
        f: &mut dyn FnMut(&str, &dyn Reflect) -> Result<()>,
    ) -> Result<()> {
        for member in schema::<T>().members() {
            if policy.admits(member.kind) {
                member.read(self, &mut |value| f(member.name, value))?;
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        schema::<T>().type_name()
    }
}
