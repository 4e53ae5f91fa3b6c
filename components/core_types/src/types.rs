//! Type tree and the process-wide type registry.
//!
//! Types live in an append-only arena and are referred to by [`TypeId`]
//! handles. Each type has at most one parent, fixed at construction, and the
//! parent must already exist, so the subclass graph is always a tree rooted at
//! `loki.core.Object`. Because no parent link ever changes, subtype answers can
//! be memoized for the lifetime of the registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::{VmError, VmResult};
use crate::namespace::Namespaces;
use crate::value::Value;

/// Handle to a type record in a [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Root of the type tree
    pub const OBJECT: TypeId = TypeId(0);
    /// Type of every type
    pub const TYPE: TypeId = TypeId(1);
    /// Type of `nil`
    pub const NIL: TypeId = TypeId(2);
    /// Type of booleans
    pub const BOOL: TypeId = TypeId(3);
    /// Abstract parent of the numeric types
    pub const NUMBER: TypeId = TypeId(4);
    /// Fixed-width integers
    pub const INTEGER: TypeId = TypeId(5);
    /// Arbitrary-precision integers
    pub const BIG_INTEGER: TypeId = TypeId(6);
    /// Floating point numbers
    pub const FLOAT: TypeId = TypeId(7);
    /// Strings
    pub const STRING: TypeId = TypeId(8);
    /// Plain code objects
    pub const CODE: TypeId = TypeId(9);
    /// Closures (a kind of code)
    pub const CLOSURE: TypeId = TypeId(10);
    /// Global binding cells
    pub const VAR: TypeId = TypeId(11);
    /// Default type of user instances
    pub const INSTANCE: TypeId = TypeId(12);
    /// Effect-handler tokens
    pub const HANDLER_TOKEN: TypeId = TypeId(13);

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<type {}>", self.0)
    }
}

/// Built-in types in bootstrap order; position `i` becomes `TypeId(i)`.
const BUILTIN_TYPES: &[(&str, Option<TypeId>)] = &[
    ("loki.core.Object", None),
    ("loki.core.Type", Some(TypeId::OBJECT)),
    ("loki.core.Nil", Some(TypeId::OBJECT)),
    ("loki.core.Bool", Some(TypeId::OBJECT)),
    ("loki.core.Number", Some(TypeId::OBJECT)),
    ("loki.core.Integer", Some(TypeId::NUMBER)),
    ("loki.core.BigInteger", Some(TypeId::NUMBER)),
    ("loki.core.Float", Some(TypeId::NUMBER)),
    ("loki.core.String", Some(TypeId::OBJECT)),
    ("loki.core.Code", Some(TypeId::OBJECT)),
    ("loki.core.Closure", Some(TypeId::CODE)),
    ("loki.core.Var", Some(TypeId::OBJECT)),
    ("loki.core.Instance", Some(TypeId::OBJECT)),
    ("loki.core.HandlerToken", Some(TypeId::OBJECT)),
];

/// One node of the type tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRecord {
    name: String,
    parent: Option<TypeId>,
    subclasses: Vec<TypeId>,
}

impl TypeRecord {
    /// Qualified name the type was created with
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent type; `None` only for the root
    pub fn parent(&self) -> Option<TypeId> {
        self.parent
    }

    /// Direct subclasses in creation order
    pub fn subclasses(&self) -> &[TypeId] {
        &self.subclasses
    }
}

/// Arena of types plus the name-keyed registry over it.
pub struct TypeRegistry {
    records: Vec<TypeRecord>,
    by_name: HashMap<String, TypeId>,
    namespaces: Option<Arc<dyn Namespaces>>,
    subtype_cache: Mutex<HashMap<(TypeId, TypeId), bool>>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.records.len())
            .field("names", &self.by_name.len())
            .field("has_namespaces", &self.namespaces.is_some())
            .field("cached_subtype_checks", &self.subtype_cache.lock().len())
            .finish()
    }
}

impl TypeRegistry {
    /// Create a registry holding only the built-in types.
    ///
    /// `Object` and `Type` refer to each other (Object's type is Type, Type's
    /// parent is Object), so they are constructed by hand before anything
    /// else; the remaining built-ins go through the ordinary path.
    pub fn new() -> Self {
        let mut registry = Self {
            records: Vec::with_capacity(BUILTIN_TYPES.len()),
            by_name: HashMap::new(),
            namespaces: None,
            subtype_cache: Mutex::new(HashMap::new()),
        };

        let (object_name, _) = BUILTIN_TYPES[0];
        registry.records.push(TypeRecord {
            name: object_name.to_string(),
            parent: None,
            subclasses: Vec::new(),
        });
        registry.register_type(object_name, TypeId::OBJECT);

        for (name, parent) in &BUILTIN_TYPES[1..] {
            let parent = parent.unwrap_or(TypeId::OBJECT);
            registry.push_record(name, parent);
        }
        registry
    }

    fn push_record(&mut self, name: &str, parent: TypeId) -> TypeId {
        let id = TypeId(self.records.len() as u32);
        self.records.push(TypeRecord {
            name: name.to_string(),
            parent: Some(parent),
            subclasses: Vec::new(),
        });
        self.records[parent.index()].subclasses.push(id);
        self.register_type(name, id);
        id
    }

    /// Create a new type under `parent` (the root when `None`) and register it.
    ///
    /// Fails when the parent handle does not name an existing type.
    pub fn define(&mut self, name: &str, parent: Option<TypeId>) -> VmResult<TypeId> {
        let parent = parent.unwrap_or(TypeId::OBJECT);
        if self.record(parent).is_none() {
            return Err(VmError::Internal(format!(
                "cannot define {}: parent {} does not exist",
                name, parent
            )));
        }
        let id = self.push_record(name, parent);
        debug!(name, id = id.0, parent = parent.0, "type defined");
        Ok(id)
    }

    /// Map `name` to `id`, silently replacing any previous entry.
    ///
    /// When a namespace collaborator is installed the type is also bound into
    /// the Var named by splitting `name` at its last `.`.
    pub fn register_type(&mut self, name: &str, id: TypeId) {
        self.by_name.insert(name.to_string(), id);
        if let Some(namespaces) = &self.namespaces {
            bind_type_var(namespaces.as_ref(), name, id);
        }
    }

    /// Install the namespace collaborator and bind every type registered so far.
    pub fn set_namespaces(&mut self, namespaces: Arc<dyn Namespaces>) {
        for (name, id) in &self.by_name {
            bind_type_var(namespaces.as_ref(), name, *id);
        }
        debug!(bound = self.by_name.len(), "type registry attached to namespaces");
        self.namespaces = Some(namespaces);
    }

    /// Look up a type by qualified name
    pub fn get_by_name(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// The record behind a handle
    pub fn record(&self, id: TypeId) -> Option<&TypeRecord> {
        self.records.get(id.index())
    }

    /// Qualified name of a type
    pub fn name(&self, id: TypeId) -> Option<&str> {
        self.record(id).map(TypeRecord::name)
    }

    /// Parent of a type
    pub fn parent(&self, id: TypeId) -> Option<TypeId> {
        self.record(id).and_then(TypeRecord::parent)
    }

    /// Direct subclasses of a type, in creation order
    pub fn subclasses(&self, id: TypeId) -> &[TypeId] {
        self.record(id).map_or(&[], TypeRecord::subclasses)
    }

    /// Number of types ever created
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false once bootstrapped
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True if `target` is `ty` or one of its ancestors.
    pub fn is_subtype(&self, ty: TypeId, target: TypeId) -> bool {
        if ty == target {
            return true;
        }
        if let Some(hit) = self.subtype_cache.lock().get(&(ty, target)) {
            return *hit;
        }

        let mut current = self.parent(ty);
        let mut found = false;
        while let Some(id) = current {
            if id == target {
                found = true;
                break;
            }
            current = self.parent(id);
        }

        self.subtype_cache.lock().insert((ty, target), found);
        found
    }

    /// True if `value`'s type is `target` or a descendant of it.
    ///
    /// Never fails: a value that cannot report its type is an instance of
    /// nothing.
    pub fn is_a(&self, value: &Value, target: TypeId) -> bool {
        match value.type_of() {
            Ok(ty) => self.is_subtype(ty, target),
            Err(_) => false,
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn bind_type_var(namespaces: &dyn Namespaces, qualified: &str, id: TypeId) {
    let (ns, name) = match qualified.rfind('.') {
        Some(pos) => (&qualified[..pos], &qualified[pos + 1..]),
        None => ("", qualified),
    };
    let var = namespaces.find_or_make(ns).intern_or_make(name);
    var.set_root(Value::Type(id));
}

static REGISTRY: Lazy<RwLock<TypeRegistry>> = Lazy::new(|| RwLock::new(TypeRegistry::new()));

/// Shared read access to the process-wide registry.
pub fn registry() -> parking_lot::RwLockReadGuard<'static, TypeRegistry> {
    REGISTRY.read()
}

/// Define a type in the process-wide registry.
pub fn define_type(name: &str, parent: Option<TypeId>) -> VmResult<TypeId> {
    REGISTRY.write().define(name, parent)
}

/// Register (or re-register) a name in the process-wide registry.
pub fn register_type(name: &str, id: TypeId) {
    REGISTRY.write().register_type(name, id);
}

/// Look a type up by name in the process-wide registry.
pub fn get_type_by_name(name: &str) -> Option<TypeId> {
    REGISTRY.read().get_by_name(name)
}

/// Qualified name of a type in the process-wide registry.
pub fn type_name(id: TypeId) -> Option<String> {
    REGISTRY.read().name(id).map(str::to_string)
}

/// Subtype test against the process-wide registry.
///
/// # Examples
///
/// ```
/// use core_types::{is_a, TypeId, Value};
///
/// assert!(is_a(&Value::Int(1), TypeId::INTEGER));
/// assert!(is_a(&Value::Int(1), TypeId::NUMBER));
/// assert!(is_a(&Value::Int(1), TypeId::OBJECT));
/// assert!(!is_a(&Value::Int(1), TypeId::STRING));
/// ```
pub fn is_a(value: &Value, target: TypeId) -> bool {
    REGISTRY.read().is_a(value, target)
}

/// Attach the namespace collaborator to the process-wide registry.
pub fn set_namespaces(namespaces: Arc<dyn Namespaces>) {
    REGISTRY.write().set_namespaces(namespaces);
}
