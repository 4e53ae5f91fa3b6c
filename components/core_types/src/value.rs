//! VM value representation.
//!
//! [`Value`] is the universal unit the interpreter moves around. Immediate
//! values are stored inline; everything else is shared through `Arc` so that
//! copying a value onto an operand stack never copies the object behind it.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use num_bigint::BigInt;

use crate::code::{Closure, CodeObject};
use crate::error::{VmError, VmResult};
use crate::types::TypeId;
use crate::var::Var;

/// Capabilities a host object must provide to live inside a [`Value`].
///
/// Every method has an explicit unsupported default. `object_type` has no
/// sensible default at all: an implementation that forgets to override it is
/// a programming error and reports an internal error.
pub trait NativeObject: fmt::Debug + Send + Sync {
    /// The object's type in the type tree
    fn object_type(&self) -> VmResult<TypeId> {
        Err(VmError::Internal(".type isn't overloaded".to_string()))
    }

    /// Integer view of the object
    fn int_val(&self) -> VmResult<i64> {
        Err(VmError::type_mismatch("integer", format!("{:?}", self)))
    }
}

/// An instance of a user-defined type.
#[derive(Debug)]
pub struct Instance {
    type_id: TypeId,
    fields: Vec<Value>,
}

impl Instance {
    /// Create an instance of `type_id` holding `fields`
    pub fn new(type_id: TypeId, fields: Vec<Value>) -> Self {
        Self { type_id, fields }
    }

    /// A fresh effect-handler token. Tokens compare by identity, so two
    /// tokens with the same label are still different tokens.
    pub fn handler_token(label: &str) -> Value {
        Value::Object(Arc::new(Instance::new(
            TypeId::HANDLER_TOKEN,
            vec![Value::from(label)],
        )))
    }

    /// The instance's type
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Field values in declaration order
    pub fn fields(&self) -> &[Value] {
        &self.fields
    }
}

/// Represents any VM value.
///
/// # Examples
///
/// ```
/// use core_types::{TypeId, Value};
///
/// let nil = Value::Nil;
/// let number = Value::Int(42);
///
/// assert!(!nil.is_truthy());
/// assert!(number.is_truthy());
/// assert_eq!(number.type_of(), Ok(TypeId::INTEGER));
/// ```
#[derive(Clone)]
pub enum Value {
    /// The nil sentinel
    Nil,
    /// Boolean sentinel values
    Bool(bool),
    /// Fixed-width integer
    Int(i64),
    /// Integer too large for `Int`
    BigInt(Arc<BigInt>),
    /// IEEE 754 double
    Float(f64),
    /// Immutable string
    Str(Arc<str>),
    /// Plain code object
    Code(Arc<CodeObject>),
    /// Code object plus captured values
    Closure(Arc<Closure>),
    /// Global binding cell
    Var(Arc<Var>),
    /// A type used as a value
    Type(TypeId),
    /// Instance of a user-defined type
    Object(Arc<Instance>),
    /// Host object
    Native(Arc<dyn NativeObject>),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::BigInt(n) => f.debug_tuple("BigInt").field(n).finish(),
            Value::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Code(code) => f.debug_tuple("Code").field(&code.name()).finish(),
            Value::Closure(closure) => f
                .debug_tuple("Closure")
                .field(&closure.code().name())
                .field(&closure.closed_overs().len())
                .finish(),
            Value::Var(var) => f.debug_tuple("Var").field(&var.name()).finish(),
            Value::Type(id) => f.debug_tuple("Type").field(&id.0).finish(),
            Value::Object(obj) => f.debug_tuple("Object").field(&obj.type_id().0).finish(),
            Value::Native(obj) => f.debug_tuple("Native").field(obj).finish(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            _ => self.identical(other),
        }
    }
}

impl Value {
    /// Returns whether this value lets COND_BR fall through.
    ///
    /// Only `nil` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Identity comparison: the same shared object, or the same immediate.
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => Arc::ptr_eq(a, b),
            (Value::Str(a), Value::Str(b)) => Arc::ptr_eq(a, b),
            (Value::Code(a), Value::Code(b)) => Arc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Arc::ptr_eq(a, b),
            (Value::Var(a), Value::Var(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => {
                std::ptr::eq(Arc::as_ptr(a) as *const u8, Arc::as_ptr(b) as *const u8)
            }
            _ => false,
        }
    }

    /// The value's type.
    ///
    /// Built-in variants have fixed types; host objects report their own and
    /// fail with an internal error if they never overrode `object_type`.
    pub fn type_of(&self) -> VmResult<TypeId> {
        Ok(match self {
            Value::Nil => TypeId::NIL,
            Value::Bool(_) => TypeId::BOOL,
            Value::Int(_) => TypeId::INTEGER,
            Value::BigInt(_) => TypeId::BIG_INTEGER,
            Value::Float(_) => TypeId::FLOAT,
            Value::Str(_) => TypeId::STRING,
            Value::Code(_) => TypeId::CODE,
            Value::Closure(_) => TypeId::CLOSURE,
            Value::Var(_) => TypeId::VAR,
            Value::Type(_) => TypeId::TYPE,
            Value::Object(obj) => obj.type_id(),
            Value::Native(obj) => return obj.object_type(),
        })
    }

    /// Integer view of the value
    pub fn int_val(&self) -> VmResult<i64> {
        match self {
            Value::Int(n) => Ok(*n),
            Value::Native(obj) => obj.int_val(),
            other => Err(VmError::type_mismatch("integer", other)),
        }
    }

    /// Hash consistent with [`Value::identical`].
    pub fn hash_code(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        match self {
            Value::Nil => 0u8.hash(&mut hasher),
            Value::Bool(b) => b.hash(&mut hasher),
            Value::Int(n) => n.hash(&mut hasher),
            Value::Float(n) => n.to_bits().hash(&mut hasher),
            Value::Type(id) => id.hash(&mut hasher),
            Value::BigInt(n) => (Arc::as_ptr(n) as usize).hash(&mut hasher),
            Value::Str(s) => (Arc::as_ptr(s) as *const u8 as usize).hash(&mut hasher),
            Value::Code(c) => (Arc::as_ptr(c) as usize).hash(&mut hasher),
            Value::Closure(c) => (Arc::as_ptr(c) as usize).hash(&mut hasher),
            Value::Var(v) => (Arc::as_ptr(v) as usize).hash(&mut hasher),
            Value::Object(o) => (Arc::as_ptr(o) as usize).hash(&mut hasher),
            Value::Native(o) => (Arc::as_ptr(o) as *const u8 as usize).hash(&mut hasher),
        }
        hasher.finish()
    }

    /// The Var behind this value, or a type mismatch
    pub fn as_var(&self) -> VmResult<&Arc<Var>> {
        match self {
            Value::Var(var) => Ok(var),
            other => Err(VmError::type_mismatch("var", other)),
        }
    }

    /// Short name of the variant, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::BigInt(_) => "bigint",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Code(_) => "code",
            Value::Closure(_) => "closure",
            Value::Var(_) => "var",
            Value::Type(_) => "type",
            Value::Object(_) => "object",
            Value::Native(_) => "native",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<Arc<CodeObject>> for Value {
    fn from(code: Arc<CodeObject>) -> Self {
        Value::Code(code)
    }
}

impl From<Arc<Var>> for Value {
    fn from(var: Arc<Var>) -> Self {
        Value::Var(var)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::BigInt(n) => write!(f, "{}N", n),
            Value::Float(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Code(code) => write!(f, "#<code {}>", code.name()),
            Value::Closure(closure) => write!(f, "#<closure {}>", closure.code().name()),
            Value::Var(var) => write!(f, "#'{}", var.name()),
            Value::Type(id) => match crate::types::type_name(*id) {
                Some(name) => write!(f, "{}", name),
                None => write!(f, "{}", id),
            },
            Value::Object(obj) => write!(f, "#<object of type {}>", obj.type_id().0),
            Value::Native(obj) => write!(f, "#<native {:?}>", obj),
        }
    }
}
