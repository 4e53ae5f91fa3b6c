//! Mutable global binding cells.

use std::fmt;

use parking_lot::RwLock;

use crate::error::{VmError, VmResult};
use crate::value::Value;

/// A named cell holding one root value.
///
/// A Var starts unbound; reading it before the first [`Var::set_root`] is an
/// [`VmError::UnboundVar`].
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, Value, Var};
///
/// let var = Var::new("user/counter");
/// assert_eq!(var.deref().unwrap_err().kind(), ErrorKind::UnboundVar);
///
/// var.set_root(Value::Int(1));
/// var.set_root(Value::Int(2));
/// assert_eq!(var.deref(), Ok(Value::Int(2)));
/// ```
pub struct Var {
    name: String,
    root: RwLock<Option<Value>>,
}

impl Var {
    /// Create an unbound Var
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: RwLock::new(None),
        }
    }

    /// Qualified name (`namespace/name`)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the root value
    pub fn set_root(&self, value: Value) {
        *self.root.write() = Some(value);
    }

    /// Read the root value
    pub fn deref(&self) -> VmResult<Value> {
        self.root.read().clone().ok_or_else(|| VmError::UnboundVar {
            name: self.name.clone(),
        })
    }

    /// Whether `set_root` has ever been called
    pub fn is_bound(&self) -> bool {
        self.root.read().is_some()
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Var")
            .field("name", &self.name)
            .field("bound", &self.is_bound())
            .finish()
    }
}
