//! Namespace collaborator used to bind types into global Vars.
//!
//! The type registry only needs two operations from a namespace system:
//! find-or-create a namespace, and intern-or-create a Var inside it.
//! [`NamespaceTable`] is a minimal in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::var::Var;

/// A namespace system capable of producing namespaces by name.
pub trait Namespaces: Send + Sync {
    /// The namespace called `name`, created if missing
    fn find_or_make(&self, name: &str) -> Arc<dyn Namespace>;
}

/// A single namespace of Vars.
pub trait Namespace: Send + Sync {
    /// The Var called `name` in this namespace, created unbound if missing
    fn intern_or_make(&self, name: &str) -> Arc<Var>;
}

/// In-memory namespace system.
#[derive(Debug, Default)]
pub struct NamespaceTable {
    namespaces: Mutex<HashMap<String, Arc<VarTable>>>,
}

impl NamespaceTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a `namespace/name` reference, interning the Var if needed.
    ///
    /// A reference without `/` lives in the unnamed namespace.
    pub fn resolve(&self, qualified: &str) -> Arc<Var> {
        let (ns, name) = qualified.rsplit_once('/').unwrap_or(("", qualified));
        self.find_or_make(ns).intern_or_make(name)
    }

    /// Names of all namespaces created so far, sorted
    pub fn namespace_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.namespaces.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Namespaces for NamespaceTable {
    fn find_or_make(&self, name: &str) -> Arc<dyn Namespace> {
        self.namespaces
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(VarTable::new(name)))
            .clone()
    }
}

/// Vars of one namespace.
#[derive(Debug)]
pub struct VarTable {
    name: String,
    vars: Mutex<HashMap<String, Arc<Var>>>,
}

impl VarTable {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vars: Mutex::new(HashMap::new()),
        }
    }
}

impl Namespace for VarTable {
    fn intern_or_make(&self, name: &str) -> Arc<Var> {
        self.vars
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Var::new(format!("{}/{}", self.name, name))))
            .clone()
    }
}
