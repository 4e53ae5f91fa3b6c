//! Core value, type and error model for the Loki VM.
//!
//! This crate provides the foundational types shared by the bytecode system,
//! the interpreter and the trampoline.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of VM values
//! - [`TypeRegistry`] / [`TypeId`] - Single-rooted type tree and subtype test
//! - [`Var`] - Mutable global binding cell
//! - [`CodeObject`] / [`Closure`] - Callable code
//! - [`VmError`] / [`ErrorKind`] - Error taxonomy
//! - [`numbers`] - ADD/EQ primitives
//!
//! # Examples
//!
//! ```
//! use core_types::{define_type, is_a, Instance, TypeId, Value};
//! use std::sync::Arc;
//!
//! let shape = define_type("doc.Shape", None).unwrap();
//! let circle = define_type("doc.Circle", Some(shape)).unwrap();
//! let c = Value::Object(Arc::new(Instance::new(circle, vec![])));
//!
//! assert!(is_a(&c, shape));
//! assert!(is_a(&c, TypeId::OBJECT));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod code;
mod error;
mod namespace;
pub mod numbers;
mod types;
mod value;
mod var;

pub use code::{Closure, CodeObject};
pub use error::{ErrorKind, ErrorLocation, InterpretError, VmError, VmResult};
pub use namespace::{Namespace, NamespaceTable, Namespaces, VarTable};
pub use types::{
    define_type, get_type_by_name, is_a, register_type, registry, set_namespaces, type_name,
    TypeId, TypeRecord, TypeRegistry,
};
pub use value::{Instance, NativeObject, Value};
pub use var::Var;
