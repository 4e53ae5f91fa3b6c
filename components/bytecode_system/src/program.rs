//! JSON program loader
//!
//! A program is a set of named functions, one of which is the entry point:
//!
//! ```json
//! {
//!   "entry": "main",
//!   "functions": [
//!     { "name": "main",
//!       "constants": [ { "type": "int", "value": 40 }, { "type": "int", "value": 2 } ],
//!       "code": [ "LOAD_CONST 0", "LOAD_CONST 1", "ADD", "RETURN" ] }
//!   ]
//! }
//! ```
//!
//! Code lines are `MNEMONIC`, `MNEMONIC operand`, `JMP @label` or `@label:`.
//! Blank lines and lines starting with `;` are ignored.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use core_types::{get_type_by_name, CodeObject, Instance, NamespaceTable, Value, VmError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::builder::{CodeBuilder, Label};
use crate::opcode::Opcode;

/// Errors raised while loading a program
#[derive(Debug, Error)]
pub enum ProgramError {
    /// The text is not a well-formed program document
    #[error("invalid program JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The assembled code was rejected
    #[error(transparent)]
    Vm(#[from] VmError),
    /// A function constant or the entry names a missing function
    #[error("unknown function {0}")]
    UnknownFunction(String),
    /// Two functions share a name
    #[error("function {0} is defined twice")]
    DuplicateFunction(String),
    /// Function constants form a cycle
    #[error("function {0} refers back to itself through its constants")]
    CyclicReference(String),
    /// A type constant names no registered type
    #[error("unknown type {0}")]
    UnknownType(String),
    /// A code line could not be assembled
    #[error("{function}:{line}: {message}")]
    Syntax {
        /// Function being assembled
        function: String,
        /// 1-based code line
        line: usize,
        /// What went wrong
        message: String,
    },
}

/// Serialized form of a whole program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSpec {
    /// Name of the function to run
    pub entry: String,
    /// All functions of the program
    pub functions: Vec<FunctionSpec>,
}

/// Serialized form of one function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Function name, unique within the program
    pub name: String,
    /// Constant pool, indexed by LOAD_CONST
    #[serde(default)]
    pub constants: Vec<ConstantSpec>,
    /// Assembler lines
    pub code: Vec<String>,
}

/// Serialized constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ConstantSpec {
    /// `nil`
    Nil,
    /// Boolean
    Bool(bool),
    /// Fixed-width integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    Str(String),
    /// Code object of another function in the program
    Function(String),
    /// Var interned as `namespace/name`
    Var(String),
    /// Registered type, by qualified name
    Type(String),
    /// Handler token; equal labels within a program share one token
    Token(String),
}

/// A loaded program
#[derive(Debug)]
pub struct Program {
    entry: Arc<CodeObject>,
    functions: HashMap<String, Arc<CodeObject>>,
    tokens: HashMap<String, Value>,
    namespaces: Arc<NamespaceTable>,
}

impl Program {
    /// Parse and assemble a program with a fresh namespace table
    pub fn from_json(src: &str) -> Result<Self, ProgramError> {
        Self::from_json_in(src, Arc::new(NamespaceTable::new()))
    }

    /// Parse and assemble a program, interning vars in `namespaces`
    pub fn from_json_in(src: &str, namespaces: Arc<NamespaceTable>) -> Result<Self, ProgramError> {
        let spec: ProgramSpec = serde_json::from_str(src)?;
        Self::from_spec(&spec, namespaces)
    }

    /// Assemble an already parsed program
    pub fn from_spec(
        spec: &ProgramSpec,
        namespaces: Arc<NamespaceTable>,
    ) -> Result<Self, ProgramError> {
        let mut specs = HashMap::new();
        for function in &spec.functions {
            if specs.insert(function.name.as_str(), function).is_some() {
                return Err(ProgramError::DuplicateFunction(function.name.clone()));
            }
        }
        if !specs.contains_key(spec.entry.as_str()) {
            return Err(ProgramError::UnknownFunction(spec.entry.clone()));
        }

        let mut loader = Loader {
            specs,
            built: HashMap::new(),
            in_progress: HashSet::new(),
            tokens: HashMap::new(),
            namespaces: &namespaces,
        };
        for function in &spec.functions {
            loader.build(&function.name)?;
        }
        let Loader { built, tokens, .. } = loader;

        let entry = built
            .get(&spec.entry)
            .cloned()
            .ok_or_else(|| ProgramError::UnknownFunction(spec.entry.clone()))?;
        debug!(
            entry = %spec.entry,
            functions = built.len(),
            tokens = tokens.len(),
            "program loaded"
        );
        Ok(Self {
            entry,
            functions: built,
            tokens,
            namespaces,
        })
    }

    /// The entry function
    pub fn entry(&self) -> &Arc<CodeObject> {
        &self.entry
    }

    /// A function by name
    pub fn function(&self, name: &str) -> Option<&Arc<CodeObject>> {
        self.functions.get(name)
    }

    /// All function names, sorted
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The handler token created for `label`, if the program uses one
    pub fn token(&self, label: &str) -> Option<&Value> {
        self.tokens.get(label)
    }

    /// Namespace table holding the program's vars
    pub fn namespaces(&self) -> &Arc<NamespaceTable> {
        &self.namespaces
    }
}

struct Loader<'a> {
    specs: HashMap<&'a str, &'a FunctionSpec>,
    built: HashMap<String, Arc<CodeObject>>,
    in_progress: HashSet<String>,
    tokens: HashMap<String, Value>,
    namespaces: &'a NamespaceTable,
}

impl Loader<'_> {
    fn build(&mut self, name: &str) -> Result<Arc<CodeObject>, ProgramError> {
        if let Some(code) = self.built.get(name) {
            return Ok(code.clone());
        }
        if !self.in_progress.insert(name.to_string()) {
            return Err(ProgramError::CyclicReference(name.to_string()));
        }
        let spec = *self
            .specs
            .get(name)
            .ok_or_else(|| ProgramError::UnknownFunction(name.to_string()))?;

        let mut consts = Vec::with_capacity(spec.constants.len());
        for constant in &spec.constants {
            consts.push(self.constant(constant)?);
        }
        let code = assemble(&spec.name, &spec.code, consts)?;

        self.in_progress.remove(name);
        self.built.insert(name.to_string(), code.clone());
        Ok(code)
    }

    fn constant(&mut self, spec: &ConstantSpec) -> Result<Value, ProgramError> {
        Ok(match spec {
            ConstantSpec::Nil => Value::Nil,
            ConstantSpec::Bool(b) => Value::Bool(*b),
            ConstantSpec::Int(n) => Value::Int(*n),
            ConstantSpec::Float(n) => Value::Float(*n),
            ConstantSpec::Str(s) => Value::from(s.as_str()),
            ConstantSpec::Function(name) => Value::Code(self.build(name)?),
            ConstantSpec::Var(qualified) => Value::Var(self.namespaces.resolve(qualified)),
            ConstantSpec::Type(name) => get_type_by_name(name)
                .map(Value::Type)
                .ok_or_else(|| ProgramError::UnknownType(name.clone()))?,
            ConstantSpec::Token(label) => self
                .tokens
                .entry(label.clone())
                .or_insert_with(|| Instance::handler_token(label))
                .clone(),
        })
    }
}

/// Assemble code lines into a code object with the given constants.
pub fn assemble(
    name: &str,
    lines: &[String],
    consts: Vec<Value>,
) -> Result<Arc<CodeObject>, ProgramError> {
    let mut builder = CodeBuilder::new(name);
    for value in consts {
        builder.add_constant(value);
    }
    let mut labels: HashMap<&str, Label> = HashMap::new();

    for (idx, line) in lines.iter().enumerate() {
        let syntax = |message: String| ProgramError::Syntax {
            function: name.to_string(),
            line: idx + 1,
            message,
        };
        let text = line.trim();
        if text.is_empty() || text.starts_with(';') {
            continue;
        }

        if let Some(label) = text.strip_prefix('@').and_then(|l| l.strip_suffix(':')) {
            let label = *labels.entry(label).or_insert_with(|| builder.new_label());
            builder.bind(label);
            continue;
        }

        let mut parts = text.split_whitespace();
        let Some(mnemonic) = parts.next() else {
            continue;
        };
        let op = Opcode::from_mnemonic(mnemonic)
            .ok_or_else(|| syntax(format!("unknown mnemonic {}", mnemonic)))?;
        let operand = parts.next();
        if parts.next().is_some() {
            return Err(syntax(format!("{} takes at most one operand", op)));
        }

        match (op.has_operand(), operand) {
            (false, None) => {
                builder.emit(op);
            }
            (false, Some(_)) => return Err(syntax(format!("{} takes no operand", op))),
            (true, None) => return Err(syntax(format!("{} requires an operand", op))),
            (true, Some(arg)) => {
                if let Some(target) = arg.strip_prefix('@') {
                    if !op.is_jump() {
                        return Err(syntax(format!("{} cannot take a label", op)));
                    }
                    let label = *labels.entry(target).or_insert_with(|| builder.new_label());
                    builder.jump_to(op, label);
                } else if op.is_jump() {
                    let delta: i32 = arg
                        .parse()
                        .map_err(|_| syntax(format!("bad jump delta {}", arg)))?;
                    builder.emit_jump(op, delta);
                } else {
                    let operand: u32 = arg
                        .parse()
                        .map_err(|_| syntax(format!("bad operand {}", arg)))?;
                    builder.emit_with(op, operand);
                }
            }
        }
    }

    Ok(builder.build()?)
}
