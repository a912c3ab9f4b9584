//! Class-file decoding.
//!
//! Everything in this module works on the raw bytes of a single compiled
//! class. The parser produces a fully structured [`ClassUnit`] in one pass;
//! nothing downstream ever touches the binary format or the internal
//! slash-separated name encoding again.

mod code;
mod descriptor;
mod parser;
mod pool;
mod reader;

pub use code::Instruction;
pub use descriptor::{MethodDescriptor, Primitive, TypeDescriptor};
pub use parser::{parse_class, ParseOutput};

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

/// Errors that make a single class file undecodable.
///
/// Any of these is fatal for the unit that produced it and for that unit
/// only; a scan records the failure and moves on.
#[derive(Debug, Error)]
pub enum ClassParseError {
    #[error("unexpected end of class file")]
    UnexpectedEof,
    #[error("invalid class file magic header")]
    InvalidMagic,
    #[error("unsupported class file version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },
    #[error("unsupported constant pool tag {tag}")]
    UnsupportedConstant { tag: u8 },
    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex { index: u16 },
    #[error("invalid UTF-8 string in constant pool: {0}")]
    Utf8Decode(#[from] std::string::FromUtf8Error),
    #[error("malformed descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("malformed code attribute: {0}")]
    MalformedCode(&'static str),
}

/// Non-fatal oddities found while decoding a unit.
///
/// The unit is still produced; the offending record is skipped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseWarning {
    #[error("unrecognized attribute '{name}' in {location}")]
    UnsupportedAttribute { location: String, name: String },
    #[error("unrecognized opcode 0x{opcode:02x} in method '{method}'")]
    UnsupportedOpcode { method: String, opcode: u8 },
}

/// Canonical dot-separated class name (`com.example.Foo`).
///
/// The parser converts the internal slash form at the decoding boundary;
/// every map and set in the crate is keyed by this type. `Ord` keeps all
/// exported collections deterministically sorted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedName(String);

impl QualifiedName {
    /// Wrap an already dot-separated name.
    pub fn new(dotted: impl Into<String>) -> Self {
        Self(dotted.into())
    }

    /// Convert from the internal slash form (`com/example/Foo`).
    pub fn from_internal(internal: &str) -> Self {
        Self(internal.replace('/', "."))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for QualifiedName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A fully decoded compiled unit.
#[derive(Debug, Clone)]
pub struct ClassUnit {
    /// The unit's own qualified name.
    pub name: QualifiedName,
    /// Superclass name; `None` only for the root of the hierarchy.
    pub super_name: Option<QualifiedName>,
    /// Implemented interface names.
    pub interfaces: Vec<QualifiedName>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}

/// A field declaration: name plus decoded type descriptor.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub descriptor: TypeDescriptor,
}

/// A method declaration.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub descriptor: MethodDescriptor,
    /// Declared (checked) exception class names.
    pub exceptions: Vec<QualifiedName>,
    /// Decoded instruction stream, absent for abstract/native methods.
    pub code: Option<Vec<Instruction>>,
}
