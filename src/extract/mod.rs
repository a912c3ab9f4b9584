//! Symbol reference extraction.
//!
//! A pure pass over one parsed [`ClassUnit`]: every symbolic name the unit
//! can reference is collected, filtered against a caller-supplied universe,
//! and the unit's own name is excluded. Reflective call sites are recorded
//! separately - they resolve classes at runtime, so they can never become
//! ordinary edges but must not be lost either.

use crate::classfile::{ClassUnit, Instruction, QualifiedName, TypeDescriptor};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

// The two reflective call shapes recognized statically.
const CLASS_OWNER: &str = "java.lang.Class";
const FOR_NAME: &str = "forName";
const REFLECT_METHOD_OWNER: &str = "java.lang.reflect.Method";
const REFLECT_INVOKE: &str = "invoke";

/// Kind of reflective call observed in an instruction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionKind {
    /// A type resolved from a runtime string (`Class.forName`).
    TypeByName,
    /// A member invoked through the reflection API (`Method.invoke`).
    ReflectiveInvoke,
}

impl ReflectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReflectionKind::TypeByName => "type-by-name",
            ReflectionKind::ReflectiveInvoke => "reflective-invoke",
        }
    }
}

impl fmt::Display for ReflectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reflective call site. Static analysis cannot see which classes the
/// site actually touches, so any flag makes "class X is unused" verdicts
/// unsound for the whole archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReflectionSite {
    /// Unit containing the call.
    pub unit: QualifiedName,
    /// Enclosing method name.
    pub method: String,
    pub kind: ReflectionKind,
}

/// Result of extracting one unit.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Universe members the unit references, excluding itself.
    pub references: BTreeSet<QualifiedName>,
    pub reflection: Vec<ReflectionSite>,
}

/// Stateless extractor parameterized by the universe of relevant names.
///
/// Dependency analysis and usage analysis are the same walk with different
/// universes, so there is exactly one implementation of it.
pub struct ReferenceExtractor<'a> {
    universe: &'a BTreeSet<QualifiedName>,
}

impl<'a> ReferenceExtractor<'a> {
    pub fn new(universe: &'a BTreeSet<QualifiedName>) -> Self {
        Self { universe }
    }

    /// Collect every universe member the unit references.
    pub fn extract(&self, unit: &ClassUnit) -> Extraction {
        let mut out = Extraction::default();

        if let Some(super_name) = &unit.super_name {
            self.add_name(unit, super_name, &mut out.references);
        }
        for interface in &unit.interfaces {
            self.add_name(unit, interface, &mut out.references);
        }
        for field in &unit.fields {
            self.add_type(unit, &field.descriptor, &mut out.references);
        }

        for method in &unit.methods {
            for parameter in &method.descriptor.parameters {
                self.add_type(unit, parameter, &mut out.references);
            }
            self.add_type(unit, &method.descriptor.return_type, &mut out.references);
            for exception in &method.exceptions {
                self.add_name(unit, exception, &mut out.references);
            }

            let Some(code) = &method.code else { continue };
            for instruction in code {
                self.extract_instruction(unit, method, instruction, &mut out);
            }
        }

        out
    }

    fn extract_instruction(
        &self,
        unit: &ClassUnit,
        method: &crate::classfile::Method,
        instruction: &Instruction,
        out: &mut Extraction,
    ) {
        match instruction {
            Instruction::Field {
                owner, descriptor, ..
            } => {
                self.add_name(unit, owner, &mut out.references);
                self.add_type(unit, descriptor, &mut out.references);
            }
            Instruction::Invoke {
                owner,
                name,
                descriptor,
                ..
            } => {
                self.add_type(unit, owner, &mut out.references);
                for parameter in &descriptor.parameters {
                    self.add_type(unit, parameter, &mut out.references);
                }
                self.add_type(unit, &descriptor.return_type, &mut out.references);

                if let Some(kind) = reflective_call(owner, name) {
                    out.reflection.push(ReflectionSite {
                        unit: unit.name.clone(),
                        method: method.name.clone(),
                        kind,
                    });
                }
            }
            Instruction::Type { target, .. } => {
                self.add_type(unit, target, &mut out.references);
            }
            Instruction::LoadType { descriptor } => {
                self.add_type(unit, descriptor, &mut out.references);
            }
            Instruction::Other { .. } => {}
        }
    }

    /// Add a name if it is in the universe and not the unit itself.
    fn add_name(&self, unit: &ClassUnit, name: &QualifiedName, refs: &mut BTreeSet<QualifiedName>) {
        if name != &unit.name && self.universe.contains(name) {
            refs.insert(name.clone());
        }
    }

    /// Unwrap arrays and add the base object reference, if any.
    fn add_type(
        &self,
        unit: &ClassUnit,
        descriptor: &TypeDescriptor,
        refs: &mut BTreeSet<QualifiedName>,
    ) {
        if let Some(name) = descriptor.object_name() {
            self.add_name(unit, name, refs);
        }
    }
}

/// Match the hardcoded reflective call shapes on an invocation.
fn reflective_call(owner: &TypeDescriptor, name: &str) -> Option<ReflectionKind> {
    let owner = owner.object_name()?;
    match (owner.as_str(), name) {
        (CLASS_OWNER, FOR_NAME) => Some(ReflectionKind::TypeByName),
        (REFLECT_METHOD_OWNER, REFLECT_INVOKE) => Some(ReflectionKind::ReflectiveInvoke),
        _ => None,
    }
}
