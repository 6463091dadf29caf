//! Intermediate staging types.

use serde::Serialize;
use std::fmt;

use crate::symbols::{ConstructorId, TypeParameter, TypeRef};

use super::metadata::ValueStorage;
use super::method::FluentMethod;

/// Index of a step in [`super::FluentFactoryCompilationUnit::steps`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StepId(pub usize);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step#{}", self.0)
    }
}

/// A constructor argument already collected when a step is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnownParameter {
    pub name: String,
    pub ty: TypeRef,
    pub storage: ValueStorage,
}

/// A synthesized step, unique per known-parameter sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegularFluentStep {
    pub index: usize,
    pub name: String,
    pub known_parameters: Vec<KnownParameter>,
    pub type_parameters: Vec<TypeParameter>,
    pub methods: Vec<FluentMethod>,
    /// Representative constructor at this point of the chain.
    pub constructor: ConstructorId,
    pub candidate_constructors: Vec<ConstructorId>,
}

/// A user type reused as its own step.
///
/// Calling the method that leads here already constructs the target; the
/// methods below are generated onto that type and read the known values
/// back through its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExistingTypeFluentStep {
    pub index: usize,
    pub target: TypeRef,
    pub constructor: ConstructorId,
    pub known_parameters: Vec<KnownParameter>,
    pub type_parameters: Vec<TypeParameter>,
    pub methods: Vec<FluentMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FluentStep {
    Regular(RegularFluentStep),
    ExistingType(ExistingTypeFluentStep),
}

impl FluentStep {
    pub fn index(&self) -> usize {
        match self {
            Self::Regular(s) => s.index,
            Self::ExistingType(s) => s.index,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Regular(s) => s.name.clone(),
            Self::ExistingType(s) => s.target.to_string(),
        }
    }

    pub fn methods(&self) -> &[FluentMethod] {
        match self {
            Self::Regular(s) => &s.methods,
            Self::ExistingType(s) => &s.methods,
        }
    }

    pub fn methods_mut(&mut self) -> &mut Vec<FluentMethod> {
        match self {
            Self::Regular(s) => &mut s.methods,
            Self::ExistingType(s) => &mut s.methods,
        }
    }

    pub fn known_parameters(&self) -> &[KnownParameter] {
        match self {
            Self::Regular(s) => &s.known_parameters,
            Self::ExistingType(s) => &s.known_parameters,
        }
    }

    pub fn type_parameters(&self) -> &[TypeParameter] {
        match self {
            Self::Regular(s) => &s.type_parameters,
            Self::ExistingType(s) => &s.type_parameters,
        }
    }

    /// Constructor produced on arrival at an existing-type step.
    pub fn arrival_constructor(&self) -> Option<ConstructorId> {
        match self {
            Self::Regular(_) => None,
            Self::ExistingType(s) => Some(s.constructor),
        }
    }

    pub(crate) fn assign_index(&mut self, index: usize, name_prefix: &str, root_name: &str) {
        match self {
            Self::Regular(s) => {
                s.index = index;
                s.name = format!("{}_{}__{}", name_prefix, index, root_name);
            }
            Self::ExistingType(s) => s.index = index,
        }
    }
}
