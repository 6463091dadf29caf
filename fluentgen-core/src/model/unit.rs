//! The finished model handed to a renderer.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

use crate::diagnostics::Diagnostic;
use crate::error::{FluentGenError, FluentGenResult};
use crate::symbols::{
    Accessibility, ConstructorId, FactoryRootType, Location, TypeKind, TypeParameter, TypeRef,
};

use super::method::FluentMethod;
use super::step::{FluentStep, StepId};

/// A constructor as listed in the unit, for cross references by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstructorSummary {
    pub id: ConstructorId,
    pub display: String,
    pub target: TypeRef,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FluentFactoryCompilationUnit {
    pub root: TypeRef,
    pub root_name: String,
    pub namespace: Option<String>,
    pub type_parameters: Vec<TypeParameter>,
    pub is_static: bool,
    pub is_record: bool,
    pub kind: TypeKind,
    pub accessibility: Accessibility,
    pub usings: BTreeSet<String>,
    /// Methods attached directly to the root.
    pub methods: Vec<FluentMethod>,
    /// Every live step, indexed by [`StepId`].
    pub steps: Vec<FluentStep>,
    pub constructors: Vec<ConstructorSummary>,
    pub diagnostics: Vec<Diagnostic>,
}

impl FluentFactoryCompilationUnit {
    /// A unit with structural information only and no generated members.
    pub fn empty(root: &FactoryRootType) -> Self {
        Self {
            root: root.as_type_ref(),
            root_name: root.name.clone(),
            namespace: root.namespace.clone(),
            type_parameters: root.type_parameters.clone(),
            is_static: root.is_static,
            is_record: root.is_record,
            kind: root.kind,
            accessibility: root.accessibility,
            usings: BTreeSet::new(),
            methods: Vec::new(),
            steps: Vec::new(),
            constructors: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// A unit that carries only diagnostics (failed validation).
    pub fn diagnostics_only(root: &FactoryRootType, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            diagnostics,
            ..Self::empty(root)
        }
    }

    pub fn step(&self, id: StepId) -> Option<&FluentStep> {
        self.steps.get(id.0)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Every method in the unit: root methods first, then steps in index order.
    pub fn all_methods(&self) -> impl Iterator<Item = &FluentMethod> {
        self.methods
            .iter()
            .chain(self.steps.iter().flat_map(|s| s.methods().iter()))
    }

    pub fn constructor(&self, id: ConstructorId) -> Option<&ConstructorSummary> {
        self.constructors.iter().find(|c| c.id == id)
    }

    /// SHA-256 over the canonical JSON form of the unit.
    pub fn fingerprint(&self) -> FluentGenResult<String> {
        let bytes = serde_json::to_vec(self).map_err(|e| {
            FluentGenError::internal(format!("cannot serialize unit {}: {}", self.root, e))
        })?;
        let mut sha = Sha256::new();
        sha.update(&bytes);
        Ok(format!("{:x}", sha.finalize()))
    }
}
