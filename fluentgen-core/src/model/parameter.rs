//! Value-equality wrappers used as trie keys.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::symbols::{ConstructorId, TypeRef};

/// A placeholder-normalized parameter type.
///
/// Two types are the same `FluentType` when they are structurally identical
/// after generic normalization, whatever the original parameter names were.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FluentType(TypeRef);

impl FluentType {
    pub fn new(normalized: TypeRef) -> Self {
        Self(normalized)
    }

    pub fn as_type_ref(&self) -> &TypeRef {
        &self.0
    }
}

impl fmt::Display for FluentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A constructor parameter together with every method name that could
/// supply it.
///
/// Equality is the trie's branching rule: same [`FluentType`] and at least
/// one shared method name. The relation is not transitive and a key with no
/// names equals nothing (not even itself), so it deliberately implements only
/// `PartialEq`.
#[derive(Debug, Clone, Serialize)]
pub struct FluentMethodParameter {
    pub constructor: ConstructorId,
    /// Position in the constructor's parameter list.
    pub index: usize,
    pub name: String,
    pub ty: FluentType,
    pub method_names: BTreeSet<String>,
}

impl FluentMethodParameter {
    pub fn new(
        constructor: ConstructorId,
        index: usize,
        name: impl Into<String>,
        ty: FluentType,
        method_names: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            constructor,
            index,
            name: name.into(),
            ty,
            method_names: method_names.into_iter().collect(),
        }
    }

    pub fn overlaps(&self, other: &FluentMethodParameter) -> bool {
        !self.method_names.is_disjoint(&other.method_names)
    }
}

impl PartialEq for FluentMethodParameter {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.overlaps(other)
    }
}
