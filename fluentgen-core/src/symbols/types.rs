//! Symbolic type references and the type system provider seam.
//!
//! The model builder never talks to a concrete compiler API. Everything it
//! needs to know about types goes through [`TypeRef`] values and the
//! [`TypeSystem`] trait:
//!
//! - `generic_arguments`: positional generic arguments of a type
//! - `substitute_generic_arguments`: rewrite type parameters via a mapping
//! - `is_assignable`: whether a value of one type can stand in for another
//!
//! [`StructuralTypeSystem`] is the default provider. It knows identity,
//! invariant generic arguments and an optional table of nominal supertypes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;

/// Mapping from type parameter name to the type that replaces it.
pub type TypeMapping = BTreeMap<String, TypeRef>;

/// A symbolic type as seen by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// A nominal type, possibly generic: `std::vec::Vec<T>`.
    Named {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        namespace: Option<String>,
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<TypeRef>,
    },
    /// An open generic type parameter: `T`.
    Param { name: String },
}

impl TypeRef {
    /// Create a nominal type.
    pub fn named(namespace: Option<&str>, name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self::Named {
            namespace: namespace.filter(|ns| !ns.is_empty()).map(str::to_string),
            name: name.into(),
            args,
        }
    }

    /// Create a non-generic nominal type without a namespace.
    pub fn simple(name: impl Into<String>) -> Self {
        Self::named(None, name, Vec::new())
    }

    /// Create a type parameter reference.
    pub fn param(name: impl Into<String>) -> Self {
        Self::Param { name: name.into() }
    }

    /// Positional generic arguments (empty for parameters).
    pub fn args(&self) -> &[TypeRef] {
        match self {
            Self::Named { args, .. } => args,
            Self::Param { .. } => &[],
        }
    }

    pub fn is_param(&self) -> bool {
        matches!(self, Self::Param { .. })
    }

    /// Name of the type parameter, if this is one.
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Self::Param { name } => Some(name),
            Self::Named { .. } => None,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::Named { namespace, .. } => namespace.as_deref(),
            Self::Param { .. } => None,
        }
    }

    /// Fully qualified name without generic arguments.
    pub fn qualified_name(&self) -> String {
        match self {
            Self::Named {
                namespace: Some(ns),
                name,
                ..
            } => format!("{}::{}", ns, name),
            Self::Named { name, .. } | Self::Param { name } => name.clone(),
        }
    }

    /// Replace every mapped type parameter, recursively.
    pub fn substitute(&self, mapping: &TypeMapping) -> TypeRef {
        match self {
            Self::Param { name } => mapping.get(name).cloned().unwrap_or_else(|| self.clone()),
            Self::Named {
                namespace,
                name,
                args,
            } => Self::Named {
                namespace: namespace.clone(),
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(mapping)).collect(),
            },
        }
    }

    /// Type parameter names in order of first occurrence (depth-first, left to right).
    pub fn type_params(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_params(&mut out);
        out
    }

    fn collect_params(&self, out: &mut Vec<String>) {
        match self {
            Self::Param { name } => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Self::Named { args, .. } => {
                for arg in args {
                    arg.collect_params(out);
                }
            }
        }
    }

    pub fn mentions_param(&self, param: &str) -> bool {
        match self {
            Self::Param { name } => name == param,
            Self::Named { args, .. } => args.iter().any(|a| a.mentions_param(param)),
        }
    }

    /// Add every namespace referenced by this type (including arguments).
    pub fn collect_namespaces(&self, out: &mut BTreeSet<String>) {
        if let Self::Named {
            namespace, args, ..
        } = self
        {
            if let Some(ns) = namespace {
                out.insert(ns.clone());
            }
            for arg in args {
                arg.collect_namespaces(out);
            }
        }
    }

    /// Erasure used for signature comparison: every type parameter becomes
    /// the same placeholder, so `Foo<T>` and `Foo<U>` compare equal.
    pub fn erased(&self) -> TypeRef {
        match self {
            Self::Param { .. } => Self::param("?"),
            Self::Named {
                namespace,
                name,
                args,
            } => Self::Named {
                namespace: namespace.clone(),
                name: name.clone(),
                args: args.iter().map(TypeRef::erased).collect(),
            },
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Param { name } => write!(f, "{}", name),
            Self::Named { args, .. } => {
                write!(f, "{}", self.qualified_name())?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
        }
    }
}

/// Constraints declared on a type parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeConstraints {
    pub value_type: bool,
    pub reference_type: bool,
    pub constructor: bool,
    pub bounds: Vec<TypeRef>,
}

impl TypeConstraints {
    pub fn is_empty(&self) -> bool {
        !self.value_type && !self.reference_type && !self.constructor && self.bounds.is_empty()
    }

    /// Rewrite bounds through a mapping, keeping the flag constraints.
    pub fn substitute(&self, mapping: &TypeMapping) -> TypeConstraints {
        TypeConstraints {
            bounds: self.bounds.iter().map(|b| b.substitute(mapping)).collect(),
            ..self.clone()
        }
    }
}

/// A declared generic type parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeParameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "TypeConstraints::is_empty")]
    pub constraints: TypeConstraints,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: TypeConstraints::default(),
        }
    }

    pub fn with_constraints(name: impl Into<String>, constraints: TypeConstraints) -> Self {
        Self {
            name: name.into(),
            constraints,
        }
    }
}

/// Symbol introspection used by the model builder.
///
/// Implementations must be shareable across threads: the driver builds
/// independent factory roots in parallel against one provider.
pub trait TypeSystem: Send + Sync {
    /// Can a value of `source` be used where `target` is expected?
    fn is_assignable(&self, source: &TypeRef, target: &TypeRef) -> bool;

    /// Positional generic arguments of `ty`.
    fn generic_arguments<'a>(&self, ty: &'a TypeRef) -> &'a [TypeRef] {
        ty.args()
    }

    /// Replace the mapped type parameters inside `ty`.
    fn substitute_generic_arguments(&self, ty: &TypeRef, mapping: &TypeMapping) -> TypeRef {
        ty.substitute(mapping)
    }
}

/// Default provider: identity plus configured nominal supertypes.
///
/// Generic arguments are invariant. A supertype fact `Dog -> Animal` makes
/// `Dog` assignable to `Animal` (and transitively to whatever `Animal`
/// widens to).
#[derive(Debug, Clone, Default)]
pub struct StructuralTypeSystem {
    supertypes: HashMap<String, Vec<TypeRef>>,
}

impl StructuralTypeSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `subtype` (qualified name) widens to `supertype`.
    pub fn with_supertype(mut self, subtype: impl Into<String>, supertype: TypeRef) -> Self {
        self.add_supertype(subtype, supertype);
        self
    }

    pub fn add_supertype(&mut self, subtype: impl Into<String>, supertype: TypeRef) {
        self.supertypes
            .entry(subtype.into())
            .or_default()
            .push(supertype);
    }

    fn widens_to(&self, source: &TypeRef, target: &TypeRef) -> bool {
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        queue.push_back(source.qualified_name());

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            let Some(supers) = self.supertypes.get(&current) else {
                continue;
            };
            for sup in supers {
                if sup == target {
                    return true;
                }
                queue.push_back(sup.qualified_name());
            }
        }

        false
    }
}

impl TypeSystem for StructuralTypeSystem {
    fn is_assignable(&self, source: &TypeRef, target: &TypeRef) -> bool {
        if source == target {
            return true;
        }
        match (source, target) {
            // An open parameter only accepts itself.
            (_, TypeRef::Param { .. }) | (TypeRef::Param { .. }, _) => false,
            _ => self.widens_to(source, target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec_of(arg: TypeRef) -> TypeRef {
        TypeRef::named(Some("std::vec"), "Vec", vec![arg])
    }

    #[test]
    fn test_display_qualified_generic() {
        let ty = vec_of(TypeRef::param("T"));
        assert_eq!(ty.to_string(), "std::vec::Vec<T>");
        assert_eq!(TypeRef::simple("i32").to_string(), "i32");
    }

    #[test]
    fn test_substitute_nested() {
        let ty = vec_of(vec_of(TypeRef::param("T")));
        let mut mapping = TypeMapping::new();
        mapping.insert("T".to_string(), TypeRef::simple("String"));
        assert_eq!(ty.substitute(&mapping), vec_of(vec_of(TypeRef::simple("String"))));
    }

    #[test]
    fn test_type_params_first_occurrence_order() {
        let ty = TypeRef::named(
            None,
            "Map",
            vec![TypeRef::param("K"), vec_of(TypeRef::param("V")), TypeRef::param("K")],
        );
        assert_eq!(ty.type_params(), vec!["K".to_string(), "V".to_string()]);
    }

    #[test]
    fn test_erased_makes_params_interchangeable() {
        assert_eq!(
            vec_of(TypeRef::param("T")).erased(),
            vec_of(TypeRef::param("U")).erased()
        );
        assert_ne!(
            vec_of(TypeRef::param("T")).erased(),
            vec_of(TypeRef::simple("i32")).erased()
        );
    }

    #[test]
    fn test_collect_namespaces() {
        let ty = TypeRef::named(
            Some("std::collections"),
            "HashMap",
            vec![TypeRef::named(Some("app::model"), "Key", vec![]), TypeRef::param("V")],
        );
        let mut out = BTreeSet::new();
        ty.collect_namespaces(&mut out);
        assert_eq!(
            out.into_iter().collect::<Vec<_>>(),
            vec!["app::model".to_string(), "std::collections".to_string()]
        );
    }

    #[test]
    fn test_structural_assignability() {
        let animal = TypeRef::named(Some("zoo"), "Animal", vec![]);
        let dog = TypeRef::named(Some("zoo"), "Dog", vec![]);
        let puppy = TypeRef::named(Some("zoo"), "Puppy", vec![]);
        let ts = StructuralTypeSystem::new()
            .with_supertype("zoo::Dog", animal.clone())
            .with_supertype("zoo::Puppy", dog.clone());

        assert!(ts.is_assignable(&dog, &dog));
        assert!(ts.is_assignable(&dog, &animal));
        assert!(ts.is_assignable(&puppy, &animal));
        assert!(!ts.is_assignable(&animal, &dog));
        assert!(!ts.is_assignable(&TypeRef::simple("String"), &TypeRef::param("T")));
        assert!(ts.is_assignable(&TypeRef::param("T"), &TypeRef::param("T")));
    }

    #[test]
    fn test_generic_arguments_are_invariant() {
        let ts = StructuralTypeSystem::new()
            .with_supertype("zoo::Dog", TypeRef::named(Some("zoo"), "Animal", vec![]));
        let dogs = vec_of(TypeRef::named(Some("zoo"), "Dog", vec![]));
        let animals = vec_of(TypeRef::named(Some("zoo"), "Animal", vec![]));
        assert!(!ts.is_assignable(&dogs, &animals));
    }
}
