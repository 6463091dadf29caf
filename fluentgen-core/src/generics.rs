//! Generic type-parameter reconciliation across independently declared constructors.
//!
//! Two constructors rarely agree on type parameter *names*, so the merge
//! never compares names. Instead:
//!
//! 1. Inside one constructor, every type parameter is renamed to a positional
//!    placeholder (`$0`, `$1`, ...) in order of first occurrence along the
//!    parameter list. `Target<T>(T a)` and `Other<U>(U a)` both become `($0 a)`.
//! 2. Converter templates are bound to a parameter by structural position:
//!    a template type parameter at position *k* of the declared return type
//!    is identified with whatever occupies position *k* of the parameter type.
//! 3. When rendering, a [`TypeParameterScope`] turns placeholders back into
//!    display names, taken from the first constructor that introduced each
//!    placeholder along the current path.

use std::collections::BTreeMap;

use crate::symbols::{
    ParameterSymbol, TypeConstraints, TypeMapping, TypeParameter, TypeRef, TypeSystem,
};

const PLACEHOLDER_PREFIX: char = '$';

/// Placeholder type for position `index`.
pub fn placeholder(index: usize) -> TypeRef {
    TypeRef::param(format!("{}{}", PLACEHOLDER_PREFIX, index))
}

/// Position of a placeholder, if `ty` is one.
pub fn placeholder_index(ty: &TypeRef) -> Option<usize> {
    ty.param_name()
        .and_then(|n| n.strip_prefix(PLACEHOLDER_PREFIX))
        .and_then(|n| n.parse().ok())
}

/// Renaming of one constructor's type parameters to placeholders.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderMap {
    by_name: BTreeMap<String, usize>,
}

impl PlaceholderMap {
    pub fn get(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Original name → placeholder mapping usable with [`TypeRef::substitute`].
    pub fn as_mapping(&self) -> TypeMapping {
        self.by_name
            .iter()
            .map(|(name, idx)| (name.clone(), placeholder(*idx)))
            .collect()
    }

    pub fn to_placeholders(&self, ty: &TypeRef) -> TypeRef {
        ty.substitute(&self.as_mapping())
    }
}

/// A constructor parameter after placeholder normalization.
#[derive(Debug, Clone)]
pub struct NormalizedParameter {
    pub ty: TypeRef,
    /// Placeholders first seen at this parameter, with their original names.
    pub introduced: Vec<(usize, String)>,
}

/// Normalize a constructor's parameter list.
pub fn normalize_parameters(
    parameters: &[ParameterSymbol],
) -> (PlaceholderMap, Vec<NormalizedParameter>) {
    let mut map = PlaceholderMap::default();
    let mut normalized = Vec::with_capacity(parameters.len());

    for param in parameters {
        let mut introduced = Vec::new();
        for name in param.ty.type_params() {
            if map.get(&name).is_none() {
                let idx = map.len();
                map.by_name.insert(name.clone(), idx);
                introduced.push((idx, name));
            }
        }
        normalized.push(NormalizedParameter {
            ty: map.to_placeholders(&param.ty),
            introduced,
        });
    }

    (map, normalized)
}

/// Bind a template's type parameters by structural position against the
/// parameter type it has to produce.
///
/// Positions are those `type_system` reports as generic arguments. Only the
/// template's own parameters are bound. Positions where the two sides
/// disagree structurally are left for the assignability check. Returns
/// `None` when one template parameter would need two different bindings.
pub fn bind_template_parameters(
    type_system: &dyn TypeSystem,
    template_return: &TypeRef,
    template_params: &[TypeParameter],
    target: &TypeRef,
) -> Option<TypeMapping> {
    let mut mapping = TypeMapping::new();
    if unify(type_system, template_return, target, template_params, &mut mapping) {
        Some(mapping)
    } else {
        None
    }
}

fn unify(
    type_system: &dyn TypeSystem,
    template: &TypeRef,
    target: &TypeRef,
    template_params: &[TypeParameter],
    mapping: &mut TypeMapping,
) -> bool {
    match template {
        TypeRef::Param { name } if template_params.iter().any(|p| &p.name == name) => {
            match mapping.get(name) {
                Some(bound) => bound == target,
                None => {
                    mapping.insert(name.clone(), target.clone());
                    true
                }
            }
        }
        TypeRef::Named { .. } => {
            let args = type_system.generic_arguments(template);
            let target_args = type_system.generic_arguments(target);
            if template.qualified_name() != target.qualified_name()
                || args.len() != target_args.len()
            {
                return true;
            }
            args.iter()
                .zip(target_args)
                .all(|(a, b)| unify(type_system, a, b, template_params, mapping))
        }
        TypeRef::Param { .. } => true,
    }
}

/// Drop method type parameters already declared by the enclosing scope.
/// Comparison is by identifier text.
pub fn dedupe_type_parameters(
    method: Vec<TypeParameter>,
    ambient: &[TypeParameter],
) -> Vec<TypeParameter> {
    let mut out: Vec<TypeParameter> = Vec::with_capacity(method.len());
    for param in method {
        let taken = ambient.iter().any(|a| a.name == param.name)
            || out.iter().any(|o| o.name == param.name);
        if !taken {
            out.push(param);
        }
    }
    out
}

/// Display names for the placeholders bound along one trie path.
#[derive(Debug, Clone, Default)]
pub struct TypeParameterScope {
    names: Vec<String>,
    constraints: Vec<TypeConstraints>,
}

impl TypeParameterScope {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Bind the next placeholder. `preferred` is the original name; it gets a
    /// numeric suffix when another placeholder already uses it. Placeholders
    /// below `len()` are already bound and are ignored.
    pub fn bind(&mut self, index: usize, preferred: &str, constraints: TypeConstraints) {
        if index < self.names.len() {
            return;
        }
        let name = self.fresh_name(preferred);
        self.names.push(name);
        self.constraints.push(constraints);
    }

    /// A name not yet used in this scope, derived from `preferred`.
    pub fn fresh_name(&self, preferred: &str) -> String {
        if !self.contains_name(preferred) {
            return preferred.to_string();
        }
        (1..)
            .map(|n| format!("{}{}", preferred, n))
            .find(|candidate| !self.contains_name(candidate))
            .unwrap_or_else(|| preferred.to_string())
    }

    /// Rewrite bound placeholders to display names.
    pub fn display(&self, ty: &TypeRef) -> TypeRef {
        ty.substitute(&self.mapping())
    }

    fn mapping(&self) -> TypeMapping {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                (
                    format!("{}{}", PLACEHOLDER_PREFIX, i),
                    TypeRef::param(name.clone()),
                )
            })
            .collect()
    }

    /// Declarations for every bound placeholder.
    pub fn declarations(&self) -> Vec<TypeParameter> {
        self.declarations_from(0)
    }

    /// Declarations for placeholders bound at or after `start`.
    pub fn declarations_from(&self, start: usize) -> Vec<TypeParameter> {
        let mapping = self.mapping();
        self.names
            .iter()
            .zip(&self.constraints)
            .skip(start)
            .map(|(name, c)| TypeParameter::with_constraints(name.clone(), c.substitute(&mapping)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::StructuralTypeSystem;

    /// Treats the first argument of every generic type as a non-positional tag.
    struct TaggedGenerics;

    impl TypeSystem for TaggedGenerics {
        fn is_assignable(&self, source: &TypeRef, target: &TypeRef) -> bool {
            source == target
        }

        fn generic_arguments<'a>(&self, ty: &'a TypeRef) -> &'a [TypeRef] {
            ty.args().get(1..).unwrap_or(&[])
        }
    }

    fn list_of(arg: TypeRef) -> TypeRef {
        TypeRef::named(None, "List", vec![arg])
    }

    #[test]
    fn test_normalization_is_name_independent() {
        let a = vec![ParameterSymbol::new("a", TypeRef::param("T"))];
        let b = vec![ParameterSymbol::new("a", TypeRef::param("T1"))];
        let (_, na) = normalize_parameters(&a);
        let (_, nb) = normalize_parameters(&b);
        assert_eq!(na[0].ty, nb[0].ty);
        assert_eq!(na[0].ty, placeholder(0));
    }

    #[test]
    fn test_normalization_tracks_position() {
        // (T a, U b) vs (T a, T b): second parameter differs structurally
        let two = vec![
            ParameterSymbol::new("a", TypeRef::param("T")),
            ParameterSymbol::new("b", TypeRef::param("U")),
        ];
        let one = vec![
            ParameterSymbol::new("a", TypeRef::param("T")),
            ParameterSymbol::new("b", TypeRef::param("T")),
        ];
        let (map, n_two) = normalize_parameters(&two);
        let (_, n_one) = normalize_parameters(&one);
        assert_eq!(map.len(), 2);
        assert_eq!(n_two[0].ty, n_one[0].ty);
        assert_ne!(n_two[1].ty, n_one[1].ty);
        assert_eq!(n_two[1].introduced, vec![(1, "U".to_string())]);
        assert!(n_one[1].introduced.is_empty());
    }

    #[test]
    fn test_bind_template_by_position() {
        let template_params = vec![TypeParameter::new("TItem")];
        let template_return = list_of(TypeRef::param("TItem"));
        let target = list_of(TypeRef::simple("i32"));
        let mapping = bind_template_parameters(
            &StructuralTypeSystem::new(),
            &template_return,
            &template_params,
            &target,
        )
        .expect("binding succeeds");
        assert_eq!(mapping.get("TItem"), Some(&TypeRef::simple("i32")));
    }

    #[test]
    fn test_bind_template_conflicting_positions() {
        let template_params = vec![TypeParameter::new("K")];
        let template_return =
            TypeRef::named(None, "Pair", vec![TypeRef::param("K"), TypeRef::param("K")]);
        let target = TypeRef::named(
            None,
            "Pair",
            vec![TypeRef::simple("i32"), TypeRef::simple("String")],
        );
        assert!(bind_template_parameters(
            &StructuralTypeSystem::new(),
            &template_return,
            &template_params,
            &target
        )
        .is_none());
    }

    #[test]
    fn test_bind_template_uses_provider_positions() {
        // Tagged<TItem, TItem> against Tagged<String, i32>: the provider hides
        // the first position, so only `i32` is bound.
        let template_params = vec![TypeParameter::new("TItem")];
        let tagged = |a: TypeRef, b: TypeRef| TypeRef::named(None, "Tagged", vec![a, b]);
        let template_return = tagged(TypeRef::param("TItem"), TypeRef::param("TItem"));
        let target = tagged(TypeRef::simple("String"), TypeRef::simple("i32"));

        assert!(bind_template_parameters(
            &StructuralTypeSystem::new(),
            &template_return,
            &template_params,
            &target
        )
        .is_none());
        let mapping =
            bind_template_parameters(&TaggedGenerics, &template_return, &template_params, &target)
                .expect("binding succeeds");
        assert_eq!(mapping.get("TItem"), Some(&TypeRef::simple("i32")));
    }

    #[test]
    fn test_bind_template_ignores_foreign_params() {
        // `T` is not a template parameter, so it is not bound.
        let mapping = bind_template_parameters(
            &StructuralTypeSystem::new(),
            &list_of(TypeRef::param("T")),
            &[],
            &list_of(TypeRef::simple("i32")),
        )
        .expect("binding succeeds");
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_scope_suffixes_clashing_names() {
        let mut scope = TypeParameterScope::default();
        scope.bind(0, "T", TypeConstraints::default());
        scope.bind(1, "T", TypeConstraints::default());
        scope.bind(1, "X", TypeConstraints::default());
        assert_eq!(scope.names(), &["T".to_string(), "T1".to_string()]);
        assert_eq!(
            scope.display(&list_of(placeholder(1))),
            list_of(TypeRef::param("T1"))
        );
    }

    #[test]
    fn test_declarations_rewrite_bounds() {
        let mut scope = TypeParameterScope::default();
        scope.bind(0, "T", TypeConstraints::default());
        scope.bind(
            1,
            "U",
            TypeConstraints {
                bounds: vec![list_of(placeholder(0))],
                ..TypeConstraints::default()
            },
        );
        let decls = scope.declarations_from(1);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].constraints.bounds, vec![list_of(TypeRef::param("T"))]);
    }

    #[test]
    fn test_dedupe_against_ambient() {
        let ambient = vec![TypeParameter::new("T")];
        let method = vec![TypeParameter::new("T"), TypeParameter::new("U"), TypeParameter::new("U")];
        let out = dedupe_type_parameters(method, &ambient);
        assert_eq!(out, vec![TypeParameter::new("U")]);
    }
}
