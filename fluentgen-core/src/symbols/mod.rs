//! Symbolic input model: types, type parameters and annotated constructors.

pub mod symbol;
pub mod types;

pub use symbol::{
    Accessibility, ConstructorContext, ConstructorId, ConstructorSymbol, Documentation,
    FactoryRootType, FluentOptions, Location, MethodGroup, MethodTemplate, ParameterSymbol,
    TargetType, TemplateParameter, TypeKind,
};
pub use types::{
    StructuralTypeSystem, TypeConstraints, TypeMapping, TypeParameter, TypeRef, TypeSystem,
};
