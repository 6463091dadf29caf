//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use fluentgen_core::prelude::*;
//! ```

// Errors
pub use crate::error::{FluentGenError, FluentGenResult};

// Input symbols and the type system
pub use crate::symbols::{
    ConstructorContext, ConstructorId, ConstructorSymbol, FactoryRootType, FluentOptions,
    Location, MethodGroup, MethodTemplate, ParameterSymbol, StructuralTypeSystem, TargetType,
    TypeParameter, TypeRef, TypeSystem,
};

// The model builder and its output
pub use crate::factory::FluentModelFactory;
pub use crate::model::{
    FluentFactoryCompilationUnit, FluentMethod, FluentReturn, FluentStep, StepId,
};

// Diagnostics
pub use crate::diagnostics::{Diagnostic, DiagnosticCode, Severity};

// Configuration
pub use crate::config::{load_config, FluentGenConfig};

// Builder API
pub use crate::builder::{FluentGen, GenerationResult};
