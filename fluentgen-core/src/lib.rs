//! fluentgen-core: fluent factory model construction.
//!
//! Given constructors annotated for inclusion in a named factory, this
//! library builds the abstract model of a staged, statically typed builder:
//! entry-point methods on the factory root, intermediate steps that collect
//! constructor arguments, and terminal creation methods. Constructors that
//! agree on a parameter prefix share steps through a prefix trie; where they
//! diverge, the trie branches.
//!
//! Rendering the model as source code and parsing the annotated source are
//! left to consumers. The [`input`] module reads a JSON description of the
//! constructors so the CLI has something to run on.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use fluentgen_core::prelude::*;
//!
//! let factory = FluentModelFactory::new(StructuralTypeSystem::new());
//! let unit = factory.create_fluent_factory_compilation_unit(&root, &contexts);
//! for diagnostic in &unit.diagnostics {
//!     eprintln!("{}", diagnostic);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`symbols`]: input records and the [`symbols::TypeSystem`] provider
//! - [`generics`]: type-parameter normalization and display scopes
//! - [`model`]: trie, steps, methods, compilation unit
//! - [`factory`]: the model builder
//! - [`diagnostics`]: diagnostic codes and the post-build analyzers
//! - [`graph`]: petgraph view of the step chain
//! - [`input`] / [`scan`]: input documents and their discovery
//! - [`builder`]: fluent API over a whole generation run
//!
//! # Cargo Features
//!
//! - `dot` (default): Graphviz export of the step graph
//! - `full`: Enable all optional features

pub mod builder;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod factory;
pub mod generics;
pub mod graph;
pub mod input;
pub mod logging;
pub mod model;
pub mod prelude;
pub mod report;
pub mod scan;
pub mod symbols;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{FluentGenError, FluentGenResult, IoResultExt};

// Builder API
pub use builder::{generate_units, FailedInput, FluentGen, GenerationResult};

// Configuration
pub use config::{load_config, FluentGenConfig, NamingConfig};

// Model construction
pub use factory::{is_valid_identifier, validate_contexts, FluentModelFactory};
pub use model::{FluentFactoryCompilationUnit, FluentMethod, FluentReturn, FluentStep, StepId};

// Diagnostics
pub use diagnostics::{
    Diagnostic, DiagnosticCode, Severity, SupersededMethodTemplateWarningFactory,
    UnreachableConstructorAnalyzer,
};

// Graph
pub use graph::{GraphNode, StepGraph};

// Input
pub use input::{load_document, parse_type_expr, InputDocument, RootGroup};
pub use scan::gather_input_files;

// Logging
pub use logging::{init_structured_logging, log_error, log_event, log_info, log_warn};

// Reporting
pub use report::{format_unit, print_fingerprints, print_json, print_plain};
