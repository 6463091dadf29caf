//! Diagnostics produced while building a fluent factory model.
//!
//! - [`diagnostic`]: the `Diagnostic` record, codes and severities
//! - [`unreachable`]: declared-but-unreached constructor analysis
//! - [`superseded`]: warnings for alternate methods that lost a collision

pub mod diagnostic;
pub mod superseded;
pub mod unreachable;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use superseded::{IgnoredTemplate, MethodOutcome, SupersededMethodTemplateWarningFactory};
pub use unreachable::UnreachableConstructorAnalyzer;
