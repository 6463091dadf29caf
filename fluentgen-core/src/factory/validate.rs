//! Configuration checks run before any trie is built.
//!
//! Any error here suppresses generation for the whole root.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::symbols::{ConstructorContext, FactoryRootType};

/// Pre-compiled identifier pattern.
fn identifier_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // SAFETY: This regex pattern is hardcoded and covered by tests.
    REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Hardcoded regex pattern is valid")
    })
}

pub fn is_valid_identifier(name: &str) -> bool {
    name != "_" && identifier_regex().is_match(name)
}

/// Validate every context declared against `root`.
pub fn validate_contexts(root: &FactoryRootType, contexts: &[ConstructorContext]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    // 1. Root must carry the factory marker
    if !root.has_factory_marker {
        for ctx in contexts {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::TargetTypeMissingFactoryMarker,
                ctx.attribute_location.clone(),
                vec![root.qualified_name(), ctx.constructor.display_signature()],
            ));
        }
    }

    // 2. Create method names: valid, not combined with suppression, unique per type
    let mut seen: HashSet<(String, String)> = HashSet::new();
    for ctx in contexts {
        let display = ctx.constructor.display_signature();
        let name = match (&ctx.create_method_name, ctx.options.custom_create_method_name) {
            (Some(name), _) => name,
            (None, true) => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticCode::InvalidCreateMethodName,
                    ctx.attribute_location.clone(),
                    vec![String::new(), display],
                ));
                continue;
            }
            (None, false) => continue,
        };

        if !is_valid_identifier(name) {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::InvalidCreateMethodName,
                ctx.attribute_location.clone(),
                vec![name.clone(), display.clone()],
            ));
        }

        if ctx.options.no_create_method {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::CreateMethodNameWithSuppressConflict,
                ctx.attribute_location.clone(),
                vec![display.clone(), name.clone()],
            ));
        }

        let owner = ctx.target().qualified_name();
        if !seen.insert((owner.clone(), name.clone())) {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::DuplicateCreateMethodName,
                ctx.attribute_location.clone(),
                vec![name.clone(), owner],
            ));
        }
    }

    diagnostics
}
