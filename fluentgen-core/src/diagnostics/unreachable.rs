//! Unreachable fluent constructor detection.
//!
//! A plain set difference: declared constructors minus the ones some
//! surviving method path terminates in.

use std::collections::{BTreeMap, BTreeSet};

use crate::symbols::{ConstructorId, Location};

use super::diagnostic::{Diagnostic, DiagnosticCode};

#[derive(Debug, Clone)]
struct DeclaredConstructor {
    display: String,
    location: Location,
    attribute_location: Option<Location>,
}

#[derive(Debug, Clone, Default)]
pub struct UnreachableConstructorAnalyzer {
    declared: BTreeMap<ConstructorId, DeclaredConstructor>,
    reached: BTreeSet<ConstructorId>,
}

impl UnreachableConstructorAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor declared at `location`. The attribute that
    /// made it fluent, when known, becomes a secondary location.
    pub fn add_declared(
        &mut self,
        id: ConstructorId,
        display: impl Into<String>,
        location: Location,
        attribute_location: Option<Location>,
    ) {
        self.declared.insert(
            id,
            DeclaredConstructor {
                display: display.into(),
                location,
                attribute_location,
            },
        );
    }

    pub fn mark_reached(&mut self, id: ConstructorId) {
        self.reached.insert(id);
    }

    pub fn mark_all_reached<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = ConstructorId>,
    {
        self.reached.extend(ids);
    }

    pub fn is_reached(&self, id: ConstructorId) -> bool {
        self.reached.contains(&id)
    }

    pub fn declared_count(&self) -> usize {
        self.declared.len()
    }

    /// Declared but never reached, in id order.
    pub fn unreachable_constructors(&self) -> Vec<ConstructorId> {
        self.declared
            .keys()
            .filter(|id| !self.reached.contains(id))
            .copied()
            .collect()
    }

    /// One error per declared-but-unreached constructor.
    pub fn unreachable_constructors_diagnostics(&self) -> Vec<Diagnostic> {
        self.declared
            .iter()
            .filter(|(id, _)| !self.reached.contains(id))
            .map(|(_, ctor)| {
                let diagnostic = Diagnostic::new(
                    DiagnosticCode::UnreachableConstructor,
                    ctor.location.clone(),
                    vec![ctor.display.clone()],
                );
                match &ctor.attribute_location {
                    Some(attribute) => diagnostic.with_additional_location(attribute.clone()),
                    None => diagnostic,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_difference() {
        let mut analyzer = UnreachableConstructorAnalyzer::new();
        analyzer.add_declared(ConstructorId(0), "A(x: i32)", Location::new("a.rs", 1, 1), None);
        analyzer.add_declared(
            ConstructorId(1),
            "B(x: i32)",
            Location::new("b.rs", 2, 1),
            Some(Location::new("b.rs", 1, 1)),
        );
        analyzer.add_declared(ConstructorId(2), "C()", Location::new("c.rs", 3, 1), None);
        analyzer.mark_reached(ConstructorId(0));
        analyzer.mark_all_reached([ConstructorId(2)]);

        assert_eq!(analyzer.unreachable_constructors(), vec![ConstructorId(1)]);
        let diags = analyzer.unreachable_constructors_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::UnreachableConstructor);
        assert_eq!(diags[0].arguments, vec!["B(x: i32)".to_string()]);
        assert_eq!(diags[0].location, Location::new("b.rs", 2, 1));
        assert_eq!(diags[0].additional_locations, vec![Location::new("b.rs", 1, 1)]);
    }

    #[test]
    fn test_nothing_declared() {
        let analyzer = UnreachableConstructorAnalyzer::new();
        assert!(analyzer.unreachable_constructors_diagnostics().is_empty());
        assert_eq!(analyzer.declared_count(), 0);
    }
}
