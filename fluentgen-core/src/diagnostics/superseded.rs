//! Warnings for alternate-method overloads that lost a signature collision.
//!
//! The warning goes to the attribute site (where the user will edit) and an
//! informational note goes to every declaration of the shadowed converter.

use std::collections::BTreeSet;

use crate::symbols::{ConstructorId, Location, TypeRef};

use super::diagnostic::{Diagnostic, DiagnosticCode};

/// What a colliding method would have led to.
#[derive(Debug, Clone)]
pub struct MethodOutcome {
    /// `WithValue(value: String)`
    pub display: String,
    pub location: Location,
    /// Converter group type when the method is a multi-method.
    pub converter_type: Option<TypeRef>,
    /// Constructors reachable through this method.
    pub reach: BTreeSet<ConstructorId>,
}

/// A multi-method dropped in favour of the survivor.
#[derive(Debug, Clone)]
pub struct IgnoredTemplate {
    pub outcome: MethodOutcome,
    /// Alternate-method-group attribute site.
    pub attribute_location: Location,
    /// Declarations of the converter.
    pub template_locations: Vec<Location>,
    pub parameter: String,
    /// Display signature of the constructor owning the parameter.
    pub constructor: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SupersededMethodTemplateWarningFactory;

impl SupersededMethodTemplateWarningFactory {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether losing `ignored` to `survivor` deserves diagnostics.
    pub fn create(&self, survivor: &MethodOutcome, ignored: &[IgnoredTemplate]) -> Vec<Diagnostic> {
        if ignored.is_empty()
            || self.loses_nothing(survivor, ignored)
            || self.same_overload_family(survivor, ignored)
        {
            return Vec::new();
        }

        let mut diagnostics = Vec::new();
        for template in ignored {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::SupersededAlternateMethodTemplate,
                    template.attribute_location.clone(),
                    vec![template.outcome.display.clone(), survivor.display.clone()],
                )
                .with_additional_location(survivor.location.clone()),
            );
            for location in &template.template_locations {
                diagnostics.push(Diagnostic::new(
                    DiagnosticCode::AlternateMethodTemplateSuperseded,
                    location.clone(),
                    vec![
                        template.outcome.display.clone(),
                        template.parameter.clone(),
                        template.constructor.clone(),
                        survivor.display.clone(),
                    ],
                ));
            }
        }
        diagnostics
    }

    /// Every ignored overload only reaches constructors the survivor
    /// reaches anyway.
    fn loses_nothing(&self, survivor: &MethodOutcome, ignored: &[IgnoredTemplate]) -> bool {
        ignored
            .iter()
            .all(|t| t.outcome.reach.is_subset(&survivor.reach))
    }

    /// Survivor and every ignored overload come from the same converter type.
    fn same_overload_family(&self, survivor: &MethodOutcome, ignored: &[IgnoredTemplate]) -> bool {
        let Some(family) = &survivor.converter_type else {
            return false;
        };
        ignored
            .iter()
            .all(|t| t.outcome.converter_type.as_ref() == Some(family))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(display: &str, converter: Option<&str>, reach: &[usize]) -> MethodOutcome {
        MethodOutcome {
            display: display.to_string(),
            location: Location::new("survivor.rs", 1, 1),
            converter_type: converter.map(TypeRef::simple),
            reach: reach.iter().map(|i| ConstructorId(*i)).collect(),
        }
    }

    fn ignored(converter: &str, reach: &[usize], locations: usize) -> IgnoredTemplate {
        IgnoredTemplate {
            outcome: outcome("WithValue(value: i32)", Some(converter), reach),
            attribute_location: Location::new("attr.rs", 4, 2),
            template_locations: (0..locations)
                .map(|i| Location::new("templates.rs", 10 + i as u32, 1))
                .collect(),
            parameter: "value".to_string(),
            constructor: "app::Other(value: String)".to_string(),
        }
    }

    #[test]
    fn test_warns_when_reachability_is_lost() {
        let survivor = outcome("WithValue(value: i32)", None, &[0]);
        let diags = SupersededMethodTemplateWarningFactory::new()
            .create(&survivor, &[ignored("Converters", &[1], 2)]);

        assert_eq!(diags.len(), 3);
        assert_eq!(diags[0].code, DiagnosticCode::SupersededAlternateMethodTemplate);
        assert_eq!(diags[0].location, Location::new("attr.rs", 4, 2));
        assert_eq!(diags[0].additional_locations, vec![Location::new("survivor.rs", 1, 1)]);
        assert!(diags[1..]
            .iter()
            .all(|d| d.code == DiagnosticCode::AlternateMethodTemplateSuperseded));
    }

    #[test]
    fn test_suppressed_when_nothing_is_lost() {
        let survivor = outcome("WithValue(value: i32)", None, &[0, 1]);
        let diags = SupersededMethodTemplateWarningFactory::new()
            .create(&survivor, &[ignored("Converters", &[1], 1)]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_suppressed_for_same_overload_family() {
        let survivor = outcome("WithValue(value: i32)", Some("Converters"), &[0]);
        let diags = SupersededMethodTemplateWarningFactory::new()
            .create(&survivor, &[ignored("Converters", &[1], 1)]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_cross_family_still_warns() {
        let survivor = outcome("WithValue(value: i32)", Some("Converters"), &[0]);
        let diags = SupersededMethodTemplateWarningFactory::new().create(
            &survivor,
            &[ignored("Converters", &[1], 1), ignored("OtherConverters", &[2], 1)],
        );
        assert_eq!(diags.len(), 4);
    }
}
