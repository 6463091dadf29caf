//! Per-constructor preparation.
//!
//! Before anything is inserted into the trie, each constructor parameter is
//! normalized (see [`crate::generics`]) and the ways it can be supplied are
//! worked out:
//!
//! - a plain parameter gets one regular method name
//! - a parameter with an alternate-method group gets one source per
//!   *compatible* converter overload; incompatible overloads are reported
//!   here and never reach the trie

use std::collections::BTreeSet;

use crate::config::NamingConfig;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::generics::{bind_template_parameters, normalize_parameters, PlaceholderMap};
use crate::model::{ConstructorMetadata, FluentMethodParameter, FluentType};
use crate::symbols::{
    ConstructorContext, ConstructorId, Location, MethodGroup, MethodTemplate, ParameterSymbol,
    TypeMapping, TypeParameter, TypeRef, TypeSystem,
};

/// One way a parameter can be supplied.
#[derive(Debug, Clone)]
pub(crate) enum MethodSource {
    Regular { name: String },
    Template(TemplatePlan),
}

/// A compatible converter overload bound to one parameter.
#[derive(Debug, Clone)]
pub(crate) struct TemplatePlan {
    pub template: MethodTemplate,
    pub declaring_type: TypeRef,
    pub attribute_location: Location,
    /// Converter parameters with bound type parameters substituted, in
    /// placeholder form.
    pub parameters: Vec<(String, TypeRef)>,
    /// Converter type parameters the parameter type does not determine.
    pub free_type_parameters: Vec<TypeParameter>,
    /// Signatures of the other compatible overloads in the group.
    pub siblings: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct ParameterPlan {
    pub symbol: ParameterSymbol,
    /// Parameter type in placeholder form.
    pub ty: TypeRef,
    pub introduced: Vec<(usize, String)>,
    pub method_names: BTreeSet<String>,
    pub sources: Vec<MethodSource>,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct PreparedConstructor {
    pub placeholders: PlaceholderMap,
    pub parameters: Vec<ParameterPlan>,
    pub metadata: ConstructorMetadata,
}

impl PreparedConstructor {
    /// Trie keys for this constructor's parameter sequence.
    pub fn keys(&self, id: ConstructorId) -> Vec<FluentMethodParameter> {
        self.parameters
            .iter()
            .enumerate()
            .map(|(index, plan)| {
                FluentMethodParameter::new(
                    id,
                    index,
                    plan.symbol.name.clone(),
                    FluentType::new(plan.ty.clone()),
                    plan.method_names.iter().cloned(),
                )
            })
            .collect()
    }
}

pub(crate) fn prepare_constructor(
    id: ConstructorId,
    ctx: &ConstructorContext,
    type_system: &dyn TypeSystem,
    naming: &NamingConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> PreparedConstructor {
    let (placeholders, normalized) = normalize_parameters(ctx.parameters());
    let mut parameters = Vec::with_capacity(normalized.len());

    for (symbol, norm) in ctx.parameters().iter().zip(normalized) {
        let documentation = ctx.constructor.parameter_documentation(symbol);
        let sources = match &symbol.method_group {
            Some(group) => {
                template_sources(ctx, symbol, group, &placeholders, type_system, diagnostics)
            }
            None => vec![MethodSource::Regular {
                name: symbol
                    .fluent_method_name
                    .clone()
                    .unwrap_or_else(|| naming.regular_method_name(&symbol.name)),
            }],
        };
        let method_names = sources
            .iter()
            .map(|s| match s {
                MethodSource::Regular { name } => name.clone(),
                MethodSource::Template(t) => t.template.name.clone(),
            })
            .collect();

        parameters.push(ParameterPlan {
            symbol: symbol.clone(),
            ty: norm.ty,
            introduced: norm.introduced,
            method_names,
            sources,
            documentation,
        });
    }

    PreparedConstructor {
        placeholders,
        metadata: ConstructorMetadata::new(id, parameters.len(), ctx.options),
        parameters,
    }
}

/// Check every overload in `group` against the parameter it must produce.
fn template_sources(
    ctx: &ConstructorContext,
    symbol: &ParameterSymbol,
    group: &MethodGroup,
    placeholders: &PlaceholderMap,
    type_system: &dyn TypeSystem,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<MethodSource> {
    let mut compatible: Vec<(&MethodTemplate, TypeMapping)> = Vec::new();
    let mut incompatible: Vec<&MethodTemplate> = Vec::new();

    for template in &group.templates {
        if !template.is_static {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::AlternateMethodTemplateNotStatic,
                template.primary_location(),
                vec![format!("{}::{}", group.declaring_type, template.display_signature())],
            ));
        }

        let binding = bind_template_parameters(
            type_system,
            &template.return_type,
            &template.type_parameters,
            &symbol.ty,
        )
        .filter(|mapping| {
            let produced = type_system.substitute_generic_arguments(&template.return_type, mapping);
            type_system.is_assignable(&produced, &symbol.ty)
        });
        match binding {
            Some(mapping) => compatible.push((template, mapping)),
            None => incompatible.push(template),
        }
    }

    if compatible.is_empty() {
        diagnostics.push(Diagnostic::new(
            DiagnosticCode::AllAlternateMethodsIncompatible,
            group.location.clone(),
            vec![
                group.declaring_type.to_string(),
                symbol.name.clone(),
                symbol.ty.to_string(),
            ],
        ));
        tracing::debug!(
            constructor = %ctx.constructor.display_signature(),
            parameter = %symbol.name,
            "no compatible alternate method"
        );
        return Vec::new();
    }

    for template in incompatible {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::AlternateMethodIncompatible,
                template.primary_location(),
                vec![
                    template.display_signature(),
                    symbol.name.clone(),
                    symbol.ty.to_string(),
                ],
            )
            .with_additional_location(group.location.clone()),
        );
    }

    let signatures: Vec<String> = compatible
        .iter()
        .map(|(t, _)| t.display_signature())
        .collect();
    let to_placeholders = placeholders.as_mapping();

    compatible
        .iter()
        .enumerate()
        .map(|(i, (template, mapping))| {
            let mapping: TypeMapping = mapping
                .iter()
                .map(|(k, v)| (k.clone(), v.substitute(&to_placeholders)))
                .collect();
            let free_type_parameters = template
                .type_parameters
                .iter()
                .filter(|p| !mapping.contains_key(&p.name))
                .map(|p| TypeParameter::with_constraints(p.name.clone(), p.constraints.substitute(&mapping)))
                .collect();
            let parameters = template
                .parameters
                .iter()
                .map(|p| (p.name.clone(), type_system.substitute_generic_arguments(&p.ty, &mapping)))
                .collect();
            let siblings = signatures
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, s)| s.clone())
                .collect();

            MethodSource::Template(TemplatePlan {
                template: (*template).clone(),
                declaring_type: group.declaring_type.clone(),
                attribute_location: group.location.clone(),
                parameters,
                free_type_parameters,
                siblings,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{
        ConstructorSymbol, StructuralTypeSystem, TargetType, TemplateParameter,
    };

    fn template(name: &str, param: TypeRef, ret: TypeRef, type_params: &[&str]) -> MethodTemplate {
        MethodTemplate {
            name: name.to_string(),
            type_parameters: type_params.iter().map(|p| TypeParameter::new(*p)).collect(),
            parameters: vec![TemplateParameter {
                name: "input".to_string(),
                ty: param,
            }],
            return_type: ret,
            is_static: true,
            priority: 0,
            documentation: None,
            locations: vec![Location::new("converters.rs", 1, 1)],
        }
    }

    fn context(param: ParameterSymbol, type_params: &[&str]) -> ConstructorContext {
        let mut target = TargetType::new(Some("app"), "Target");
        target.type_parameters = type_params.iter().map(|p| TypeParameter::new(*p)).collect();
        ConstructorContext::new(
            "app::Factory",
            ConstructorSymbol {
                containing_type: target,
                parameters: vec![param],
                documentation: None,
                location: Location::default(),
            },
        )
    }

    fn prepare(ctx: &ConstructorContext) -> (PreparedConstructor, Vec<Diagnostic>) {
        let mut diags = Vec::new();
        let prepared = prepare_constructor(
            ConstructorId(0),
            ctx,
            &StructuralTypeSystem::new(),
            &NamingConfig::default(),
            &mut diags,
        );
        (prepared, diags)
    }

    #[test]
    fn test_regular_parameter_gets_derived_name() {
        let ctx = context(ParameterSymbol::new("first_name", TypeRef::simple("String")), &[]);
        let (prepared, diags) = prepare(&ctx);
        assert!(diags.is_empty());
        let names: Vec<_> = prepared.parameters[0].method_names.iter().cloned().collect();
        assert_eq!(names, vec!["WithFirstName".to_string()]);
    }

    #[test]
    fn test_group_replaces_regular_method() {
        let mut param = ParameterSymbol::new("value", TypeRef::simple("String"));
        param.method_group = Some(MethodGroup {
            declaring_type: TypeRef::named(Some("app"), "Converters", vec![]),
            templates: vec![
                template("FromNumber", TypeRef::simple("i32"), TypeRef::simple("String"), &[]),
                template("FromFlag", TypeRef::simple("bool"), TypeRef::simple("Flag"), &[]),
            ],
            location: Location::new("target.rs", 5, 3),
        });
        let ctx = context(param, &[]);
        let (prepared, diags) = prepare(&ctx);

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::AlternateMethodIncompatible);
        let plan = &prepared.parameters[0];
        assert_eq!(plan.sources.len(), 1);
        assert!(plan.method_names.contains("FromNumber"));
        assert!(!plan.method_names.contains("WithValue"));
    }

    #[test]
    fn test_all_incompatible_is_fatal_for_parameter() {
        let mut param = ParameterSymbol::new("value", TypeRef::simple("String"));
        param.method_group = Some(MethodGroup {
            declaring_type: TypeRef::named(Some("app"), "Converters", vec![]),
            templates: vec![template("FromFlag", TypeRef::simple("bool"), TypeRef::simple("Flag"), &[])],
            location: Location::new("target.rs", 5, 3),
        });
        let ctx = context(param, &[]);
        let (prepared, diags) = prepare(&ctx);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::AllAlternateMethodsIncompatible);
        assert!(prepared.parameters[0].sources.is_empty());
        assert!(prepared.parameters[0].method_names.is_empty());
    }

    #[test]
    fn test_generic_template_bound_by_position() {
        // Target<T>(items: List<T>) with FromItem<TItem>(item: TItem) -> List<TItem>
        let list = |arg: TypeRef| TypeRef::named(None, "List", vec![arg]);
        let mut param = ParameterSymbol::new("items", list(TypeRef::param("T")));
        param.method_group = Some(MethodGroup {
            declaring_type: TypeRef::named(Some("app"), "ListConverters", vec![]),
            templates: vec![template(
                "FromItem",
                TypeRef::param("TItem"),
                list(TypeRef::param("TItem")),
                &["TItem"],
            )],
            location: Location::default(),
        });
        let ctx = context(param, &["T"]);
        let (prepared, diags) = prepare(&ctx);
        assert!(diags.is_empty());

        let MethodSource::Template(plan) = &prepared.parameters[0].sources[0] else {
            panic!("expected template source");
        };
        assert_eq!(plan.parameters[0].1, crate::generics::placeholder(0));
        assert!(plan.free_type_parameters.is_empty());
    }

    #[test]
    fn test_non_static_template_warns_but_is_used() {
        let mut t = template("FromNumber", TypeRef::simple("i32"), TypeRef::simple("String"), &[]);
        t.is_static = false;
        let mut param = ParameterSymbol::new("value", TypeRef::simple("String"));
        param.method_group = Some(MethodGroup {
            declaring_type: TypeRef::named(Some("app"), "Converters", vec![]),
            templates: vec![t],
            location: Location::default(),
        });
        let (prepared, diags) = prepare(&context(param, &[]));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::AlternateMethodTemplateNotStatic);
        assert_eq!(prepared.parameters[0].sources.len(), 1);
    }
}
