//! Output formatting - plaintext and JSON.

use std::fmt::Write as _;

use serde_json::json;

use crate::builder::GenerationResult;
use crate::model::{FluentFactoryCompilationUnit, FluentMethod, FluentReturn, FluentStep};

fn describe_return(unit: &FluentFactoryCompilationUnit, method: &FluentMethod) -> String {
    match method.fluent_return() {
        FluentReturn::Target(t) => t.target.to_string(),
        FluentReturn::Step { step } => unit
            .step(step)
            .map(FluentStep::name)
            .unwrap_or_else(|| step.to_string()),
    }
}

fn write_methods(
    out: &mut String,
    unit: &FluentFactoryCompilationUnit,
    methods: &[FluentMethod],
    indent: &str,
) {
    for method in methods {
        let _ = writeln!(
            out,
            "{}{} -> {}",
            indent,
            method.display_signature(),
            describe_return(unit, method)
        );
    }
}

/// Human-readable listing of one unit.
pub fn format_unit(unit: &FluentFactoryCompilationUnit) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "FACTORY {} ({} root methods, {} steps)",
        unit.root,
        unit.methods.len(),
        unit.steps.len()
    );
    write_methods(&mut out, unit, &unit.methods, "  ");

    for step in &unit.steps {
        let known: Vec<String> = step
            .known_parameters()
            .iter()
            .map(|k| format!("{}: {}", k.name, k.ty))
            .collect();
        let kind = match step {
            FluentStep::Regular(_) => "step",
            FluentStep::ExistingType(_) => "existing",
        };
        let _ = writeln!(out, "  {} {} [{}]", kind, step.name(), known.join(", "));
        write_methods(&mut out, unit, step.methods(), "    ");
    }

    if !unit.diagnostics.is_empty() {
        let _ = writeln!(out, "  DIAGNOSTICS ({}):", unit.diagnostics.len());
        for diagnostic in &unit.diagnostics {
            let _ = writeln!(out, "  - {}", diagnostic);
        }
    }
    out
}

/// Prints every unit in plain text format.
pub fn print_plain(result: &GenerationResult) {
    if result.units.is_empty() {
        println!("No factory roots found.");
    }
    for unit in &result.units {
        print!("{}", format_unit(unit));
    }
    for failed in &result.failed_inputs {
        println!("SKIPPED {}: {}", failed.path.display(), failed.message);
    }
}

/// Prints the whole result in JSON format.
pub fn print_json(result: &GenerationResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            println!("{}", json!({ "error": e.to_string() }));
        }
    }
}

/// Prints one `root fingerprint` line per unit.
pub fn print_fingerprints(result: &GenerationResult) {
    for unit in &result.units {
        match unit.fingerprint() {
            Ok(fingerprint) => println!("{} {}", unit.root, fingerprint),
            Err(e) => {
                tracing::error!(root = %unit.root, error = %e, "fingerprint failed");
                eprintln!("[WARN] {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::FluentModelFactory;
    use crate::symbols::{
        ConstructorContext, ConstructorSymbol, FactoryRootType, Location, ParameterSymbol,
        StructuralTypeSystem, TargetType, TypeRef,
    };

    #[test]
    fn test_format_unit_lists_steps_and_diagnostics() {
        let root = FactoryRootType::new(Some("app"), "Factory");
        let ctx = ConstructorContext::new(
            "app::Factory",
            ConstructorSymbol {
                containing_type: TargetType::new(Some("app"), "Target"),
                parameters: vec![ParameterSymbol::new("value", TypeRef::simple("String"))],
                documentation: None,
                location: Location::default(),
            },
        );
        let unit = FluentModelFactory::new(StructuralTypeSystem::new())
            .create_fluent_factory_compilation_unit(&root, &[ctx]);

        let text = format_unit(&unit);
        assert!(text.starts_with("FACTORY app::Factory"));
        assert!(text.contains("WithValue(value: String) -> Step_0__Factory"));
        assert!(text.contains("CreateTarget() -> app::Target"));
        assert!(!text.contains("DIAGNOSTICS"));
    }
}
