//! Builder pattern API for model generation.
//!
//! ```rust,ignore
//! use fluentgen_core::prelude::*;
//!
//! let result = FluentGen::new("/path/to/inputs")
//!     .only_root("app::Factory")
//!     .generate()?;
//!
//! for unit in &result.units {
//!     println!("{}: {} steps", unit.root, unit.steps.len());
//! }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{load_config, FluentGenConfig};
use crate::factory::FluentModelFactory;
use crate::input::{load_document, RootGroup};
use crate::logging::{log_unit, log_warn};
use crate::model::FluentFactoryCompilationUnit;
use crate::scan::gather_input_files;
use crate::symbols::StructuralTypeSystem;

/// Builder for configuring a generation run.
#[derive(Debug, Clone)]
pub struct FluentGen {
    /// Input document or directory of documents
    root: PathBuf,

    /// Explicit configuration; loaded from `fluentgen.toml` when absent
    config: Option<FluentGenConfig>,

    /// Explicit type system; built from the configuration when absent
    type_system: Option<StructuralTypeSystem>,

    /// Qualified root names to generate; empty means all
    only_roots: Vec<String>,
}

impl FluentGen {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: None,
            type_system: None,
            only_roots: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: FluentGenConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use `type_system` instead of the one described by `[types]`.
    pub fn with_type_system(mut self, type_system: StructuralTypeSystem) -> Self {
        self.type_system = Some(type_system);
        self
    }

    /// Restrict generation to one root (may be called repeatedly).
    pub fn only_root(mut self, qualified_name: impl Into<String>) -> Self {
        self.only_roots.push(qualified_name.into());
        self
    }

    fn config_dir(&self) -> &Path {
        if self.root.is_file() {
            self.root.parent().unwrap_or(Path::new("."))
        } else {
            &self.root
        }
    }

    fn resolve_config(&self) -> Result<FluentGenConfig> {
        match &self.config {
            Some(cfg) => Ok(cfg.clone()),
            None => Ok(load_config(self.config_dir())?.unwrap_or_default()),
        }
    }

    /// Read every input document and build one unit per root.
    pub fn generate(&self) -> Result<GenerationResult> {
        let config = self.resolve_config()?;
        let type_system = match &self.type_system {
            Some(ts) => ts.clone(),
            None => config
                .type_system()
                .context("Invalid [types] section in fluentgen.toml")?,
        };

        // 1. Gather and load documents; a broken document only skips itself
        let files = gather_input_files(&self.root).context("Failed to gather input files")?;
        let loaded: Vec<_> = files
            .par_iter()
            .map(|path| (path, load_document(path).and_then(|doc| doc.into_contexts())))
            .collect();

        let mut groups = Vec::new();
        let mut failed_inputs = Vec::new();
        for (path, outcome) in loaded {
            match outcome {
                Ok(found) => groups.extend(found),
                Err(e) if e.is_recoverable() => {
                    log_warn(&format!("skipping input {}: {}", path.display(), e));
                    failed_inputs.push(FailedInput {
                        path: path.clone(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to load {}", path.display()))
                }
            }
        }

        // 2. Build units
        let groups: Vec<RootGroup> = groups
            .into_iter()
            .filter(|g| self.wants_root(&g.root.qualified_name()))
            .collect();
        let factory = FluentModelFactory::new(type_system).with_naming(config.naming.clone());
        let units = generate_units(&factory, &groups);

        Ok(GenerationResult {
            root: self.root.clone(),
            units,
            failed_inputs,
        })
    }

    fn wants_root(&self, qualified_name: &str) -> bool {
        self.only_roots.is_empty() || self.only_roots.iter().any(|r| r == qualified_name)
    }
}

/// Build every group in parallel. Each root gets its own build state, and
/// output order follows `groups`.
pub fn generate_units(
    factory: &FluentModelFactory<StructuralTypeSystem>,
    groups: &[RootGroup],
) -> Vec<FluentFactoryCompilationUnit> {
    groups
        .par_iter()
        .map(|group| {
            let unit = factory.create_fluent_factory_compilation_unit(&group.root, &group.contexts);
            log_unit(&unit);
            unit
        })
        .collect()
}

/// An input document that could not be loaded.
#[derive(Debug, Clone, Serialize)]
pub struct FailedInput {
    pub path: PathBuf,
    pub message: String,
}

/// Result of a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    /// Path that was scanned
    pub root: PathBuf,

    /// One unit per factory root, in input order
    pub units: Vec<FluentFactoryCompilationUnit>,

    pub failed_inputs: Vec<FailedInput>,
}

impl GenerationResult {
    /// Any error diagnostic, or any input that failed to load.
    pub fn has_errors(&self) -> bool {
        !self.failed_inputs.is_empty() || self.units.iter().any(|u| u.has_errors())
    }

    pub fn diagnostic_count(&self) -> usize {
        self.units.iter().map(|u| u.diagnostics.len()).sum()
    }

    pub fn error_count(&self) -> usize {
        self.units
            .iter()
            .flat_map(|u| u.diagnostics.iter())
            .filter(|d| d.is_error())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::TypeRef;
    use std::fs;

    const DOC: &str = r#"{
        "roots": [{ "name": "Factory", "namespace": "app" }, { "name": "Other", "namespace": "app" }],
        "constructors": [
            { "root": "app::Factory", "target": { "name": "Target", "namespace": "app" },
              "parameters": [{ "name": "value", "type": "String" }] },
            { "root": "app::Other", "target": { "name": "Thing", "namespace": "app" },
              "parameters": [{ "name": "count", "type": "i32" }] }
        ]
    }"#;

    fn setup_temp_project(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fluentgen_builder_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_generate_all_roots() {
        let dir = setup_temp_project("all");
        fs::write(dir.join("app.fluent.json"), DOC).unwrap();

        let result = FluentGen::new(&dir).generate().unwrap();
        assert_eq!(result.units.len(), 2);
        assert!(!result.has_errors());
        assert_eq!(result.units[0].root_name, "Factory");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_only_root_filter() {
        let dir = setup_temp_project("filter");
        fs::write(dir.join("app.fluent.json"), DOC).unwrap();

        let result = FluentGen::new(&dir).only_root("app::Other").generate().unwrap();
        assert_eq!(result.units.len(), 1);
        assert_eq!(result.units[0].root_name, "Other");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_broken_document_is_skipped() {
        let dir = setup_temp_project("broken");
        fs::write(dir.join("app.fluent.json"), DOC).unwrap();
        fs::write(dir.join("bad.fluent.json"), "{ not json").unwrap();

        let result = FluentGen::new(&dir).generate().unwrap();
        assert_eq!(result.units.len(), 2);
        assert_eq!(result.failed_inputs.len(), 1);
        assert!(result.has_errors());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_explicit_type_system_is_used() {
        const PETS: &str = r#"{
            "roots": [{ "name": "Factory", "namespace": "app" }],
            "constructors": [
                { "root": "app::Factory", "target": { "name": "Owner", "namespace": "app" },
                  "parameters": [{ "name": "pet", "type": "app::Animal",
                    "method_group": { "declaring_type": "app::Pets", "templates": [
                      { "name": "FromName", "parameters": [{ "name": "name", "type": "String" }],
                        "return_type": "app::Dog" }
                    ] } }] }
            ]
        }"#;
        let dir = setup_temp_project("types");
        fs::write(dir.join("pets.fluent.json"), PETS).unwrap();

        // Without the supertype fact the only converter is incompatible
        let plain = FluentGen::new(&dir).generate().unwrap();
        assert!(plain.has_errors());

        let types = StructuralTypeSystem::new()
            .with_supertype("app::Dog", TypeRef::named(Some("app"), "Animal", vec![]));
        let result = FluentGen::new(&dir).with_type_system(types).generate().unwrap();
        assert!(!result.has_errors());
        assert_eq!(result.units[0].methods[0].name(), "FromName");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_config_naming_is_applied() {
        let dir = setup_temp_project("naming");
        fs::write(dir.join("app.fluent.json"), DOC).unwrap();
        fs::write(
            dir.join("fluentgen.toml"),
            "[naming]\nregular_method_prefix = \"Set\"\n",
        )
        .unwrap();

        let result = FluentGen::new(&dir).only_root("app::Factory").generate().unwrap();
        assert_eq!(result.units[0].methods[0].name(), "SetValue");

        let _ = fs::remove_dir_all(&dir);
    }
}
