//! Configuration loading from fluentgen.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::{fs, path::Path};

use crate::error::FluentGenError;
use crate::input::parse_type_expr;
use crate::symbols::StructuralTypeSystem;

pub const CONFIG_FILE: &str = "fluentgen.toml";

/// Main configuration structure for fluentgen.toml.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FluentGenConfig {
    pub naming: NamingConfig,
    pub types: TypesConfig,
    pub output: OutputConfig,
}

/// Naming of generated members.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NamingConfig {
    /// Prefix of derived method names: `With` + `Value`.
    pub regular_method_prefix: String,
    /// Prefix of default creation method names: `Create` + `Target`.
    pub creation_method_prefix: String,
    /// Prefix of synthesized step names: `Step_0__Factory`.
    pub step_type_prefix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            regular_method_prefix: "With".to_string(),
            creation_method_prefix: "Create".to_string(),
            step_type_prefix: "Step".to_string(),
        }
    }
}

impl NamingConfig {
    pub fn regular_method_name(&self, parameter: &str) -> String {
        format!("{}{}", self.regular_method_prefix, pascal_case(parameter))
    }

    pub fn creation_method_name(&self, target: &str) -> String {
        format!("{}{}", self.creation_method_prefix, target)
    }
}

/// Extra facts for the structural type system.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TypesConfig {
    /// Qualified type name → type expressions it widens to.
    pub supertypes: BTreeMap<String, Vec<String>>,
}

/// Output format configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

impl FluentGenConfig {
    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }

    /// Structural type system seeded with the configured supertypes.
    pub fn type_system(&self) -> Result<StructuralTypeSystem, FluentGenError> {
        let mut ts = StructuralTypeSystem::new();
        for (subtype, supers) in &self.types.supertypes {
            for expr in supers {
                ts.add_supertype(subtype.clone(), parse_type_expr(expr, &[])?);
            }
        }
        Ok(ts)
    }

    pub fn wants_json(&self) -> bool {
        self.output.format.as_deref() == Some("json")
    }
}

/// Loads configuration from fluentgen.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<FluentGenConfig>> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cfg = toml::from_str(&content).context("Invalid fluentgen.toml")?;
    Ok(Some(cfg))
}

/// `first_name` → `FirstName`, `value` → `Value`.
pub fn pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{TypeRef, TypeSystem};

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("value"), "Value");
        assert_eq!(pascal_case("first_name"), "FirstName");
        assert_eq!(pascal_case("alreadyCamel"), "AlreadyCamel");
        assert_eq!(pascal_case("_leading"), "Leading");
    }

    #[test]
    fn test_default_naming() {
        let naming = NamingConfig::default();
        assert_eq!(naming.regular_method_name("value"), "WithValue");
        assert_eq!(naming.creation_method_name("Target"), "CreateTarget");
    }

    #[test]
    fn test_parse_config() {
        let cfg: FluentGenConfig = toml::from_str(
            r#"
[naming]
regular_method_prefix = "Set"

[types]
supertypes = { "zoo::Dog" = ["zoo::Animal"] }

[output]
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(cfg.naming.regular_method_name("value"), "SetValue");
        assert_eq!(cfg.naming.creation_method_prefix, "Create");
        assert!(cfg.wants_json());

        let ts = cfg.type_system().unwrap();
        assert!(ts.is_assignable(
            &TypeRef::named(Some("zoo"), "Dog", vec![]),
            &TypeRef::named(Some("zoo"), "Animal", vec![]),
        ));
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = std::env::temp_dir().join("fluentgen_config_missing_test");
        std::fs::create_dir_all(&dir).unwrap();
        assert!(load_config(&dir).unwrap().is_none());
    }
}
