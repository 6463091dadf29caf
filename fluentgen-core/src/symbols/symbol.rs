//! Constructor contexts and the symbols they reference.
//!
//! These records are produced by a front end (see [`crate::input`]) and are
//! immutable for the duration of a build.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use super::types::{TypeParameter, TypeRef};

/// Source position of a declaration or attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Interface,
    Record,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    #[default]
    Public,
    Internal,
    Protected,
    Private,
}

/// Index of a constructor context within one factory build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConstructorId(pub usize);

impl fmt::Display for ConstructorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctor#{}", self.0)
    }
}

/// The user type that receives the generated entry-point methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryRootType {
    pub name: String,
    pub namespace: Option<String>,
    pub type_parameters: Vec<TypeParameter>,
    /// Whether the type carries the fluent factory marker.
    pub has_factory_marker: bool,
    pub is_static: bool,
    pub is_record: bool,
    pub kind: TypeKind,
    pub accessibility: Accessibility,
    pub location: Location,
}

impl FactoryRootType {
    pub fn new(namespace: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.map(str::to_string),
            has_factory_marker: true,
            ..Self::default()
        }
    }

    pub fn qualified_name(&self) -> String {
        self.as_type_ref().qualified_name()
    }

    pub fn as_type_ref(&self) -> TypeRef {
        TypeRef::named(
            self.namespace.as_deref(),
            self.name.clone(),
            self.type_parameters
                .iter()
                .map(|p| TypeRef::param(p.name.clone()))
                .collect(),
        )
    }
}

/// The type declaring a fluent constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetType {
    pub name: String,
    pub namespace: Option<String>,
    pub type_parameters: Vec<TypeParameter>,
    pub is_partial: bool,
    pub is_static: bool,
    pub is_sealed: bool,
    pub is_record: bool,
    pub kind: TypeKind,
    pub accessibility: Accessibility,
    pub location: Location,
}

impl TargetType {
    pub fn new(namespace: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn qualified_name(&self) -> String {
        TypeRef::named(self.namespace.as_deref(), self.name.clone(), Vec::new()).qualified_name()
    }

    /// Whether generated members may be added to this type so that it acts
    /// as its own fluent step.
    pub fn accepts_generated_members(&self) -> bool {
        self.is_partial && !self.is_static && !self.is_sealed
    }

    pub fn declared_parameter(&self, name: &str) -> Option<&TypeParameter> {
        self.type_parameters.iter().find(|p| p.name == name)
    }
}

/// Summary text plus per-parameter text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Documentation {
    pub summary: Option<String>,
    pub parameters: BTreeMap<String, String>,
}

impl Documentation {
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateParameter {
    pub name: String,
    pub ty: TypeRef,
}

/// A user-supplied converter that can produce a constructor argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodTemplate {
    pub name: String,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameter>,
    #[serde(default)]
    pub parameters: Vec<TemplateParameter>,
    pub return_type: TypeRef,
    #[serde(default = "default_true")]
    pub is_static: bool,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub documentation: Option<Documentation>,
    /// Every declaration site of the converter (partial declarations yield several).
    #[serde(default)]
    pub locations: Vec<Location>,
}

fn default_true() -> bool {
    true
}

impl MethodTemplate {
    pub fn primary_location(&self) -> Location {
        self.locations.first().cloned().unwrap_or_default()
    }

    /// `FromText(text: String) -> Value`
    pub fn display_signature(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty))
            .collect();
        format!("{}({}) -> {}", self.name, params.join(", "), self.return_type)
    }
}

/// An alternate-method group attached to a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodGroup {
    /// Type declaring the converter overloads.
    pub declaring_type: TypeRef,
    pub templates: Vec<MethodTemplate>,
    /// Attribute site on the parameter.
    #[serde(default)]
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSymbol {
    pub name: String,
    pub ty: TypeRef,
    /// Explicit fluent method name overriding the derived one.
    #[serde(default)]
    pub fluent_method_name: Option<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub method_group: Option<MethodGroup>,
    /// Member of the declaring type exposing this value, when the type is
    /// reused as its own step.
    #[serde(default)]
    pub storage_member: Option<String>,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub location: Location,
}

impl ParameterSymbol {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            fluent_method_name: None,
            priority: 0,
            method_group: None,
            storage_member: None,
            documentation: None,
            location: Location::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorSymbol {
    pub containing_type: TargetType,
    pub parameters: Vec<ParameterSymbol>,
    #[serde(default)]
    pub documentation: Option<Documentation>,
    #[serde(default)]
    pub location: Location,
}

impl ConstructorSymbol {
    /// `app::Target(value: String, count: i32)`
    pub fn display_signature(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty))
            .collect();
        format!("{}({})", self.containing_type.qualified_name(), params.join(", "))
    }

    pub fn parameter_documentation(&self, parameter: &ParameterSymbol) -> Option<String> {
        parameter.documentation.clone().or_else(|| {
            self.documentation
                .as_ref()
                .and_then(|d| d.parameter(&parameter.name))
                .map(str::to_string)
        })
    }
}

/// Per-constructor generation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FluentOptions {
    /// Do not emit a terminal creation method; the last fluent method
    /// constructs the target directly.
    pub no_create_method: bool,
    /// The creation method uses a custom name.
    pub custom_create_method_name: bool,
}

impl BitOr for FluentOptions {
    type Output = FluentOptions;

    fn bitor(self, rhs: FluentOptions) -> FluentOptions {
        FluentOptions {
            no_create_method: self.no_create_method || rhs.no_create_method,
            custom_create_method_name: self.custom_create_method_name
                || rhs.custom_create_method_name,
        }
    }
}

impl BitOrAssign for FluentOptions {
    fn bitor_assign(&mut self, rhs: FluentOptions) {
        *self = *self | rhs;
    }
}

/// One annotated constructor targeting a named factory root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorContext {
    pub constructor: ConstructorSymbol,
    /// Qualified name of the factory root type.
    pub root: String,
    #[serde(default)]
    pub options: FluentOptions,
    #[serde(default)]
    pub create_method_name: Option<String>,
    /// Site of the fluent constructor attribute.
    #[serde(default)]
    pub attribute_location: Location,
}

impl ConstructorContext {
    pub fn new(root: impl Into<String>, constructor: ConstructorSymbol) -> Self {
        Self {
            constructor,
            root: root.into(),
            options: FluentOptions::default(),
            create_method_name: None,
            attribute_location: Location::default(),
        }
    }

    pub fn target(&self) -> &TargetType {
        &self.constructor.containing_type
    }

    pub fn parameters(&self) -> &[ParameterSymbol] {
        &self.constructor.parameters
    }
}
