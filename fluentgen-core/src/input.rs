//! Front-end input documents.
//!
//! A `*.fluent.json` document lists factory roots and the constructors that
//! target them. Types are written as Rust type expressions (`Vec<T>`,
//! `std::string::String`) and lowered to [`TypeRef`] with `syn`; a bare
//! identifier naming a type parameter in scope becomes [`TypeRef::Param`].
//!
//! ```json
//! {
//!   "roots": [{ "name": "Factory", "namespace": "app" }],
//!   "constructors": [{
//!     "root": "app::Factory",
//!     "target": { "name": "Target", "namespace": "app" },
//!     "parameters": [{ "name": "value", "type": "String" }]
//!   }]
//! }
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use syn::{GenericArgument, PathArguments, Type};

use crate::error::{FluentGenError, FluentGenResult, IoResultExt};
use crate::symbols::{
    Accessibility, ConstructorContext, ConstructorSymbol, Documentation, FactoryRootType,
    FluentOptions, Location, MethodGroup, MethodTemplate, ParameterSymbol, TargetType,
    TemplateParameter, TypeConstraints, TypeKind, TypeParameter, TypeRef,
};

/// Parse a type expression. Single identifiers listed in `scope` become
/// type parameters.
pub fn parse_type_expr(expr: &str, scope: &[String]) -> FluentGenResult<TypeRef> {
    let ty: Type =
        syn::parse_str(expr).map_err(|e| FluentGenError::type_expr(expr, e.to_string()))?;
    lower_type(&ty, scope).map_err(|message| FluentGenError::type_expr(expr, message))
}

fn lower_type(ty: &Type, scope: &[String]) -> Result<TypeRef, String> {
    match ty {
        Type::Path(tp) => {
            if tp.qself.is_some() {
                return Err("qualified self types are not supported".to_string());
            }
            let segments: Vec<_> = tp.path.segments.iter().collect();
            let Some((last, prefix)) = segments.split_last() else {
                return Err("empty path".to_string());
            };
            let name = last.ident.to_string();

            let mut args = Vec::new();
            match &last.arguments {
                PathArguments::None => {}
                PathArguments::AngleBracketed(ab) => {
                    for arg in &ab.args {
                        match arg {
                            GenericArgument::Type(inner) => args.push(lower_type(inner, scope)?),
                            GenericArgument::Lifetime(_) => {}
                            _ => return Err("only type arguments are supported".to_string()),
                        }
                    }
                }
                PathArguments::Parenthesized(_) => {
                    return Err("function traits are not supported".to_string())
                }
            }

            if prefix.is_empty() && args.is_empty() && scope.contains(&name) {
                return Ok(TypeRef::param(name));
            }
            let namespace = prefix
                .iter()
                .map(|s| s.ident.to_string())
                .collect::<Vec<_>>()
                .join("::");
            Ok(TypeRef::named(
                (!namespace.is_empty()).then_some(namespace.as_str()),
                name,
                args,
            ))
        }
        Type::Reference(r) => lower_type(&r.elem, scope),
        Type::Paren(p) => lower_type(&p.elem, scope),
        Type::Group(g) => lower_type(&g.elem, scope),
        Type::Slice(s) => Ok(TypeRef::named(None, "Slice", vec![lower_type(&s.elem, scope)?])),
        Type::Array(a) => Ok(TypeRef::named(None, "Array", vec![lower_type(&a.elem, scope)?])),
        Type::Tuple(t) => {
            let args = t
                .elems
                .iter()
                .map(|e| lower_type(e, scope))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TypeRef::named(None, if args.is_empty() { "Unit" } else { "Tuple" }, args))
        }
        _ => Err("unsupported type form".to_string()),
    }
}

/// A type parameter as written: a bare name or a name with constraints.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTypeParameter {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        value_type: bool,
        #[serde(default)]
        reference_type: bool,
        #[serde(default)]
        constructor: bool,
        #[serde(default)]
        bounds: Vec<String>,
    },
}

impl RawTypeParameter {
    fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Full { name, .. } => name,
        }
    }

    fn lower(&self, scope: &[String]) -> FluentGenResult<TypeParameter> {
        match self {
            Self::Name(name) => Ok(TypeParameter::new(name.clone())),
            Self::Full {
                name,
                value_type,
                reference_type,
                constructor,
                bounds,
            } => Ok(TypeParameter::with_constraints(
                name.clone(),
                TypeConstraints {
                    value_type: *value_type,
                    reference_type: *reference_type,
                    constructor: *constructor,
                    bounds: bounds
                        .iter()
                        .map(|b| parse_type_expr(b, scope))
                        .collect::<FluentGenResult<_>>()?,
                },
            )),
        }
    }
}

fn lower_type_parameters(
    raw: &[RawTypeParameter],
    outer: &[String],
) -> FluentGenResult<(Vec<TypeParameter>, Vec<String>)> {
    let mut scope = outer.to_vec();
    scope.extend(raw.iter().map(|p| p.name().to_string()));
    let params = raw
        .iter()
        .map(|p| p.lower(&scope))
        .collect::<FluentGenResult<_>>()?;
    Ok((params, scope))
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRoot {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub type_parameters: Vec<RawTypeParameter>,
    #[serde(default = "default_true")]
    pub has_factory_marker: bool,
    #[serde(default = "default_true")]
    pub is_static: bool,
    #[serde(default)]
    pub is_record: bool,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub location: Location,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTarget {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub type_parameters: Vec<RawTypeParameter>,
    #[serde(default)]
    pub is_partial: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_sealed: bool,
    #[serde(default)]
    pub is_record: bool,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub location: Location,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTemplateParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTemplate {
    pub name: String,
    #[serde(default)]
    pub type_parameters: Vec<RawTypeParameter>,
    #[serde(default)]
    pub parameters: Vec<RawTemplateParameter>,
    pub return_type: String,
    #[serde(default = "default_true")]
    pub is_static: bool,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub documentation: Option<Documentation>,
    #[serde(default)]
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMethodGroup {
    pub declaring_type: String,
    pub templates: Vec<RawTemplate>,
    #[serde(default)]
    pub location: Location,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub fluent_method_name: Option<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub method_group: Option<RawMethodGroup>,
    #[serde(default)]
    pub storage_member: Option<String>,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub location: Location,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawConstructor {
    /// Qualified name of the factory root.
    pub root: String,
    pub target: RawTarget,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    #[serde(default)]
    pub options: FluentOptions,
    #[serde(default)]
    pub create_method_name: Option<String>,
    #[serde(default)]
    pub documentation: Option<Documentation>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub attribute_location: Location,
}

/// A parsed input document, not yet lowered.
#[derive(Debug, Clone, Deserialize)]
pub struct InputDocument {
    #[serde(skip)]
    pub path: PathBuf,
    #[serde(default)]
    pub roots: Vec<RawRoot>,
    #[serde(default)]
    pub constructors: Vec<RawConstructor>,
}

/// One factory root with every constructor declared against it.
#[derive(Debug, Clone)]
pub struct RootGroup {
    pub root: FactoryRootType,
    pub contexts: Vec<ConstructorContext>,
}

/// Read and parse one input document.
pub fn load_document(path: &Path) -> FluentGenResult<InputDocument> {
    let content = fs::read_to_string(path).with_path(path)?;
    parse_document(&content, path)
}

pub fn parse_document(content: &str, path: &Path) -> FluentGenResult<InputDocument> {
    let mut doc: InputDocument =
        serde_json::from_str(content).map_err(|e| FluentGenError::input(path, e.to_string()))?;
    doc.path = path.to_path_buf();
    Ok(doc)
}

impl InputDocument {
    /// Lower to one group per root, in declaration order. Constructors keep
    /// their order within a group.
    pub fn into_contexts(self) -> FluentGenResult<Vec<RootGroup>> {
        let path = self.path;
        let mut groups = Vec::with_capacity(self.roots.len());
        let mut index: HashMap<String, usize> = HashMap::new();

        for raw in &self.roots {
            let (type_parameters, _) =
                lower_type_parameters(&raw.type_parameters, &[]).map_err(|e| e.in_file(&path))?;
            let root = FactoryRootType {
                name: raw.name.clone(),
                namespace: raw.namespace.clone(),
                type_parameters,
                has_factory_marker: raw.has_factory_marker,
                is_static: raw.is_static,
                is_record: raw.is_record,
                kind: raw.kind,
                accessibility: raw.accessibility,
                location: raw.location.clone(),
            };
            if index.insert(root.qualified_name(), groups.len()).is_some() {
                return Err(FluentGenError::input(
                    &path,
                    format!("root `{}` declared twice", root.qualified_name()),
                ));
            }
            groups.push(RootGroup {
                root,
                contexts: Vec::new(),
            });
        }

        for raw in self.constructors {
            let Some(&slot) = index.get(&raw.root) else {
                return Err(FluentGenError::input(
                    &path,
                    format!(
                        "constructor of `{}` targets unknown root `{}`",
                        raw.target.name, raw.root
                    ),
                ));
            };
            let ctx = lower_constructor(raw).map_err(|e| e.in_file(&path))?;
            groups[slot].contexts.push(ctx);
        }

        Ok(groups)
    }
}

fn lower_constructor(raw: RawConstructor) -> FluentGenResult<ConstructorContext> {
    let (type_parameters, scope) = lower_type_parameters(&raw.target.type_parameters, &[])?;
    let target = TargetType {
        name: raw.target.name,
        namespace: raw.target.namespace,
        type_parameters,
        is_partial: raw.target.is_partial,
        is_static: raw.target.is_static,
        is_sealed: raw.target.is_sealed,
        is_record: raw.target.is_record,
        kind: raw.target.kind,
        accessibility: raw.target.accessibility,
        location: raw.target.location,
    };

    let parameters = raw
        .parameters
        .into_iter()
        .map(|p| lower_parameter(p, &scope))
        .collect::<FluentGenResult<Vec<_>>>()?;

    let mut options = raw.options;
    options.custom_create_method_name |= raw.create_method_name.is_some();

    Ok(ConstructorContext {
        constructor: ConstructorSymbol {
            containing_type: target,
            parameters,
            documentation: raw.documentation,
            location: raw.location,
        },
        root: raw.root,
        options,
        create_method_name: raw.create_method_name,
        attribute_location: raw.attribute_location,
    })
}

fn lower_parameter(raw: RawParameter, scope: &[String]) -> FluentGenResult<ParameterSymbol> {
    let method_group = raw
        .method_group
        .map(lower_group)
        .transpose()?;
    Ok(ParameterSymbol {
        name: raw.name,
        ty: parse_type_expr(&raw.ty, scope)?,
        fluent_method_name: raw.fluent_method_name,
        priority: raw.priority,
        method_group,
        storage_member: raw.storage_member,
        documentation: raw.documentation,
        location: raw.location,
    })
}

/// Template types only see the template's own type parameters.
fn lower_group(raw: RawMethodGroup) -> FluentGenResult<MethodGroup> {
    let templates = raw
        .templates
        .into_iter()
        .map(|t| {
            let (type_parameters, scope) = lower_type_parameters(&t.type_parameters, &[])?;
            Ok(MethodTemplate {
                name: t.name,
                type_parameters,
                parameters: t
                    .parameters
                    .iter()
                    .map(|p| {
                        Ok(TemplateParameter {
                            name: p.name.clone(),
                            ty: parse_type_expr(&p.ty, &scope)?,
                        })
                    })
                    .collect::<FluentGenResult<_>>()?,
                return_type: parse_type_expr(&t.return_type, &scope)?,
                is_static: t.is_static,
                priority: t.priority,
                documentation: t.documentation,
                locations: t.locations,
            })
        })
        .collect::<FluentGenResult<Vec<_>>>()?;

    Ok(MethodGroup {
        declaring_type: parse_type_expr(&raw.declaring_type, &[])?,
        templates,
        location: raw.location,
    })
}
