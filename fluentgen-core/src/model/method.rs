//! Fluent methods and what they return.

use serde::Serialize;

use crate::symbols::{ConstructorId, Documentation, Location, TypeParameter, TypeRef};

use super::step::StepId;

/// A parameter of a generated method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodParameter {
    pub name: String,
    pub ty: TypeRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

/// The constructor parameter a method supplies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceParameter {
    pub constructor: ConstructorId,
    pub index: usize,
    pub name: String,
    pub ty: TypeRef,
}

/// Direct construction of the target type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetTypeReturn {
    pub target: TypeRef,
    /// Constructor invoked.
    pub constructor: ConstructorId,
    /// Every constructor reachable through this terminus (for cross references).
    pub candidate_constructors: Vec<ConstructorId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FluentReturn {
    Target(TargetTypeReturn),
    Step { step: StepId },
}

impl FluentReturn {
    pub fn step(&self) -> Option<StepId> {
        match self {
            Self::Step { step } => Some(*step),
            Self::Target(_) => None,
        }
    }
}

/// The converter a multi-method calls through to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConverterRef {
    pub declaring_type: TypeRef,
    pub method: String,
    pub arguments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegularMethod {
    pub name: String,
    pub source_parameter: SourceParameter,
    pub method_parameters: Vec<MethodParameter>,
    pub type_parameters: Vec<TypeParameter>,
    #[serde(rename = "return")]
    pub ret: FluentReturn,
    pub documentation: Option<String>,
    pub priority: i32,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiMethod {
    pub name: String,
    pub source_parameter: SourceParameter,
    pub method_parameters: Vec<MethodParameter>,
    pub type_parameters: Vec<TypeParameter>,
    #[serde(rename = "return")]
    pub ret: FluentReturn,
    pub documentation: Option<String>,
    pub priority: i32,
    pub converter: ConverterRef,
    /// Signatures of the other overloads in the same group.
    pub siblings: Vec<String>,
    /// Attribute site of the method group.
    pub attribute_location: Location,
    /// Declaration sites of the converter.
    pub template_locations: Vec<Location>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreationMethod {
    pub name: String,
    pub target: TargetTypeReturn,
    pub type_parameters: Vec<TypeParameter>,
    pub documentation: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FluentMethod {
    Regular(RegularMethod),
    Multi(MultiMethod),
    Creation(CreationMethod),
}

/// Name plus erased parameter types. Two methods with equal signatures
/// cannot coexist on the same step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MethodSignature {
    pub name: String,
    pub parameters: Vec<TypeRef>,
}

impl FluentMethod {
    pub fn name(&self) -> &str {
        match self {
            Self::Regular(m) => &m.name,
            Self::Multi(m) => &m.name,
            Self::Creation(m) => &m.name,
        }
    }

    pub fn source_parameter(&self) -> Option<&SourceParameter> {
        match self {
            Self::Regular(m) => Some(&m.source_parameter),
            Self::Multi(m) => Some(&m.source_parameter),
            Self::Creation(_) => None,
        }
    }

    pub fn method_parameters(&self) -> &[MethodParameter] {
        match self {
            Self::Regular(m) => &m.method_parameters,
            Self::Multi(m) => &m.method_parameters,
            Self::Creation(_) => &[],
        }
    }

    pub fn type_parameters(&self) -> &[TypeParameter] {
        match self {
            Self::Regular(m) => &m.type_parameters,
            Self::Multi(m) => &m.type_parameters,
            Self::Creation(m) => &m.type_parameters,
        }
    }

    pub fn fluent_return(&self) -> FluentReturn {
        match self {
            Self::Regular(m) => m.ret.clone(),
            Self::Multi(m) => m.ret.clone(),
            Self::Creation(m) => FluentReturn::Target(m.target.clone()),
        }
    }

    pub fn return_step(&self) -> Option<StepId> {
        match self {
            Self::Regular(m) => m.ret.step(),
            Self::Multi(m) => m.ret.step(),
            Self::Creation(_) => None,
        }
    }

    pub(crate) fn set_return_step(&mut self, step: StepId) {
        let ret = match self {
            Self::Regular(m) => &mut m.ret,
            Self::Multi(m) => &mut m.ret,
            Self::Creation(_) => return,
        };
        if let FluentReturn::Step { step: s } = ret {
            *s = step;
        }
    }

    pub fn documentation_summary(&self) -> Option<&str> {
        match self {
            Self::Regular(m) => m.documentation.as_deref(),
            Self::Multi(m) => m.documentation.as_deref(),
            Self::Creation(m) => m.documentation.as_deref(),
        }
    }

    pub fn priority(&self) -> i32 {
        match self {
            Self::Regular(m) => m.priority,
            Self::Multi(m) => m.priority,
            Self::Creation(_) => 0,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Self::Regular(m) => m.location.clone(),
            Self::Multi(m) => m.template_locations.first().cloned().unwrap_or_default(),
            Self::Creation(m) => m.location.clone(),
        }
    }

    /// Rank used when two methods collide: lower wins.
    pub fn kind_rank(&self) -> u8 {
        match self {
            Self::Regular(_) => 0,
            Self::Multi(_) => 1,
            Self::Creation(_) => 2,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Multi(_))
    }

    pub fn signature(&self) -> MethodSignature {
        MethodSignature {
            name: self.name().to_string(),
            parameters: self
                .method_parameters()
                .iter()
                .map(|p| p.ty.erased())
                .collect(),
        }
    }

    /// `WithValue(value: String)`
    pub fn display_signature(&self) -> String {
        let params: Vec<String> = self
            .method_parameters()
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty))
            .collect();
        format!("{}({})", self.name(), params.join(", "))
    }
}

/// Documentation text for a template-backed method: template summary first,
/// then the parameter's own text.
pub(crate) fn template_summary(
    template_docs: Option<&Documentation>,
    parameter_docs: Option<&str>,
) -> Option<String> {
    template_docs
        .and_then(|d| d.summary.clone())
        .or_else(|| parameter_docs.map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regular(name: &str, ty: TypeRef) -> FluentMethod {
        FluentMethod::Regular(RegularMethod {
            name: name.to_string(),
            source_parameter: SourceParameter {
                constructor: ConstructorId(0),
                index: 0,
                name: "p".to_string(),
                ty: ty.clone(),
            },
            method_parameters: vec![MethodParameter {
                name: "p".to_string(),
                ty,
                documentation: None,
            }],
            type_parameters: Vec::new(),
            ret: FluentReturn::Step { step: StepId(0) },
            documentation: None,
            priority: 0,
            location: Location::default(),
        })
    }

    #[test]
    fn test_signature_erases_type_parameters() {
        let a = regular("WithItems", TypeRef::named(None, "Vec", vec![TypeRef::param("T")]));
        let b = regular("WithItems", TypeRef::named(None, "Vec", vec![TypeRef::param("U")]));
        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn test_set_return_step() {
        let mut m = regular("WithValue", TypeRef::simple("String"));
        m.set_return_step(StepId(4));
        assert_eq!(m.return_step(), Some(StepId(4)));
        assert_eq!(m.display_signature(), "WithValue(p: String)");
    }

    #[test]
    fn test_template_summary_precedence() {
        let docs = Documentation {
            summary: Some("From text.".to_string()),
            ..Documentation::default()
        };
        assert_eq!(
            template_summary(Some(&docs), Some("The value.")).as_deref(),
            Some("From text.")
        );
        assert_eq!(template_summary(None, Some("The value.")).as_deref(), Some("The value."));
    }
}
