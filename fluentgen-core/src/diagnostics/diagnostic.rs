//! Diagnostic records collected into a compilation unit.

use serde::Serialize;
use std::fmt;

use crate::symbols::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// Stable diagnostic identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCode {
    TargetTypeMissingFactoryMarker,
    InvalidCreateMethodName,
    DuplicateCreateMethodName,
    CreateMethodNameWithSuppressConflict,
    UnreachableConstructor,
    AllAlternateMethodsIncompatible,
    AlternateMethodIncompatible,
    AlternateMethodTemplateNotStatic,
    SupersededAlternateMethodTemplate,
    AlternateMethodTemplateSuperseded,
}

impl DiagnosticCode {
    /// Machine-readable id.
    pub fn id(&self) -> &'static str {
        match self {
            Self::TargetTypeMissingFactoryMarker => "FLG0001",
            Self::InvalidCreateMethodName => "FLG0002",
            Self::DuplicateCreateMethodName => "FLG0003",
            Self::CreateMethodNameWithSuppressConflict => "FLG0004",
            Self::UnreachableConstructor => "FLG0005",
            Self::AllAlternateMethodsIncompatible => "FLG0006",
            Self::AlternateMethodIncompatible => "FLG0007",
            Self::AlternateMethodTemplateNotStatic => "FLG0008",
            Self::SupersededAlternateMethodTemplate => "FLG0009",
            Self::AlternateMethodTemplateSuperseded => "FLG0010",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::TargetTypeMissingFactoryMarker => "Factory root is not marked as a fluent factory",
            Self::InvalidCreateMethodName => "Invalid create method name",
            Self::DuplicateCreateMethodName => "Duplicate create method name",
            Self::CreateMethodNameWithSuppressConflict => {
                "Create method name conflicts with suppressed create method"
            }
            Self::UnreachableConstructor => "Unreachable fluent constructor",
            Self::AllAlternateMethodsIncompatible => "No compatible alternate method",
            Self::AlternateMethodIncompatible => "Incompatible alternate method",
            Self::AlternateMethodTemplateNotStatic => "Alternate method template is not static",
            Self::SupersededAlternateMethodTemplate => "Alternate method superseded",
            Self::AlternateMethodTemplateSuperseded => "Alternate method template superseded",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            Self::AlternateMethodIncompatible
            | Self::AlternateMethodTemplateNotStatic
            | Self::SupersededAlternateMethodTemplate => Severity::Warning,
            Self::AlternateMethodTemplateSuperseded => Severity::Info,
            _ => Severity::Error,
        }
    }

    /// Message template; `{n}` is replaced by the n-th argument.
    pub fn message_format(&self) -> &'static str {
        match self {
            Self::TargetTypeMissingFactoryMarker => {
                "Type '{0}' used by fluent constructor '{1}' is not marked as a fluent factory"
            }
            Self::InvalidCreateMethodName => {
                "'{0}' is not a valid create method name for fluent constructor '{1}'"
            }
            Self::DuplicateCreateMethodName => {
                "Create method name '{0}' is used by more than one fluent constructor of '{1}'"
            }
            Self::CreateMethodNameWithSuppressConflict => {
                "Fluent constructor '{0}' names create method '{1}' but also suppresses it"
            }
            Self::UnreachableConstructor => {
                "Fluent constructor '{0}' is unreachable: another constructor with an indistinguishable parameter sequence shadows it"
            }
            Self::AllAlternateMethodsIncompatible => {
                "None of the alternate methods in '{0}' can produce parameter '{1}' of type '{2}'"
            }
            Self::AlternateMethodIncompatible => {
                "Alternate method '{0}' cannot produce parameter '{1}' of type '{2}' and is ignored"
            }
            Self::AlternateMethodTemplateNotStatic => {
                "Alternate method template '{0}' should be static"
            }
            Self::SupersededAlternateMethodTemplate => {
                "Alternate method '{0}' is superseded by '{1}' and will not be generated"
            }
            Self::AlternateMethodTemplateSuperseded => {
                "Alternate method template '{0}' for parameter '{1}' of '{2}' is superseded by '{3}'"
            }
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub location: Location,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_locations: Vec<Location>,
    pub arguments: Vec<String>,
}

impl Diagnostic {
    /// Create a diagnostic with the code's default severity.
    pub fn new(code: DiagnosticCode, location: Location, arguments: Vec<String>) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            location,
            additional_locations: Vec::new(),
            arguments,
        }
    }

    pub fn with_additional_location(mut self, location: Location) -> Self {
        self.additional_locations.push(location);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Formatted message text.
    pub fn message(&self) -> String {
        let mut text = self.code.message_format().to_string();
        for (i, arg) in self.arguments.iter().enumerate() {
            text = text.replace(&format!("{{{}}}", i), arg);
        }
        text
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.location,
            self.severity,
            self.code.id(),
            self.message()
        )
    }
}
