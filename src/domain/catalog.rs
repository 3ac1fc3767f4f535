//! Core domain models for violation catalogs
//!
//! Architecture: Value Objects - Definitions are frozen once constructed
//! - A ViolationDefinition exposes read accessors only, so sealing is a construction-time fact
//! - Codes keep their ingested representation so type errors stay observable
//! - Catalog is the aggregate root handed to every check as one immutable snapshot

use serde::{Deserialize, Serialize};
use std::fmt;

/// Code value as it was supplied by the catalog source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeValue {
    /// A genuine integer code
    Integer(i64),
    /// An integer too large for `i64`, e.g. `18446744073709551615`
    Unsigned(u64),
    /// A floating point value, e.g. `101.0` typed by hand
    Float(f64),
    /// A quoted value, e.g. `"101"`
    Text(String),
    /// A boolean slipped in where a code was expected
    Boolean(bool),
}

impl CodeValue {
    /// Integer value of the code, if it is represented as one that fits `i64`
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Unsigned(value) => i64::try_from(*value).ok(),
            _ => None,
        }
    }

    /// Integer value of the code widened so every integer variant fits
    pub fn as_wide_integer(&self) -> Option<i128> {
        match self {
            Self::Integer(value) => Some(i128::from(*value)),
            Self::Unsigned(value) => Some(i128::from(*value)),
            _ => None,
        }
    }

    /// Whether the code is represented as an integer of any width
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Unsigned(_))
    }

    /// Short name of the representation, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) | Self::Unsigned(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
            Self::Boolean(_) => "boolean",
        }
    }
}

impl From<i64> for CodeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl fmt::Display for CodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Unsigned(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Text(value) => write!(f, "{value:?}"),
            Self::Boolean(value) => write!(f, "{value}"),
        }
    }
}

/// A single diagnosable rule definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationDefinition {
    code: CodeValue,
    error_template: String,
    qualname: String,
    #[serde(default)]
    sealed: bool,
}

impl ViolationDefinition {
    /// Create a sealed definition with an integer code
    ///
    /// Definitions registered in code go through here and can never be
    /// reopened, since nothing exposes mutable access to them.
    pub fn new(code: i64, error_template: impl Into<String>, qualname: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error_template: error_template.into(),
            qualname: qualname.into(),
            sealed: true,
        }
    }

    /// Create a definition exactly as an external source declared it
    pub fn declared(
        code: CodeValue,
        error_template: impl Into<String>,
        qualname: impl Into<String>,
        sealed: bool,
    ) -> Self {
        Self {
            code,
            error_template: error_template.into(),
            qualname: qualname.into(),
            sealed,
        }
    }

    /// Code exactly as it was supplied
    pub fn code(&self) -> &CodeValue {
        &self.code
    }

    /// Integer code, or `None` when the code is not represented as an integer
    pub fn integer_code(&self) -> Option<i64> {
        self.code.as_integer()
    }

    /// Message template shown when the violation is reported
    pub fn error_template(&self) -> &str {
        &self.error_template
    }

    /// Fully qualified name of the definition
    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    /// Whether the definition is immutable and non-extensible
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }
}

/// One thematic module and the definitions it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogModule {
    /// Module name, e.g. "naming"
    pub name: String,
    /// Definitions owned by the module, in no particular order
    #[serde(default)]
    pub violations: Vec<ViolationDefinition>,
}

impl CatalogModule {
    /// Create an empty module
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            violations: Vec::new(),
        }
    }
}

/// The complete ordered set of modules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Modules in their stable order
    pub modules: Vec<CatalogModule>,
}

impl Catalog {
    /// Create a catalog from an ordered list of modules
    pub fn new(modules: Vec<CatalogModule>) -> Self {
        Self { modules }
    }

    /// Number of modules
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Iterate every definition across all modules
    pub fn definitions(&self) -> impl Iterator<Item = &ViolationDefinition> {
        self.modules.iter().flat_map(|module| module.violations.iter())
    }

    /// Total number of definitions
    pub fn definition_count(&self) -> usize {
        self.modules.iter().map(|module| module.violations.len()).sum()
    }

    /// Find a definition by its qualified name
    pub fn find(&self, qualname: &str) -> Option<&ViolationDefinition> {
        self.definitions().find(|definition| definition.qualname() == qualname)
    }
}
