//! Invariant findings and audit results
//!
//! Architecture: Rich Domain Models - Findings know which check produced them and what they point at
//! - InvariantError names a single broken catalog invariant with enough context to fix it
//! - AuditReport acts as an aggregate root collecting findings from every check
//! - CatalogError covers the failures that stop a run before checks can execute

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one catalog consistency check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    /// Codes are unique across the catalog
    UniqueCodes,
    /// Codes stay inside their module's block
    CodeRange,
    /// Each block starts at its base code
    BlockStart,
    /// No accidental single-slot holes in the numbering
    Contiguity,
    /// Message templates are unique across the catalog
    UniqueMessages,
    /// Every definition is sealed
    Finality,
    /// Every code is an integer
    CodeType,
}

impl CheckName {
    /// All checks in reporting order
    pub const ALL: [CheckName; 7] = [
        Self::UniqueCodes,
        Self::CodeRange,
        Self::BlockStart,
        Self::Contiguity,
        Self::UniqueMessages,
        Self::Finality,
        Self::CodeType,
    ];

    /// Stable snake_case name used in reports
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UniqueCodes => "unique_codes",
            Self::CodeRange => "code_range",
            Self::BlockStart => "block_start",
            Self::Contiguity => "contiguity",
            Self::UniqueMessages => "unique_messages",
            Self::Finality => "finality",
            Self::CodeType => "code_type",
        }
    }

    /// Parse a check name as printed by `as_str`
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|check| check.as_str() == name)
    }

    /// One-line statement of the invariant the check enforces
    pub fn description(self) -> &'static str {
        match self {
            Self::UniqueCodes => "Every violation code is held by exactly one definition",
            Self::CodeRange => "Module i only uses codes in [i*100, i*100 + 99]",
            Self::BlockStart => "The lowest code of module i is exactly i*100",
            Self::Contiguity => {
                "Sorted codes inside a module step by 1 or by more than 2, never by exactly 2"
            }
            Self::UniqueMessages => "Every error template is used by exactly one definition",
            Self::Finality => "Every definition is sealed against extension",
            Self::CodeType => "Every code is an integer, not a float, string or boolean",
        }
    }
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A broken catalog invariant
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantError {
    #[error("Duplicate violation codes: {}", join_codes(.codes))]
    DuplicateCode { codes: Vec<i128> },

    #[error("Duplicate error template: {template:?}")]
    DuplicateMessage { template: String },

    #[error("{qualname} has code {code} outside block {block}")]
    OutOfRange { qualname: String, code: i128, block: String },

    #[error("Block {block} does not start at its base code")]
    BadStart { block: String },

    #[error("{qualname} with code {code} leaves a single-code gap before it")]
    Gap { qualname: String, code: i64 },

    #[error("{qualname} has a non-integer code")]
    TypeMismatch { qualname: String },

    #[error("{qualname} is not sealed")]
    NonFinalDefinition { qualname: String },
}

impl InvariantError {
    /// The check this error belongs to
    pub fn check(&self) -> CheckName {
        match self {
            Self::DuplicateCode { .. } => CheckName::UniqueCodes,
            Self::DuplicateMessage { .. } => CheckName::UniqueMessages,
            Self::OutOfRange { .. } => CheckName::CodeRange,
            Self::BadStart { .. } => CheckName::BlockStart,
            Self::Gap { .. } => CheckName::Contiguity,
            Self::TypeMismatch { .. } => CheckName::CodeType,
            Self::NonFinalDefinition { .. } => CheckName::Finality,
        }
    }

    /// The offending code, template, block or definition
    pub fn identifier(&self) -> String {
        match self {
            Self::DuplicateCode { codes } => join_codes(codes),
            Self::DuplicateMessage { template } => template.clone(),
            Self::BadStart { block } => block.clone(),
            Self::OutOfRange { qualname, .. }
            | Self::Gap { qualname, .. }
            | Self::TypeMismatch { qualname }
            | Self::NonFinalDefinition { qualname } => qualname.clone(),
        }
    }
}

fn join_codes(codes: &[i128]) -> String {
    codes.iter().map(i128::to_string).collect::<Vec<_>>().join(", ")
}

/// One reported entry: which check failed, on what, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub check: CheckName,
    pub identifier: String,
    pub detail: String,
}

impl Finding {
    /// Format finding for display
    pub fn format_display(&self) -> String {
        format!("[{}] {}: {}", self.check, self.identifier, self.detail)
    }
}

impl From<&InvariantError> for Finding {
    fn from(error: &InvariantError) -> Self {
        Self {
            check: error.check(),
            identifier: error.identifier(),
            detail: error.to_string(),
        }
    }
}

impl From<InvariantError> for Finding {
    fn from(error: InvariantError) -> Self {
        Self::from(&error)
    }
}

/// Summary statistics for an audit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Number of modules in the catalog
    pub modules: usize,
    /// Number of definitions in the catalog
    pub definitions: usize,
    /// Checks that were executed
    pub checks_run: Vec<CheckName>,
    /// Checks that were skipped (e.g. finality without sealing support)
    pub checks_skipped: Vec<CheckName>,
    /// Total execution time in milliseconds
    pub execution_time_ms: u64,
    /// When the audit was performed
    pub validated_at: DateTime<Utc>,
}

/// Complete audit result for one catalog snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    /// Every broken invariant, in check order
    pub findings: Vec<Finding>,
    /// Summary statistics
    pub summary: AuditSummary,
    /// SHA-256 fingerprint of the audited catalog
    pub catalog_fingerprint: Option<String>,
}

impl AuditReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            findings: Vec::new(),
            summary: AuditSummary {
                validated_at: Utc::now(),
                ..Default::default()
            },
            catalog_fingerprint: None,
        }
    }

    /// Add a finding to the report
    pub fn add_finding(&mut self, finding: impl Into<Finding>) {
        self.findings.push(finding.into());
    }

    /// Whether the catalog passed every executed check
    pub fn is_valid(&self) -> bool {
        self.findings.is_empty()
    }

    /// Findings produced by one check
    pub fn findings_for(&self, check: CheckName) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.check == check)
    }

    /// Record that a check executed
    pub fn mark_run(&mut self, check: CheckName) {
        self.summary.checks_run.push(check);
    }

    /// Record that a check was skipped
    pub fn mark_skipped(&mut self, check: CheckName) {
        self.summary.checks_skipped.push(check);
    }

    /// Set the catalog shape counters
    pub fn set_catalog_shape(&mut self, modules: usize, definitions: usize) {
        self.summary.modules = modules;
        self.summary.definitions = definitions;
    }

    /// Set the execution time
    pub fn set_execution_time(&mut self, duration_ms: u64) {
        self.summary.execution_time_ms = duration_ms;
    }

    /// Set the catalog fingerprint
    pub fn set_catalog_fingerprint(&mut self, fingerprint: impl Into<String>) {
        self.catalog_fingerprint = Some(fingerprint.into());
    }
}

impl Default for AuditReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that stop an audit run
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog is not partitioned into the expected modules
    #[error("Schema error: expected {expected} modules, found {found}")]
    Schema { expected: usize, found: usize },

    /// Manifest could not be read
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Manifest could not be parsed
    #[error("Manifest error in {path}: {message}")]
    Manifest { path: String, message: String },

    /// Report could not be rendered
    #[error("Report error: {message}")]
    Report { message: String },

    /// The catalog broke invariants; raised only by harness helpers
    #[error("Catalog check failed with {findings} finding(s)")]
    Inconsistent { findings: usize },
}

impl CatalogError {
    /// Create a schema error
    pub fn schema(expected: usize, found: usize) -> Self {
        Self::Schema { expected, found }
    }

    /// Create a manifest error
    pub fn manifest(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a report error
    pub fn report(message: impl Into<String>) -> Self {
        Self::Report {
            message: message.into(),
        }
    }

    /// Create an inconsistency error
    pub fn inconsistent(findings: usize) -> Self {
        Self::Inconsistent { findings }
    }

    /// Whether the error concerns the catalog shape rather than I/O
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
