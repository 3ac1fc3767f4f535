//! Catalog consistency checks
//!
//! CDD Principle: Domain Services - Each check is a pure function over one catalog snapshot
//! - Checks never mutate the catalog, so they can run in any order or concurrently
//! - Every broken invariant is collected instead of stopping at the first one
//! - Dispatch by CheckName keeps the runner independent of individual check signatures

pub mod codes;
pub mod finality;
pub mod messages;
pub mod types;

use crate::domain::{Catalog, CheckName, InvariantError};
use crate::registry::ModuleRegistry;
use serde::{Deserialize, Serialize};

/// Whether definitions are expected to carry an enforced seal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SealingSupport {
    /// Every definition must be sealed
    #[default]
    Enforced,
    /// Sealing cannot be enforced; the finality check is skipped
    Unsupported,
}

impl SealingSupport {
    /// Whether unsealed definitions are reported
    pub fn is_enforced(self) -> bool {
        matches!(self, Self::Enforced)
    }
}

/// Everything a check may read during one audit pass
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'c, 'a> {
    pub catalog: &'a Catalog,
    pub registry: &'c ModuleRegistry<'a>,
    pub sealing: SealingSupport,
}

impl<'c, 'a> CheckContext<'c, 'a> {
    pub fn new(
        catalog: &'a Catalog,
        registry: &'c ModuleRegistry<'a>,
        sealing: SealingSupport,
    ) -> Self {
        Self {
            catalog,
            registry,
            sealing,
        }
    }
}

/// Run a single check; `None` means the check was skipped
pub fn run(check: CheckName, context: &CheckContext<'_, '_>) -> Option<Vec<InvariantError>> {
    tracing::debug!("Running check {}", check);

    let errors = match check {
        CheckName::UniqueCodes => codes::check_unique(context.catalog),
        CheckName::CodeRange => codes::check_range(context.registry),
        CheckName::BlockStart => codes::check_start(context.registry),
        CheckName::Contiguity => codes::check_contiguity(context.registry),
        CheckName::UniqueMessages => messages::check(context.catalog),
        CheckName::Finality => finality::check(context.catalog, context.sealing)?,
        CheckName::CodeType => types::check(context.catalog),
    };

    if !errors.is_empty() {
        tracing::debug!("Check {} found {} problem(s)", check, errors.len());
    }
    Some(errors)
}
