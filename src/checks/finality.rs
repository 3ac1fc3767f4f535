//! Sealing of definitions

use crate::checks::SealingSupport;
use crate::domain::{Catalog, InvariantError};

/// Report every definition that is not sealed
///
/// Returns `None` when sealing is not enforced, so callers can tell a
/// skipped check from a passing one.
pub fn check(catalog: &Catalog, sealing: SealingSupport) -> Option<Vec<InvariantError>> {
    if !sealing.is_enforced() {
        return None;
    }

    Some(
        catalog
            .definitions()
            .filter(|definition| !definition.is_sealed())
            .map(|definition| InvariantError::NonFinalDefinition {
                qualname: definition.qualname().to_string(),
            })
            .collect(),
    )
}
