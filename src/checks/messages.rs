//! Message template uniqueness

use crate::domain::{Catalog, InvariantError};
use std::collections::HashMap;

/// Report every error template used by more than one definition
///
/// Templates are reported in the order of their first occurrence.
pub fn check(catalog: &Catalog) -> Vec<InvariantError> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for definition in catalog.definitions() {
        let count = counts.entry(definition.error_template()).or_insert_with(|| {
            order.push(definition.error_template());
            0
        });
        *count += 1;
    }

    order
        .into_iter()
        .filter(|template| counts.get(template).copied().unwrap_or(0) > 1)
        .map(|template| InvariantError::DuplicateMessage {
            template: template.to_string(),
        })
        .collect()
}
