//! Code allocation checks: uniqueness, block membership, block start and contiguity

use crate::domain::{Catalog, InvariantError};
use crate::registry::ModuleRegistry;
use std::collections::BTreeMap;

/// Report every integer code held by more than one definition
pub fn check_unique(catalog: &Catalog) -> Vec<InvariantError> {
    let mut counts: BTreeMap<i128, usize> = BTreeMap::new();
    for code in catalog
        .definitions()
        .filter_map(|definition| definition.code().as_wide_integer())
    {
        *counts.entry(code).or_default() += 1;
    }

    let codes: Vec<i128> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(code, _)| code)
        .collect();

    if codes.is_empty() {
        Vec::new()
    } else {
        vec![InvariantError::DuplicateCode { codes }]
    }
}

/// Report definitions whose code falls outside their module's block
pub fn check_range(registry: &ModuleRegistry<'_>) -> Vec<InvariantError> {
    let mut errors = Vec::new();

    for block in registry.blocks() {
        for definition in block.definitions {
            let Some(code) = definition.code().as_wide_integer() else {
                continue;
            };
            let inside = i64::try_from(code).map_or(false, |code| block.contains(code));
            if !inside {
                errors.push(InvariantError::OutOfRange {
                    qualname: definition.qualname().to_string(),
                    code,
                    block: block.label(),
                });
            }
        }
    }

    errors
}

/// Report blocks whose lowest code is not the block base
pub fn check_start(registry: &ModuleRegistry<'_>) -> Vec<InvariantError> {
    registry
        .blocks()
        .iter()
        .filter(|block| block.sorted_codes().first() != Some(&block.base))
        .map(|block| InvariantError::BadStart {
            block: block.label(),
        })
        .collect()
}

/// Report every code that follows its predecessor by exactly two
///
/// A step of 1 is dense numbering and a step above 2 is a deliberately
/// retired range; a step of exactly 2 is treated as an accidental hole.
pub fn check_contiguity(registry: &ModuleRegistry<'_>) -> Vec<InvariantError> {
    let mut errors = Vec::new();

    for block in registry.blocks() {
        let codes = block.sorted_codes();
        for pair in codes.windows(2) {
            let (previous, code) = (pair[0], pair[1]);
            if previous.checked_add(2) != Some(code) {
                continue;
            }
            let qualname = block
                .definitions
                .iter()
                .find(|definition| definition.integer_code() == Some(code))
                .map(|definition| definition.qualname().to_string())
                .unwrap_or_default();
            errors.push(InvariantError::Gap { qualname, code });
        }
    }

    errors
}
