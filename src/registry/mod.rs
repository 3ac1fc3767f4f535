//! Module ordering and code block allocation
//!
//! Architecture: Domain Services - The registry partitions the catalog into numbered blocks
//! - Block positions are fixed by module order, never configured
//! - Blocks borrow their definitions from the catalog snapshot
//! - A malformed partition is a schema error that stops the run

use crate::domain::{Catalog, CatalogError, CatalogResult, ViolationDefinition};
use serde::Serialize;
use std::ops::RangeInclusive;

/// Number of modules a catalog is partitioned into
pub const EXPECTED_MODULES: usize = 7;

/// Number of codes reserved for each module
pub const BLOCK_WIDTH: i64 = 100;

/// Canonical module order; position determines the code block
pub const STANDARD_MODULES: [&str; EXPECTED_MODULES] = [
    "naming",
    "complexity",
    "consistency",
    "best_practices",
    "refactoring",
    "oop",
    "system",
];

/// A module's reserved numbering region and the definitions it owns
#[derive(Debug, Clone, Copy)]
pub struct ModuleBlock<'a> {
    /// Position in the module ordering
    pub index: usize,
    /// Module name as supplied by the catalog
    pub name: &'a str,
    /// First code of the block
    pub base: i64,
    /// Number of codes in the block
    pub width: i64,
    /// Definitions owned by the module
    pub definitions: &'a [ViolationDefinition],
}

impl<'a> ModuleBlock<'a> {
    /// Highest code that still belongs to the block
    pub fn last(&self) -> i64 {
        self.base + self.width - 1
    }

    /// Inclusive range of codes reserved for the block
    pub fn range(&self) -> RangeInclusive<i64> {
        self.base..=self.last()
    }

    /// Whether `code` lies inside the block
    pub fn contains(&self, code: i64) -> bool {
        self.range().contains(&code)
    }

    /// Integer codes of the block, sorted ascending with duplicates removed
    pub fn sorted_codes(&self) -> Vec<i64> {
        let mut codes: Vec<i64> = self
            .definitions
            .iter()
            .filter_map(ViolationDefinition::integer_code)
            .collect();
        codes.sort_unstable();
        codes.dedup();
        codes
    }

    /// Label used in diagnostics, e.g. `2 (consistency)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.index, self.name)
    }

    /// Occupancy statistics for the block
    pub fn stats(&self) -> BlockStats {
        let codes = self.sorted_codes();
        let lowest = codes.first().copied();
        let highest = codes.last().copied();
        let next_free = match highest {
            Some(code) if code < self.last() && code >= self.base => Some(code + 1),
            Some(_) => None,
            None => Some(self.base),
        };

        BlockStats {
            index: self.index,
            name: self.name.to_string(),
            base: self.base,
            last: self.last(),
            definitions: self.definitions.len(),
            lowest,
            highest,
            next_free,
        }
    }
}

/// Occupancy of one module block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockStats {
    pub index: usize,
    pub name: String,
    pub base: i64,
    pub last: i64,
    pub definitions: usize,
    pub lowest: Option<i64>,
    pub highest: Option<i64>,
    /// Code the next definition of the module should take
    pub next_free: Option<i64>,
}

/// Ordered module blocks of one catalog snapshot
#[derive(Debug, Clone)]
pub struct ModuleRegistry<'a> {
    blocks: Vec<ModuleBlock<'a>>,
}

impl<'a> ModuleRegistry<'a> {
    /// Partition a catalog into its code blocks
    pub fn build(catalog: &'a Catalog) -> CatalogResult<Self> {
        let found = catalog.module_count();
        if found != EXPECTED_MODULES {
            tracing::warn!(
                "Catalog has {} modules, expected {}",
                found,
                EXPECTED_MODULES
            );
            return Err(CatalogError::schema(EXPECTED_MODULES, found));
        }

        let blocks = catalog
            .modules
            .iter()
            .enumerate()
            .map(|(index, module)| ModuleBlock {
                index,
                name: module.name.as_str(),
                base: index as i64 * BLOCK_WIDTH,
                width: BLOCK_WIDTH,
                definitions: module.violations.as_slice(),
            })
            .collect();

        Ok(Self { blocks })
    }

    /// Blocks in module order
    pub fn blocks(&self) -> &[ModuleBlock<'a>] {
        &self.blocks
    }

    /// Block whose reserved range contains `code`
    pub fn block_for(&self, code: i64) -> Option<&ModuleBlock<'a>> {
        self.blocks.iter().find(|block| block.contains(code))
    }

    /// Block by module name
    pub fn block_named(&self, name: &str) -> Option<&ModuleBlock<'a>> {
        self.blocks.iter().find(|block| block.name == name)
    }

    /// Occupancy statistics for every block
    pub fn stats(&self) -> Vec<BlockStats> {
        self.blocks.iter().map(ModuleBlock::stats).collect()
    }
}
