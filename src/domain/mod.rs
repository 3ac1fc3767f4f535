//! Domain layer for Catalog Guardian
//!
//! CDD Principle: Domain Model - Pure business logic for catalog consistency
//! - Contains the catalog entities, value objects and audit results
//! - Independent of how a catalog is collected or how a report is rendered
//! - Expresses the ubiquitous language of violations, modules, codes and findings

pub mod catalog;
pub mod findings;

// Re-export main domain types for convenience
pub use catalog::*;
pub use findings::*;
