//! Catalog Guardian - Consistency auditing for violation catalogs
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - Pure domain checks separated from catalog ingestion and report rendering
//! - One audit pass reads one immutable catalog snapshot
//! - Harness integration API turns findings into pass/fail outcomes

pub mod checks;
pub mod domain;
pub mod registry;
pub mod report;
pub mod source;

// Re-export main types for convenient access
pub use domain::{
    AuditReport, AuditSummary, Catalog, CatalogError, CatalogModule, CatalogResult, CheckName,
    CodeValue, Finding, InvariantError, ViolationDefinition,
};

pub use checks::SealingSupport;

pub use registry::{
    BlockStats, ModuleBlock, ModuleRegistry, BLOCK_WIDTH, EXPECTED_MODULES, STANDARD_MODULES,
};

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

pub use source::{CatalogBuilder, CatalogSource, ManifestFormat, ManifestSource};

use checks::CheckContext;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Instant;

/// Options for one audit pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditOptions {
    /// Whether definitions must be sealed
    pub sealing: SealingSupport,
    /// Whether checks run on the rayon thread pool
    pub parallel: bool,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            sealing: SealingSupport::Enforced,
            parallel: true,
        }
    }
}

impl AuditOptions {
    /// Start building options from the defaults
    pub fn builder() -> AuditOptionsBuilder {
        AuditOptionsBuilder::default()
    }
}

/// Builder for programmatic construction of audit options
#[derive(Debug, Default)]
pub struct AuditOptionsBuilder {
    options: AuditOptions,
}

impl AuditOptionsBuilder {
    /// Set sealing support
    pub fn sealing(mut self, sealing: SealingSupport) -> Self {
        self.options.sealing = sealing;
        self
    }

    /// Run checks sequentially on the calling thread
    pub fn sequential(mut self) -> Self {
        self.options.parallel = false;
        self
    }

    /// Finish building
    pub fn build(self) -> AuditOptions {
        self.options
    }
}

/// Main auditor running every consistency check over a catalog snapshot
#[derive(Debug, Clone, Default)]
pub struct CatalogAuditor {
    options: AuditOptions,
}

impl CatalogAuditor {
    /// Create an auditor with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an auditor with the given options
    pub fn with_options(options: AuditOptions) -> Self {
        Self { options }
    }

    /// Options this auditor runs with
    pub fn options(&self) -> &AuditOptions {
        &self.options
    }

    /// Audit one catalog snapshot
    ///
    /// A catalog that is not partitioned into the expected modules fails
    /// with [`CatalogError::Schema`] before any check runs. Every other
    /// problem is collected into the returned report.
    pub fn audit(&self, catalog: &Catalog) -> CatalogResult<AuditReport> {
        let start_time = Instant::now();
        let registry = ModuleRegistry::build(catalog)?;
        let context = CheckContext::new(catalog, &registry, self.options.sealing);

        let all_checks = CheckName::ALL;
        let outcomes: Vec<(CheckName, Option<Vec<InvariantError>>)> = if self.options.parallel {
            all_checks[..]
                .par_iter()
                .map(|&check| (check, checks::run(check, &context)))
                .collect()
        } else {
            all_checks
                .iter()
                .map(|&check| (check, checks::run(check, &context)))
                .collect()
        };

        let mut report = AuditReport::new();
        for (check, outcome) in outcomes {
            match outcome {
                Some(errors) => {
                    report.mark_run(check);
                    for error in &errors {
                        report.add_finding(error);
                    }
                }
                None => {
                    tracing::warn!("Skipping check {}: sealing is not enforced", check);
                    report.mark_skipped(check);
                }
            }
        }

        report.set_catalog_shape(catalog.module_count(), catalog.definition_count());
        report.set_catalog_fingerprint(catalog_fingerprint(catalog)?);
        report.set_execution_time(start_time.elapsed().as_millis() as u64);

        tracing::info!(
            "Audited {} definitions in {} modules: {} finding(s)",
            report.summary.definitions,
            report.summary.modules,
            report.findings.len()
        );

        Ok(report)
    }

    /// Load a fresh snapshot from a source and audit it
    pub fn audit_source(&self, source: &dyn CatalogSource) -> CatalogResult<AuditReport> {
        tracing::debug!("Loading catalog from {}", source.describe());
        let catalog = source.load()?;
        self.audit(&catalog)
    }
}

/// SHA-256 over the canonical JSON form of a catalog
pub fn catalog_fingerprint(catalog: &Catalog) -> CatalogResult<String> {
    let canonical = serde_json::to_vec(catalog)
        .map_err(|e| CatalogError::report(format!("Failed to serialize catalog: {e}")))?;

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Convenience function to audit a catalog with default settings
pub fn audit_catalog(catalog: &Catalog) -> CatalogResult<AuditReport> {
    CatalogAuditor::new().audit(catalog)
}

/// Convenience function to audit a manifest file with default settings
pub fn audit_manifest<P: AsRef<Path>>(path: P) -> CatalogResult<AuditReport> {
    CatalogAuditor::new().audit_source(&ManifestSource::new(path))
}

/// Test harness integration utilities
pub mod harness {
    use super::*;

    /// Fail when the catalog breaks any invariant
    ///
    /// Meant to be called from a test of the tool owning the catalog, so a
    /// broken catalog fails the build.
    pub fn assert_consistent(source: &dyn CatalogSource) -> CatalogResult<()> {
        let report = CatalogAuditor::new().audit_source(source)?;

        if !report.is_valid() {
            for finding in &report.findings {
                tracing::error!("{}", finding.format_display());
            }
            return Err(CatalogError::inconsistent(report.findings.len()));
        }

        Ok(())
    }

    /// Audit with sealing treated as unsupported
    ///
    /// For catalogs produced by environments that cannot seal definitions.
    pub fn compatibility_check(source: &dyn CatalogSource) -> CatalogResult<AuditReport> {
        let options = AuditOptions::builder()
            .sealing(SealingSupport::Unsupported)
            .build();
        CatalogAuditor::with_options(options).audit_source(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Seven modules, three dense sealed definitions each
    fn valid_catalog() -> Catalog {
        let mut builder = CatalogBuilder::new();
        for (index, name) in STANDARD_MODULES.iter().enumerate() {
            let base = index as i64 * BLOCK_WIDTH;
            builder = builder.register_all(
                *name,
                (0..3).map(|offset| {
                    ViolationDefinition::new(
                        base + offset,
                        format!("Found {name} issue {offset}"),
                        format!("{name}::Violation{offset}"),
                    )
                }),
            );
        }
        builder.build()
    }

    fn set_first_module_codes(catalog: &mut Catalog, codes: &[i64]) {
        catalog.modules[0].violations = codes
            .iter()
            .map(|code| {
                ViolationDefinition::new(*code, format!("Naming {code}"), format!("Naming{code}"))
            })
            .collect();
    }

    fn sequential() -> CatalogAuditor {
        CatalogAuditor::with_options(AuditOptions::builder().sequential().build())
    }

    #[test]
    fn test_valid_catalog_has_no_findings() {
        let report = audit_catalog(&valid_catalog()).unwrap();

        assert!(report.is_valid());
        assert_eq!(report.summary.modules, 7);
        assert_eq!(report.summary.definitions, 21);
        assert_eq!(report.summary.checks_run, CheckName::ALL.to_vec());
        assert!(report.summary.checks_skipped.is_empty());
        assert_eq!(report.catalog_fingerprint.as_ref().map(String::len), Some(64));
    }

    #[test]
    fn test_reserved_gap_is_accepted() {
        let mut catalog = valid_catalog();
        set_first_module_codes(&mut catalog, &[0, 1, 2, 5]);

        assert!(audit_catalog(&catalog).unwrap().is_valid());
    }

    #[test]
    fn test_single_code_gap_is_rejected() {
        let mut catalog = valid_catalog();
        set_first_module_codes(&mut catalog, &[0, 1, 3]);

        let report = audit_catalog(&catalog).unwrap();
        let gaps: Vec<&Finding> = report.findings_for(CheckName::Contiguity).collect();

        assert_eq!(report.findings.len(), 1);
        assert_eq!(gaps[0].identifier, "Naming3");
    }

    #[test]
    fn test_duplicate_code() {
        let mut catalog = valid_catalog();
        catalog.modules[0]
            .violations
            .push(ViolationDefinition::new(42, "First 42", "First42"));
        catalog.modules[0]
            .violations
            .push(ViolationDefinition::new(42, "Second 42", "Second42"));

        let report = audit_catalog(&catalog).unwrap();
        let duplicates: Vec<&Finding> = report.findings_for(CheckName::UniqueCodes).collect();

        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].identifier, "42");
    }

    #[test]
    fn test_duplicate_message() {
        let mut catalog = valid_catalog();
        catalog.modules[1]
            .violations
            .push(ViolationDefinition::new(103, "Found wrong X", "WrongX"));
        catalog.modules[2]
            .violations
            .push(ViolationDefinition::new(203, "Found wrong X", "AlsoWrongX"));

        let report = audit_catalog(&catalog).unwrap();

        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].check, CheckName::UniqueMessages);
        assert_eq!(report.findings[0].identifier, "Found wrong X");
    }

    #[test]
    fn test_out_of_range_code() {
        let mut catalog = valid_catalog();
        catalog.modules[2]
            .violations
            .push(ViolationDefinition::new(150, "Misplaced", "Misplaced"));

        let report = audit_catalog(&catalog).unwrap();
        let out_of_range: Vec<&Finding> = report.findings_for(CheckName::CodeRange).collect();

        assert_eq!(out_of_range.len(), 1);
        assert_eq!(out_of_range[0].identifier, "Misplaced");
        assert!(out_of_range[0].detail.contains("150"));
    }

    #[test]
    fn test_wrong_module_count_aborts() {
        let mut catalog = valid_catalog();
        catalog.modules.pop();
        // would trip every other check if they ran
        set_first_module_codes(&mut catalog, &[5, 7]);

        let error = audit_catalog(&catalog).unwrap_err();
        assert!(matches!(error, CatalogError::Schema { expected: 7, found: 6 }));
    }

    #[test]
    fn test_all_problems_collected_in_one_pass() {
        let mut catalog = valid_catalog();
        catalog.modules[3].violations.push(ViolationDefinition::declared(
            CodeValue::Float(303.0),
            "Float code",
            "FloatCode",
            false,
        ));
        catalog.modules[4].violations[0] = ViolationDefinition::new(401, "Moved", "Moved");

        let report = audit_catalog(&catalog).unwrap();
        let checks: Vec<CheckName> = report.findings.iter().map(|f| f.check).collect();

        assert!(checks.contains(&CheckName::UniqueCodes));
        assert!(checks.contains(&CheckName::BlockStart));
        assert!(checks.contains(&CheckName::Finality));
        assert!(checks.contains(&CheckName::CodeType));
    }

    #[rstest]
    #[case(SealingSupport::Enforced, 1)]
    #[case(SealingSupport::Unsupported, 0)]
    fn test_sealing_support(#[case] sealing: SealingSupport, #[case] expected: usize) {
        let mut catalog = valid_catalog();
        catalog.modules[6].violations.push(ViolationDefinition::declared(
            CodeValue::Integer(603),
            "Open definition",
            "OpenDefinition",
            false,
        ));

        let auditor = CatalogAuditor::with_options(AuditOptions::builder().sealing(sealing).build());
        let report = auditor.audit(&catalog).unwrap();

        assert_eq!(report.findings.len(), expected);
        assert_eq!(
            report.summary.checks_skipped.contains(&CheckName::Finality),
            !sealing.is_enforced()
        );
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let mut catalog = valid_catalog();
        set_first_module_codes(&mut catalog, &[1, 3, 150]);
        catalog.modules[5]
            .violations
            .push(ViolationDefinition::new(3, "Naming 3", "Duplicate"));

        let parallel = audit_catalog(&catalog).unwrap();
        let sequential = sequential().audit(&catalog).unwrap();

        assert_eq!(parallel.findings, sequential.findings);
        assert_eq!(parallel.catalog_fingerprint, sequential.catalog_fingerprint);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let catalog = valid_catalog();
        let mut changed = catalog.clone();
        set_first_module_codes(&mut changed, &[0, 1, 2, 3]);

        assert_eq!(
            catalog_fingerprint(&catalog).unwrap(),
            catalog_fingerprint(&catalog.clone()).unwrap()
        );
        assert_ne!(
            catalog_fingerprint(&catalog).unwrap(),
            catalog_fingerprint(&changed).unwrap()
        );
    }

    #[test]
    fn test_harness() {
        assert!(harness::assert_consistent(&valid_catalog()).is_ok());

        let mut broken = valid_catalog();
        set_first_module_codes(&mut broken, &[0, 2]);
        let error = harness::assert_consistent(&broken).unwrap_err();
        assert!(matches!(error, CatalogError::Inconsistent { findings: 1 }));

        let report = harness::compatibility_check(&valid_catalog()).unwrap();
        assert_eq!(report.summary.checks_skipped, vec![CheckName::Finality]);
    }

    #[test]
    fn test_audit_manifest() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.yaml");
        std::fs::write(
            &path,
            ManifestSource::render(&valid_catalog(), ManifestFormat::Yaml).unwrap(),
        )
        .unwrap();

        let report = audit_manifest(&path).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.summary.definitions, 21);
    }

    fn write_yaml(dir: &tempfile::TempDir, catalog: &Catalog) -> std::path::PathBuf {
        let path = dir.path().join("catalog.yaml");
        std::fs::write(&path, ManifestSource::render(catalog, ManifestFormat::Yaml).unwrap())
            .unwrap();
        path
    }

    #[test]
    fn test_manifest_with_extreme_codes() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut catalog = valid_catalog();
        set_first_module_codes(&mut catalog, &[0, i64::MIN, i64::MAX]);
        let path = write_yaml(&temp_dir, &catalog);

        let report = sequential().audit_source(&ManifestSource::new(&path)).unwrap();

        assert_eq!(report.findings_for(CheckName::CodeRange).count(), 2);
        assert_eq!(report.findings_for(CheckName::Contiguity).count(), 0);
        assert_eq!(report.findings_for(CheckName::CodeType).count(), 0);
    }

    #[test]
    fn test_manifest_with_code_above_i64() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut catalog = valid_catalog();
        catalog.modules[0].violations.push(ViolationDefinition::declared(
            CodeValue::Unsigned(u64::MAX),
            "Big code",
            "Big",
            true,
        ));
        let path = write_yaml(&temp_dir, &catalog);

        let report = audit_manifest(&path).unwrap();
        let out_of_range: Vec<&Finding> = report.findings_for(CheckName::CodeRange).collect();

        assert_eq!(report.findings.len(), 1);
        assert_eq!(out_of_range[0].identifier, "Big");
        assert!(out_of_range[0].detail.contains("18446744073709551615"));
    }
}
