//! Report generation with multiple output formats
//!
//! CDD Principle: Anti-Corruption Layer - Formatters translate domain objects to external formats
//! - AuditReport (domain) is converted to various external representations
//! - Each formatter encapsulates the rules for its specific output format
//! - Domain logic remains pure while supporting multiple presentation needs

use crate::domain::{AuditReport, CatalogError, CatalogResult, CheckName, Finding};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::io::Write;

/// Supported output formats for audit reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format with optional colors
    Human,
    /// JSON format for programmatic consumption
    Json,
    /// JUnit XML format for CI test runners
    Junit,
    /// GitHub Actions annotations
    GitHub,
}

impl OutputFormat {
    /// Parse format from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            "junit" => Some(Self::Junit),
            "github" => Some(Self::GitHub),
            _ => None,
        }
    }

    /// Get all available format names
    pub fn all_formats() -> &'static [&'static str] {
        &["human", "json", "junit", "github"]
    }
}

/// Options for customizing report output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use colored output (for human format)
    pub use_colors: bool,
    /// Maximum number of findings to include
    pub max_findings: Option<usize>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            use_colors: true,
            max_findings: None,
        }
    }
}

/// Renders audit reports
#[derive(Debug, Clone, Default)]
pub struct ReportFormatter {
    options: ReportOptions,
}

impl ReportFormatter {
    /// Create a formatter with the given options
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Format an audit report in the specified format
    pub fn format_report(&self, report: &AuditReport, format: OutputFormat) -> CatalogResult<String> {
        let findings = self.limit_findings(&report.findings);

        match format {
            OutputFormat::Human => Ok(self.format_human(report, &findings)),
            OutputFormat::Json => self.format_json(report, &findings),
            OutputFormat::Junit => Ok(self.format_junit(report, &findings)),
            OutputFormat::GitHub => Ok(self.format_github(&findings)),
        }
    }

    /// Write a formatted report to a writer
    pub fn write_report<W: Write>(
        &self,
        report: &AuditReport,
        format: OutputFormat,
        mut writer: W,
    ) -> CatalogResult<()> {
        let formatted = self.format_report(report, format)?;
        writer.write_all(formatted.as_bytes())?;
        if !formatted.ends_with('\n') {
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn limit_findings<'a>(&self, findings: &'a [Finding]) -> Vec<&'a Finding> {
        let limit = self.options.max_findings.unwrap_or(findings.len());
        findings.iter().take(limit).collect()
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.options.use_colors {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn format_human(&self, report: &AuditReport, findings: &[&Finding]) -> String {
        let mut output = String::new();

        if findings.is_empty() {
            output.push_str(&format!("✅ {}\n", self.paint("32", "Violation catalog is consistent")));
        } else {
            output.push_str(&format!(
                "❌ {}\n\n",
                self.paint("31", "Violation Catalog Inconsistencies Found")
            ));

            let mut by_check: BTreeMap<CheckName, Vec<&Finding>> = BTreeMap::new();
            for finding in findings {
                by_check.entry(finding.check).or_default().push(finding);
            }

            for (check, check_findings) in by_check {
                output.push_str(&format!("📋 {} - {}\n", check, check.description()));
                for finding in check_findings {
                    output.push_str(&format!(
                        "  {} {}\n",
                        self.paint("2", &finding.identifier),
                        finding.detail
                    ));
                }
                output.push('\n');
            }
        }

        if !report.summary.checks_skipped.is_empty() {
            let skipped: Vec<&str> = report
                .summary
                .checks_skipped
                .iter()
                .map(|check| check.as_str())
                .collect();
            output.push_str(&format!(
                "⏭️  {}\n",
                self.paint("33", &format!("Skipped: {}", skipped.join(", ")))
            ));
        }

        output.push_str(&self.format_summary(report));
        output
    }

    fn format_summary(&self, report: &AuditReport) -> String {
        let total = report.findings.len();
        let execution_time = (report.summary.execution_time_ms as f64) / 1000.0;
        let counted = if total == 0 {
            self.paint("32", "0 findings")
        } else {
            self.paint(
                "31",
                &format!("{} finding{}", total, if total == 1 { "" } else { "s" }),
            )
        };

        format!(
            "📊 {} {} across {} modules and {} definitions ({:.1}s)\n",
            self.paint("1", "Summary:"),
            counted,
            report.summary.modules,
            report.summary.definitions,
            execution_time
        )
    }

    fn format_json(&self, report: &AuditReport, findings: &[&Finding]) -> CatalogResult<String> {
        let json_report = serde_json::json!({
            "valid": report.is_valid(),
            "findings": findings,
            "summary": report.summary,
            "catalog_fingerprint": report.catalog_fingerprint,
        });

        serde_json::to_string_pretty(&json_report)
            .map_err(|e| CatalogError::report(format!("JSON serialization failed: {e}")))
    }

    /// One testcase per executed check, failing when the check has findings
    ///
    /// Pass or fail comes from every finding of the report; `max_findings`
    /// only limits the `<failure>` elements listed.
    fn format_junit(&self, report: &AuditReport, findings: &[&Finding]) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        let failed = |check: CheckName| report.findings_for(check).next().is_some();
        let failures = report
            .summary
            .checks_run
            .iter()
            .filter(|check| failed(**check))
            .count();
        let execution_time = (report.summary.execution_time_ms as f64) / 1000.0;

        xml.push_str(&format!(
            "<testsuite name=\"catalog-guardian\" tests=\"{}\" failures=\"{}\" skipped=\"{}\" time=\"{:.3}\">\n",
            report.summary.checks_run.len() + report.summary.checks_skipped.len(),
            failures,
            report.summary.checks_skipped.len(),
            execution_time
        ));

        for check in &report.summary.checks_run {
            xml.push_str(&format!(
                "  <testcase classname=\"catalog\" name=\"{}\">\n",
                check
            ));
            let listed: Vec<&&Finding> = findings.iter().filter(|f| f.check == *check).collect();
            for finding in &listed {
                xml.push_str(&format!(
                    "    <failure message=\"{}\">{}</failure>\n",
                    escape_xml(&finding.detail),
                    escape_xml(&finding.identifier)
                ));
            }
            if listed.is_empty() && failed(*check) {
                let total = report.findings_for(*check).count();
                xml.push_str(&format!(
                    "    <failure message=\"{} finding(s) not listed\"/>\n",
                    total
                ));
            }
            xml.push_str("  </testcase>\n");
        }

        for check in &report.summary.checks_skipped {
            xml.push_str(&format!(
                "  <testcase classname=\"catalog\" name=\"{}\">\n    <skipped/>\n  </testcase>\n",
                check
            ));
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    fn format_github(&self, findings: &[&Finding]) -> String {
        let mut output = String::new();

        for finding in findings {
            output.push_str(&format!(
                "::error title={}::{}\n",
                finding.check, finding.detail
            ));
        }

        output
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
