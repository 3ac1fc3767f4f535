//! Catalog ingestion
//!
//! Architecture: Anti-Corruption Layer - Sources translate external catalog shapes into domain objects
//! - Definitions are registered explicitly per module, no discovery by introspection
//! - Manifests in YAML or JSON are converted to the same Catalog aggregate
//! - Every source hands out a fresh snapshot; nothing is cached between loads

use crate::domain::{Catalog, CatalogError, CatalogModule, CatalogResult, ViolationDefinition};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Anything that can supply a catalog snapshot
pub trait CatalogSource {
    /// Assemble the full catalog, modules in their stable order
    fn load(&self) -> CatalogResult<Catalog>;

    /// Human-readable origin of the catalog, for logs
    fn describe(&self) -> String;
}

impl CatalogSource for Catalog {
    fn load(&self) -> CatalogResult<Catalog> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        "in-memory catalog".to_string()
    }
}

/// Module name used when definitions are registered before any module is opened
pub const DEFAULT_MODULE: &str = "default";

/// Explicit registration of definitions, module by module
///
/// ```
/// use catalog_guardian::{CatalogBuilder, ViolationDefinition};
///
/// let catalog = CatalogBuilder::new()
///     .module("naming")
///     .register(ViolationDefinition::new(0, "Found wrong name", "WrongNameViolation"))
///     .register(ViolationDefinition::new(1, "Found short name", "TooShortNameViolation"))
///     .module("complexity")
///     .register(ViolationDefinition::new(100, "Found too many locals", "TooManyLocalsViolation"))
///     .build();
///
/// assert_eq!(catalog.module_count(), 2);
/// assert_eq!(catalog.definition_count(), 3);
/// ```
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    modules: Vec<CatalogModule>,
    current: Option<usize>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a module; following registrations belong to it
    ///
    /// Reopening an existing module keeps its original position.
    pub fn module(mut self, name: impl Into<String>) -> Self {
        self.current = Some(self.position_of(name.into()));
        self
    }

    /// Register a definition in the most recently opened module
    pub fn register(mut self, definition: ViolationDefinition) -> Self {
        let index = match self.current {
            Some(index) => index,
            None => {
                let index = self.position_of(DEFAULT_MODULE.to_string());
                self.current = Some(index);
                index
            }
        };
        self.modules[index].violations.push(definition);
        self
    }

    /// Register several definitions in the named module
    pub fn register_all(
        mut self,
        module: impl Into<String>,
        definitions: impl IntoIterator<Item = ViolationDefinition>,
    ) -> Self {
        let index = self.position_of(module.into());
        self.modules[index].violations.extend(definitions);
        self.current = Some(index);
        self
    }

    /// Finish registration
    pub fn build(self) -> Catalog {
        Catalog::new(self.modules)
    }

    fn position_of(&mut self, name: String) -> usize {
        match self.modules.iter().position(|module| module.name == name) {
            Some(index) => index,
            None => {
                self.modules.push(CatalogModule::new(name));
                self.modules.len() - 1
            }
        }
    }
}

/// Serialized catalog layout
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Manifest {
    modules: Vec<CatalogModule>,
}

/// Manifest encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Json,
}

impl ManifestFormat {
    /// Pick the format from a file extension; anything but `.json` is YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Catalog described by a YAML or JSON manifest file
#[derive(Debug, Clone)]
pub struct ManifestSource {
    path: PathBuf,
}

impl ManifestSource {
    /// Source reading the manifest at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Manifest location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse manifest content in the given format
    pub fn parse_str(content: &str, format: ManifestFormat) -> CatalogResult<Catalog> {
        Self::parse(content, format, "<inline>")
    }

    fn parse(content: &str, format: ManifestFormat, origin: &str) -> CatalogResult<Catalog> {
        let manifest: Manifest = match format {
            ManifestFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| CatalogError::manifest(origin, e.to_string()))?,
            ManifestFormat::Json => serde_json::from_str(content)
                .map_err(|e| CatalogError::manifest(origin, e.to_string()))?,
        };

        Ok(Catalog::new(manifest.modules))
    }

    /// Serialize a catalog into manifest form
    pub fn render(catalog: &Catalog, format: ManifestFormat) -> CatalogResult<String> {
        let manifest = Manifest {
            modules: catalog.modules.clone(),
        };
        match format {
            ManifestFormat::Yaml => serde_yaml::to_string(&manifest)
                .map_err(|e| CatalogError::manifest("<render>", e.to_string())),
            ManifestFormat::Json => serde_json::to_string_pretty(&manifest)
                .map_err(|e| CatalogError::manifest("<render>", e.to_string())),
        }
    }
}

impl CatalogSource for ManifestSource {
    fn load(&self) -> CatalogResult<Catalog> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            CatalogError::manifest(
                self.path.display().to_string(),
                format!("Failed to read manifest: {e}"),
            )
        })?;

        let catalog = Self::parse(
            &contents,
            ManifestFormat::from_path(&self.path),
            &self.path.display().to_string(),
        )?;
        tracing::debug!(
            "Loaded {} definitions in {} modules from {}",
            catalog.definition_count(),
            catalog.module_count(),
            self.path.display()
        );
        Ok(catalog)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CodeValue;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
modules:
  - name: naming
    violations:
      - code: 0
        error_template: "Found wrong name: {0}"
        qualname: WrongNameViolation
        sealed: true
      - code: "1"
        error_template: "Found short name: {0}"
        qualname: TooShortNameViolation
  - name: complexity
    violations: []
"#;

    #[test]
    fn test_builder_keeps_module_order() {
        let catalog = CatalogBuilder::new()
            .module("naming")
            .register(ViolationDefinition::new(0, "a", "A"))
            .module("complexity")
            .register(ViolationDefinition::new(100, "b", "B"))
            .module("naming")
            .register(ViolationDefinition::new(1, "c", "C"))
            .build();

        let names: Vec<&str> = catalog.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["naming", "complexity"]);
        assert_eq!(catalog.modules[0].violations.len(), 2);
    }

    #[test]
    fn test_builder_register_without_module() {
        let catalog = CatalogBuilder::new()
            .register(ViolationDefinition::new(0, "a", "A"))
            .register_all("system", vec![ViolationDefinition::new(600, "b", "B")])
            .build();

        assert_eq!(catalog.modules[0].name, DEFAULT_MODULE);
        assert_eq!(catalog.modules[1].name, "system");
    }

    #[test]
    fn test_parse_yaml_manifest() {
        let catalog = ManifestSource::parse_str(MANIFEST, ManifestFormat::Yaml).unwrap();

        assert_eq!(catalog.module_count(), 2);
        let naming = &catalog.modules[0];
        assert!(naming.violations[0].is_sealed());
        assert!(!naming.violations[1].is_sealed());
        assert_eq!(
            naming.violations[1].code(),
            &CodeValue::Text("1".to_string())
        );
        assert!(catalog.modules[1].violations.is_empty());
    }

    #[test]
    fn test_load_from_file_picks_format_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = ManifestSource::parse_str(MANIFEST, ManifestFormat::Yaml).unwrap();

        let json_path = temp_dir.path().join("catalog.json");
        fs::write(
            &json_path,
            ManifestSource::render(&catalog, ManifestFormat::Json).unwrap(),
        )
        .unwrap();
        let yaml_path = temp_dir.path().join("catalog.yaml");
        fs::write(&yaml_path, MANIFEST).unwrap();

        assert_eq!(ManifestSource::new(&json_path).load().unwrap(), catalog);
        assert_eq!(ManifestSource::new(&yaml_path).load().unwrap(), catalog);
    }

    #[test]
    fn test_missing_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let source = ManifestSource::new(temp_dir.path().join("absent.yaml"));

        let error = source.load().unwrap_err();
        assert!(matches!(error, CatalogError::Manifest { .. }));
        assert!(error.to_string().contains("Failed to read manifest"));
    }

    #[test]
    fn test_malformed_manifest() {
        let error = ManifestSource::parse_str("modules: 12", ManifestFormat::Yaml).unwrap_err();
        assert!(matches!(error, CatalogError::Manifest { .. }));
    }
}
