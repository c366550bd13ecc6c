use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Scope prefixed to every generated module name.
pub const DEFAULT_PACKAGE_SCOPE: &str = "@ts-generated";

/// Configuration loaded from `typebridge.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// Scope of generated modules: a type of source module `m` lands in `{scope}/m`.
    pub package_scope: String,
    /// Decorator libraries, in registration order.
    pub decorators: Vec<DecoratorLibrary>,
    /// Additional source types rendered as opaque `any`, mapped to their comment tag.
    pub opaque_types: BTreeMap<String, String>,
    /// Method names that cannot be emitted verbatim on a remote caller.
    pub reserved_words: Vec<String>,
}

/// A package of hand-authored overrides for the types of one source module.
#[derive(Debug, Clone, Deserialize)]
pub struct DecoratorLibrary {
    /// Unscoped source module whose types are decorated.
    pub module: String,
    /// Package the decorators are imported from.
    pub package: String,
    /// Decorator path -> canonical name of the decorated type.
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            package_scope: DEFAULT_PACKAGE_SCOPE.to_owned(),
            decorators: Vec::new(),
            opaque_types: BTreeMap::new(),
            reserved_words: vec!["delete".to_owned(), "copy".to_owned()],
        }
    }
}

impl CodegenConfig {
    pub const FILE_NAME: &'static str = "typebridge.toml";

    /// Load `typebridge.toml` from `root`.
    ///
    /// A missing file yields the default configuration; an unreadable or
    /// malformed file is an error.
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(Self::FILE_NAME);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        Ok(config)
    }

    /// `{scope}/{module}` for an unscoped source module.
    pub fn scoped(&self, module: &str) -> String {
        format!("{}/{}", self.package_scope, module)
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_words.iter().any(|w| w == name)
    }
}

/// The unscoped tail of a module name: `@scope/acme-api` becomes `acme-api`.
pub fn unscoped(module: &str) -> &str {
    module.rsplit('/').next().unwrap_or(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CodegenConfig::load(dir.path()).unwrap();
        assert_eq!(config.package_scope, DEFAULT_PACKAGE_SCOPE);
        assert!(config.is_reserved("delete"));
        assert!(config.decorators.is_empty());
    }

    #[test]
    fn test_load_full_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CodegenConfig::FILE_NAME),
            r#"
package_scope = "@acme"
reserved_words = ["delete", "copy", "new"]

[opaque_types]
"javax.enterprise.event.Event" = "javax event"

[[decorators]]
module = "acme-api"
package = "acme-decorators"

[decorators.entries]
"decorators/Bar" = "com.acme.Bar"
"#,
        )
        .unwrap();
        let config = CodegenConfig::load(dir.path()).unwrap();
        assert_eq!(config.scoped("acme-api"), "@acme/acme-api");
        assert!(config.is_reserved("new"));
        assert_eq!(
            config.opaque_types.get("javax.enterprise.event.Event").map(String::as_str),
            Some("javax event")
        );
        assert_eq!(config.decorators[0].entries.len(), 1);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CodegenConfig::FILE_NAME), "package_scope = [").unwrap();
        let err = CodegenConfig::load(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("typebridge.toml"));
    }

    #[test]
    fn test_unscoped() {
        assert_eq!(unscoped("@ts-generated/acme-api"), "acme-api");
        assert_eq!(unscoped("plain"), "plain");
    }
}
