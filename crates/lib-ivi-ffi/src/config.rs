//! Driver configuration loading and validation.

use crate::error::{IviError, IviResult};
use lib_ivi_types::{AttributeDescriptor, OpenOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Static description of one driver library.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Path or name of the shared library (e.g. `libnifake_64.so`).
    pub library: PathBuf,

    /// Symbol prefix of every entry point (e.g. `niFake_`).
    pub prefix: String,

    /// Resource opened by [`crate::Session::open_configured`].
    #[serde(default)]
    pub resource: Option<String>,

    /// Initialize options used by [`crate::Session::open_configured`].
    #[serde(default)]
    pub options: OpenOptions,

    /// Attribute catalog for name-based access.
    #[serde(default)]
    pub attributes: Vec<AttributeDescriptor>,
}

impl DriverConfig {
    /// Full symbol name of an entry point.
    pub fn symbol(&self, entry_point: &str) -> String {
        format!("{}{}", self.prefix, entry_point)
    }

    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> IviResult<()> {
        if self.prefix.trim().is_empty() {
            return Err(IviError::Config("Entry-point prefix must not be empty".into()));
        }

        let mut names = HashSet::new();
        let mut ids = HashSet::new();
        for attr in &self.attributes {
            if attr.name.is_empty() {
                return Err(IviError::Config(format!(
                    "Attribute {} has an empty name",
                    attr.id
                )));
            }
            if !names.insert(attr.name.as_str()) {
                return Err(IviError::Config(format!(
                    "Duplicate attribute name '{}'",
                    attr.name
                )));
            }
            if !ids.insert(attr.id) {
                return Err(IviError::Config(format!(
                    "Duplicate attribute id {} ('{}')",
                    attr.id, attr.name
                )));
            }
        }

        Ok(())
    }
}

/// Load a driver configuration from a JSON or TOML file.
pub fn load_config(path: &Path) -> IviResult<DriverConfig> {
    let content = std::fs::read_to_string(path)?;

    let config: DriverConfig = if path.extension().map_or(false, |e| e == "json") {
        serde_json::from_str(&content)?
    } else {
        toml::from_str(&content)?
    };

    config.validate()?;

    tracing::debug!(
        path = %path.display(),
        library = %config.library.display(),
        attributes = config.attributes.len(),
        "Loaded driver configuration"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_ivi_types::AttributeType;
    use std::io::Write;

    const NIFAKE_TOML: &str = r#"
library = "libnifake_64.so"
prefix = "niFake_"
resource = "Dev1"

[options]
option_string = "Simulate=1"

[[attributes]]
name = "read_write_bool"
id = 1000000
type = "boolean"

[[attributes]]
name = "read_write_string"
id = 1000002
type = "string"
"#;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_toml() {
        let file = write_temp(".toml", NIFAKE_TOML);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.prefix, "niFake_");
        assert_eq!(config.resource.as_deref(), Some("Dev1"));
        assert_eq!(config.options.option_string, "Simulate=1");
        assert!(!config.options.id_query);
        assert_eq!(config.attributes.len(), 2);
        assert_eq!(config.attributes[1].ty, AttributeType::String);
        assert_eq!(config.symbol("close"), "niFake_close");
    }

    #[test]
    fn test_load_json() {
        let json = r#"{
            "library": "nifake_64.dll",
            "prefix": "niFake_",
            "attributes": [
                {"name": "read_write_double", "id": 1000001, "type": "real64"}
            ]
        }"#;
        let file = write_temp(".json", json);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.resource, None);
        assert_eq!(config.options, OpenOptions::default());
        assert_eq!(config.attributes[0].ty, AttributeType::Real64);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let toml = r#"
library = "libnifake_64.so"
prefix = "niFake_"

[[attributes]]
name = "a"
id = 7
type = "int32"

[[attributes]]
name = "b"
id = 7
type = "int64"
"#;
        let file = write_temp(".toml", toml);
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, IviError::Config(ref msg) if msg.contains("Duplicate attribute id 7")));
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let file = write_temp(".toml", "library = \"x.so\"\nprefix = \"\"\n");
        assert!(matches!(load_config(file.path()), Err(IviError::Config(_))));
    }

    #[test]
    fn test_malformed_input() {
        let file = write_temp(".toml", "library = ");
        assert!(matches!(load_config(file.path()), Err(IviError::Toml(_))));

        let file = write_temp(".json", "{");
        assert!(matches!(load_config(file.path()), Err(IviError::Json(_))));

        let missing = Path::new("/definitely/not/here.toml");
        assert!(matches!(load_config(missing), Err(IviError::Io(_))));
    }
}
