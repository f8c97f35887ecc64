//! Configuration management for IR resolution runs
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-ir.toml)
//! - Environment variables (SCHEMA_IR__*)
//!
//! ## Example config file (schema-ir.toml):
//! ```toml
//! [resolver]
//! extension_name = "x-repose"
//! additional_properties_name = "AdditionalProperties"
//!
//! [naming]
//! operation_case = "pascal"
//!
//! [tags]
//! json = ["{{ .FieldName }}", "omitempty"]
//!
//! [comments]
//! path_comments = true
//! description_comments = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ir::Tags;

/// Main configuration for a resolution run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrConfig {
    /// Resolver settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Naming settings
    #[serde(default)]
    pub naming: NamingConfig,

    /// Tag templates applied to every schema node
    #[serde(default = "default_tags")]
    pub tags: Tags,

    /// Generated comment settings
    #[serde(default)]
    pub comments: CommentConfig,
}

/// Resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Metadata key holding override records
    #[serde(default = "default_extension_name")]
    pub extension_name: String,

    /// Field name reserved for the open-ended extension slot of a struct
    #[serde(default = "default_additional_properties_name")]
    pub additional_properties_name: String,
}

/// Naming configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Casing of synthesized operation names
    #[serde(default)]
    pub operation_case: NameCase,
}

/// Casing rule for synthesized names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NameCase {
    #[default]
    Pascal,
    Camel,
}

/// Comment generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentConfig {
    /// Add a summary comment to every operation
    #[serde(default = "default_true")]
    pub path_comments: bool,

    /// Include descriptions of operations, parameters, and responses
    #[serde(default = "default_true")]
    pub description_comments: bool,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_extension_name() -> String {
    "x-repose".to_string()
}

fn default_additional_properties_name() -> String {
    "AdditionalProperties".to_string()
}

fn default_tags() -> Tags {
    let mut tags = BTreeMap::new();
    tags.insert(
        "json".to_string(),
        vec!["{{ .FieldName }}".to_string(), "omitempty".to_string()],
    );
    tags
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            extension_name: default_extension_name(),
            additional_properties_name: default_additional_properties_name(),
        }
    }
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            path_comments: true,
            description_comments: true,
        }
    }
}

impl Default for IrConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            naming: NamingConfig::default(),
            tags: default_tags(),
            comments: CommentConfig::default(),
        }
    }
}

impl IrConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["schema-ir.toml", ".schema-ir.toml", "config/schema-ir.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "schema-ir", "schema-ir") {
            let xdg_config = config_dir.config_dir().join("schema-ir.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // SCHEMA_IR__RESOLVER__EXTENSION_NAME and friends
        builder = builder.add_source(
            Environment::with_prefix("SCHEMA_IR")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
