//! Override records
//!
//! Caller-supplied metadata stored in a raw record's metadata bag under the
//! configured extension key. Overrides that cannot be decoded are logged and
//! ignored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::IrError;
use crate::ir::Tags;
use crate::raw::Extensions;

/// Per-schema override
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaOverride {
    /// Replacement type name
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
    /// Force (`true`) or forbid (`false`) standalone generation
    #[serde(default)]
    pub create: Option<bool>,
    /// The replacement type has an empty/absent representation
    #[serde(default)]
    pub can_be_nil: bool,
    #[serde(default)]
    pub tags: Tags,
}

impl SchemaOverride {
    pub fn replacement_name(&self) -> Option<&str> {
        self.type_name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// Explicit name for a path or response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameOverride {
    #[serde(default)]
    pub name: Option<String>,
}

impl NameOverride {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// Decodes the override stored under `key`, if any
pub fn decode<T: DeserializeOwned>(bag: &Extensions, key: &str) -> Result<Option<T>, IrError> {
    match bag.get(key) {
        None => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|source| IrError::OverrideDecode {
                key: key.to_string(),
                source,
            }),
    }
}

/// Like [`decode`], but a decode failure is logged and treated as absent
pub fn lookup<T: DeserializeOwned>(bag: &Extensions, key: &str, context: &str) -> Option<T> {
    match decode(bag, key) {
        Ok(found) => found,
        Err(err) => {
            warn!(%context, error = %err, "ignoring override");
            None
        }
    }
}
