//! Error types for IR resolution

use thiserror::Error;

/// Result type for IR operations
pub type Result<T> = std::result::Result<T, IrError>;

/// IR resolution errors
///
/// Every variant except [`IrError::OverrideDecode`] aborts the current run.
/// Override decode failures are logged and the override is ignored.
#[derive(Error, Debug)]
pub enum IrError {
    #[error("{what} is missing ({context})")]
    MissingInput { what: String, context: String },

    #[error("unrecognized schema shape {shape:?} at {context}")]
    UnrecognizedShape { shape: String, context: String },

    #[error("sequencing violation on {entity}: {detail}")]
    SequencingViolation { entity: String, detail: String },

    #[error("override under {key:?} could not be decoded: {source}")]
    OverrideDecode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid parameter {name:?}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("invalid tag template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IrError {
    pub fn missing(what: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingInput {
            what: what.into(),
            context: context.into(),
        }
    }

    pub fn sequencing(entity: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::SequencingViolation {
            entity: entity.into(),
            detail: detail.into(),
        }
    }

    /// Whether the run must stop on this error
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::OverrideDecode { .. })
    }
}

/// Joins an ancestor chain of names into a diagnostic context string
pub(crate) fn chain_context<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let joined = names
        .into_iter()
        .map(|n| if n.is_empty() { "<anonymous>" } else { n })
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        String::from("<root>")
    } else {
        joined
    }
}
