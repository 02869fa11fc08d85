// Error types for jsglue-codegen.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::FunctionDescriptor;
use crate::type_map::UnsupportedType;

/// Result type alias using [`CodegenError`].
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that abort a generation run.
///
/// Generation is all-or-nothing: any of these means no document is produced.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A type the classifier cannot map for the requested usage.
    #[error("unsupported extern method {function} in {owner}: {source}")]
    UnsupportedType {
        function: String,
        owner: String,
        #[source]
        source: UnsupportedType,
    },

    /// The leading status out-parameter is missing or malformed.
    #[error("unsupported extern method {function} in {owner}: {reason}")]
    MalformedStatusParameter {
        function: String,
        owner: String,
        reason: String,
    },

    /// The initialize entry point does not have the callback wiring shape.
    #[error("bad initialize signature for {function} in {owner}: {reason}")]
    BadInitializeSignature {
        function: String,
        owner: String,
        reason: String,
    },

    /// A name that cannot be emitted verbatim into the glue.
    #[error("invalid identifier `{name}` in {context}: {reason}")]
    InvalidIdentifier {
        name: String,
        context: String,
        reason: &'static str,
    },

    /// Two descriptors share a name; the later entry would overwrite the earlier one.
    #[error("duplicate glue function {0}")]
    DuplicateFunction(String),

    /// Two buffer kinds share a code; the builder switch would have a dead case.
    #[error("duplicate buffer kind code {code} ({first} and {second})")]
    DuplicateBufferKind {
        code: i32,
        first: String,
        second: String,
    },

    /// A protocol constant from the config that cannot be interpolated safely.
    #[error("invalid protocol setting {key} = {value:?}: {reason}")]
    InvalidProtocol {
        key: &'static str,
        value: String,
        reason: &'static str,
    },

    /// The text writer finished with open blocks.
    #[error("unbalanced scope: {0} block(s) left open")]
    UnbalancedScope(usize),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse catalog {}: {source}", .path.display())]
    Catalog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CodegenError {
    pub(crate) fn unsupported(func: &FunctionDescriptor, source: UnsupportedType) -> Self {
        CodegenError::UnsupportedType {
            function: func.name.clone(),
            owner: func.owner.clone(),
            source,
        }
    }

    pub(crate) fn malformed_status(func: &FunctionDescriptor, reason: impl Into<String>) -> Self {
        CodegenError::MalformedStatusParameter {
            function: func.name.clone(),
            owner: func.owner.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn bad_initialize(func: &FunctionDescriptor, reason: impl Into<String>) -> Self {
        CodegenError::BadInitializeSignature {
            function: func.name.clone(),
            owner: func.owner.clone(),
            reason: reason.into(),
        }
    }
}
