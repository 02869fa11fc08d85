// Configuration types for jsglue-codegen, deserialized from jsglue.config.toml.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CodegenError, Result};
use crate::naming;

/// Top-level config file.
#[derive(Deserialize, Debug)]
pub struct GlueConfig {
    pub codegen: CodegenConfig,
}

impl GlueConfig {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CodegenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GlueConfig = toml::from_str(&text).map_err(|source| CodegenError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.codegen.protocol.validate()?;
        Ok(config)
    }
}

#[derive(Deserialize, Debug)]
pub struct CodegenConfig {
    pub paths: CodegenPaths,
    #[serde(default)]
    pub protocol: ProtocolConfig,
}

#[derive(Deserialize, Debug)]
pub struct CodegenPaths {
    /// Catalog JSON, relative to the config file.
    pub catalog: String,
    /// Generated .jslib, relative to the config file.
    pub output: String,
}

impl CodegenPaths {
    pub fn resolve(&self, config_dir: &Path) -> (PathBuf, PathBuf) {
        (config_dir.join(&self.catalog), config_dir.join(&self.output))
    }
}

/// Constants of the glue calling protocol. Interpolated verbatim into the output.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ProtocolConfig {
    /// `Module[...]` key the live runtime instance is stored under.
    pub instance_key: String,
    /// `Module[...]` key of the runtime instance constructor.
    pub constructor_key: String,
    /// Name of the reserved initialization entry point.
    pub initialize_entry: String,
    /// Host function that decodes an incoming string pointer.
    pub string_decoder: String,
    /// Host function used by callback trampolines for indirect calls.
    pub dyncall: String,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            instance_key: "glueRuntimeInstance".into(),
            constructor_key: "GlueRuntime".into(),
            initialize_entry: "InitializeInternal".into(),
            string_decoder: "Pointer_stringify".into(),
            dyncall: "Runtime.dynCall".into(),
        }
    }
}

impl ProtocolConfig {
    /// Reject settings that would produce broken glue.
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &'static str, value: &str, reason: &'static str| -> Result<()> {
            Err(CodegenError::InvalidProtocol { key, value: value.to_string(), reason })
        };

        if self.instance_key.is_empty() {
            return invalid("instance_key", &self.instance_key, "must not be empty");
        }
        if self.constructor_key.is_empty() {
            return invalid("constructor_key", &self.constructor_key, "must not be empty");
        }
        if self.instance_key == self.constructor_key {
            return invalid(
                "constructor_key",
                &self.constructor_key,
                "must differ from instance_key",
            );
        }
        if let Some(reason) = naming::identifier_problem(&self.initialize_entry) {
            return invalid("initialize_entry", &self.initialize_entry, reason);
        }
        if !naming::is_dotted_path(&self.string_decoder) {
            return invalid("string_decoder", &self.string_decoder, "not a dotted JS path");
        }
        if !naming::is_dotted_path(&self.dyncall) {
            return invalid("dyncall", &self.dyncall, "not a dotted JS path");
        }
        Ok(())
    }
}
