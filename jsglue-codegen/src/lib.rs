// jsglue-codegen: reads a signature catalog, generates an Emscripten JS library of glue functions.

pub mod schema;
pub mod naming;
pub mod config;
pub mod context;
pub mod error;
pub mod type_map;
pub mod js_gen;

use std::path::{Path, PathBuf};

use log::info;

use crate::config::{GlueConfig, ProtocolConfig};
use crate::context::GlueContext;
use crate::schema::Catalog;

pub use crate::error::{CodegenError, Result};

/// Generate the JS library text for a catalog.
///
/// Pure: identical inputs give byte-identical output, and any malformed
/// descriptor fails the whole run.
pub fn generate(catalog: &Catalog, protocol: &ProtocolConfig) -> Result<String> {
    let ctx = GlueContext::new(protocol, &catalog.buffer_kinds)?;
    js_gen::generate_document(&catalog.functions, &ctx)
}

/// What a [`run_generate`] call produced.
#[derive(Debug)]
pub struct GenerateReport {
    pub output: PathBuf,
    pub functions: usize,
    pub bytes: usize,
    /// False for dry runs.
    pub written: bool,
}

/// Run the generate command. Main entry point for codegen.
pub fn run_generate(config_path: &Path, dry_run: bool) -> Result<GenerateReport> {
    let config = GlueConfig::load(config_path)?;
    let codegen = &config.codegen;

    // Resolve paths relative to config file directory
    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    let (catalog_path, output_path) = codegen.paths.resolve(config_dir);

    info!("loading catalog {}", catalog_path.display());
    let catalog = load_catalog(&catalog_path)?;
    info!(
        "  loaded {} functions, {} buffer kinds",
        catalog.functions.len(),
        catalog.buffer_kinds.len()
    );

    let document = generate(&catalog, &codegen.protocol)?;

    let mut report = GenerateReport {
        output: output_path,
        functions: catalog.functions.len(),
        bytes: document.len(),
        written: false,
    };
    if dry_run {
        info!("dry run: not writing {}", report.output.display());
        return Ok(report);
    }

    write_document(&report.output, &document)?;
    report.written = true;
    info!("wrote {} ({} bytes)", report.output.display(), report.bytes);
    Ok(report)
}

/// Read and parse a catalog JSON file.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let data = std::fs::read_to_string(path).map_err(|source| CodegenError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Catalog::from_json(&data).map_err(|source| CodegenError::Catalog {
        path: path.to_path_buf(),
        source,
    })
}

fn write_document(path: &Path, document: &str) -> Result<()> {
    let io_err = |source| CodegenError::Io { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, document).map_err(io_err)
}
