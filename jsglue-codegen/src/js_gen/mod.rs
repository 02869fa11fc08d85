// JS library generation: registration wrapper around one entry per descriptor.

pub mod writer;
pub mod method;
pub mod initialize;

use std::collections::HashSet;

use log::info;

use crate::context::GlueContext;
use crate::error::{CodegenError, Result};
use crate::naming;
use crate::schema::{FunctionDescriptor, ParameterDescriptor};

use self::writer::GlueWriter;

const BANNER: &str = "// This file was automatically generated by jsglue-codegen. Do not edit manually.";
const REGISTRATION: &str = "mergeInto(LibraryManager.library,";

/// Generate the complete .jslib document.
///
/// All-or-nothing: the first malformed descriptor aborts the run and no text is returned.
pub fn generate_document(functions: &[FunctionDescriptor], ctx: &GlueContext) -> Result<String> {
    info!("generating glue for {} functions", functions.len());

    let mut w = GlueWriter::new();
    w.line(BANNER);

    let mut seen: HashSet<&str> = HashSet::new();
    w.block_with_suffix(REGISTRATION, ");", |w| {
        for func in functions {
            if !seen.insert(func.name.as_str()) {
                return Err(CodegenError::DuplicateFunction(func.name.clone()));
            }
            if ctx.is_initialize_entry(&func.name) {
                initialize::emit_initialize(w, func, ctx)?;
            } else {
                method::emit_method(w, func, ctx)?;
            }
        }
        Ok(())
    })?;

    w.finish()
}

/// `Name: function (a, b, c)`, listing every parameter including out-params.
pub(crate) fn method_header(func: &FunctionDescriptor) -> String {
    format!("{}: function ({})", func.name, join_names(func.params.iter()))
}

pub(crate) fn join_names<'a>(params: impl Iterator<Item = &'a ParameterDescriptor>) -> String {
    params.map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ")
}

/// Check that the function name and every parameter name can be emitted as
/// bindings without colliding with each other, the glue's own locals, or the
/// configured protocol functions.
pub(crate) fn check_bindings(
    func: &FunctionDescriptor,
    params: &[ParameterDescriptor],
    locals: &[&str],
    protocol_globals: &[&str],
) -> Result<()> {
    let context = || format!("{} in {}", func.name, func.owner);
    let invalid = |name: &str, reason: &'static str| CodegenError::InvalidIdentifier {
        name: name.to_string(),
        context: context(),
        reason,
    };

    if !naming::is_identifier(&func.name) {
        return Err(invalid(&func.name, "not a JS identifier"));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for param in params {
        if let Some(reason) = naming::identifier_problem(&param.name) {
            return Err(invalid(&param.name, reason));
        }
        if locals.contains(&param.name.as_str()) {
            return Err(invalid(&param.name, "shadows a local of the generated glue"));
        }
        if protocol_globals.contains(&param.name.as_str()) {
            return Err(invalid(&param.name, "shadows a protocol function"));
        }
        if !seen.insert(param.name.as_str()) {
            return Err(invalid(&param.name, "duplicate parameter name"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProtocolConfig;
    use crate::schema::{default_buffer_kinds, Direction, SemanticType};

    fn status_only(name: &str) -> FunctionDescriptor {
        FunctionDescriptor {
            name: name.into(),
            owner: "RuntimeRaw".into(),
            params: vec![ParameterDescriptor {
                name: "status".into(),
                ty: SemanticType::I32,
                direction: Direction::Out,
            }],
            return_type: SemanticType::I32,
        }
    }

    fn generate(functions: &[FunctionDescriptor]) -> Result<String> {
        let protocol = ProtocolConfig::default();
        let kinds = default_buffer_kinds();
        let ctx = GlueContext::new(&protocol, &kinds)?;
        generate_document(functions, &ctx)
    }

    #[test]
    fn test_empty_catalog_document() {
        let doc = generate(&[]).unwrap();
        assert_eq!(
            doc,
            format!("{BANNER}\nmergeInto(LibraryManager.library, {{\n}});\n")
        );
    }

    #[test]
    fn test_entries_are_indented_and_comma_terminated() {
        let doc = generate(&[status_only("Ping"), status_only("Pong")]).unwrap();
        assert!(doc.contains("\n    Ping: function (status) {\n"));
        assert!(doc.contains("\n    },\n    Pong: function (status) {\n"));
        assert!(doc.ends_with("    },\n});\n"));
    }

    #[test]
    fn test_duplicate_function_rejected() {
        let err = generate(&[status_only("Ping"), status_only("Ping")]).unwrap_err();
        assert!(matches!(err, CodegenError::DuplicateFunction(name) if name == "Ping"));
    }

    #[test]
    fn test_check_bindings() {
        let mut f = status_only("Ping");
        assert!(check_bindings(&f, &f.params, &[], &[]).is_ok());

        f.params.push(f.params[0].clone());
        let err = check_bindings(&f, &f.params, &[], &[]).unwrap_err();
        assert!(err.to_string().contains("duplicate parameter name"));

        let mut f = status_only("Echo");
        f.params.push(ParameterDescriptor {
            name: "UTF8ToString".into(),
            ty: SemanticType::String,
            direction: Direction::In,
        });
        let err = check_bindings(&f, &f.params, &[], &["UTF8ToString"]).unwrap_err();
        assert!(err.to_string().contains("shadows a protocol function"));

        let f = status_only("not-a-name");
        let err = check_bindings(&f, &f.params, &[], &[]).unwrap_err();
        assert!(err.to_string().contains("not a JS identifier"));
    }
}
