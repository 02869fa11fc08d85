// Initialize entry point: callback trampolines, typed-buffer builder, runtime instance wiring.
//
// The initializer receives three function pointers from the native side
// (handler, on-acquire, on-release). Each is wrapped in a trampoline that
// performs the indirect call with a signature string built from dispatch
// tags, and the trampolines are handed to the runtime constructor together
// with a builder for typed views over the module's memory.

use std::collections::HashSet;

use log::debug;

use crate::context::GlueContext;
use crate::error::{CodegenError, Result};
use crate::naming::{self, INITIALIZE_LOCALS};
use crate::schema::{CallbackSignature, FunctionDescriptor, ParameterDescriptor, SemanticType};
use crate::type_map;

use super::writer::GlueWriter;
use super::{check_bindings, join_names, method_header};

/// Trampoline variables, in constructor argument order.
const TRAMPOLINES: [&str; 3] = ["ch", "oac", "orc"];

/// A callback parameter resolved to the trampoline that wraps it.
struct Trampoline<'a> {
    var: &'static str,
    pointer: &'a ParameterDescriptor,
    callback: &'a CallbackSignature,
    signature: String,
}

/// Emit the registration entry for the reserved initialize descriptor.
pub fn emit_initialize(w: &mut GlueWriter, func: &FunctionDescriptor, ctx: &GlueContext) -> Result<()> {
    let protocol_globals = ctx.protocol_globals();
    check_bindings(func, &func.params, INITIALIZE_LOCALS, &protocol_globals)?;
    let trampolines = resolve_trampolines(func, &protocol_globals)?;

    debug!(
        "emitting initializer {} with signatures {:?}",
        func.name,
        trampolines.iter().map(|t| t.signature.as_str()).collect::<Vec<_>>()
    );

    w.block_with_suffix(&method_header(func), ",", |w| {
        write_array_builder(w, ctx)?;
        for t in &trampolines {
            let args = join_names(t.callback.params.iter());
            w.line(format!(
                "var {var} = function ({args}) {{ return {dyncall}('{sig}', {ptr}, [{args}]); }};",
                var = t.var,
                dyncall = ctx.protocol.dyncall,
                sig = t.signature,
                ptr = t.pointer.name,
            ));
        }
        w.line(format!("var ctr = {};", ctx.slot.constructor()));
        w.line(format!(
            "{} = new ctr(arrayBuilder, {});",
            ctx.slot.instance(),
            TRAMPOLINES.join(", ")
        ));
        Ok(())
    })
}

/// Check the `(handler, onAcquire, onRelease, ...)` shape and build each call signature.
fn resolve_trampolines<'a>(
    func: &'a FunctionDescriptor,
    protocol_globals: &[&str],
) -> Result<Vec<Trampoline<'a>>> {
    if func.params.len() < TRAMPOLINES.len() {
        return Err(CodegenError::bad_initialize(
            func,
            format!(
                "expected at least {} callback parameters, found {} parameters",
                TRAMPOLINES.len(),
                func.params.len()
            ),
        ));
    }

    let outer: HashSet<&str> = func.params.iter().map(|p| p.name.as_str()).collect();
    let mut trampolines = Vec::with_capacity(TRAMPOLINES.len());

    for (var, pointer) in TRAMPOLINES.into_iter().zip(&func.params) {
        let SemanticType::Callback(callback) = &pointer.ty else {
            return Err(CodegenError::bad_initialize(
                func,
                format!("parameter {} must be a callback, found {}", pointer.name, pointer.ty),
            ));
        };
        check_callback_names(func, pointer, callback, &outer, protocol_globals)?;
        let signature = type_map::dyncall_signature(&callback.return_type, &callback.params)
            .map_err(|e| CodegenError::unsupported(func, e))?;
        trampolines.push(Trampoline { var, pointer, callback, signature });
    }
    Ok(trampolines)
}

/// Trampoline arguments must not hide the stored function pointers or the wiring locals.
fn check_callback_names(
    func: &FunctionDescriptor,
    pointer: &ParameterDescriptor,
    callback: &CallbackSignature,
    outer: &HashSet<&str>,
    protocol_globals: &[&str],
) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    for arg in &callback.params {
        let problem = naming::identifier_problem(&arg.name)
            .or_else(|| outer.contains(arg.name.as_str()).then_some("shadows an initializer parameter"))
            .or_else(|| INITIALIZE_LOCALS.contains(&arg.name.as_str()).then_some("shadows a wiring local"))
            .or_else(|| protocol_globals.contains(&arg.name.as_str()).then_some("shadows a protocol function"))
            .or_else(|| (!seen.insert(arg.name.as_str())).then_some("duplicate parameter name"));
        if let Some(problem) = problem {
            return Err(CodegenError::bad_initialize(
                func,
                format!("callback {} argument {}: {problem}", pointer.name, arg.name),
            ));
        }
    }
    Ok(())
}

/// `var arrayBuilder = function (pointer, typeCode, length) { switch ... };`
fn write_array_builder(w: &mut GlueWriter, ctx: &GlueContext) -> Result<()> {
    w.block_with_suffix("var arrayBuilder = function (pointer, typeCode, length)", ";", |w| {
        w.block("switch (typeCode)", |w| {
            for kind in ctx.buffer_kinds {
                w.line(format!(
                    "case {}: return new {}(buffer, pointer, length);",
                    kind.code, kind.name
                ));
            }
            Ok(())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProtocolConfig;
    use crate::schema::{default_buffer_kinds, BufferElementKind, Direction};

    fn param(name: &str, ty: SemanticType) -> ParameterDescriptor {
        ParameterDescriptor { name: name.into(), ty, direction: Direction::In }
    }

    fn callback(params: Vec<ParameterDescriptor>, ret: SemanticType) -> SemanticType {
        SemanticType::Callback(CallbackSignature { params, return_type: Box::new(ret) })
    }

    fn init_descriptor() -> FunctionDescriptor {
        FunctionDescriptor {
            name: "InitializeInternal".into(),
            owner: "RuntimeRaw".into(),
            params: vec![
                param(
                    "callbackHandler",
                    callback(
                        vec![
                            param("callbackId", SemanticType::I32),
                            param("args", SemanticType::Handle),
                            param("argCount", SemanticType::I32),
                        ],
                        SemanticType::I32,
                    ),
                ),
                param("onAcquire", callback(vec![param("handle", SemanticType::I32)], SemanticType::Void)),
                param("onRelease", callback(vec![param("handle", SemanticType::I32)], SemanticType::Void)),
            ],
            return_type: SemanticType::Void,
        }
    }

    fn emit_with(f: &FunctionDescriptor, kinds: &[BufferElementKind]) -> Result<String> {
        emit_with_protocol(f, kinds, &ProtocolConfig::default())
    }

    fn emit_with_protocol(
        f: &FunctionDescriptor,
        kinds: &[BufferElementKind],
        protocol: &ProtocolConfig,
    ) -> Result<String> {
        let ctx = GlueContext::new(protocol, kinds)?;
        let mut w = GlueWriter::new();
        emit_initialize(&mut w, f, &ctx)?;
        w.finish()
    }

    fn emit(f: &FunctionDescriptor) -> Result<String> {
        emit_with(f, &default_buffer_kinds())
    }

    #[test]
    fn test_emit_initialize() {
        let kinds = vec![
            BufferElementKind { code: 0, name: "Int8Array".into() },
            BufferElementKind { code: 1, name: "Float32Array".into() },
        ];
        let expected = "\
InitializeInternal: function (callbackHandler, onAcquire, onRelease) {
    var arrayBuilder = function (pointer, typeCode, length) {
        switch (typeCode) {
            case 0: return new Int8Array(buffer, pointer, length);
            case 1: return new Float32Array(buffer, pointer, length);
        }
    };
    var ch = function (callbackId, args, argCount) { return Runtime.dynCall('iiii', callbackHandler, [callbackId, args, argCount]); };
    var oac = function (handle) { return Runtime.dynCall('vi', onAcquire, [handle]); };
    var orc = function (handle) { return Runtime.dynCall('vi', onRelease, [handle]); };
    var ctr = Module['GlueRuntime'];
    Module['glueRuntimeInstance'] = new ctr(arrayBuilder, ch, oac, orc);
},
";
        assert_eq!(emit_with(&init_descriptor(), &kinds).unwrap(), expected);
    }

    #[test]
    fn test_one_case_per_buffer_kind() {
        let text = emit(&init_descriptor()).unwrap();
        let cases = text.lines().filter(|l| l.trim_start().starts_with("case ")).count();
        assert_eq!(cases, default_buffer_kinds().len());
        assert!(text.contains("case 7: return new Float64Array(buffer, pointer, length);"));
    }

    #[test]
    fn test_signature_follows_declared_order() {
        let mut f = init_descriptor();
        f.params[0] = param(
            "callbackHandler",
            callback(
                vec![
                    param("x", SemanticType::F32),
                    param("y", SemanticType::I64),
                    param("z", SemanticType::F64),
                ],
                SemanticType::F64,
            ),
        );
        let text = emit(&f).unwrap();
        assert!(text.contains("Runtime.dynCall('dfjd', callbackHandler, [x, y, z])"));
    }

    #[test]
    fn test_extra_params_listed_in_header_only() {
        let mut f = init_descriptor();
        f.params.push(param("version", SemanticType::I32));
        let text = emit(&f).unwrap();
        assert!(text.starts_with("InitializeInternal: function (callbackHandler, onAcquire, onRelease, version) {"));
        assert!(text.contains("new ctr(arrayBuilder, ch, oac, orc);"));
    }

    #[test]
    fn test_non_callback_param_rejected() {
        let mut f = init_descriptor();
        f.params[1] = param("onAcquire", SemanticType::Handle);
        let err = emit(&f).unwrap_err();
        assert!(matches!(err, CodegenError::BadInitializeSignature { .. }));
        assert!(err.to_string().contains("parameter onAcquire must be a callback, found handle"));
    }

    #[test]
    fn test_too_few_params_rejected() {
        let mut f = init_descriptor();
        f.params.truncate(2);
        assert!(matches!(emit(&f), Err(CodegenError::BadInitializeSignature { .. })));
    }

    #[test]
    fn test_unsupported_callback_type() {
        let mut f = init_descriptor();
        f.params[2] = param("onRelease", callback(vec![param("flag", SemanticType::U8)], SemanticType::Void));
        assert!(matches!(emit(&f), Err(CodegenError::UnsupportedType { .. })));
    }

    #[test]
    fn test_callback_arg_shadowing_pointer_rejected() {
        let mut f = init_descriptor();
        f.params[1] = param("onAcquire", callback(vec![param("onRelease", SemanticType::I32)], SemanticType::Void));
        let err = emit(&f).unwrap_err();
        assert!(err.to_string().contains("shadows an initializer parameter"));

        let mut f = init_descriptor();
        f.params[1] = param("onAcquire", callback(vec![param("ctr", SemanticType::I32)], SemanticType::Void));
        let err = emit(&f).unwrap_err();
        assert!(err.to_string().contains("shadows a wiring local"));
    }

    #[test]
    fn test_callback_arg_shadowing_dyncall_rejected() {
        let protocol = ProtocolConfig { dyncall: "dynCall".into(), ..Default::default() };
        let mut f = init_descriptor();
        f.params[2] = param("onRelease", callback(vec![param("dynCall", SemanticType::I32)], SemanticType::Void));
        let err = emit_with_protocol(&f, &default_buffer_kinds(), &protocol).unwrap_err();
        assert!(matches!(err, CodegenError::BadInitializeSignature { .. }));
        assert!(err.to_string().contains("callback onRelease argument dynCall: shadows a protocol function"));

        // Only the root of a dotted path is a binding.
        let mut f = init_descriptor();
        f.params[2] = param("onRelease", callback(vec![param("dynCall", SemanticType::I32)], SemanticType::Void));
        assert!(emit(&f).is_ok());
    }

    #[test]
    fn test_initializer_param_shadowing_decoder_root_rejected() {
        let protocol = ProtocolConfig { string_decoder: "Glue.decode".into(), ..Default::default() };
        let mut f = init_descriptor();
        f.params.push(param("Glue", SemanticType::I32));
        let err = emit_with_protocol(&f, &default_buffer_kinds(), &protocol).unwrap_err();
        assert!(matches!(err, CodegenError::InvalidIdentifier { ref name, .. } if name == "Glue"));
        assert!(err.to_string().contains("shadows a protocol function"));
    }
}
