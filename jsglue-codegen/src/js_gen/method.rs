// Ordinary glue functions: string decoding, forwarding, status out-channel, error wrapper.

use log::debug;

use crate::context::{CallStatus, GlueContext};
use crate::error::{CodegenError, Result};
use crate::naming::METHOD_LOCALS;
use crate::schema::{Direction, FunctionDescriptor, ParameterDescriptor, SemanticType};
use crate::type_map::{self, StorageTag};

use super::writer::GlueWriter;
use super::{check_bindings, join_names, method_header};

/// Emit one registration entry `Name: function (...) { ... },` for an ordinary descriptor.
pub fn emit_method(w: &mut GlueWriter, func: &FunctionDescriptor, ctx: &GlueContext) -> Result<()> {
    let (status, status_tag) = check_status_param(func)?;
    for param in &func.params {
        type_map::storage_tag(&param.ty).map_err(|e| CodegenError::unsupported(func, e))?;
    }
    check_bindings(func, &func.params, METHOD_LOCALS, &ctx.protocol_globals())?;

    debug!("emitting glue for {} ({} params)", func.name, func.params.len());

    w.block_with_suffix(&method_header(func), ",", |w| {
        w.block("try", |w| {
            write_process_strings(w, &func.params, ctx);
            w.line(format!("var context = {};", ctx.slot.instance()));
            w.line(format!(
                "var ret = context.{}({});",
                func.name,
                join_names(func.forwarded_params())
            ));
            write_out_param(w, status, "ret.type", status_tag);

            if func.return_type == SemanticType::String {
                write_string_return(w, "ret.value");
            } else {
                w.line("return ret.value;");
            }
            Ok(())
        })?;

        w.block("catch (error)", |w| {
            write_out_param(w, status, &CallStatus::Threw.code().to_string(), status_tag);

            w.block("try", |w| {
                w.line("console.log(error);");
                w.line("var errString = String(error);");
                w.line(format!("var strRet = {}.CreateString(errString);", ctx.slot.instance()));
                w.line("return strRet.value;");
                Ok(())
            })?;
            w.block("catch (innerError)", |w| {
                w.line(format!("return {};", CallStatus::DoubleFault.code()));
                Ok(())
            })
        })
    })
}

/// The first parameter must be an `out` 32-bit integer, and the only `out` parameter.
fn check_status_param(func: &FunctionDescriptor) -> Result<(&ParameterDescriptor, StorageTag)> {
    let Some(status) = func.status_param() else {
        return Err(CodegenError::malformed_status(
            func,
            "first parameter must be an out status parameter",
        ));
    };
    if !status.ty.is_integral_32() {
        return Err(CodegenError::malformed_status(
            func,
            format!("status parameter {} must be i32 or u32, found {}", status.name, status.ty),
        ));
    }
    if let Some(extra) = func.params[1..].iter().find(|p| p.direction == Direction::Out) {
        return Err(CodegenError::malformed_status(
            func,
            format!("only the first parameter may be out, found out parameter {}", extra.name),
        ));
    }
    let tag = type_map::storage_tag(&status.ty).map_err(|e| CodegenError::unsupported(func, e))?;
    Ok((status, tag))
}

/// Decode every string parameter in place.
fn write_process_strings(w: &mut GlueWriter, params: &[ParameterDescriptor], ctx: &GlueContext) {
    for param in params.iter().filter(|p| p.ty == SemanticType::String) {
        w.line(format!(
            "{name} = {decoder}({name});",
            name = param.name,
            decoder = ctx.protocol.string_decoder
        ));
    }
}

fn write_out_param(w: &mut GlueWriter, param: &ParameterDescriptor, value: &str, tag: StorageTag) {
    w.line(format!("setValue({}, {value}, '{tag}');", param.name));
}

/// Copy a JS string into a caller-owned, null-terminated UTF-8 buffer and return its address.
fn write_string_return(w: &mut GlueWriter, value: &str) {
    w.line(format!("var returnStr = {value};"));
    w.line("var bufferSize = lengthBytesUTF8(returnStr) + 1;");
    w.line("var strBuffer = _malloc(bufferSize);");
    w.line("stringToUTF8(returnStr, strBuffer, bufferSize);");
    w.line("return strBuffer;");
}
