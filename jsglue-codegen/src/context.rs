// Generation context: protocol constants, the runtime slot, buffer kinds.

use std::collections::HashMap;

use crate::config::ProtocolConfig;
use crate::error::{CodegenError, Result};
use crate::naming::{self, quote_js};
use crate::schema::BufferElementKind;

/// Status values the glue writes or returns on each path through a call.
///
/// `Ok` and `Threw` travel through the status out-parameter; `DoubleFault`
/// is the return value, so it can share a code with `Ok`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallStatus {
    /// Success classification reported by the runtime instance in `ret.type`.
    Ok,
    /// Written to the status out-parameter when the forwarded call threw.
    Threw,
    /// Returned when producing the error string threw as well.
    DoubleFault,
}

impl CallStatus {
    /// Literal emitted into the glue for this status.
    pub fn code(self) -> i32 {
        match self {
            CallStatus::Ok | CallStatus::DoubleFault => 0,
            CallStatus::Threw => -1,
        }
    }
}

/// Where the generated glue keeps the single live runtime instance.
///
/// Every ordinary glue function reads the slot; only the initializer writes it.
#[derive(Debug, Clone)]
pub struct RuntimeSlot {
    instance_key: String,
    constructor_key: String,
}

impl RuntimeSlot {
    pub fn new(protocol: &ProtocolConfig) -> Self {
        Self {
            instance_key: protocol.instance_key.clone(),
            constructor_key: protocol.constructor_key.clone(),
        }
    }

    /// Expression reading the live instance, e.g. `Module['glueRuntimeInstance']`.
    pub fn instance(&self) -> String {
        format!("Module[{}]", quote_js(&self.instance_key))
    }

    /// Expression reading the instance constructor.
    pub fn constructor(&self) -> String {
        format!("Module[{}]", quote_js(&self.constructor_key))
    }
}

/// Central context shared by the emitters for one generation run.
pub struct GlueContext<'a> {
    pub protocol: &'a ProtocolConfig,
    pub slot: RuntimeSlot,
    pub buffer_kinds: &'a [BufferElementKind],
}

impl<'a> GlueContext<'a> {
    /// Build a context, validating the protocol constants and buffer kinds.
    pub fn new(protocol: &'a ProtocolConfig, buffer_kinds: &'a [BufferElementKind]) -> Result<Self> {
        protocol.validate()?;
        check_buffer_kinds(buffer_kinds)?;
        Ok(GlueContext {
            protocol,
            slot: RuntimeSlot::new(protocol),
            buffer_kinds,
        })
    }

    pub fn is_initialize_entry(&self, name: &str) -> bool {
        name == self.protocol.initialize_entry
    }

    /// Bindings the configured host calls resolve through. Generated parameters must not hide them.
    pub fn protocol_globals(&self) -> [&str; 2] {
        [
            naming::root_segment(&self.protocol.string_decoder),
            naming::root_segment(&self.protocol.dyncall),
        ]
    }
}

fn check_buffer_kinds(kinds: &[BufferElementKind]) -> Result<()> {
    let mut seen: HashMap<i32, &str> = HashMap::new();
    for kind in kinds {
        if let Some(reason) = naming::identifier_problem(&kind.name) {
            return Err(CodegenError::InvalidIdentifier {
                name: kind.name.clone(),
                context: "buffer kinds".into(),
                reason,
            });
        }
        if let Some(first) = seen.insert(kind.code, &kind.name) {
            return Err(CodegenError::DuplicateBufferKind {
                code: kind.code,
                first: first.to_string(),
                second: kind.name.clone(),
            });
        }
    }
    Ok(())
}
