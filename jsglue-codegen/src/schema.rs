// JSON schema types for the exported-signature catalog.

use std::fmt;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Top-level file wrapper
// ---------------------------------------------------------------------------

/// The catalog file produced by the metadata-discovery step.
#[derive(Deserialize, Clone, Debug)]
pub struct Catalog {
    pub functions: Vec<FunctionDescriptor>,
    #[serde(default = "default_buffer_kinds")]
    pub buffer_kinds: Vec<BufferElementKind>,
}

impl Catalog {
    /// Parse a catalog from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

// ---------------------------------------------------------------------------
// Function
// ---------------------------------------------------------------------------

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub name: String,
    /// Declaring type on the native side. Only used in diagnostics.
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default)]
    pub params: Vec<ParameterDescriptor>,
    #[serde(rename = "return", default)]
    pub return_type: SemanticType,
}

impl FunctionDescriptor {
    /// The leading parameter, if it is an out-parameter.
    pub fn status_param(&self) -> Option<&ParameterDescriptor> {
        self.params.first().filter(|p| p.direction == Direction::Out)
    }

    /// Parameters forwarded to the runtime instance (everything except out-params).
    pub fn forwarded_params(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.params.iter().filter(|p| p.direction == Direction::In)
    }
}

fn default_owner() -> String {
    "<catalog>".to_string()
}

// ---------------------------------------------------------------------------
// Parameter
// ---------------------------------------------------------------------------

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SemanticType,
    #[serde(default)]
    pub direction: Direction,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    In,
    Out,
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Closed set of types that can cross the boundary.
///
/// Unit variants are written as lower-case strings in JSON (`"i32"`);
/// callbacks as `{"callback": {"params": [...], "return": "void"}}`.
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    #[default]
    Void,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    String,
    /// Opaque non-value handle (pointer-equivalent).
    Handle,
    /// Function-pointer-equivalent reference with its own signature.
    Callback(CallbackSignature),
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CallbackSignature {
    #[serde(default)]
    pub params: Vec<ParameterDescriptor>,
    #[serde(rename = "return", default)]
    pub return_type: Box<SemanticType>,
}

impl SemanticType {
    /// Byte width of a value type in linear memory. `None` for void and reference types.
    pub fn value_width(&self) -> Option<usize> {
        match self {
            SemanticType::I8 | SemanticType::U8 => Some(1),
            SemanticType::I16 | SemanticType::U16 => Some(2),
            SemanticType::I32 | SemanticType::U32 | SemanticType::F32 => Some(4),
            SemanticType::I64 | SemanticType::U64 | SemanticType::F64 => Some(8),
            SemanticType::Void
            | SemanticType::String
            | SemanticType::Handle
            | SemanticType::Callback(_) => None,
        }
    }

    /// Reference types travel as a pointer-width value.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            SemanticType::String | SemanticType::Handle | SemanticType::Callback(_)
        )
    }

    pub fn is_integral_32(&self) -> bool {
        matches!(self, SemanticType::I32 | SemanticType::U32)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticType::Void => "void",
            SemanticType::I8 => "i8",
            SemanticType::U8 => "u8",
            SemanticType::I16 => "i16",
            SemanticType::U16 => "u16",
            SemanticType::I32 => "i32",
            SemanticType::U32 => "u32",
            SemanticType::I64 => "i64",
            SemanticType::U64 => "u64",
            SemanticType::F32 => "f32",
            SemanticType::F64 => "f64",
            SemanticType::String => "string",
            SemanticType::Handle => "handle",
            SemanticType::Callback(sig) => {
                write!(f, "callback(")?;
                for (i, p) in sig.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p.ty)?;
                }
                return write!(f, ") -> {}", sig.return_type);
            }
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Buffer element kinds
// ---------------------------------------------------------------------------

/// One typed view over linear memory, interpolated into the buffer builder.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BufferElementKind {
    pub code: i32,
    pub name: String,
}

/// Standard JS typed-array views, used when the catalog does not list its own.
pub fn default_buffer_kinds() -> Vec<BufferElementKind> {
    [
        "Int8Array",
        "Uint8Array",
        "Int16Array",
        "Uint16Array",
        "Int32Array",
        "Uint32Array",
        "Float32Array",
        "Float64Array",
    ]
    .iter()
    .enumerate()
    .map(|(code, name)| BufferElementKind {
        code: code as i32,
        name: (*name).to_string(),
    })
    .collect()
}
