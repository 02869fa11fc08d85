// Semantic type → dispatch tag / storage tag mapping.

use std::fmt;

use thiserror::Error;

use crate::schema::{Direction, ParameterDescriptor, SemanticType};

/// Calling-convention class used in a dynamic-call signature string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchTag {
    Void,
    Int,
    Int64,
    Float,
    Double,
}

impl DispatchTag {
    pub fn as_char(self) -> char {
        match self {
            DispatchTag::Void => 'v',
            DispatchTag::Int => 'i',
            DispatchTag::Int64 => 'j',
            DispatchTag::Float => 'f',
            DispatchTag::Double => 'd',
        }
    }
}

impl fmt::Display for DispatchTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Memory format used by `setValue` when writing through an out-parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageTag {
    I8,
    I16,
    I32,
    I64,
    Float,
    Double,
    /// Pointer-width store for handles and other references.
    Pointer,
}

impl StorageTag {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageTag::I8 => "i8",
            StorageTag::I16 => "i16",
            StorageTag::I32 => "i32",
            StorageTag::I64 => "i64",
            StorageTag::Float => "float",
            StorageTag::Double => "double",
            StorageTag::Pointer => "*",
        }
    }
}

impl fmt::Display for StorageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which classification was requested when a type could not be mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Dispatch,
    Storage,
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagKind::Dispatch => f.write_str("a dispatch tag"),
            TagKind::Storage => f.write_str("a storage tag"),
        }
    }
}

/// A type the classifier has no mapping for. Emitters attach the function context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot marshal type {ty} as {kind}")]
pub struct UnsupportedType {
    pub ty: SemanticType,
    pub kind: TagKind,
}

/// Map a type to its dynamic-call tag.
///
/// References travel as 32-bit pointers; value types are resolved by width,
/// and widths without a calling-convention class are rejected.
pub fn dispatch_tag(ty: &SemanticType) -> Result<DispatchTag, UnsupportedType> {
    match ty {
        SemanticType::Void => Ok(DispatchTag::Void),
        SemanticType::String | SemanticType::Handle | SemanticType::Callback(_) => {
            Ok(DispatchTag::Int)
        }
        SemanticType::F32 => Ok(DispatchTag::Float),
        SemanticType::F64 => Ok(DispatchTag::Double),
        SemanticType::I8
        | SemanticType::U8
        | SemanticType::I16
        | SemanticType::U16
        | SemanticType::I32
        | SemanticType::U32
        | SemanticType::I64
        | SemanticType::U64 => match ty.value_width() {
            Some(4) => Ok(DispatchTag::Int),
            Some(8) => Ok(DispatchTag::Int64),
            _ => Err(UnsupportedType { ty: ty.clone(), kind: TagKind::Dispatch }),
        },
    }
}

/// Dispatch tag of a parameter. By-reference parameters are pointers regardless of type.
pub fn param_dispatch_tag(param: &ParameterDescriptor) -> Result<DispatchTag, UnsupportedType> {
    match param.direction {
        Direction::Out => Ok(DispatchTag::Int),
        Direction::In => dispatch_tag(&param.ty),
    }
}

/// Map a type to the `setValue` format used to store it.
pub fn storage_tag(ty: &SemanticType) -> Result<StorageTag, UnsupportedType> {
    match ty {
        SemanticType::String | SemanticType::Handle | SemanticType::Callback(_) => {
            Ok(StorageTag::Pointer)
        }
        SemanticType::I8 | SemanticType::U8 => Ok(StorageTag::I8),
        SemanticType::I16 | SemanticType::U16 => Ok(StorageTag::I16),
        SemanticType::I32 | SemanticType::U32 => Ok(StorageTag::I32),
        SemanticType::I64 | SemanticType::U64 => Ok(StorageTag::I64),
        SemanticType::F32 => Ok(StorageTag::Float),
        SemanticType::F64 => Ok(StorageTag::Double),
        SemanticType::Void => Err(UnsupportedType { ty: ty.clone(), kind: TagKind::Storage }),
    }
}

/// Build the dynamic-call signature: return tag followed by each parameter tag.
pub fn dyncall_signature(
    return_type: &SemanticType,
    params: &[ParameterDescriptor],
) -> Result<String, UnsupportedType> {
    let mut sig = String::with_capacity(params.len() + 1);
    sig.push(dispatch_tag(return_type)?.as_char());
    for param in params {
        sig.push(param_dispatch_tag(param)?.as_char());
    }
    Ok(sig)
}
