//! Telemetry variable type definitions

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Supported telemetry data types, in the order of their on-disk type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableType {
    /// 8-bit character (type code 0)
    Char,
    /// Boolean stored in one byte (type code 1)
    Bool,
    /// 32-bit signed integer (type code 2)
    Int32,
    /// 32-bit unsigned integer (type code 3)
    UInt32,
    /// 32-bit floating point (type code 4)
    Float32,
    /// 64-bit floating point (type code 5)
    Float64,
}

impl VariableType {
    /// All types indexed by their type code.
    pub const BY_CODE: [VariableType; 6] = [
        VariableType::Char,
        VariableType::Bool,
        VariableType::Int32,
        VariableType::UInt32,
        VariableType::Float32,
        VariableType::Float64,
    ];

    /// Map a raw type code to a type, `None` outside `0..=5`.
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code).ok().and_then(|index| Self::BY_CODE.get(index).copied())
    }

    /// The type code this type is stored under.
    pub const fn code(&self) -> i32 {
        match self {
            VariableType::Char => 0,
            VariableType::Bool => 1,
            VariableType::Int32 => 2,
            VariableType::UInt32 => 3,
            VariableType::Float32 => 4,
            VariableType::Float64 => 5,
        }
    }

    /// Returns the size in bytes of this data type.
    pub const fn size(&self) -> usize {
        match self {
            VariableType::Char | VariableType::Bool => 1,
            VariableType::Int32 | VariableType::UInt32 | VariableType::Float32 => 4,
            VariableType::Float64 => 8,
        }
    }

    /// Decode exactly [`size`](Self::size) little-endian bytes into a [`Value`].
    ///
    /// Returns `None` when `bytes` is not exactly the width of this type.
    pub fn decode(&self, bytes: &[u8]) -> Option<Value> {
        if bytes.len() != self.size() {
            return None;
        }

        let value = match self {
            VariableType::Char => Value::Char(bytes[0]),
            VariableType::Bool => Value::Bool(bytes[0] != 0),
            VariableType::Int32 => Value::Int32(i32::from_le_bytes(bytes.try_into().ok()?)),
            VariableType::UInt32 => Value::UInt32(u32::from_le_bytes(bytes.try_into().ok()?)),
            VariableType::Float32 => Value::Float32(f32::from_le_bytes(bytes.try_into().ok()?)),
            VariableType::Float64 => Value::Float64(f64::from_le_bytes(bytes.try_into().ok()?)),
        };

        Some(value)
    }
}

/// Runtime value of a single telemetry variable.
///
/// Serializes as the bare scalar; the variant is not written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Char(u8),
    Bool(bool),
    Int32(i32),
    UInt32(u32),
    Float32(f32),
    Float64(f64),
}

impl Value {
    /// The type this value was decoded as.
    pub fn variable_type(&self) -> VariableType {
        match self {
            Value::Char(_) => VariableType::Char,
            Value::Bool(_) => VariableType::Bool,
            Value::Int32(_) => VariableType::Int32,
            Value::UInt32(_) => VariableType::UInt32,
            Value::Float32(_) => VariableType::Float32,
            Value::Float64(_) => VariableType::Float64,
        }
    }

    /// Numeric view of the value. Booleans map to 0.0 / 1.0.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Char(c) => c as f64,
            Value::Bool(b) => u8::from(b) as f64,
            Value::Int32(v) => v as f64,
            Value::UInt32(v) => v as f64,
            Value::Float32(v) => v as f64,
            Value::Float64(v) => v,
        }
    }

    /// Integer view, `None` for floating point values.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Char(c) => Some(c as i64),
            Value::Bool(b) => Some(b as i64),
            Value::Int32(v) => Some(v as i64),
            Value::UInt32(v) => Some(v as i64),
            Value::Float32(_) | Value::Float64(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Little-endian storage bytes, the inverse of [`VariableType::decode`].
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match *self {
            Value::Char(c) => vec![c],
            Value::Bool(b) => vec![u8::from(b)],
            Value::Int32(v) => v.to_le_bytes().to_vec(),
            Value::UInt32(v) => v.to_le_bytes().to_vec(),
            Value::Float32(v) => v.to_le_bytes().to_vec(),
            Value::Float64(v) => v.to_le_bytes().to_vec(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Value::Char(c) => serializer.serialize_char(c as char),
            Value::Bool(b) => serializer.serialize_bool(b),
            Value::Int32(v) => serializer.serialize_i32(v),
            Value::UInt32(v) => serializer.serialize_u32(v),
            Value::Float32(v) => serializer.serialize_f32(v),
            Value::Float64(v) => serializer.serialize_f64(v),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Char(c) => write!(f, "{}", *c as char),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int32(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
        }
    }
}
