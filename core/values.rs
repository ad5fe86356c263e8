// Variable value packing for UpdateComponentVariables
//
// Each value is laid out in the natural fixed-width representation of its
// kind, then the bytes of that field are reversed before concatenation.
use crate::error::{ProtocolError, Result};
use crate::types::{Variable, VariableKind};
use std::fmt;

/// Scalar pushed to the bus. The target kind comes from the declared variable
/// at the same position, not from the value itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

fn mismatch(kind: VariableKind, value: Value) -> ProtocolError {
    ProtocolError::ValueKindMismatch {
        kind,
        value: value.to_string(),
    }
}

fn reversed<const N: usize>(mut bytes: [u8; N]) -> [u8; N] {
    bytes.reverse();
    bytes
}

/// Pack one value as `kind`, byte order reversed.
pub fn pack_value(kind: VariableKind, value: Value) -> Result<Vec<u8>> {
    let bytes = match (kind, value) {
        (VariableKind::Integer, Value::Int(v)) => {
            let v = i32::try_from(v).map_err(|_| mismatch(kind, value))?;
            reversed(v.to_ne_bytes()).to_vec()
        }
        (VariableKind::Integer, Value::Bool(v)) => reversed((v as i32).to_ne_bytes()).to_vec(),
        (VariableKind::Float64, Value::Float(v)) => reversed(v.to_ne_bytes()).to_vec(),
        (VariableKind::Float64, Value::Int(v)) => reversed((v as f64).to_ne_bytes()).to_vec(),
        (VariableKind::Float32, Value::Float(v)) => reversed((v as f32).to_ne_bytes()).to_vec(),
        (VariableKind::Float32, Value::Int(v)) => reversed((v as f32).to_ne_bytes()).to_vec(),
        // Packed like a single char
        (VariableKind::Boolean, Value::Bool(v)) => vec![v as u8],
        (VariableKind::Boolean, Value::Int(v @ (0 | 1))) => vec![v as u8],
        _ => return Err(mismatch(kind, value)),
    };
    Ok(bytes)
}

/// Pack `values` positionally against `variables`.
pub fn pack_values(variables: &[Variable], values: &[Value]) -> Result<Vec<u8>> {
    if variables.len() != values.len() {
        return Err(ProtocolError::ValueCountMismatch {
            expected: variables.len(),
            actual: values.len(),
        });
    }

    let mut bytes = Vec::with_capacity(variables.iter().map(|v| v.kind.width()).sum());
    for (variable, &value) in variables.iter().zip(values) {
        bytes.extend_from_slice(&pack_value(variable.kind, value)?);
    }
    Ok(bytes)
}
