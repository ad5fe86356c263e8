// Core types shared by the codec and the session layer
use crate::error::ProtocolError;
use std::fmt;

// Function codes (1 byte, shared by request and response)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FunctionCode {
    Connection = 0x01,
    RegisterComponent = 0x0A,
    RegisterComponentVariables = 0x0B,
    RequestComponentInformation = 0x0C,
    SubscribeComponentVariables = 0x0D,
    RequestComponentVariableContent = 0x0E,
    UpdateComponentVariables = 0x0F,
    GetFlags = 0x10,
    SetFlags = 0x11,
    SetLocalFlag = 0x12,
    GetLocalFlag = 0x13,
    GetError = 0x14,
    SetError = 0x15,
    Clear = 0x16,
    GetNames = 0x17,
    Disconnect = 0x18,
}

impl FunctionCode {
    pub fn from_u8(val: u8) -> Option<Self> {
        let code = match val {
            0x01 => FunctionCode::Connection,
            0x0A => FunctionCode::RegisterComponent,
            0x0B => FunctionCode::RegisterComponentVariables,
            0x0C => FunctionCode::RequestComponentInformation,
            0x0D => FunctionCode::SubscribeComponentVariables,
            0x0E => FunctionCode::RequestComponentVariableContent,
            0x0F => FunctionCode::UpdateComponentVariables,
            0x10 => FunctionCode::GetFlags,
            0x11 => FunctionCode::SetFlags,
            0x12 => FunctionCode::SetLocalFlag,
            0x13 => FunctionCode::GetLocalFlag,
            0x14 => FunctionCode::GetError,
            0x15 => FunctionCode::SetError,
            0x16 => FunctionCode::Clear,
            0x17 => FunctionCode::GetNames,
            0x18 => FunctionCode::Disconnect,
            _ => return None,
        };
        Some(code)
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            FunctionCode::Connection => "CONNECTION",
            FunctionCode::RegisterComponent => "REGISTERCOMPONENT",
            FunctionCode::RegisterComponentVariables => "REGISTERCOMPONENTVARIABLES",
            FunctionCode::RequestComponentInformation => "REQUESTCOMPONENTINFORMATION",
            FunctionCode::SubscribeComponentVariables => "SUBSCRIBECOMPONENTVARIABLES",
            FunctionCode::RequestComponentVariableContent => "REQUESTCOMPONENTVARIABLECONTENT",
            FunctionCode::UpdateComponentVariables => "UPDATECOMPONENTVARIABLES",
            FunctionCode::GetFlags => "GETFLAGS",
            FunctionCode::SetFlags => "SETFLAGS",
            FunctionCode::SetLocalFlag => "SETLOCALFLAG",
            FunctionCode::GetLocalFlag => "GETLOCALFLAG",
            FunctionCode::GetError => "GETERROR",
            FunctionCode::SetError => "SETERROR",
            FunctionCode::Clear => "CLEAR",
            FunctionCode::GetNames => "GETNAMES",
            FunctionCode::Disconnect => "DISCONNECT",
        };
        f.write_str(name)
    }
}

// Single-byte status markers used as acknowledgment payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Success = 0x01,
    Error = 0x11,
}

impl Status {
    pub fn marker(self) -> [u8; 1] {
        [self as u8]
    }

    /// Interpret a payload as a status marker. Only single-byte payloads qualify.
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        match payload {
            [0x01] => Some(Status::Success),
            [0x11] => Some(Status::Error),
            _ => None,
        }
    }
}

// Component role announced at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ComponentType {
    #[default]
    Slave = 0x01,
    Master = 0x0F,
    Supervisor = 0xAF,
}

impl ComponentType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

// Variable kinds as they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VariableKind {
    Integer = 1,
    Float64 = 2,
    Float32 = 3,
    Boolean = 4,
}

impl VariableKind {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Width in bytes of a packed value of this kind.
    pub fn width(self) -> usize {
        match self {
            VariableKind::Integer => 4,
            VariableKind::Float64 => 8,
            VariableKind::Float32 => 4,
            VariableKind::Boolean => 1,
        }
    }
}

impl TryFrom<u8> for VariableKind {
    type Error = ProtocolError;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        match val {
            1 => Ok(VariableKind::Integer),
            2 => Ok(VariableKind::Float64),
            3 => Ok(VariableKind::Float32),
            4 => Ok(VariableKind::Boolean),
            other => Err(ProtocolError::UnknownVariableKind(other)),
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VariableKind::Integer => write!(f, "Integer"),
            VariableKind::Float64 => write!(f, "Float64"),
            VariableKind::Float32 => write!(f, "Float32"),
            VariableKind::Boolean => write!(f, "Boolean"),
        }
    }
}

// A named, typed scalar owned by a component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub kind: VariableKind,
}

impl Variable {
    pub fn new(name: &str, kind: VariableKind) -> Self {
        Variable {
            name: name.to_string(),
            kind,
        }
    }

    /// Build a variable from a raw kind byte, rejecting unmapped codes.
    pub fn from_code(name: &str, code: u8) -> Result<Self, ProtocolError> {
        Ok(Variable::new(name, VariableKind::try_from(code)?))
    }
}

// One entry of a directory query response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    pub name: String,
    pub variables: Vec<Variable>,
}

impl ComponentDescriptor {
    pub fn new(name: &str, variables: Vec<Variable>) -> Self {
        ComponentDescriptor {
            name: name.to_string(),
            variables,
        }
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }
}
