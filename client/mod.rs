// client: session library for registering a component on the co-simulation bus
pub mod config;
pub mod error;
pub mod logging;
pub mod names;
pub mod session;

// Re-export protocol types callers need to describe variables and read directories
pub use cosim_core::{
    ComponentDescriptor, ComponentType, FunctionCode, ProtocolError, Status, Value, Variable,
    VariableKind,
};
pub use cosim_transport::{TcpTransport, Transport};

pub use config::Config;
pub use error::{Result, SessionError};
pub use names::{IntoNameList, NameList};
pub use session::Session;
