// Core module: bus protocol definitions, frame codec and payload shapes (NO I/O dependencies)
pub mod types;
pub mod error;
pub mod protocol;
pub mod directory;
pub mod values;

pub use types::*;
pub use error::*;
pub use protocol::*;
pub use directory::*;
pub use values::*;
