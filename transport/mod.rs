// Transport module: connection to the co-simulation bus
pub mod traits;
pub mod tcp;

pub use traits::*;
pub use tcp::*;
