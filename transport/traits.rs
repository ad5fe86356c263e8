// Transport abstraction - the session talks to the bus through this, so tests can script a peer
use std::io::Result;

pub trait Transport: Send {
    /// One write call. The returned count may be short; callers decide what that means.
    fn send(&mut self, data: &[u8]) -> Result<usize>;
    /// One read call into `buf`. Zero means the peer closed the connection.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize>;
    fn connect(&mut self) -> Result<()>;
    fn disconnect(&mut self) -> Result<()>;
}
