// TCP transport implementation
use crate::traits::Transport;
use std::io::{Read, Result, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;
use tracing::{debug, warn};

#[cfg(unix)]
use nix::sys::socket::{setsockopt, sockopt};

pub struct TcpTransport {
    address: String,
    stream: Option<TcpStream>,
    timeout: Option<Duration>,
    receive_buffer: Option<usize>,
}

impl TcpTransport {
    pub fn new(address: &str) -> Self {
        TcpTransport {
            address: address.to_string(),
            stream: None,
            timeout: None,
            receive_buffer: None,
        }
    }

    /// Read/write timeout applied on connect. `None` blocks forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ask the kernel for a receive buffer of at least `size` bytes (SO_RCVBUF)
    pub fn with_receive_buffer(mut self, size: usize) -> Self {
        self.receive_buffer = Some(size);
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    #[cfg(unix)]
    fn tune_socket(&self, stream: &TcpStream) {
        if let Some(size) = self.receive_buffer {
            if let Err(e) = setsockopt(stream, sockopt::RcvBuf, &size) {
                warn!(address = %self.address, error = %e, "failed to set SO_RCVBUF");
            }
        }
    }

    #[cfg(not(unix))]
    fn tune_socket(&self, _stream: &TcpStream) {}

    fn not_connected() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotConnected, "Not connected")
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, data: &[u8]) -> Result<usize> {
        if let Some(ref mut stream) = self.stream {
            stream.write(data)
        } else {
            Err(Self::not_connected())
        }
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        if let Some(ref mut stream) = self.stream {
            stream.read(buf)
        } else {
            Err(Self::not_connected())
        }
    }

    fn connect(&mut self) -> Result<()> {
        let stream = TcpStream::connect(&self.address)?;
        stream.set_read_timeout(self.timeout)?;
        stream.set_write_timeout(self.timeout)?;
        stream.set_nodelay(true)?;
        self.tune_socket(&stream);
        debug!(address = %self.address, "tcp connected");
        self.stream = Some(stream);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            // The peer may already have closed its side
            let _ = stream.shutdown(Shutdown::Both);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn io_before_connect_fails() {
        let mut transport = TcpTransport::new("127.0.0.1:1");
        let err = transport.send(b"x").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotConnected);
        let mut buf = [0u8; 4];
        let err = transport.receive(&mut buf).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotConnected);
    }

    #[test]
    fn exchanges_bytes_with_peer() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let peer = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 16];
            let n = stream.read(&mut buf).unwrap();
            stream.write_all(&buf[..n]).unwrap();
        });

        let mut transport = TcpTransport::new(&address)
            .with_timeout(Some(Duration::from_secs(5)))
            .with_receive_buffer(2048);
        transport.connect().unwrap();
        assert!(transport.is_connected());
        assert_eq!(transport.send(b"ping").unwrap(), 4);

        let mut buf = [0u8; 16];
        let n = transport.receive(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ping");

        transport.disconnect().unwrap();
        assert!(!transport.is_connected());
        peer.join().unwrap();
    }
}
