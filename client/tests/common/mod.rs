//! In-process stand-in for the bus server.
//!
//! Accepts one connection, acknowledges it, then answers every frame through
//! a handler. Every request frame is forwarded on a channel so tests can
//! assert on exactly what went over the wire.

#![allow(dead_code)]

use cosim_client::{ComponentDescriptor, Config, FunctionCode, Status, Variable};
use cosim_core::{decode_length, encode_directory, encode_frame, LENGTH_HEADER_SIZE};
use crossbeam::channel::{unbounded, Receiver, Sender};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub type Handler = Box<dyn FnMut(u8, &[u8]) -> Option<Vec<u8>> + Send>;

/// A request as seen by the bus: function code byte and payload
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub code: u8,
    pub payload: Vec<u8>,
}

pub struct MockBus {
    port: u16,
    requests: Receiver<Request>,
    handle: Option<JoinHandle<()>>,
}

pub fn reply(code: FunctionCode, payload: &[u8]) -> Vec<u8> {
    encode_frame(code, payload).expect("reply frame")
}

pub fn success(code: FunctionCode) -> Vec<u8> {
    reply(code, &Status::Success.marker())
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut header = [0u8; LENGTH_HEADER_SIZE];
    stream.read_exact(&mut header).ok()?;
    let mut body = vec![0u8; decode_length(&header) as usize];
    stream.read_exact(&mut body).ok()?;
    let (&code, payload) = body.split_first()?;
    Some(Request {
        code,
        payload: payload.to_vec(),
    })
}

fn serve(listener: TcpListener, mut handler: Handler, requests: Sender<Request>) {
    let (mut stream, _) = match listener.accept() {
        Ok(conn) => conn,
        Err(_) => return,
    };
    if stream.write_all(&success(FunctionCode::Connection)).is_err() {
        return;
    }

    while let Some(request) = read_request(&mut stream) {
        let code = request.code;
        let response = handler(code, &request.payload);
        let _ = requests.send(request);
        if code == FunctionCode::Disconnect.as_u8() {
            break;
        }
        if let Some(bytes) = response {
            if stream.write_all(&bytes).is_err() {
                break;
            }
        }
    }
}

impl MockBus {
    /// Bus that answers every request through `handler`
    pub fn start_with(handler: Handler) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock bus");
        let port = listener.local_addr().expect("local addr").port();
        let (tx, rx) = unbounded();
        let handle = thread::spawn(move || serve(listener, handler, tx));
        MockBus {
            port,
            requests: rx,
            handle: Some(handle),
        }
    }

    /// Bus keeping a real directory: `existing` components plus whatever registers
    pub fn start(existing: Vec<ComponentDescriptor>) -> Self {
        Self::start_with(Box::new(DirectoryBus::new(existing).into_handler()))
    }

    pub fn config(&self) -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: self.port,
            timeout: Some(Duration::from_secs(5)),
            ..Config::default()
        }
    }

    /// Next request the bus received
    pub fn next_request(&self) -> Request {
        self.requests
            .recv_timeout(Duration::from_secs(5))
            .expect("bus received no request")
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.try_iter().collect()
    }

    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("mock bus thread panicked");
        }
    }
}

/// Stateful directory behind [`MockBus::start`]
pub struct DirectoryBus {
    components: Vec<ComponentDescriptor>,
    last_update: Vec<u8>,
}

impl DirectoryBus {
    pub fn new(components: Vec<ComponentDescriptor>) -> Self {
        DirectoryBus {
            components,
            last_update: Vec::new(),
        }
    }

    fn register_variables(&mut self, payload: &[u8]) -> Option<()> {
        let count = decode_length(payload.get(..2)?) as usize;
        let mut rest = &payload[2..];
        let mut names = Vec::with_capacity(count);
        for _ in 0..count {
            let end = rest.iter().position(|&b| b == b',')?;
            names.push(String::from_utf8(rest[..end].to_vec()).ok()?);
            rest = &rest[end + 1..];
        }
        let variables = names
            .iter()
            .zip(rest.get(..count)?)
            .map(|(name, &code)| Variable::from_code(name, code).ok())
            .collect::<Option<Vec<_>>>()?;
        self.components.last_mut()?.variables = variables;
        Some(())
    }

    fn handle(&mut self, code: u8, payload: &[u8]) -> Option<Vec<u8>> {
        let ft = FunctionCode::from_u8(code)?;
        let ok = success(ft);
        let error = reply(ft, &Status::Error.marker());
        let response = match ft {
            FunctionCode::RegisterComponent => {
                let name = String::from_utf8_lossy(payload.get(1..)?).to_string();
                self.components.push(ComponentDescriptor::new(&name, vec![]));
                ok
            }
            FunctionCode::RegisterComponentVariables => match self.register_variables(payload) {
                Some(()) => ok,
                None => error,
            },
            FunctionCode::RequestComponentInformation => {
                reply(ft, &encode_directory(&self.components).ok()?)
            }
            FunctionCode::UpdateComponentVariables => {
                self.last_update = payload.to_vec();
                ok
            }
            FunctionCode::RequestComponentVariableContent => reply(ft, &self.last_update),
            FunctionCode::GetFlags | FunctionCode::GetLocalFlag | FunctionCode::GetError => {
                reply(ft, &[0])
            }
            FunctionCode::GetNames => {
                let names: String = self.components.iter().map(|c| format!("{},", c.name)).collect();
                reply(ft, names.as_bytes())
            }
            _ => ok,
        };
        Some(response)
    }

    pub fn into_handler(mut self) -> impl FnMut(u8, &[u8]) -> Option<Vec<u8>> + Send {
        move |code, payload| self.handle(code, payload)
    }
}
