// Session: one component's connection to the bus and its protocol state
//
// Every operation is one blocking send followed (except for disconnect) by one
// blocking receive. `&mut self` keeps a single request in flight.
use crate::config::{Config, PLACEHOLDER_KIND_CODE};
use crate::error::{Result, SessionError};
use crate::names::IntoNameList;
use cosim_core::{
    declared_length, decode_directory, decode_frame, encode_frame, encode_name_list,
    expect_status, frame_length_matches, length_prefix, pack_values, ComponentDescriptor,
    ComponentType, FunctionCode, ProtocolError, Status, Value, Variable,
};
use cosim_transport::{TcpTransport, Transport};
use tracing::{debug, info, warn};

pub struct Session {
    name: String,
    component_type: ComponentType,
    variables: Vec<Variable>,
    transport: Box<dyn Transport>,
    config: Config,
    connected: bool,
}

impl Session {
    /// New session using the process-wide configuration.
    pub fn new(name: &str, variables: Vec<Variable>) -> Self {
        Self::with_config(name, variables, Config::global().clone())
    }

    pub fn with_config(name: &str, variables: Vec<Variable>, config: Config) -> Self {
        let transport = TcpTransport::new(&config.address())
            .with_timeout(config.timeout)
            .with_receive_buffer(config.buffer_size);
        Self::with_transport(name, variables, config, Box::new(transport))
    }

    pub fn with_transport(
        name: &str,
        variables: Vec<Variable>,
        config: Config,
        transport: Box<dyn Transport>,
    ) -> Self {
        Session {
            name: name.to_string(),
            component_type: ComponentType::default(),
            variables,
            transport,
            config,
            connected: false,
        }
    }

    /// Build from raw kind codes, failing on any code with no known kind.
    pub fn from_codes(name: &str, variables: &[(&str, u8)], config: Config) -> Result<Self> {
        let variables = variables
            .iter()
            .map(|&(var, code)| Variable::from_code(var, code))
            .collect::<std::result::Result<Vec<_>, ProtocolError>>()?;
        Ok(Self::with_config(name, variables, config))
    }

    pub fn with_type(mut self, component_type: ComponentType) -> Self {
        self.component_type = component_type;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    /// Variables in the order used to encode value updates.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn connect(&mut self) -> Result<()> {
        if self.connected {
            return Ok(());
        }

        let address = self.config.address();
        self.transport
            .connect()
            .map_err(|source| SessionError::ConnectionFailure {
                address: address.clone(),
                source,
            })?;
        info!(%address, "Connecting ...");

        if let Err(e) = self.recv_status(FunctionCode::Connection) {
            let _ = self.transport.disconnect();
            return Err(e);
        }

        self.connected = true;
        info!(component = %self.name, "Successfully connected to bus");
        Ok(())
    }

    pub fn register(&mut self) -> Result<()> {
        self.ensure_connected()?;

        let mut payload = Vec::with_capacity(1 + self.name.len());
        payload.push(self.component_type.as_u8());
        payload.extend_from_slice(self.name.as_bytes());

        self.send(FunctionCode::RegisterComponent, &payload)?;
        self.recv_status(FunctionCode::RegisterComponent)?;
        info!(component = %self.name, "Successfully registered to bus");
        Ok(())
    }

    /// Register the declared variables, then adopt the names, order and kinds
    /// the bus reports back for this component.
    pub fn register_variables(&mut self) -> Result<()> {
        self.ensure_connected()?;
        let ft = FunctionCode::RegisterComponentVariables;

        let names: Vec<&str> = self.variables.iter().map(|v| v.name.as_str()).collect();
        let mut payload = encode_name_list(&names, 2)?;
        if self.config.register_declared_kinds {
            payload.extend(self.variables.iter().map(|v| v.kind.as_u8()));
        } else {
            payload.extend(std::iter::repeat(PLACEHOLDER_KIND_CODE).take(self.variables.len()));
        }

        self.send(ft, &payload)?;
        self.recv_status(ft)?;
        info!(component = %self.name, count = self.variables.len(), "Successfully registered component variables to bus");

        let own = self
            .request_component_information()?
            .into_iter()
            .find(|c| c.name == self.name)
            .ok_or_else(|| SessionError::SelfNotFound(self.name.clone()))?;

        self.variables = own.variables;
        Ok(())
    }

    /// Directory query: every registered component with its typed variables.
    pub fn request_component_information(&mut self) -> Result<Vec<ComponentDescriptor>> {
        self.ensure_connected()?;
        let ft = FunctionCode::RequestComponentInformation;

        self.send(ft, &[])?;
        let payload = self.recv(ft)?;
        debug!(payload = ?payload, "component information");

        Ok(decode_directory(&payload)?)
    }

    pub fn subscribe_variables<C, V>(&mut self, components: C, variables: V) -> Result<()>
    where
        C: IntoNameList,
        V: IntoNameList,
    {
        let ft = FunctionCode::SubscribeComponentVariables;
        let payload = Self::selection_payload(components, variables)?;
        self.ensure_connected()?;

        self.send(ft, &payload)?;
        self.recv_status(ft)
    }

    /// Raw content of the selected variables as returned by the bus.
    pub fn request_variable_content<C, V>(&mut self, components: C, variables: V) -> Result<Vec<u8>>
    where
        C: IntoNameList,
        V: IntoNameList,
    {
        let ft = FunctionCode::RequestComponentVariableContent;
        let payload = Self::selection_payload(components, variables)?;
        self.ensure_connected()?;

        self.send(ft, &payload)?;
        let data = self.recv(ft)?;
        info!(data = ?data, "Received data on request for component variable content");
        Ok(data)
    }

    /// Push `values` positionally against [`Session::variables`].
    pub fn update_component_variables(&mut self, values: &[Value]) -> Result<()> {
        self.ensure_connected()?;
        let ft = FunctionCode::UpdateComponentVariables;

        let payload = pack_values(&self.variables, values)?;
        self.send(ft, &payload)?;
        self.recv_status(ft)
    }

    pub fn get_flags(&mut self) -> Result<Vec<u8>> {
        let data = self.query(FunctionCode::GetFlags)?;
        if Status::from_payload(&data) == Some(Status::Error) {
            return Err(ProtocolError::UnexpectedStatus {
                function: FunctionCode::GetFlags,
                payload: data,
            }
            .into());
        }
        info!(data = ?data, "Received data for get flags");
        Ok(data)
    }

    /// Send `flags` as a `width`-byte counter.
    pub fn set_flags(&mut self, flags: u64, width: usize) -> Result<()> {
        self.ensure_connected()?;
        let payload = length_prefix(flags, width)?;
        self.send(FunctionCode::SetFlags, &payload)?;
        self.recv_status(FunctionCode::SetFlags)
    }

    pub fn get_local_flag(&mut self) -> Result<Vec<u8>> {
        let data = self.query(FunctionCode::GetLocalFlag)?;
        info!(data = ?data, "Received data for get local flag");
        Ok(data)
    }

    pub fn set_local_flag(&mut self) -> Result<()> {
        self.command(FunctionCode::SetLocalFlag)
    }

    pub fn get_error(&mut self) -> Result<Vec<u8>> {
        let data = self.query(FunctionCode::GetError)?;
        info!(data = ?data, "Received data for error");
        Ok(data)
    }

    pub fn set_error(&mut self) -> Result<()> {
        self.command(FunctionCode::SetError)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.command(FunctionCode::Clear)
    }

    pub fn get_names(&mut self) -> Result<Vec<u8>> {
        let data = self.query(FunctionCode::GetNames)?;
        info!(data = ?data, "Received data for get names");
        Ok(data)
    }

    /// Send the disconnect code and drop the connection without waiting for a reply.
    pub fn disconnect(&mut self) -> Result<()> {
        self.ensure_connected()?;

        let sent = self.send(FunctionCode::Disconnect, &[]);
        info!(component = %self.name, "Disconnecting");
        self.connected = false;
        let _ = self.transport.disconnect();
        sent
    }

    fn selection_payload<C, V>(components: C, variables: V) -> Result<Vec<u8>>
    where
        C: IntoNameList,
        V: IntoNameList,
    {
        let components = components.into_name_list("component names")?;
        let variables = variables.into_name_list("variable names")?;

        let mut payload = encode_name_list(components.as_slice(), 1)?;
        payload.extend_from_slice(&encode_name_list(variables.as_slice(), 2)?);
        Ok(payload)
    }

    // Bare function code out, raw payload back
    fn query(&mut self, ft: FunctionCode) -> Result<Vec<u8>> {
        self.ensure_connected()?;
        self.send(ft, &[])?;
        self.recv(ft)
    }

    // Bare function code out, SUCCESS expected back
    fn command(&mut self, ft: FunctionCode) -> Result<()> {
        self.ensure_connected()?;
        self.send(ft, &[])?;
        self.recv_status(ft)
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(SessionError::NotConnected)
        }
    }

    fn send(&mut self, ft: FunctionCode, payload: &[u8]) -> Result<()> {
        let message = encode_frame(ft, payload)?;
        debug!(action = %ft, message = ?message, "Sending data");

        let written = self.transport.send(&message)?;
        if written != message.len() {
            return Err(SessionError::PartialWrite {
                written,
                expected: message.len(),
            });
        }
        Ok(())
    }

    // One read of at most `buffer_size` bytes is taken as the whole response
    fn recv(&mut self, ft: FunctionCode) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.config.buffer_size];
        let n = self.transport.receive(&mut buf)?;
        if n == 0 {
            return Err(SessionError::ConnectionClosed);
        }
        let frame = &buf[..n];
        debug!(action = %ft, data = ?frame, "Received data");

        let payload = decode_frame(frame, ft)?;
        if !frame_length_matches(frame) {
            warn!(
                action = %ft,
                declared = ?declared_length(frame),
                received = n,
                "frame length header disagrees with received bytes"
            );
        }
        debug!(content = ?payload, "Message content");
        Ok(payload)
    }

    fn recv_status(&mut self, ft: FunctionCode) -> Result<()> {
        let payload = self.recv(ft)?;
        expect_status(ft, &payload)?;
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.connected {
            if let Err(e) = self.disconnect() {
                warn!(component = %self.name, error = %e, "disconnect on drop failed");
            }
        }
    }
}
