// Session configuration read from environment variables
//
// DBUSCOSIM_TCPIP: bus host (default: 127.0.0.1)
// DBUSCOSIM_TCPPORT: bus port (default: 6340)
// DBUSCOSIM_BUFFERSIZE: receive buffer units, doubled into bytes (default: 1024 -> 2048 bytes, 0 ignored)
// DBUSCOSIM_TIMEOUT_MS: read/write timeout, 0 or unset blocks forever
// DBUSCOSIM_REGISTER_DECLARED_KINDS: 1 to send each variable's kind at registration
//                                    instead of the placeholder code
use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6340;
pub const DEFAULT_BUFFER_UNITS: usize = 1024;

// Kind code sent for every variable at registration unless declared kinds are enabled
pub const PLACEHOLDER_KIND_CODE: u8 = 0x02;

static GLOBAL: Lazy<Config> = Lazy::new(Config::from_env);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Capacity of the single read used for every response
    pub buffer_size: usize,
    pub timeout: Option<Duration>,
    pub register_declared_kinds: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            buffer_size: DEFAULT_BUFFER_UNITS * 2,
            timeout: None,
            register_declared_kinds: false,
        }
    }
}

impl Config {
    /// Process-wide configuration, read from the environment on first use.
    pub fn global() -> &'static Config {
        &GLOBAL
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let host = lookup("DBUSCOSIM_TCPIP").unwrap_or(defaults.host);

        let port = lookup("DBUSCOSIM_TCPPORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let buffer_size = lookup("DBUSCOSIM_BUFFERSIZE")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&units| units > 0)
            .and_then(|units| units.checked_mul(2))
            .unwrap_or(defaults.buffer_size);

        let timeout = lookup("DBUSCOSIM_TIMEOUT_MS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis);

        let register_declared_kinds = lookup("DBUSCOSIM_REGISTER_DECLARED_KINDS")
            .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.register_declared_kinds);

        Config {
            host,
            port,
            buffer_size,
            timeout,
            register_declared_kinds,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
