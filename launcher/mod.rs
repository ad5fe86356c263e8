//! Handle for the external bus server process.
//!
//! The bus server ships as a prebuilt binary per platform under
//! `<library_root>/<platform>/DBUS_CMD`. A [`BusServer`] owns the child process:
//! whoever starts it stops it, either explicitly or by dropping the handle.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use thiserror::Error;
use tracing::{info, warn};

pub const SERVER_BINARY: &str = "DBUS_CMD";

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("no bus server build for platform {0:?}")]
    UnsupportedPlatform(String),

    #[error("failed to start bus server {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, LaunchError>;

/// Directory name of the server build for an OS as reported by `std::env::consts::OS`.
pub fn platform_dir(os: &str) -> Result<&'static str> {
    match os {
        "macos" => Ok("OSX32"),
        "windows" => Ok("WIN64"),
        other => Err(LaunchError::UnsupportedPlatform(other.to_string())),
    }
}

pub struct BusServer {
    child: Option<Child>,
}

impl BusServer {
    /// Start the server build for the current platform found under `library_root`.
    pub fn start(library_root: &Path) -> Result<Self> {
        let workdir = library_root.join(platform_dir(std::env::consts::OS)?);
        let path = workdir.join(SERVER_BINARY);

        let mut command = Command::new(&path);
        command.current_dir(&workdir);
        Self::spawn(command).map_err(|e| match e {
            LaunchError::Io(source) => LaunchError::Spawn { path, source },
            other => other,
        })
    }

    /// Take ownership of an arbitrary server command.
    pub fn spawn(mut command: Command) -> Result<Self> {
        let child = command.spawn()?;
        info!(pid = child.id(), "bus server started");
        Ok(BusServer { child: Some(child) })
    }

    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().map(|c| c.id())
    }

    pub fn is_running(&mut self) -> Result<bool> {
        match self.child.as_mut() {
            Some(child) => Ok(child.try_wait()?.is_none()),
            None => Ok(false),
        }
    }

    /// Kill the server and reap it.
    pub fn stop(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            // Already exited is fine
            if child.try_wait()?.is_none() {
                child.kill()?;
            }
            let status = child.wait()?;
            info!(%status, "bus server stopped");
        }
        Ok(())
    }
}

impl Drop for BusServer {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "failed to stop bus server");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_directories() {
        assert_eq!(platform_dir("macos").unwrap(), "OSX32");
        assert_eq!(platform_dir("windows").unwrap(), "WIN64");
        assert!(matches!(
            platform_dir("linux"),
            Err(LaunchError::UnsupportedPlatform(ref os)) if os == "linux"
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn linux_has_no_server_build() {
        let err = BusServer::start(Path::new("library")).err().unwrap();
        assert!(matches!(err, LaunchError::UnsupportedPlatform(_)));
    }

    #[cfg(unix)]
    #[test]
    fn stop_kills_child() {
        let mut command = Command::new("sleep");
        command.arg("30");
        let mut server = BusServer::spawn(command).unwrap();
        assert!(server.id().is_some());
        assert!(server.is_running().unwrap());
        server.stop().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn exited_child_is_not_running() {
        let mut server = BusServer::spawn(Command::new("true")).unwrap();
        // Give the child a moment to exit
        for _ in 0..50 {
            if !server.is_running().unwrap() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        assert!(!server.is_running().unwrap());
        drop(server);
    }
}
