//! Local Appium server process.
//!
//! Used by the profiles that run against a locally attached device or
//! simulator. The child process is stopped on [`AppiumService::stop`] or when
//! the service is dropped.

use reqwest::blocking::Client;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::result::{PepeniumError, PepeniumResult};

/// Time allowed for the server to answer `/status`
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(60);

const STATUS_POLL: Duration = Duration::from_millis(500);

/// How to launch the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Executable name or path
    pub executable: String,
    /// Listen address
    pub address: String,
    /// Fixed port; a free one is picked when `None`
    pub port: Option<u16>,
    /// Extra command-line arguments
    pub args: Vec<String>,
    /// Startup budget
    pub startup_timeout: Duration,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            executable: "appium".to_string(),
            address: "127.0.0.1".to_string(),
            port: None,
            args: Vec::new(),
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
        }
    }
}

impl ServiceOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the executable
    #[must_use]
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Listen on a fixed port
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Add a raw argument
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Enable an insecure feature, e.g. `chromedriver_autodownload`
    #[must_use]
    pub fn allow_insecure(self, feature: &str) -> Self {
        self.with_arg("--allow-insecure").with_arg(feature)
    }

    /// Set the startup budget
    #[must_use]
    pub const fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    /// Full argument list passed to the executable
    #[must_use]
    pub fn command_args(&self, port: u16) -> Vec<String> {
        let mut args = vec![
            "--address".to_string(),
            self.address.clone(),
            "--port".to_string(),
            port.to_string(),
        ];
        args.extend(self.args.iter().cloned());
        args
    }
}

/// Ask the OS for an unused local port
pub fn free_port() -> PepeniumResult<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Running Appium server
#[derive(Debug)]
pub struct AppiumService {
    child: Option<Child>,
    url: String,
}

impl AppiumService {
    /// Spawn the server and wait until `/status` answers
    pub fn start(options: &ServiceOptions) -> PepeniumResult<Self> {
        let port = match options.port {
            Some(port) => port,
            None => free_port()?,
        };
        let url = format!("http://{}:{port}", options.address);
        info!(executable = %options.executable, %url, "starting Appium service");

        let child = Command::new(&options.executable)
            .args(options.command_args(port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PepeniumError::Service {
                message: format!("failed to spawn {}: {e}", options.executable),
            })?;

        let mut service = Self {
            child: Some(child),
            url,
        };
        service.wait_ready(options.startup_timeout)?;
        info!(url = %service.url, "Appium service ready");
        Ok(service)
    }

    fn wait_ready(&mut self, timeout: Duration) -> PepeniumResult<()> {
        let client = Client::builder()
            .timeout(STATUS_POLL)
            .build()
            .map_err(PepeniumError::Http)?;
        let status_url = format!("{}/status", self.url);
        let start = Instant::now();

        while start.elapsed() < timeout {
            if let Some(child) = self.child.as_mut() {
                if let Some(status) = child.try_wait()? {
                    self.child = None;
                    return Err(PepeniumError::Service {
                        message: format!("Appium exited during startup ({status})"),
                    });
                }
            }
            match client.get(&status_url).send() {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => debug!(status = %response.status(), "Appium not ready"),
                Err(e) => debug!(error = %e, "Appium not reachable yet"),
            }
            thread::sleep(STATUS_POLL);
        }

        self.stop();
        Err(PepeniumError::Service {
            message: format!(
                "Appium did not answer {status_url} within {}ms",
                timeout.as_millis()
            ),
        })
    }

    /// Base URL of the server
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether the child process is still owned
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.child.is_some()
    }

    /// Kill the server; calling twice is harmless
    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            info!(url = %self.url, "stopping Appium service");
            if let Err(e) = child.kill() {
                warn!(error = %e, "could not kill Appium");
            }
            let _ = child.wait();
        }
    }
}

impl Drop for AppiumService {
    fn drop(&mut self) {
        self.stop();
    }
}
