//! WebDriver server management - spawning and health checking the driver process

use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::DriverConfig;
use crate::error::{Error, Result};

/// Handle to a running WebDriver server process (chromedriver, geckodriver)
pub struct DriverHandle {
    child: Child,
    base_url: String,
    pub port: u16,
}

impl DriverHandle {
    /// Spawn the driver binary and wait until its `/status` endpoint reports ready
    pub async fn spawn(config: DriverConfig) -> Result<Self> {
        let port = config.port.unwrap_or_else(find_free_port);
        let base_url = format!("http://127.0.0.1:{}", port);

        info!("Spawning WebDriver server on port {}", port);

        let child = Command::new(&config.binary_path)
            .arg(format!("--port={}", port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                Error::DriverStartup(format!(
                    "failed to spawn {}: {}",
                    config.binary_path.display(),
                    e
                ))
            })?;

        let handle = DriverHandle {
            child,
            base_url,
            port,
        };

        handle.wait_for_ready(config.startup_timeout).await?;

        info!("WebDriver server ready at {}", handle.base_url);
        Ok(handle)
    }

    /// Poll `/status` until the driver reports ready
    async fn wait_for_ready(&self, timeout: Duration) -> Result<()> {
        let status_url = format!("{}/status", self.base_url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout {
            attempts += 1;

            match client.get(&status_url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                Ok(resp) => {
                    warn!("Driver status check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for WebDriver server to start...");
                    }
                    // Connection refused is expected while the driver is starting
                    if !e.is_connect() {
                        warn!("Driver status check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(Error::DriverHealthCheck(attempts))
    }

    /// Base URL of the WebDriver REST surface
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stop the driver process
    pub fn stop(&mut self) -> Result<()> {
        info!("Stopping WebDriver server (pid: {})", self.child.id());

        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(200));
            }
        }

        // Force kill if still running
        let _ = self.child.kill();
        let _ = self.child.wait();

        Ok(())
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Find a free port to use
fn find_free_port() -> u16 {
    use std::net::TcpListener;

    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to find free port")
        .local_addr()
        .expect("Failed to get local addr")
        .port()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_ports_come_from_the_ephemeral_range() {
        let port1 = find_free_port();
        let port2 = find_free_port();

        assert!(port1 > 1024);
        assert!(port2 > 1024);
    }
}
