//! Application management - spawning and readiness checking the front end

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Handle to a running front end process
pub struct ServerHandle {
    child: Child,
    pub base_url: String,
    pub port: u16,
}

impl ServerHandle {
    /// Spawn the front end with `PORT` pointing at a free (or fixed) port
    pub async fn spawn(config: ServerConfig) -> E2eResult<Self> {
        let (program, args) = config
            .command
            .split_first()
            .ok_or_else(|| E2eError::ServerStartup("empty app command".to_string()))?;

        let port = match config.port {
            Some(port) => port,
            None => find_free_port()?,
        };
        let base_url = format!("http://127.0.0.1:{}", port);

        info!("Spawning front end `{}` on port {}", config.command.join(" "), port);

        let mut cmd = Command::new(program);
        cmd.args(args)
            .env("PORT", port.to_string())
            .env("HOST", "127.0.0.1")
            // Keeps dev servers from opening a browser window.
            .env("BROWSER", "none");

        if let Some(dir) = &config.workdir {
            cmd.current_dir(dir);
        }

        cmd.stdout(Stdio::null()).stderr(Stdio::null());

        let child = cmd.spawn().map_err(|e| {
            E2eError::ServerStartup(format!("Failed to spawn {}: {}", program, e))
        })?;

        let handle = ServerHandle {
            child,
            base_url: base_url.clone(),
            port,
        };

        wait_for_ready(&base_url, config.startup_timeout).await?;

        info!("Front end is ready at {}", base_url);
        Ok(handle)
    }

    /// Get the base URL for this server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stop the server
    pub fn stop(&mut self) -> E2eResult<()> {
        info!("Stopping front end (pid: {})", self.child.id());

        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(500));
            }
        }

        // Force kill if still running
        let _ = self.child.kill();
        let _ = self.child.wait();

        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Poll `base_url` until it answers with a success status
pub async fn wait_for_ready(base_url: &str, timeout_duration: Duration) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = std::time::Instant::now();
    let mut attempts = 0;

    while start.elapsed() < timeout_duration {
        attempts += 1;

        match client.get(base_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                return Ok(());
            }
            Ok(resp) => {
                warn!("Readiness check returned {}", resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for front end at {}...", base_url);
                }
                // Connection refused is expected while the dev server boots
                if !e.is_connect() {
                    warn!("Readiness check error: {}", e);
                }
            }
        }

        sleep(Duration::from_millis(250)).await;
    }

    Err(E2eError::ServerHealthCheck(attempts))
}

/// Configuration for spawning the front end
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Program and arguments, e.g. `["npm", "start"]`
    pub command: Vec<String>,

    /// Working directory for the command
    pub workdir: Option<PathBuf>,

    /// Port to listen on (None = find free port)
    pub port: Option<u16>,

    /// Timeout for startup
    pub startup_timeout: Duration,
}

impl ServerConfig {
    /// Split a shell-style command line on whitespace
    pub fn from_command_line(line: &str) -> Self {
        Self {
            command: line.split_whitespace().map(String::from).collect(),
            ..Default::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            command: vec!["npm".to_string(), "start".to_string()],
            workdir: None,
            port: None,
            startup_timeout: Duration::from_secs(120),
        }
    }
}

/// Find a free port to use
fn find_free_port() -> E2eResult<u16> {
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_free_port() {
        let port1 = find_free_port().unwrap();
        let port2 = find_free_port().unwrap();

        // Ports should be in valid range
        assert!(port1 > 1024);
        assert!(port2 > 1024);
    }

    #[test]
    fn test_from_command_line() {
        let config = ServerConfig::from_command_line("npm  run start");
        assert_eq!(config.command, vec!["npm", "run", "start"]);
        assert!(config.port.is_none());
    }

    #[tokio::test]
    async fn test_empty_command_fails() {
        let config = ServerConfig {
            command: vec![],
            ..Default::default()
        };
        assert!(matches!(
            ServerHandle::spawn(config).await,
            Err(E2eError::ServerStartup(_))
        ));
    }

    #[tokio::test]
    async fn test_ready_check_times_out() {
        let port = find_free_port().unwrap();
        let result = wait_for_ready(
            &format!("http://127.0.0.1:{}", port),
            Duration::from_millis(300),
        )
        .await;
        assert!(matches!(result, Err(E2eError::ServerHealthCheck(_))));
    }
}
