use crate::config::ProxyConfig;
use anyhow::{Context, Result};
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Supervised auxiliary process proxying one provider's protocol.
///
/// Spawned with stdout/stderr redirected to a log file, monitored for exit,
/// and killed with an awaited reap on shutdown.
pub struct ProxySupervisor {
    shutdown: oneshot::Sender<()>,
    monitor: JoinHandle<()>,
}

impl ProxySupervisor {
    pub fn spawn(config: &ProxyConfig) -> Result<Self> {
        let log = std::fs::File::create(&config.log_file)
            .with_context(|| format!("Failed to open proxy log file {}", config.log_file))?;
        let err_log = log
            .try_clone()
            .context("Failed to clone proxy log handle")?;

        info!("Starting proxy process {}", config.command);

        let mut child = Command::new(&config.command)
            .args(&config.args)
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(err_log))
            .spawn()
            .with_context(|| format!("Failed to spawn proxy process {}", config.command))?;

        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
        let monitor = tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => match status {
                    Ok(status) => info!("Proxy process exited: {}", status),
                    Err(err) => warn!("Failed to reap proxy process: {}", err),
                },
                _ = &mut shutdown_rx => {
                    info!("Killing proxy process");
                    if let Err(err) = child.kill().await {
                        warn!("Failed to kill proxy process: {}", err);
                    }
                }
            }
        });

        Ok(Self { shutdown, monitor })
    }

    /// Terminates the child and waits for the monitor task to reap it.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.monitor.await;
    }
}
