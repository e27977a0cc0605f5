use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::messages::{LaunchRequest, ShellCommand};
use crate::utils::spawn_request;

const POWER_OFF: &[&str] = &["systemctl poweroff", "poweroff", "busybox poweroff"];
const REBOOT: &[&str] = &["systemctl reboot", "reboot", "busybox reboot"];
const SUSPEND: &[&str] = &["systemctl suspend", "loginctl suspend", "echo mem > /sys/power/state"];

/// Service for handling process launching and power commands
pub struct ProcessService {
    command_rx: mpsc::Receiver<ShellCommand>,
}

impl ProcessService {
    pub fn new(command_rx: mpsc::Receiver<ShellCommand>) -> Self {
        Self { command_rx }
    }

    /// Run the process service until every sender is gone
    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("Starting process service");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                ShellCommand::Launch(request) => {
                    Self::launch(request).await;
                }

                ShellCommand::PowerOff => {
                    info!("Powering off");
                    if !run_with_fallbacks(POWER_OFF).await {
                        error!("Failed to initiate power off");
                    }
                }

                ShellCommand::Reboot => {
                    info!("Rebooting");
                    if !run_with_fallbacks(REBOOT).await {
                        error!("Failed to initiate reboot");
                    }
                }

                ShellCommand::Suspend => {
                    info!("Suspending");
                    if !run_with_fallbacks(SUSPEND).await {
                        error!("Failed to initiate suspend");
                    }
                }

                // Menu commands are handled by the main loop
                _ => {}
            }
        }

        info!("Process service stopped");
        Ok(())
    }

    /// Launch an application without waiting for it
    async fn launch(request: LaunchRequest) {
        debug!("Launching {:?} in {:?}", request.exec, request.workdir);

        let result = tokio::task::spawn_blocking(move || {
            spawn_request(&request).map_err(|e| (request.title, e))
        })
        .await;

        match result {
            Ok(Ok(_)) => {}
            Ok(Err((title, e))) => error!("Failed to launch '{}': {}", title, e),
            Err(e) => error!("Launch task failed: {}", e),
        }
    }
}

/// Helper for running a command with fallbacks
pub async fn run_with_fallbacks(commands: &[&str]) -> bool {
    for cmd in commands {
        let result = tokio::process::Command::new("sh")
            .args(["-c", cmd])
            .spawn();

        if result.is_ok() {
            debug!("Successfully ran: {}", cmd);
            return true;
        }
    }
    false
}
