use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::{ConfigWatcher, ProcessService};
use crate::config::ConfigPaths;
use crate::messages::{ShellCommand, ShellEvent};

/// Central hub for the async services feeding the main loop
pub struct ServiceHub {
    /// Event sender for services and input sources
    event_tx: async_channel::Sender<ShellEvent>,
    /// Event receiver drained by the main loop
    event_rx: async_channel::Receiver<ShellEvent>,
    /// Commands for the process service
    process_tx: mpsc::Sender<ShellCommand>,
    /// Tokio runtime
    runtime: Arc<Runtime>,
}

impl ServiceHub {
    /// Create a new ServiceHub with its own tokio runtime
    pub fn new(paths: ConfigPaths) -> anyhow::Result<Self> {
        let runtime = Arc::new(Runtime::new()?);

        let (event_tx, event_rx) = async_channel::bounded::<ShellEvent>(64);
        let (process_tx, process_rx) = mpsc::channel::<ShellCommand>(64);

        runtime.spawn(async move {
            let service = ProcessService::new(process_rx);
            if let Err(e) = service.run().await {
                error!("Process service error: {}", e);
            }
        });

        let event_tx_config = event_tx.clone();
        runtime.spawn(async move {
            let watcher = ConfigWatcher::new(paths, event_tx_config);
            if let Err(e) = watcher.run().await {
                error!("Config watcher error: {}", e);
            }
        });

        info!("ServiceHub initialized");

        Ok(Self {
            event_tx,
            event_rx,
            process_tx,
            runtime,
        })
    }

    /// Get a clone of the event receiver
    pub fn event_receiver(&self) -> async_channel::Receiver<ShellEvent> {
        self.event_rx.clone()
    }

    /// Get a clone of the event sender
    pub fn event_sender(&self) -> async_channel::Sender<ShellEvent> {
        self.event_tx.clone()
    }

    /// Hand a launch or power command to the process service from a plain thread
    pub fn dispatch_process(&self, cmd: ShellCommand) {
        if self.process_tx.blocking_send(cmd).is_err() {
            warn!("Process service is gone, command dropped");
        }
    }

    /// Get a reference to the runtime
    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }
}
