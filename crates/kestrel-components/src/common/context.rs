use std::sync::Arc;
use async_channel::Sender;
use parking_lot::RwLock;
use tracing::warn;

use kestrel_core::{ShellCommand, ShellSettings, SkinConfig};

/// Context provided to all layers
#[derive(Clone)]
pub struct LayerContext {
    /// Command sender towards the main loop
    pub commands: Sender<ShellCommand>,
    /// Shared settings
    pub config: Arc<RwLock<ShellSettings>>,
    /// Active skin
    pub skin: Arc<RwLock<SkinConfig>>,
}

impl LayerContext {
    pub fn new(
        commands: Sender<ShellCommand>,
        config: Arc<RwLock<ShellSettings>>,
        skin: Arc<RwLock<SkinConfig>>,
    ) -> Self {
        Self {
            commands,
            config,
            skin,
        }
    }

    /// Queue a command without blocking the frame
    pub fn send_command(&self, cmd: ShellCommand) {
        if let Err(e) = self.commands.try_send(cmd) {
            warn!("Dropping command: {}", e);
        }
    }

    /// Get current settings
    pub fn settings(&self) -> ShellSettings {
        self.config.read().clone()
    }

    /// Get the current skin
    pub fn skin(&self) -> SkinConfig {
        self.skin.read().clone()
    }
}
