use async_channel::Sender;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{ConfigPaths, ShellSettings};
use crate::messages::ShellEvent;

const DEBOUNCE: Duration = Duration::from_millis(100);

/// Service that watches the sections tree and the settings file using inotify
pub struct ConfigWatcher {
    paths: ConfigPaths,
    event_tx: Sender<ShellEvent>,
}

impl ConfigWatcher {
    pub fn new(paths: ConfigPaths, event_tx: Sender<ShellEvent>) -> Self {
        Self { paths, event_tx }
    }

    /// Run the config watcher (blocks forever)
    pub async fn run(self) -> anyhow::Result<()> {
        info!("Starting config watcher");

        // Ensure watched directories exist
        let _ = tokio::fs::create_dir_all(&self.paths.user_sections).await;
        if let Some(parent) = self.paths.settings.parent() {
            let _ = tokio::fs::create_dir_all(parent).await;
        }

        let (notify_tx, mut notify_rx) = mpsc::channel::<PathBuf>(32);

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    if matches!(
                        event.kind,
                        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                    ) {
                        for path in event.paths {
                            let _ = notify_tx.blocking_send(path);
                        }
                    }
                }
            },
            notify::Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        if self.paths.user_sections.exists() {
            watcher.watch(&self.paths.user_sections, RecursiveMode::Recursive)?;
            debug!("Watching directory: {:?}", self.paths.user_sections);
        }

        // Watch the parent since the settings file might not exist yet
        if let Some(parent) = self.paths.settings.parent() {
            if parent.exists() {
                watcher.watch(parent, RecursiveMode::NonRecursive)?;
                debug!("Watching directory: {:?}", parent);
            }
        }

        let mut debounce_deadline: Option<tokio::time::Instant> = None;
        let mut pending_sections: Option<PathBuf> = None;
        let mut pending_settings_reload = false;

        loop {
            tokio::select! {
                Some(path) = notify_rx.recv() => {
                    if path.starts_with(&self.paths.user_sections) {
                        pending_sections = Some(path);
                        debounce_deadline = Some(tokio::time::Instant::now() + DEBOUNCE);
                    } else if path == self.paths.settings {
                        pending_settings_reload = true;
                        debounce_deadline = Some(tokio::time::Instant::now() + DEBOUNCE);
                    }
                }

                _ = async {
                    if let Some(deadline) = debounce_deadline {
                        tokio::time::sleep_until(deadline).await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => {
                    debounce_deadline = None;

                    if let Some(path) = pending_sections.take() {
                        debug!("Sections changed: {:?}", path);
                        let _ = self.event_tx.send(ShellEvent::SectionsChanged(path)).await;
                    }

                    if pending_settings_reload {
                        pending_settings_reload = false;
                        self.reload_settings().await;
                    }
                }
            }
        }
    }

    /// Reload launcher settings and send event
    async fn reload_settings(&self) {
        debug!("Reloading settings: {:?}", self.paths.settings);

        match tokio::fs::read(&self.paths.settings).await {
            Ok(data) => match serde_json::from_slice::<ShellSettings>(&data) {
                Ok(settings) => {
                    let settings = settings.normalized();
                    info!(
                        "Settings reloaded, grid {}x{}",
                        settings.link_columns, settings.link_rows
                    );
                    let _ = self.event_tx.send(ShellEvent::SettingsReloaded(settings)).await;
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}", e);
                }
            },
            Err(e) => {
                debug!("Could not read settings: {}", e);
            }
        }
    }
}
