use async_channel::Sender;
use chrono::{Local, Timelike};
use compact_str::CompactString;
use std::fmt::Write;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::messages::ShellEvent;

const FALLBACK_FORMAT: &str = "%H:%M";

/// Wall-clock source owned by the shell.
///
/// Created at startup and stopped at shutdown; posts a `ClockTick` at
/// every minute boundary while running.
pub struct ClockService {
    format: String,
    task: Option<JoinHandle<()>>,
}

impl ClockService {
    pub fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
            task: None,
        }
    }

    /// Current local time in the configured format
    pub fn now_string(&self) -> CompactString {
        format_now(&self.format)
    }

    pub fn set_format(&mut self, format: &str) {
        self.format = format.to_string();
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Start posting ticks on `runtime`
    pub fn start(&mut self, runtime: &Handle, event_tx: Sender<ShellEvent>) {
        self.stop();

        let format = self.format.clone();
        self.task = Some(runtime.spawn(async move {
            info!("Starting clock service");
            loop {
                if event_tx.send(ShellEvent::ClockTick(format_now(&format))).await.is_err() {
                    debug!("Event queue closed, stopping clock");
                    break;
                }

                let seconds_left = 60 - u64::from(Local::now().second().min(59));
                tokio::time::sleep(Duration::from_secs(seconds_left)).await;
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Clock service stopped");
        }
    }
}

impl Drop for ClockService {
    fn drop(&mut self) {
        self.stop();
    }
}

fn format_now(format: &str) -> CompactString {
    let now = Local::now();
    let mut out = String::new();
    if write!(out, "{}", now.format(format)).is_err() {
        warn!("Invalid clock format '{}'", format);
        out.clear();
        let _ = write!(out, "{}", now.format(FALLBACK_FORMAT));
    }
    out.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_string_uses_format() {
        let clock = ClockService::new("%H:%M");
        let now = clock.now_string();
        assert_eq!(now.len(), 5);
        assert_eq!(&now[2..3], ":");
    }

    #[test]
    fn test_invalid_format_falls_back() {
        let clock = ClockService::new("%Q");
        assert_eq!(clock.now_string().len(), 5);
    }

    #[test]
    fn test_start_posts_tick_and_stop_aborts() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (tx, rx) = async_channel::bounded(4);
        let mut clock = ClockService::new("%H");

        clock.start(runtime.handle(), tx);
        assert!(clock.is_running());
        match rx.recv_blocking().unwrap() {
            ShellEvent::ClockTick(time) => assert_eq!(time.len(), 2),
            other => panic!("unexpected event {:?}", other),
        }

        clock.stop();
        assert!(!clock.is_running());
    }
}
