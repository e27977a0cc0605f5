use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ShellSettings;

/// Logical buttons of a handheld console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Accept,
    Cancel,
    AltLeft,
    AltRight,
    Menu,
    Settings,
    Repaint,
}

impl Button {
    /// Parse from string (for input maps and scripts)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "accept" => Some(Self::Accept),
            "cancel" => Some(Self::Cancel),
            "altleft" | "alt-left" => Some(Self::AltLeft),
            "altright" | "alt-right" => Some(Self::AltRight),
            "menu" => Some(Self::Menu),
            "settings" => Some(Self::Settings),
            "repaint" => Some(Self::Repaint),
            _ => None,
        }
    }
}

/// Snapshot of the touchscreen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchState {
    pub x: i32,
    pub y: i32,
    pub pressed: bool,
}

impl TouchState {
    pub fn pressed_at(x: i32, y: i32) -> Self {
        Self { x, y, pressed: true }
    }
}

/// Events FROM services and input TO the main loop
#[derive(Debug, Clone)]
pub enum ShellEvent {
    // =========== Input Events ===========

    /// A button was pressed
    Button(Button),

    /// The touchscreen changed state
    Touch(TouchState),

    // =========== Configuration Events ===========

    /// Something below the sections directory changed
    SectionsChanged(PathBuf),

    /// Launcher settings were reloaded
    SettingsReloaded(ShellSettings),

    // =========== Clock Events ===========

    /// Clock tick carrying the formatted time
    ClockTick(CompactString),

    // =========== Lifecycle Events ===========

    /// Leave the main loop
    Quit,
}
