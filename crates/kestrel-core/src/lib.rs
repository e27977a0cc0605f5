pub mod config;
pub mod error;
pub mod menu;
pub mod messages;
pub mod services;
pub mod utils;

pub use config::{ConfigPaths, InputMap, LaunchMode, Rgba, ShellSettings, SkinConfig};
pub use error::MenuError;
pub use menu::{
    ActionFn, ApplicationEntry, DirectoryStore, Entry, EntryKind, IconCache, LinkFile, MemoryStore,
    Menu, Registry, SectionScroller, SectionStore,
};
pub use messages::{Button, LaunchRequest, ShellCommand, ShellEvent, TouchState};
pub use services::{ClockService, ConfigWatcher, ProcessService, ServiceHub};
