mod commands;
mod events;

pub use commands::{LaunchRequest, ShellCommand};
pub use events::{Button, ShellEvent, TouchState};
