pub mod spawn;

pub use spawn::{command_line, exec_replace, spawn_request};
