mod clock;
mod config_watcher;
mod hub;
mod process;

pub use clock::ClockService;
pub use config_watcher::ConfigWatcher;
pub use hub::ServiceHub;
pub use process::{run_with_fallbacks, ProcessService};
