mod input;
mod paths;
mod settings;
mod skin;

pub use input::InputMap;
pub use paths::ConfigPaths;
pub use settings::{LaunchMode, ShellSettings};
pub use skin::{Rgba, SkinConfig};
