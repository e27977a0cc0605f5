mod input;
mod layer;
mod layout;
mod render;

pub use layer::{MenuLayer, SharedMenu};
pub use layout::GridLayout;
pub use render::paint_menu;
