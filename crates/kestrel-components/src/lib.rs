pub mod common;
pub mod context_menu;
pub mod menu;

pub use common::{
    BoxedLayer, DrawCall, HAlign, Layer, LayerContext, Rect, RecordingSurface, Surface, VAlign,
};
pub use context_menu::{ContextMenu, ContextOption};
pub use menu::{GridLayout, MenuLayer, SharedMenu};
