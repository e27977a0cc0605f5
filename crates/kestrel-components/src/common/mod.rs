mod context;
mod layer;
mod surface;

pub use context::LayerContext;
pub use layer::{BoxedLayer, Layer};
pub use surface::{DrawCall, HAlign, Rect, RecordingSurface, Surface, VAlign};
