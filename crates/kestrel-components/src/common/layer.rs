use kestrel_core::{Button, TouchState};

use super::Surface;

/// Trait that every stacked screen layer implements.
///
/// Layers are owned by the main loop thread and are not Send.
pub trait Layer {
    /// Draw the layer on top of whatever lies below it
    fn paint(&self, surface: &mut dyn Surface);

    /// Returns true when the press was consumed
    fn handle_button_press(&mut self, button: Button) -> bool;

    /// Returns true when the touch was consumed
    fn handle_touch(&mut self, touch: &TouchState) -> bool {
        let _ = touch;
        false
    }

    /// Advance animations by one frame. Returns whether any is still running.
    fn run_animations(&mut self) -> bool {
        false
    }

    /// Whether the layer asked to be removed from the stack
    fn is_dismissed(&self) -> bool {
        false
    }
}

/// Boxed layer type for the layer stack
pub type BoxedLayer = Box<dyn Layer>;
