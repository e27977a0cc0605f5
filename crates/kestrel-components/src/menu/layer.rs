use std::cell::{Cell, RefCell};
use std::rc::Rc;
use compact_str::CompactString;

use kestrel_core::{Button, Menu, TouchState};

use super::input;
use super::layout::GridLayout;
use super::render::paint_menu;
use crate::common::{Layer, LayerContext, Surface};

/// Menu shared between the layer and the main loop that mutates it on commands
pub type SharedMenu = Rc<RefCell<Menu>>;

/// Bottom layer of the stack: the section strip and link grid
pub struct MenuLayer {
    menu: SharedMenu,
    ctx: LayerContext,
    clock: CompactString,
    /// Geometry of the last painted frame, used to map touches
    layout: Cell<GridLayout>,
}

impl MenuLayer {
    pub fn new(menu: SharedMenu, ctx: LayerContext) -> Self {
        let settings = ctx.settings();
        let skin = ctx.skin();
        let layout = {
            let menu = menu.borrow();
            GridLayout::new(
                settings.resolution_x,
                settings.resolution_y,
                &skin,
                menu.columns(),
                menu.rows(),
            )
        };

        Self {
            menu,
            ctx,
            clock: CompactString::default(),
            layout: Cell::new(layout),
        }
    }

    pub fn menu(&self) -> &SharedMenu {
        &self.menu
    }

    /// Text shown at the right of the footer
    pub fn set_clock(&mut self, time: &str) {
        self.clock = time.into();
    }
}

impl Layer for MenuLayer {
    fn paint(&self, surface: &mut dyn Surface) {
        let menu = self.menu.borrow();
        let skin = self.ctx.skin();
        let layout = GridLayout::new(
            surface.width(),
            surface.height(),
            &skin,
            menu.columns(),
            menu.rows(),
        );
        self.layout.set(layout);
        paint_menu(&menu, &layout, &skin, &self.clock, surface);
    }

    fn handle_button_press(&mut self, button: Button) -> bool {
        input::handle_button(&mut self.menu.borrow_mut(), button, &self.ctx)
    }

    fn handle_touch(&mut self, touch: &TouchState) -> bool {
        let layout = self.layout.get();
        input::handle_touch(&mut self.menu.borrow_mut(), touch, &layout, &self.ctx)
    }

    fn run_animations(&mut self) -> bool {
        self.menu.borrow_mut().run_animations()
    }
}
