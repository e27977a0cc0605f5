use std::cell::Cell;
use compact_str::{format_compact, CompactString};
use smallvec::SmallVec;
use tracing::debug;

use kestrel_core::menu::grid::clamp_index;
use kestrel_core::{Button, Menu, ShellCommand, TouchState};

use crate::common::{HAlign, Layer, LayerContext, Rect, Surface, VAlign};

const PADDING: i32 = 6;

/// One row of the context menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextOption {
    DeleteLink,
    MoveLink { to_section: usize, name: CompactString },
    SortLinks,
    DeleteSection,
    Cancel,
}

impl ContextOption {
    pub fn label(&self) -> CompactString {
        match self {
            Self::DeleteLink => "Delete link".into(),
            Self::MoveLink { name, .. } => format_compact!("Move link to {}", name),
            Self::SortLinks => "Sort links".into(),
            Self::DeleteSection => "Delete section".into(),
            Self::Cancel => "Cancel".into(),
        }
    }

    pub fn command(&self) -> Option<ShellCommand> {
        match self {
            Self::DeleteLink => Some(ShellCommand::DeleteSelectedLink),
            Self::MoveLink { to_section, .. } => Some(ShellCommand::MoveSelectedLink {
                to_section: *to_section,
            }),
            Self::SortLinks => Some(ShellCommand::OrderLinks),
            Self::DeleteSection => Some(ShellCommand::DeleteSelectedSection),
            Self::Cancel => None,
        }
    }
}

/// Modal list of actions on the current selection
pub struct ContextMenu {
    options: SmallVec<[ContextOption; 6]>,
    selected: usize,
    dismissed: bool,
    ctx: LayerContext,
    /// Box and row height of the last painted frame, used to map touches
    painted: Cell<Option<(Rect, i32)>>,
}

impl ContextMenu {
    /// Options that apply to the menu's current selection
    pub fn for_menu(menu: &Menu, ctx: LayerContext) -> Self {
        let mut options = SmallVec::new();
        let registry = menu.registry();

        if menu.selected_entry().is_some_and(|e| e.is_application()) {
            options.push(ContextOption::DeleteLink);
            if registry.len() > 1 {
                let to_section = (menu.selected_section_index() + 1) % registry.len();
                if let Some(name) = registry.section_name(to_section) {
                    options.push(ContextOption::MoveLink {
                        to_section,
                        name: name.into(),
                    });
                }
            }
        }
        if !registry.is_empty() {
            options.push(ContextOption::SortLinks);
            options.push(ContextOption::DeleteSection);
        }
        options.push(ContextOption::Cancel);

        Self {
            options,
            selected: 0,
            dismissed: false,
            ctx,
            painted: Cell::new(None),
        }
    }

    pub fn options(&self) -> &[ContextOption] {
        &self.options
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    fn accept(&mut self) {
        if let Some(cmd) = self.options.get(self.selected).and_then(ContextOption::command) {
            debug!("Context menu sends {:?}", cmd);
            self.ctx.send_command(cmd);
        }
        self.dismissed = true;
    }

    fn frame(&self, surface: &dyn Surface) -> (Rect, i32) {
        let row_height = surface.text_height() as i32 + 4;
        let text_width = self
            .options
            .iter()
            .map(|o| surface.text_width(&o.label()))
            .max()
            .unwrap_or(0) as i32;

        let w = text_width + 2 * PADDING;
        let h = row_height * self.options.len() as i32 + 2 * PADDING;
        let x = (surface.width() as i32 - w) / 2;
        let y = (surface.height() as i32 - h) / 2;
        (Rect::new(x, y, w as u32, h as u32), row_height)
    }

    fn row_rect(frame: Rect, row_height: i32, row: usize) -> Rect {
        Rect::new(
            frame.x + PADDING / 2,
            frame.y + PADDING + row as i32 * row_height,
            frame.w - PADDING as u32,
            row_height as u32,
        )
    }
}

impl Layer for ContextMenu {
    fn paint(&self, surface: &mut dyn Surface) {
        let skin = self.ctx.skin();
        let (frame, row_height) = self.frame(surface);
        self.painted.set(Some((frame, row_height)));

        surface.fill_rect(frame, skin.message_box_bg);
        surface.stroke_rect(frame, skin.message_box_border);
        surface.fill_rect(
            Self::row_rect(frame, row_height, self.selected),
            skin.message_box_selection,
        );

        for (row, option) in self.options.iter().enumerate() {
            let rect = Self::row_rect(frame, row_height, row);
            surface.draw_text(
                &option.label(),
                frame.x + PADDING,
                rect.y + row_height / 2,
                HAlign::Left,
                VAlign::Middle,
            );
        }
    }

    fn handle_button_press(&mut self, button: Button) -> bool {
        match button {
            Button::Up => {
                self.selected = clamp_index(self.selected as isize - 1, self.options.len());
            }
            Button::Down => {
                self.selected = clamp_index(self.selected as isize + 1, self.options.len());
            }
            Button::Accept => self.accept(),
            Button::Cancel | Button::Menu => self.dismissed = true,
            _ => {}
        }
        true
    }

    fn handle_touch(&mut self, touch: &TouchState) -> bool {
        if !touch.pressed {
            return true;
        }

        let Some((frame, row_height)) = self.painted.get() else {
            self.dismissed = true;
            return true;
        };

        if !frame.contains(touch.x, touch.y) {
            self.dismissed = true;
            return true;
        }
        let row = (touch.y - frame.y - PADDING) / row_height;
        if row >= 0 && (row as usize) < self.options.len() {
            self.selected = row as usize;
            self.accept();
        }
        true
    }

    fn is_dismissed(&self) -> bool {
        self.dismissed
    }
}
