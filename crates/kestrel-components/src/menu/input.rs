use tracing::debug;

use kestrel_core::{Button, Menu, ShellCommand, TouchState};

use super::layout::GridLayout;
use crate::common::LayerContext;

/// Route a button press to the menu. Returns whether it was consumed.
pub fn handle_button(menu: &mut Menu, button: Button, ctx: &LayerContext) -> bool {
    match button {
        Button::Up => {
            menu.link_up();
        }
        Button::Down => {
            menu.link_down();
        }
        Button::Left => {
            menu.link_left();
        }
        Button::Right => {
            menu.link_right();
        }
        Button::AltLeft => menu.section_left(),
        Button::AltRight => menu.section_right(),
        Button::Accept => {
            let Some(entry) = menu.selected_entry() else {
                return false;
            };
            entry.run(&ctx.commands);
        }
        Button::Menu => ctx.send_command(ShellCommand::OpenContextMenu),
        Button::Settings => ctx.send_command(ShellCommand::ShowSettings),
        Button::Repaint => {}
        Button::Cancel => return false,
    }
    true
}

/// Route a touch to the header strip or the link grid
pub fn handle_touch(
    menu: &mut Menu,
    touch: &TouchState,
    layout: &GridLayout,
    ctx: &LayerContext,
) -> bool {
    if !touch.pressed {
        return false;
    }

    if touch.y < layout.top_bar {
        return touch_header(menu, touch, layout);
    }

    let first_row = menu.first_displayed_row();
    for index in layout.visible_links(menu.selected_entries().len(), first_row) {
        let Some(rect) = layout.link_rect(index, first_row) else {
            continue;
        };
        if !rect.contains(touch.x, touch.y) {
            continue;
        }

        if index == menu.selected_entry_index() {
            if let Some(entry) = menu.selected_entry() {
                entry.run(&ctx.commands);
            }
        } else {
            menu.set_link_index(index as isize);
        }
        return true;
    }

    false
}

/// Map a tap on the strip back to the section drawn under it and jump there
fn touch_header(menu: &mut Menu, touch: &TouchState, layout: &GridLayout) -> bool {
    let count = menu.registry().len();
    let offset = menu.scroller().pixel_offset(layout.link_width as u32);

    for slot in layout.section_slots(count, offset) {
        if !layout.section_rect(slot, offset).contains(touch.x, touch.y) {
            continue;
        }

        let index = (menu.selected_section_index() as i64 + i64::from(slot)).rem_euclid(count as i64);
        debug!("Header tap on slot {} selects section {}", slot, index);
        menu.jump_to_section(index as usize);
        return true;
    }

    false
}
