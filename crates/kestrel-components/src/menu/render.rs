use kestrel_core::menu::grid::row_count;
use kestrel_core::{Menu, SkinConfig};

use super::layout::{GridLayout, ICON_SIZE};
use crate::common::{HAlign, Rect, Surface, VAlign};

/// Draw the whole menu: bars, section strip, link grid, scrollbar and footer
pub fn paint_menu(
    menu: &Menu,
    layout: &GridLayout,
    skin: &SkinConfig,
    clock: &str,
    surface: &mut dyn Surface,
) {
    let width = layout.width as u32;
    surface.fill_rect(Rect::new(0, 0, width, layout.top_bar as u32), skin.top_bar_bg);
    surface.fill_rect(
        Rect::new(0, layout.height - layout.bottom_bar, width, layout.bottom_bar as u32),
        skin.bottom_bar_bg,
    );

    paint_sections(menu, layout, skin, surface);
    paint_links(menu, layout, skin, surface);
    paint_scrollbar(menu, layout, skin, surface);
    paint_footer(menu, layout, clock, surface);
}

fn paint_highlight(rect: Rect, skin: &SkinConfig, surface: &mut dyn Surface) {
    surface.fill_rect(rect, skin.selection_bg);
    surface.stroke_rect(rect, skin.message_box_border);
}

/// Header strip centred on the selected section
fn paint_sections(menu: &Menu, layout: &GridLayout, skin: &SkinConfig, surface: &mut dyn Surface) {
    let registry = menu.registry();
    let count = registry.len();
    if count == 0 {
        return;
    }

    // The highlight stays put while the strip eases into it
    let selected = layout.section_rect(0, 0);
    paint_highlight(selected, skin, surface);

    let offset = menu.scroller().pixel_offset(layout.link_width as u32);
    let padding = (layout.top_bar - ICON_SIZE as i32 - surface.text_height() as i32).max(0) / 3;

    for slot in layout.section_slots(count, offset) {
        let rect = layout.section_rect(slot, offset);
        if rect.x + rect.w as i32 <= 0 || rect.x >= layout.width {
            continue;
        }

        let index = (menu.selected_section_index() as i64 + i64::from(slot)).rem_euclid(count as i64);
        let Some(name) = registry.section_name(index as usize) else {
            continue;
        };

        let center = rect.x + layout.link_width / 2;
        surface.draw_image(
            &format!("sections/{}.png", name),
            center - ICON_SIZE as i32 / 2,
            padding,
            ICON_SIZE,
            ICON_SIZE,
            255,
        );
        surface.draw_text(name, center, layout.top_bar - padding, HAlign::Center, VAlign::Bottom);
    }
}

/// Entries of the current page, row-major
fn paint_links(menu: &Menu, layout: &GridLayout, skin: &SkinConfig, surface: &mut dyn Surface) {
    let entries = menu.selected_entries();
    let first_row = menu.first_displayed_row();

    for index in layout.visible_links(entries.len(), first_row) {
        let Some(rect) = layout.link_rect(index, first_row) else {
            continue;
        };
        let entry = &entries[index];

        if index == menu.selected_entry_index() {
            paint_highlight(rect, skin, surface);
        }

        let center = rect.x + rect.w as i32 / 2;
        if entry.has_icon() {
            surface.draw_image(
                &entry.icon,
                center - ICON_SIZE as i32 / 2,
                rect.y + 2,
                ICON_SIZE,
                ICON_SIZE,
                255,
            );
        }
        surface.draw_text(
            &entry.title,
            center,
            rect.y + rect.h as i32,
            HAlign::Center,
            VAlign::Bottom,
        );
    }
}

/// Bar proportional to the visible share of rows, placed by the first visible row
fn paint_scrollbar(menu: &Menu, layout: &GridLayout, skin: &SkinConfig, surface: &mut dyn Surface) {
    let total = row_count(menu.selected_entries().len(), layout.columns) as i32;
    let page = layout.rows as i32;
    if total <= page {
        return;
    }

    let (top, height) = layout.content_area();
    let mut top = top + 1;
    let mut height = height - 2;
    if height <= 4 {
        return;
    }

    surface.stroke_rect(
        Rect::new(layout.width - 8, top, 7, height as u32),
        skin.selection_bg,
    );
    top += 2;
    height -= 4;

    let bar_size = height * page / total;
    let bar_pos = (height - bar_size) * menu.first_displayed_row() as i32 / (total - page);
    surface.fill_rect(
        Rect::new(layout.width - 6, top + bar_pos, 3, bar_size as u32),
        skin.selection_bg,
    );
}

fn paint_footer(menu: &Menu, layout: &GridLayout, clock: &str, surface: &mut dyn Surface) {
    let y = layout.height - layout.bottom_bar / 2;

    if let Some(entry) = menu.selected_entry() {
        if !entry.description.is_empty() {
            surface.draw_text(&entry.description, layout.width / 2, y, HAlign::Center, VAlign::Middle);
        }
    }
    if !clock.is_empty() {
        surface.draw_text(clock, layout.width - 4, y, HAlign::Right, VAlign::Middle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{DrawCall, RecordingSurface};
    use kestrel_core::{ApplicationEntry, Entry, MemoryStore, Registry};

    fn menu_with(sections: &[(&str, usize)], columns: usize, rows: usize) -> Menu {
        let mut registry = Registry::new(Box::new(MemoryStore::new()));
        for (name, count) in sections {
            let index = registry.add_section(name).unwrap();
            for i in 0..*count {
                let entry = Entry::application(
                    &format!("{}{}", name, i),
                    &format!("about {}{}", name, i),
                    if i == 0 { "icons/first.png" } else { "" },
                    ApplicationEntry::new("sh"),
                );
                registry.add_entry(index, entry).unwrap();
            }
        }
        Menu::new(registry, columns, rows)
    }

    fn paint(menu: &Menu) -> RecordingSurface {
        let skin = SkinConfig::default();
        let layout = GridLayout::new(320, 240, &skin, menu.columns(), menu.rows());
        let mut surface = RecordingSurface::new(320, 240);
        paint_menu(menu, &layout, &skin, "12:30", &mut surface);
        surface
    }

    #[test]
    fn test_selected_section_is_centred() {
        let mut menu = menu_with(&[("a", 1), ("b", 1), ("c", 1)], 4, 4);
        menu.set_section_index(1);
        let surface = paint(&menu);

        let (x, _) = surface.text_position("b").unwrap();
        assert_eq!(x, 160);
        assert_eq!(surface.text_position("a").unwrap().0, 80);
        assert_eq!(surface.text_position("c").unwrap().0, 240);
        // Highlight box behind the centred header
        assert_eq!(surface.strokes()[0], Rect::new(120, 0, 80, 50));
    }

    #[test]
    fn test_strip_offset_while_animating() {
        let mut menu = menu_with(&[("a", 1), ("b", 1), ("c", 1)], 4, 4);
        menu.section_right();
        let surface = paint(&menu);

        // The new section starts where it was before the press
        assert_eq!(surface.text_position("b").unwrap().0, 240);
    }

    #[test]
    fn test_stacked_section_changes_keep_strip_filled() {
        let names: Vec<String> = (0..10).map(|i| format!("s{}", i)).collect();
        let sections: Vec<(&str, usize)> = names.iter().map(|n| (n.as_str(), 1)).collect();
        let mut menu = menu_with(&sections, 4, 4);
        for _ in 0..3 {
            menu.section_right();
        }
        assert_eq!(menu.selected_section_index(), 3);

        // The strip still shows where the presses started and slides left
        let surface = paint(&menu);
        assert_eq!(surface.text_position("s8").unwrap().0, 0);
        assert_eq!(surface.text_position("s9").unwrap().0, 80);
        assert_eq!(surface.text_position("s0").unwrap().0, 160);
        assert_eq!(surface.text_position("s1").unwrap().0, 240);
        assert_eq!(surface.text_position("s2").unwrap().0, 320);
        assert!(surface.text_position("s3").is_none());

        while menu.run_animations() {}
        let surface = paint(&menu);
        assert_eq!(surface.text_position("s3").unwrap().0, 160);
        assert_eq!(surface.text_position("s1").unwrap().0, 0);
        assert_eq!(surface.text_position("s5").unwrap().0, 320);
    }

    #[test]
    fn test_only_current_page_is_drawn() {
        let mut menu = menu_with(&[("a", 20)], 4, 2);
        menu.set_link_index(12);
        let surface = paint(&menu);
        let texts = surface.texts();

        // Row 3 of 5 with two visible rows: the window shows rows 3 and 4
        assert_eq!(menu.first_displayed_row(), 3);
        assert!(texts.contains(&"a12"));
        assert!(texts.contains(&"a19"));
        assert!(!texts.contains(&"a11"));
        assert!(texts.contains(&"about a12"));
        assert!(texts.contains(&"12:30"));
    }

    #[test]
    fn test_icons_drawn_for_entries_that_have_one() {
        let menu = menu_with(&[("a", 3)], 4, 2);
        let surface = paint(&menu);
        let icons: Vec<_> = surface
            .calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Image { path, .. } => Some(path.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(icons, ["sections/a.png", "icons/first.png"]);
    }

    #[test]
    fn test_scrollbar_only_when_rows_overflow() {
        let menu = menu_with(&[("a", 8)], 4, 2);
        assert!(!paint(&menu)
            .strokes()
            .iter()
            .any(|r| r.x == 320 - 8));

        let mut menu = menu_with(&[("a", 16)], 4, 2);
        menu.set_link_index(15);
        let surface = paint(&menu);
        let track = surface.strokes().into_iter().find(|r| r.x == 312).unwrap();
        // content area 240 - 50 - 20 = 170, minus 2
        assert_eq!(track, Rect::new(312, 51, 7, 168));

        // 4 rows, 2 visible, window at row 2: bar at the bottom of the track
        let bar = surface.fills().into_iter().find(|r| r.x == 314).unwrap();
        assert_eq!(bar.h, 164 * 2 / 4);
        assert_eq!(bar.y, 53 + (164 - 82));
    }
}
