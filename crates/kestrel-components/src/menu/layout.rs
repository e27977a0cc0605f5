use std::ops::RangeInclusive;

use kestrel_core::menu::cubic_ease;
use kestrel_core::SkinConfig;

use crate::common::Rect;

/// Icon size inside link and section cells
pub const ICON_SIZE: u32 = 32;

/// Screen geometry of the menu for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub width: i32,
    pub height: i32,
    pub columns: usize,
    pub rows: usize,
    pub link_width: i32,
    pub link_height: i32,
    pub spacing_x: i32,
    pub spacing_y: i32,
    pub margin_x: i32,
    pub top_bar: i32,
    pub bottom_bar: i32,
}

impl GridLayout {
    /// Spread `columns` evenly over the width and `rows` over the content area
    pub fn new(width: u32, height: u32, skin: &SkinConfig, columns: usize, rows: usize) -> Self {
        let width = width as i32;
        let height = height as i32;
        let columns = columns.max(1);
        let rows = rows.max(1);
        let cols = columns as i32;
        let link_width = skin.link_width as i32;
        let link_height = skin.link_height as i32;
        let top_bar = skin.top_bar_height as i32;
        let bottom_bar = skin.bottom_bar_height as i32;

        let spacing_x = ((width - 10 - cols * link_width) / cols).max(0);
        let margin_x = (width - link_width * cols - spacing_x * (cols - 1)) / 2;
        let spacing_y =
            ((height - bottom_bar - 15 - top_bar - rows as i32 * link_height) / rows as i32).max(0);

        Self {
            width,
            height,
            columns,
            rows,
            link_width,
            link_height,
            spacing_x,
            spacing_y,
            margin_x,
            top_bar,
            bottom_bar,
        }
    }

    /// Cell of entry `index` when the window starts at `first_row`
    pub fn link_rect(&self, index: usize, first_row: usize) -> Option<Rect> {
        let first = first_row * self.columns;
        if index < first || index >= first + self.columns * self.rows {
            return None;
        }

        let visible = index - first;
        let col = (visible % self.columns) as i32;
        let row = (visible / self.columns) as i32;
        Some(Rect::new(
            self.margin_x + col * (self.link_width + self.spacing_x),
            row * (self.link_height + self.spacing_y) + self.top_bar + 2,
            self.link_width as u32,
            self.link_height as u32,
        ))
    }

    /// Entry indices inside the window starting at `first_row`
    pub fn visible_links(&self, count: usize, first_row: usize) -> std::ops::Range<usize> {
        let first = (first_row * self.columns).min(count);
        first..(first + self.columns * self.rows).min(count)
    }

    /// Vertical extent of the area between the bars
    pub fn content_area(&self) -> (i32, i32) {
        (self.top_bar, self.height - self.top_bar - self.bottom_bar)
    }

    fn header_reach(&self) -> i32 {
        self.columns as i32 / 2 + 1
    }

    /// Whole columns and leftover pixels of a strip displacement
    fn split_offset(&self, offset: i32) -> (i32, i32) {
        let w = self.link_width.max(1);
        (offset / w, offset % w)
    }

    /// Header slots relative to the selected section for a strip displaced
    /// by `offset` pixels. Slot 0 is the selected section. The range covers
    /// every column on screen and never names a section twice.
    pub fn section_slots(&self, count: usize, offset: i32) -> RangeInclusive<i32> {
        if count == 0 {
            return 1..=0;
        }
        let (delta, _) = self.split_offset(offset);
        let reach = self.header_reach();
        let center = -delta;

        let left = ((count - 1) / 2) as i32;
        let right = (count - 1) as i32 - left;
        (center - left.min(reach))..=(center + right.min(reach))
    }

    /// Horizontal centre of header slot `slot` for a strip displaced by `offset` pixels
    pub fn section_center_x(&self, slot: i32, offset: i32) -> i32 {
        let w = self.link_width.max(1);
        let (delta, sub) = self.split_offset(offset);
        let sub = if (slot + delta).abs() == self.header_reach() {
            cubic_ease(sub, w)
        } else {
            sub
        };
        self.width / 2 + (slot + delta) * w + sub
    }

    /// Header cell of slot `slot`
    pub fn section_rect(&self, slot: i32, offset: i32) -> Rect {
        let x = self.section_center_x(slot, offset) - self.link_width / 2;
        Rect::new(x, 0, self.link_width as u32, self.top_bar as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn layout(columns: usize, rows: usize) -> GridLayout {
        GridLayout::new(320, 240, &SkinConfig::default(), columns, rows)
    }

    #[test]
    fn test_columns_are_evenly_spread() {
        let layout = layout(3, 2);
        // (320 - 10 - 240) / 3 = 23; (320 - 240 - 46) / 2 = 17
        assert_eq!(layout.spacing_x, 23);
        assert_eq!(layout.margin_x, 17);

        let first = layout.link_rect(0, 0).unwrap();
        let last = layout.link_rect(2, 0).unwrap();
        assert_eq!(first.x, 17);
        assert_eq!(320 - (last.x + last.w as i32), first.x);
        assert_eq!(first.y, 52);
    }

    #[test]
    fn test_link_rect_respects_window() {
        let layout = layout(4, 2);
        assert!(layout.link_rect(3, 1).is_none());
        assert!(layout.link_rect(12, 1).is_none());
        assert_eq!(layout.link_rect(4, 1), layout.link_rect(0, 0));
        assert_eq!(layout.visible_links(10, 1), 4..10);
    }

    #[test]
    fn test_section_slots_never_repeat_sections() {
        let layout = layout(4, 4);
        assert_eq!(layout.section_slots(0, 0).count(), 0);
        assert_eq!(layout.section_slots(1, 0), 0..=0);
        assert_eq!(layout.section_slots(2, 0), 0..=1);
        assert_eq!(layout.section_slots(5, 0), -2..=2);
        // Reach is columns / 2 + 1
        assert_eq!(layout.section_slots(20, 0), -3..=3);
    }

    #[test]
    fn test_section_slots_follow_stacked_offset() {
        let layout = layout(4, 4);
        // Three columns to the right: the on-screen columns are slots -6..=0
        assert_eq!(layout.section_slots(10, 240), -6..=0);
        assert_eq!(layout.section_slots(10, -240), 0..=6);
        // Part of a column does not shift the range
        assert_eq!(layout.section_slots(10, 79), -3..=3);
        // Few sections: still each at most once
        assert_eq!(layout.section_slots(5, 240).count(), 5);
    }

    #[test]
    fn test_section_center_follows_offset() {
        let layout = layout(4, 4);
        assert_eq!(layout.section_center_x(0, 0), 160);
        assert_eq!(layout.section_center_x(1, 0), 240);
        assert_eq!(layout.section_center_x(0, 80), 240);
        assert_eq!(layout.section_center_x(0, 40), 200);
        // Edge slots ease cubically: 40^3 / 80^2 = 10
        assert_eq!(layout.section_center_x(3, 40), 160 + 240 + 10);
    }

    fn overlaps(a: Rect, b: Rect) -> bool {
        a.x < b.x + b.w as i32 && b.x < a.x + a.w as i32 && a.y < b.y + b.h as i32 && b.y < a.y + a.h as i32
    }

    proptest! {
        #[test]
        fn visible_cells_fit_and_never_overlap(
            columns in 1usize..=4,
            rows in 1usize..=3,
            count in 0usize..40,
            first_row in 0usize..10,
        ) {
            let layout = layout(columns, rows);
            let cells: Vec<Rect> = layout
                .visible_links(count, first_row)
                .filter_map(|i| layout.link_rect(i, first_row))
                .collect();

            prop_assert!(cells.len() <= columns * rows);
            for (i, a) in cells.iter().enumerate() {
                prop_assert!(a.x >= 0 && a.x + a.w as i32 <= layout.width);
                prop_assert!(a.y > layout.top_bar);
                for b in &cells[i + 1..] {
                    prop_assert!(!overlaps(*a, *b));
                }
            }
        }
    }
}
