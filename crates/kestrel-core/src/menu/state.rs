use compact_str::CompactString;
use smallvec::SmallVec;
use tracing::debug;

use crate::error::{MenuError, Result};
use crate::menu::animation::{SectionScroller, SECTION_UNIT};
use crate::menu::entry::Entry;
use crate::menu::grid;
use crate::menu::registry::Registry;

/// Selection and layout over a `Registry`.
///
/// Holds `(section, link, first_row)` and the header scroller. With no
/// sections, or an empty section, navigation does nothing.
#[derive(Debug)]
pub struct Menu {
    registry: Registry,
    columns: usize,
    rows: usize,
    section: usize,
    link: usize,
    first_row: usize,
    scroller: SectionScroller,
}

impl Menu {
    pub fn new(registry: Registry, columns: usize, rows: usize) -> Self {
        Self {
            registry,
            columns: columns.max(1),
            rows: rows.max(1),
            section: 0,
            link: 0,
            first_row: 0,
            scroller: SectionScroller::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Direct registry access. Call `revalidate` after structural changes.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn set_layout(&mut self, columns: usize, rows: usize) {
        self.columns = columns.max(1);
        self.rows = rows.max(1);
        self.revalidate();
    }

    pub fn scroller(&self) -> &SectionScroller {
        &self.scroller
    }

    // =========== Selection ===========

    pub fn selected_section_index(&self) -> usize {
        self.section
    }

    pub fn selected_entry_index(&self) -> usize {
        self.link
    }

    pub fn first_displayed_row(&self) -> usize {
        self.first_row
    }

    pub fn selected_section_name(&self) -> Option<&str> {
        self.registry.section_name(self.section)
    }

    pub fn selected_entries(&self) -> &[Entry] {
        self.registry.entries_of(self.section).unwrap_or(&[])
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.selected_entries().get(self.link)
    }

    /// Select a section, wrapping out-of-range indices, and go back to its first link
    pub fn set_section_index(&mut self, index: isize) {
        if self.registry.is_empty() {
            return;
        }
        self.section = grid::clamp_index(index, self.registry.len());
        self.link = 0;
        self.first_row = 0;
    }

    /// Select a link in the current section, wrapping out-of-range indices
    pub fn set_link_index(&mut self, index: isize) {
        let count = self.selected_entries().len();
        if count == 0 {
            self.link = 0;
            self.first_row = 0;
            return;
        }
        self.link = grid::clamp_index(index, count);
        self.update_first_row();
    }

    fn update_first_row(&mut self) {
        let count = self.selected_entries().len();
        self.first_row = if count == 0 {
            0
        } else {
            grid::recalc_first_displayed_row(self.link, count, self.columns, self.rows, self.first_row)
        };
    }

    fn navigate(&mut self, step: fn(usize, usize, usize) -> usize) -> bool {
        let count = self.selected_entries().len();
        if count == 0 {
            return false;
        }
        let next = step(self.link, count, self.columns);
        let moved = next != self.link;
        self.link = next;
        self.update_first_row();
        moved
    }

    pub fn link_left(&mut self) -> bool {
        self.navigate(grid::index_left)
    }

    pub fn link_right(&mut self) -> bool {
        self.navigate(grid::index_right)
    }

    pub fn link_up(&mut self) -> bool {
        self.navigate(grid::index_up)
    }

    pub fn link_down(&mut self) -> bool {
        self.navigate(grid::index_down)
    }

    /// Previous section; the header strip eases in from the left
    pub fn section_left(&mut self) {
        if self.registry.is_empty() {
            return;
        }
        self.set_section_index(self.section as isize - 1);
        self.scroller.adjust(-SECTION_UNIT);
    }

    /// Next section; the header strip eases in from the right
    pub fn section_right(&mut self) {
        if self.registry.is_empty() {
            return;
        }
        self.set_section_index(self.section as isize + 1);
        self.scroller.adjust(SECTION_UNIT);
    }

    /// Jump straight to a section without animating
    pub fn jump_to_section(&mut self, index: usize) {
        self.set_section_index(index as isize);
        self.scroller.reset();
    }

    /// Step the header animation. Returns whether it is still running.
    pub fn run_animations(&mut self) -> bool {
        self.scroller.step()
    }

    /// Pull the selection back into range after the registry changed
    pub fn revalidate(&mut self) {
        if self.registry.is_empty() {
            self.section = 0;
            self.link = 0;
            self.first_row = 0;
            return;
        }
        if self.section >= self.registry.len() {
            self.section = 0;
            self.link = 0;
            self.first_row = 0;
        }
        let count = self.selected_entries().len();
        if self.link >= count {
            self.link = count.saturating_sub(1);
        }
        self.update_first_row();
    }

    // =========== Structure ===========

    pub fn add_section(&mut self, name: &str) -> Result<usize> {
        self.registry.add_section(name)
    }

    pub fn rename_section(&mut self, index: usize, new_name: &str) -> Result<()> {
        self.registry.rename_section(index, new_name)
    }

    /// Delete a section; the selection goes back to the first section
    pub fn delete_section(&mut self, index: usize) -> Result<()> {
        self.registry.delete_section(index)?;
        self.section = 0;
        self.link = 0;
        self.first_row = 0;
        Ok(())
    }

    pub fn delete_selected_section(&mut self) -> Result<()> {
        if self.registry.is_empty() {
            return Err(MenuError::NoSuchSection(self.section));
        }
        self.delete_section(self.section)
    }

    pub fn add_entry(&mut self, section: usize, entry: Entry) -> Result<usize> {
        self.registry.add_entry(section, entry)
    }

    /// Move an entry and select it at its new position
    pub fn move_entry(&mut self, entry_index: usize, from: usize, to: usize) -> Result<()> {
        let index = self.registry.move_entry(entry_index, from, to)?;
        self.section = to;
        self.first_row = 0;
        self.set_link_index(index as isize);
        debug!("Selection re-anchored to section {} link {}", to, index);
        Ok(())
    }

    pub fn move_selected_entry(&mut self, to: usize) -> Result<()> {
        self.move_entry(self.link, self.section, to)
    }

    /// Delete the selected entry, keeping the selection and window in range
    pub fn delete_selected_entry(&mut self) -> Result<Entry> {
        let entry = self.registry.delete_entry(self.section, self.link)?;
        self.revalidate();
        Ok(entry)
    }

    pub fn order_entries(&mut self) {
        self.registry.order_entries();
        self.update_first_row();
    }

    /// Re-read storage. Storage may order sections differently from memory,
    /// so the selection follows the section name and the entry's link file
    /// (or title) rather than the bare indices.
    pub fn reload(&mut self) -> Result<()> {
        let section = self.selected_section_name().map(CompactString::from);
        let entry = self.selected_entry().map(|e| {
            let file = e.as_application().and_then(|a| a.file.clone());
            (e.title.clone(), file)
        });

        self.registry.reload()?;

        if let Some(index) = section.and_then(|name| self.registry.section_index(&name)) {
            if index != self.section {
                self.section = index;
                self.first_row = 0;
            }
            let found = entry.and_then(|(title, file)| {
                self.selected_entries().iter().position(|e| match &file {
                    Some(file) => e.as_application().and_then(|a| a.file.as_ref()) == Some(file),
                    None => e.title == title,
                })
            });
            if let Some(link) = found {
                self.link = link;
            }
        }

        self.revalidate();
        debug!("Selection after reload: section {} link {}", self.section, self.link);
        Ok(())
    }

    pub fn take_evicted_icons(&mut self) -> SmallVec<[CompactString; 4]> {
        self.registry.take_evicted_icons()
    }
}
