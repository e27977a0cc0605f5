use compact_str::CompactString;
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::error::{MenuError, Result};
use crate::menu::entry::Entry;
use crate::menu::icons::IconCache;
use crate::menu::store::SectionStore;

/// A named, ordered group of entries
#[derive(Debug)]
pub struct Section {
    pub name: CompactString,
    pub entries: Vec<Entry>,
}

impl Section {
    fn new(name: CompactString) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }
}

/// Owns sections and their entries and keeps them in step with storage.
///
/// Structural operations touch the store first and only then apply the
/// in-memory change, so a failed call leaves both sides as they were.
pub struct Registry {
    sections: Vec<Section>,
    store: Box<dyn SectionStore>,
    icons: IconCache,
}

impl Registry {
    /// Empty registry backed by `store`
    pub fn new(store: Box<dyn SectionStore>) -> Self {
        Self {
            sections: Vec::new(),
            store,
            icons: IconCache::new(),
        }
    }

    /// Registry filled with everything `store` holds
    pub fn load(store: Box<dyn SectionStore>) -> Result<Self> {
        let mut registry = Self::new(store);
        registry.reload()?;
        Ok(registry)
    }

    /// Re-read storage. Action entries are not persisted, so they are
    /// carried over into their sections by name.
    pub fn reload(&mut self) -> Result<()> {
        let stored = self.store.load()?;

        let mut actions: Vec<(CompactString, Entry)> = Vec::new();
        for section in &mut self.sections {
            for entry in section.entries.drain(..) {
                if !entry.is_application() {
                    actions.push((section.name.clone(), entry));
                }
            }
        }

        self.icons.clear();
        self.sections = stored
            .into_iter()
            .map(|s| Section {
                name: s.name,
                entries: s.entries,
            })
            .collect();

        for (name, entry) in actions {
            let index = match self.section_index(&name) {
                Some(index) => index,
                None => {
                    self.sections.push(Section::new(name));
                    self.sections.len() - 1
                }
            };
            self.sections[index].entries.push(entry);
        }

        for section in &self.sections {
            for entry in &section.entries {
                self.icons.acquire(&entry.icon);
            }
        }

        info!("Registry holds {} sections", self.sections.len());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_name(&self, index: usize) -> Option<&str> {
        self.sections.get(index).map(|s| s.name.as_str())
    }

    pub fn section_index(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.name == name)
    }

    /// Entries of a section
    pub fn entries_of(&self, section: usize) -> Option<&[Entry]> {
        self.sections.get(section).map(|s| s.entries.as_slice())
    }

    /// Live backing sequence of a section. Changes made through it bypass
    /// storage and icon bookkeeping.
    pub fn entries_of_mut(&mut self, section: usize) -> Option<&mut Vec<Entry>> {
        self.sections.get_mut(section).map(|s| &mut s.entries)
    }

    pub fn entry_count(&self, section: usize) -> usize {
        self.sections.get(section).map_or(0, |s| s.entries.len())
    }

    pub fn icons(&self) -> &IconCache {
        &self.icons
    }

    /// Icon paths no entry references any more, for the surface cache to free
    pub fn take_evicted_icons(&mut self) -> SmallVec<[CompactString; 4]> {
        self.icons.take_evicted()
    }

    /// Append a new empty section, returning its index
    pub fn add_section(&mut self, name: &str) -> Result<usize> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MenuError::EmptyName);
        }
        if self.section_index(name).is_some() {
            return Err(MenuError::DuplicateSection(name.into()));
        }

        self.store.create_section(name)?;
        self.sections.push(Section::new(name.into()));
        info!("Added section '{}'", name);
        Ok(self.sections.len() - 1)
    }

    /// Index of `name`, creating the section when missing
    pub fn ensure_section(&mut self, name: &str) -> Result<usize> {
        match self.section_index(name) {
            Some(index) => Ok(index),
            None => self.add_section(name),
        }
    }

    /// Relabel a section in place. Uniqueness is the caller's concern.
    pub fn rename_section(&mut self, index: usize, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(MenuError::EmptyName);
        }
        let section = self
            .sections
            .get_mut(index)
            .ok_or(MenuError::NoSuchSection(index))?;

        let moved = self.store.rename_section(&section.name, new_name)?;

        if let Some(moved) = moved {
            for app in section.entries.iter_mut().filter_map(Entry::as_application_mut) {
                let Some(file) = app.file.as_mut() else {
                    continue;
                };
                if let Ok(rest) = file.strip_prefix(&moved.from) {
                    *file = moved.to.join(rest);
                }
            }
        }

        info!("Renamed section '{}' to '{}'", section.name, new_name);
        section.name = new_name.into();
        Ok(())
    }

    /// Remove a section and everything in it
    pub fn delete_section(&mut self, index: usize) -> Result<Section> {
        let name = self
            .sections
            .get(index)
            .map(|s| s.name.clone())
            .ok_or(MenuError::NoSuchSection(index))?;

        self.store.remove_section(&name)?;

        let section = self.sections.remove(index);
        for entry in &section.entries {
            self.icons.release(&entry.icon);
        }
        info!("Deleted section '{}' with {} entries", name, section.entries.len());
        Ok(section)
    }

    /// Append an entry to a section, returning its index. Application
    /// entries without a backing file are persisted first.
    pub fn add_entry(&mut self, section: usize, mut entry: Entry) -> Result<usize> {
        let name = self
            .sections
            .get(section)
            .map(|s| s.name.clone())
            .ok_or(MenuError::NoSuchSection(section))?;

        let link = entry.to_link_file();
        if let (Some(link), Some(app)) = (link, entry.as_application_mut()) {
            if app.file.is_none() {
                app.file = Some(self.store.save_entry(&name, &link)?);
            }
        }

        self.icons.acquire(&entry.icon);
        debug!("Added '{}' to section '{}'", entry.title, name);

        let entries = &mut self.sections[section].entries;
        entries.push(entry);
        Ok(entries.len() - 1)
    }

    /// Move an entry to the end of another section, returning its new index
    pub fn move_entry(&mut self, entry_index: usize, from: usize, to: usize) -> Result<usize> {
        if to >= self.sections.len() {
            return Err(MenuError::NoSuchSection(to));
        }
        let source = self.sections.get(from).ok_or(MenuError::NoSuchSection(from))?;
        let entry = source.entries.get(entry_index).ok_or(MenuError::NoSuchEntry {
            section: from,
            index: entry_index,
        })?;

        let file = entry.as_application().and_then(|a| a.file.clone());
        let new_file = match file {
            Some(file) if from != to => {
                Some(self.store.move_entry(&file, &self.sections[to].name)?)
            }
            _ => None,
        };

        let mut entry = self.sections[from].entries.remove(entry_index);
        if let (Some(new_file), Some(app)) = (new_file, entry.as_application_mut()) {
            app.file = Some(new_file);
        }

        info!(
            "Moved '{}' from '{}' to '{}'",
            entry.title, self.sections[from].name, self.sections[to].name
        );
        let entries = &mut self.sections[to].entries;
        entries.push(entry);
        Ok(entries.len() - 1)
    }

    /// Remove an entry, releasing its icon once nothing else uses it
    pub fn delete_entry(&mut self, section: usize, index: usize) -> Result<Entry> {
        let entry = self
            .sections
            .get(section)
            .ok_or(MenuError::NoSuchSection(section))?
            .entries
            .get(index)
            .ok_or(MenuError::NoSuchEntry { section, index })?;

        if let Some(file) = entry.as_application().and_then(|a| a.file.as_deref()) {
            self.store.remove_entry(file)?;
        }

        let entry = self.sections[section].entries.remove(index);
        if self.icons.release(&entry.icon) {
            debug!("Released icon {}", entry.icon);
        }
        info!("Deleted '{}'", entry.title);
        Ok(entry)
    }

    /// Stable sort of every section by title, ordinal and case-sensitive
    pub fn order_entries(&mut self) {
        for section in &mut self.sections {
            section.entries.sort_by(|a, b| a.title.as_str().cmp(b.title.as_str()));
        }
        debug!("Sorted entries of {} sections", self.sections.len());
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("sections", &self.sections)
            .field("icons", &self.icons)
            .finish_non_exhaustive()
    }
}

/// Log and discard a registry failure where the caller only needs the boolean
pub fn report(result: Result<impl Sized>, what: &str) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            warn!("{} failed: {}", what, e);
            false
        }
    }
}
