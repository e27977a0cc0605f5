use ahash::AHashSet;
use compact_str::CompactString;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{MenuError, Result};
use crate::menu::entry::{Entry, LinkFile};

/// A section as read from storage
#[derive(Debug)]
pub struct StoredSection {
    pub name: CompactString,
    pub entries: Vec<Entry>,
}

/// A directory that moved during a section rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirMove {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Persistence for sections and application links.
///
/// Every method either applies its change completely or returns an error
/// without touching storage, so the registry can keep memory and disk in step.
pub trait SectionStore: Send {
    /// Read every section with its application entries
    fn load(&self) -> Result<Vec<StoredSection>>;

    /// Create storage for a new section; fails if it already exists
    fn create_section(&mut self, name: &str) -> Result<()>;

    /// Rename a section's storage, reporting the directory move if any
    fn rename_section(&mut self, old: &str, new: &str) -> Result<Option<DirMove>>;

    /// Remove a section's storage and every link in it
    fn remove_section(&mut self, name: &str) -> Result<()>;

    /// Persist a new link in a section, returning its file
    fn save_entry(&mut self, section: &str, link: &LinkFile) -> Result<PathBuf>;

    /// Move a link file into another section, returning its new file
    fn move_entry(&mut self, file: &Path, to_section: &str) -> Result<PathBuf>;

    /// Delete a link file
    fn remove_entry(&mut self, file: &Path) -> Result<()>;
}

/// Sections as directories, links as JSON files inside them.
///
/// The system root is read-only; all writes go below the user root.
pub struct DirectoryStore {
    user_root: PathBuf,
    system_root: Option<PathBuf>,
}

impl DirectoryStore {
    pub fn new(user_root: impl Into<PathBuf>, system_root: Option<PathBuf>) -> Self {
        Self {
            user_root: user_root.into(),
            system_root,
        }
    }

    pub fn user_root(&self) -> &Path {
        &self.user_root
    }

    fn roots(&self) -> impl Iterator<Item = &PathBuf> {
        self.system_root.iter().chain(std::iter::once(&self.user_root))
    }

    fn section_names(&self) -> Vec<CompactString> {
        let mut names: Vec<CompactString> = Vec::new();

        for root in self.roots() {
            let Ok(dir) = std::fs::read_dir(root) else {
                continue;
            };

            for entry in dir.flatten() {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                let name = entry.file_name().to_string_lossy().to_string();
                if !is_dir || name.starts_with('.') {
                    continue;
                }
                if !names.iter().any(|n| n == name.as_str()) {
                    names.push(name.into());
                }
            }
        }

        names.sort_by_key(|n| n.to_lowercase());
        names
    }

    fn link_files(&self, section: &str) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for root in self.roots() {
            let Ok(dir) = std::fs::read_dir(root.join(section)) else {
                continue;
            };
            for entry in dir.flatten() {
                if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                    files.push(entry.path());
                }
            }
        }

        files.sort_by_key(|p| p.to_string_lossy().to_lowercase());
        files
    }

    fn read_link(path: &Path) -> Result<LinkFile> {
        let data = std::fs::read(path)
            .map_err(|e| MenuError::storage(format!("reading {:?}", path), e))?;
        serde_json::from_slice(&data).map_err(|source| MenuError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_link(path: &Path, link: &LinkFile) -> Result<()> {
        let data = serde_json::to_vec_pretty(link).map_err(|source| MenuError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, data).map_err(|e| MenuError::storage(format!("writing {:?}", path), e))
    }

    /// First unused file name for `title` in `dir`: title, title2, title3, ...
    fn free_path(dir: &Path, title: &str) -> PathBuf {
        let stem: String = title
            .chars()
            .map(|c| if c == '/' || c == '\0' { '_' } else { c })
            .collect();
        let stem = if stem.trim().is_empty() { "link".to_string() } else { stem };

        let mut candidate = dir.join(&stem);
        let mut n = 2;
        while candidate.exists() {
            candidate = dir.join(format!("{}{}", stem, n));
            n += 1;
        }
        candidate
    }

    fn ensure_user_section(&self, section: &str) -> Result<PathBuf> {
        let dir = self.user_root.join(section);
        std::fs::create_dir_all(&dir)
            .map_err(|e| MenuError::storage(format!("creating {:?}", dir), e))?;
        Ok(dir)
    }
}

impl SectionStore for DirectoryStore {
    fn load(&self) -> Result<Vec<StoredSection>> {
        let mut sections = Vec::new();

        for name in self.section_names() {
            let mut entries = Vec::new();

            for file in self.link_files(&name) {
                match Self::read_link(&file) {
                    Ok(link) => {
                        let entry = Entry::from_link_file(link, file.clone());
                        let exists = entry.as_application().map(|a| a.target_exists()).unwrap_or(true);
                        if exists {
                            entries.push(entry);
                        } else {
                            debug!("Skipping link {:?}: target missing", file);
                        }
                    }
                    Err(e) => warn!("Skipping link: {}", e),
                }
            }

            sections.push(StoredSection { name, entries });
        }

        info!("Loaded {} sections from {:?}", sections.len(), self.user_root);
        Ok(sections)
    }

    fn create_section(&mut self, name: &str) -> Result<()> {
        std::fs::create_dir_all(&self.user_root)
            .map_err(|e| MenuError::storage(format!("creating {:?}", self.user_root), e))?;

        let dir = self.user_root.join(name);
        std::fs::create_dir(&dir).map_err(|e| MenuError::storage(format!("creating {:?}", dir), e))
    }

    fn rename_section(&mut self, old: &str, new: &str) -> Result<Option<DirMove>> {
        let from = self.user_root.join(old);
        let to = self.user_root.join(new);

        if to.exists() {
            return Err(MenuError::storage(
                format!("renaming {:?}", from),
                io::Error::new(io::ErrorKind::AlreadyExists, format!("{:?} exists", to)),
            ));
        }

        if from.is_dir() {
            std::fs::rename(&from, &to)
                .map_err(|e| MenuError::storage(format!("renaming {:?}", from), e))?;
            Ok(Some(DirMove { from, to }))
        } else {
            // Section only exists in the system root
            std::fs::create_dir_all(&to)
                .map_err(|e| MenuError::storage(format!("creating {:?}", to), e))?;
            Ok(None)
        }
    }

    fn remove_section(&mut self, name: &str) -> Result<()> {
        let dir = self.user_root.join(name);
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MenuError::storage(format!("removing {:?}", dir), e)),
        }
    }

    fn save_entry(&mut self, section: &str, link: &LinkFile) -> Result<PathBuf> {
        let dir = self.ensure_user_section(section)?;
        let path = Self::free_path(&dir, &link.title);
        Self::write_link(&path, link)?;
        Ok(path)
    }

    fn move_entry(&mut self, file: &Path, to_section: &str) -> Result<PathBuf> {
        let dir = self.ensure_user_section(to_section)?;
        let title = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let target = Self::free_path(&dir, &title);

        // Links from the system root cannot be removed, so copy them instead
        if file.starts_with(&self.user_root) {
            std::fs::rename(file, &target)
                .map_err(|e| MenuError::storage(format!("moving {:?}", file), e))?;
        } else {
            std::fs::copy(file, &target)
                .map_err(|e| MenuError::storage(format!("copying {:?}", file), e))?;
        }
        Ok(target)
    }

    fn remove_entry(&mut self, file: &Path) -> Result<()> {
        if !file.starts_with(&self.user_root) {
            return Err(MenuError::storage(
                format!("removing {:?}", file),
                io::Error::new(io::ErrorKind::PermissionDenied, "link is read-only"),
            ));
        }
        std::fs::remove_file(file).map_err(|e| MenuError::storage(format!("removing {:?}", file), e))
    }
}

/// Store that keeps section names in memory and never touches disk
#[derive(Debug, Default)]
pub struct MemoryStore {
    sections: AHashSet<CompactString>,
    files: AHashSet<PathBuf>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every write fails, for exercising error paths
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    fn check_writable(&self, what: &str) -> Result<()> {
        if self.read_only {
            return Err(MenuError::storage(
                what.to_string(),
                io::Error::new(io::ErrorKind::PermissionDenied, "store is read-only"),
            ));
        }
        Ok(())
    }

    pub fn has_file(&self, file: &Path) -> bool {
        self.files.contains(file)
    }
}

impl SectionStore for MemoryStore {
    fn load(&self) -> Result<Vec<StoredSection>> {
        let mut names: Vec<_> = self.sections.iter().cloned().collect();
        names.sort_by_key(|n| n.to_lowercase());
        Ok(names
            .into_iter()
            .map(|name| StoredSection {
                name,
                entries: Vec::new(),
            })
            .collect())
    }

    fn create_section(&mut self, name: &str) -> Result<()> {
        self.check_writable("creating section")?;
        if !self.sections.insert(name.into()) {
            return Err(MenuError::storage(
                format!("creating section '{}'", name),
                io::Error::new(io::ErrorKind::AlreadyExists, "section exists"),
            ));
        }
        Ok(())
    }

    fn rename_section(&mut self, old: &str, new: &str) -> Result<Option<DirMove>> {
        self.check_writable("renaming section")?;
        self.sections.remove(old);
        self.sections.insert(new.into());
        Ok(None)
    }

    fn remove_section(&mut self, name: &str) -> Result<()> {
        self.check_writable("removing section")?;
        self.sections.remove(name);
        let prefix = Path::new("/memory").join(name);
        self.files.retain(|f| !f.starts_with(&prefix));
        Ok(())
    }

    fn save_entry(&mut self, section: &str, link: &LinkFile) -> Result<PathBuf> {
        self.check_writable("saving link")?;
        let dir = Path::new("/memory").join(section);
        let mut path = dir.join(link.title.as_str());
        let mut n = 2;
        while self.files.contains(&path) {
            path = dir.join(format!("{}{}", link.title, n));
            n += 1;
        }
        self.files.insert(path.clone());
        Ok(path)
    }

    fn move_entry(&mut self, file: &Path, to_section: &str) -> Result<PathBuf> {
        self.check_writable("moving link")?;
        self.files.remove(file);
        let name = file.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        let link = LinkFile {
            title: name.into(),
            ..LinkFile::default()
        };
        self.save_entry(to_section, &link)
    }

    fn remove_entry(&mut self, file: &Path) -> Result<()> {
        self.check_writable("removing link")?;
        self.files.remove(file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(title: &str, exec: &str) -> LinkFile {
        LinkFile {
            title: title.into(),
            exec: PathBuf::from(exec),
            ..LinkFile::default()
        }
    }

    #[test]
    fn test_load_merges_roots_and_sorts() {
        let system = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(system.path().join("games")).unwrap();
        std::fs::create_dir_all(system.path().join("Emulators")).unwrap();
        std::fs::create_dir_all(user.path().join("games")).unwrap();
        std::fs::create_dir_all(user.path().join("applications")).unwrap();
        std::fs::create_dir_all(user.path().join(".hidden")).unwrap();

        let store = DirectoryStore::new(user.path(), Some(system.path().to_path_buf()));
        let names: Vec<_> = store.load().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["applications", "Emulators", "games"]);
    }

    #[test]
    fn test_load_skips_missing_targets_and_bad_files() {
        let user = tempfile::tempdir().unwrap();
        let mut store = DirectoryStore::new(user.path(), None);
        store.create_section("games").unwrap();

        let exe = user.path().join("doom.elf");
        std::fs::write(&exe, b"").unwrap();
        store.save_entry("games", &link("Doom", exe.to_str().unwrap())).unwrap();
        store.save_entry("games", &link("Gone", "/does/not/exist")).unwrap();
        store.save_entry("games", &link("Shell", "sh")).unwrap();
        std::fs::write(user.path().join("games/broken"), b"{").unwrap();

        let sections = store.load().unwrap();
        let titles: Vec<_> = sections[0].entries.iter().map(|e| e.title.clone()).collect();
        assert_eq!(titles, ["Doom", "Shell"]);
    }

    #[test]
    fn test_create_existing_section_fails() {
        let user = tempfile::tempdir().unwrap();
        let mut store = DirectoryStore::new(user.path(), None);
        store.create_section("games").unwrap();
        assert!(matches!(store.create_section("games"), Err(MenuError::Storage { .. })));
    }

    #[test]
    fn test_save_entry_picks_free_name() {
        let user = tempfile::tempdir().unwrap();
        let mut store = DirectoryStore::new(user.path(), None);

        let first = store.save_entry("games", &link("Doom", "sh")).unwrap();
        let second = store.save_entry("games", &link("Doom", "sh")).unwrap();
        assert_eq!(first, user.path().join("games/Doom"));
        assert_eq!(second, user.path().join("games/Doom2"));
    }

    #[test]
    fn test_rename_and_move() {
        let user = tempfile::tempdir().unwrap();
        let mut store = DirectoryStore::new(user.path(), None);
        let file = store.save_entry("games", &link("Doom", "sh")).unwrap();
        store.create_section("shooters").unwrap();

        let moved = store.move_entry(&file, "shooters").unwrap();
        assert!(!file.exists());
        assert_eq!(moved, user.path().join("shooters/Doom"));

        let dir_move = store.rename_section("shooters", "fps").unwrap();
        assert_eq!(
            dir_move,
            Some(DirMove {
                from: user.path().join("shooters"),
                to: user.path().join("fps"),
            })
        );
        assert!(user.path().join("fps/Doom").exists());
        assert!(store.rename_section("fps", "games").is_err());
    }

    #[test]
    fn test_system_links_are_read_only() {
        let system = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(system.path().join("games")).unwrap();
        let file = system.path().join("games/Doom");
        std::fs::write(&file, serde_json::to_vec(&link("Doom", "sh")).unwrap()).unwrap();

        let mut store = DirectoryStore::new(user.path(), Some(system.path().to_path_buf()));
        assert!(store.remove_entry(&file).is_err());

        let copied = store.move_entry(&file, "other").unwrap();
        assert!(file.exists());
        assert!(copied.exists());
    }

    #[test]
    fn test_memory_store_rejects_duplicates() {
        let mut store = MemoryStore::new();
        store.create_section("games").unwrap();
        assert!(store.create_section("games").is_err());
        assert!(MemoryStore::read_only().create_section("x").is_err());
    }
}
