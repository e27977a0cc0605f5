//! Section and link model of the launcher menu.

pub mod animation;
pub mod entry;
pub mod grid;
pub mod icons;
pub mod registry;
pub mod state;
pub mod store;

pub use animation::{cubic_ease, SectionScroller, SECTION_UNIT};
pub use entry::{ActionFn, ApplicationEntry, Entry, EntryKind, LinkFile};
pub use icons::IconCache;
pub use registry::{report, Registry, Section};
pub use state::Menu;
pub use store::{DirMove, DirectoryStore, MemoryStore, SectionStore, StoredSection};
