use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use kestrel_core::Menu;

/// Selection remembered across launches (last-selection.json)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LastSelection {
    pub section: usize,
    pub link: usize,
}

impl LastSelection {
    pub fn capture(menu: &Menu) -> Self {
        Self {
            section: menu.selected_section_index(),
            link: menu.selected_entry_index(),
        }
    }

    /// Apply through the menu's setters so stale indices wrap like any other
    pub fn restore(self, menu: &mut Menu) {
        menu.set_section_index(self.section as isize);
        menu.set_link_index(self.link as isize);
    }

    pub fn load(path: &Path) -> Option<Self> {
        let data = std::fs::read(path).ok()?;
        match serde_json::from_slice(&data) {
            Ok(selection) => Some(selection),
            Err(e) => {
                debug!("Ignoring last selection {:?}: {}", path, e);
                None
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let dir = path.parent().ok_or_else(|| anyhow::anyhow!("Invalid path"))?;
        std::fs::create_dir_all(dir)?;
        std::fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }
}
