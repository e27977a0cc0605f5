use std::path::{Path, PathBuf};

const SYSTEM_DIR: &str = "/usr/share/kestrel";

/// Configuration paths for the launcher
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub settings: PathBuf,
    pub input_map: PathBuf,
    pub user_sections: PathBuf,
    pub system_sections: PathBuf,
    pub user_skins: PathBuf,
    pub system_skins: PathBuf,
    pub last_selection: PathBuf,
    pub launch_log: PathBuf,
}

impl ConfigPaths {
    pub fn new() -> Self {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        let runtime_dir = dirs::runtime_dir()
            .or_else(dirs::cache_dir)
            .unwrap_or_else(std::env::temp_dir);

        Self::with_roots(config_dir.join("kestrel"), PathBuf::from(SYSTEM_DIR), runtime_dir)
    }

    /// Build paths below explicit roots (used by tests and `--root`)
    pub fn with_roots(user_root: PathBuf, system_root: PathBuf, runtime_dir: PathBuf) -> Self {
        Self {
            settings: user_root.join("settings.json"),
            input_map: user_root.join("input.json"),
            user_sections: user_root.join("sections"),
            system_sections: system_root.join("sections"),
            user_skins: user_root.join("skins"),
            system_skins: system_root.join("skins"),
            last_selection: runtime_dir.join("kestrel-last-selection.json"),
            launch_log: runtime_dir.join("kestrel-launch.log"),
        }
    }

    /// Get the user config directory
    pub fn user_root(&self) -> &Path {
        self.settings.parent().unwrap_or(Path::new("."))
    }

    /// Skin config file, preferring the user copy over the system one
    pub fn skin_config(&self, skin: &str) -> PathBuf {
        let user = self.user_skins.join(skin).join("skin.json");
        if user.exists() {
            user
        } else {
            self.system_skins.join(skin).join("skin.json")
        }
    }
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::new()
    }
}
