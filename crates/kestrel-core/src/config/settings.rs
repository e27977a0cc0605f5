use serde::{Deserialize, Serialize};
use std::path::Path;

/// How application entries are started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchMode {
    /// Replace the launcher process with the application
    #[default]
    Exec,
    /// Spawn the application detached and keep the menu running
    Spawn,
}

/// Launcher settings (settings.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellSettings {
    // Layout
    #[serde(default = "default_link_columns")]
    pub link_columns: u32,
    #[serde(default = "default_link_rows")]
    pub link_rows: u32,
    #[serde(default = "default_resolution_x")]
    pub resolution_x: u32,
    #[serde(default = "default_resolution_y")]
    pub resolution_y: u32,

    // Appearance
    #[serde(default = "default_skin")]
    pub skin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_format: Option<String>,

    // Behaviour
    #[serde(default = "default_true")]
    pub save_selection: bool,
    /// Keep launched programs' output in the launch log
    #[serde(default)]
    pub output_logs: bool,
    #[serde(default)]
    pub launch_mode: LaunchMode,
}

fn default_link_columns() -> u32 {
    4
}

fn default_link_rows() -> u32 {
    4
}

fn default_resolution_x() -> u32 {
    320
}

fn default_resolution_y() -> u32 {
    240
}

fn default_skin() -> String {
    "Default".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            link_columns: default_link_columns(),
            link_rows: default_link_rows(),
            resolution_x: default_resolution_x(),
            resolution_y: default_resolution_y(),
            skin: default_skin(),
            clock_format: None,
            save_selection: true,
            output_logs: false,
            launch_mode: LaunchMode::Exec,
        }
    }
}

impl ShellSettings {
    /// Load settings, falling back to defaults when the file is missing or invalid
    pub fn load(path: &Path) -> Self {
        std::fs::read(path)
            .ok()
            .and_then(|data| serde_json::from_slice::<Self>(&data).ok())
            .unwrap_or_default()
            .normalized()
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let dir = path.parent().ok_or_else(|| anyhow::anyhow!("Invalid path"))?;
        std::fs::create_dir_all(dir)?;
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Clamp every numeric setting into its supported range
    pub fn normalized(mut self) -> Self {
        self.link_columns = self.link_columns.clamp(1, 8);
        self.link_rows = self.link_rows.clamp(1, 8);
        self.resolution_x = self.resolution_x.clamp(320, 1920);
        self.resolution_y = self.resolution_y.clamp(240, 1200);
        if self.skin.trim().is_empty() {
            self.skin = default_skin();
        }
        self
    }

    /// Get clock_format with default
    pub fn clock_format(&self) -> &str {
        self.clock_format.as_deref().unwrap_or("%H:%M")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: ShellSettings = serde_json::from_str(r#"{ "link_rows": 3 }"#).unwrap();
        assert_eq!(settings.link_rows, 3);
        assert_eq!(settings.link_columns, 4);
        assert_eq!(settings.skin, "Default");
        assert!(settings.save_selection);
        assert_eq!(settings.launch_mode, LaunchMode::Exec);
        assert_eq!(settings.clock_format(), "%H:%M");
    }

    #[test]
    fn test_normalized_clamps_out_of_range_values() {
        let settings = ShellSettings {
            link_columns: 0,
            link_rows: 40,
            resolution_x: 10,
            resolution_y: 5000,
            skin: "  ".into(),
            ..ShellSettings::default()
        }
        .normalized();

        assert_eq!(settings.link_columns, 1);
        assert_eq!(settings.link_rows, 8);
        assert_eq!(settings.resolution_x, 320);
        assert_eq!(settings.resolution_y, 1200);
        assert_eq!(settings.skin, "Default");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");

        let settings = ShellSettings {
            link_columns: 6,
            launch_mode: LaunchMode::Spawn,
            ..ShellSettings::default()
        };
        settings.save_to(&path).unwrap();

        assert_eq!(ShellSettings::load(&path), settings);
    }

    #[test]
    fn test_load_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();

        assert_eq!(ShellSettings::load(&path), ShellSettings::default());
    }
}
