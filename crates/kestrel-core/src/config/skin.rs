use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// RGBA colour, stored in skin files as `#rrggbbaa` (alpha optional)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        if hex.len() != 6 && hex.len() != 8 {
            return None;
        }

        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid colour '{}'", value))
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_string()
    }
}

/// Skin metrics and colours (skins/<name>/skin.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinConfig {
    pub top_bar_height: u32,
    pub bottom_bar_height: u32,
    pub link_width: u32,
    pub link_height: u32,

    pub top_bar_bg: Rgba,
    pub bottom_bar_bg: Rgba,
    pub selection_bg: Rgba,
    pub message_box_bg: Rgba,
    pub message_box_border: Rgba,
    pub message_box_selection: Rgba,
}

impl Default for SkinConfig {
    fn default() -> Self {
        Self {
            top_bar_height: 50,
            bottom_bar_height: 20,
            link_width: 80,
            link_height: 50,
            top_bar_bg: Rgba::new(255, 255, 255, 130),
            bottom_bar_bg: Rgba::new(255, 255, 255, 130),
            selection_bg: Rgba::new(255, 255, 255, 130),
            message_box_bg: Rgba::new(255, 255, 255, 255),
            message_box_border: Rgba::new(80, 80, 80, 255),
            message_box_selection: Rgba::new(160, 160, 160, 255),
        }
    }
}

impl SkinConfig {
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
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Clamp metrics into the range the layout code supports
    pub fn normalized(mut self) -> Self {
        self.top_bar_height = self.top_bar_height.clamp(32, 120);
        self.bottom_bar_height = self.bottom_bar_height.clamp(20, 120);
        self.link_width = self.link_width.clamp(32, 120);
        self.link_height = self.link_height.clamp(32, 120);
        self
    }
}
