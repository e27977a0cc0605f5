use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::messages::Button;

/// Key name to button table (input.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMap {
    #[serde(default)]
    pub keys: HashMap<String, Button>,
}

impl Default for InputMap {
    fn default() -> Self {
        let keys = [
            ("up", Button::Up),
            ("down", Button::Down),
            ("left", Button::Left),
            ("right", Button::Right),
            ("a", Button::Accept),
            ("b", Button::Cancel),
            ("l", Button::AltLeft),
            ("r", Button::AltRight),
            ("select", Button::Menu),
            ("start", Button::Settings),
        ]
        .into_iter()
        .map(|(key, button)| (key.to_string(), button))
        .collect();

        Self { keys }
    }
}

impl InputMap {
    /// Load a user table; entries there override the defaults
    pub fn load(path: &Path) -> Self {
        let mut map = Self::default();

        let Ok(data) = std::fs::read(path) else {
            return map;
        };

        match serde_json::from_slice::<InputMap>(&data) {
            Ok(user) => map.keys.extend(user.keys),
            Err(e) => warn!("Ignoring invalid input map {:?}: {}", path, e),
        }

        map
    }

    /// Resolve a key name, falling back to plain button names
    pub fn resolve(&self, key: &str) -> Option<Button> {
        let key = key.trim().to_lowercase();
        self.keys
            .get(&key)
            .copied()
            .or_else(|| Button::from_name(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keys() {
        let map = InputMap::default();
        assert_eq!(map.resolve("a"), Some(Button::Accept));
        assert_eq!(map.resolve(" R "), Some(Button::AltRight));
        assert_eq!(map.resolve("altleft"), Some(Button::AltLeft));
        assert_eq!(map.resolve("nope"), None);
    }

    #[test]
    fn test_user_map_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.json");
        std::fs::write(&path, r#"{ "keys": { "a": "cancel", "x": "menu" } }"#).unwrap();

        let map = InputMap::load(&path);
        assert_eq!(map.resolve("a"), Some(Button::Cancel));
        assert_eq!(map.resolve("x"), Some(Button::Menu));
        assert_eq!(map.resolve("b"), Some(Button::Cancel));
    }
}
