use std::path::PathBuf;

use compact_str::CompactString;

/// Errors raised by the menu model and its section store
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("no section at index {0}")]
    NoSuchSection(usize),

    #[error("no entry at index {index} in section {section}")]
    NoSuchEntry { section: usize, index: usize },

    #[error("section '{0}' already exists")]
    DuplicateSection(CompactString),

    #[error("section name must not be empty")]
    EmptyName,

    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl MenuError {
    pub(crate) fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MenuError>;
