use compact_str::CompactString;
use std::path::PathBuf;

/// Everything needed to start an application entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub title: CompactString,
    pub exec: PathBuf,
    pub params: CompactString,
    pub workdir: PathBuf,
    /// Append the program's output here instead of discarding it
    pub log: Option<PathBuf>,
}

/// Commands FROM layers and entries TO the shell and its services
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    // =========== Process Commands ===========

    /// Launch an application
    Launch(LaunchRequest),

    // =========== Power Commands ===========

    /// Power the device off
    PowerOff,

    /// Reboot the device
    Reboot,

    /// Suspend the device
    Suspend,

    // =========== Menu Commands ===========

    /// Open the context menu for the current selection
    OpenContextMenu,

    /// Delete the selected link
    DeleteSelectedLink,

    /// Delete the selected section and its links
    DeleteSelectedSection,

    /// Move the selected link to another section
    MoveSelectedLink { to_section: usize },

    /// Sort links of every section by title
    OrderLinks,

    /// Re-read sections from storage
    ReloadSections,

    // =========== Shell Commands ===========

    /// Open the settings dialog
    ShowSettings,

    /// Exit the launcher
    Quit,
}
