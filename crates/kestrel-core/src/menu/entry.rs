use async_channel::Sender;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::messages::{LaunchRequest, ShellCommand};

/// Action run by a virtual entry. It receives the shell's command sender
/// instead of capturing the entry, so entries never own a cycle.
pub type ActionFn = Arc<dyn Fn(&Sender<ShellCommand>) + Send + Sync>;

/// On-disk form of an application entry (one JSON file per link)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkFile {
    pub title: CompactString,
    #[serde(default, skip_serializing_if = "CompactString::is_empty")]
    pub description: CompactString,
    #[serde(default, skip_serializing_if = "CompactString::is_empty")]
    pub icon: CompactString,
    pub exec: PathBuf,
    #[serde(default, skip_serializing_if = "CompactString::is_empty")]
    pub params: CompactString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual: Option<PathBuf>,
}

/// An entry that starts an external program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationEntry {
    /// Backing link file, if the entry is persisted
    pub file: Option<PathBuf>,
    pub exec: PathBuf,
    pub params: CompactString,
    pub workdir: Option<PathBuf>,
    pub manual: Option<PathBuf>,
}

impl ApplicationEntry {
    pub fn new(exec: impl Into<PathBuf>) -> Self {
        Self {
            file: None,
            exec: exec.into(),
            params: CompactString::default(),
            workdir: None,
            manual: None,
        }
    }

    /// Relative commands are resolved through PATH, so only absolute ones are checked
    pub fn target_exists(&self) -> bool {
        !self.exec.is_absolute() || self.exec.exists()
    }

    /// Working directory: explicit, else the directory holding the executable
    pub fn working_dir(&self) -> PathBuf {
        if let Some(dir) = &self.workdir {
            return dir.clone();
        }
        self.exec
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// The two capabilities an entry can have
#[derive(Clone)]
pub enum EntryKind {
    Action(ActionFn),
    Application(ApplicationEntry),
}

impl fmt::Debug for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(_) => f.write_str("Action(..)"),
            Self::Application(app) => f.debug_tuple("Application").field(app).finish(),
        }
    }
}

/// A launchable or actionable item in a section
#[derive(Debug, Clone)]
pub struct Entry {
    pub title: CompactString,
    pub description: CompactString,
    /// Icon path into the external surface cache; empty for none
    pub icon: CompactString,
    pub kind: EntryKind,
}

impl Entry {
    pub fn action(
        title: &str,
        description: &str,
        icon: &str,
        action: impl Fn(&Sender<ShellCommand>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            icon: icon.into(),
            kind: EntryKind::Action(Arc::new(action)),
        }
    }

    pub fn application(title: &str, description: &str, icon: &str, app: ApplicationEntry) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            icon: icon.into(),
            kind: EntryKind::Application(app),
        }
    }

    /// Build an application entry from its link file
    pub fn from_link_file(link: LinkFile, file: PathBuf) -> Self {
        let app = ApplicationEntry {
            file: Some(file),
            exec: link.exec,
            params: link.params,
            workdir: link.workdir,
            manual: link.manual,
        };
        Self::application(&link.title, &link.description, &link.icon, app)
    }

    /// Link file contents for an application entry
    pub fn to_link_file(&self) -> Option<LinkFile> {
        let app = self.as_application()?;
        Some(LinkFile {
            title: self.title.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
            exec: app.exec.clone(),
            params: app.params.clone(),
            workdir: app.workdir.clone(),
            manual: app.manual.clone(),
        })
    }

    pub fn is_application(&self) -> bool {
        matches!(self.kind, EntryKind::Application(_))
    }

    pub fn as_application(&self) -> Option<&ApplicationEntry> {
        match &self.kind {
            EntryKind::Application(app) => Some(app),
            EntryKind::Action(_) => None,
        }
    }

    pub fn as_application_mut(&mut self) -> Option<&mut ApplicationEntry> {
        match &mut self.kind {
            EntryKind::Application(app) => Some(app),
            EntryKind::Action(_) => None,
        }
    }

    pub fn has_icon(&self) -> bool {
        !self.icon.is_empty()
    }

    /// Run the entry: actions execute in place, applications queue a launch
    pub fn run(&self, commands: &Sender<ShellCommand>) {
        match &self.kind {
            EntryKind::Action(action) => {
                debug!("Running action entry '{}'", self.title);
                action(commands);
            }
            EntryKind::Application(app) => {
                let request = LaunchRequest {
                    title: self.title.clone(),
                    exec: app.exec.clone(),
                    params: app.params.clone(),
                    workdir: app.working_dir(),
                    log: None,
                };
                debug!("Queueing launch of '{}'", self.title);
                if commands.try_send(ShellCommand::Launch(request)).is_err() {
                    warn!("Command queue closed, dropping launch of '{}'", self.title);
                }
            }
        }
    }
}
