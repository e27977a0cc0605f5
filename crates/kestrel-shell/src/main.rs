mod input;
mod selection;
mod shell;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use clap::{Parser, Subcommand};
use tracing::info;

use kestrel_core::{ConfigPaths, DirectoryStore, InputMap, Registry};

use crate::shell::Shell;

#[derive(Parser)]
#[command(name = "kestrel-shell")]
#[command(about = "Section-based application launcher for handheld consoles")]
#[command(version)]
struct Cli {
    /// Use this directory instead of the user, system and runtime locations
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the launcher (default)
    Run {
        /// Read key names from this file instead of stdin
        #[arg(long)]
        script: Option<PathBuf>,
    },
    /// Print sections and their links
    List,
    /// Create an empty section
    AddSection {
        name: String,
    },
    /// Rename a section
    RenameSection {
        old: String,
        new: String,
    },
    /// Delete a section and the links inside it
    DeleteSection {
        name: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kestrel_shell=info".parse()?)
                .add_directive("kestrel_core=info".parse()?)
                .add_directive("kestrel_components=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let paths = match cli.root {
        Some(root) => ConfigPaths::with_roots(root.clone(), root.join("system"), root.join("run")),
        None => ConfigPaths::new(),
    };

    match cli.command {
        Some(Command::Run { script }) => run(paths, script),
        None => run(paths, None),
        Some(Command::List) => list(&open_registry(&paths)?),
        Some(Command::AddSection { name }) => {
            let index = open_registry(&paths)?.add_section(&name)?;
            info!("Section '{}' created at position {}", name, index);
            Ok(())
        }
        Some(Command::RenameSection { old, new }) => {
            let mut registry = open_registry(&paths)?;
            let index = section_index(&registry, &old)?;
            registry.rename_section(index, &new)?;
            Ok(())
        }
        Some(Command::DeleteSection { name }) => {
            let mut registry = open_registry(&paths)?;
            let index = section_index(&registry, &name)?;
            let section = registry.delete_section(index)?;
            info!("Deleted '{}' with {} links", section.name, section.entries.len());
            Ok(())
        }
    }
}

fn run(paths: ConfigPaths, script: Option<PathBuf>) -> anyhow::Result<()> {
    info!("Starting Kestrel launcher");
    let map = InputMap::load(&paths.input_map);
    let store = DirectoryStore::new(paths.user_sections.clone(), Some(paths.system_sections.clone()));
    let mut shell = Shell::new(paths, Box::new(store))?;

    let events = shell.services().event_sender();
    let _reader = match script {
        Some(path) => {
            let file = File::open(&path)
                .map_err(|e| anyhow::anyhow!("Cannot open script {:?}: {}", path, e))?;
            input::spawn_reader(BufReader::new(file), map, events)
        }
        None => input::spawn_reader(BufReader::new(std::io::stdin()), map, events),
    };

    shell.run()
}

fn open_registry(paths: &ConfigPaths) -> anyhow::Result<Registry> {
    let store = DirectoryStore::new(paths.user_sections.clone(), Some(paths.system_sections.clone()));
    Ok(Registry::load(Box::new(store))?)
}

fn section_index(registry: &Registry, name: &str) -> anyhow::Result<usize> {
    registry
        .section_index(name)
        .ok_or_else(|| anyhow::anyhow!("Unknown section: {}", name))
}

fn list(registry: &Registry) -> anyhow::Result<()> {
    for section in registry.sections() {
        println!("{}", section.name);
        for entry in &section.entries {
            match entry.as_application() {
                Some(app) => println!("  {:<24} {}", entry.title, app.exec.display()),
                None => println!("  {}", entry.title),
            }
        }
    }
    Ok(())
}
