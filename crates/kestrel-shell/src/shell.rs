use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use kestrel_components::{
    BoxedLayer, ContextMenu, Layer, LayerContext, MenuLayer, RecordingSurface, SharedMenu,
};
use kestrel_core::menu::report;
use kestrel_core::{
    utils, ClockService, ConfigPaths, Entry, LaunchMode, LaunchRequest, Menu, Registry,
    SectionStore, ServiceHub, ShellCommand, ShellEvent, ShellSettings, SkinConfig,
};

use crate::selection::LastSelection;

/// Section holding the built-in action entries
pub const SETTINGS_SECTION: &str = "settings";

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// The launcher: owns the menu, the layer stack and the services
pub struct Shell {
    paths: ConfigPaths,
    config: Arc<RwLock<ShellSettings>>,
    services: ServiceHub,
    clock: ClockService,
    menu: SharedMenu,
    ctx: LayerContext,
    menu_layer: MenuLayer,
    overlays: Vec<BoxedLayer>,
    commands: async_channel::Receiver<ShellCommand>,
    surface: RecordingSurface,
    last_frame: Vec<String>,
    frame_interval: Duration,
    running: bool,
}

impl Shell {
    pub fn new(paths: ConfigPaths, store: Box<dyn SectionStore>) -> anyhow::Result<Self> {
        let settings = ShellSettings::load(&paths.settings);
        let skin = SkinConfig::load(&paths.skin_config(&settings.skin));
        info!(
            "Using skin '{}' at {}x{}",
            settings.skin, settings.resolution_x, settings.resolution_y
        );

        let registry = Registry::load(store)?;
        let mut menu = Menu::new(
            registry,
            settings.link_columns as usize,
            settings.link_rows as usize,
        );
        Self::add_builtin_actions(&mut menu);

        if settings.save_selection {
            if let Some(selection) = LastSelection::load(&paths.last_selection) {
                debug!("Restoring selection {:?}", selection);
                selection.restore(&mut menu);
            }
        }

        let services = ServiceHub::new(paths.clone())?;
        let clock = ClockService::new(settings.clock_format());
        let surface = RecordingSurface::new(settings.resolution_x, settings.resolution_y);

        let (command_tx, commands) = async_channel::bounded::<ShellCommand>(64);
        let config = Arc::new(RwLock::new(settings));
        let ctx = LayerContext::new(command_tx, config.clone(), Arc::new(RwLock::new(skin)));

        let menu = Rc::new(RefCell::new(menu));
        let menu_layer = MenuLayer::new(menu.clone(), ctx.clone());

        Ok(Self {
            paths,
            config,
            services,
            clock,
            menu,
            ctx,
            menu_layer,
            overlays: Vec::new(),
            commands,
            surface,
            last_frame: Vec::new(),
            frame_interval: FRAME_INTERVAL,
            running: true,
        })
    }

    /// Register the action entries of the settings section
    fn add_builtin_actions(menu: &mut Menu) {
        let section = match menu.registry_mut().ensure_section(SETTINGS_SECTION) {
            Ok(section) => section,
            Err(e) => {
                warn!("No settings section: {}", e);
                return;
            }
        };

        let actions: [(&str, &str, ShellCommand); 6] = [
            ("Reload sections", "Read sections and links again", ShellCommand::ReloadSections),
            ("Sort links", "Sort links of every section by title", ShellCommand::OrderLinks),
            ("Suspend", "Put the device to sleep", ShellCommand::Suspend),
            ("Power off", "Switch the device off", ShellCommand::PowerOff),
            ("Reboot", "Restart the device", ShellCommand::Reboot),
            ("Quit", "Leave the launcher", ShellCommand::Quit),
        ];

        for (title, description, cmd) in actions {
            let entry = Entry::action(title, description, "", move |commands| {
                if let Err(e) = commands.try_send(cmd.clone()) {
                    warn!("Dropping built-in action command: {}", e);
                }
            });
            report(menu.add_entry(section, entry), "Adding built-in action");
        }
    }

    pub fn services(&self) -> &ServiceHub {
        &self.services
    }

    #[cfg(test)]
    pub fn menu(&self) -> &SharedMenu {
        &self.menu
    }

    #[cfg(test)]
    pub fn set_frame_interval(&mut self, interval: Duration) {
        self.frame_interval = interval;
    }

    /// Main loop. Blocks for input only while nothing is animating.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let events = self.services.event_receiver();
        self.clock
            .start(self.services.runtime().handle(), self.services.event_sender());
        self.menu_layer.set_clock(&self.clock.now_string());

        let mut animating = self.run_animations();
        self.present();

        while self.running {
            let event = if animating {
                events.try_recv().ok()
            } else {
                match events.recv_blocking() {
                    Ok(event) => Some(event),
                    Err(_) => break,
                }
            };

            if let Some(event) = event {
                self.handle_event(event);
            }
            self.drain_commands();

            animating = self.run_animations();
            self.present();

            if animating && !self.frame_interval.is_zero() {
                std::thread::sleep(self.frame_interval);
            }
        }

        self.save_selection();
        self.clock.stop();
        info!("Launcher main loop finished");
        Ok(())
    }

    fn layers_top_down(&mut self) -> impl Iterator<Item = &mut dyn Layer> {
        self.overlays
            .iter_mut()
            .rev()
            .map(|layer| layer.as_mut() as &mut dyn Layer)
            .chain(std::iter::once(&mut self.menu_layer as &mut dyn Layer))
    }

    pub fn handle_event(&mut self, event: ShellEvent) {
        match event {
            ShellEvent::Button(button) => {
                if !self.layers_top_down().any(|layer| layer.handle_button_press(button)) {
                    debug!("Unhandled button {:?}", button);
                }
            }

            ShellEvent::Touch(touch) => {
                let _ = self.layers_top_down().any(|layer| layer.handle_touch(&touch));
            }

            ShellEvent::SectionsChanged(path) => {
                info!("Sections changed at {:?}, reloading", path);
                report(self.menu.borrow_mut().reload(), "Reloading sections");
                self.release_icons();
            }

            ShellEvent::SettingsReloaded(settings) => {
                self.menu.borrow_mut().set_layout(
                    settings.link_columns as usize,
                    settings.link_rows as usize,
                );
                self.clock.set_format(settings.clock_format());
                self.clock
                    .start(self.services.runtime().handle(), self.services.event_sender());
                *self.config.write() = settings;
            }

            ShellEvent::ClockTick(time) => self.menu_layer.set_clock(&time),

            ShellEvent::Quit => self.running = false,
        }
    }

    /// Apply commands queued by layers and entries
    pub fn drain_commands(&mut self) {
        while let Ok(cmd) = self.commands.try_recv() {
            self.handle_command(cmd);
        }
    }

    fn handle_command(&mut self, cmd: ShellCommand) {
        match cmd {
            ShellCommand::Launch(request) => self.launch(request),

            ShellCommand::PowerOff | ShellCommand::Reboot | ShellCommand::Suspend => {
                self.save_selection();
                self.services.dispatch_process(cmd);
            }

            ShellCommand::OpenContextMenu => {
                let layer = ContextMenu::for_menu(&self.menu.borrow(), self.ctx.clone());
                self.overlays.push(Box::new(layer));
            }

            ShellCommand::DeleteSelectedLink => {
                report(self.menu.borrow_mut().delete_selected_entry(), "Deleting link");
                self.release_icons();
            }

            ShellCommand::DeleteSelectedSection => {
                report(self.menu.borrow_mut().delete_selected_section(), "Deleting section");
                self.release_icons();
            }

            ShellCommand::MoveSelectedLink { to_section } => {
                report(
                    self.menu.borrow_mut().move_selected_entry(to_section),
                    "Moving link",
                );
            }

            ShellCommand::OrderLinks => self.menu.borrow_mut().order_entries(),

            ShellCommand::ReloadSections => {
                report(self.menu.borrow_mut().reload(), "Reloading sections");
                self.release_icons();
            }

            ShellCommand::ShowSettings => {
                let mut menu = self.menu.borrow_mut();
                let index = menu.registry().section_index(SETTINGS_SECTION);
                match index {
                    Some(index) => menu.jump_to_section(index),
                    None => debug!("No settings section to show"),
                }
            }

            ShellCommand::Quit => self.running = false,
        }
    }

    fn with_launch_log(&self, mut request: LaunchRequest) -> LaunchRequest {
        if self.config.read().output_logs {
            request.log = Some(self.paths.launch_log.clone());
        }
        request
    }

    fn launch(&mut self, request: LaunchRequest) {
        self.save_selection();

        let request = self.with_launch_log(request);
        let mode = self.config.read().launch_mode;
        match mode {
            LaunchMode::Exec => {
                self.clock.stop();
                // Only comes back when exec failed
                let e = utils::exec_replace(&request);
                error!("Could not start '{}': {}", request.title, e);
                self.clock
                    .start(self.services.runtime().handle(), self.services.event_sender());
            }
            LaunchMode::Spawn => {
                self.services.dispatch_process(ShellCommand::Launch(request));
            }
        }
    }

    fn release_icons(&mut self) {
        for icon in self.menu.borrow_mut().take_evicted_icons() {
            debug!("Icon {} can be freed", icon);
        }
    }

    fn save_selection(&self) {
        if !self.config.read().save_selection {
            return;
        }
        let selection = LastSelection::capture(&self.menu.borrow());
        if let Err(e) = selection.save_to(&self.paths.last_selection) {
            warn!("Failed to save selection: {}", e);
        }
    }

    /// Step every layer's animations. Returns whether any is still running.
    fn run_animations(&mut self) -> bool {
        self.overlays.retain(|layer| !layer.is_dismissed());

        let mut running = self.menu_layer.run_animations();
        for layer in &mut self.overlays {
            running |= layer.run_animations();
        }
        running
    }

    /// Paint the stack bottom to top and print the frame's text when it changed
    fn present(&mut self) {
        self.overlays.retain(|layer| !layer.is_dismissed());

        self.surface.clear();
        self.menu_layer.paint(&mut self.surface);
        for layer in &self.overlays {
            layer.paint(&mut self.surface);
        }

        let frame: Vec<String> = self.surface.texts().into_iter().map(String::from).collect();
        if frame != self.last_frame {
            println!("{}", frame.join(" | "));
            self.last_frame = frame;
        }
    }

    #[cfg(test)]
    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_core::{Button, DirectoryStore, LinkFile, MemoryStore};
    use std::path::Path;

    fn paths(root: &Path) -> ConfigPaths {
        ConfigPaths::with_roots(root.join("user"), root.join("system"), root.join("run"))
    }

    fn write_link(paths: &ConfigPaths, section: &str, title: &str) {
        let dir = paths.user_sections.join(section);
        std::fs::create_dir_all(&dir).unwrap();
        let link = LinkFile {
            title: title.into(),
            exec: "true".into(),
            ..LinkFile::default()
        };
        std::fs::write(dir.join(title), serde_json::to_vec(&link).unwrap()).unwrap();
    }

    fn shell_with_links(root: &Path) -> Shell {
        let paths = paths(root);
        write_link(&paths, "games", "Doom");
        write_link(&paths, "games", "Quake");
        write_link(&paths, "emulators", "Gambatte");

        let store = DirectoryStore::new(paths.user_sections.clone(), Some(paths.system_sections.clone()));
        let mut shell = Shell::new(paths, Box::new(store)).unwrap();
        shell.set_frame_interval(Duration::ZERO);
        shell
    }

    fn press(shell: &mut Shell, button: Button) {
        shell.handle_event(ShellEvent::Button(button));
        shell.drain_commands();
    }

    #[test]
    fn test_builtin_actions_live_in_settings() {
        let dir = tempfile::tempdir().unwrap();
        let shell = shell_with_links(dir.path());
        let menu = shell.menu().borrow();
        let registry = menu.registry();

        let names: Vec<_> = registry.sections().iter().map(|s| s.name.to_string()).collect();
        assert_eq!(names, ["emulators", "games", "settings"]);
        let settings = registry.entries_of(2).unwrap();
        assert_eq!(settings.len(), 6);
        assert!(settings.iter().all(|e| !e.is_application()));
    }

    #[test]
    fn test_power_actions_queue_their_commands() {
        let dir = tempfile::tempdir().unwrap();
        let shell = shell_with_links(dir.path());
        let menu = shell.menu().borrow();
        let settings = menu.registry().entries_of(2).unwrap();
        let suspend = settings.iter().find(|e| e.title == "Suspend").unwrap();

        let (tx, rx) = async_channel::bounded(1);
        suspend.run(&tx);
        // A full queue drops the command instead of blocking
        suspend.run(&tx);
        assert_eq!(rx.len(), 1);
        assert_eq!(rx.try_recv().unwrap(), ShellCommand::Suspend);
    }

    #[test]
    fn test_quit_action_stops_loop() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_with_links(dir.path());

        press(&mut shell, Button::Settings);
        assert_eq!(shell.menu().borrow().selected_section_index(), 2);
        shell.menu().borrow_mut().set_link_index(5);
        assert_eq!(shell.menu().borrow().selected_entry().unwrap().title, "Quit");

        press(&mut shell, Button::Accept);
        assert!(!shell.is_running());
    }

    #[test]
    fn test_context_menu_moves_link() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_with_links(dir.path());
        shell.menu().borrow_mut().set_section_index(1);

        press(&mut shell, Button::Menu);
        assert_eq!(shell.overlay_count(), 1);

        // Delete link, Move link to settings, ...
        press(&mut shell, Button::Down);
        press(&mut shell, Button::Accept);

        let menu = shell.menu().borrow();
        assert_eq!(menu.selected_section_index(), 2);
        assert_eq!(menu.selected_entry().unwrap().title, "Doom");
        assert_eq!(menu.registry().entry_count(1), 1);
        assert!(dir.path().join("user/sections/settings/Doom").exists());
    }

    #[test]
    fn test_context_menu_swallows_input_until_dismissed() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_with_links(dir.path());
        shell.menu().borrow_mut().set_section_index(1);

        press(&mut shell, Button::Menu);
        press(&mut shell, Button::Right);
        assert_eq!(shell.menu().borrow().selected_entry_index(), 0);

        press(&mut shell, Button::Cancel);
        shell.run_animations();
        assert_eq!(shell.overlay_count(), 0);
    }

    #[test]
    fn test_scripted_run_saves_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_with_links(dir.path());
        let events = shell.services().event_sender();

        for button in [Button::AltRight, Button::Right] {
            events.send_blocking(ShellEvent::Button(button)).unwrap();
        }
        events.send_blocking(ShellEvent::Quit).unwrap();
        shell.run().unwrap();

        let saved = LastSelection::load(&paths(dir.path()).last_selection).unwrap();
        assert_eq!(saved, LastSelection { section: 1, link: 1 });
    }

    #[test]
    fn test_output_logs_setting_routes_launch_output() {
        let dir = tempfile::tempdir().unwrap();
        let shell = shell_with_links(dir.path());
        let request = LaunchRequest {
            title: "Doom".into(),
            exec: "/bin/true".into(),
            params: "".into(),
            workdir: dir.path().to_path_buf(),
            log: None,
        };

        assert_eq!(shell.with_launch_log(request.clone()).log, None);

        shell.config.write().output_logs = true;
        let logged = shell.with_launch_log(request);
        assert_eq!(logged.log, Some(paths(dir.path()).launch_log));
    }

    #[test]
    fn test_empty_store_still_has_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = Shell::new(paths(dir.path()), Box::new(MemoryStore::new())).unwrap();

        press(&mut shell, Button::AltRight);
        press(&mut shell, Button::Accept);
        assert_eq!(shell.menu().borrow().registry().len(), 1);
    }
}
