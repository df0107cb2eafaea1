// src/engine/controller.rs

//! Lifecycle owner: loads config, builds the menu tree, tears it down on
//! disable or config change.
//!
//! The controller is the pure core of the engine: it performs no IO
//! beyond reading the config file, owns no channels or timers, and
//! expresses everything else as [`Command`]s for the async shell. That
//! keeps the enable/disable/reload semantics and the item state machines
//! testable without Tokio or real processes.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{loader, validate};
use crate::diag::{Diagnostics, Notifier};
use crate::engine::{Command, RuntimeEvent, SurfaceOp};
use crate::errors::CleaverError;
use crate::menu::{Effect, ItemId, MenuTree, SpawnIntent};
use crate::proc::{ExitKind, Pid};

pub struct ExtensionController {
    config_path: PathBuf,
    notifier: Arc<dyn Notifier>,
    diag: Arc<Diagnostics>,
    tree: Option<MenuTree>,
    enabled: bool,
}

impl std::fmt::Debug for ExtensionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionController")
            .field("config_path", &self.config_path)
            .field("enabled", &self.enabled)
            .field("has_tree", &self.tree.is_some())
            .finish_non_exhaustive()
    }
}

impl ExtensionController {
    pub fn new(config_path: PathBuf, notifier: Arc<dyn Notifier>) -> Self {
        let diag = Arc::new(Diagnostics::bootstrap(notifier.clone()));
        Self {
            config_path,
            notifier,
            diag,
            tree: None,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the controller is showing the error indicator instead of
    /// a menu.
    pub fn in_error_state(&self) -> bool {
        self.enabled && self.tree.is_none()
    }

    /// Load config and install the menu. Idempotent re-entrant restart:
    /// when already enabled, the previous state is fully torn down first.
    ///
    /// Any failure during load, parse or tree build leaves the controller
    /// in the degraded error-display state; a partial menu is never
    /// installed.
    pub fn enable(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.enabled {
            self.diag
                .info("Change of config detected: restarting cleaver.");
            commands.extend(self.disable());
        }
        self.enabled = true;

        let mut warnings = Vec::new();
        let loaded = loader::load_from_path(&self.config_path).and_then(|raw| {
            let settings = validate::parse_settings(&raw.settings, &mut warnings);
            let menu = validate::parse_menu(&raw.menu, &mut warnings)?;
            Ok((settings, menu))
        });

        let (settings, menu) = match loaded {
            Ok(parsed) => parsed,
            Err(err) => {
                // Property warnings collected before the failure still
                // explain why individual values were rejected.
                for warning in warnings {
                    self.diag.warning(warning);
                }
                self.diag.error(format!("Loading config failed: {err}"));
                commands.push(Command::Surface(SurfaceOp::ShowError));
                return commands;
            }
        };

        // Log and notification thresholds come from the validated
        // settings; everything below logs through the new diagnostics.
        self.diag = Arc::new(Diagnostics::new(
            settings.loglevel,
            settings.notificationlevel,
            self.notifier.clone(),
        ));
        for warning in warnings {
            self.diag.warning(warning);
        }
        self.diag
            .debug(format!("Log level at: {}", settings.loglevel));
        match settings.notificationlevel {
            Some(level) => self.diag.debug(format!("Notification level at: {level}")),
            None => self.diag.debug("Notifications are disabled."),
        }

        let mut tree = MenuTree::build(menu, &self.diag);
        commands.push(Command::Surface(SurfaceOp::Install {
            icon: settings.icon,
            nodes: tree.layout(),
        }));
        let diag = self.diag.clone();
        commands.extend(tag_effects(tree.startup(&diag)));
        self.tree = Some(tree);
        commands
    }

    /// Cancel every item and tear down the surface. Always safe to call,
    /// including after a failed enable.
    pub fn disable(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        if let Some(mut tree) = self.tree.take() {
            commands.extend(tag_effects(tree.cancel(&self.diag)));
        }
        self.enabled = false;
        commands.push(Command::Surface(SurfaceOp::Teardown));
        commands
    }

    /// Feed one runtime event into the item state machines.
    pub fn handle_event(&mut self, event: RuntimeEvent) -> Vec<Command> {
        match event {
            RuntimeEvent::ItemActivated { item } => {
                let diag = self.diag.clone();
                let Some(command) = self.find_command(item) else {
                    return Vec::new();
                };
                tag_item_effects(item, command.activate(&diag))
            }
            RuntimeEvent::SwitchToggled { item } => {
                let diag = self.diag.clone();
                let Some(switch) = self.find_switch(item) else {
                    return Vec::new();
                };
                tag_item_effects(item, switch.toggled(&diag))
            }
            RuntimeEvent::CheckTimerFired { item, generation } => {
                let diag = self.diag.clone();
                let Some(switch) = self.find_switch(item) else {
                    return Vec::new();
                };
                tag_item_effects(item, switch.timer_fired(generation, &diag))
            }
            RuntimeEvent::ProcessExited { item, pid, exit } => {
                self.process_exited(item, pid, exit)
            }
            RuntimeEvent::ConfigChanged => self.enable(),
            RuntimeEvent::ShutdownRequested => self.disable(),
        }
    }

    /// A spawn requested by a `Command::Spawn` succeeded. Registration
    /// happens here, in the same event-loop turn as the spawn, before
    /// any completion event for the pid can be dispatched.
    pub fn process_started(
        &mut self,
        item: ItemId,
        intent: SpawnIntent,
        pid: Pid,
        command_line: String,
    ) -> Vec<Command> {
        let diag = self.diag.clone();
        if let Some(command) = self.find_command(item) {
            command.process_started(intent, pid, command_line, &diag);
        } else if let Some(switch) = self.find_switch(item) {
            switch.process_started(intent, pid, command_line, &diag);
        }
        Vec::new()
    }

    /// A spawn requested by a `Command::Spawn` failed; nothing was
    /// registered and the item adjusts its affordance.
    pub fn spawn_failed(
        &mut self,
        item: ItemId,
        intent: SpawnIntent,
        err: &CleaverError,
    ) -> Vec<Command> {
        let diag = self.diag.clone();
        if let Some(command) = self.find_command(item) {
            tag_item_effects(item, command.spawn_failed(intent, err, &diag))
        } else if let Some(switch) = self.find_switch(item) {
            tag_item_effects(item, switch.spawn_failed(intent, err, &diag))
        } else {
            Vec::new()
        }
    }

    fn process_exited(&mut self, item: ItemId, pid: Pid, exit: ExitKind) -> Vec<Command> {
        let diag = self.diag.clone();
        if let Some(command) = self.find_command(item) {
            tag_item_effects(item, command.process_exited(pid, exit, &diag))
        } else if let Some(switch) = self.find_switch(item) {
            tag_item_effects(item, switch.process_exited(pid, exit, &diag))
        } else {
            // Completion for an item from a torn-down tree.
            Vec::new()
        }
    }

    fn find_command(&mut self, item: ItemId) -> Option<&mut crate::menu::CommandItem> {
        self.tree.as_mut()?.find_command(item)
    }

    fn find_switch(&mut self, item: ItemId) -> Option<&mut crate::menu::SwitchItem> {
        self.tree.as_mut()?.find_switch(item)
    }
}

fn tag_effects(effects: Vec<(ItemId, Effect)>) -> Vec<Command> {
    effects
        .into_iter()
        .map(|(item, effect)| tag_effect(item, effect))
        .collect()
}

fn tag_item_effects(item: ItemId, effects: Vec<Effect>) -> Vec<Command> {
    effects
        .into_iter()
        .map(|effect| tag_effect(item, effect))
        .collect()
}

fn tag_effect(item: ItemId, effect: Effect) -> Command {
    match effect {
        Effect::Spawn {
            intent,
            argv,
            command_line,
        } => Command::Spawn {
            item,
            intent,
            argv,
            command_line,
        },
        Effect::Kill { pid } => Command::Kill { pid },
        Effect::ArmTimer { after, generation } => Command::ArmTimer {
            item,
            after,
            generation,
        },
        Effect::DisarmTimer => Command::DisarmTimer { item },
        Effect::SetSensitive(sensitive) => {
            Command::Surface(SurfaceOp::SetSensitive { item, sensitive })
        }
        Effect::SetToggleState(on) => Command::Surface(SurfaceOp::SetToggleState { item, on }),
    }
}
