// src/menu/command.rs

//! Fire-and-forget runnable menu item.

use crate::config::model::{CommandConfig, Instancing};
use crate::diag::Diagnostics;
use crate::menu::{Effect, ItemId, SpawnIntent};
use crate::proc::{split_command_line, ExitKind, Pid, ProcessTable, RunningProcess};

/// A menu entry that runs one command, with an instancing policy and an
/// optional kill-on-disable policy.
#[derive(Debug)]
pub struct CommandItem {
    id: ItemId,
    title: String,
    icon: Option<String>,
    command: Option<String>,
    instancing: Instancing,
    kill_on_disable: bool,
    canceled: bool,
    processes: ProcessTable,
}

impl CommandItem {
    pub fn new(id: ItemId, config: CommandConfig, diag: &Diagnostics) -> Self {
        diag.debug(format!("Menu item '{}' initialized.", config.title));
        Self {
            id,
            title: config.title,
            icon: config.icon,
            command: config.command,
            instancing: config.instancing,
            kill_on_disable: config.kill_on_disable,
            canceled: false,
            processes: ProcessTable::new(),
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Whether the item starts out clickable: only when a command exists.
    pub fn initially_sensitive(&self) -> bool {
        self.command.is_some()
    }

    /// The user activated the item.
    pub fn activate(&mut self, diag: &Diagnostics) -> Vec<Effect> {
        if self.canceled {
            return Vec::new();
        }
        let Some(command) = self.command.clone() else {
            return Vec::new();
        };

        if self.instancing == Instancing::KillBeforeRestart {
            if let Some(pid) = self.processes.any_pid() {
                diag.info(format!(
                    "Process for '{}' [{pid}] is still running. \
                     Termination signal will be issued before restarting.",
                    self.title
                ));
                return vec![Effect::Kill { pid }];
            }
        }

        let mut effects = Vec::new();
        if self.instancing == Instancing::SingleInstance {
            if !self.processes.is_empty() {
                // The affordance is disabled while a process is
                // outstanding, but the engine enforces the policy as well.
                diag.debug(format!(
                    "'{}' is single-instance and already running; not spawning again.",
                    self.title
                ));
                return effects;
            }
            effects.push(Effect::SetSensitive(false));
        }

        match split_command_line(&command) {
            Ok(argv) => effects.push(Effect::Spawn {
                intent: SpawnIntent::Run,
                argv,
                command_line: command,
            }),
            Err(err) => {
                diag.error(format!(
                    "Spawning process for '{}' failed: {err}",
                    self.title
                ));
                effects.push(Effect::SetSensitive(false));
            }
        }
        effects
    }

    /// A spawn requested by [`activate`](Self::activate) succeeded;
    /// register the child before its completion can be dispatched.
    pub fn process_started(
        &mut self,
        intent: SpawnIntent,
        pid: Pid,
        command_line: String,
        diag: &Diagnostics,
    ) {
        diag.debug(format!("Process for '{}' [{pid}] started.", self.title));
        self.processes.insert(RunningProcess {
            pid,
            command_line,
            intent,
        });
    }

    /// A spawn requested by [`activate`](Self::activate) failed; nothing
    /// was registered.
    pub fn spawn_failed(
        &mut self,
        _intent: SpawnIntent,
        err: &crate::errors::CleaverError,
        diag: &Diagnostics,
    ) -> Vec<Effect> {
        diag.error(format!(
            "Spawning process for '{}' failed: {err}",
            self.title
        ));
        vec![Effect::SetSensitive(false)]
    }

    /// Completion notification for a tracked child.
    pub fn process_exited(&mut self, pid: Pid, exit: ExitKind, diag: &Diagnostics) -> Vec<Effect> {
        if self.processes.remove(pid).is_none() {
            return Vec::new();
        }
        match exit {
            ExitKind::Signaled(signal) => diag.warning(format!(
                "Process for '{}' [{pid}] was terminated by signal: {signal}.",
                self.title
            )),
            ExitKind::Exited(code) if code != 0 => diag.warning(format!(
                "Process for '{}' [{pid}] finished with return code: {code}.",
                self.title
            )),
            ExitKind::Exited(_) => diag.info(format!(
                "Process for '{}' [{pid}] finished without error.",
                self.title
            )),
        }
        if self.canceled {
            Vec::new()
        } else {
            vec![Effect::SetSensitive(true)]
        }
    }

    /// Absorbing cancellation; idempotent.
    pub fn cancel(&mut self, diag: &Diagnostics) -> Vec<Effect> {
        if self.canceled {
            return Vec::new();
        }
        diag.debug(format!("Cancel called for '{}'.", self.title));
        self.canceled = true;
        if !self.kill_on_disable {
            return Vec::new();
        }
        let mut effects = Vec::new();
        for pid in self.processes.pids() {
            diag.info(format!(
                "Process for '{}' [{pid}] is still running. Termination signal will be issued.",
                self.title
            ));
            effects.push(Effect::Kill { pid });
        }
        effects
    }
}
