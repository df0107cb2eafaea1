// src/menu/switch.rs

//! Check-driven toggle menu item.
//!
//! A switch derives its on/off state from a recurring check command: exit
//! status 0 means "on", anything else means "off". The user can override
//! the state manually, which runs the start/stop command and then
//! re-runs the check rather than trusting the start/stop exit code.
//!
//! Two interleavings make this the most intricate state machine here:
//!
//! - A manual switch can arrive while an automatically scheduled check is
//!   already in flight. The check still runs (the spawned process must be
//!   tracked to completion), but its result is discarded so it cannot
//!   overwrite the state the user just changed. The re-check triggered by
//!   the manual switch governs the final state.
//! - Cancellation can arrive between any spawn and its completion. The
//!   absorbing `canceled` flag is checked at the top of every transition.

use std::time::Duration;

use crate::config::model::SwitchConfig;
use crate::diag::Diagnostics;
use crate::menu::{Effect, ItemId, SpawnIntent};
use crate::proc::{split_command_line, ExitKind, Pid, ProcessTable, RunningProcess};

/// Displayed toggle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
    /// No check has completed yet.
    Unknown,
}

/// Whether the switch is in its periodic self-check cycle or was just
/// switched manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Interval,
    ManualOverride,
}

#[derive(Debug)]
pub struct SwitchItem {
    id: ItemId,
    title: String,
    icon: Option<String>,
    start: Option<String>,
    stop: Option<String>,
    check: Option<String>,
    interval: Duration,
    canceled: bool,
    mode: Mode,
    toggle: Toggle,
    /// Bumped whenever the pending timer is disarmed, so an already
    /// delivered timer event is recognised as stale.
    timer_generation: u64,
    timer_armed: bool,
    processes: ProcessTable,
}

impl SwitchItem {
    pub fn new(id: ItemId, config: SwitchConfig, diag: &Diagnostics) -> Self {
        diag.debug(format!("Menu item '{}' initialized.", config.title));
        Self {
            id,
            title: config.title,
            icon: config.icon,
            start: config.start,
            stop: config.stop,
            check: config.check,
            interval: config.interval,
            canceled: false,
            mode: Mode::Interval,
            toggle: Toggle::Unknown,
            timer_generation: 0,
            timer_armed: false,
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

    pub fn toggle_state(&self) -> Toggle {
        self.toggle
    }

    /// Kick off the first check. Without a check command the switch is
    /// reported once and stays permanently disabled.
    pub fn startup(&mut self, diag: &Diagnostics) -> Vec<Effect> {
        if self.check.is_some() {
            self.run_check(true, diag)
        } else {
            diag.error(format!(
                "Switch '{}' has no check command defined. Switch is disabled.",
                self.title
            ));
            Vec::new()
        }
    }

    /// The armed timer fired. Stale generations (disarmed or replaced
    /// timers whose event was already in flight) are ignored.
    pub fn timer_fired(&mut self, generation: u64, diag: &Diagnostics) -> Vec<Effect> {
        if !self.timer_armed || generation != self.timer_generation {
            diag.debug(format!(
                "Stale check timer for switch '{}' ignored.",
                self.title
            ));
            return Vec::new();
        }
        self.timer_armed = false;
        self.run_check(true, diag)
    }

    /// Spawn the check command.
    ///
    /// Cancels any pending timer first. Even if a manual switch is in
    /// progress, an automatic check that got this far still runs; its
    /// result is discarded on completion so the spawned process is never
    /// silently dropped from tracking.
    fn run_check(&mut self, automatic: bool, diag: &Diagnostics) -> Vec<Effect> {
        let mut effects = self.disarm_timer();
        if self.canceled {
            return effects;
        }
        let Some(check) = self.check.clone() else {
            return effects;
        };

        match split_command_line(&check) {
            Ok(argv) => effects.push(Effect::Spawn {
                intent: SpawnIntent::Check { automatic },
                argv,
                command_line: check,
            }),
            Err(err) => {
                diag.error(format!(
                    "Spawning the check process for switch '{}' failed: {err}. \
                     Switch is disabled.",
                    self.title
                ));
                effects.push(Effect::SetSensitive(false));
            }
        }
        effects
    }

    /// The user toggled the switch.
    pub fn toggled(&mut self, diag: &Diagnostics) -> Vec<Effect> {
        if self.canceled {
            return Vec::new();
        }

        // Block further interaction until the follow-up check completes,
        // and stop the automatic cycle: we are now in manual territory.
        let mut effects = vec![Effect::SetSensitive(false)];
        effects.extend(self.disarm_timer());
        self.mode = Mode::ManualOverride;

        let turning_on = self.toggle != Toggle::On;
        let command = if turning_on {
            self.start.clone()
        } else {
            self.stop.clone()
        };
        let which = if turning_on { "start" } else { "stop" };

        let Some(command) = command else {
            diag.error(format!(
                "Switch '{}' has no {which} command defined. Switch is disabled.",
                self.title
            ));
            return effects;
        };

        match split_command_line(&command) {
            Ok(argv) => effects.push(Effect::Spawn {
                intent: SpawnIntent::Toggle { turning_on },
                argv,
                command_line: command,
            }),
            Err(err) => {
                diag.error(format!(
                    "Spawning {which} process for switch '{}' failed: {err}. \
                     Switch is disabled.",
                    self.title
                ));
            }
        }
        effects
    }

    pub fn process_started(
        &mut self,
        intent: SpawnIntent,
        pid: Pid,
        command_line: String,
        diag: &Diagnostics,
    ) {
        match intent {
            SpawnIntent::Check { .. } => diag.debug(format!(
                "Check process for switch '{}' [{pid}] started.",
                self.title
            )),
            SpawnIntent::Toggle { turning_on: true } => diag.debug(format!(
                "Start process for switch '{}' [{pid}] started.",
                self.title
            )),
            SpawnIntent::Toggle { turning_on: false } => diag.debug(format!(
                "Stop process for switch '{}' [{pid}] started.",
                self.title
            )),
            SpawnIntent::Run => {}
        }
        self.processes.insert(RunningProcess {
            pid,
            command_line,
            intent,
        });
    }

    pub fn spawn_failed(
        &mut self,
        intent: SpawnIntent,
        err: &crate::errors::CleaverError,
        diag: &Diagnostics,
    ) -> Vec<Effect> {
        let what = match intent {
            SpawnIntent::Check { .. } => "the check",
            SpawnIntent::Toggle { turning_on: true } => "start",
            SpawnIntent::Toggle { turning_on: false } => "stop",
            SpawnIntent::Run => "the",
        };
        diag.error(format!(
            "Spawning {what} process for switch '{}' failed: {err}. Switch is disabled.",
            self.title
        ));
        vec![Effect::SetSensitive(false)]
    }

    /// Completion notification for a tracked child; dispatches on what
    /// the process was spawned for.
    pub fn process_exited(&mut self, pid: Pid, exit: ExitKind, diag: &Diagnostics) -> Vec<Effect> {
        let Some(process) = self.processes.remove(pid) else {
            return Vec::new();
        };
        match process.intent {
            SpawnIntent::Check { automatic } => self.check_finished(pid, automatic, exit, diag),
            SpawnIntent::Toggle { turning_on } => self.toggle_finished(pid, turning_on, exit, diag),
            SpawnIntent::Run => Vec::new(),
        }
    }

    /// The check command completed.
    fn check_finished(
        &mut self,
        pid: Pid,
        automatic: bool,
        exit: ExitKind,
        diag: &Diagnostics,
    ) -> Vec<Effect> {
        if self.canceled {
            return Vec::new();
        }

        let code = match exit {
            ExitKind::Signaled(signal) => {
                diag.warning(format!(
                    "Check process for switch '{}' [{pid}] was terminated by signal: {signal}. \
                     No more checks will be scheduled.",
                    self.title
                ));
                return Vec::new();
            }
            ExitKind::Exited(code) => code,
        };

        if automatic && self.mode == Mode::ManualOverride {
            // A manual switch happened while this automatic check was in
            // flight; its re-check governs the state, not this result.
            diag.debug(format!(
                "Check process for switch '{}' [{pid}] exited; result is ignored \
                 due to a manual switch in the meantime.",
                self.title
            ));
            return Vec::new();
        }

        let on = code == 0;
        if on {
            diag.debug(format!(
                "Check process for switch '{}' [{pid}] exited without error: switch is turned on.",
                self.title
            ));
        } else {
            diag.debug(format!(
                "Check process for switch '{}' [{pid}] exited with return code: {code}: \
                 switch is turned off.",
                self.title
            ));
        }

        self.toggle = if on { Toggle::On } else { Toggle::Off };
        let mut effects = vec![Effect::SetToggleState(on)];

        // Only clickable if the command for the opposite transition exists.
        let actionable = if on {
            self.stop.is_some()
        } else {
            self.start.is_some()
        };
        if actionable {
            effects.push(Effect::SetSensitive(true));
        }

        self.mode = Mode::Interval;
        self.timer_generation += 1;
        self.timer_armed = true;
        effects.push(Effect::ArmTimer {
            after: self.interval,
            generation: self.timer_generation,
        });
        effects
    }

    /// The start/stop command completed. The exit code is logged but
    /// never trusted as state: a re-check re-derives the displayed state.
    fn toggle_finished(
        &mut self,
        pid: Pid,
        turning_on: bool,
        exit: ExitKind,
        diag: &Diagnostics,
    ) -> Vec<Effect> {
        if self.canceled {
            return Vec::new();
        }

        let which = if turning_on { "Start" } else { "Stop" };
        match exit {
            ExitKind::Signaled(signal) => diag.warning(format!(
                "{which} process for switch '{}' [{pid}] was terminated by signal: {signal}.",
                self.title
            )),
            ExitKind::Exited(code) if code != 0 => diag.warning(format!(
                "{which} process for switch '{}' [{pid}] finished with return code: {code}.",
                self.title
            )),
            ExitKind::Exited(_) => diag.debug(format!(
                "{which} process for switch '{}' [{pid}] finished without error.",
                self.title
            )),
        }

        self.run_check(false, diag)
    }

    /// Absorbing cancellation; idempotent.
    pub fn cancel(&mut self, diag: &Diagnostics) -> Vec<Effect> {
        if self.canceled {
            return Vec::new();
        }
        diag.debug(format!("Cancel called for '{}'.", self.title));
        self.canceled = true;
        let mut effects = self.disarm_timer();
        // Blocks any automatic rescheduling that might still be decided
        // from an in-flight completion.
        self.mode = Mode::ManualOverride;
        for pid in self.processes.pids() {
            diag.info(format!(
                "Process for switch '{}' [{pid}] is still running. \
                 Termination signal will be issued.",
                self.title
            ));
            effects.push(Effect::Kill { pid });
        }
        effects
    }

    fn disarm_timer(&mut self) -> Vec<Effect> {
        self.timer_generation += 1;
        if self.timer_armed {
            self.timer_armed = false;
            vec![Effect::DisarmTimer]
        } else {
            Vec::new()
        }
    }
}
