// src/proc/table.rs

//! Per-item bookkeeping for running child processes.

use std::collections::BTreeMap;

use crate::menu::SpawnIntent;
use crate::proc::Pid;

/// A child process tracked by the item that spawned it.
#[derive(Debug, Clone)]
pub struct RunningProcess {
    pub pid: Pid,
    pub command_line: String,
    /// What the process was spawned for; completion handling dispatches
    /// on this (plain command, switch check, start/stop).
    pub intent: SpawnIntent,
}

/// Mapping from pid to [`RunningProcess`], scoped to one item instance.
///
/// A pid appears in at most one table at a time: insertion happens in the
/// same event-loop turn as the spawn, before the completion event for that
/// pid can be dispatched, and removal happens exactly once.
#[derive(Debug, Default)]
pub struct ProcessTable {
    entries: BTreeMap<Pid, RunningProcess>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, process: RunningProcess) {
        self.entries.insert(process.pid, process);
    }

    pub fn remove(&mut self, pid: Pid) -> Option<RunningProcess> {
        self.entries.remove(&pid)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// An arbitrary tracked pid, if any.
    ///
    /// Used by the killbeforerestart policy, which in practice only ever
    /// sees zero or one entry.
    pub fn any_pid(&self) -> Option<Pid> {
        self.entries.keys().next().copied()
    }

    pub fn pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.entries.keys().copied()
    }
}
