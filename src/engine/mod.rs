// src/engine/mod.rs

//! Orchestration engine for cleaver.
//!
//! The pure core lives in [`controller`]: it consumes [`RuntimeEvent`]s
//! and produces [`Command`]s describing what the IO shell should do. The
//! async shell in [`runtime`] reads events from a channel, executes
//! commands (spawning processes, arming timers, driving the surface) and
//! feeds spawn outcomes straight back into the core, so each event is
//! handled to completion before the next one — the single-threaded
//! cooperative model the item state machines rely on.

pub mod controller;
pub mod runtime;

pub use controller::ExtensionController;
pub use runtime::Runtime;

use std::time::Duration;

use crate::menu::{ItemId, SpawnIntent};
use crate::proc::{ExitKind, Pid};
use crate::surface::SurfaceNode;

/// Events flowing into the runtime from the surface, timers, child
/// process waiters and the config watcher.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A command item was activated on the surface.
    ItemActivated { item: ItemId },
    /// A switch item was toggled on the surface.
    SwitchToggled { item: ItemId },
    /// A switch's check timer fired. Stale generations are ignored.
    CheckTimerFired { item: ItemId, generation: u64 },
    /// A spawned child fully exited. Delivered exactly once per spawn.
    ProcessExited {
        item: ItemId,
        pid: Pid,
        exit: ExitKind,
    },
    /// The config source changed; triggers a full disable + enable cycle.
    ConfigChanged,
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// Commands produced by the pure core for the IO shell.
#[derive(Debug, Clone)]
pub enum Command {
    /// Spawn a child for the given item. The shell reports the result
    /// back via `process_started` / `spawn_failed` on the controller.
    Spawn {
        item: ItemId,
        intent: SpawnIntent,
        argv: Vec<String>,
        command_line: String,
    },
    /// Request termination of a child.
    Kill { pid: Pid },
    /// Arm the single-shot check timer for an item, replacing any
    /// previously armed one.
    ArmTimer {
        item: ItemId,
        after: Duration,
        generation: u64,
    },
    /// Abort a pending timer for an item. A no-op if none is armed.
    DisarmTimer { item: ItemId },
    /// Drive the out-of-scope menu surface.
    Surface(SurfaceOp),
}

/// Operations on the menu surface.
#[derive(Debug, Clone)]
pub enum SurfaceOp {
    /// Install a freshly built menu under the given status icon.
    Install {
        icon: String,
        nodes: Vec<SurfaceNode>,
    },
    SetSensitive { item: ItemId, sensitive: bool },
    SetToggleState { item: ItemId, on: bool },
    /// Show the persistent error indicator (degraded state).
    ShowError,
    /// Tear down whatever is currently displayed.
    Teardown,
}
