// src/menu/mod.rs

//! Menu item kinds and the tree that composes them.
//!
//! Items are deliberately pure state machines: every transition takes the
//! triggering input plus a [`Diagnostics`](crate::diag::Diagnostics)
//! handle and returns a list of [`Effect`]s for the IO shell to execute
//! (spawn a process, kill one, arm a timer, drive the surface). This is
//! what makes the interleaving-heavy switch semantics unit-testable
//! without Tokio or real processes.
//!
//! - [`command`] is the fire-and-forget runnable item.
//! - [`switch`] is the check-driven toggle state machine.
//! - [`tree`] composes items, submenus and separators.

pub mod command;
pub mod switch;
pub mod tree;

pub use command::CommandItem;
pub use switch::{SwitchItem, Toggle};
pub use tree::{MenuItem, MenuTree, SubMenu};

use std::time::Duration;

use crate::proc::Pid;

/// Identifier for an item within one built menu tree.
///
/// Assigned during the tree build; not stable across rebuilds. Events
/// addressed to an id from a torn-down tree simply find no item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u32);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a spawned process is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnIntent {
    /// A command item's command.
    Run,
    /// A switch's check command. `automatic` distinguishes the periodic
    /// self-check cycle from a manually triggered re-check.
    Check { automatic: bool },
    /// A switch's start (`turning_on`) or stop command.
    Toggle { turning_on: bool },
}

/// Side effect requested by an item transition, executed by the runtime
/// shell on the item's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Spawn `argv` and report the outcome back to this item.
    Spawn {
        intent: SpawnIntent,
        argv: Vec<String>,
        command_line: String,
    },
    /// Request termination of a tracked process. The table entry is only
    /// removed once the real completion event arrives.
    Kill { pid: Pid },
    /// Arm the item's single-shot check timer.
    ArmTimer { after: Duration, generation: u64 },
    /// Abort a previously armed timer, if it has not fired yet.
    DisarmTimer,
    /// Enable or disable the item's UI affordance.
    SetSensitive(bool),
    /// Reflect the derived on/off state into the toggle widget.
    SetToggleState(bool),
}
