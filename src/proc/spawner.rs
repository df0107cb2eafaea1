// src/proc/spawner.rs

//! Pluggable process spawner.
//!
//! The runtime shell talks to a [`Spawner`] instead of `tokio::process`
//! directly, so tests can substitute a fake that records spawns and
//! scripts completions.
//!
//! [`TokioSpawner`] is the production implementation: it spawns the argv
//! directly (no shell), detaches a waiter task per child, and delivers
//! exactly one `ProcessExited` event once the child has fully exited.
//! `kill` only sends a termination request; the waiter keeps waiting and
//! the completion event still flows through the normal path.

use std::collections::HashMap;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::engine::RuntimeEvent;
use crate::errors::{CleaverError, Result};
use crate::menu::ItemId;
use crate::proc::{ExitKind, Pid};

/// Trait abstracting how child processes are spawned and terminated.
pub trait Spawner {
    /// Start `argv` for `item`. On success the child is running and its
    /// completion will eventually be delivered as a
    /// [`RuntimeEvent::ProcessExited`] carrying the returned pid.
    fn spawn(&mut self, item: ItemId, argv: &[String], command_line: &str) -> Result<Pid>;

    /// Request termination of a previously spawned child. Safe to call
    /// for pids that already finished; does not block for the exit.
    fn kill(&mut self, pid: Pid);

    /// Drop internal state for a child whose completion was delivered.
    fn reap(&mut self, pid: Pid);
}

/// Production spawner built on `tokio::process::Command`.
pub struct TokioSpawner {
    event_tx: mpsc::Sender<RuntimeEvent>,
    kill_handles: HashMap<Pid, oneshot::Sender<()>>,
}

impl TokioSpawner {
    pub fn new(event_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            event_tx,
            kill_handles: HashMap::new(),
        }
    }
}

impl Spawner for TokioSpawner {
    fn spawn(&mut self, item: ItemId, argv: &[String], command_line: &str) -> Result<Pid> {
        let (program, args) = argv.split_first().ok_or_else(|| {
            CleaverError::EmptyCommandLine {
                command_line: command_line.to_string(),
            }
        })?;

        // Output is not captured (exit classification only); null stdio
        // keeps children from interleaving with our own logs.
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| CleaverError::SpawnFailed {
                command_line: command_line.to_string(),
                source,
            })?;

        let pid = match child.id() {
            Some(id) => Pid(id),
            None => {
                // Child already reaped before we saw an id; treat as a
                // spawn failure so nothing gets registered.
                return Err(CleaverError::SpawnFailed {
                    command_line: command_line.to_string(),
                    source: std::io::Error::other("child exited before a pid was assigned"),
                });
            }
        };

        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        self.kill_handles.insert(pid, kill_tx);

        let event_tx = self.event_tx.clone();
        tokio::spawn(wait_for_exit(item, pid, child, kill_rx, event_tx));

        Ok(pid)
    }

    fn kill(&mut self, pid: Pid) {
        match self.kill_handles.remove(&pid) {
            Some(kill_tx) => {
                if kill_tx.send(()).is_err() {
                    debug!(%pid, "process already finished while requesting termination");
                }
            }
            None => {
                debug!(%pid, "no termination handle for pid; process already completed");
            }
        }
    }

    fn reap(&mut self, pid: Pid) {
        self.kill_handles.remove(&pid);
    }
}

/// Waits for one child and delivers its completion exactly once.
///
/// A termination request only issues SIGKILL; the function still waits
/// for the real exit, so the completion event always reflects how the
/// child actually ended.
async fn wait_for_exit(
    item: ItemId,
    pid: Pid,
    mut child: Child,
    mut kill_rx: oneshot::Receiver<()>,
    event_tx: mpsc::Sender<RuntimeEvent>,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        kill = &mut kill_rx => {
            // Only an explicit kill request terminates the child. The
            // receiver also resolves when the sender side is dropped
            // (spawner shutdown); children that nobody asked to kill
            // keep running and we just wait for their natural exit.
            if kill.is_ok() {
                debug!(%pid, "termination requested; sending kill signal");
                if let Err(err) = child.start_kill() {
                    warn!(%pid, error = %err, "failed to signal child");
                }
            }
            child.wait().await
        }
    };

    let exit = match status {
        Ok(status) => ExitKind::from_status(status),
        Err(err) => {
            warn!(%pid, error = %err, "waiting for child failed");
            ExitKind::Exited(-1)
        }
    };

    if event_tx
        .send(RuntimeEvent::ProcessExited { item, pid, exit })
        .await
        .is_err()
    {
        debug!(%pid, "runtime gone before completion could be delivered");
    }
}
