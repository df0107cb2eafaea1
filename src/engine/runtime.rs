// src/engine/runtime.rs

use std::collections::{HashMap, VecDeque};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::engine::{Command, RuntimeEvent, SurfaceOp};
use crate::errors::Result;
use crate::menu::ItemId;
use crate::proc::Spawner;
use crate::surface::MenuSurface;

use super::controller::ExtensionController;

/// Async IO shell around [`ExtensionController`].
///
/// Reads events from the channel one at a time and executes the
/// resulting commands to completion before the next event is handled:
/// UI activations, timer firings and process completions never interleave
/// within an item, which is the concurrency model the item state
/// machines are written against.
pub struct Runtime<S: Spawner, U: MenuSurface> {
    controller: ExtensionController,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    event_tx: mpsc::Sender<RuntimeEvent>,
    spawner: S,
    surface: U,
    timers: HashMap<ItemId, JoinHandle<()>>,
}

impl<S: Spawner, U: MenuSurface> Runtime<S, U> {
    pub fn new(
        controller: ExtensionController,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        event_tx: mpsc::Sender<RuntimeEvent>,
        spawner: S,
        surface: U,
    ) -> Self {
        Self {
            controller,
            event_rx,
            event_tx,
            spawner,
            surface,
            timers: HashMap::new(),
        }
    }

    /// Main event loop. Enables the controller first, then runs until
    /// shutdown is requested or the event channel closes.
    pub async fn run(mut self) -> Result<()> {
        info!("cleaver runtime started");

        let initial = self.controller.enable();
        self.execute_all(initial);

        loop {
            let event = match self.event_rx.recv().await {
                Some(event) => event,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let shutdown = matches!(event, RuntimeEvent::ShutdownRequested);
            if let RuntimeEvent::ProcessExited { pid, .. } = &event {
                self.spawner.reap(*pid);
            }

            let commands = self.controller.handle_event(event);
            self.execute_all(commands);

            if shutdown {
                info!("shutdown requested; stopping runtime");
                break;
            }
        }

        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
        info!("runtime exiting");
        Ok(())
    }

    /// Execute commands, feeding spawn outcomes back into the controller
    /// until the queue drains. Everything here is synchronous, so one
    /// event is always fully handled before the next is received.
    fn execute_all(&mut self, commands: Vec<Command>) {
        let mut queue: VecDeque<Command> = commands.into();
        while let Some(command) = queue.pop_front() {
            match command {
                Command::Spawn {
                    item,
                    intent,
                    argv,
                    command_line,
                } => match self.spawner.spawn(item, &argv, &command_line) {
                    Ok(pid) => {
                        queue.extend(
                            self.controller
                                .process_started(item, intent, pid, command_line),
                        );
                    }
                    Err(err) => {
                        queue.extend(self.controller.spawn_failed(item, intent, &err));
                    }
                },
                Command::Kill { pid } => self.spawner.kill(pid),
                Command::ArmTimer {
                    item,
                    after,
                    generation,
                } => self.arm_timer(item, after, generation),
                Command::DisarmTimer { item } => {
                    if let Some(timer) = self.timers.remove(&item) {
                        timer.abort();
                    }
                }
                Command::Surface(op) => self.apply_surface(op),
            }
        }
    }

    fn arm_timer(&mut self, item: ItemId, after: std::time::Duration, generation: u64) {
        if let Some(previous) = self.timers.remove(&item) {
            previous.abort();
        }
        let event_tx = self.event_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = event_tx
                .send(RuntimeEvent::CheckTimerFired { item, generation })
                .await;
        });
        self.timers.insert(item, handle);
    }

    fn apply_surface(&mut self, op: SurfaceOp) {
        match op {
            SurfaceOp::Install { icon, nodes } => self.surface.install(&icon, &nodes),
            SurfaceOp::SetSensitive { item, sensitive } => {
                self.surface.set_sensitive(item, sensitive);
            }
            SurfaceOp::SetToggleState { item, on } => self.surface.set_toggle_state(item, on),
            SurfaceOp::ShowError => self.surface.show_error(),
            SurfaceOp::Teardown => {
                // Timers belong to the torn-down tree.
                for (_, timer) in self.timers.drain() {
                    timer.abort();
                }
                self.surface.teardown();
            }
        }
    }
}
