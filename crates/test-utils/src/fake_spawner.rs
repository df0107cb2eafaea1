use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use cleaver::engine::RuntimeEvent;
use cleaver::errors::Result;
use cleaver::menu::ItemId;
use cleaver::proc::{ExitKind, Pid, Spawner};

/// Shared record of what a [`FakeSpawner`] was asked to do.
#[derive(Debug, Default)]
pub struct SpawnLog {
    /// Command lines in spawn order.
    pub spawned: Vec<String>,
    /// Pids whose termination was requested.
    pub killed: Vec<Pid>,
}

/// A fake spawner that:
/// - records which command lines were "spawned" and which pids were killed
/// - immediately reports `ProcessExited` for each spawn, with an exit
///   code scripted per command line (default 0).
///
/// Completions go through the runtime event channel like real ones, so
/// the single-threaded ordering of the engine is preserved: the spawn is
/// registered first, the completion is handled as a later event.
pub struct FakeSpawner {
    event_tx: mpsc::Sender<RuntimeEvent>,
    log: Arc<Mutex<SpawnLog>>,
    exit_codes: HashMap<String, i32>,
    next_pid: u32,
}

impl FakeSpawner {
    pub fn new(event_tx: mpsc::Sender<RuntimeEvent>, log: Arc<Mutex<SpawnLog>>) -> Self {
        Self {
            event_tx,
            log,
            exit_codes: HashMap::new(),
            next_pid: 1000,
        }
    }

    /// Script the exit code reported for a given command line.
    pub fn exit_with(mut self, command_line: &str, code: i32) -> Self {
        self.exit_codes.insert(command_line.to_string(), code);
        self
    }
}

impl Spawner for FakeSpawner {
    fn spawn(&mut self, item: ItemId, _argv: &[String], command_line: &str) -> Result<Pid> {
        let pid = Pid(self.next_pid);
        self.next_pid += 1;

        {
            let mut log = self.log.lock().unwrap();
            log.spawned.push(command_line.to_string());
        }

        let code = self.exit_codes.get(command_line).copied().unwrap_or(0);
        let _ = self.event_tx.try_send(RuntimeEvent::ProcessExited {
            item,
            pid,
            exit: ExitKind::Exited(code),
        });
        Ok(pid)
    }

    fn kill(&mut self, pid: Pid) {
        self.log.lock().unwrap().killed.push(pid);
    }

    fn reap(&mut self, _pid: Pid) {}
}
