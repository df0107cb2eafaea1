// tests/runtime_fake_spawner.rs
//
// End-to-end runtime tests against a fake spawner: real event loop and
// controller, scripted process completions, recorded surface calls.

mod common;
use crate::common::init_tracing;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;

use cleaver::diag::StderrNotifier;
use cleaver::engine::{ExtensionController, Runtime, RuntimeEvent};
use cleaver::menu::ItemId;
use cleaver::surface::mock::{RecordingSurface, SurfaceCall};
use cleaver_test_utils::builders::{CommandItemBuilder, ConfigBuilder, SwitchItemBuilder};
use cleaver_test_utils::fake_spawner::{FakeSpawner, SpawnLog};
use cleaver_test_utils::with_timeout;

fn write_config(config: ConfigBuilder) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("cleaver.json");
    config.write_to(&path);
    (dir, path)
}

struct Harness {
    _dir: TempDir,
    event_tx: mpsc::Sender<RuntimeEvent>,
    log: Arc<Mutex<SpawnLog>>,
    surface: RecordingSurface,
    runtime: Runtime<FakeSpawner, RecordingSurface>,
}

impl Harness {
    fn new(config: ConfigBuilder, script: impl FnOnce(FakeSpawner) -> FakeSpawner) -> Self {
        let (dir, path) = write_config(config);
        let (event_tx, event_rx) = mpsc::channel::<RuntimeEvent>(64);
        let log = Arc::new(Mutex::new(SpawnLog::default()));
        let spawner = script(FakeSpawner::new(event_tx.clone(), log.clone()));
        let surface = RecordingSurface::new();
        let controller = ExtensionController::new(path, Arc::new(StderrNotifier));
        let runtime = Runtime::new(
            controller,
            event_rx,
            event_tx.clone(),
            spawner,
            surface.clone(),
        );
        Self {
            _dir: dir,
            event_tx,
            log,
            surface,
            runtime,
        }
    }

}

#[tokio::test]
async fn activation_spawns_and_shutdown_tears_down() {
    init_tracing();
    let harness = Harness::new(
        ConfigBuilder::new().item(
            CommandItemBuilder::new("Hello")
                .command("echo hello")
                .build(),
        ),
        |spawner| spawner,
    );

    // Queue the whole scenario up front; the loop drains it in order.
    harness
        .event_tx
        .send(RuntimeEvent::ItemActivated { item: ItemId(0) })
        .await
        .unwrap();
    harness
        .event_tx
        .send(RuntimeEvent::ShutdownRequested)
        .await
        .unwrap();

    let surface = harness.surface.clone();
    let spawned = harness.log.clone();
    with_timeout(harness.runtime.run()).await.unwrap();

    assert_eq!(spawned.lock().unwrap().spawned, vec!["echo hello"]);

    let calls = surface.calls();
    assert!(matches!(calls.first(), Some(SurfaceCall::Install { .. })));
    assert_eq!(calls.last(), Some(&SurfaceCall::Teardown));
}

#[tokio::test]
async fn switch_check_result_reaches_the_surface() {
    init_tracing();
    let harness = Harness::new(
        ConfigBuilder::new().item(
            SwitchItemBuilder::new("Picom")
                .check("pgrep picom")
                .start("picom -b")
                .stop("pkill picom")
                .interval_ms(60_000)
                .build(),
        ),
        // The compositor is not running.
        |spawner| spawner.exit_with("pgrep picom", 1),
    );

    let event_tx = harness.event_tx.clone();
    let surface = harness.surface.clone();
    let spawned_log = harness.log.clone();

    let runtime = tokio::spawn(harness.runtime.run());

    // Give the startup check and its completion a chance to flow through
    // the loop, then stop.
    tokio::time::sleep(Duration::from_millis(100)).await;
    event_tx.send(RuntimeEvent::ShutdownRequested).await.unwrap();
    with_timeout(runtime).await.expect("runtime task").unwrap();

    assert_eq!(spawned_log.lock().unwrap().spawned, vec!["pgrep picom"]);

    let calls = surface.calls();
    assert!(calls.contains(&SurfaceCall::SetToggleState {
        item: ItemId(0),
        on: false,
    }));
    assert!(calls.contains(&SurfaceCall::SetSensitive {
        item: ItemId(0),
        sensitive: true,
    }));
}

#[tokio::test]
async fn toggle_runs_start_then_recheck_updates_the_widget() {
    init_tracing();
    let harness = Harness::new(
        ConfigBuilder::new().item(
            SwitchItemBuilder::new("Picom")
                .check("pgrep picom")
                .start("picom -b")
                .stop("pkill picom")
                .interval_ms(60_000)
                .build(),
        ),
        // The check passes (default exit 0), so the switch settles on
        // "on" and the manual toggle runs the stop command.
        |spawner| spawner,
    );

    let event_tx = harness.event_tx.clone();
    let surface = harness.surface.clone();
    let spawned_log = harness.log.clone();

    let runtime = tokio::spawn(harness.runtime.run());
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Manual toggle while the switch shows "on" (check exit 0): runs stop,
    // then the re-check runs again.
    event_tx
        .send(RuntimeEvent::SwitchToggled { item: ItemId(0) })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    event_tx.send(RuntimeEvent::ShutdownRequested).await.unwrap();
    with_timeout(runtime).await.expect("runtime task").unwrap();

    let spawned = spawned_log.lock().unwrap().spawned.clone();
    assert_eq!(
        spawned,
        vec!["pgrep picom", "pkill picom", "pgrep picom"]
    );

    let calls = surface.calls();
    // The manual flow blocked the affordance, then the re-check restored
    // it along with the toggle state.
    assert!(calls.contains(&SurfaceCall::SetSensitive {
        item: ItemId(0),
        sensitive: false,
    }));
    assert!(calls.contains(&SurfaceCall::SetToggleState {
        item: ItemId(0),
        on: true,
    }));
}

#[tokio::test]
async fn config_change_reinstalls_the_menu() {
    init_tracing();
    let harness = Harness::new(
        ConfigBuilder::new().item(
            CommandItemBuilder::new("Hello")
                .command("echo hello")
                .build(),
        ),
        |spawner| spawner,
    );

    harness.event_tx.send(RuntimeEvent::ConfigChanged).await.unwrap();
    harness
        .event_tx
        .send(RuntimeEvent::ShutdownRequested)
        .await
        .unwrap();

    let surface = harness.surface.clone();
    with_timeout(harness.runtime.run()).await.unwrap();

    let installs = surface
        .calls()
        .iter()
        .filter(|call| matches!(call, SurfaceCall::Install { .. }))
        .count();
    assert_eq!(installs, 2);
}
