// tests/tokio_spawner.rs
//
// Exercises the production spawner against real child processes.

mod common;
use crate::common::init_tracing;

use tokio::sync::mpsc;

use cleaver::engine::RuntimeEvent;
use cleaver::errors::CleaverError;
use cleaver::menu::ItemId;
use cleaver::proc::{ExitKind, Pid, Spawner, TokioSpawner};
use cleaver_test_utils::with_timeout;

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

async fn recv_exit(rx: &mut mpsc::Receiver<RuntimeEvent>) -> (Pid, ExitKind) {
    match with_timeout(rx.recv()).await {
        Some(RuntimeEvent::ProcessExited { pid, exit, .. }) => (pid, exit),
        other => panic!("expected a completion event, got {other:?}"),
    }
}

#[tokio::test]
async fn child_survives_spawner_drop() {
    init_tracing();
    let (tx, mut rx) = mpsc::channel(8);
    let mut spawner = TokioSpawner::new(tx);

    let pid = spawner
        .spawn(ItemId(0), &argv(&["sleep", "0.2"]), "sleep 0.2")
        .unwrap();

    // Dropping the spawner drops the kill handles. Nobody requested
    // termination, so the child must run to its natural end instead of
    // being signalled.
    drop(spawner);

    let (exited, exit) = recv_exit(&mut rx).await;
    assert_eq!(exited, pid);
    assert_eq!(exit, ExitKind::Exited(0));
}

#[tokio::test]
async fn kill_reports_how_the_child_actually_ended() {
    init_tracing();
    let (tx, mut rx) = mpsc::channel(8);
    let mut spawner = TokioSpawner::new(tx);

    let pid = spawner
        .spawn(ItemId(0), &argv(&["sleep", "30"]), "sleep 30")
        .unwrap();
    spawner.kill(pid);

    let (exited, exit) = recv_exit(&mut rx).await;
    assert_eq!(exited, pid);
    assert!(matches!(exit, ExitKind::Signaled(_)));
}

#[tokio::test]
async fn kill_after_completion_is_a_no_op() {
    init_tracing();
    let (tx, mut rx) = mpsc::channel(8);
    let mut spawner = TokioSpawner::new(tx);

    let pid = spawner.spawn(ItemId(0), &argv(&["true"]), "true").unwrap();
    let (exited, exit) = recv_exit(&mut rx).await;
    assert_eq!(exited, pid);
    assert_eq!(exit, ExitKind::Exited(0));

    spawner.reap(pid);
    spawner.kill(pid);
}

#[tokio::test]
async fn spawn_failure_reports_the_command_line() {
    init_tracing();
    let (tx, _rx) = mpsc::channel(8);
    let mut spawner = TokioSpawner::new(tx);

    let err = spawner
        .spawn(
            ItemId(0),
            &argv(&["/nonexistent/cleaver-test-bin"]),
            "/nonexistent/cleaver-test-bin",
        )
        .unwrap_err();
    assert!(matches!(err, CleaverError::SpawnFailed { .. }));

    let err = spawner.spawn(ItemId(0), &[], "").unwrap_err();
    assert!(matches!(err, CleaverError::EmptyCommandLine { .. }));
}
