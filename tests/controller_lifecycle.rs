// tests/controller_lifecycle.rs

mod common;
use crate::common::init_tracing;

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use cleaver::diag::StderrNotifier;
use cleaver::engine::{Command, ExtensionController, RuntimeEvent, SurfaceOp};
use cleaver::menu::{ItemId, SpawnIntent};
use cleaver::proc::{ExitKind, Pid};
use cleaver::surface::SurfaceNode;
use cleaver_test_utils::builders::{CommandItemBuilder, ConfigBuilder, SwitchItemBuilder};

struct Fixture {
    _dir: TempDir,
    config_path: PathBuf,
}

impl Fixture {
    fn new(config: ConfigBuilder) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let config_path = dir.path().join("cleaver.json");
        config.write_to(&config_path);
        Self {
            _dir: dir,
            config_path,
        }
    }

    fn controller(&self) -> ExtensionController {
        ExtensionController::new(self.config_path.clone(), Arc::new(StderrNotifier))
    }

    fn rewrite(&self, config: ConfigBuilder) {
        config.write_to(&self.config_path);
    }
}

fn basic_config() -> ConfigBuilder {
    ConfigBuilder::new()
        .loglevel("debug")
        .item(
            CommandItemBuilder::new("Lock")
                .command("loginctl lock-session")
                .build(),
        )
        .item(
            SwitchItemBuilder::new("Picom")
                .check("pgrep picom")
                .start("picom -b")
                .stop("pkill picom")
                .interval_ms(60_000)
                .build(),
        )
}

fn install_nodes(commands: &[Command]) -> Option<&[SurfaceNode]> {
    commands.iter().find_map(|command| match command {
        Command::Surface(SurfaceOp::Install { nodes, .. }) => Some(nodes.as_slice()),
        _ => None,
    })
}

fn spawns(commands: &[Command]) -> Vec<(ItemId, SpawnIntent, String)> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::Spawn {
                item,
                intent,
                command_line,
                ..
            } => Some((*item, *intent, command_line.clone())),
            _ => None,
        })
        .collect()
}

fn kills(commands: &[Command]) -> Vec<Pid> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::Kill { pid } => Some(*pid),
            _ => None,
        })
        .collect()
}

fn shows_error(commands: &[Command]) -> bool {
    commands
        .iter()
        .any(|command| matches!(command, Command::Surface(SurfaceOp::ShowError)))
}

#[test]
fn enable_installs_menu_and_starts_switch_checks() {
    init_tracing();
    let fixture = Fixture::new(basic_config());
    let mut controller = fixture.controller();

    let commands = controller.enable();
    assert!(controller.is_enabled());
    assert!(!controller.in_error_state());

    let nodes = install_nodes(&commands).expect("menu installed");
    assert_eq!(nodes.len(), 2);
    assert!(matches!(
        &nodes[0],
        SurfaceNode::Command { id: ItemId(0), title, enabled: true, .. } if title == "Lock"
    ));
    assert!(matches!(
        &nodes[1],
        SurfaceNode::Switch { id: ItemId(1), title, .. } if title == "Picom"
    ));

    // The switch fires its first check at startup; the command item
    // waits for activation.
    assert_eq!(
        spawns(&commands),
        vec![(
            ItemId(1),
            SpawnIntent::Check { automatic: true },
            "pgrep picom".to_string()
        )]
    );
}

#[test]
fn command_without_command_line_renders_disabled() {
    let fixture = Fixture::new(
        ConfigBuilder::new().item(CommandItemBuilder::new("Inert").build()),
    );
    let mut controller = fixture.controller();
    let commands = controller.enable();
    let nodes = install_nodes(&commands).expect("menu installed");
    assert!(matches!(
        &nodes[0],
        SurfaceNode::Command { enabled: false, .. }
    ));
}

#[test]
fn activation_routes_to_the_item() {
    let fixture = Fixture::new(basic_config());
    let mut controller = fixture.controller();
    controller.enable();

    let commands = controller.handle_event(RuntimeEvent::ItemActivated { item: ItemId(0) });
    assert_eq!(
        spawns(&commands),
        vec![(
            ItemId(0),
            SpawnIntent::Run,
            "loginctl lock-session".to_string()
        )]
    );
}

#[test]
fn events_for_unknown_items_are_ignored() {
    let fixture = Fixture::new(basic_config());
    let mut controller = fixture.controller();
    controller.enable();

    assert!(controller
        .handle_event(RuntimeEvent::ItemActivated { item: ItemId(99) })
        .is_empty());
    assert!(controller
        .handle_event(RuntimeEvent::ProcessExited {
            item: ItemId(99),
            pid: Pid(1),
            exit: ExitKind::Exited(0),
        })
        .is_empty());
    // A switch event addressed to a command item finds no switch.
    assert!(controller
        .handle_event(RuntimeEvent::SwitchToggled { item: ItemId(0) })
        .is_empty());
}

#[test]
fn broken_config_shows_error_and_recovers_on_change() {
    let fixture = Fixture::new(basic_config());
    std::fs::write(&fixture.config_path, "{ this is not json").expect("write");

    let mut controller = fixture.controller();
    let commands = controller.enable();
    assert!(shows_error(&commands));
    assert!(controller.in_error_state());
    assert!(install_nodes(&commands).is_none());

    // The user fixes the file; the watcher reports a change.
    fixture.rewrite(basic_config());
    let commands = controller.handle_event(RuntimeEvent::ConfigChanged);
    assert!(!controller.in_error_state());
    assert!(install_nodes(&commands).is_some());
}

#[test]
fn invalid_menu_item_fails_the_whole_menu() {
    let fixture = Fixture::new(
        ConfigBuilder::new()
            .item(CommandItemBuilder::new("ok").command("true").build())
            .item(serde_json::json!({ "type": "frobnicator" })),
    );
    let mut controller = fixture.controller();
    let commands = controller.enable();
    assert!(shows_error(&commands));
    assert!(install_nodes(&commands).is_none());
}

#[test]
fn disable_kills_tracked_processes_and_tears_down_last() {
    let fixture = Fixture::new(basic_config());
    let mut controller = fixture.controller();
    controller.enable();

    controller.handle_event(RuntimeEvent::ItemActivated { item: ItemId(0) });
    controller.process_started(
        ItemId(0),
        SpawnIntent::Run,
        Pid(7),
        "loginctl lock-session".to_string(),
    );

    let commands = controller.disable();
    assert_eq!(kills(&commands), vec![Pid(7)]);
    assert!(matches!(
        commands.last(),
        Some(Command::Surface(SurfaceOp::Teardown))
    ));
    assert!(!controller.is_enabled());

    // A late completion for the killed child is dropped silently.
    let commands = controller.handle_event(RuntimeEvent::ProcessExited {
        item: ItemId(0),
        pid: Pid(7),
        exit: ExitKind::Signaled(9),
    });
    assert!(commands.is_empty());
}

#[test]
fn config_change_restarts_with_teardown_before_install() {
    let fixture = Fixture::new(basic_config());
    let mut controller = fixture.controller();
    controller.enable();

    let commands = controller.handle_event(RuntimeEvent::ConfigChanged);
    let teardown = commands
        .iter()
        .position(|command| matches!(command, Command::Surface(SurfaceOp::Teardown)))
        .expect("previous menu torn down");
    let install = commands
        .iter()
        .position(|command| matches!(command, Command::Surface(SurfaceOp::Install { .. })))
        .expect("new menu installed");
    assert!(teardown < install);
}

#[test]
fn property_warnings_coexist_with_a_failing_menu() {
    // Bad property values produce warnings before the invalid entry
    // aborts the menu; both paths run without losing the error display.
    let fixture = Fixture::new(
        ConfigBuilder::new()
            .loglevel("verbose")
            .item(CommandItemBuilder::new("ok").command("true").build())
            .item(serde_json::json!({ "type": "command", "title": 42, "instancing": "always" }))
            .item(serde_json::json!({ "type": "frobnicator" })),
    );
    let mut controller = fixture.controller();
    let commands = controller.enable();
    assert!(shows_error(&commands));
    assert!(controller.in_error_state());

    // Fixing only the unknown type recovers; the remaining bad values
    // fall back to their defaults.
    fixture.rewrite(
        ConfigBuilder::new()
            .loglevel("verbose")
            .item(serde_json::json!({ "type": "command", "title": 42, "command": "true" })),
    );
    let commands = controller.handle_event(RuntimeEvent::ConfigChanged);
    let nodes = install_nodes(&commands).expect("menu installed");
    assert!(matches!(
        &nodes[0],
        SurfaceNode::Command { title, .. } if title == "???"
    ));
}

#[test]
fn missing_config_file_shows_error() {
    let dir = TempDir::new().expect("tempdir");
    let mut controller = ExtensionController::new(
        dir.path().join("does-not-exist.json"),
        Arc::new(StderrNotifier),
    );
    let commands = controller.enable();
    assert!(shows_error(&commands));
    assert!(controller.in_error_state());
}

#[test]
fn spawn_failure_feedback_disables_the_item() {
    let fixture = Fixture::new(basic_config());
    let mut controller = fixture.controller();
    controller.enable();

    let err = cleaver::errors::CleaverError::SpawnFailed {
        command_line: "loginctl lock-session".to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    };
    let commands = controller.spawn_failed(ItemId(0), SpawnIntent::Run, &err);
    assert!(commands.iter().any(|command| matches!(
        command,
        Command::Surface(SurfaceOp::SetSensitive {
            item: ItemId(0),
            sensitive: false
        })
    )));
}
