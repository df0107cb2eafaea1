// src/lib.rs

pub mod cli;
pub mod config;
pub mod diag;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod menu;
pub mod proc;
pub mod surface;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::cli::CliArgs;
use crate::config::model::MenuItemConfig;
use crate::diag::StderrNotifier;
use crate::engine::{ExtensionController, Runtime, RuntimeEvent};
use crate::proc::TokioSpawner;
use crate::surface::TracingSurface;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config resolution and default seeding
/// - the extension controller (enable/disable/reload core)
/// - the runtime event loop, spawner and surface
/// - the config file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = match &args.config {
        Some(path) => PathBuf::from(path),
        None => config::default_config_path(),
    };
    config::ensure_config_exists(&config_path)?;

    if args.dry_run {
        print_dry_run(&config_path)?;
        return Ok(());
    }

    let (event_tx, event_rx) = mpsc::channel::<RuntimeEvent>(64);

    // The watcher outlives disable/enable cycles so that fixing a broken
    // config recovers automatically.
    let _watcher_handle = watch::spawn_config_watcher(&config_path, event_tx.clone())?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = event_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let spawner = TokioSpawner::new(event_tx.clone());
    let surface = TracingSurface;
    let controller = ExtensionController::new(config_path, Arc::new(StderrNotifier));

    let runtime = Runtime::new(controller, event_rx, event_tx, spawner, surface);
    runtime.run().await?;
    Ok(())
}

/// Simple dry-run output: parse + validate the config, print the menu.
fn print_dry_run(config_path: &std::path::Path) -> Result<()> {
    let raw = config::load_from_path(config_path)?;
    let mut warnings = Vec::new();
    let settings = config::parse_settings(&raw.settings, &mut warnings);
    let menu = config::parse_menu(&raw.menu, &mut warnings)?;

    println!("cleaver dry-run ({})", config_path.display());
    println!("  settings.icon = {}", settings.icon);
    println!("  settings.loglevel = {}", settings.loglevel);
    match settings.notificationlevel {
        Some(level) => println!("  settings.notificationlevel = {level}"),
        None => println!("  settings.notificationlevel = (notifications disabled)"),
    }
    println!();

    println!("menu ({} top-level items):", menu.len());
    print_items(&menu, 1);

    for warning in warnings {
        println!("warning: {warning}");
    }
    Ok(())
}

fn print_items(items: &[MenuItemConfig], depth: usize) {
    let pad = "  ".repeat(depth);
    for item in items {
        match item {
            MenuItemConfig::Command(cmd) => {
                println!("{pad}- command '{}'", cmd.title);
                if let Some(command) = &cmd.command {
                    println!("{pad}    command: {command}");
                }
                println!("{pad}    instancing: {:?}", cmd.instancing);
                println!("{pad}    killOnDisable: {}", cmd.kill_on_disable);
            }
            MenuItemConfig::Switch(sw) => {
                println!("{pad}- switch '{}'", sw.title);
                if let Some(check) = &sw.check {
                    println!("{pad}    check: {check} (every {:?})", sw.interval);
                }
                if let Some(start) = &sw.start {
                    println!("{pad}    start: {start}");
                }
                if let Some(stop) = &sw.stop {
                    println!("{pad}    stop: {stop}");
                }
            }
            MenuItemConfig::SubMenu { title, items, .. } => {
                println!("{pad}- submenu '{title}'");
                print_items(items, depth + 1);
            }
            MenuItemConfig::Separator => println!("{pad}- separator"),
        }
    }
}
