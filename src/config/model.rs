// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::diag::Level;

/// Top-level configuration as read from the JSON file:
///
/// ```json
/// {
///   "settings": { "icon": "...", "loglevel": "warning" },
///   "menu": [ { "type": "command", "title": "...", "command": "..." } ]
/// }
/// ```
///
/// Both fields are kept loosely typed here; `settings` that is not an
/// object is treated as empty, and a `menu` that is missing or not an
/// array yields an empty menu. Per-item normalization happens in
/// [`validate`](crate::config::validate).
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub settings: Value,

    #[serde(default)]
    pub menu: Value,
}

/// Validated global settings.
#[derive(Debug, Clone)]
pub struct SettingsConfig {
    /// Status icon name shown by the surface.
    pub icon: String,
    /// Threshold for the log sink.
    pub loglevel: Level,
    /// Threshold for the notification sink; `None` disables notifications.
    pub notificationlevel: Option<Level>,
}

/// Instancing policy for command items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instancing {
    SingleInstance,
    MultipleInstances,
    KillBeforeRestart,
}

/// Validated `"type": "command"` descriptor.
#[derive(Debug, Clone)]
pub struct CommandConfig {
    pub title: String,
    pub icon: Option<String>,
    /// Absent command renders the item permanently disabled.
    pub command: Option<String>,
    pub instancing: Instancing,
    pub kill_on_disable: bool,
}

/// Validated `"type": "switch"` descriptor.
#[derive(Debug, Clone)]
pub struct SwitchConfig {
    pub title: String,
    pub icon: Option<String>,
    pub start: Option<String>,
    pub stop: Option<String>,
    /// Absent check leaves the switch permanently disabled.
    pub check: Option<String>,
    /// Effective check interval. Resolved from `interval_s`,
    /// `interval_ms` or `interval` (ms), in that order of precedence;
    /// defaults to 10 seconds.
    pub interval: Duration,
}

/// One entry of the `menu` array, discriminated by its `type` tag.
#[derive(Debug, Clone)]
pub enum MenuItemConfig {
    Command(CommandConfig),
    Switch(SwitchConfig),
    SubMenu {
        title: String,
        icon: Option<String>,
        items: Vec<MenuItemConfig>,
    },
    Separator,
}
