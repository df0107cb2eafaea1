// src/config/validate.rs

//! Schema-driven property validation and descriptor parsing.
//!
//! [`normalize`] is the declarative validation helper: given a loosely
//! typed JSON object and a schema, it produces a normalized object where
//! every recognized property either has a value of the declared type or
//! is absent. It is pure and total; diagnostics are collected into a
//! warning list that the caller logs.
//!
//! On top of it sit the per-kind parsers that turn normalized property
//! bags into the typed descriptors of [`model`](crate::config::model).

use std::time::Duration;

use serde_json::{json, Map, Value};

use crate::config::model::{
    CommandConfig, Instancing, MenuItemConfig, SettingsConfig, SwitchConfig,
};
use crate::diag::Level;
use crate::errors::{CleaverError, Result};

/// Expected JSON type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Number,
    Boolean,
    Array,
}

impl PropertyKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            PropertyKind::String => value.is_string(),
            PropertyKind::Number => value.is_number(),
            PropertyKind::Boolean => value.is_boolean(),
            PropertyKind::Array => value.is_array(),
        }
    }
}

/// One schema entry: property name, expected type, optional allowed-value
/// set (strings, matched case-insensitively) and optional default.
#[derive(Debug, Clone)]
pub struct PropertySpec {
    pub name: &'static str,
    pub kind: PropertyKind,
    pub allowed: &'static [&'static str],
    pub default: Option<Value>,
}

impl PropertySpec {
    fn new(name: &'static str, kind: PropertyKind) -> Self {
        Self {
            name,
            kind,
            allowed: &[],
            default: None,
        }
    }

    fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    fn with_allowed(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }
}

/// Validate `source` against `schema`, producing a normalized object.
///
/// - absent property: default if one exists, otherwise omitted;
/// - wrong type: warning, then default-or-omit (never coerced);
/// - allowed-value sets: matched case-insensitively, stored lower-cased,
///   mismatch falls back to the default with a warning;
/// - properties not named by the schema are silently ignored.
pub fn normalize(
    source: &Map<String, Value>,
    schema: &[PropertySpec],
    warnings: &mut Vec<String>,
) -> Map<String, Value> {
    let mut target = Map::new();

    for spec in schema {
        match source.get(spec.name) {
            Some(value) if spec.kind.matches(value) => {
                if spec.allowed.is_empty() {
                    target.insert(spec.name.to_string(), value.clone());
                    continue;
                }
                // Allowed-value sets only apply to string properties.
                let lowered = value.as_str().unwrap_or_default().to_lowercase();
                if spec.allowed.contains(&lowered.as_str()) {
                    target.insert(spec.name.to_string(), Value::String(lowered));
                } else {
                    push_fallback(spec, value, warnings, &mut target);
                }
            }
            Some(value) => {
                push_fallback(spec, value, warnings, &mut target);
            }
            None => {
                if let Some(default) = &spec.default {
                    target.insert(spec.name.to_string(), default.clone());
                }
            }
        }
    }

    target
}

fn push_fallback(
    spec: &PropertySpec,
    value: &Value,
    warnings: &mut Vec<String>,
    target: &mut Map<String, Value>,
) {
    match &spec.default {
        Some(default) => {
            warnings.push(format!(
                "invalid value for property {}: {value}; using default value: {default}",
                spec.name
            ));
            target.insert(spec.name.to_string(), default.clone());
        }
        None => {
            warnings.push(format!(
                "invalid value for property {}: {value}; ignoring the value",
                spec.name
            ));
        }
    }
}

fn settings_schema() -> Vec<PropertySpec> {
    const LEVELS: &[&str] = &["debug", "info", "warning", "error"];
    vec![
        PropertySpec::new("icon", PropertyKind::String).with_default(json!("cleaver-symbolic")),
        PropertySpec::new("loglevel", PropertyKind::String)
            .with_allowed(LEVELS)
            .with_default(json!("warning")),
        PropertySpec::new("notificationlevel", PropertyKind::String).with_allowed(LEVELS),
    ]
}

fn command_schema() -> Vec<PropertySpec> {
    vec![
        PropertySpec::new("title", PropertyKind::String).with_default(json!("???")),
        PropertySpec::new("icon", PropertyKind::String),
        PropertySpec::new("command", PropertyKind::String),
        PropertySpec::new("instancing", PropertyKind::String)
            .with_allowed(&["singleinstance", "multipleinstances", "killbeforerestart"])
            .with_default(json!("multipleinstances")),
        PropertySpec::new("killOnDisable", PropertyKind::Boolean).with_default(json!(true)),
    ]
}

fn switch_schema() -> Vec<PropertySpec> {
    vec![
        PropertySpec::new("title", PropertyKind::String).with_default(json!("???")),
        PropertySpec::new("icon", PropertyKind::String),
        PropertySpec::new("start", PropertyKind::String),
        PropertySpec::new("stop", PropertyKind::String),
        PropertySpec::new("check", PropertyKind::String),
        PropertySpec::new("interval", PropertyKind::Number),
        PropertySpec::new("interval_s", PropertyKind::Number),
        PropertySpec::new("interval_ms", PropertyKind::Number),
    ]
}

fn submenu_schema() -> Vec<PropertySpec> {
    vec![
        PropertySpec::new("title", PropertyKind::String).with_default(json!("???")),
        PropertySpec::new("icon", PropertyKind::String),
        PropertySpec::new("items", PropertyKind::Array),
    ]
}

fn get_string(props: &Map<String, Value>, name: &str) -> Option<String> {
    props.get(name).and_then(Value::as_str).map(str::to_string)
}

fn get_bool(props: &Map<String, Value>, name: &str) -> Option<bool> {
    props.get(name).and_then(Value::as_bool)
}

fn get_f64(props: &Map<String, Value>, name: &str) -> Option<f64> {
    props.get(name).and_then(Value::as_f64)
}

/// Parse the global `settings` object.
///
/// A value that is not a JSON object is treated as `{}`, so a config
/// without settings still yields the documented defaults.
pub fn parse_settings(settings: &Value, warnings: &mut Vec<String>) -> SettingsConfig {
    let empty = Map::new();
    let source = settings.as_object().unwrap_or(&empty);
    let props = normalize(source, &settings_schema(), warnings);

    // The allowed-value sets above guarantee these parse.
    let loglevel = get_string(&props, "loglevel")
        .and_then(|s| s.parse::<Level>().ok())
        .unwrap_or(Level::Warning);
    let notificationlevel =
        get_string(&props, "notificationlevel").and_then(|s| s.parse::<Level>().ok());

    SettingsConfig {
        icon: get_string(&props, "icon").unwrap_or_else(|| "cleaver-symbolic".to_string()),
        loglevel,
        notificationlevel,
    }
}

fn parse_command(source: &Map<String, Value>, warnings: &mut Vec<String>) -> CommandConfig {
    let props = normalize(source, &command_schema(), warnings);

    let instancing = match get_string(&props, "instancing").as_deref() {
        Some("singleinstance") => Instancing::SingleInstance,
        Some("killbeforerestart") => Instancing::KillBeforeRestart,
        _ => Instancing::MultipleInstances,
    };

    CommandConfig {
        title: get_string(&props, "title").unwrap_or_else(|| "???".to_string()),
        icon: get_string(&props, "icon"),
        command: get_string(&props, "command"),
        instancing,
        kill_on_disable: get_bool(&props, "killOnDisable").unwrap_or(true),
    }
}

const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

fn parse_switch(source: &Map<String, Value>, warnings: &mut Vec<String>) -> SwitchConfig {
    let props = normalize(source, &switch_schema(), warnings);
    let title = get_string(&props, "title").unwrap_or_else(|| "???".to_string());

    // interval_s wins over interval_ms, which wins over interval (ms).
    let interval = if let Some(secs) = get_f64(&props, "interval_s") {
        checked_interval(secs * 1000.0, &title, warnings)
    } else if let Some(ms) = get_f64(&props, "interval_ms") {
        checked_interval(ms, &title, warnings)
    } else if let Some(ms) = get_f64(&props, "interval") {
        checked_interval(ms, &title, warnings)
    } else {
        DEFAULT_INTERVAL
    };

    SwitchConfig {
        title,
        icon: get_string(&props, "icon"),
        start: get_string(&props, "start"),
        stop: get_string(&props, "stop"),
        check: get_string(&props, "check"),
        interval,
    }
}

fn checked_interval(ms: f64, title: &str, warnings: &mut Vec<String>) -> Duration {
    if ms.is_finite() && ms >= 1.0 {
        Duration::from_millis(ms as u64)
    } else {
        warnings.push(format!(
            "invalid check interval {ms} for switch '{title}'; using default of {}s",
            DEFAULT_INTERVAL.as_secs()
        ));
        DEFAULT_INTERVAL
    }
}

/// Parse the `menu` array into typed item descriptors.
///
/// A missing or non-array `menu` yields an empty menu. A menu entry with
/// a missing or unknown `type` tag fails the whole parse with
/// [`CleaverError::InvalidMenuItem`]; partial menus are never produced.
pub fn parse_menu(menu: &Value, warnings: &mut Vec<String>) -> Result<Vec<MenuItemConfig>> {
    let Some(entries) = menu.as_array() else {
        return Ok(Vec::new());
    };

    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(source) = entry.as_object() else {
            return Err(CleaverError::InvalidMenuItem(format!(
                "menu entry is not an object: {entry}"
            )));
        };
        let Some(kind) = source.get("type").and_then(Value::as_str) else {
            return Err(CleaverError::InvalidMenuItem(
                "missing 'type' property".to_string(),
            ));
        };

        let item = match kind.to_lowercase().as_str() {
            "command" => MenuItemConfig::Command(parse_command(source, warnings)),
            "switch" => MenuItemConfig::Switch(parse_switch(source, warnings)),
            "submenu" => {
                let props = normalize(source, &submenu_schema(), warnings);
                let nested = props.get("items").cloned().unwrap_or(Value::Null);
                MenuItemConfig::SubMenu {
                    title: get_string(&props, "title").unwrap_or_else(|| "???".to_string()),
                    icon: get_string(&props, "icon"),
                    items: parse_menu(&nested, warnings)?,
                }
            }
            "separator" => MenuItemConfig::Separator,
            other => {
                return Err(CleaverError::InvalidMenuItem(format!(
                    "invalid value for property 'type': {other}"
                )));
            }
        };
        items.push(item);
    }

    Ok(items)
}
