#![allow(dead_code)]

use serde_json::{json, Map, Value};

/// Builder for whole config documents to simplify test setup.
pub struct ConfigBuilder {
    settings: Map<String, Value>,
    menu: Vec<Value>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            settings: Map::new(),
            menu: Vec::new(),
        }
    }

    pub fn loglevel(mut self, level: &str) -> Self {
        self.settings
            .insert("loglevel".to_string(), json!(level));
        self
    }

    pub fn notificationlevel(mut self, level: &str) -> Self {
        self.settings
            .insert("notificationlevel".to_string(), json!(level));
        self
    }

    pub fn icon(mut self, icon: &str) -> Self {
        self.settings.insert("icon".to_string(), json!(icon));
        self
    }

    pub fn item(mut self, item: Value) -> Self {
        self.menu.push(item);
        self
    }

    pub fn build(self) -> Value {
        json!({
            "settings": Value::Object(self.settings),
            "menu": Value::Array(self.menu),
        })
    }

    pub fn write_to(self, path: impl AsRef<std::path::Path>) {
        let doc = self.build();
        std::fs::write(path, serde_json::to_string_pretty(&doc).unwrap())
            .expect("failed to write test config");
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `"type": "command"` menu entries.
pub struct CommandItemBuilder {
    props: Map<String, Value>,
}

impl CommandItemBuilder {
    pub fn new(title: &str) -> Self {
        let mut props = Map::new();
        props.insert("type".to_string(), json!("command"));
        props.insert("title".to_string(), json!(title));
        Self { props }
    }

    pub fn command(mut self, command: &str) -> Self {
        self.props.insert("command".to_string(), json!(command));
        self
    }

    pub fn instancing(mut self, instancing: &str) -> Self {
        self.props
            .insert("instancing".to_string(), json!(instancing));
        self
    }

    pub fn kill_on_disable(mut self, value: bool) -> Self {
        self.props
            .insert("killOnDisable".to_string(), json!(value));
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.props)
    }
}

/// Builder for `"type": "switch"` menu entries.
pub struct SwitchItemBuilder {
    props: Map<String, Value>,
}

impl SwitchItemBuilder {
    pub fn new(title: &str) -> Self {
        let mut props = Map::new();
        props.insert("type".to_string(), json!("switch"));
        props.insert("title".to_string(), json!(title));
        Self { props }
    }

    pub fn check(mut self, check: &str) -> Self {
        self.props.insert("check".to_string(), json!(check));
        self
    }

    pub fn start(mut self, start: &str) -> Self {
        self.props.insert("start".to_string(), json!(start));
        self
    }

    pub fn stop(mut self, stop: &str) -> Self {
        self.props.insert("stop".to_string(), json!(stop));
        self
    }

    pub fn interval_ms(mut self, ms: u64) -> Self {
        self.props.insert("interval".to_string(), json!(ms));
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.props)
    }
}

/// `"type": "submenu"` entry.
pub fn submenu(title: &str, items: Vec<Value>) -> Value {
    json!({ "type": "submenu", "title": title, "items": items })
}

/// `"type": "separator"` entry.
pub fn separator() -> Value {
    json!({ "type": "separator" })
}
