// src/config/mod.rs

//! Configuration: JSON loading, schema-driven property validation and the
//! typed item descriptors the menu tree is built from.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, ensure_config_exists, load_from_path};
pub use model::{
    CommandConfig, Instancing, MenuItemConfig, RawConfig, SettingsConfig, SwitchConfig,
};
pub use validate::{parse_menu, parse_settings, PropertyKind, PropertySpec};
