// src/surface/mod.rs

//! Menu surface abstraction.
//!
//! Rendering and toggle widgets are out of scope for the supervision
//! engine; this trait is the seam they plug into. Production installs a
//! [`TracingSurface`] that mirrors surface operations into the log;
//! tests use the recording implementation in [`mock`].

pub mod mock;

use crate::menu::ItemId;

/// One node of the rendered menu layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceNode {
    Command {
        id: ItemId,
        title: String,
        icon: Option<String>,
        /// Items without a command render permanently disabled.
        enabled: bool,
    },
    /// Switches start out disabled and unknown until a check completes.
    Switch {
        id: ItemId,
        title: String,
        icon: Option<String>,
    },
    SubMenu {
        title: String,
        icon: Option<String>,
        children: Vec<SurfaceNode>,
    },
    Separator,
}

/// Where menu state is reflected.
pub trait MenuSurface {
    /// Install a freshly built menu under the given status icon,
    /// replacing whatever was displayed before.
    fn install(&mut self, icon: &str, nodes: &[SurfaceNode]);

    fn set_sensitive(&mut self, item: ItemId, sensitive: bool);

    fn set_toggle_state(&mut self, item: ItemId, on: bool);

    /// Show the persistent error indicator (config failed to load).
    fn show_error(&mut self);

    /// Tear down the displayed menu (or error indicator).
    fn teardown(&mut self);
}

/// Surface that mirrors every operation into the log.
#[derive(Debug, Default)]
pub struct TracingSurface;

impl MenuSurface for TracingSurface {
    fn install(&mut self, icon: &str, nodes: &[SurfaceNode]) {
        tracing::info!(icon, items = nodes.len(), "menu installed");
    }

    fn set_sensitive(&mut self, item: ItemId, sensitive: bool) {
        tracing::debug!(%item, sensitive, "surface sensitivity changed");
    }

    fn set_toggle_state(&mut self, item: ItemId, on: bool) {
        tracing::info!(%item, on, "switch state changed");
    }

    fn show_error(&mut self) {
        tracing::error!("menu in error-display state");
    }

    fn teardown(&mut self) {
        tracing::debug!("menu torn down");
    }
}
