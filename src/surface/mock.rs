// src/surface/mock.rs

use std::sync::{Arc, Mutex};

use super::{MenuSurface, SurfaceNode};
use crate::menu::ItemId;

/// Everything a surface was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Install { icon: String, nodes: Vec<SurfaceNode> },
    SetSensitive { item: ItemId, sensitive: bool },
    SetToggleState { item: ItemId, on: bool },
    ShowError,
    Teardown,
}

/// Recording surface for tests.
///
/// Cloning shares the underlying call log, so a test can keep one handle
/// while the runtime owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    calls: Arc<Mutex<Vec<SurfaceCall>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: SurfaceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl MenuSurface for RecordingSurface {
    fn install(&mut self, icon: &str, nodes: &[SurfaceNode]) {
        self.record(SurfaceCall::Install {
            icon: icon.to_string(),
            nodes: nodes.to_vec(),
        });
    }

    fn set_sensitive(&mut self, item: ItemId, sensitive: bool) {
        self.record(SurfaceCall::SetSensitive { item, sensitive });
    }

    fn set_toggle_state(&mut self, item: ItemId, on: bool) {
        self.record(SurfaceCall::SetToggleState { item, on });
    }

    fn show_error(&mut self) {
        self.record(SurfaceCall::ShowError);
    }

    fn teardown(&mut self) {
        self.record(SurfaceCall::Teardown);
    }
}
