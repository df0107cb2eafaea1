#![allow(dead_code)]

use std::sync::Arc;

use cleaver::diag::{Diagnostics, Level, StderrNotifier};

pub use cleaver_test_utils::init_tracing;

/// Diagnostics with everything logged, notifications off.
pub fn test_diag() -> Diagnostics {
    Diagnostics::new(Level::Debug, None, Arc::new(StderrNotifier))
}
