pub mod builders;
pub mod fake_spawner;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Set up the tracing subscriber for test binaries. Call at the top of
/// any test that wants log output.
///
/// Logs go through the per-test capture writer, so they only show up
/// for failing tests (or under `-- --nocapture`). Verbosity comes from
/// `RUST_LOG`, defaulting to `info`; `RUST_LOG=debug` additionally
/// shows the item-level diagnostics the engine emits.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Bound a future to five seconds, so a wedged event loop fails the
/// test instead of hanging the suite.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("future did not finish within 5s")
}
