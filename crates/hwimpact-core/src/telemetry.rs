//! Tracing subscriber setup

use tracing::Level;

/// Install a fmt subscriber at `level`. Returns `false` when one is already set.
pub fn init(level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// Debug-level subscriber writing through the test harness capture
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}
