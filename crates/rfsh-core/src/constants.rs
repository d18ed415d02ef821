//! Configuration and timing constants for rfsh.

use std::time::Duration;

// =============================================================================
// Keep-alive Constants
// =============================================================================

/// Full keep-alive budget: a probe is guaranteed at least once per this
/// interval of foreground inactivity.
pub const KEEPALIVE_FULL_INTERVAL: Duration = Duration::from_secs(60);

/// Scheduler polling tick.
pub const KEEPALIVE_POLL_INTERVAL: Duration = Duration::from_secs(5);

// =============================================================================
// Wire Constants
// =============================================================================

/// Maximum accepted frame size (16 MiB).
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

// =============================================================================
// Default Values
// =============================================================================

/// Default server address.
pub const DEFAULT_SERVER: &str = "localhost";

/// Default server port.
pub const DEFAULT_PORT: u16 = 6700;

/// The remote root directory, initial value of the current directory.
pub const ROOT: &str = "/";
