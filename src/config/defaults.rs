//! Service-wide default constants.

// ============================================================================
// Server
// ============================================================================

/// Default HTTP bind address.
pub const SERVER_ADDR: &str = "0.0.0.0:8080";

// ============================================================================
// Sessions
// ============================================================================

/// Idle time after which a session (and its result slot) is evicted.
///
/// 3600 s = one shift-break of inactivity before a what-if session resets.
pub const SESSION_IDLE_TTL_SECS: u64 = 3_600;

/// Interval between reaper sweeps over the session map.
pub const SESSION_REAPER_INTERVAL_SECS: u64 = 60;
