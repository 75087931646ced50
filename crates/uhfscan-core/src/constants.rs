//! Core constants for the UHF inventory engine.
//!
//! This module centralises the timing windows, power limits and payload
//! offsets used throughout the UHF Scan workspace. The engine, the consumer
//! sessions and the record decoders all read their defaults from here so
//! that a single value governs each behaviour.
//!
//! # Timing Windows
//!
//! | Constant | Value | Purpose |
//! |----------|-------|---------|
//! | `RATE_WINDOW_MS` | 1000 | Read-rate bucketing window |
//! | `TAG_LOST_THRESHOLD_MS` | 2000 | Silence before a located tag is reported lost |
//! | `AUDIO_LOSS_THRESHOLD_MS` | 600 | Silence before inventory beeping pauses |
//! | `BEEP_INTERVAL_MS` | 600 | Pause between inventory beeps |
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//! use uhfscan_core::constants::*;
//!
//! let window = Duration::from_millis(RATE_WINDOW_MS);
//! assert!(window < Duration::from_millis(TAG_LOST_THRESHOLD_MS));
//! ```

// ============================================================================
// Timing Windows
// ============================================================================

/// Length of one read-rate window in milliseconds.
///
/// A rate flush reports the number of reads observed since the previous
/// flush once at least this much time has elapsed since the window anchor.
pub const RATE_WINDOW_MS: u64 = 1000;

/// Silence, in milliseconds, after which a located tag is considered gone.
///
/// The threshold is exclusive: the lost event fires only when strictly more
/// than this many milliseconds passed since the last read.
pub const TAG_LOST_THRESHOLD_MS: u64 = 2000;

/// Silence, in milliseconds, after which inventory audio feedback pauses.
pub const AUDIO_LOSS_THRESHOLD_MS: u64 = 600;

/// Pause between two inventory beeps in milliseconds.
pub const BEEP_INTERVAL_MS: u64 = 600;

/// Default sleep after an empty buffer poll in an active mode.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5;

/// Default sleep between loop iterations while idle.
pub const DEFAULT_IDLE_INTERVAL_MS: u64 = 20;

// ============================================================================
// Output Power
// ============================================================================

/// Lowest transmit power the reader modules accept, in dBm.
///
/// Requested values between 1 and this minimum are raised to it. A value of
/// zero is special and disables reading entirely.
pub const MIN_OUTPUT_POWER: u8 = 5;

/// Highest transmit power the reader modules accept, in dBm.
pub const MAX_OUTPUT_POWER: u8 = 33;

/// Power applied when no configuration overrides it.
pub const DEFAULT_OUTPUT_POWER: u8 = 30;

// ============================================================================
// Payload Layout
// ============================================================================

/// Length in hex characters of the TID prefix inside a combined payload.
///
/// Combined TID+USR and TID+RFU payloads carry a 96-bit TID first.
///
/// # Examples
///
/// ```
/// use uhfscan_core::constants::TID_PAYLOAD_HEX_LEN;
///
/// let payload = "E2801160200074CF085C0A2B11223344";
/// assert_eq!(&payload[..TID_PAYLOAD_HEX_LEN], "E2801160200074CF085C0A2B");
/// ```
pub const TID_PAYLOAD_HEX_LEN: usize = 24;

/// Trailing hex characters stripped from an RFU segment.
pub const RFU_TRAILER_HEX_LEN: usize = 2;

// ============================================================================
// Signal Strength
// ============================================================================

/// Strongest RSSI considered when mapping signal to proximity, in dBm.
pub const RSSI_CLAMP_MAX_DBM: i32 = -29;

/// Weakest RSSI considered when mapping signal to proximity, in dBm.
pub const RSSI_CLAMP_MIN_DBM: i32 = -70;
