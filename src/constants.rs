//! PHY-Level Radio Constants
//!
//! This module defines constants shared across the radio driver, based on
//! the Si4455 FIFO geometry and the PHY timing model.

use std::time::Duration;

/// Depth of the chip's transmit/receive FIFOs in bytes.
pub const RADIO_FIFO_SIZE: usize = 64;

/// Upper bound (exclusive) on the length of a transmittable frame.
///
/// A frame must fit the single FIFO together with its length byte, so
/// `send_packet` accepts lengths in `0..MAX_PACKET_LEN` only.
pub const MAX_PACKET_LEN: usize = 63;

/// Settling interval between entering receive mode and the first valid
/// RSSI sample.
///
/// When an RSSI-valid callback is registered, the driver blocks the calling
/// context for this long before sampling. This is a synchronous delay, not
/// a yield; downstream protocol timing may depend on it.
pub const RSSI_SETTLE_TIME: Duration = Duration::from_micros(200);

/// Base subtracted from the shifted raw register value when converting
/// RSSI readings to dBm.
pub const RSSI_CONVERSION_BASE: i16 = 130;

/// Default RSSI correction offset in dB, applied on top of
/// [`RSSI_CONVERSION_BASE`].
pub const DEFAULT_RSSI_OFFSET: i16 = 0;
