//! # Logging Bootstrap
//!
//! Human-readable driver logs go through the `log` facade; binary
//! diagnostic records go through a [`DiagSink`](crate::diag::DiagSink).
//! This module wires up the former and provides a bridge for the latter.

use crate::diag::DiagSink;

/// Initializes the logger with the `env_logger` crate.
pub fn init_logger() {
    env_logger::init();
}

/// Diagnostic sink that forwards frames onto the `log` facade as hex
/// dumps, for hosts without a dedicated diagnostic transport.
pub struct LogSink;

impl DiagSink for LogSink {
    fn emit(&self, frame: &[u8]) {
        log::debug!("diag {}", hex::encode(frame));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sink_accepts_any_frame() {
        // fire-and-forget: emitting must never fail or panic
        LogSink.emit(&[0xDD, 0x01, 0]);
        LogSink.emit(&[]);
    }
}
