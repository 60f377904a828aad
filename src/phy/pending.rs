//! Single-slot store for a deferred receive configuration.
//!
//! When a mode switch cannot execute immediately (a receive requested
//! while a transmission is in flight, or a transmission interrupting an
//! active receive), the receive configuration to apply afterwards is parked
//! here. The slot holds at most one configuration; storing over an
//! occupied slot keeps the newest value (last write wins) and logs the
//! overwrite.

use log::warn;

use crate::phy::channel::RxConfig;

/// Deferred receive-configuration slot. Occupancy doubles as the
/// "switch outstanding" flag; `take` consumes the slot exactly once.
#[derive(Debug, Default)]
pub struct PendingRx {
    slot: Option<RxConfig>,
}

impl PendingRx {
    /// Park a configuration, replacing any previous one.
    pub fn store(&mut self, cfg: RxConfig) {
        if self.slot.is_some() {
            warn!("pending rx config overwritten before it was applied");
        }
        self.slot = Some(cfg);
    }

    /// Consume the slot.
    pub fn take(&mut self) -> Option<RxConfig> {
        self.slot.take()
    }

    /// A deferred switch is outstanding.
    pub fn is_armed(&self) -> bool {
        self.slot.is_some()
    }

    /// Inspect the slot without consuming it.
    pub fn peek(&self) -> Option<RxConfig> {
        self.slot
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phy::channel::{ChannelId, RxConfig, SyncwordClass};

    fn cfg(index: u8) -> RxConfig {
        RxConfig {
            channel_id: ChannelId {
                center_freq_index: index,
                ..Default::default()
            },
            syncword_class: SyncwordClass::Class0,
        }
    }

    #[test]
    fn slot_is_consumed_exactly_once() {
        let mut pending = PendingRx::default();
        assert!(!pending.is_armed());

        pending.store(cfg(3));
        assert!(pending.is_armed());
        assert_eq!(pending.take().unwrap().channel_id.center_freq_index, 3);
        assert!(!pending.is_armed());
        assert!(pending.take().is_none());
    }

    #[test]
    fn second_store_wins() {
        let mut pending = PendingRx::default();
        pending.store(cfg(1));
        pending.store(cfg(2));
        assert_eq!(pending.take().unwrap().channel_id.center_freq_index, 2);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut pending = PendingRx::default();
        pending.store(cfg(7));
        assert_eq!(pending.peek().unwrap().channel_id.center_freq_index, 7);
        assert!(pending.is_armed());
    }
}
