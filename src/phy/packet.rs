//! # Packet Buffers and Metadata
//!
//! A [`Packet`] is an owned radio frame: a byte buffer plus receive or
//! transmit metadata. Packets deliberately do not implement `Clone`: a
//! packet has exactly one owner at any time (the caller while building or
//! sending, the driver while in flight, the consumer callback after
//! delivery), and every hand-over is a move. Delivering a packet to a
//! receive callback and returning it to the buffer pool both consume the
//! value, so "delivered XOR released, exactly once" cannot be violated by
//! construction.
//!
//! Buffer storage itself is a capability: the upper layer supplies a
//! [`PacketBuffers`] implementation at driver initialization, which lets it
//! back receive frames with a static pool, a queue or plain heap memory.

use std::time::Instant;

use crate::phy::channel::{ChannelId, TxConfig};

/// Frame integrity outcome reported by the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrcStatus {
    /// The chip did not report a CRC result for this frame.
    Unavailable,
    /// CRC check passed.
    Valid,
    /// CRC check failed.
    Invalid,
}

/// Metadata populated for received packets.
#[derive(Debug, Clone)]
pub struct RxMeta {
    /// Latched signal strength at frame reception, in dBm.
    pub rssi_dbm: i16,
    /// Link quality indicator. The chip does not report one; always 0.
    pub lqi: u8,
    /// Channel that was programmed when the frame arrived.
    pub channel_id: ChannelId,
    pub crc_status: CrcStatus,
    /// Monotonic reception timestamp.
    pub timestamp: Instant,
}

/// Metadata for packets being transmitted.
#[derive(Debug, Clone)]
pub struct TxMeta {
    /// Channel, power and sync word the frame goes out with.
    pub config: TxConfig,
    /// Monotonic completion timestamp, stamped when the chip reports the
    /// frame sent.
    pub timestamp: Option<Instant>,
}

/// An owned radio frame.
#[derive(Debug)]
pub struct Packet {
    data: Vec<u8>,
    rx_meta: Option<RxMeta>,
    tx_meta: Option<TxMeta>,
}

impl Packet {
    /// Build a packet for transmission from payload bytes and a transmit
    /// configuration.
    pub fn for_tx(data: Vec<u8>, config: TxConfig) -> Self {
        Self {
            data,
            rx_meta: None,
            tx_meta: Some(TxMeta {
                config,
                timestamp: None,
            }),
        }
    }

    /// Build an empty receive packet whose buffer holds `length` zeroed
    /// bytes. This is what buffer providers typically return from
    /// [`PacketBuffers::allocate`].
    pub fn with_length(length: usize) -> Self {
        Self {
            data: vec![0; length],
            rx_meta: None,
            tx_meta: None,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn rx_meta(&self) -> Option<&RxMeta> {
        self.rx_meta.as_ref()
    }

    pub fn tx_meta(&self) -> Option<&TxMeta> {
        self.tx_meta.as_ref()
    }

    pub(crate) fn data_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }

    pub(crate) fn set_rx_meta(&mut self, meta: RxMeta) {
        self.rx_meta = Some(meta);
    }

    pub(crate) fn tx_meta_mut(&mut self) -> Option<&mut TxMeta> {
        self.tx_meta.as_mut()
    }
}

/// Buffer capability supplied by the upper layer at driver initialization.
///
/// `allocate` and `release` run in interrupt-dispatch context while the
/// driver holds its internal state lock; implementations must be quick and
/// must not call back into the driver.
pub trait PacketBuffers: Send + Sync {
    /// Allocate a packet whose buffer holds at least `length` bytes.
    fn allocate(&self, length: usize) -> Packet;

    /// Take back a packet that will not be delivered.
    fn release(&self, packet: Packet);
}

/// Stock heap-backed buffer provider.
pub struct HeapBuffers;

impl PacketBuffers for HeapBuffers {
    fn allocate(&self, length: usize) -> Packet {
        Packet::with_length(length)
    }

    fn release(&self, packet: Packet) {
        drop(packet);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phy::channel::TxConfig;

    #[test]
    fn tx_packet_carries_its_config() {
        let cfg = TxConfig {
            eirp_dbm: 10,
            ..Default::default()
        };
        let packet = Packet::for_tx(vec![1, 2, 3], cfg);
        assert_eq!(packet.len(), 3);
        assert_eq!(packet.tx_meta().unwrap().config.eirp_dbm, 10);
        assert!(packet.tx_meta().unwrap().timestamp.is_none());
        assert!(packet.rx_meta().is_none());
    }

    #[test]
    fn allocated_packet_is_zeroed_at_requested_length() {
        let packet = HeapBuffers.allocate(16);
        assert_eq!(packet.len(), 16);
        assert!(packet.data().iter().all(|&b| b == 0));
        assert!(packet.tx_meta().is_none());
    }
}
