//! # Diagnostic Frame Encoding
//!
//! Drivers in a deployed sensor node report through a byte-oriented
//! diagnostic channel (typically a UART feeding a host-side decoder), not
//! through stdout. This module defines that channel's framing and the
//! [`DiagSink`] capability the driver writes to.
//!
//! ## Framing
//!
//! Every frame starts with the marker byte `0xDD`, followed by a record
//! type, an optional tag, a one-byte payload length and the payload:
//!
//! ```text
//! ┌──────┐ ┌──────┐ ┌───────────┐ ┌─────┐ ┌─────────┐
//! │ 0xDD │ │ type │ │ tag (opt.)│ │ len │ │ payload │
//! └──────┘ └──────┘ └───────────┘ └─────┘ └─────────┘
//! ```
//!
//! PHY packet records serialize their fields one by one in the documented
//! order below, never by dumping a struct's memory, so the host decoder
//! is independent of compiler packing.
//!
//! Diagnostics are fire-and-forget: [`DiagSink::emit`] is infallible from
//! the driver's point of view, and implementations must absorb transport
//! failures themselves.

use crate::phy::channel::ChannelId;
use crate::phy::packet::{CrcStatus, Packet};

/// Marker byte opening every diagnostic frame.
pub const FRAME_MARKER: u8 = 0xDD;

/// Fixed-field prefix length of a PHY packet record payload (direction,
/// RSSI, LQI, the four channel fields, CRC status).
pub const PHY_RECORD_FIELDS_LEN: usize = 9;

/// Record type tags.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    /// Free-form text
    Text = 0x01,
    /// Raw byte dump
    Data = 0x02,
    /// Text attributed to a stack layer
    Stack = 0x03,
    /// Serialized PHY packet record
    PhyPacket = 0x10,
}

/// Stack layer tag carried by [`RecordType::Stack`] frames.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackLayer {
    Phy = 0x01,
    Dll = 0x02,
    Mac = 0x03,
    Nwl = 0x04,
    Trans = 0x05,
    Framework = 0x06,
}

/// Direction marker inside a PHY packet record.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Rx = 0x00,
    Tx = 0x01,
}

/// Fire-and-forget diagnostic byte sink.
///
/// Implementations must never fail into the caller: a full buffer or a
/// dead transport is the sink's problem, not the driver's.
pub trait DiagSink: Send + Sync {
    fn emit(&self, frame: &[u8]);
}

fn truncated(payload: &[u8]) -> &[u8] {
    &payload[..payload.len().min(u8::MAX as usize)]
}

/// Encode a free-form text frame. Text beyond 255 bytes is truncated.
///
/// # Examples
///
/// ```
/// use ezradio_rs::diag::text_frame;
///
/// assert_eq!(text_frame("ok"), vec![0xDD, 0x01, 2, b'o', b'k']);
/// ```
pub fn text_frame(msg: &str) -> Vec<u8> {
    let payload = truncated(msg.as_bytes());
    let mut frame = vec![FRAME_MARKER, RecordType::Text as u8, payload.len() as u8];
    frame.extend_from_slice(payload);
    frame
}

/// Encode a stack-attributed text frame.
pub fn stack_frame(layer: StackLayer, msg: &str) -> Vec<u8> {
    let payload = truncated(msg.as_bytes());
    let mut frame = vec![
        FRAME_MARKER,
        RecordType::Stack as u8,
        layer as u8,
        payload.len() as u8,
    ];
    frame.extend_from_slice(payload);
    frame
}

/// Encode a raw data dump frame. Data beyond 255 bytes is truncated.
pub fn data_frame(data: &[u8]) -> Vec<u8> {
    let payload = truncated(data);
    let mut frame = vec![FRAME_MARKER, RecordType::Data as u8, payload.len() as u8];
    frame.extend_from_slice(payload);
    frame
}

fn crc_byte(status: CrcStatus) -> u8 {
    match status {
        CrcStatus::Invalid => 0x00,
        CrcStatus::Valid => 0x01,
        CrcStatus::Unavailable => 0xFF,
    }
}

/// Encode a PHY packet record.
///
/// Payload field order: direction, RSSI (i16, big endian; 0 for transmit
/// records), LQI, frequency band, rate class, coding, center-frequency
/// index, CRC status (0xFF when unavailable), then the frame bytes.
pub fn phy_packet_frame(packet: &Packet, direction: Direction) -> Vec<u8> {
    let (rssi_dbm, lqi, channel, crc) = match (direction, packet.rx_meta(), packet.tx_meta()) {
        (Direction::Rx, Some(rx), _) => (rx.rssi_dbm, rx.lqi, rx.channel_id, rx.crc_status),
        (Direction::Tx, _, Some(tx)) => (0, 0, tx.config.channel_id, CrcStatus::Unavailable),
        _ => (0, 0, ChannelId::default(), CrcStatus::Unavailable),
    };

    let data = truncated(packet.data());
    let data = &data[..data.len().min(u8::MAX as usize - PHY_RECORD_FIELDS_LEN)];
    let rssi = rssi_dbm.to_be_bytes();

    let mut frame = vec![
        FRAME_MARKER,
        RecordType::PhyPacket as u8,
        (PHY_RECORD_FIELDS_LEN + data.len()) as u8,
        direction as u8,
        rssi[0],
        rssi[1],
        lqi,
        channel.freq_band as u8,
        channel.rate_class as u8,
        channel.coding as u8,
        channel.center_freq_index,
        crc_byte(crc),
    ];
    frame.extend_from_slice(data);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phy::channel::{ChannelId, TxConfig};
    use crate::phy::packet::{CrcStatus, Packet, RxMeta};
    use std::time::Instant;

    #[test]
    fn text_frame_layout() {
        assert_eq!(text_frame("hi"), vec![0xDD, 0x01, 2, b'h', b'i']);
    }

    #[test]
    fn stack_frame_carries_layer_tag_before_length() {
        assert_eq!(
            stack_frame(StackLayer::Phy, "rx"),
            vec![0xDD, 0x03, 0x01, 2, b'r', b'x']
        );
    }

    #[test]
    fn data_frame_layout() {
        assert_eq!(data_frame(&[0xAA, 0xBB]), vec![0xDD, 0x02, 2, 0xAA, 0xBB]);
    }

    #[test]
    fn oversized_text_is_truncated_to_length_byte_range() {
        let long = "x".repeat(300);
        let frame = text_frame(&long);
        assert_eq!(frame[2], 255);
        assert_eq!(frame.len(), 3 + 255);
    }

    #[test]
    fn rx_record_serializes_fields_in_documented_order() {
        let mut packet = Packet::with_length(2);
        packet.data_mut().copy_from_slice(&[0x10, 0x20]);
        packet.set_rx_meta(RxMeta {
            rssi_dbm: -30,
            lqi: 0,
            channel_id: ChannelId {
                center_freq_index: 4,
                ..Default::default()
            },
            crc_status: CrcStatus::Unavailable,
            timestamp: Instant::now(),
        });

        let frame = phy_packet_frame(&packet, Direction::Rx);
        let rssi = (-30i16).to_be_bytes();
        assert_eq!(
            frame,
            vec![
                0xDD, 0x10, 11, // marker, type, 9 fixed fields + 2 data bytes
                0x00, // direction rx
                rssi[0], rssi[1],
                0x00, // lqi
                0x00, 0x01, 0x00, 4, // band 433, normal rate, pn9, index
                0xFF, // crc unavailable
                0x10, 0x20,
            ]
        );
    }

    #[test]
    fn tx_record_uses_packet_tx_config_and_zero_rssi() {
        let packet = Packet::for_tx(
            vec![0xAB],
            TxConfig {
                channel_id: ChannelId {
                    center_freq_index: 9,
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        let frame = phy_packet_frame(&packet, Direction::Tx);
        assert_eq!(frame[3], 0x01); // direction tx
        assert_eq!(&frame[4..6], &[0, 0]); // rssi zeroed
        assert_eq!(frame[10], 9); // center freq index
        assert_eq!(frame[11], 0xFF); // crc unavailable
        assert_eq!(frame[12], 0xAB);
    }
}
