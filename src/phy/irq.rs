//! # EZRadio Interrupt Status Decoding
//!
//! The Si4455 reports events through three status groups (packet handler,
//! modem and chip), each with a pending byte and a status byte, plus a
//! summary byte whose bits say which groups have anything pending. The
//! chip-command layer reads (and clears) all of them in one transaction;
//! this module decodes the snapshot.
//!
//! ## Usage Pattern
//!
//! 1. The platform layer observes the interrupt line and calls the driver's
//!    dispatch entry point.
//! 2. The dispatcher obtains an [`InterruptStatus`] snapshot from the HAL.
//! 3. Group-pending bits gate which steps run; within a group, the
//!    individual event bits select the action.
//! 4. Unexpected bit combinations are logged and ignored.

/// Group-summary bits of the interrupt-pending byte.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum IntPendBit {
    /// Packet-handler group has pending events
    PacketHandler = 0x01,
    /// Modem group has pending events
    Modem = 0x02,
    /// Chip group has pending events
    Chip = 0x04,
}

/// Packet-handler group event bits.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PhPendBit {
    /// RX FIFO crossed the almost-full watermark
    RxFifoAlmostFull = 0x01,
    /// TX FIFO crossed the almost-empty watermark
    TxFifoAlmostEmpty = 0x02,
    /// Received frame failed the CRC check
    CrcError = 0x08,
    /// A complete frame was received
    PacketRx = 0x10,
    /// A complete frame was transmitted
    PacketSent = 0x20,
}

/// Chip group event bits.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ChipPendBit {
    /// Chip finished power-up and is accepting commands
    ChipReady = 0x04,
    /// A command was rejected
    CmdError = 0x08,
    /// The internal state machine changed state
    StateChange = 0x10,
    /// A FIFO underflowed or overflowed
    FifoError = 0x20,
}

/// One read-and-clear snapshot of the three event-status groups.
///
/// Field values come straight from the chip's interrupt-status reply; the
/// accessor methods decode the bits the driver acts on.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct InterruptStatus {
    /// Group-summary pending bits (see [`IntPendBit`])
    pub int_pend: u8,
    /// Packet-handler pending bits (see [`PhPendBit`])
    pub ph_pend: u8,
    /// Packet-handler latched status bits
    pub ph_status: u8,
    /// Modem pending bits
    pub modem_pend: u8,
    /// Modem latched status bits
    pub modem_status: u8,
    /// Chip pending bits (see [`ChipPendBit`])
    pub chip_pend: u8,
    /// Chip latched status bits
    pub chip_status: u8,
}

impl InterruptStatus {
    /// Packet-handler group has pending events.
    pub fn ph_pending(self) -> bool {
        (self.int_pend & IntPendBit::PacketHandler as u8) != 0
    }

    /// Modem group has pending events.
    pub fn modem_pending(self) -> bool {
        (self.int_pend & IntPendBit::Modem as u8) != 0
    }

    /// Chip group has pending events.
    pub fn chip_pending(self) -> bool {
        (self.int_pend & IntPendBit::Chip as u8) != 0
    }

    /// A complete frame was received.
    pub fn packet_rx(self) -> bool {
        (self.ph_pend & PhPendBit::PacketRx as u8) != 0
    }

    /// A complete frame was transmitted.
    pub fn packet_sent(self) -> bool {
        (self.ph_pend & PhPendBit::PacketSent as u8) != 0
    }

    /// The received frame failed its CRC check.
    pub fn crc_error(self) -> bool {
        (self.ph_pend & PhPendBit::CrcError as u8) != 0
    }

    /// The chip's internal state machine reported a state change.
    ///
    /// Read from the latched chip status, matching how the event is
    /// reported by the part.
    pub fn state_change(self) -> bool {
        (self.chip_status & ChipPendBit::StateChange as u8) != 0
    }

    /// Any group has pending events.
    pub fn has_any(self) -> bool {
        self.int_pend != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_pending_bits_decode_independently() {
        let status = InterruptStatus {
            int_pend: IntPendBit::PacketHandler as u8 | IntPendBit::Chip as u8,
            ..Default::default()
        };
        assert!(status.ph_pending());
        assert!(status.chip_pending());
        assert!(!status.modem_pending());
        assert!(status.has_any());
    }

    #[test]
    fn packet_event_bits_come_from_ph_pend() {
        let status = InterruptStatus {
            int_pend: IntPendBit::PacketHandler as u8,
            ph_pend: PhPendBit::PacketRx as u8,
            ..Default::default()
        };
        assert!(status.packet_rx());
        assert!(!status.packet_sent());
        assert!(!status.crc_error());
    }

    #[test]
    fn state_change_reads_latched_chip_status() {
        let status = InterruptStatus {
            int_pend: IntPendBit::Chip as u8,
            chip_pend: 0,
            chip_status: ChipPendBit::StateChange as u8,
            ..Default::default()
        };
        assert!(status.state_change());
    }

    #[test]
    fn empty_snapshot_reports_nothing() {
        let status = InterruptStatus::default();
        assert!(!status.has_any());
        assert!(!status.packet_rx());
        assert!(!status.packet_sent());
        assert!(!status.state_change());
    }
}
