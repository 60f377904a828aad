//! # Hardware Abstraction Layer for the EZRadio Chip
//!
//! This module defines the [`Hal`] trait, the chip-command capability the
//! radio driver is built on. It covers the Si4455 command set the driver
//! needs (power-up, identification, FIFO access, mode starts and status
//! queries) while leaving register-level programming (frequency plans,
//! modulation, sync-word bit patterns) to the implementation. Platform
//! crates implement it on top of their SPI/GPIO stack; tests implement it
//! with scripted replies.

use thiserror::Error;

use crate::phy::channel::{ChannelId, SyncwordClass};
use crate::phy::irq::InterruptStatus;

/// Errors that can occur during HAL operations
#[derive(Debug, Error)]
pub enum HalError {
    #[error("SPI communication error")]
    Spi,

    #[error("GPIO operation error")]
    Gpio,

    #[error("chip did not respond")]
    NoResponse,

    #[error("timeout waiting for chip")]
    Timeout,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Part-identification reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartInfo {
    /// Part number, e.g. 0x4455.
    pub part: u16,
    /// Silicon revision.
    pub rev: u8,
}

/// Modem-status snapshot carrying both RSSI register values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModemStatus {
    /// Instantaneous raw RSSI.
    pub current_rssi: u8,
    /// Raw RSSI latched at the most recent receive event. Stable between
    /// receive events.
    pub latched_rssi: u8,
}

/// Diagnostic device-state reply.
#[derive(Debug, Clone, Copy)]
pub struct DeviceState {
    /// Raw internal state-machine code.
    pub state: u8,
    /// Channel the chip is currently tuned to.
    pub channel: u8,
}

/// Chip-command capability for Si4455-class transceivers.
///
/// All methods are synchronous register/FIFO transactions; none of them
/// may block beyond the transfer itself.
pub trait Hal: Send {
    /// Boot the chip and load its configuration image.
    fn power_up(&mut self) -> Result<(), HalError>;

    /// Read part number and revision. Used to verify the chip responds.
    fn part_info(&mut self) -> Result<PartInfo, HalError>;

    /// Reset both transmit and receive FIFOs.
    fn reset_fifos(&mut self) -> Result<(), HalError>;

    /// Read and clear all three interrupt-status groups in one
    /// transaction.
    fn int_status(&mut self) -> Result<InterruptStatus, HalError>;

    /// Number of bytes waiting in the receive FIFO.
    fn rx_fifo_count(&mut self) -> Result<usize, HalError>;

    /// Drain `buf.len()` bytes from the receive FIFO.
    fn read_rx_fifo(&mut self, buf: &mut [u8]) -> Result<(), HalError>;

    /// Discard any remaining receive FIFO content.
    fn clear_rx_fifo(&mut self) -> Result<(), HalError>;

    /// Enter receive mode on the given channel index.
    fn start_rx(&mut self, channel: u8) -> Result<(), HalError>;

    /// Load `data` into the transmit FIFO and start transmitting on the
    /// given channel index. With `resume_rx` set, the chip re-enters
    /// receive mode by itself once the frame is out.
    fn start_tx(&mut self, channel: u8, data: &[u8], resume_rx: bool) -> Result<(), HalError>;

    /// Read the modem-status reply (instantaneous and latched RSSI).
    fn modem_status(&mut self) -> Result<ModemStatus, HalError>;

    /// Query the chip's internal state machine. Diagnostic only.
    fn device_state(&mut self) -> Result<DeviceState, HalError>;

    /// Program band, rate, coding and center frequency for a channel.
    fn configure_channel(&mut self, channel: &ChannelId) -> Result<(), HalError>;

    /// Program the transmit power level.
    fn configure_eirp(&mut self, eirp_dbm: i8) -> Result<(), HalError>;

    /// Program the sync-word pattern for a class.
    fn configure_syncword(&mut self, class: SyncwordClass) -> Result<(), HalError>;
}
