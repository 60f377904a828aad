//! # PHY Channel and Transmit Configuration
//!
//! This module defines the types that identify a logical radio channel and
//! the per-operation receive/transmit configurations built from it. A
//! channel is described by its frequency band, rate class, coding scheme
//! and center-frequency index; the chip-command layer translates these into
//! register settings, so the driver treats them as opaque identifiers.
//!
//! A channel is immutable for the duration of an operation: once programmed
//! for a receive or transmit, it does not change until the next mode switch.

/// Frequency band a channel lives in.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyBand {
    /// 433 MHz ISM band
    Band433 = 0x00,
    /// 868 MHz SRD band
    Band868 = 0x01,
    /// 915 MHz ISM band
    Band915 = 0x02,
}

/// Data-rate class of a channel.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateClass {
    /// Low-rate profile for maximum sensitivity
    LoRate = 0x00,
    /// Default rate profile
    NormalRate = 0x01,
    /// High-rate profile for short bursts
    HiRate = 0x02,
}

/// Bitstream coding applied on air.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelCoding {
    /// PN9 whitening
    Pn9 = 0x00,
    /// Forward error correction
    Fec = 0x01,
}

/// Sync-word pattern class marking frame boundaries.
///
/// The concrete bit pattern behind each class is programmed by the
/// chip-command layer.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncwordClass {
    #[default]
    Class0 = 0x00,
    Class1 = 0x01,
}

/// Identifies a receive/transmit channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelId {
    pub freq_band: FrequencyBand,
    pub rate_class: RateClass,
    pub coding: ChannelCoding,
    /// Index of the center frequency within the band/rate grid.
    pub center_freq_index: u8,
}

impl Default for ChannelId {
    /// Power-on default: 433 MHz, normal rate, PN9 coding, index 0.
    fn default() -> Self {
        Self {
            freq_band: FrequencyBand::Band433,
            rate_class: RateClass::NormalRate,
            coding: ChannelCoding::Pn9,
            center_freq_index: 0,
        }
    }
}

/// Input to entering receive mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RxConfig {
    pub channel_id: ChannelId,
    pub syncword_class: SyncwordClass,
}

/// Per-packet transmit settings carried in a packet's transmit metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxConfig {
    pub channel_id: ChannelId,
    /// Effective isotropic radiated power in dBm.
    pub eirp_dbm: i8,
    pub syncword_class: SyncwordClass,
}

impl Default for TxConfig {
    fn default() -> Self {
        Self {
            channel_id: ChannelId::default(),
            eirp_dbm: 0,
            syncword_class: SyncwordClass::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_channel_matches_power_on_profile() {
        let ch = ChannelId::default();
        assert_eq!(ch.freq_band, FrequencyBand::Band433);
        assert_eq!(ch.rate_class, RateClass::NormalRate);
        assert_eq!(ch.coding, ChannelCoding::Pn9);
        assert_eq!(ch.center_freq_index, 0);
    }

    #[test]
    fn default_tx_config_uses_zero_eirp() {
        let cfg = TxConfig::default();
        assert_eq!(cfg.eirp_dbm, 0);
        assert_eq!(cfg.syncword_class, SyncwordClass::Class0);
    }
}
