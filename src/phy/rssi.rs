//! # RSSI Conversion
//!
//! The chip reports signal strength as an unsigned register value; the
//! modem-status reply carries both the instantaneous reading and the value
//! latched at the most recent receive event. This module converts either
//! raw value into dBm.

use crate::constants::RSSI_CONVERSION_BASE;

/// Convert a raw RSSI register value to dBm.
///
/// The register counts half-dB steps above the conversion base;
/// `offset_db` is a board-specific correction (default 0).
///
/// # Examples
///
/// ```
/// use ezradio_rs::phy::rssi::convert_rssi;
///
/// assert_eq!(convert_rssi(200, 0), -30);
/// ```
pub fn convert_rssi(raw: u8, offset_db: i16) -> i16 {
    ((raw >> 1) as i16) - (RSSI_CONVERSION_BASE + offset_db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reference_conversion_values() {
        assert_eq!(convert_rssi(200, 0), -30);
        assert_eq!(convert_rssi(0, 0), -130);
        assert_eq!(convert_rssi(255, 0), -3);
    }

    #[test]
    fn offset_shifts_the_result_down() {
        assert_eq!(convert_rssi(200, 5), -35);
        assert_eq!(convert_rssi(200, -5), -25);
    }

    proptest! {
        #[test]
        fn conversion_is_monotonic_in_raw_value(a in 0u8..=254) {
            prop_assert!(convert_rssi(a, 0) <= convert_rssi(a + 1, 0));
        }

        #[test]
        fn converted_value_stays_in_register_range(raw in 0u8.., offset in -20i16..=20) {
            let dbm = convert_rssi(raw, offset);
            prop_assert!(dbm >= -130 - offset);
            prop_assert!(dbm <= -3 - offset);
        }
    }
}
