//! # ezradio-rs: A Rust Driver for Si4455 EZRadio Transceivers
//!
//! The ezradio-rs crate provides the physical-layer boundary of an
//! ultra-low-power sub-GHz sensor-network stack: it turns the
//! command-level Si4455 "EZRadio" transceiver into a stateful packet I/O
//! device with asynchronous send/receive operations.
//!
//! ## Features
//!
//! - IDLE/TX/RX state machine with validated mode switches
//! - Deferred mode switching: a receive requested mid-transmission (or a
//!   transmission interrupting an active receive) is applied automatically
//!   once the in-flight operation completes
//! - Interrupt-driven operation: the platform feeds completion events into
//!   one dispatch entry point, callbacks carry the results out
//! - Move-only packet ownership across the driver boundary
//! - Pluggable chip access ([`Hal`]) and buffer management
//!   ([`PacketBuffers`]) capabilities
//! - RSSI measurement (instantaneous and latched) in dBm
//! - Binary diagnostic records with explicit field-by-field serialization
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ezradio_rs::{HeapBuffers, Packet, RadioConfig, RxConfig, Si4455Driver, TxConfig};
//!
//! let driver = Arc::new(Si4455Driver::new(platform_hal, RadioConfig::default()));
//! driver.init(Arc::new(HeapBuffers))?;
//!
//! // receive until further notice, frames arrive via the callback
//! driver.set_receive(RxConfig::default(), Some(Arc::new(on_frame)), None)?;
//!
//! // transmit one frame; the receive above resumes afterwards
//! let packet = Packet::for_tx(frame_bytes, TxConfig::default());
//! driver.send_packet(packet, Some(Arc::new(on_sent)))?;
//! ```

pub mod constants;
pub mod diag;
pub mod logging;
pub mod phy;

pub use crate::logging::{init_logger, LogSink};

// Core PHY types
pub use crate::phy::channel::{
    ChannelCoding, ChannelId, FrequencyBand, RateClass, RxConfig, SyncwordClass, TxConfig,
};
pub use crate::phy::driver::{
    DriverError, RadioConfig, RadioState, RssiCallback, RxCallback, SendError, SendErrorKind,
    Si4455Driver, TxCallback,
};
pub use crate::phy::hal::{DeviceState, Hal, HalError, ModemStatus, PartInfo};
pub use crate::phy::irq::{ChipPendBit, IntPendBit, InterruptStatus, PhPendBit};
pub use crate::phy::packet::{CrcStatus, HeapBuffers, Packet, PacketBuffers, RxMeta, TxMeta};
