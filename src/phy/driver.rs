//! # Si4455 Radio Driver
//!
//! This module provides the stateful packet I/O driver for Si4455 EZRadio
//! sub-GHz transceivers: the PHY boundary an ultra-low-power protocol
//! stack builds on. It tracks the IDLE/TX/RX mode, owns the one in-flight
//! transmit frame, reconciles conflicting mode-switch requests and turns
//! raw interrupt events into callback invocations.
//!
//! ## Architecture
//!
//! The driver follows a layered architecture:
//! ```text
//! ┌─────────────────────────────────┐
//! │   Protocol stack (DLL / NWL)    │
//! ├─────────────────────────────────┤
//! │   Si4455Driver (this file)      │
//! ├─────────────────────────────────┤
//! │   Hal trait (chip command set)  │
//! ├─────────────────────────────────┤
//! │   Platform-specific HAL impl    │
//! └─────────────────────────────────┘
//! ```
//!
//! Upper layers call the public operations (`init`, `set_receive`,
//! `send_packet`, `rssi`); the platform layer feeds hardware completion
//! events into [`Si4455Driver::handle_interrupt`], which is the only path
//! that completes a transmission, delivers a received frame or re-arms the
//! receiver.
//!
//! ## Concurrency
//!
//! Interrupt dispatch can run on a different context than the API calls
//! (a GPIO interrupt thread on Linux platforms, the ISR on bare-metal
//! shims). All mutable driver state lives behind one internal mutex, so
//! every decision sequence ("if transmitting, defer this receive") is a
//! single critical section with respect to the dispatcher. User callbacks
//! are always invoked with the lock released and may therefore call back
//! into the driver.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ezradio_rs::{HeapBuffers, RadioConfig, RxConfig, Si4455Driver};
//!
//! let driver = Arc::new(Si4455Driver::new(platform_hal, RadioConfig::default()));
//! driver.init(Arc::new(HeapBuffers))?;
//!
//! let on_rx = Arc::new(|packet| println!("got {} bytes", packet.len()));
//! driver.set_receive(RxConfig::default(), Some(on_rx), None)?;
//!
//! // platform interrupt handler:
//! driver.handle_interrupt();
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use thiserror::Error;

use crate::constants::{DEFAULT_RSSI_OFFSET, MAX_PACKET_LEN, RSSI_SETTLE_TIME};
use crate::diag::{self, DiagSink, Direction};
use crate::phy::channel::{ChannelId, RxConfig, SyncwordClass, TxConfig};
use crate::phy::hal::{Hal, HalError};
use crate::phy::packet::{CrcStatus, Packet, PacketBuffers, RxMeta};
use crate::phy::pending::PendingRx;
use crate::phy::rssi::convert_rssi;

/// Radio operating states.
///
/// Exactly one state holds at any instant; it is the single source of
/// truth for which operations are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioState {
    /// No operation in progress (initial state)
    Idle,
    /// A frame is being transmitted
    Tx,
    /// The receiver is armed
    Rx,
}

/// Callback receiving ownership of every delivered frame.
pub type RxCallback = Arc<dyn Fn(Packet) + Send + Sync>;

/// Callback receiving ownership of the transmitted frame back once the
/// chip reports it sent.
pub type TxCallback = Arc<dyn Fn(Packet) + Send + Sync>;

/// Callback invoked with a settled RSSI reading (dBm) after the receiver
/// is armed.
pub type RssiCallback = Arc<dyn Fn(i16) + Send + Sync>;

/// Power-on defaults programmed at `init`.
#[derive(Debug, Clone)]
pub struct RadioConfig {
    pub default_channel: ChannelId,
    pub default_syncword: SyncwordClass,
    pub default_eirp_dbm: i8,
    /// Board-specific RSSI correction in dB.
    pub rssi_offset_db: i16,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            default_channel: ChannelId::default(),
            default_syncword: SyncwordClass::default(),
            default_eirp_dbm: 0,
            rssi_offset_db: DEFAULT_RSSI_OFFSET,
        }
    }
}

/// Errors returned by driver operations.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Chip communication failure, surfaced from the HAL.
    #[error("chip error: {0}")]
    Hal(#[from] HalError),
    /// A receive callback requires buffer capabilities registered at
    /// `init`.
    #[error("packet buffers not registered")]
    MissingBuffers,
    /// The operation is not wired up on this chip.
    #[error("operation not supported")]
    Unsupported,
}

/// Reason a `send_packet` call was rejected.
#[derive(Debug, Error)]
pub enum SendErrorKind {
    #[error("transmission already in progress")]
    Busy,
    #[error("packet length {len} exceeds limit {max}")]
    Size { len: usize, max: usize },
    #[error("packet carries no transmit configuration")]
    MissingTxConfig,
    #[error("chip error: {0}")]
    Hal(#[from] HalError),
}

/// A failed transmission request.
///
/// Returns the frame to the caller along with the reason, so packet
/// ownership is never lost to a rejected call.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct SendError {
    pub packet: Packet,
    pub kind: SendErrorKind,
}

struct DriverInner<H: Hal> {
    hal: H,
    defaults: RadioConfig,
    state: RadioState,
    /// The frame being transmitted. Occupied exactly while `state == Tx`
    /// outside of dispatch.
    current_packet: Option<Packet>,
    pending_rx: PendingRx,
    /// Channel/sync word last programmed into the chip, by either mode.
    current_channel: ChannelId,
    current_syncword: SyncwordClass,
    current_eirp_dbm: i8,
    rssi_offset_db: i16,
    buffers: Option<Arc<dyn PacketBuffers>>,
    rx_callback: Option<RxCallback>,
    rssi_callback: Option<RssiCallback>,
    tx_callback: Option<TxCallback>,
    diag: Option<Arc<dyn DiagSink>>,
}

/// Driver for Si4455 EZRadio transceivers.
///
/// One instance owns one chip. The instance is `Sync`; share it behind an
/// `Arc` between the protocol stack and the platform's interrupt context.
pub struct Si4455Driver<H: Hal> {
    inner: Mutex<DriverInner<H>>,
}

impl<H: Hal> Si4455Driver<H> {
    /// Create a driver instance. Performs no chip I/O; call
    /// [`init`](Self::init) before anything else.
    pub fn new(hal: H, config: RadioConfig) -> Self {
        Self {
            inner: Mutex::new(DriverInner {
                hal,
                state: RadioState::Idle,
                current_packet: None,
                pending_rx: PendingRx::default(),
                current_channel: config.default_channel,
                current_syncword: config.default_syncword,
                current_eirp_dbm: config.default_eirp_dbm,
                rssi_offset_db: config.rssi_offset_db,
                defaults: config,
                buffers: None,
                rx_callback: None,
                rssi_callback: None,
                tx_callback: None,
                diag: None,
            }),
        }
    }

    /// Attach a diagnostic sink for binary PHY packet records.
    pub fn with_diag_sink(self, sink: Arc<dyn DiagSink>) -> Self {
        self.lock().diag = Some(sink);
        self
    }

    // Poison recovery keeps interrupt dispatch alive even if a user
    // callback panicked while the driver was re-entered.
    fn lock(&self) -> MutexGuard<'_, DriverInner<H>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bring up the chip and register the packet-buffer capability.
    ///
    /// Resets the driver to `Idle` (dropping any in-flight frame and
    /// deferred configuration), powers the chip up, verifies it responds
    /// to identification, resets both FIFOs and programs the default
    /// channel, EIRP and sync word.
    pub fn init(&self, buffers: Arc<dyn PacketBuffers>) -> Result<(), DriverError> {
        let mut inner = self.lock();
        inner.buffers = Some(buffers);
        inner.state = RadioState::Idle;
        inner.current_packet = None;
        inner.pending_rx.clear();
        inner.current_channel = inner.defaults.default_channel;
        inner.current_syncword = inner.defaults.default_syncword;
        inner.current_eirp_dbm = inner.defaults.default_eirp_dbm;

        inner.hal.power_up()?;
        let part = inner.hal.part_info()?;
        log::info!("radio device Si{:04X} rev {}", part.part, part.rev);
        inner.hal.reset_fifos()?;

        let channel = inner.current_channel;
        let syncword = inner.current_syncword;
        let eirp = inner.current_eirp_dbm;
        inner.hal.configure_channel(&channel)?;
        inner.hal.configure_eirp(eirp)?;
        inner.hal.configure_syncword(syncword)?;
        Ok(())
    }

    /// Arm the receiver, or defer the request until the in-flight
    /// transmission completes.
    ///
    /// The callbacks replace any previous registrations. When `rssi_cb` is
    /// given and the receiver is armed immediately, this call blocks for
    /// [`RSSI_SETTLE_TIME`] before sampling and invoking it.
    pub fn set_receive(
        &self,
        cfg: RxConfig,
        rx_cb: Option<RxCallback>,
        rssi_cb: Option<RssiCallback>,
    ) -> Result<(), DriverError> {
        let mut inner = self.lock();
        if rx_cb.is_some() && inner.buffers.is_none() {
            return Err(DriverError::MissingBuffers);
        }
        inner.rx_callback = rx_cb;
        inner.rssi_callback = rssi_cb;

        // a transmission is in flight: park the request, the dispatcher
        // applies it on PACKET_SENT
        if inner.state == RadioState::Tx {
            inner.pending_rx.store(cfg);
            return Ok(());
        }

        let notify = inner.start_rx(cfg)?;
        drop(inner);
        if let Some((cb, dbm)) = notify {
            cb(dbm);
        }
        Ok(())
    }

    /// Start transmitting a frame.
    ///
    /// Returns once the chip has been started; completion is reported
    /// asynchronously through `tx_cb` (which replaces any previous
    /// registration). An active receive is remembered and resumed after
    /// the transmission. Rejected calls hand the frame back inside
    /// [`SendError`].
    pub fn send_packet(&self, packet: Packet, tx_cb: Option<TxCallback>) -> Result<(), SendError> {
        let mut inner = self.lock();

        if inner.state == RadioState::Tx {
            return Err(SendError {
                packet,
                kind: SendErrorKind::Busy,
            });
        }
        if packet.len() >= MAX_PACKET_LEN {
            let len = packet.len();
            return Err(SendError {
                packet,
                kind: SendErrorKind::Size {
                    len,
                    max: MAX_PACKET_LEN,
                },
            });
        }
        let tx_cfg = match packet.tx_meta() {
            Some(meta) => meta.config,
            None => {
                return Err(SendError {
                    packet,
                    kind: SendErrorKind::MissingTxConfig,
                })
            }
        };

        inner.tx_callback = tx_cb;

        // interrupted receive: remember what is on the chip right now, not
        // whatever the caller last asked for
        let prev_state = inner.state;
        let mut armed_here = false;
        if inner.state == RadioState::Rx {
            let resume = RxConfig {
                channel_id: inner.current_channel,
                syncword_class: inner.current_syncword,
            };
            inner.pending_rx.store(resume);
            armed_here = true;
        }
        inner.state = RadioState::Tx;

        log::debug!("tx fifo data: {}", hex::encode(packet.data()));

        let resume_rx = inner.pending_rx.is_armed();
        match inner.program_tx(&tx_cfg, packet.data(), resume_rx) {
            Ok(()) => {
                inner.current_packet = Some(packet);
                Ok(())
            }
            Err(e) => {
                // roll back the partial mode switch so the failed call has
                // no observable side effect on the state machine
                inner.state = prev_state;
                if armed_here {
                    inner.pending_rx.take();
                }
                Err(SendError {
                    packet,
                    kind: e.into(),
                })
            }
        }
    }

    /// Instantaneous signal strength in dBm. Legal in any state.
    pub fn rssi(&self) -> Result<i16, DriverError> {
        let mut inner = self.lock();
        let status = inner.hal.modem_status()?;
        Ok(convert_rssi(status.current_rssi, inner.rssi_offset_db))
    }

    /// Signal strength latched at the most recent receive event, in dBm.
    /// Stable between receive events; reading it has no side effect.
    pub fn latched_rssi(&self) -> Result<i16, DriverError> {
        let mut inner = self.lock();
        let status = inner.hal.modem_status()?;
        Ok(convert_rssi(status.latched_rssi, inner.rssi_offset_db))
    }

    /// Request a direct transition to `Idle`.
    ///
    /// Never wired up on this chip: always returns
    /// [`DriverError::Unsupported`]. The driver reaches `Idle` only after
    /// a transmission with no deferred receive.
    pub fn set_idle(&self) -> Result<(), DriverError> {
        Err(DriverError::Unsupported)
    }

    /// Current state of the radio state machine.
    pub fn state(&self) -> RadioState {
        self.lock().state
    }

    /// Deferred receive configuration, if a switch is outstanding.
    pub fn pending_rx(&self) -> Option<RxConfig> {
        self.lock().pending_rx.peek()
    }

    /// A transmit frame is owned by the driver.
    pub fn tx_in_flight(&self) -> bool {
        self.lock().current_packet.is_some()
    }

    /// Process one hardware completion event.
    ///
    /// The platform layer calls this from its interrupt context whenever
    /// the chip raises its interrupt line. Errors are logged, never
    /// returned, since there is no caller to report to across the
    /// interrupt boundary, and the state machine stays consistent.
    /// Apart from register and FIFO transfers (and the RSSI settling wait
    /// when re-arming with an RSSI callback registered), nothing here
    /// blocks.
    pub fn handle_interrupt(&self) {
        let mut inner = self.lock();

        let status = match inner.hal.int_status() {
            Ok(status) => status,
            Err(e) => {
                log::error!("interrupt status read failed: {e}");
                return;
            }
        };
        log::debug!(
            "irq int_pend {:08b} ph_pend {:08b} modem_pend {:08b} chip_pend {:08b}",
            status.int_pend,
            status.ph_pend,
            status.modem_pend,
            status.chip_pend
        );

        if status.modem_pending() {
            log::debug!("modem event (no action)");
        }

        if status.ph_pending() {
            match inner.state {
                RadioState::Rx => {
                    if status.packet_rx() {
                        inner = self.dispatch_rx_complete(inner);
                    } else {
                        log::debug!("unexpected ph event in rx: {:08b}", status.ph_pend);
                    }
                }
                RadioState::Tx => {
                    if status.packet_sent() {
                        inner = self.dispatch_tx_complete(inner);
                    } else {
                        log::debug!("unexpected ph event in tx: {:08b}", status.ph_pend);
                    }
                }
                RadioState::Idle => {
                    log::debug!("ph event while idle ignored: {:08b}", status.ph_pend);
                }
            }
        }

        if status.chip_pending() && inner.state != RadioState::Idle {
            if status.state_change() {
                match inner.hal.device_state() {
                    Ok(ds) => log::debug!("chip state {} channel {}", ds.state, ds.channel),
                    Err(e) => log::warn!("device state query failed: {e}"),
                }
            } else {
                log::debug!("unhandled chip event: {:08b}", status.chip_pend);
            }
        }
    }

    /// Receive completion: pull the frame out of the FIFO, deliver it,
    /// re-arm. Releases the lock around the delivery callback.
    fn dispatch_rx_complete<'a>(
        &'a self,
        mut inner: MutexGuard<'a, DriverInner<H>>,
    ) -> MutexGuard<'a, DriverInner<H>> {
        let count = match inner.hal.rx_fifo_count() {
            Ok(count) => count,
            Err(e) => {
                log::error!("rx fifo count read failed: {e}");
                return inner;
            }
        };
        log::debug!("rx complete, {count} bytes");

        let buffers = match &inner.buffers {
            Some(buffers) => Arc::clone(buffers),
            None => {
                log::error!("receive event with no buffer capability, dropping frame");
                if let Err(e) = inner.hal.clear_rx_fifo() {
                    log::warn!("rx fifo clear failed: {e}");
                }
                return inner;
            }
        };

        let mut packet = buffers.allocate(count);
        packet.data_mut().resize(count, 0);
        if let Err(e) = inner.hal.read_rx_fifo(&mut packet.data_mut()[..count]) {
            log::error!("rx fifo read failed: {e}");
            buffers.release(packet);
            return inner;
        }

        let rssi_dbm = match inner.hal.modem_status() {
            Ok(status) => convert_rssi(status.latched_rssi, inner.rssi_offset_db),
            Err(e) => {
                log::warn!("latched rssi read failed: {e}");
                0
            }
        };
        packet.set_rx_meta(RxMeta {
            rssi_dbm,
            lqi: 0,
            channel_id: inner.current_channel,
            crc_status: CrcStatus::Unavailable,
            timestamp: Instant::now(),
        });

        if let Err(e) = inner.hal.clear_rx_fifo() {
            log::warn!("rx fifo clear failed: {e}");
        }
        if let Some(sink) = &inner.diag {
            sink.emit(&diag::phy_packet_frame(&packet, Direction::Rx));
        }

        let rx_cb = inner.rx_callback.clone();
        drop(inner);

        // ownership of the frame moves here; with no consumer registered
        // it goes straight back to the pool
        match rx_cb {
            Some(cb) => cb(packet),
            None => buffers.release(packet),
        }

        let mut inner = self.lock();
        if inner.state == RadioState::Rx {
            // the callback may have retuned or started a transmission, in
            // which case the state changed and re-arming is skipped
            let resume = RxConfig {
                channel_id: inner.current_channel,
                syncword_class: inner.current_syncword,
            };
            match inner.start_rx(resume) {
                Ok(Some((cb, dbm))) => {
                    drop(inner);
                    cb(dbm);
                    return self.lock();
                }
                Ok(None) => {}
                Err(e) => log::error!("rx re-arm failed: {e}"),
            }
        }
        inner
    }

    /// Transmit completion: hand the frame back and resume a deferred
    /// receive. Releases the lock around the completion callback.
    fn dispatch_tx_complete<'a>(
        &'a self,
        mut inner: MutexGuard<'a, DriverInner<H>>,
    ) -> MutexGuard<'a, DriverInner<H>> {
        log::debug!("packet sent");

        if !inner.pending_rx.is_armed() {
            // nothing to resume; the chip parks itself after TX
            inner.state = RadioState::Idle;
        }

        let mut packet = match inner.current_packet.take() {
            Some(packet) => packet,
            None => {
                log::warn!("transmit completion with no frame in flight");
                return inner;
            }
        };
        if let Some(meta) = packet.tx_meta_mut() {
            meta.timestamp = Some(Instant::now());
        }
        if let Some(sink) = &inner.diag {
            sink.emit(&diag::phy_packet_frame(&packet, Direction::Tx));
        }

        let tx_cb = inner.tx_callback.clone();
        drop(inner);

        // ownership returns to the sender; unclaimed frames are dropped
        match tx_cb {
            Some(cb) => cb(packet),
            None => drop(packet),
        }

        let mut inner = self.lock();
        if let Some(cfg) = inner.pending_rx.take() {
            // a receive was requested (or interrupted) while the frame was
            // in flight
            match inner.start_rx(cfg) {
                Ok(Some((cb, dbm))) => {
                    drop(inner);
                    cb(dbm);
                    return self.lock();
                }
                Ok(None) => {}
                Err(e) => {
                    log::error!("deferred rx start failed: {e}");
                    inner.state = RadioState::Idle;
                }
            }
        }
        inner
    }
}

impl<H: Hal> DriverInner<H> {
    /// Program the chip for receive and update the tracked configuration.
    ///
    /// When an RSSI callback is registered, the settling wait happens here
    /// while the state lock is held (the calling context stalls for the
    /// full [`RSSI_SETTLE_TIME`]), but the callback itself must be invoked
    /// by the caller after releasing the lock, since it may re-enter the
    /// driver.
    fn start_rx(&mut self, cfg: RxConfig) -> Result<Option<(RssiCallback, i16)>, HalError> {
        self.hal.configure_channel(&cfg.channel_id)?;
        self.hal.configure_syncword(cfg.syncword_class)?;
        self.hal.start_rx(cfg.channel_id.center_freq_index)?;
        self.state = RadioState::Rx;
        self.current_channel = cfg.channel_id;
        self.current_syncword = cfg.syncword_class;

        let cb = match &self.rssi_callback {
            Some(cb) => cb.clone(),
            None => return Ok(None),
        };
        std::thread::sleep(RSSI_SETTLE_TIME);
        let status = self.hal.modem_status()?;
        Ok(Some((cb, convert_rssi(status.current_rssi, self.rssi_offset_db))))
    }

    /// Program channel, power and sync word for a transmission and start
    /// it. Tracked values update only after the chip accepted the start.
    fn program_tx(&mut self, cfg: &TxConfig, data: &[u8], resume_rx: bool) -> Result<(), HalError> {
        self.hal.configure_channel(&cfg.channel_id)?;
        self.hal.configure_eirp(cfg.eirp_dbm)?;
        self.hal.configure_syncword(cfg.syncword_class)?;
        self.hal
            .start_tx(cfg.channel_id.center_freq_index, data, resume_rx)?;
        self.current_channel = cfg.channel_id;
        self.current_syncword = cfg.syncword_class;
        self.current_eirp_dbm = cfg.eirp_dbm;
        Ok(())
    }
}
