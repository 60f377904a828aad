pub mod channel;
pub mod driver;
pub mod hal;
pub mod irq;
pub mod packet;
pub mod pending;
pub mod rssi;
