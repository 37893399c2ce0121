//! Radio driver capability consumed by the sniffing engine.
//!
//! The engine never touches registers itself. A platform crate implements
//! [`Driver`] for its transceiver (the ESP-IDF firmware wires a CC1101 over
//! SPI); tests use a scripted fake.
//!
//! Every method must return within a small fraction of the tick period. A
//! bus transaction that can stall has to enforce its own timeout and report
//! it as an error instead of blocking the loop.

use thiserror::Error;

/// A failed radio operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RadioError {
    /// Nothing complete arrived in time. Expected during normal reception.
    #[error("receive timed out")]
    Timeout,
    /// Any other driver status code (negative RadioLib-style codes,
    /// CRC failures, FIFO overflows, bus errors, ...)
    #[error("radio error code {0}")]
    Code(i16),
}

impl RadioError {
    /// Numeric status code, following the RadioLib convention that the
    /// receive timeout is -6.
    pub fn code(&self) -> i16 {
        match self {
            RadioError::Timeout => codes::RX_TIMEOUT,
            RadioError::Code(c) => *c,
        }
    }
}

/// Well-known status codes shared by driver implementations.
pub mod codes {
    pub const CHIP_NOT_FOUND: i16 = -2;
    pub const PACKET_TOO_LONG: i16 = -4;
    pub const RX_TIMEOUT: i16 = -6;
    pub const CRC_MISMATCH: i16 = -7;
    pub const INVALID_FREQUENCY: i16 = -12;
    pub const INVALID_BIT_RATE: i16 = -101;
    pub const INVALID_RX_BANDWIDTH: i16 = -104;
    pub const FIFO_OVERFLOW: i16 = -200;
    pub const SPI_FAILURE: i16 = -300;
}

/// Transceiver operations the engine needs.
pub trait Driver {
    /// Reset and bring up the chip. Called once per session.
    fn begin(&mut self) -> Result<(), RadioError>;

    /// Retune the synthesizer (MHz).
    fn set_frequency(&mut self, mhz: f32) -> Result<(), RadioError>;

    /// Select On-Off Keying (true) or FSK (false).
    fn set_ook(&mut self, enabled: bool) -> Result<(), RadioError>;

    /// Set the data rate (kbps).
    fn set_bit_rate(&mut self, kbps: f32) -> Result<(), RadioError>;

    /// Set the receiver filter bandwidth (kHz).
    fn set_rx_bandwidth(&mut self, khz: f32) -> Result<(), RadioError>;

    /// Instantaneous channel energy in dBm.
    fn rssi(&mut self) -> f32;

    /// Enter (or re-enter) receive mode. Idempotent.
    fn start_receive(&mut self) -> Result<(), RadioError>;

    /// Bytes ready to read; zero or negative means none.
    fn available(&mut self) -> i16;

    /// Read the pending packet into `buf`, which is never longer than the
    /// session's receive capacity.
    fn read_data(&mut self, buf: &mut [u8]) -> Result<(), RadioError>;

    /// Length of the packet returned by the last successful `read_data`.
    fn packet_length(&mut self) -> usize;

    /// Put the chip into a safe idle state. Called exactly once when the
    /// owning session is dropped, whether or not `begin` succeeded.
    fn shutdown(&mut self) {}
}

impl<D: Driver + ?Sized> Driver for &mut D {
    fn begin(&mut self) -> Result<(), RadioError> {
        (**self).begin()
    }

    fn set_frequency(&mut self, mhz: f32) -> Result<(), RadioError> {
        (**self).set_frequency(mhz)
    }

    fn set_ook(&mut self, enabled: bool) -> Result<(), RadioError> {
        (**self).set_ook(enabled)
    }

    fn set_bit_rate(&mut self, kbps: f32) -> Result<(), RadioError> {
        (**self).set_bit_rate(kbps)
    }

    fn set_rx_bandwidth(&mut self, khz: f32) -> Result<(), RadioError> {
        (**self).set_rx_bandwidth(khz)
    }

    fn rssi(&mut self) -> f32 {
        (**self).rssi()
    }

    fn start_receive(&mut self) -> Result<(), RadioError> {
        (**self).start_receive()
    }

    fn available(&mut self) -> i16 {
        (**self).available()
    }

    fn read_data(&mut self, buf: &mut [u8]) -> Result<(), RadioError> {
        (**self).read_data(buf)
    }

    fn packet_length(&mut self) -> usize {
        (**self).packet_length()
    }

    fn shutdown(&mut self) {
        (**self).shutdown()
    }
}
