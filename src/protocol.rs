/// JSON event protocol for sniffer output.
///
/// All messages are newline-delimited JSON (NDJSON), one event per line.
/// Uses `heapless` buffers for no_std/no-alloc operation.
use heapless::Vec;
use serde::Serialize;

use crate::session::{Phase, Status};

/// Events emitted by the sniffer
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum DeviceMessage<'a> {
    /// A captured packet
    #[serde(rename = "packet")]
    Packet {
        /// Payload as spaced uppercase hex
        data: &'a str,
        /// Payload length in bytes
        len: usize,
        rssi: f32,
    },
    /// Scanning stopped on an active channel
    #[serde(rename = "locked")]
    Locked {
        freq: f32,
        /// RSSI of the sample that triggered the lock
        rssi: f32,
        /// Noise floor it was compared against
        baseline: f32,
    },
    /// Periodic status report
    #[serde(rename = "status")]
    Status {
        /// "uninitialized", "scanning", "locked", "fixed" or "failed"
        phase: &'static str,
        /// Frequency the radio is tuned to (MHz)
        freq: f32,
        #[serde(skip_serializing_if = "Option::is_none")]
        baseline: Option<f32>,
        ticks: u32,
        packets: u32,
        errors: u32,
        spikes: u32,
        /// Driver init error code, when the radio never came up
        #[serde(skip_serializing_if = "Option::is_none")]
        init_error: Option<i16>,
        /// Board identifier
        board: &'static str,
        /// Firmware version
        version: &'static str,
    },
}

impl DeviceMessage<'static> {
    /// Status report for a session snapshot.
    pub fn status(status: &Status, board: &'static str) -> Self {
        let init_error = match status.phase {
            Phase::Failed(code) => Some(code),
            _ => None,
        };
        DeviceMessage::Status {
            phase: status.phase.as_str(),
            freq: status.frequency_mhz,
            baseline: status.baseline,
            ticks: status.ticks,
            packets: status.packets,
            errors: status.errors,
            spikes: status.spikes,
            init_error,
            board,
            version: VERSION,
        }
    }
}

/// Firmware version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum size of a serialized JSON message. A full 128-byte payload is
/// 383 hex characters; the rest is envelope.
pub const MAX_MSG_LEN: usize = 512;

/// Buffer type for serialized JSON messages
pub type MsgBuffer = Vec<u8, MAX_MSG_LEN>;
