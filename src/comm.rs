/// Serial NDJSON output.
///
/// The sniffer streams its events as newline-delimited JSON over the log
/// output (UART on the firmware). [`LogSink`] is the production
/// [`Sink`]: packets and lock events become JSON lines, diagnostics go to
/// the `log` facade unchanged.
use crate::protocol::{DeviceMessage, MsgBuffer, MAX_MSG_LEN};
use crate::sink::Sink;

/// Serialize a DeviceMessage to JSON bytes and write to the output buffer.
/// Returns the number of bytes written, or None if serialization failed.
pub fn serialize_message(msg: &DeviceMessage, buf: &mut [u8]) -> Option<usize> {
    match serde_json_core::to_slice(msg, buf) {
        Ok(len) => {
            // Append newline for NDJSON
            if len < buf.len() {
                buf[len] = b'\n';
                Some(len + 1)
            } else {
                Some(len)
            }
        }
        Err(_) => None,
    }
}

/// Serialize `msg` into an owned NDJSON line.
pub fn encode_message(msg: &DeviceMessage) -> Option<MsgBuffer> {
    let mut buf = MsgBuffer::new();
    buf.resize_default(MAX_MSG_LEN).ok()?;
    let len = serialize_message(msg, &mut buf)?;
    buf.truncate(len);
    Some(buf)
}

/// Serialize `msg` and write it as one log line.
pub fn emit(msg: &DeviceMessage) {
    match encode_message(msg) {
        Some(line) => {
            if let Ok(s) = core::str::from_utf8(&line) {
                log::info!("{}", s.trim_end());
            }
        }
        None => log::warn!("Dropping event: JSON serialization failed"),
    }
}

/// Sink that writes events as NDJSON through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl Sink for LogSink {
    fn publish(&mut self, hex: &str, rssi: f32) {
        emit(&DeviceMessage::Packet {
            data: hex,
            len: hex_len(hex),
            rssi,
        });
    }

    fn locked(&mut self, frequency_mhz: f32, rssi: f32, baseline: f32) {
        emit(&DeviceMessage::Locked {
            freq: frequency_mhz,
            rssi,
            baseline,
        });
    }
}

/// Byte count of a payload encoded as spaced hex.
fn hex_len(hex: &str) -> usize {
    (hex.len() + 1) / 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_message_ends_with_newline() {
        let msg = DeviceMessage::Packet {
            data: "01 02",
            len: 2,
            rssi: -70.0,
        };
        let line = encode_message(&msg).unwrap();
        assert_eq!(line.last(), Some(&b'\n'));
        assert_eq!(line.iter().filter(|&&b| b == b'\n').count(), 1);
    }

    #[test]
    fn serialize_into_small_buffer_fails() {
        let msg = DeviceMessage::Packet {
            data: "01 02 03 04",
            len: 4,
            rssi: -70.0,
        };
        let mut buf = [0u8; 8];
        assert_eq!(serialize_message(&msg, &mut buf), None);
    }

    #[test]
    fn hex_len_counts_bytes() {
        assert_eq!(hex_len(""), 0);
        assert_eq!(hex_len("AB"), 1);
        assert_eq!(hex_len("DE AD BE EF"), 4);
    }
}
