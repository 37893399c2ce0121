/// Raw packet capture.
///
/// Drains whatever the radio has buffered, classifies the read outcome and
/// forwards successful captures to the sink as hex. Reception is re-armed
/// after every attempt so one packet can never stall the receiver.
use heapless::Vec;
use log::Level;

use crate::config::MAX_PACKET_LEN;
use crate::driver::{Driver, RadioError};
use crate::hex::encode_hex;
use crate::sink::Sink;

/// A captured packet. Transient: handed to the sink and the host within
/// the tick that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub data: Vec<u8, MAX_PACKET_LEN>,
    /// RSSI measured right after the read (dBm)
    pub rssi: f32,
    /// Frequency the radio was tuned to (MHz)
    pub frequency_mhz: f32,
}

/// Running totals of capture outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    pub packets: u32,
    pub empty: u32,
    pub timeouts: u32,
    pub errors: u32,
    pub clamped: u32,
}

pub struct PacketCapture {
    buf: [u8; MAX_PACKET_LEN],
    capacity: usize,
    stats: CaptureStats,
}

impl PacketCapture {
    /// `capacity` is clamped to `1..=MAX_PACKET_LEN`.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: [0; MAX_PACKET_LEN],
            capacity: capacity.clamp(1, MAX_PACKET_LEN),
            stats: CaptureStats::default(),
        }
    }

    /// Read one pending packet, if the radio reports any bytes.
    ///
    /// - success: publish the hex payload and RSSI, return the packet
    /// - zero-length success: dropped, nothing published
    /// - timeout: nothing arrived, silent
    /// - any other error: warning, no packet
    ///
    /// `start_receive` is issued before returning in every case.
    pub fn poll<D: Driver, S: Sink>(
        &mut self,
        frequency_mhz: f32,
        driver: &mut D,
        sink: &mut S,
    ) -> Option<Packet> {
        let packet = self.read(frequency_mhz, driver, sink);

        if let Err(e) = driver.start_receive() {
            sink.log(Level::Warn, format_args!("startReceive() failed: {}", e));
        }

        packet
    }

    fn read<D: Driver, S: Sink>(
        &mut self,
        frequency_mhz: f32,
        driver: &mut D,
        sink: &mut S,
    ) -> Option<Packet> {
        let available = driver.available();
        if available <= 0 {
            return None;
        }
        sink.log(
            Level::Info,
            format_args!("Packet available: {} bytes", available),
        );

        let buf = &mut self.buf[..self.capacity];
        match driver.read_data(buf) {
            Ok(()) => {}
            Err(RadioError::Timeout) => {
                self.stats.timeouts += 1;
                log::trace!("readData timed out");
                return None;
            }
            Err(e) => {
                self.stats.errors += 1;
                sink.log(Level::Warn, format_args!("readData error: {}", e.code()));
                return None;
            }
        }

        let reported = driver.packet_length();
        let len = if reported > self.capacity {
            self.stats.clamped += 1;
            sink.log(
                Level::Warn,
                format_args!(
                    "Reported packet length {} exceeds {} byte buffer, truncating",
                    reported, self.capacity
                ),
            );
            self.capacity
        } else {
            reported
        };

        if len == 0 {
            self.stats.empty += 1;
            log::debug!("Dropping zero-length packet");
            return None;
        }

        let rssi = driver.rssi();
        let data = Vec::from_slice(&self.buf[..len]).ok()?;
        let hex = encode_hex(&data);

        sink.log(
            Level::Info,
            format_args!(
                "Packet received: {} bytes, RSSI {:.1} dBm, data {}",
                len, rssi, hex
            ),
        );
        sink.publish(&hex, rssi);
        self.stats.packets += 1;

        Some(Packet {
            data,
            rssi,
            frequency_mhz,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CaptureStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::codes;
    use crate::testing::{Call, FakeDriver, FakeSink, Reception};

    #[test]
    fn nothing_available_still_rearms() {
        let mut cap = PacketCapture::new(128);
        let mut d = FakeDriver::new();
        let mut sink = FakeSink::new();
        assert_eq!(cap.poll(868.3, &mut d, &mut sink), None);
        assert_eq!(d.calls, vec![Call::Available, Call::StartReceive]);
        assert!(sink.logs.is_empty());
    }

    #[test]
    fn negative_available_means_none() {
        let mut cap = PacketCapture::new(128);
        let mut d = FakeDriver::new();
        let mut r = Reception::packet(&[1, 2, 3]);
        r.available = -1;
        d.receptions.push_back(r);
        let mut sink = FakeSink::new();
        assert_eq!(cap.poll(868.3, &mut d, &mut sink), None);
        assert_eq!(d.count(&Call::ReadData(128)), 0);
    }

    #[test]
    fn success_publishes_hex_and_returns_packet() {
        let mut cap = PacketCapture::new(128);
        let mut d = FakeDriver::with_rssi(&[-55.5]);
        d.receptions
            .push_back(Reception::packet(&[0xDE, 0xAD, 0xBE, 0xEF]));
        let mut sink = FakeSink::new();

        let packet = cap.poll(433.92, &mut d, &mut sink).unwrap();
        assert_eq!(packet.data.as_slice(), &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(packet.rssi, -55.5);
        assert_eq!(packet.frequency_mhz, 433.92);
        assert_eq!(sink.published, vec![("DE AD BE EF".to_string(), -55.5)]);
        assert_eq!(d.calls.last(), Some(&Call::StartReceive));
        assert_eq!(cap.stats().packets, 1);
    }

    #[test]
    fn timeout_is_silent() {
        let mut cap = PacketCapture::new(128);
        let mut d = FakeDriver::new();
        d.receptions.push_back(Reception::failed(RadioError::Timeout));
        let mut sink = FakeSink::new();

        assert_eq!(cap.poll(868.3, &mut d, &mut sink), None);
        assert!(sink.published.is_empty());
        assert_eq!(sink.count_at(Level::Warn), 0);
        assert_eq!(sink.count_at(Level::Error), 0);
        assert_eq!(d.calls.last(), Some(&Call::StartReceive));
        assert_eq!(cap.stats().timeouts, 1);
    }

    #[test]
    fn other_error_warns() {
        let mut cap = PacketCapture::new(128);
        let mut d = FakeDriver::new();
        d.receptions
            .push_back(Reception::failed(RadioError::Code(codes::CRC_MISMATCH)));
        let mut sink = FakeSink::new();

        assert_eq!(cap.poll(868.3, &mut d, &mut sink), None);
        assert!(sink.published.is_empty());
        assert_eq!(sink.count_at(Level::Warn), 1);
        assert!(sink.logs.iter().any(|(_, m)| m == "readData error: -7"));
        assert_eq!(d.calls.last(), Some(&Call::StartReceive));
        assert_eq!(cap.stats().errors, 1);
    }

    #[test]
    fn rearms_after_every_outcome() {
        let mut cap = PacketCapture::new(128);
        let mut d = FakeDriver::new();
        d.receptions.push_back(Reception::packet(&[1]));
        d.receptions.push_back(Reception::failed(RadioError::Timeout));
        d.receptions.push_back(Reception::failed(RadioError::Code(-1)));
        d.receptions.push_back(Reception::packet(&[2]));
        let mut sink = FakeSink::new();

        let mut got = 0;
        for _ in 0..4 {
            if cap.poll(868.3, &mut d, &mut sink).is_some() {
                got += 1;
            }
        }
        assert_eq!(got, 2);
        assert_eq!(d.count(&Call::StartReceive), 4);
    }

    #[test]
    fn oversized_length_is_clamped() {
        let mut cap = PacketCapture::new(4);
        let mut d = FakeDriver::new();
        let mut r = Reception::packet(&[1, 2, 3, 4, 5, 6]);
        r.reported_len = 200;
        d.receptions.push_back(r);
        let mut sink = FakeSink::new();

        let packet = cap.poll(868.3, &mut d, &mut sink).unwrap();
        assert_eq!(packet.data.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(d.count(&Call::ReadData(4)), 1);
        assert_eq!(cap.stats().clamped, 1);
        assert_eq!(sink.published[0].0, "01 02 03 04");
    }

    #[test]
    fn zero_length_success_is_suppressed() {
        let mut cap = PacketCapture::new(128);
        let mut d = FakeDriver::new();
        let mut r = Reception::packet(&[]);
        r.available = 3;
        d.receptions.push_back(r);
        let mut sink = FakeSink::new();

        assert_eq!(cap.poll(868.3, &mut d, &mut sink), None);
        assert!(sink.published.is_empty());
        assert_eq!(cap.stats().empty, 1);
        assert_eq!(d.calls.last(), Some(&Call::StartReceive));
    }

    #[test]
    fn capacity_is_bounded() {
        assert_eq!(PacketCapture::new(0).capacity(), 1);
        assert_eq!(PacketCapture::new(4096).capacity(), MAX_PACKET_LEN);
    }
}
