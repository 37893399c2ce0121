//! Scripted driver and recording sink shared by the unit tests.
use std::collections::VecDeque;
use std::fmt;
use std::string::{String, ToString};
use std::vec::Vec;

use log::Level;

use crate::driver::{Driver, RadioError};
use crate::sink::Sink;

/// Every call the engine made, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Begin,
    SetFrequency(f32),
    SetOok(bool),
    SetBitRate(f32),
    SetRxBandwidth(f32),
    Rssi,
    StartReceive,
    Available,
    ReadData(usize),
    PacketLength,
    Shutdown,
}

/// A pending receive: what `available`, `read_data` and `packet_length`
/// report for one capture attempt.
#[derive(Debug, Clone)]
pub struct Reception {
    pub available: i16,
    pub result: Result<(), RadioError>,
    pub payload: Vec<u8>,
    pub reported_len: usize,
}

impl Reception {
    pub fn packet(payload: &[u8]) -> Self {
        Self {
            available: payload.len() as i16,
            result: Ok(()),
            payload: payload.to_vec(),
            reported_len: payload.len(),
        }
    }

    pub fn failed(error: RadioError) -> Self {
        Self {
            available: 1,
            result: Err(error),
            payload: Vec::new(),
            reported_len: 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeDriver {
    pub calls: Vec<Call>,
    pub begin_result: Option<RadioError>,
    pub tune_error: Option<RadioError>,
    /// RSSI samples returned in order; the last one repeats.
    pub rssi: VecDeque<f32>,
    pub last_rssi: f32,
    /// Receptions consumed one per `available` call that finds data.
    pub receptions: VecDeque<Reception>,
    current: Option<Reception>,
    pub frequency: Option<f32>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self {
            last_rssi: -100.0,
            ..Self::default()
        }
    }

    pub fn failing(error: RadioError) -> Self {
        Self {
            begin_result: Some(error),
            ..Self::new()
        }
    }

    pub fn with_rssi(samples: &[f32]) -> Self {
        let mut driver = Self::new();
        driver.rssi.extend(samples.iter().copied());
        driver
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn tunings(&self) -> Vec<f32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::SetFrequency(f) => Some(*f),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl Driver for FakeDriver {
    fn begin(&mut self) -> Result<(), RadioError> {
        self.calls.push(Call::Begin);
        match self.begin_result {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn set_frequency(&mut self, mhz: f32) -> Result<(), RadioError> {
        self.calls.push(Call::SetFrequency(mhz));
        if let Some(e) = self.tune_error {
            return Err(e);
        }
        self.frequency = Some(mhz);
        Ok(())
    }

    fn set_ook(&mut self, enabled: bool) -> Result<(), RadioError> {
        self.calls.push(Call::SetOok(enabled));
        Ok(())
    }

    fn set_bit_rate(&mut self, kbps: f32) -> Result<(), RadioError> {
        self.calls.push(Call::SetBitRate(kbps));
        Ok(())
    }

    fn set_rx_bandwidth(&mut self, khz: f32) -> Result<(), RadioError> {
        self.calls.push(Call::SetRxBandwidth(khz));
        Ok(())
    }

    fn rssi(&mut self) -> f32 {
        self.calls.push(Call::Rssi);
        if let Some(sample) = self.rssi.pop_front() {
            self.last_rssi = sample;
        }
        self.last_rssi
    }

    fn start_receive(&mut self) -> Result<(), RadioError> {
        self.calls.push(Call::StartReceive);
        Ok(())
    }

    fn available(&mut self) -> i16 {
        self.calls.push(Call::Available);
        match self.receptions.pop_front() {
            Some(r) => {
                let available = r.available;
                self.current = Some(r);
                available
            }
            None => 0,
        }
    }

    fn read_data(&mut self, buf: &mut [u8]) -> Result<(), RadioError> {
        self.calls.push(Call::ReadData(buf.len()));
        let Some(r) = self.current.as_ref() else {
            return Err(RadioError::Timeout);
        };
        r.result?;
        let n = r.payload.len().min(buf.len());
        buf[..n].copy_from_slice(&r.payload[..n]);
        Ok(())
    }

    fn packet_length(&mut self) -> usize {
        self.calls.push(Call::PacketLength);
        self.current.as_ref().map_or(0, |r| r.reported_len)
    }

    fn shutdown(&mut self) {
        self.calls.push(Call::Shutdown);
    }
}

#[derive(Debug, Default)]
pub struct FakeSink {
    pub published: Vec<(String, f32)>,
    pub locks: Vec<(f32, f32, f32)>,
    pub logs: Vec<(Level, String)>,
}

impl FakeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_at(&self, level: Level) -> usize {
        self.logs.iter().filter(|(l, _)| *l == level).count()
    }
}

impl Sink for FakeSink {
    fn publish(&mut self, hex: &str, rssi: f32) {
        self.published.push((hex.to_string(), rssi));
    }

    fn locked(&mut self, frequency_mhz: f32, rssi: f32, baseline: f32) {
        self.locks.push((frequency_mhz, rssi, baseline));
    }

    fn log(&mut self, level: Level, args: fmt::Arguments<'_>) {
        self.logs.push((level, args.to_string()));
    }
}
