//! Sniffing session: the poll loop.
//!
//! A [`Session`] exclusively owns the radio driver, the output sink and all
//! mutable sniffing state (scan cursor, RSSI baseline, lock). The host
//! calls [`Session::tick`] once per fixed period from a single thread;
//! nothing inside a tick blocks or suspends.
//!
//! Each tick, in order:
//! 1. if the radio never came up, emit a periodic reminder and stop
//! 2. advance the channel scanner
//! 3. sample RSSI once, run the activity detector, maybe lock on
//! 4. poll for a captured packet
//!
//! Dropping the session shuts the driver down, on every path including a
//! failed `begin()`.

use log::Level;

use crate::capture::{Packet, PacketCapture};
use crate::config::{ConfigError, SnifferConfig};
use crate::detector::ActivityDetector;
use crate::driver::{Driver, RadioError};
use crate::lock::{LockController, LockState};
use crate::scanner::ChannelScanner;
use crate::sink::Sink;

/// Externally visible session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// `activate` not called yet
    Uninitialized,
    /// Cycling through the channel list
    Scanning,
    /// Pinned to one channel after detecting activity
    Locked,
    /// Listening on a single configured channel
    Fixed,
    /// `begin()` failed with this code; the radio is never touched again
    Failed(i16),
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Uninitialized => "uninitialized",
            Phase::Scanning => "scanning",
            Phase::Locked => "locked",
            Phase::Fixed => "fixed",
            Phase::Failed(_) => "failed",
        }
    }
}

/// Point-in-time snapshot for status reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Status {
    pub phase: Phase,
    /// Frequency the radio is tuned to (MHz)
    pub frequency_mhz: f32,
    pub baseline: Option<f32>,
    pub ticks: u32,
    pub packets: u32,
    pub errors: u32,
    pub spikes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Radio {
    Uninitialized,
    Active,
    Failed(RadioError),
}

pub struct Session<D: Driver, S: Sink> {
    driver: D,
    sink: S,
    config: SnifferConfig,
    radio: Radio,
    scanner: ChannelScanner,
    detector: ActivityDetector,
    lock: LockController,
    capture: PacketCapture,
    ticks: u32,
    /// Ticks since the last "radio is down" reminder
    idle_ticks: u32,
    spikes: u32,
}

impl<D: Driver, S: Sink> Session<D, S> {
    /// Validate `config` and take ownership of the collaborators. The radio
    /// is not touched until [`Session::activate`].
    pub fn new(driver: D, sink: S, config: SnifferConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            scanner: ChannelScanner::new(
                config.channels.clone(),
                config.dwell_ticks,
                config.scan_enabled,
            ),
            detector: ActivityDetector::new(config.spike_threshold_db, config.smoothing_alpha),
            lock: LockController::new(config.scan_enabled),
            capture: PacketCapture::new(config.rx_capacity),
            driver,
            sink,
            config,
            radio: Radio::Uninitialized,
            ticks: 0,
            idle_ticks: 0,
            spikes: 0,
        })
    }

    /// [`Session::new`] followed by [`Session::activate`]. A failed radio
    /// still yields a session; it stays in `Phase::Failed` and only emits
    /// reminders.
    pub fn start(driver: D, sink: S, config: SnifferConfig) -> Result<Self, ConfigError> {
        let mut session = Self::new(driver, sink, config)?;
        let _ = session.activate();
        Ok(session)
    }

    /// Bring the radio up: `begin()`, apply the radio profile on the first
    /// channel, then start receiving. Only the first call does anything.
    pub fn activate(&mut self) -> Result<(), RadioError> {
        match self.radio {
            Radio::Active => return Ok(()),
            Radio::Failed(e) => return Err(e),
            Radio::Uninitialized => {}
        }

        if let Err(e) = self.driver.begin() {
            self.radio = Radio::Failed(e);
            self.sink.log(
                Level::Error,
                format_args!("Radio begin() failed, error code {}", e.code()),
            );
            return Err(e);
        }
        self.radio = Radio::Active;
        self.sink.log(Level::Info, format_args!("Radio initialized"));

        let freq = self.scanner.active();
        let profile = self.config.radio;
        let r = self.driver.set_frequency(freq);
        self.report("setFrequency", r);
        let r = self.driver.set_ook(profile.ook);
        self.report("setOOK", r);
        let r = self.driver.set_bit_rate(profile.bit_rate_kbps);
        self.report("setBitRate", r);
        let r = self.driver.set_rx_bandwidth(profile.rx_bandwidth_khz);
        self.report("setRxBandwidth", r);

        let rssi = self.driver.rssi();
        self.sink
            .log(Level::Info, format_args!("Current RSSI: {:.1} dBm", rssi));

        let started = self.driver.start_receive();
        self.report("startReceive", started);
        if started.is_ok() {
            if self.scanner.is_enabled() {
                self.sink.log(
                    Level::Info,
                    format_args!(
                        "Scanning {} frequencies, {} ticks each",
                        self.scanner.channels().len(),
                        self.config.dwell_ticks
                    ),
                );
                for (i, f) in self.scanner.channels().iter().enumerate() {
                    self.sink
                        .log(Level::Info, format_args!("  {}. {:.2} MHz", i + 1, f));
                }
            } else {
                self.sink.log(
                    Level::Info,
                    format_args!("Listening on {:.3} MHz (fixed frequency)", freq),
                );
            }
        }
        Ok(())
    }

    /// Run one poll-loop iteration. Returns the packet captured this tick,
    /// which has already been published to the sink.
    pub fn tick(&mut self) -> Option<Packet> {
        self.ticks = self.ticks.wrapping_add(1);

        if self.radio != Radio::Active {
            self.remind();
            return None;
        }

        self.scanner
            .tick(self.lock.state(), &mut self.driver, &mut self.sink);

        let rssi = self.driver.rssi();
        let baseline = self.detector.baseline().unwrap_or(rssi);
        let spiked = self.detector.observe(rssi);
        if spiked {
            self.spikes = self.spikes.wrapping_add(1);
        }
        self.lock.maybe_lock(
            spiked,
            rssi,
            baseline,
            &self.scanner,
            &mut self.driver,
            &mut self.sink,
        );

        let freq = self.frequency();
        self.capture.poll(freq, &mut self.driver, &mut self.sink)
    }

    fn remind(&mut self) {
        self.idle_ticks += 1;
        if self.idle_ticks < self.config.failure_reminder_ticks {
            return;
        }
        self.idle_ticks = 0;
        match self.radio {
            Radio::Failed(e) => self.sink.log(
                Level::Error,
                format_args!("Radio init failed, error code {}", e.code()),
            ),
            _ => self
                .sink
                .log(Level::Error, format_args!("Radio was never initialized")),
        }
    }

    fn report(&mut self, op: &str, result: Result<(), RadioError>) {
        if let Err(e) = result {
            self.sink
                .log(Level::Warn, format_args!("{}() failed: {}", op, e));
        }
    }

    /// Frequency the radio is tuned to (MHz).
    pub fn frequency(&self) -> f32 {
        self.lock
            .state()
            .frequency()
            .unwrap_or_else(|| self.scanner.active())
    }

    pub fn phase(&self) -> Phase {
        match self.radio {
            Radio::Uninitialized => Phase::Uninitialized,
            Radio::Failed(e) => Phase::Failed(e.code()),
            Radio::Active if self.lock.state().is_locked() => Phase::Locked,
            Radio::Active if self.scanner.is_enabled() => Phase::Scanning,
            Radio::Active => Phase::Fixed,
        }
    }

    pub fn status(&self) -> Status {
        let stats = self.capture.stats();
        Status {
            phase: self.phase(),
            frequency_mhz: self.frequency(),
            baseline: self.detector.baseline(),
            ticks: self.ticks,
            packets: stats.packets,
            errors: stats.errors,
            spikes: self.spikes,
        }
    }

    pub fn lock_state(&self) -> &LockState {
        self.lock.state()
    }

    pub fn scanner(&self) -> &ChannelScanner {
        &self.scanner
    }

    pub fn detector(&self) -> &ActivityDetector {
        &self.detector
    }

    pub fn config(&self) -> &SnifferConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<D: Driver, S: Sink> Drop for Session<D, S> {
    fn drop(&mut self) {
        self.driver.shutdown();
        log::debug!("Session closed after {} ticks", self.ticks);
    }
}
