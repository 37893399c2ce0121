/// Frequency scanner. Dwells on each channel of the scan plan for a fixed
/// number of ticks, then retunes the radio to the next one.
///
/// The radio is tuned to `channels[0]` when the session activates, so the
/// cursor starts one past it. Invariant: the channel currently tuned is
/// always `channels[(cursor - 1) mod len]`.
use log::Level;

use crate::config::ChannelList;
use crate::driver::Driver;
use crate::lock::LockState;
use crate::sink::Sink;

#[derive(Debug, Clone)]
pub struct ChannelScanner {
    channels: ChannelList,
    /// Next channel to tune; always < channels.len()
    cursor: usize,
    dwell: u32,
    dwell_ticks: u32,
    enabled: bool,
}

impl ChannelScanner {
    /// `channels` must be non-empty (checked by `SnifferConfig::validate`).
    /// A disabled scanner never retunes.
    pub fn new(channels: ChannelList, dwell_ticks: u32, enabled: bool) -> Self {
        let cursor = if channels.is_empty() {
            0
        } else {
            1 % channels.len()
        };
        Self {
            channels,
            cursor,
            dwell: 0,
            dwell_ticks,
            enabled,
        }
    }

    /// Count one tick of dwell and retune when it runs out. Returns the new
    /// frequency if the radio was retuned.
    ///
    /// No-op when disabled or once the session is locked. A failed retune is
    /// reported and the cursor still advances; the next dwell period tries
    /// the following channel.
    pub fn tick<D: Driver, S: Sink>(
        &mut self,
        lock: &LockState,
        driver: &mut D,
        sink: &mut S,
    ) -> Option<f32> {
        if !self.enabled || lock.is_locked() || self.channels.is_empty() {
            return None;
        }

        self.dwell += 1;
        if self.dwell < self.dwell_ticks {
            return None;
        }
        self.dwell = 0;

        let freq = self.channels[self.cursor];
        if let Err(e) = driver.set_frequency(freq) {
            sink.log(
                Level::Warn,
                format_args!("Retune to {:.2} MHz failed: {}", freq, e),
            );
        }
        if let Err(e) = driver.start_receive() {
            sink.log(Level::Warn, format_args!("startReceive() failed: {}", e));
        }

        sink.log(
            Level::Info,
            format_args!(
                "Scanning {:.2} MHz [{}/{}]",
                freq,
                self.cursor + 1,
                self.channels.len()
            ),
        );

        self.cursor = (self.cursor + 1) % self.channels.len();
        Some(freq)
    }

    /// The channel tuned most recently, i.e. the one the radio is on.
    pub fn active(&self) -> f32 {
        let len = self.channels.len();
        if len == 0 {
            return 0.0;
        }
        self.channels[(self.cursor + len - 1) % len]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Ticks spent on the current channel so far.
    pub fn dwell(&self) -> u32 {
        self.dwell
    }

    pub fn channels(&self) -> &[f32] {
        &self.channels
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
