/// Session configuration.
///
/// Everything here is fixed when a [`crate::session::Session`] is created
/// and never changes for its lifetime. Built in code by the host; there is
/// no file format.
use core::time::Duration;

use heapless::Vec;
use thiserror::Error;

use crate::defaults::{
    RadioProfile, DWELL_TICKS, FAILURE_REMINDER_TICKS, MAX_FREQUENCY_MHZ,
    MIN_FREQUENCY_MHZ, SCAN_FREQUENCIES_MHZ, SMOOTHING_ALPHA, SPIKE_THRESHOLD_DB, TICK_PERIOD_MS,
};

/// Maximum number of frequencies in a scan plan.
pub const MAX_CHANNELS: usize = 16;

/// Size of the receive buffer; the configured capacity may be smaller.
pub const MAX_PACKET_LEN: usize = 128;

/// Ordered frequency list in MHz. Insertion order is scan order.
pub type ChannelList = Vec<f32, MAX_CHANNELS>;

/// Reasons a [`SnifferConfig`] is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("channel list is empty")]
    NoChannels,
    #[error("channel list holds more than {} frequencies", MAX_CHANNELS)]
    TooManyChannels,
    #[error("{0} MHz is outside the tunable band")]
    FrequencyOutOfRange(f32),
    #[error("dwell must be at least one tick")]
    ZeroDwell,
    #[error("spike threshold must be positive, got {0} dB")]
    InvalidThreshold(f32),
    #[error("smoothing factor must be in (0, 1], got {0}")]
    InvalidAlpha(f32),
    #[error("receive capacity must be 1..={} bytes, got {}", MAX_PACKET_LEN, .0)]
    InvalidCapacity(usize),
    #[error("failure reminder interval must be at least one tick")]
    ZeroReminderInterval,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnifferConfig {
    /// Frequencies to visit, in MHz. In fixed-frequency mode only the
    /// first entry is used.
    pub channels: ChannelList,
    /// Cycle through `channels` and lock on activity
    pub scan_enabled: bool,
    /// Ticks spent on each channel before advancing
    pub dwell_ticks: u32,
    /// RSSI rise over baseline that counts as activity (dB)
    pub spike_threshold_db: f32,
    /// Baseline EWMA weight of the newest sample
    pub smoothing_alpha: f32,
    /// Bytes read from the radio per capture
    pub rx_capacity: usize,
    /// Period at which the host calls `tick()`
    pub tick_period: Duration,
    /// Ticks between reminders when the radio never came up
    pub failure_reminder_ticks: u32,
    /// Modulation settings applied at activation
    pub radio: RadioProfile,
}

impl SnifferConfig {
    /// Scan the default frequency list with default thresholds.
    pub fn new() -> Self {
        let mut channels = ChannelList::new();
        for &f in SCAN_FREQUENCIES_MHZ.iter().take(MAX_CHANNELS) {
            let _ = channels.push(f);
        }
        Self {
            channels,
            scan_enabled: true,
            dwell_ticks: DWELL_TICKS,
            spike_threshold_db: SPIKE_THRESHOLD_DB,
            smoothing_alpha: SMOOTHING_ALPHA,
            rx_capacity: MAX_PACKET_LEN,
            tick_period: Duration::from_millis(TICK_PERIOD_MS),
            failure_reminder_ticks: FAILURE_REMINDER_TICKS,
            radio: RadioProfile::new(),
        }
    }

    /// Scan `frequencies` in the given order.
    pub fn scanning(frequencies: &[f32]) -> Result<Self, ConfigError> {
        let channels =
            ChannelList::from_slice(frequencies).map_err(|_| ConfigError::TooManyChannels)?;
        let config = Self {
            channels,
            ..Self::new()
        };
        config.validate()?;
        Ok(config)
    }

    /// Listen on a single frequency with scanning and lock-on disabled.
    pub fn fixed(frequency_mhz: f32) -> Result<Self, ConfigError> {
        let mut channels = ChannelList::new();
        let _ = channels.push(frequency_mhz);
        let config = Self {
            channels,
            scan_enabled: false,
            ..Self::new()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every invariant the session relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }
        for &f in &self.channels {
            if !(MIN_FREQUENCY_MHZ..=MAX_FREQUENCY_MHZ).contains(&f) {
                return Err(ConfigError::FrequencyOutOfRange(f));
            }
        }
        if self.dwell_ticks == 0 {
            return Err(ConfigError::ZeroDwell);
        }
        // Written so NaN fails too
        if !(self.spike_threshold_db > 0.0) {
            return Err(ConfigError::InvalidThreshold(self.spike_threshold_db));
        }
        if !(self.smoothing_alpha > 0.0 && self.smoothing_alpha <= 1.0) {
            return Err(ConfigError::InvalidAlpha(self.smoothing_alpha));
        }
        if self.rx_capacity == 0 || self.rx_capacity > MAX_PACKET_LEN {
            return Err(ConfigError::InvalidCapacity(self.rx_capacity));
        }
        if self.failure_reminder_ticks == 0 {
            return Err(ConfigError::ZeroReminderInterval);
        }
        Ok(())
    }
}

impl Default for SnifferConfig {
    fn default() -> Self {
        Self::new()
    }
}
