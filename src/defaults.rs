/// Default scan plan and radio profile for sub-GHz remote sniffing.
///
/// The frequency list covers the ISM/SRD channels most simple remotes
/// (gates, blinds, ventilation units, doorbells) transmit on in Europe
/// and North America. Order matters: it is the scan order.

/// Candidate frequencies in MHz, in scan order.
pub static SCAN_FREQUENCIES_MHZ: &[f32] = &[
    868.30, // EU SRD, most common
    868.35,
    868.95, // wM-Bus T/C mode
    869.85,
    433.92, // EU/worldwide ISM, most common
    433.42,
    434.42,
    315.00, // North America
    390.00,
    418.00,
    915.00,
];

/// Listening frequency used when scanning is disabled.
pub const BASE_FREQUENCY_MHZ: f32 = 868.3;

/// Lowest frequency the CC1101 synthesizer is configured for.
pub const MIN_FREQUENCY_MHZ: f32 = 300.0;

/// Highest frequency the CC1101 synthesizer is configured for.
pub const MAX_FREQUENCY_MHZ: f32 = 928.0;

/// Ticks spent on one channel before advancing (2 s at 200 ms).
pub const DWELL_TICKS: u32 = 10;

/// RSSI excess over the baseline that counts as activity, in dB.
pub const SPIKE_THRESHOLD_DB: f32 = 10.0;

/// Weight of the newest RSSI sample in the baseline average.
pub const SMOOTHING_ALPHA: f32 = 0.01;

/// Host tick period in milliseconds.
pub const TICK_PERIOD_MS: u64 = 200;

/// Ticks between "driver failed to initialize" reminders.
pub const FAILURE_REMINDER_TICKS: u32 = 50;

/// Expected value of the CC1101 VERSION status register.
pub const CC1101_CHIP_VERSION: u8 = 0x14;

/// Modulation and receiver settings applied once at activation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadioProfile {
    /// On-Off Keying (true) or 2-FSK (false)
    pub ook: bool,
    /// Data rate in kbps
    pub bit_rate_kbps: f32,
    /// Receiver channel filter bandwidth in kHz. Wider catches more
    /// off-tune remotes at the cost of a higher noise floor.
    pub rx_bandwidth_khz: f32,
}

impl RadioProfile {
    pub const fn new() -> Self {
        Self {
            ook: true,
            bit_rate_kbps: 4.8,
            rx_bandwidth_khz: 200.0,
        }
    }
}

impl Default for RadioProfile {
    fn default() -> Self {
        Self::new()
    }
}
