/// Channel lock-on.
///
/// The first RSSI spike seen while scanning pins the radio to the channel
/// that was tuned when the sample was taken. The transition happens at most
/// once per session and is never undone; recreate the session to scan
/// again.
use log::Level;

use crate::driver::Driver;
use crate::scanner::ChannelScanner;
use crate::sink::Sink;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LockState {
    Unlocked,
    /// Monitoring a single frequency (MHz) for the rest of the session
    Locked(f32),
}

impl LockState {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockState::Locked(_))
    }

    pub fn frequency(&self) -> Option<f32> {
        match self {
            LockState::Locked(f) => Some(*f),
            LockState::Unlocked => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LockController {
    state: LockState,
    /// False in fixed-frequency mode
    enabled: bool,
}

impl LockController {
    pub const fn new(enabled: bool) -> Self {
        Self {
            state: LockState::Unlocked,
            enabled,
        }
    }

    /// Act on the detector's verdict for this tick's sample.
    ///
    /// Every spike is reported. The first spike while unlocked and enabled
    /// retunes to `scanner.active()`, re-arms reception and locks. Returns
    /// true only on that transition.
    pub fn maybe_lock<D: Driver, S: Sink>(
        &mut self,
        spiked: bool,
        rssi: f32,
        baseline: f32,
        scanner: &ChannelScanner,
        driver: &mut D,
        sink: &mut S,
    ) -> bool {
        if !spiked {
            return false;
        }

        let freq = match self.state {
            LockState::Locked(f) => f,
            LockState::Unlocked => scanner.active(),
        };
        sink.log(
            Level::Warn,
            format_args!(
                "RF activity detected on {:.2} MHz: RSSI {:.1} dBm (baseline {:.1} dBm)",
                freq, rssi, baseline
            ),
        );

        if !self.enabled || self.state.is_locked() {
            return false;
        }

        if let Err(e) = driver.set_frequency(freq) {
            sink.log(
                Level::Warn,
                format_args!("Retune to {:.2} MHz failed: {}", freq, e),
            );
        }
        if let Err(e) = driver.start_receive() {
            sink.log(Level::Warn, format_args!("startReceive() failed: {}", e));
        }

        self.state = LockState::Locked(freq);
        sink.log(
            Level::Warn,
            format_args!("Locked onto {:.2} MHz, monitoring this frequency", freq),
        );
        sink.locked(freq, rssi, baseline);
        true
    }

    pub fn state(&self) -> &LockState {
        &self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
