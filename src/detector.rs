/// RF activity detection from RSSI samples.
///
/// Keeps a slow exponential moving average of the channel's signal strength
/// as a noise-floor baseline and flags any sample that rises more than a
/// threshold above it. Pure filter: no I/O, no failure modes.

/// Spike detector over a smoothed RSSI baseline.
#[derive(Debug, Clone)]
pub struct ActivityDetector {
    /// None until the first sample arrives
    baseline: Option<f32>,
    threshold_db: f32,
    alpha: f32,
}

impl ActivityDetector {
    pub const fn new(threshold_db: f32, alpha: f32) -> Self {
        Self {
            baseline: None,
            threshold_db,
            alpha,
        }
    }

    /// Feed one sample. Returns true when `rssi` exceeds the baseline as it
    /// stood before this sample by more than the threshold.
    ///
    /// The first sample seeds the baseline and never counts as a spike.
    /// The baseline moves toward every sample, spike or not.
    pub fn observe(&mut self, rssi: f32) -> bool {
        let baseline = *self.baseline.get_or_insert(rssi);
        let spiked = rssi > baseline + self.threshold_db;
        // Same as baseline*(1-α) + rssi*α, but exact for constant input
        self.baseline = Some(baseline + self.alpha * (rssi - baseline));
        spiked
    }

    /// Current baseline, if any sample has been seen.
    pub fn baseline(&self) -> Option<f32> {
        self.baseline
    }

    pub fn threshold_db(&self) -> f32 {
        self.threshold_db
    }
}
