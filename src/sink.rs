//! Output capability the engine produces to.
//!
//! A sink receives captured payloads and the engine's user-visible
//! diagnostics. Diagnostics default to the `log` facade so a sink only has
//! to decide where packets go.

use core::fmt;

use log::Level;

pub trait Sink {
    /// A captured packet, hex-encoded (`"DE AD BE EF"`), with the RSSI
    /// measured right after the read.
    fn publish(&mut self, hex: &str, rssi: f32);

    /// The session locked onto `frequency_mhz` after a spike of `rssi` dBm
    /// over a `baseline` dBm noise floor.
    fn locked(&mut self, frequency_mhz: f32, rssi: f32, baseline: f32) {
        let _ = (frequency_mhz, rssi, baseline);
    }

    /// A diagnostic at `level`.
    fn log(&mut self, level: Level, args: fmt::Arguments<'_>) {
        log::log!(target: "subghz_sniffer", level, "{}", args);
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn publish(&mut self, hex: &str, rssi: f32) {
        (**self).publish(hex, rssi)
    }

    fn locked(&mut self, frequency_mhz: f32, rssi: f32, baseline: f32) {
        (**self).locked(frequency_mhz, rssi, baseline)
    }

    fn log(&mut self, level: Level, args: fmt::Arguments<'_>) {
        (**self).log(level, args)
    }
}
