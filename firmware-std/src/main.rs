//! Sub-GHz sniffer: ESP-IDF std firmware
//!
//! Drives a CC1101 over SPI from a single polling loop on the main FreeRTOS
//! task. Events stream to the serial console as NDJSON via the `log`
//! facade.

mod cc1101;

use std::thread;
use std::time::{Duration, Instant};

use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{AnyIOPin, IOPin};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::spi::config::{Config as SpiConfig, DriverConfig as SpiDriverConfig};
use esp_idf_svc::hal::spi::{SpiDeviceDriver, SpiDriver};
use esp_idf_svc::hal::units::Hertz;

use subghz_sniffer::comm::{self, LogSink};
use subghz_sniffer::config::SnifferConfig;
use subghz_sniffer::protocol::{DeviceMessage, VERSION};
use subghz_sniffer::session::Session;
use subghz_sniffer::{board, defaults};

use cc1101::Cc1101;

/// CC1101 SPI clock; the chip tops out at 10 MHz for burst access
const SPI_FREQ_HZ: u32 = 4_000_000;

/// Interval between status lines on the console
const STATUS_INTERVAL: Duration = Duration::from_secs(30);

fn main() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    // Bind the ESP-IDF logger to the `log` facade
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!(
        "Sub-GHz sniffer v{} starting on {} (std)",
        VERSION,
        board::BOARD_NAME
    );

    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    #[cfg(feature = "devkit")]
    let (sclk, miso, mosi, cs): (AnyIOPin, AnyIOPin, AnyIOPin, AnyIOPin) = (
        pins.gpio18.downgrade(),
        pins.gpio19.downgrade(),
        pins.gpio23.downgrade(),
        pins.gpio5.downgrade(),
    );
    #[cfg(not(feature = "devkit"))]
    let (sclk, miso, mosi, cs): (AnyIOPin, AnyIOPin, AnyIOPin, AnyIOPin) = (
        pins.gpio7.downgrade(),
        pins.gpio8.downgrade(),
        pins.gpio9.downgrade(),
        pins.gpio2.downgrade(),
    );
    log::info!(
        "CC1101 on SPI SCK={} MISO={} MOSI={} CS={} GDO0={} GDO2={:?}",
        board::SPI_SCK_PIN,
        board::SPI_MISO_PIN,
        board::SPI_MOSI_PIN,
        board::CS_PIN,
        board::GDO0_PIN,
        board::GDO2_PIN
    );

    let spi_driver = SpiDriver::new(
        peripherals.spi2,
        sclk,
        mosi,
        Some(miso),
        &SpiDriverConfig::new(),
    )?;
    let spi_config = SpiConfig::new()
        .baudrate(Hertz(SPI_FREQ_HZ))
        .data_mode(embedded_hal::spi::MODE_0);
    let spi = SpiDeviceDriver::new(spi_driver, Some(cs), &spi_config)?;

    #[cfg(not(feature = "fixed"))]
    let config = SnifferConfig::new();
    #[cfg(feature = "fixed")]
    let config = SnifferConfig::fixed(defaults::BASE_FREQUENCY_MHZ)?;
    let tick_period = config.tick_period;
    log::info!(
        "Tick {} ms, dwell {} ticks, spike threshold {:.1} dB, {} channels in {:.0}..{:.0} MHz",
        tick_period.as_millis(),
        config.dwell_ticks,
        config.spike_threshold_db,
        config.channels.len(),
        defaults::MIN_FREQUENCY_MHZ,
        defaults::MAX_FREQUENCY_MHZ,
    );

    let mut session = Session::start(Cc1101::new(spi, FreeRtos), LogSink, config)?;
    comm::emit(&DeviceMessage::status(&session.status(), board::BOARD_NAME));

    let mut last_status = Instant::now();
    loop {
        let started = Instant::now();
        session.tick();

        if last_status.elapsed() >= STATUS_INTERVAL {
            last_status = Instant::now();
            comm::emit(&DeviceMessage::status(&session.status(), board::BOARD_NAME));
        }

        // Keep a steady cadence regardless of how long the tick took
        let elapsed = started.elapsed();
        if elapsed < tick_period {
            thread::sleep(tick_period - elapsed);
        }
    }
}
