//! CC1101 register-level driver over an `embedded-hal` SPI device.
//!
//! Configures the chip for variable-length packets with hardware CRC and
//! appended status bytes, polled from the main loop. GDO lines are left to
//! their reset functions; completion is detected from MARCSTATE.

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{Operation, SpiDevice};

use subghz_sniffer::defaults::CC1101_CHIP_VERSION;
use subghz_sniffer::driver::{codes, Driver, RadioError};

/// Crystal frequency on every supported module (Hz)
const FXOSC: f64 = 26_000_000.0;

// Header bits
const READ: u8 = 0x80;
const BURST: u8 = 0x40;

// Configuration registers
const IOCFG0: u8 = 0x02;
const FIFOTHR: u8 = 0x03;
const PKTLEN: u8 = 0x06;
const PKTCTRL1: u8 = 0x07;
const PKTCTRL0: u8 = 0x08;
const FSCTRL1: u8 = 0x0B;
const FREQ2: u8 = 0x0D;
const FREQ1: u8 = 0x0E;
const FREQ0: u8 = 0x0F;
const MDMCFG4: u8 = 0x10;
const MDMCFG3: u8 = 0x11;
const MDMCFG2: u8 = 0x12;
const MCSM1: u8 = 0x17;
const MCSM0: u8 = 0x18;

// Strobes
const SRES: u8 = 0x30;
const SRX: u8 = 0x34;
const SIDLE: u8 = 0x36;
const SPWD: u8 = 0x39;
const SFRX: u8 = 0x3A;

// Status registers (read with the burst bit set)
const VERSION: u8 = 0x31;
const RSSI: u8 = 0x34;
const MARCSTATE: u8 = 0x35;
const RXBYTES: u8 = 0x3B;

const FIFO: u8 = 0x3F;

const MARCSTATE_RX: u8 = 0x0D;
const RXBYTES_OVERFLOW: u8 = 0x80;
const CRC_OK: u8 = 0x80;

/// Largest payload that fits the 64-byte FIFO next to the length byte and
/// the two appended status bytes
const MAX_FIFO_PAYLOAD: usize = 61;

const RSSI_OFFSET_DB: f32 = 74.0;

pub struct Cc1101<SPI, DELAY> {
    spi: SPI,
    delay: DELAY,
    /// DRATE_E shares MDMCFG4 with the channel filter bits
    drate_e: u8,
    chanbw: u8,
    packet_len: usize,
    overflow: bool,
    last_rssi: f32,
}

impl<SPI: SpiDevice, DELAY: DelayNs> Cc1101<SPI, DELAY> {
    pub fn new(spi: SPI, delay: DELAY) -> Self {
        Self {
            spi,
            delay,
            drate_e: 0x08,
            chanbw: 0x80,
            packet_len: 0,
            overflow: false,
            last_rssi: -128.0,
        }
    }

    fn strobe(&mut self, cmd: u8) -> Result<(), RadioError> {
        self.spi.write(&[cmd]).map_err(spi_error)
    }

    fn write_reg(&mut self, addr: u8, value: u8) -> Result<(), RadioError> {
        self.spi.write(&[addr, value]).map_err(spi_error)
    }

    fn read_reg(&mut self, addr: u8) -> Result<u8, RadioError> {
        let mut buf = [addr | READ, 0];
        self.spi.transfer_in_place(&mut buf).map_err(spi_error)?;
        Ok(buf[1])
    }

    fn read_status(&mut self, addr: u8) -> Result<u8, RadioError> {
        self.read_reg(addr | BURST)
    }

    fn read_fifo(&mut self, buf: &mut [u8]) -> Result<(), RadioError> {
        if buf.is_empty() {
            return Ok(());
        }
        self.spi
            .transaction(&mut [Operation::Write(&[FIFO | READ | BURST]), Operation::Read(buf)])
            .map_err(spi_error)
    }

    fn idle(&mut self) -> Result<(), RadioError> {
        self.strobe(SIDLE)
    }

    fn flush_rx(&mut self) -> Result<(), RadioError> {
        self.idle()?;
        self.strobe(SFRX)
    }

    fn write_mdmcfg4(&mut self) -> Result<(), RadioError> {
        self.write_reg(MDMCFG4, self.chanbw | (self.drate_e & 0x0F))
    }
}

impl<SPI: SpiDevice, DELAY: DelayNs> Driver for Cc1101<SPI, DELAY> {
    fn begin(&mut self) -> Result<(), RadioError> {
        self.strobe(SRES)?;
        self.delay.delay_ms(1);

        let version = self.read_status(VERSION)?;
        match version {
            0x00 | 0xFF => {
                log::error!("No CC1101 on the SPI bus (VERSION=0x{:02X})", version);
                return Err(RadioError::Code(codes::CHIP_NOT_FOUND));
            }
            v if v != CC1101_CHIP_VERSION => {
                log::warn!(
                    "Unexpected CC1101 chip version 0x{:02X} (expected 0x{:02X}), continuing",
                    v,
                    CC1101_CHIP_VERSION
                );
            }
            _ => log::debug!("CC1101 version 0x{:02X}", version),
        }

        // GDO0 asserts on sync word, FIFO threshold 33 bytes
        self.write_reg(IOCFG0, 0x06)?;
        self.write_reg(FIFOTHR, 0x47)?;
        // Variable length with CRC, status bytes appended
        self.write_reg(PKTLEN, MAX_FIFO_PAYLOAD as u8)?;
        self.write_reg(PKTCTRL1, 0x04)?;
        self.write_reg(PKTCTRL0, 0x05)?;
        self.write_reg(FSCTRL1, 0x06)?;
        // Return to IDLE after a packet, calibrate on IDLE -> RX
        self.write_reg(MCSM1, 0x30)?;
        self.write_reg(MCSM0, 0x18)?;
        self.flush_rx()
    }

    fn set_frequency(&mut self, mhz: f32) -> Result<(), RadioError> {
        let valid = (300.0..=348.0).contains(&mhz)
            || (387.0..=464.0).contains(&mhz)
            || (779.0..=928.0).contains(&mhz);
        if !valid {
            return Err(RadioError::Code(codes::INVALID_FREQUENCY));
        }

        let word = ((mhz as f64 * 1_000_000.0) * 65536.0 / FXOSC).round() as u32;
        self.idle()?;
        self.write_reg(FREQ2, (word >> 16) as u8)?;
        self.write_reg(FREQ1, (word >> 8) as u8)?;
        self.write_reg(FREQ0, word as u8)
    }

    fn set_ook(&mut self, enabled: bool) -> Result<(), RadioError> {
        let mod_format = if enabled { 0b011 } else { 0b000 };
        let cfg = self.read_reg(MDMCFG2)?;
        self.write_reg(MDMCFG2, (cfg & 0x8F) | (mod_format << 4))
    }

    fn set_bit_rate(&mut self, kbps: f32) -> Result<(), RadioError> {
        let (e, m) = drate_registers(kbps as f64 * 1000.0)
            .ok_or(RadioError::Code(codes::INVALID_BIT_RATE))?;
        self.drate_e = e;
        self.write_mdmcfg4()?;
        self.write_reg(MDMCFG3, m)
    }

    fn set_rx_bandwidth(&mut self, khz: f32) -> Result<(), RadioError> {
        let (e, m) = chanbw_registers(khz as f64 * 1000.0)
            .ok_or(RadioError::Code(codes::INVALID_RX_BANDWIDTH))?;
        self.chanbw = (e << 6) | (m << 4);
        self.write_mdmcfg4()
    }

    fn rssi(&mut self) -> f32 {
        match self.read_status(RSSI) {
            Ok(raw) => {
                self.last_rssi = rssi_dbm(raw);
                self.last_rssi
            }
            Err(_) => self.last_rssi,
        }
    }

    fn start_receive(&mut self) -> Result<(), RadioError> {
        if self.read_status(MARCSTATE)? & 0x1F == MARCSTATE_RX {
            return Ok(());
        }
        self.flush_rx()?;
        self.strobe(SRX)
    }

    fn available(&mut self) -> i16 {
        let rx = match self.read_status(RXBYTES) {
            Ok(rx) => rx,
            Err(_) => return 0,
        };
        if rx & RXBYTES_OVERFLOW != 0 {
            self.overflow = true;
            return 1;
        }
        // Still in RX means the packet is not complete yet
        match self.read_status(MARCSTATE) {
            Ok(state) if state & 0x1F != MARCSTATE_RX => (rx & 0x7F) as i16,
            _ => 0,
        }
    }

    fn read_data(&mut self, buf: &mut [u8]) -> Result<(), RadioError> {
        self.packet_len = 0;
        if self.overflow {
            self.overflow = false;
            self.flush_rx()?;
            return Err(RadioError::Code(codes::FIFO_OVERFLOW));
        }

        let queued = (self.read_status(RXBYTES)? & 0x7F) as usize;
        if queued == 0 {
            return Err(RadioError::Timeout);
        }

        let mut len = [0u8];
        self.read_fifo(&mut len)?;
        let len = len[0] as usize;
        if len > MAX_FIFO_PAYLOAD {
            self.flush_rx()?;
            return Err(RadioError::Code(codes::PACKET_TOO_LONG));
        }
        if queued < len + 3 {
            return Err(RadioError::Timeout);
        }

        let n = len.min(buf.len());
        self.read_fifo(&mut buf[..n])?;
        let mut rest = [0u8; MAX_FIFO_PAYLOAD];
        self.read_fifo(&mut rest[..len - n])?;

        let mut status = [0u8; 2];
        self.read_fifo(&mut status)?;
        if status[1] & CRC_OK == 0 {
            return Err(RadioError::Code(codes::CRC_MISMATCH));
        }

        self.packet_len = len;
        Ok(())
    }

    fn packet_length(&mut self) -> usize {
        self.packet_len
    }

    fn shutdown(&mut self) {
        if self.idle().and_then(|_| self.strobe(SPWD)).is_err() {
            log::warn!("CC1101 power-down failed");
        }
    }
}

fn spi_error<E: embedded_hal::spi::Error>(e: E) -> RadioError {
    log::debug!("SPI error: {:?}", e.kind());
    RadioError::Code(codes::SPI_FAILURE)
}

/// RSSI register is two's complement in half-dB steps.
fn rssi_dbm(raw: u8) -> f32 {
    (raw as i8) as f32 / 2.0 - RSSI_OFFSET_DB
}

/// DRATE_E / DRATE_M for a data rate in baud, or None outside 0.6..=500 kBaud.
fn drate_registers(baud: f64) -> Option<(u8, u8)> {
    if !(600.0..=500_000.0).contains(&baud) {
        return None;
    }
    let mut e = (baud * (1u64 << 20) as f64 / FXOSC).log2().floor() as i32;
    let mut m = (baud * (1u64 << 28) as f64 / (FXOSC * 2f64.powi(e)) - 256.0).round() as i32;
    if m >= 256 {
        m = 0;
        e += 1;
    }
    if !(0..=15).contains(&e) {
        return None;
    }
    Some((e as u8, m as u8))
}

/// CHANBW_E / CHANBW_M for the narrowest filter at least `hz` wide.
fn chanbw_registers(hz: f64) -> Option<(u8, u8)> {
    if !(58_000.0..=812_000.0).contains(&hz) {
        return None;
    }
    // Ordered from narrowest (E=3, M=3) to widest (E=0, M=0)
    for e in (0..4u8).rev() {
        for m in (0..4u8).rev() {
            let bw = FXOSC / (8.0 * (4.0 + m as f64) * (1u32 << e) as f64);
            if bw >= hz {
                return Some((e, m));
            }
        }
    }
    Some((0, 0))
}
