//! subghz-sniffer: portable sub-GHz sniffing engine.
//!
//! Cycles a list of candidate frequencies on a CC1101-class transceiver,
//! watches the RSSI for bursts of activity, locks onto the channel that
//! produced one, and captures raw packets as hex. Everything here is
//! `no_std`, allocation-free and testable on any host with `cargo test`.
//! Platform binaries (the ESP-IDF firmware in `firmware-std/`) are thin
//! consumers that provide the radio [`driver::Driver`] and an output
//! [`sink::Sink`], then call [`session::Session::tick`] at a fixed period.
//!
//! Module layout, leaf-first:
//! - `detector`, `scanner`, `lock`, `capture`: per-tick decision logic
//! - `session`: the poll loop that owns all state and drives the above
//! - `driver`, `sink`: collaborator traits
//! - `config`, `defaults`, `board`: session and compile-time settings
//! - `hex`, `protocol`, `comm`: payload encoding and NDJSON output

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod capture;
pub mod comm;
pub mod config;
pub mod defaults;
pub mod detector;
pub mod driver;
pub mod hex;
pub mod lock;
pub mod protocol;
pub mod scanner;
pub mod session;
pub mod sink;

#[cfg(test)]
pub(crate) mod testing;
