/// Hardware abstraction for supported boards.
///
/// Each board module defines the CC1101 wiring (SPI bus plus the GDO
/// interrupt lines) selected at compile time via feature flags.

#[cfg(feature = "board-devkit")]
mod hw {
    pub const SPI_SCK_PIN: u8 = 18;
    pub const SPI_MISO_PIN: u8 = 19;
    pub const SPI_MOSI_PIN: u8 = 23;
    pub const CS_PIN: u8 = 5;
    pub const GDO0_PIN: u8 = 4;
    pub const GDO2_PIN: Option<u8> = Some(2);
    pub const BOARD_NAME: &str = "esp32_devkit";
}

#[cfg(all(feature = "board-xiao", not(feature = "board-devkit")))]
mod hw {
    pub const SPI_SCK_PIN: u8 = 7;
    pub const SPI_MISO_PIN: u8 = 8;
    pub const SPI_MOSI_PIN: u8 = 9;
    pub const CS_PIN: u8 = 2;
    pub const GDO0_PIN: u8 = 3;
    pub const GDO2_PIN: Option<u8> = None;
    pub const BOARD_NAME: &str = "xiao_esp32s3";
}

#[cfg(not(any(feature = "board-devkit", feature = "board-xiao")))]
mod hw {
    pub const BOARD_NAME: &str = "unknown";
}

pub use hw::*;
