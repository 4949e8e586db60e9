#![no_std]
// Must be first to share macros across crate
pub(crate) mod fmt;

mod cmd;
mod devices;
mod driver;
pub mod error;
pub mod registers;

pub use devices::{Mt29f1g01, MT29F1G01_PAGE_TOTAL};
pub use driver::{DeviceState, SpiNandDriver};
pub use error::{Error, ScanError};

/// Geometry, protocol, and timing description of one SPI NAND part.
///
/// `N` is the full page length in bytes, data area plus OOB. The command
/// opcodes and feature register addresses default to the de-facto standard
/// values; a part that deviates overrides the constant.
pub trait NandChip<const N: usize> {
    /// Data area bytes per page.
    const PAGE_SIZE: u32;
    /// Out-of-band (OOB) bytes per page.
    const OOB_SIZE: u32;
    /// Full page length, data + OOB.
    const PAGE_TOTAL: u32 = N as u32;
    const PAGES_PER_BLOCK: u32;
    const BLOCK_COUNT: u32;
    /// Width of the page field inside a raw row address.
    const PAGE_ADDRESS_BITS: u32 = Self::PAGES_PER_BLOCK.trailing_zeros();

    /// Expected manufacturer byte in the read-ID response.
    const MANUFACTURER_ID: u8;
    /// Expected device byte in the read-ID response.
    const DEVICE_ID: u8;

    /// Overall time budget for one multi-step operation.
    const OP_TIMEOUT_MS: u32 = 3000;
    /// Settle time after a reset command before status polling starts.
    const RESET_DELAY_MS: u32 = 2;

    // Command opcodes
    const RESET_COMMAND: u8 = 0xFF;
    const READ_ID_COMMAND: u8 = 0x9F;
    const SET_FEATURE_COMMAND: u8 = 0x1F;
    const GET_FEATURE_COMMAND: u8 = 0x0F;
    const PAGE_READ_COMMAND: u8 = 0x13;
    const READ_FROM_CACHE_COMMAND: u8 = 0x03;
    const WRITE_ENABLE_COMMAND: u8 = 0x06;
    const PROGRAM_LOAD_COMMAND: u8 = 0x02;
    const PROGRAM_EXECUTE_COMMAND: u8 = 0x10;
    const BLOCK_ERASE_COMMAND: u8 = 0xD8;

    // Feature register addresses
    const BLOCK_LOCK_REGISTER: u8 = 0xA0;
    const CONFIGURATION_REGISTER: u8 = 0xB0;
    const STATUS_REGISTER: u8 = 0xC0;
    const DIE_SELECT_REGISTER: u8 = 0xD0;
}

/// Outcome of the ECC evaluation that follows a page read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EccStatus {
    /// No errors, or few enough corrected bits that no action is needed.
    Ok,
    /// Data is valid but the corrected-bit count is nearing the limit;
    /// the page should be rewritten soon.
    RefreshRecommended,
    /// The data could not be corrected and must not be trusted.
    Uncorrectable,
}

impl EccStatus {
    /// Map the status register's three-bit ECC field:
    ///
    /// | field      | meaning            | result              |
    /// |------------|--------------------|---------------------|
    /// | 000        | no errors          | `Ok`                |
    /// | 001        | 1-3 bits corrected | `Ok`                |
    /// | 011        | 4-6 bits corrected | `RefreshRecommended`|
    /// | 101        | 7-8 bits corrected | `RefreshRecommended`|
    /// | 010, rest  | uncorrectable      | `Uncorrectable`     |
    pub const fn from_field(field: u8) -> Self {
        match field & 0b111 {
            0b000 | 0b001 => EccStatus::Ok,
            0b011 | 0b101 => EccStatus::RefreshRecommended,
            _ => EccStatus::Uncorrectable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EccStatus;

    #[test]
    fn ecc_field_mapping_is_exhaustive() {
        let expected = [
            EccStatus::Ok,                 // 000
            EccStatus::Ok,                 // 001
            EccStatus::Uncorrectable,      // 010
            EccStatus::RefreshRecommended, // 011
            EccStatus::Uncorrectable,      // 100
            EccStatus::RefreshRecommended, // 101
            EccStatus::Uncorrectable,      // 110
            EccStatus::Uncorrectable,      // 111
        ];
        for (field, want) in expected.iter().enumerate() {
            assert_eq!(EccStatus::from_field(field as u8), *want);
        }
    }

    #[test]
    fn ecc_field_ignores_bits_above_the_field() {
        assert_eq!(EccStatus::from_field(0b1111_1000), EccStatus::Ok);
        assert_eq!(
            EccStatus::from_field(0b1000_0011),
            EccStatus::RefreshRecommended
        );
    }
}
