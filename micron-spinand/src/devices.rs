use crate::NandChip;

/// Full page length (data + OOB) of the MT29F1G01.
pub const MT29F1G01_PAGE_TOTAL: usize = 2112;

/// Micron MT29F1G01: 1 Gbit, 3.3 V; 1024 blocks of 64 pages, each page
/// 2048 data bytes + 64 OOB bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mt29f1g01;

impl Mt29f1g01 {
    pub fn new() -> Self {
        Mt29f1g01
    }
}

impl NandChip<MT29F1G01_PAGE_TOTAL> for Mt29f1g01 {
    const PAGE_SIZE: u32 = 2048;
    const OOB_SIZE: u32 = 64;
    const PAGES_PER_BLOCK: u32 = 64;
    const BLOCK_COUNT: u32 = 1024;
    const MANUFACTURER_ID: u8 = 0x2C;
    const DEVICE_ID: u8 = 0x14;
}
