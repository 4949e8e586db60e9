use core::fmt::Display;

/// Physical block + page address pair.
///
/// The raw row value is `block << page_bits | page`, where `page_bits` is
/// the width of the page field for the device (six for a 64-pages-per-block
/// part). It travels as three bytes, MSB first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowAddress {
    pub block: u16,
    pub page: u8,
}

impl RowAddress {
    pub const fn new(block: u16, page: u8) -> Self {
        RowAddress { block, page }
    }

    /// First page of a block, as used by erase and bad-block bookkeeping.
    pub const fn block_start(block: u16) -> Self {
        RowAddress { block, page: 0 }
    }

    pub const fn to_raw(self, page_bits: u32) -> u32 {
        ((self.block as u32) << page_bits) | self.page as u32
    }

    /// The three wire bytes, MSB first.
    pub const fn to_wire(self, page_bits: u32) -> [u8; 3] {
        let raw = self.to_raw(page_bits);
        [(raw >> 16) as u8, (raw >> 8) as u8, raw as u8]
    }
}

impl Display for RowAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.block, self.page)
    }
}

/// Byte offset into a page's data + OOB region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnAddress(u16);

impl ColumnAddress {
    pub const fn new(column: u16) -> Self {
        ColumnAddress(column)
    }

    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// The two wire bytes, big-endian.
    pub const fn to_wire(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl From<ColumnAddress> for u16 {
    fn from(ca: ColumnAddress) -> Self {
        ca.as_u16()
    }
}

impl Display for ColumnAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn row_address_packs_block_and_page() {
        assert_eq!(RowAddress::new(0, 0).to_raw(6), 0);
        assert_eq!(RowAddress::new(1, 0).to_raw(6), 0x40);
        assert_eq!(RowAddress::new(0, 63).to_raw(6), 0x3F);
        assert_eq!(RowAddress::new(1023, 63).to_raw(6), 0x1FFFF);
    }

    #[test_log::test]
    fn row_address_wire_bytes_are_msb_first() {
        assert_eq!(RowAddress::new(1023, 63).to_wire(6), [0x01, 0xFF, 0xFF]);
        assert_eq!(RowAddress::new(2, 1).to_wire(6), [0x00, 0x00, 0x81]);
    }

    #[test_log::test]
    fn block_start_targets_page_zero() {
        assert_eq!(RowAddress::block_start(7), RowAddress::new(7, 0));
    }

    #[test_log::test]
    fn column_address_wire_bytes_are_big_endian() {
        assert_eq!(ColumnAddress::new(0x0812).to_wire(), [0x08, 0x12]);
        assert_eq!(ColumnAddress::new(0).to_wire(), [0, 0]);
    }
}
