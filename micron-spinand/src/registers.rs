//! Feature register wrappers.
//!
//! Each register is one byte on the wire; fields are exposed through
//! explicit mask/shift accessors over that byte rather than a packed
//! bitfield overlay, so no layout or endianness assumptions leak in.

const fn bit(bits: u8, offset: u8) -> bool {
    (bits >> offset) & 1 != 0
}

const fn field(bits: u8, offset: u8, width: u8) -> u8 {
    (bits >> offset) & ((1 << width) - 1)
}

const fn with_bit(bits: u8, offset: u8, set: bool) -> u8 {
    if set {
        bits | (1 << offset)
    } else {
        bits & !(1 << offset)
    }
}

/// Status register (0xC0). Read-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status(u8);

impl Status {
    pub const fn from_bits(bits: u8) -> Self {
        Status(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Operation in progress: set while a reset, read, program, or erase
    /// runs inside the chip.
    pub const fn operation_in_progress(self) -> bool {
        bit(self.0, 0)
    }

    /// Write enable latch.
    pub const fn write_enabled(self) -> bool {
        bit(self.0, 1)
    }

    /// The last erase did not complete successfully.
    pub const fn erase_failed(self) -> bool {
        bit(self.0, 2)
    }

    /// The last program did not complete successfully.
    pub const fn program_failed(self) -> bool {
        bit(self.0, 3)
    }

    /// Three-bit ECC outcome of the last page read.
    pub const fn ecc_field(self) -> u8 {
        field(self.0, 4, 3)
    }

    /// Cache busy.
    pub const fn cache_busy(self) -> bool {
        bit(self.0, 7)
    }
}

/// Configuration register (0xB0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Configuration(u8);

impl Configuration {
    pub const fn from_bits(bits: u8) -> Self {
        Configuration(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// On-die ECC engine enable.
    pub const fn ecc_enabled(self) -> bool {
        bit(self.0, 4)
    }

    pub const fn with_ecc_enabled(self, enabled: bool) -> Self {
        Configuration(with_bit(self.0, 4, enabled))
    }

    /// Lock tight: freezes the block lock bits until the next power cycle.
    pub const fn lot_enabled(self) -> bool {
        bit(self.0, 5)
    }

    pub const fn with_lot_enabled(self, enabled: bool) -> Self {
        Configuration(with_bit(self.0, 5, enabled))
    }
}

/// Block lock register (0xA0). All protection bits zero means every block
/// is writable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockLock(u8);

impl BlockLock {
    /// Every block unlocked.
    pub const UNLOCK_ALL: Self = BlockLock(0x00);

    pub const fn from_bits(bits: u8) -> Self {
        BlockLock(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn all_unlocked(self) -> bool {
        self.0 == 0
    }
}

/// Die select register (0xD0). Single-die parts ignore it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DieSelect(u8);

impl DieSelect {
    pub const fn from_bits(bits: u8) -> Self {
        DieSelect(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn die(self) -> u8 {
        field(self.0, 6, 1)
    }

    pub const fn with_die(self, die: u8) -> Self {
        DieSelect(with_bit(self.0, 6, die & 1 != 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_fields_unpack() {
        let status = Status::from_bits(0b0011_0101);
        assert!(status.operation_in_progress());
        assert!(!status.write_enabled());
        assert!(status.erase_failed());
        assert!(!status.program_failed());
        assert_eq!(status.ecc_field(), 0b011);
        assert!(!status.cache_busy());

        let status = Status::from_bits(0b1100_1010);
        assert!(!status.operation_in_progress());
        assert!(status.write_enabled());
        assert!(status.program_failed());
        assert_eq!(status.ecc_field(), 0b100);
        assert!(status.cache_busy());
    }

    #[test]
    fn configuration_builder_touches_only_its_bit() {
        let config = Configuration::default().with_ecc_enabled(true);
        assert_eq!(config.bits(), 0x10);
        assert!(config.ecc_enabled());
        assert!(!config.lot_enabled());

        let cleared = config.with_ecc_enabled(false);
        assert_eq!(cleared.bits(), 0x00);
    }

    #[test]
    fn block_lock_unlock_all_is_zero() {
        assert_eq!(BlockLock::UNLOCK_ALL.bits(), 0x00);
        assert!(BlockLock::UNLOCK_ALL.all_unlocked());
        assert!(!BlockLock::from_bits(0x38).all_unlocked());
    }

    #[test]
    fn die_select_round_trips() {
        let ds = DieSelect::default().with_die(1);
        assert_eq!(ds.die(), 1);
        assert_eq!(ds.with_die(0).die(), 0);
    }
}
