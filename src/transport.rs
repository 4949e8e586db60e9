use core::fmt::Debug;

/// Failure of a single transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError<E> {
    /// Bus or electrical failure reported by the underlying peripheral.
    #[error("bus error")]
    Bus(E),
    /// The call did not complete within its time budget.
    #[error("transport timed out")]
    Timeout,
}

/// Synchronous, blocking byte transport underneath a flash driver.
///
/// Every call takes the milliseconds it is allowed to spend; implementations
/// without a hardware timeout may ignore it. Chip-select framing is *not*
/// part of this contract -- the driver brackets calls with a [`ChipSelect`],
/// so one logical transaction may span several transport calls.
pub trait Transport {
    /// Error produced by the underlying bus peripheral.
    type BusError: Debug;

    /// Clock `tx` out on the bus.
    fn write(&mut self, tx: &[u8], timeout_ms: u32) -> Result<(), TransportError<Self::BusError>>;

    /// Clock `rx.len()` bytes in from the bus.
    fn read(&mut self, rx: &mut [u8], timeout_ms: u32)
        -> Result<(), TransportError<Self::BusError>>;

    /// Full-duplex transfer: `tx` shifts out while `rx` fills. Both slices
    /// cover the same clock edges, so they are expected to be equally long.
    fn write_read(
        &mut self,
        tx: &[u8],
        rx: &mut [u8],
        timeout_ms: u32,
    ) -> Result<(), TransportError<Self::BusError>>;
}

/// Chip-select line bounding exactly one logical transaction.
pub trait ChipSelect {
    /// Drive the line active (chip listening).
    fn assert(&mut self);
    /// Drive the line inactive.
    fn deassert(&mut self);
}
