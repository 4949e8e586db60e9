use nand_hal::TransportError;

/// Driver error taxonomy, generic over the transport's bus error.
///
/// Errors are returned, never panicked. Composite operations stop at the
/// first hard failure of a sub-step; address and length validation runs
/// before any transport call, so invalid input produces no partial side
/// effects on the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// SPI bus failure underneath a command.
    #[error("transport error")]
    Transport(E),
    /// The device did not settle within the operation's time budget. The
    /// chip-side operation keeps running; only the host gave up waiting.
    #[error("timed out waiting for the device")]
    Timeout,
    /// The chip answered the read-ID command with unexpected bytes.
    #[error("device id mismatch: found {found_manufacturer:#04x}/{found_device:#04x}")]
    DeviceIdMismatch {
        found_manufacturer: u8,
        found_device: u8,
    },
    /// Block, page, or column outside the device geometry.
    #[error("address out of range")]
    BadAddress,
    /// Program payload longer than the page capacity past the column.
    #[error("payload exceeds remaining page capacity")]
    BufferLengthExceeded,
    /// The device flagged the last program as failed.
    #[error("program failed")]
    ProgramFailed,
    /// The device flagged the last erase as failed.
    #[error("erase failed")]
    EraseFailed,
    /// ECC could not repair the page; the returned data must not be trusted.
    #[error("uncorrectable ecc error")]
    EccUncorrectable,
}

impl<E> From<TransportError<E>> for Error<E> {
    fn from(e: TransportError<E>) -> Self {
        match e {
            TransportError::Bus(e) => Error::Transport(e),
            TransportError::Timeout => Error::Timeout,
        }
    }
}

/// Failure of a whole-device bad-block scan, carrying the block at which
/// the scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("bad-block scan failed at block {block}")]
pub struct ScanError<E> {
    pub block: u16,
    pub error: Error<E>,
}
