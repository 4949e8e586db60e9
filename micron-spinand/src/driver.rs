use nand_hal::{ChipSelect, Clock, ColumnAddress, Deadline, RowAddress, Transport};

use crate::error::{Error, ScanError};
use crate::registers::{BlockLock, Configuration, Status};
use crate::{EccStatus, NandChip};

/// Lifecycle state of the device.
///
/// Only [`SpiNandDriver::init`] moves the state forward; `Faulted` sticks
/// until another init attempt. Issuing read/program/erase against a
/// non-`Ready` device is a caller contract violation and is not guarded
/// inside each operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceState {
    Uninitialized,
    Resetting,
    Identifying,
    Configuring,
    Ready,
    Faulted,
}

/// Blocking driver for one SPI NAND chip.
///
/// Generic over the [`Transport`], the [`ChipSelect`] line, the [`Clock`],
/// and the chip description `D`. `N` is the chip's full page length
/// (data + OOB) so whole-page buffers can be sized at compile time.
///
/// The driver owns no scratch storage: reads and programs work on
/// caller-provided buffers, and nothing carries over between calls.
/// Integration code is expected to serialize calls into the driver; the
/// bus and chip-select line belong to whichever operation is mid-flight.
#[derive(Debug)]
pub struct SpiNandDriver<T, C, K, D, const N: usize> {
    pub transport: T,
    pub select: C,
    pub clock: K,
    pub chip: D,
    state: DeviceState,
}

impl<T, C, K, D, const N: usize> SpiNandDriver<T, C, K, D, N>
where
    T: Transport,
    C: ChipSelect,
    K: Clock,
    D: NandChip<N>,
{
    /// Create the driver with the chip-select line parked inactive.
    pub fn new(transport: T, mut select: C, clock: K, chip: D) -> Self {
        select.deassert();
        SpiNandDriver {
            transport,
            select,
            clock,
            chip,
            state: DeviceState::Uninitialized,
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == DeviceState::Ready
    }

    /// Bring the device to [`DeviceState::Ready`]: reset, identify, unlock
    /// all blocks, enable ECC, in that order. The first failing step
    /// short-circuits the sequence and leaves the device
    /// [`DeviceState::Faulted`].
    pub fn init(&mut self) -> Result<(), Error<T::BusError>> {
        match self.init_steps() {
            Ok(()) => {
                self.state = DeviceState::Ready;
                debug!("device ready");
                Ok(())
            }
            Err(e) => {
                self.state = DeviceState::Faulted;
                Err(e)
            }
        }
    }

    fn init_steps(&mut self) -> Result<(), Error<T::BusError>> {
        self.state = DeviceState::Resetting;
        let deadline = Deadline::start(&self.clock, D::OP_TIMEOUT_MS);
        self.reset_cmd(&deadline)?;
        self.clock.delay_ms(D::RESET_DELAY_MS);
        self.wait_ready(&deadline)?;

        self.state = DeviceState::Identifying;
        let deadline = Deadline::start(&self.clock, D::OP_TIMEOUT_MS);
        let (manufacturer, device) = self.read_id_cmd(&deadline)?;
        if manufacturer != D::MANUFACTURER_ID || device != D::DEVICE_ID {
            warn!("unexpected id bytes {} {}", manufacturer, device);
            return Err(Error::DeviceIdMismatch {
                found_manufacturer: manufacturer,
                found_device: device,
            });
        }

        self.state = DeviceState::Configuring;
        let deadline = Deadline::start(&self.clock, D::OP_TIMEOUT_MS);
        self.set_feature_cmd(D::BLOCK_LOCK_REGISTER, BlockLock::UNLOCK_ALL.bits(), &deadline)?;
        // ECC on, everything else in the register cleared
        let config = Configuration::default().with_ecc_enabled(true);
        self.set_feature_cmd(D::CONFIGURATION_REGISTER, config.bits(), &deadline)?;
        Ok(())
    }

    /// Read one feature register. The value is a 3-byte command
    /// transaction: opcode, register address, dummy byte.
    pub fn get_feature(&mut self, register: u8, timeout_ms: u32) -> Result<u8, Error<T::BusError>> {
        let deadline = Deadline::start(&self.clock, timeout_ms);
        self.get_feature_cmd(register, &deadline)
    }

    /// Write one feature register.
    pub fn set_feature(
        &mut self,
        register: u8,
        value: u8,
        timeout_ms: u32,
    ) -> Result<(), Error<T::BusError>> {
        let deadline = Deadline::start(&self.clock, timeout_ms);
        self.set_feature_cmd(register, value, &deadline)
    }

    /// One status poll: `Some(status)` once OIP has cleared.
    ///
    /// Exposed so a cooperative integration can drive the wait as a bounded
    /// retry from outside; [`Self::wait_ready`] wraps it in the blocking
    /// loop the synchronous operations use.
    pub fn poll_ready(
        &mut self,
        deadline: &Deadline,
    ) -> Result<Option<Status>, Error<T::BusError>> {
        let status = self.read_status(deadline)?;
        if status.operation_in_progress() {
            Ok(None)
        } else {
            Ok(Some(status))
        }
    }

    fn wait_ready(&mut self, deadline: &Deadline) -> Result<Status, Error<T::BusError>> {
        loop {
            if let Some(status) = self.poll_ready(deadline)? {
                return Ok(status);
            }
            if deadline.expired(&self.clock) {
                return Err(Error::Timeout);
            }
        }
    }

    fn check_row(row: RowAddress) -> Result<(), Error<T::BusError>> {
        if (row.block as u32) < D::BLOCK_COUNT && (row.page as u32) < D::PAGES_PER_BLOCK {
            Ok(())
        } else {
            Err(Error::BadAddress)
        }
    }

    fn check_column(column: ColumnAddress) -> Result<(), Error<T::BusError>> {
        if (column.as_u16() as u32) < D::PAGE_TOTAL {
            Ok(())
        } else {
            Err(Error::BadAddress)
        }
    }

    fn check_block(block: u16) -> Result<(), Error<T::BusError>> {
        if (block as u32) < D::BLOCK_COUNT {
            Ok(())
        } else {
            Err(Error::BadAddress)
        }
    }

    /// Read up to `buf.len()` bytes from `row` starting at `column`.
    ///
    /// Returns the number of bytes actually read together with the page's
    /// ECC outcome. A request running past the end of the page + OOB region
    /// is silently truncated to what is available; that is not an error.
    ///
    /// A transport failure anywhere in the pipeline takes precedence over
    /// the ECC outcome: bytes moved over a broken bus cannot be trusted, so
    /// the ECC verdict is moot. An uncorrectable page surfaces as
    /// [`Error::EccUncorrectable`] after the (untrustworthy) bytes have
    /// been transferred into `buf`.
    pub fn read_page_slice(
        &mut self,
        row: RowAddress,
        column: ColumnAddress,
        buf: &mut [u8],
    ) -> Result<(usize, EccStatus), Error<T::BusError>> {
        Self::check_row(row)?;
        Self::check_column(column)?;
        let deadline = Deadline::start(&self.clock, D::OP_TIMEOUT_MS);
        trace!("read page {}:{} column {}", row.block, row.page, column.as_u16());

        self.page_read_cmd(row, &deadline)?;
        self.wait_ready(&deadline)?;
        // The ECC verdict is fetched before the data moves so the caller
        // knows whether to trust what it is about to receive.
        let status = self.read_status(&deadline)?;
        let ecc = EccStatus::from_field(status.ecc_field());

        let available = D::PAGE_TOTAL as usize - column.as_u16() as usize;
        let len = buf.len().min(available);
        self.read_from_cache_cmd(column, &mut buf[..len], &deadline)?;

        match ecc {
            EccStatus::Uncorrectable => Err(Error::EccUncorrectable),
            ecc => Ok((len, ecc)),
        }
    }

    /// Read a whole page, data + OOB.
    pub fn read_page(
        &mut self,
        row: RowAddress,
        buf: &mut [u8; N],
    ) -> Result<EccStatus, Error<T::BusError>> {
        let (_, ecc) = self.read_page_slice(row, ColumnAddress::new(0), buf)?;
        Ok(ecc)
    }

    /// Program `data` into `row` starting at `column`.
    ///
    /// The target region must have been erased since it was last
    /// programmed; no implicit erase happens here. A payload longer than
    /// the page capacity past `column` is rejected with
    /// [`Error::BufferLengthExceeded`] before anything touches the bus.
    pub fn program_page_slice(
        &mut self,
        row: RowAddress,
        column: ColumnAddress,
        data: &[u8],
    ) -> Result<(), Error<T::BusError>> {
        Self::check_row(row)?;
        Self::check_column(column)?;
        let available = D::PAGE_TOTAL as usize - column.as_u16() as usize;
        if data.len() > available {
            return Err(Error::BufferLengthExceeded);
        }
        let deadline = Deadline::start(&self.clock, D::OP_TIMEOUT_MS);
        trace!(
            "program {} bytes at page {}:{} column {}",
            data.len(),
            row.block,
            row.page,
            column.as_u16()
        );

        self.write_enable_cmd(&deadline)?;
        self.program_load_cmd(column, data, &deadline)?;
        self.program_execute_cmd(row, &deadline)?;
        let status = self.wait_ready(&deadline)?;
        if status.program_failed() {
            return Err(Error::ProgramFailed);
        }
        Ok(())
    }

    /// Program a whole page, data + OOB.
    pub fn program_page(&mut self, row: RowAddress, data: &[u8; N]) -> Result<(), Error<T::BusError>> {
        self.program_page_slice(row, ColumnAddress::new(0), data)
    }

    /// Erase one block back to all one-bits.
    pub fn erase_block(&mut self, block: u16) -> Result<(), Error<T::BusError>> {
        Self::check_block(block)?;
        let deadline = Deadline::start(&self.clock, D::OP_TIMEOUT_MS);
        debug!("erase block {}", block);

        self.write_enable_cmd(&deadline)?;
        self.block_erase_cmd(RowAddress::block_start(block), &deadline)?;
        let status = self.wait_ready(&deadline)?;
        if status.erase_failed() {
            return Err(Error::EraseFailed);
        }
        Ok(())
    }

    /// Whether the block carries a bad-block marker: the first bytes of the
    /// OOB area on the block's first page differ from 0xFF. Pure query,
    /// nothing on the chip changes.
    pub fn block_is_bad(&mut self, block: u16) -> Result<bool, Error<T::BusError>> {
        Self::check_block(block)?;
        let mut marker = [0u8; 2];
        let row = RowAddress::block_start(block);
        let column = ColumnAddress::new(D::PAGE_SIZE as u16);
        match self.read_page_slice(row, column, &mut marker) {
            // a first page the ECC cannot repair is as unusable as a marked one
            Err(Error::EccUncorrectable) => Ok(true),
            Err(e) => Err(e),
            Ok(_) => Ok(marker[0] != 0xFF || marker[1] != 0xFF),
        }
    }

    /// Program the bad-block marker into the block's first page. The rest
    /// of the block is left alone; programming only clears bits, so no
    /// erase is needed or performed.
    pub fn mark_block_bad(&mut self, block: u16) -> Result<(), Error<T::BusError>> {
        Self::check_block(block)?;
        info!("marking block {} bad", block);
        let row = RowAddress::block_start(block);
        let column = ColumnAddress::new(D::PAGE_SIZE as u16);
        self.program_page_slice(row, column, &[0x00, 0x00])
    }

    /// Whether `row` has never been programmed since its block was last
    /// erased: a full page + OOB read compared against all one-bits.
    /// `scratch` is caller-owned so no buffer state leaks between calls.
    pub fn page_is_free(
        &mut self,
        row: RowAddress,
        scratch: &mut [u8; N],
    ) -> Result<bool, Error<T::BusError>> {
        match self.read_page(row, scratch) {
            // an erased page can confuse the ECC engine; the bytes still
            // answer the question either way
            Ok(_) | Err(Error::EccUncorrectable) => Ok(scratch.iter().all(|&b| b == 0xFF)),
            Err(e) => Err(e),
        }
    }

    /// Scan every block's marker into `table`, one flag per block. The
    /// slice must hold at least one entry per block of the device; a
    /// shorter slice is rejected before anything touches the bus, naming
    /// the first block it has no slot for. Stops at the first failing
    /// block and reports its index.
    pub fn bad_block_table(&mut self, table: &mut [bool]) -> Result<(), ScanError<T::BusError>> {
        if table.len() < D::BLOCK_COUNT as usize {
            return Err(ScanError {
                block: table.len() as u16,
                error: Error::BadAddress,
            });
        }
        for block in 0..D::BLOCK_COUNT as u16 {
            table[block as usize] = self
                .block_is_bad(block)
                .map_err(|error| ScanError { block, error })?;
        }
        Ok(())
    }
}
