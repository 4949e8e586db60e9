//! Single-transaction command layer.
//!
//! Every command frames exactly one chip-select assert/deassert around the
//! transport calls it makes, and each transport call draws on the remaining
//! budget of the operation's deadline.

use nand_hal::{ChipSelect, Clock, ColumnAddress, Deadline, RowAddress, Transport};

use crate::driver::SpiNandDriver;
use crate::error::Error;
use crate::registers::Status;
use crate::NandChip;

impl<T, C, K, D, const N: usize> SpiNandDriver<T, C, K, D, N>
where
    T: Transport,
    C: ChipSelect,
    K: Clock,
    D: NandChip<N>,
{
    /// Budget for the next transport call, or `Timeout` once the deadline
    /// has already passed. A spent budget never reaches the transport.
    fn allowance(&self, deadline: &Deadline) -> Result<u32, Error<T::BusError>> {
        match deadline.remaining_ms(&self.clock) {
            0 => Err(Error::Timeout),
            ms => Ok(ms),
        }
    }

    fn write_parts(
        &mut self,
        deadline: &Deadline,
        parts: &[&[u8]],
    ) -> Result<(), Error<T::BusError>> {
        for part in parts {
            let timeout = self.allowance(deadline)?;
            self.transport.write(part, timeout)?;
        }
        Ok(())
    }

    /// One chip-select frame around a sequence of transport writes.
    fn write_framed(&mut self, deadline: &Deadline, parts: &[&[u8]]) -> Result<(), Error<T::BusError>> {
        self.allowance(deadline)?;
        self.select.assert();
        let res = self.write_parts(deadline, parts);
        self.select.deassert();
        res
    }

    /// One chip-select frame around a full-duplex transfer.
    fn transfer_framed(
        &mut self,
        deadline: &Deadline,
        tx: &[u8],
        rx: &mut [u8],
    ) -> Result<(), Error<T::BusError>> {
        let timeout = self.allowance(deadline)?;
        self.select.assert();
        let res = self.transport.write_read(tx, rx, timeout);
        self.select.deassert();
        res.map_err(Error::from)
    }

    fn write_then_read(
        &mut self,
        deadline: &Deadline,
        tx: &[u8],
        rx: &mut [u8],
    ) -> Result<(), Error<T::BusError>> {
        let timeout = self.allowance(deadline)?;
        self.transport.write(tx, timeout)?;
        let timeout = self.allowance(deadline)?;
        self.transport.read(rx, timeout)?;
        Ok(())
    }

    /// One chip-select frame: a command write, then a data read.
    fn write_read_framed(
        &mut self,
        deadline: &Deadline,
        tx: &[u8],
        rx: &mut [u8],
    ) -> Result<(), Error<T::BusError>> {
        self.allowance(deadline)?;
        self.select.assert();
        let res = self.write_then_read(deadline, tx, rx);
        self.select.deassert();
        res
    }

    pub(crate) fn reset_cmd(&mut self, deadline: &Deadline) -> Result<(), Error<T::BusError>> {
        self.write_framed(deadline, &[&[D::RESET_COMMAND]])
    }

    /// Read-ID transaction: opcode and a dummy byte clock out, then the
    /// manufacturer and device bytes clock in.
    pub(crate) fn read_id_cmd(
        &mut self,
        deadline: &Deadline,
    ) -> Result<(u8, u8), Error<T::BusError>> {
        let tx = [D::READ_ID_COMMAND, 0, 0, 0];
        let mut rx = [0u8; 4];
        self.transfer_framed(deadline, &tx, &mut rx)?;
        Ok((rx[2], rx[3]))
    }

    pub(crate) fn get_feature_cmd(
        &mut self,
        register: u8,
        deadline: &Deadline,
    ) -> Result<u8, Error<T::BusError>> {
        let tx = [D::GET_FEATURE_COMMAND, register, 0];
        let mut rx = [0u8; 3];
        self.transfer_framed(deadline, &tx, &mut rx)?;
        Ok(rx[2])
    }

    pub(crate) fn set_feature_cmd(
        &mut self,
        register: u8,
        value: u8,
        deadline: &Deadline,
    ) -> Result<(), Error<T::BusError>> {
        self.write_framed(deadline, &[&[D::SET_FEATURE_COMMAND, register, value]])
    }

    pub(crate) fn read_status(&mut self, deadline: &Deadline) -> Result<Status, Error<T::BusError>> {
        Ok(Status::from_bits(
            self.get_feature_cmd(D::STATUS_REGISTER, deadline)?,
        ))
    }

    /// Load a physical page into the chip's internal cache.
    pub(crate) fn page_read_cmd(
        &mut self,
        row: RowAddress,
        deadline: &Deadline,
    ) -> Result<(), Error<T::BusError>> {
        let [a, b, c] = row.to_wire(D::PAGE_ADDRESS_BITS);
        self.write_framed(deadline, &[&[D::PAGE_READ_COMMAND, a, b, c]])
    }

    /// Stream bytes out of the chip's cache, starting at `column`.
    pub(crate) fn read_from_cache_cmd(
        &mut self,
        column: ColumnAddress,
        buf: &mut [u8],
        deadline: &Deadline,
    ) -> Result<(), Error<T::BusError>> {
        let [hi, lo] = column.to_wire();
        // one dummy byte after the column before data shifts out
        let tx = [D::READ_FROM_CACHE_COMMAND, hi, lo, 0];
        self.write_read_framed(deadline, &tx, buf)
    }

    pub(crate) fn write_enable_cmd(&mut self, deadline: &Deadline) -> Result<(), Error<T::BusError>> {
        self.write_framed(deadline, &[&[D::WRITE_ENABLE_COMMAND]])
    }

    /// Load the payload into the chip's cache. Header and payload share one
    /// chip-select frame.
    pub(crate) fn program_load_cmd(
        &mut self,
        column: ColumnAddress,
        data: &[u8],
        deadline: &Deadline,
    ) -> Result<(), Error<T::BusError>> {
        let [hi, lo] = column.to_wire();
        self.write_framed(deadline, &[&[D::PROGRAM_LOAD_COMMAND, hi, lo], data])
    }

    pub(crate) fn program_execute_cmd(
        &mut self,
        row: RowAddress,
        deadline: &Deadline,
    ) -> Result<(), Error<T::BusError>> {
        let [a, b, c] = row.to_wire(D::PAGE_ADDRESS_BITS);
        self.write_framed(deadline, &[&[D::PROGRAM_EXECUTE_COMMAND, a, b, c]])
    }

    /// Erase the block addressed by `row`; the page field is zero on the wire.
    pub(crate) fn block_erase_cmd(
        &mut self,
        row: RowAddress,
        deadline: &Deadline,
    ) -> Result<(), Error<T::BusError>> {
        let [a, b, c] = row.to_wire(D::PAGE_ADDRESS_BITS);
        self.write_framed(deadline, &[&[D::BLOCK_ERASE_COMMAND, a, b, c]])
    }
}
