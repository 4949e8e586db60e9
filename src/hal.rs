//! Adapters from `embedded-hal` 1.0 peripherals to the transport contracts.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::{ChipSelect, Transport, TransportError};

/// [`Transport`] over a blocking [`SpiBus`].
///
/// Blocking `SpiBus` implementations run to completion on their own terms,
/// so the per-call timeout is not enforced here. Peripherals that do expose
/// a hardware timeout should implement [`Transport`] directly.
#[derive(Debug)]
pub struct SpiBusTransport<B> {
    bus: B,
}

impl<B> SpiBusTransport<B> {
    pub fn new(bus: B) -> Self {
        SpiBusTransport { bus }
    }

    pub fn release(self) -> B {
        self.bus
    }
}

impl<B: SpiBus> Transport for SpiBusTransport<B> {
    type BusError = B::Error;

    fn write(&mut self, tx: &[u8], _timeout_ms: u32) -> Result<(), TransportError<B::Error>> {
        trace!("spi write {} bytes", tx.len());
        self.bus.write(tx).map_err(TransportError::Bus)?;
        // the frame's chip-select edge must not beat buffered bytes
        self.bus.flush().map_err(TransportError::Bus)
    }

    fn read(&mut self, rx: &mut [u8], _timeout_ms: u32) -> Result<(), TransportError<B::Error>> {
        trace!("spi read {} bytes", rx.len());
        self.bus.read(rx).map_err(TransportError::Bus)?;
        self.bus.flush().map_err(TransportError::Bus)
    }

    fn write_read(
        &mut self,
        tx: &[u8],
        rx: &mut [u8],
        _timeout_ms: u32,
    ) -> Result<(), TransportError<B::Error>> {
        trace!("spi transfer {} bytes", rx.len());
        self.bus.transfer(rx, tx).map_err(TransportError::Bus)?;
        self.bus.flush().map_err(TransportError::Bus)
    }
}

/// Active-low chip-select over an [`OutputPin`].
#[derive(Debug)]
pub struct ActiveLowSelect<P> {
    pin: P,
}

impl<P> ActiveLowSelect<P> {
    pub fn new(pin: P) -> Self {
        ActiveLowSelect { pin }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> ChipSelect for ActiveLowSelect<P> {
    fn assert(&mut self) {
        let _ = self.pin.set_low();
    }

    fn deassert(&mut self) {
        let _ = self.pin.set_high();
    }
}
