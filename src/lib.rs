#![no_std]
// Must be first to share macros across crate
pub(crate) mod fmt;

mod address;
mod clock;
pub mod hal;
mod transport;

pub use address::{ColumnAddress, RowAddress};
pub use clock::{Clock, Deadline, TickCounter};
pub use transport::{ChipSelect, Transport, TransportError};
