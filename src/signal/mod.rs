//! Panel signal inputs.
//!
//! The two digital signals (armed, alarm) are read through the
//! [`SignalSource`] trait so the monitor loop never cares whether they
//! come from real GPIO pins or from the file-backed simulation. The
//! implementation is chosen once at construction time.

#[cfg(feature = "hardware")]
pub mod gpio;
pub mod simulation;

#[cfg(feature = "hardware")]
pub use gpio::GpioSignalSource;
pub use simulation::SimulatedSignalSource;

use crate::error::Result;

/// Last-observed state of the two panel signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalState {
    pub armed: bool,
    pub alarm: bool,
}

/// A readable pair of panel signals, polled on demand.
pub trait SignalSource {
    fn read(&mut self) -> Result<SignalState>;
}
