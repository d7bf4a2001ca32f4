//! Hardware-backed signal source for Raspberry Pi GPIO.

use super::{SignalSource, SignalState};
use crate::error::{Result, SentinelError};
use rppal::gpio::{Gpio, InputPin};

/// Reads the panel signals from two BCM pins configured as pull-up
/// inputs. The pins are released when the source is dropped.
pub struct GpioSignalSource {
    armed: InputPin,
    alarm: InputPin,
}

impl GpioSignalSource {
    pub fn new(armed_pin: u8, alarm_pin: u8) -> Result<Self> {
        let gpio = Gpio::new()
            .map_err(|e| SentinelError::Signal(format!("cannot open GPIO: {e}")))?;
        let armed = gpio
            .get(armed_pin)
            .map_err(|e| SentinelError::Signal(format!("cannot claim pin {armed_pin}: {e}")))?
            .into_input_pullup();
        let alarm = gpio
            .get(alarm_pin)
            .map_err(|e| SentinelError::Signal(format!("cannot claim pin {alarm_pin}: {e}")))?
            .into_input_pullup();

        Ok(Self { armed, alarm })
    }
}

impl SignalSource for GpioSignalSource {
    fn read(&mut self) -> Result<SignalState> {
        Ok(SignalState {
            armed: self.armed.is_high(),
            alarm: self.alarm.is_high(),
        })
    }
}
