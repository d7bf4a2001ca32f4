//! File-backed signal simulation for development and testing.
//!
//! Reads pin states from a JSON object keyed by BCM pin number, e.g.
//! `{"16": true, "20": false}`. Editing the file while the monitor
//! loop runs drives transitions exactly like a real panel would.

use super::{SignalSource, SignalState};
use crate::error::Result;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub struct SimulatedSignalSource {
    path: PathBuf,
    armed_pin: u8,
    alarm_pin: u8,
}

impl SimulatedSignalSource {
    pub fn new(path: PathBuf, armed_pin: u8, alarm_pin: u8) -> Self {
        Self {
            path,
            armed_pin,
            alarm_pin,
        }
    }

    fn pin_states(&self) -> HashMap<String, bool> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!(
                    "Pin-state file {} not readable ({e}), simulating all pins low",
                    self.path.display()
                );
                return HashMap::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(states) => states,
            Err(e) => {
                debug!(
                    "Pin-state file {} not parsable ({e}), simulating all pins low",
                    self.path.display()
                );
                HashMap::new()
            }
        }
    }
}

impl SignalSource for SimulatedSignalSource {
    fn read(&mut self) -> Result<SignalState> {
        let states = self.pin_states();
        let pin = |number: u8| states.get(&number.to_string()).copied().unwrap_or(false);

        Ok(SignalState {
            armed: pin(self.armed_pin),
            alarm: pin(self.alarm_pin),
        })
    }
}
