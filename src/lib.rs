//! Privacy Sentinel library.
//!
//! Watches the armed/alarm signals of a security panel (or a
//! business-hours schedule) and drives the privacy mask overlays of an
//! IP camera fleet, notifying an operator on every transition.

pub mod config;
pub mod controller;
pub mod error;
pub mod inventory;
pub mod mask;
pub mod monitor;
pub mod notify;
pub mod schedule;
pub mod signal;

pub use error::{Result, SentinelError};
