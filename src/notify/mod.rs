//! Operator notifications.
//!
//! The decision engine emits structured [`PrivacyEvent`] values; this
//! module is the only place they become text. Transports implement
//! [`Notifier`]; a disabled notification channel is the silent
//! [`NullNotifier`].

pub mod email;

pub use email::SmtpNotifier;

use crate::controller::PrivacyEvent;
use async_trait::async_trait;
use chrono::Local;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Sends a short message to an operator.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &PrivacyEvent) -> Result<(), NotifyError>;
}

/// Render an event to an operator-facing subject and body.
///
/// Only an English catalog is built in; the configured locale is a
/// transport concern and unknown values fall back here.
pub fn render(event: &PrivacyEvent) -> (String, String) {
    let (subject, body) = match event {
        PrivacyEvent::ControllerStarted => {
            return (
                "Controller booted".to_string(),
                format!("{}: Powered on", Local::now().format("%c")),
            );
        }
        PrivacyEvent::AlarmActive => ("All privacy masks off", "Privacy change"),
        PrivacyEvent::SystemArmed => ("Interior privacy masks off", "Privacy change"),
        PrivacyEvent::SystemDisarmed => ("Privacy masks on", "Privacy change"),
        PrivacyEvent::ScheduleOpen => ("All privacy masks off", "Business hours"),
        PrivacyEvent::ScheduleClosed => ("Interior privacy masks on", "Outside business hours"),
    };
    (subject.to_string(), body.to_string())
}

/// No-op notifier used when notifications are disabled.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _event: &PrivacyEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}
