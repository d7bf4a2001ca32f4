//! The privacy decision engine.
//!
//! Maps the observed panel state (or the schedule evaluation) to a
//! mask action over a camera set, then carries the action out:
//! notify the operator, fan the mask state out to the cameras, and
//! surface per-camera failures in the log.

use crate::inventory::{CameraInventory, TargetSet};
use crate::mask::MaskApplier;
use crate::notify::Notifier;
use crate::schedule::WeeklySchedule;
use crate::signal::SignalState;
use chrono::NaiveDateTime;
use log::{error, info, warn};

/// How masking decisions are derived. Fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    SignalDriven,
    ScheduleDriven,
}

/// The derived decision: which cameras, and which mask state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskAction {
    pub target: TargetSet,
    pub masked: bool,
}

/// Locale-neutral description of a transition. Text rendering happens
/// at the notifier boundary, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyEvent {
    ControllerStarted,
    AlarmActive,
    SystemArmed,
    SystemDisarmed,
    ScheduleOpen,
    ScheduleClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: MaskAction,
    pub event: PrivacyEvent,
}

/// Signal-driven decision table. An active alarm wins over the armed
/// state unconditionally.
pub fn decide_signal(state: &SignalState) -> Decision {
    if state.alarm {
        Decision {
            action: MaskAction {
                target: TargetSet::All,
                masked: false,
            },
            event: PrivacyEvent::AlarmActive,
        }
    } else if state.armed {
        Decision {
            action: MaskAction {
                target: TargetSet::Interior,
                masked: true,
            },
            event: PrivacyEvent::SystemArmed,
        }
    } else {
        Decision {
            action: MaskAction {
                target: TargetSet::All,
                masked: true,
            },
            event: PrivacyEvent::SystemDisarmed,
        }
    }
}

/// Schedule-driven decision: open hours unmask everything, closed
/// hours mask the interior set.
pub fn decide_schedule(open: bool) -> Decision {
    if open {
        Decision {
            action: MaskAction {
                target: TargetSet::All,
                masked: false,
            },
            event: PrivacyEvent::ScheduleOpen,
        }
    } else {
        Decision {
            action: MaskAction {
                target: TargetSet::Interior,
                masked: true,
            },
            event: PrivacyEvent::ScheduleClosed,
        }
    }
}

/// Derive the mask action for the current tick. Pure: the two modes
/// never both evaluate.
pub fn decide(
    mode: Mode,
    state: &SignalState,
    now: NaiveDateTime,
    schedule: &WeeklySchedule,
) -> Decision {
    match mode {
        Mode::SignalDriven => decide_signal(state),
        Mode::ScheduleDriven => decide_schedule(schedule.is_open(now)),
    }
}

pub struct PrivacyController {
    mode: Mode,
    inventory: CameraInventory,
    schedule: WeeklySchedule,
    applier: Box<dyn MaskApplier>,
    notifier: Box<dyn Notifier>,
}

impl PrivacyController {
    pub fn new(
        mode: Mode,
        inventory: CameraInventory,
        schedule: WeeklySchedule,
        applier: Box<dyn MaskApplier>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            mode,
            inventory,
            schedule,
            applier,
            notifier,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Send a standalone notification, e.g. the boot message. Failures
    /// are logged and dropped.
    pub async fn announce(&self, event: &PrivacyEvent) {
        if let Err(e) = self.notifier.notify(event).await {
            error!("Failed to send notification: {e}");
        }
    }

    /// Run one full decision cycle: decide, notify, apply.
    ///
    /// Notification failure never blocks mask application, and
    /// per-camera failures never abort the cycle; both only reach the
    /// log.
    pub async fn run_cycle(&self, state: &SignalState, now: NaiveDateTime) {
        let decision = decide(self.mode, state, now, &self.schedule);

        if self.mode == Mode::SignalDriven {
            info!("System armed: {}, alarm: {}", state.armed, state.alarm);
        }
        info!(
            "Setting {:?} cameras to masked={}",
            decision.action.target, decision.action.masked
        );

        self.announce(&decision.event).await;

        let cameras = self.inventory.select(decision.action.target);
        let results = self.applier.apply(&cameras, decision.action.masked).await;

        let failed = results.iter().filter(|r| !r.ok).count();
        for result in results.iter().filter(|r| !r.ok) {
            error!(
                "Mask update failed for {}: {}",
                result.camera.ip,
                result.detail.as_deref().unwrap_or("unknown error")
            );
        }
        if failed > 0 {
            warn!(
                "{failed} of {} cameras failed to update, retrying on next transition",
                results.len()
            );
        }
    }
}
