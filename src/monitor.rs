//! The polling loop that drives the controller.
//!
//! Signal mode polls the panel every second and reacts to transitions;
//! schedule mode re-asserts the schedule decision on a coarser cadence
//! whether or not anything changed, so missed ticks and external mask
//! drift heal themselves.

use crate::controller::{Mode, PrivacyController, PrivacyEvent};
use crate::error::Result;
use crate::signal::{SignalSource, SignalState};
use chrono::Local;
use log::{info, warn};
use std::time::Duration;
use tokio::time::interval;

pub struct MonitorLoop<S: SignalSource> {
    source: S,
    controller: PrivacyController,
    poll_interval: Duration,
    refresh_interval: Duration,
    state: SignalState,
}

impl<S: SignalSource> MonitorLoop<S> {
    /// Set up the loop. In signal mode the initial panel state is read
    /// here, once, without transition logic; a failed initial read is
    /// a startup error.
    pub fn new(
        mut source: S,
        controller: PrivacyController,
        poll_interval: Duration,
        refresh_interval: Duration,
    ) -> Result<Self> {
        let state = match controller.mode() {
            Mode::SignalDriven => source.read()?,
            Mode::ScheduleDriven => SignalState::default(),
        };

        Ok(Self {
            source,
            controller,
            poll_interval,
            refresh_interval,
            state,
        })
    }

    /// Announce boot and run one unconditional decision cycle, so the
    /// fleet matches the configuration immediately after startup.
    async fn startup_cycle(&mut self) {
        self.controller
            .announce(&PrivacyEvent::ControllerStarted)
            .await;
        self.controller
            .run_cycle(&self.state, Local::now().naive_local())
            .await;
    }

    pub async fn run(&mut self) -> Result<()> {
        self.startup_cycle().await;

        match self.controller.mode() {
            Mode::SignalDriven => self.run_signal_driven().await,
            Mode::ScheduleDriven => self.run_schedule_driven().await,
        }
    }

    async fn run_signal_driven(&mut self) -> Result<()> {
        info!(
            "Monitoring panel signals every {:?}",
            self.poll_interval
        );
        let mut ticker = interval(self.poll_interval);
        loop {
            ticker.tick().await;
            self.poll_once().await;
        }
    }

    async fn run_schedule_driven(&mut self) -> Result<()> {
        info!(
            "Re-evaluating business-hours schedule every {:?}",
            self.refresh_interval
        );
        let mut ticker = interval(self.refresh_interval);
        loop {
            ticker.tick().await;
            self.schedule_tick().await;
        }
    }

    /// One signal-mode tick: read the panel, then check armed and
    /// alarm independently. Each detected change updates the stored
    /// component first, so the second check (and its decision) sees
    /// the fresh value.
    async fn poll_once(&mut self) {
        let current = match self.source.read() {
            Ok(state) => state,
            Err(e) => {
                warn!("Signal read failed, keeping previous state: {e}");
                return;
            }
        };

        if current.armed != self.state.armed {
            self.state.armed = current.armed;
            self.controller
                .run_cycle(&self.state, Local::now().naive_local())
                .await;
        }
        if current.alarm != self.state.alarm {
            self.state.alarm = current.alarm;
            self.controller
                .run_cycle(&self.state, Local::now().naive_local())
                .await;
        }
    }

    /// One schedule-mode tick: re-apply unconditionally.
    async fn schedule_tick(&mut self) {
        self.controller
            .run_cycle(&self.state, Local::now().naive_local())
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::PrivacyController;
    use crate::error::SentinelError;
    use crate::inventory::{Camera, CameraClass, CameraInventory};
    use crate::mask::{CameraResult, MaskApplier};
    use crate::notify::{Notifier, NotifyError, render};
    use crate::schedule::WeeklySchedule;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    struct ScriptedSource {
        readings: VecDeque<Result<SignalState>>,
    }

    impl ScriptedSource {
        fn new(readings: Vec<Result<SignalState>>) -> Self {
            Self {
                readings: readings.into(),
            }
        }
    }

    impl SignalSource for ScriptedSource {
        fn read(&mut self) -> Result<SignalState> {
            self.readings
                .pop_front()
                .expect("scripted source ran out of readings")
        }
    }

    /// Records every (camera ips, masked) fan-out and reports success.
    #[derive(Clone, Default)]
    struct RecordingApplier {
        calls: Arc<Mutex<Vec<(Vec<String>, bool)>>>,
    }

    #[async_trait]
    impl MaskApplier for RecordingApplier {
        async fn apply(&self, cameras: &[Camera], masked: bool) -> Vec<CameraResult> {
            let ips: Vec<String> = cameras.iter().map(|c| c.ip.clone()).collect();
            self.calls.lock().unwrap().push((ips, masked));
            cameras
                .iter()
                .map(|camera| CameraResult {
                    camera: camera.clone(),
                    ok: true,
                    detail: None,
                })
                .collect()
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        subjects: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, event: &PrivacyEvent) -> std::result::Result<(), NotifyError> {
            self.subjects.lock().unwrap().push(render(event).0);
            Ok(())
        }
    }

    fn two_camera_inventory() -> CameraInventory {
        CameraInventory::from_cameras(vec![
            Camera {
                ip: "10.0.0.1".to_string(),
                class: CameraClass::Interior,
            },
            Camera {
                ip: "10.0.0.2".to_string(),
                class: CameraClass::Exterior,
            },
        ])
    }

    #[allow(clippy::type_complexity)]
    fn build_monitor(
        mode: Mode,
        readings: Vec<Result<SignalState>>,
    ) -> (
        MonitorLoop<ScriptedSource>,
        Arc<Mutex<Vec<(Vec<String>, bool)>>>,
        Arc<Mutex<Vec<String>>>,
    ) {
        let applier = RecordingApplier::default();
        let notifier = RecordingNotifier::default();
        let calls = applier.calls.clone();
        let subjects = notifier.subjects.clone();

        let controller = PrivacyController::new(
            mode,
            two_camera_inventory(),
            WeeklySchedule::default(),
            Box::new(applier),
            Box::new(notifier),
        );

        let monitor = MonitorLoop::new(
            ScriptedSource::new(readings),
            controller,
            Duration::from_secs(1),
            Duration::from_secs(60),
        )
        .unwrap();

        (monitor, calls, subjects)
    }

    fn signal(armed: bool, alarm: bool) -> Result<SignalState> {
        Ok(SignalState { armed, alarm })
    }

    #[test]
    fn test_arming_masks_interior_only() {
        tokio_test::block_on(async {
            let (mut monitor, calls, subjects) = build_monitor(
                Mode::SignalDriven,
                vec![signal(false, false), signal(true, false)],
            );

            monitor.poll_once().await;

            let calls = calls.lock().unwrap();
            assert_eq!(*calls, vec![(vec!["10.0.0.1".to_string()], true)]);
            assert_eq!(
                *subjects.lock().unwrap(),
                vec!["Interior privacy masks off".to_string()]
            );
        });
    }

    #[test]
    fn test_alarm_unmasks_whole_fleet() {
        tokio_test::block_on(async {
            let (mut monitor, calls, subjects) = build_monitor(
                Mode::SignalDriven,
                vec![signal(true, false), signal(true, true)],
            );

            monitor.poll_once().await;

            let calls = calls.lock().unwrap();
            assert_eq!(
                *calls,
                vec![(
                    vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()],
                    false
                )]
            );
            assert_eq!(
                *subjects.lock().unwrap(),
                vec!["All privacy masks off".to_string()]
            );
        });
    }

    #[test]
    fn test_both_signals_changing_run_two_cycles_in_order() {
        tokio_test::block_on(async {
            let (mut monitor, calls, _subjects) = build_monitor(
                Mode::SignalDriven,
                vec![signal(false, false), signal(true, true)],
            );

            monitor.poll_once().await;

            // Armed is checked first with alarm still low, then the
            // alarm check sees the freshly stored armed value.
            let calls = calls.lock().unwrap();
            assert_eq!(calls.len(), 2);
            assert_eq!(calls[0], (vec!["10.0.0.1".to_string()], true));
            assert_eq!(
                calls[1],
                (
                    vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()],
                    false
                )
            );
        });
    }

    #[test]
    fn test_unchanged_signals_do_nothing() {
        tokio_test::block_on(async {
            let (mut monitor, calls, _subjects) = build_monitor(
                Mode::SignalDriven,
                vec![signal(true, false), signal(true, false)],
            );

            monitor.poll_once().await;
            assert!(calls.lock().unwrap().is_empty());
        });
    }

    #[test]
    fn test_read_failure_keeps_previous_state() {
        tokio_test::block_on(async {
            let (mut monitor, calls, _subjects) = build_monitor(
                Mode::SignalDriven,
                vec![
                    signal(true, false),
                    Err(SentinelError::Signal("pin read failed".to_string())),
                    signal(true, false),
                ],
            );

            monitor.poll_once().await;
            assert!(calls.lock().unwrap().is_empty());
            assert_eq!(monitor.state, SignalState {
                armed: true,
                alarm: false
            });

            // Next tick recovers and still sees no transition.
            monitor.poll_once().await;
            assert!(calls.lock().unwrap().is_empty());
        });
    }

    #[test]
    fn test_startup_cycle_announces_and_applies() {
        tokio_test::block_on(async {
            let (mut monitor, calls, subjects) =
                build_monitor(Mode::SignalDriven, vec![signal(false, false)]);

            monitor.startup_cycle().await;

            let calls = calls.lock().unwrap();
            assert_eq!(
                *calls,
                vec![(
                    vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()],
                    true
                )]
            );
            assert_eq!(
                *subjects.lock().unwrap(),
                vec![
                    "Controller booted".to_string(),
                    "Privacy masks on".to_string()
                ]
            );
        });
    }

    #[test]
    fn test_schedule_tick_reapplies_unconditionally() {
        tokio_test::block_on(async {
            // Empty schedule: every day closed, interior masked.
            let (mut monitor, calls, _subjects) = build_monitor(Mode::ScheduleDriven, vec![]);

            monitor.schedule_tick().await;
            monitor.schedule_tick().await;

            let calls = calls.lock().unwrap();
            assert_eq!(calls.len(), 2);
            assert_eq!(calls[0], calls[1]);
            assert_eq!(calls[0], (vec!["10.0.0.1".to_string()], true));
        });
    }
}
