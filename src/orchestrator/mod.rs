//! Update run coordination.
//!
//! The orchestrator owns one run at a time: detect the local version,
//! resolve the latest published release, decide, and optionally install.
//! Progress is reported to the caller over an event channel so front
//! ends never reach into detection, resolution, or installation
//! directly.

use crate::config::GlobalConfig;
use crate::core::PyvmError;
use crate::install::{self, InstallOutcome, InstallStrategy};
use crate::interpreter;
use crate::platform;
use crate::resolver::RemoteResolver;
use crate::version::{self, UpdateDecision, VersionString};
use anyhow::Result;
use serde::Serialize;
use std::future::Future;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// The phases a run moves through.
///
/// Transitions are linear: `Idle -> Checking`, then `UpToDate` or
/// `UpdateAvailable`, then (install only) `Installing` ending in
/// `Succeeded` or `Failed`. A run never revisits a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Checking,
    UpToDate,
    UpdateAvailable,
    Installing,
    Succeeded,
    Failed,
}

impl RunPhase {
    /// Stable lowercase name for display and JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::UpToDate => "up_to_date",
            Self::UpdateAvailable => "update_available",
            Self::Installing => "installing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress notifications emitted during a run.
#[derive(Debug, Clone)]
pub enum UpdateEvent {
    /// Detection and resolution have begun.
    CheckStarted,
    /// The check finished with a decision.
    CheckCompleted(UpdateDecision),
    /// The check could not complete.
    CheckFailed(String),
    /// Installation of the named version has begun.
    InstallStarted(VersionString),
    /// The installation attempt finished (successfully or not).
    InstallCompleted(InstallOutcome),
    /// The installation could not be attempted.
    InstallFailed(String),
}

/// Coordinates check and install runs.
pub struct UpdateOrchestrator {
    config: GlobalConfig,
    /// Serializes runs; a second `run` waits for the first to finish.
    run_guard: tokio::sync::Mutex<()>,
}

impl UpdateOrchestrator {
    /// Create an orchestrator over `config`.
    #[must_use]
    pub fn new(config: GlobalConfig) -> Self {
        Self {
            config,
            run_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Detect the local version, resolve the latest, and decide.
    ///
    /// # Errors
    ///
    /// Propagates detection failures and resolution exhaustion.
    pub async fn check(&self) -> Result<UpdateDecision> {
        let local = interpreter::detect_local_version().await?;
        info!("Detected local Python {local}");

        let resolver = RemoteResolver::from_config(&self.config.resolver)?;
        let latest = resolver.resolve_latest().await?;
        info!("Latest published Python is {latest}");

        Ok(version::decide(&local, &latest))
    }

    /// Install the newer version named by `decision`.
    ///
    /// A decision with nothing to do returns the no-op outcome without
    /// selecting a strategy. Elevation is probed fresh on every call,
    /// never carried over from an earlier run.
    ///
    /// # Errors
    ///
    /// Returns [`PyvmError::ElevationRequired`] when the selected
    /// strategy needs privileges the process lacks, and propagates
    /// strategy environment errors.
    pub async fn install(&self, decision: &UpdateDecision) -> Result<InstallOutcome> {
        if !decision.needs_update {
            info!("Python {} is already up to date", decision.local);
            return Ok(InstallOutcome::already_current(&decision.local));
        }

        let identity = platform::identify_os();
        let strategy = install::strategy_for(&identity, &self.config.install)?;
        let elevated = platform::is_elevated();

        self.install_with(strategy.as_ref(), &decision.latest, elevated)
            .await
    }

    /// Run `strategy` for `target` once, after the elevation gate.
    ///
    /// The strategy is never invoked when it requires elevation the
    /// process does not hold, so no download or process launch happens
    /// on a doomed attempt.
    pub(crate) async fn install_with(
        &self,
        strategy: &dyn InstallStrategy,
        target: &VersionString,
        elevated: bool,
    ) -> Result<InstallOutcome> {
        if strategy.requires_elevation() && !elevated {
            return Err(PyvmError::ElevationRequired {
                operation: format!("install Python {target} ({})", strategy.os()),
            }
            .into());
        }

        info!("Installing Python {target} via {} strategy", strategy.os());
        strategy.install(target).await
    }

    /// Drive a full run, reporting progress on `events`.
    ///
    /// With `install` false the run stops after the decision. Returns
    /// the terminal phase. Event send failures are ignored so a dropped
    /// receiver never aborts an installation in flight.
    pub async fn run(
        &self,
        install: bool,
        events: &mpsc::Sender<UpdateEvent>,
    ) -> Result<RunPhase> {
        self.run_phases(install, events, || self.check(), None).await
    }

    /// The phase driver behind [`run`](Self::run).
    ///
    /// The check stage and install strategy are injectable so the event
    /// wiring can be exercised without a network or a host install. The
    /// run guard is held for the whole call; a concurrent run waits for
    /// the current one to reach its terminal phase.
    pub(crate) async fn run_phases<F, Fut>(
        &self,
        install: bool,
        events: &mpsc::Sender<UpdateEvent>,
        check: F,
        strategy: Option<(&dyn InstallStrategy, bool)>,
    ) -> Result<RunPhase>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<UpdateDecision>>,
    {
        let _guard = self.run_guard.lock().await;

        let _ = events.send(UpdateEvent::CheckStarted).await;
        let decision = match check().await {
            Ok(decision) => decision,
            Err(err) => {
                warn!("Check failed: {err}");
                let _ = events.send(UpdateEvent::CheckFailed(err.to_string())).await;
                return Err(err);
            }
        };
        let _ = events.send(UpdateEvent::CheckCompleted(decision.clone())).await;

        if !decision.needs_update {
            return Ok(RunPhase::UpToDate);
        }
        if !install {
            return Ok(RunPhase::UpdateAvailable);
        }

        let _ = events
            .send(UpdateEvent::InstallStarted(decision.latest.clone()))
            .await;
        let attempt = match strategy {
            Some((strategy, elevated)) => {
                self.install_with(strategy, &decision.latest, elevated).await
            }
            None => self.install(&decision).await,
        };
        match attempt {
            Ok(outcome) => {
                let phase = if outcome.succeeded {
                    RunPhase::Succeeded
                } else {
                    RunPhase::Failed
                };
                let _ = events.send(UpdateEvent::InstallCompleted(outcome)).await;
                Ok(phase)
            }
            Err(err) => {
                warn!("Installation failed: {err}");
                let _ = events.send(UpdateEvent::InstallFailed(err.to_string())).await;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::OsFamily;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct MockStrategy {
        needs_elevation: bool,
        succeed: bool,
        invocations: AtomicUsize,
    }

    impl MockStrategy {
        fn new(needs_elevation: bool, succeed: bool) -> Self {
            Self {
                needs_elevation,
                succeed,
                invocations: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl InstallStrategy for MockStrategy {
        fn os(&self) -> OsFamily {
            OsFamily::Linux
        }

        fn requires_elevation(&self) -> bool {
            self.needs_elevation
        }

        async fn install(&self, target: &VersionString) -> Result<InstallOutcome> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(InstallOutcome::success(target, "installed"))
            } else {
                Ok(InstallOutcome::failure(target, "installer exited with code 1"))
            }
        }
    }

    fn orchestrator() -> UpdateOrchestrator {
        UpdateOrchestrator::new(GlobalConfig::default())
    }

    fn v(s: &str) -> VersionString {
        VersionString::parse(s).unwrap()
    }

    #[tokio::test]
    async fn elevation_gate_blocks_before_any_strategy_work() {
        let strategy = MockStrategy::new(true, true);
        let err = orchestrator()
            .install_with(&strategy, &v("3.12.4"), false)
            .await
            .unwrap_err();

        let err = err.downcast::<PyvmError>().unwrap();
        assert!(matches!(err, PyvmError::ElevationRequired { .. }));
        assert_eq!(strategy.invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn elevated_process_passes_the_gate() {
        let strategy = MockStrategy::new(true, true);
        let outcome = orchestrator()
            .install_with(&strategy, &v("3.12.4"), true)
            .await
            .unwrap();

        assert!(outcome.succeeded);
        assert_eq!(strategy.invocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn strategy_runs_exactly_once_per_decision() {
        let strategy = MockStrategy::new(false, false);
        let outcome = orchestrator()
            .install_with(&strategy, &v("3.12.4"), false)
            .await
            .unwrap();

        // A failed attempt is reported, not retried.
        assert!(!outcome.succeeded);
        assert_eq!(strategy.invocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn install_while_current_is_a_noop() {
        let decision = version::decide(&v("3.12.4"), &v("3.12.4"));
        let outcome = orchestrator().install(&decision).await.unwrap();

        assert!(outcome.succeeded);
        assert!(outcome.message.contains("already"));
    }

    #[tokio::test]
    async fn upgrade_path_reports_target_version() {
        let strategy = MockStrategy::new(false, true);
        let decision = version::decide(&v("3.11.2"), &v("3.12.4"));
        assert!(decision.needs_update);

        let outcome = orchestrator()
            .install_with(&strategy, &decision.latest, false)
            .await
            .unwrap();
        assert!(outcome.succeeded);
        assert_eq!(outcome.installed_version.as_str(), "3.12.4");
    }

    async fn drain(rx: &mut mpsc::Receiver<UpdateEvent>) -> Vec<UpdateEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn run_posts_events_in_phase_order() {
        let orch = orchestrator();
        let strategy = MockStrategy::new(false, true);
        let decision = version::decide(&v("3.11.2"), &v("3.12.4"));
        let (tx, mut rx) = mpsc::channel(16);

        let phase = orch
            .run_phases(true, &tx, || async { Ok(decision.clone()) }, Some((&strategy, false)))
            .await
            .unwrap();
        drop(tx);

        assert_eq!(phase, RunPhase::Succeeded);
        let events = drain(&mut rx).await;
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], UpdateEvent::CheckStarted));
        assert!(matches!(&events[1], UpdateEvent::CheckCompleted(d) if d.needs_update));
        assert!(matches!(&events[2], UpdateEvent::InstallStarted(target) if target.as_str() == "3.12.4"));
        assert!(matches!(&events[3], UpdateEvent::InstallCompleted(o) if o.succeeded));
    }

    #[tokio::test]
    async fn check_only_run_stops_at_the_decision() {
        let orch = orchestrator();
        let decision = version::decide(&v("3.11.2"), &v("3.12.4"));
        let (tx, mut rx) = mpsc::channel(16);

        let phase = orch
            .run_phases(false, &tx, || async { Ok(decision.clone()) }, None)
            .await
            .unwrap();
        drop(tx);

        assert_eq!(phase, RunPhase::UpdateAvailable);
        let events = drain(&mut rx).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], UpdateEvent::CheckStarted));
        assert!(matches!(events[1], UpdateEvent::CheckCompleted(_)));
    }

    #[tokio::test]
    async fn up_to_date_run_never_reaches_the_install_stage() {
        let orch = orchestrator();
        let strategy = MockStrategy::new(false, true);
        let decision = version::decide(&v("3.12.4"), &v("3.12.4"));
        let (tx, mut rx) = mpsc::channel(16);

        let phase = orch
            .run_phases(true, &tx, || async { Ok(decision.clone()) }, Some((&strategy, false)))
            .await
            .unwrap();
        drop(tx);

        assert_eq!(phase, RunPhase::UpToDate);
        assert_eq!(strategy.invocations.load(Ordering::SeqCst), 0);
        let events = drain(&mut rx).await;
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn failed_check_posts_check_failed_and_propagates() {
        let orch = orchestrator();
        let (tx, mut rx) = mpsc::channel(16);

        let result = orch
            .run_phases(
                true,
                &tx,
                || async { Err(anyhow::anyhow!("resolution gave out")) },
                None,
            )
            .await;
        drop(tx);

        assert!(result.is_err());
        let events = drain(&mut rx).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], UpdateEvent::CheckStarted));
        assert!(matches!(&events[1], UpdateEvent::CheckFailed(reason) if reason.contains("gave out")));
    }

    #[tokio::test]
    async fn dropped_receiver_does_not_abort_the_install() {
        let orch = orchestrator();
        let strategy = MockStrategy::new(false, true);
        let decision = version::decide(&v("3.11.2"), &v("3.12.4"));
        let (tx, rx) = mpsc::channel(4);
        drop(rx);

        let phase = orch
            .run_phases(true, &tx, || async { Ok(decision.clone()) }, Some((&strategy, false)))
            .await
            .unwrap();

        assert_eq!(phase, RunPhase::Succeeded);
        assert_eq!(strategy.invocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_runs_are_serialized_by_the_guard() {
        use std::sync::Arc;
        use std::time::Duration;

        let orch = Arc::new(orchestrator());
        let (tx, mut rx) = mpsc::channel(16);

        let slow = {
            let orch = Arc::clone(&orch);
            let tx = tx.clone();
            tokio::spawn(async move {
                orch.run_phases(
                    false,
                    &tx,
                    || async {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(version::decide(&v("3.12.4"), &v("3.12.4")))
                    },
                    None,
                )
                .await
                .unwrap()
            })
        };

        // The first event is only posted once the guard is held, so the
        // competing run below is guaranteed to contend for it.
        let first = rx.recv().await.unwrap();
        assert!(matches!(first, UpdateEvent::CheckStarted));

        let fast = {
            let orch = Arc::clone(&orch);
            let tx = tx.clone();
            tokio::spawn(async move {
                orch.run_phases(
                    false,
                    &tx,
                    || async { Ok(version::decide(&v("3.12.4"), &v("3.12.4"))) },
                    None,
                )
                .await
                .unwrap()
            })
        };

        assert_eq!(slow.await.unwrap(), RunPhase::UpToDate);
        assert_eq!(fast.await.unwrap(), RunPhase::UpToDate);
        drop(tx);

        // With the first run's guard held through its sleep, the second
        // run's events must not interleave with the first's.
        let rest = drain(&mut rx).await;
        assert_eq!(rest.len(), 3);
        assert!(matches!(rest[0], UpdateEvent::CheckCompleted(_)));
        assert!(matches!(rest[1], UpdateEvent::CheckStarted));
        assert!(matches!(rest[2], UpdateEvent::CheckCompleted(_)));
    }

    #[test]
    fn phase_names_are_stable() {
        assert_eq!(RunPhase::UpToDate.to_string(), "up_to_date");
        assert_eq!(RunPhase::UpdateAvailable.to_string(), "update_available");
        assert_eq!(RunPhase::Succeeded.as_str(), "succeeded");
    }
}
