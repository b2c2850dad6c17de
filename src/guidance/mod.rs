//! Guidance engine: operating state machine and the capture/analyze loop.
//!
//! ## States
//!
//! Idle → Active → {Paused ⇄ Active} → Idle. `stop()` returns to Idle from
//! any running state. An `analyzing` guard flag keeps analyses strictly
//! sequential: a tick that fires while the previous one is still in flight
//! is skipped outright, never queued, so a slow vision service cannot build
//! an unbounded backlog.
//!
//! ## Concurrency
//!
//! A single mutex guards all mutable engine state (state, analyzing flag,
//! last snapshot, cooldown map). Critical sections are small and never held
//! across an await. The timer is a spawned task cancelled via
//! `CancellationToken`; a generation counter ensures results from a run
//! that was stopped are discarded instead of committed.

pub mod announcer;
pub mod haptics;
pub mod throttle;

use crate::config::GuidanceConfig;
use crate::output::{HapticOutput, SpeechOutput};
use crate::perception::{parser, FrameSource, VisionQueryClient};
use crate::types::{DetectionSnapshot, EngineState, SensitivityLevel};
use announcer::Announcer;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors surfaced by the engine's public operations.
///
/// Transient capture/vision failures never appear here — they are absorbed
/// at the tick boundary and logged.
#[derive(Debug, Error)]
pub enum GuidanceError {
    #[error("invalid transition: cannot {operation} while {from}")]
    InvalidTransition {
        from: EngineState,
        operation: &'static str,
    },

    #[error("camera not ready: {0}")]
    CameraUnavailable(String),
}

/// Events published to observers (UI layers, tests). Observers never mutate
/// engine state except through the public operations.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    StateChanged(EngineState),
    SnapshotUpdated(DetectionSnapshot),
}

/// Engine diagnostics counters.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct EngineStats {
    /// Ticks admitted for analysis
    pub ticks: u64,
    /// Ticks skipped because an analysis was still in flight
    pub skipped_ticks: u64,
    /// Ticks that failed at capture or the vision call
    pub failed_ticks: u64,
    /// Snapshots committed
    pub snapshots: u64,
}

/// Mutable engine state behind the single mutex.
struct EngineCore {
    state: EngineState,
    sensitivity: SensitivityLevel,
    analysis_interval: Duration,
    analyzing: bool,
    last_snapshot: Option<DetectionSnapshot>,
    announcer: Announcer,
    timer: Option<CancellationToken>,
    /// Bumped on every start() and stop(); in-flight results from an older
    /// generation are discarded instead of committed.
    generation: u64,
    stats: EngineStats,
}

struct EngineInner {
    frames: Arc<dyn FrameSource>,
    vision: Arc<dyn VisionQueryClient>,
    speech: Arc<dyn SpeechOutput>,
    haptics_out: Arc<dyn HapticOutput>,
    core: Mutex<EngineCore>,
    events: broadcast::Sender<EngineEvent>,
}

impl EngineInner {
    fn core(&self) -> MutexGuard<'_, EngineCore> {
        self.core.lock().expect("engine mutex poisoned")
    }
}

/// The guidance engine. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct GuidanceEngine {
    inner: Arc<EngineInner>,
}

impl GuidanceEngine {
    pub fn new(
        frames: Arc<dyn FrameSource>,
        vision: Arc<dyn VisionQueryClient>,
        speech: Arc<dyn SpeechOutput>,
        haptics_out: Arc<dyn HapticOutput>,
        config: &GuidanceConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(crate::config::defaults::EVENT_CHANNEL_CAPACITY);
        let core = EngineCore {
            state: EngineState::Idle,
            sensitivity: config.engine.sensitivity_level(),
            analysis_interval: config.analysis_interval(),
            analyzing: false,
            last_snapshot: None,
            announcer: Announcer::new(config.announcement_cooldown()),
            timer: None,
            generation: 0,
            stats: EngineStats::default(),
        };
        Self {
            inner: Arc::new(EngineInner {
                frames,
                vision,
                speech,
                haptics_out,
                core: Mutex::new(core),
                events,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    pub fn state(&self) -> EngineState {
        self.inner.core().state
    }

    /// Last committed snapshot, retained for repeat-on-demand and display.
    pub fn last_snapshot(&self) -> Option<DetectionSnapshot> {
        self.inner.core().last_snapshot.clone()
    }

    pub fn stats(&self) -> EngineStats {
        self.inner.core().stats
    }

    /// Subscribe to state-change and snapshot-update notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.inner.events.subscribe()
    }

    // ------------------------------------------------------------------
    // State transitions
    // ------------------------------------------------------------------

    /// Begin guidance. Valid only from Idle.
    ///
    /// Fails with `CameraUnavailable` (and speaks a failure phrase) when the
    /// frame source is not ready; the engine then remains Idle. On success
    /// the first tick runs immediately, then every `analysis_interval`.
    pub async fn start(&self) -> Result<(), GuidanceError> {
        {
            let core = self.inner.core();
            if core.state != EngineState::Idle {
                return Err(GuidanceError::InvalidTransition {
                    from: core.state,
                    operation: "start",
                });
            }
        }

        if let Err(e) = self.inner.frames.ensure_ready().await {
            warn!(source = self.inner.frames.source_name(), error = %e, "Frame source not ready — refusing to start");
            self.inner.speech.speak("Camera not ready.");
            return Err(GuidanceError::CameraUnavailable(e.to_string()));
        }

        let (token, interval, generation) = {
            let mut core = self.inner.core();
            // Re-check: another task may have started while we probed.
            if core.state != EngineState::Idle {
                return Err(GuidanceError::InvalidTransition {
                    from: core.state,
                    operation: "start",
                });
            }
            core.state = EngineState::Active;
            core.generation += 1;
            let token = CancellationToken::new();
            core.timer = Some(token.clone());
            (token, core.analysis_interval, core.generation)
        };

        info!(
            interval_ms = interval.as_millis() as u64,
            source = self.inner.frames.source_name(),
            vision = self.inner.vision.client_name(),
            "Guidance started"
        );
        self.inner.speech.speak("Obstacle detection started.");
        self.inner.haptics_out.vibrate(&haptics::CONFIRM_PATTERN);
        self.publish_state(EngineState::Active);

        self.spawn_timer(token, interval, generation, true);
        Ok(())
    }

    /// Suspend ticking without discarding state. Valid only from Active.
    pub fn pause(&self) -> Result<(), GuidanceError> {
        {
            let mut core = self.inner.core();
            if core.state != EngineState::Active {
                return Err(GuidanceError::InvalidTransition {
                    from: core.state,
                    operation: "pause",
                });
            }
            core.state = EngineState::Paused;
            if let Some(timer) = core.timer.take() {
                timer.cancel();
            }
        }

        info!("Guidance paused");
        self.inner.speech.speak("Detection paused.");
        self.inner.haptics_out.vibrate(&haptics::LIGHT_PATTERN);
        self.publish_state(EngineState::Paused);
        Ok(())
    }

    /// Resume ticking after a pause. Valid only from Paused. The timer
    /// restarts with a full fresh period, not the remainder of the old one.
    pub fn resume(&self) -> Result<(), GuidanceError> {
        let (token, interval, generation) = {
            let mut core = self.inner.core();
            if core.state != EngineState::Paused {
                return Err(GuidanceError::InvalidTransition {
                    from: core.state,
                    operation: "resume",
                });
            }
            core.state = EngineState::Active;
            let token = CancellationToken::new();
            core.timer = Some(token.clone());
            (token, core.analysis_interval, core.generation)
        };

        info!("Guidance resumed");
        self.inner.speech.speak("Detection resumed.");
        self.inner.haptics_out.vibrate(&haptics::CONFIRM_PATTERN);
        self.publish_state(EngineState::Active);

        self.spawn_timer(token, interval, generation, false);
        Ok(())
    }

    /// Stop guidance. Valid from Active or Paused.
    ///
    /// Cancels the timer, clears the cooldown map so a restart begins with
    /// fresh announcement history, and bumps the generation so any analysis
    /// still in flight is discarded when it completes. The last snapshot is
    /// retained for repeat-on-demand.
    pub fn stop(&self) -> Result<(), GuidanceError> {
        {
            let mut core = self.inner.core();
            if core.state == EngineState::Idle {
                return Err(GuidanceError::InvalidTransition {
                    from: core.state,
                    operation: "stop",
                });
            }
            core.state = EngineState::Idle;
            core.generation += 1;
            if let Some(timer) = core.timer.take() {
                timer.cancel();
            }
            core.announcer.clear_history();
        }

        info!("Guidance stopped");
        self.inner.speech.speak("Obstacle detection stopped.");
        self.inner.haptics_out.vibrate(&haptics::LIGHT_PATTERN);
        self.publish_state(EngineState::Idle);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Runtime configuration
    // ------------------------------------------------------------------

    /// Change the sensitivity cutoff. Takes effect on the next tick; the
    /// last snapshot is not reprocessed.
    pub fn set_sensitivity(&self, level: SensitivityLevel) {
        let mut core = self.inner.core();
        core.sensitivity = level;
        info!(sensitivity = %level, cutoff_m = level.max_distance_meters(), "Sensitivity updated");
    }

    /// Change the analysis interval. Restarts the timer immediately when
    /// Active; otherwise only the stored value changes.
    pub fn set_analysis_interval(&self, interval: Duration) {
        let restart = {
            let mut core = self.inner.core();
            core.analysis_interval = interval;
            if core.state == EngineState::Active {
                if let Some(timer) = core.timer.take() {
                    timer.cancel();
                }
                let token = CancellationToken::new();
                core.timer = Some(token.clone());
                Some((token, core.generation))
            } else {
                None
            }
        };

        info!(interval_ms = interval.as_millis() as u64, "Analysis interval updated");
        if let Some((token, generation)) = restart {
            self.spawn_timer(token, interval, generation, false);
        }
    }

    /// Speak the last snapshot's full announcement again on demand.
    pub fn repeat_last(&self) {
        let snapshot = self.inner.core().last_snapshot.clone();
        match snapshot {
            Some(snap) => self.inner.speech.speak(&snap.full_announcement()),
            None => self.inner.speech.speak("No detections yet."),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn publish_state(&self, state: EngineState) {
        let _ = self.inner.events.send(EngineEvent::StateChanged(state));
    }

    fn spawn_timer(
        &self,
        token: CancellationToken,
        interval: Duration,
        generation: u64,
        immediate_first: bool,
    ) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            if !immediate_first {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            loop {
                // Ticks run detached so a slow vision call never stalls the
                // timer; the analyzing flag skips overlapping fires.
                let tick_inner = Arc::clone(&inner);
                tokio::spawn(async move {
                    run_tick(&tick_inner, generation).await;
                });
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        });
    }
}

/// One capture → describe → parse → announce pass.
///
/// Capture and vision failures are logged and make the tick a no-op; they
/// never terminate the loop or reach the caller of `start()`.
async fn run_tick(inner: &Arc<EngineInner>, generation: u64) {
    // Tick admission.
    let sensitivity = {
        let mut core = inner.core();
        if core.state != EngineState::Active || core.generation != generation {
            return;
        }
        if core.analyzing {
            core.stats.skipped_ticks += 1;
            debug!("Analysis still in flight — skipping tick");
            return;
        }
        core.analyzing = true;
        core.stats.ticks += 1;
        core.sensitivity
    };

    // The frame lives only for the duration of the vision call.
    let reply = {
        match inner.frames.capture_frame().await {
            Ok(frame) => inner.vision.describe_path(&frame).await,
            Err(e) => Err(e),
        }
    };

    let raw = match reply {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "Tick failed at capture or vision call — continuing");
            let mut core = inner.core();
            core.analyzing = false;
            core.stats.failed_ticks += 1;
            return;
        }
    };

    let snapshot = parser::parse(&raw, sensitivity);

    let output = {
        let mut core = inner.core();
        core.analyzing = false;
        // The engine may have been stopped or restarted while the vision
        // call was in flight; stale results are discarded, not committed.
        if core.state != EngineState::Active || core.generation != generation {
            debug!("Discarding analysis result — engine no longer active");
            return;
        }
        let prev_status = core.last_snapshot.as_ref().map(|s| s.path_status);
        let output = core
            .announcer
            .process(&snapshot, prev_status, Instant::now());
        core.last_snapshot = Some(snapshot.clone());
        core.stats.snapshots += 1;
        output
    };

    debug!(
        status = %snapshot.path_status,
        obstacles = snapshot.obstacles.len(),
        spoken = output.spoken.is_some(),
        "Snapshot committed"
    );

    if let Some(ref text) = output.spoken {
        inner.speech.speak(text);
    }
    if let Some(ref pattern) = output.haptic {
        inner.haptics_out.vibrate(pattern);
    }
    let _ = inner.events.send(EngineEvent::SnapshotUpdated(snapshot));
}
