//! Repeat-loop controller.
//!
//! The controller owns the session state machine and drives the injected
//! [`PlayerHandle`] in response to boundary crossings.
//!
//! # Architecture
//!
//! ```text
//!  start()/stop() ──┐
//!                   ├──> Mutex<Inner> ──> PlayerHandle (seek/play/pause)
//!  Supervisor tick ─┘         │
//!        │                    └──> ProgressReporter ──> watch + broadcast
//!        └── reads latest PositionSample (watch slot, most recent wins)
//! ```
//!
//! Every mutation happens while holding the single `Inner` lock. Samples are
//! kept outside that lock so a player bridge can push them at any time,
//! including from inside a command.
//!
//! # Example
//!
//! ```rust,ignore
//! use reprise::playback::RepeatLoopController;
//! use reprise::testing::MockPlayer;
//!
//! let controller = RepeatLoopController::new(Arc::new(MockPlayer::new()), Default::default())?;
//! controller.start(0.0, 10.0, 3)?;
//! controller.on_position_sample(10.2, 120.0);
//! controller.poll_now();
//! assert_eq!(controller.snapshot().current_count, 1);
//! ```

use super::boundary::BoundaryDetector;
use super::progress::{ProgressEvent, ProgressReporter, ProgressSnapshot, Transition};
use super::state::{
    LoopPhase, PositionSample, RepeatParameters, RepeatSession, SessionId, SessionState,
};
use super::supervisor::{Supervisor, TickOutcome};
use crate::config::ControllerConfig;
use crate::error::{RepriseError, Result, ValidationError};
use crate::testing::PlayerHandle;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

/// Drives an external player to replay a time window.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct RepeatLoopController {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for RepeatLoopController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepeatLoopController")
            .field("player", &"<dyn PlayerHandle>")
            .field("config", &self.shared.config)
            .field("state", &self.state())
            .finish()
    }
}

struct Shared {
    player: Arc<dyn PlayerHandle>,
    config: ControllerConfig,
    detector: BoundaryDetector,
    samples: watch::Sender<Option<PositionSample>>,
    snapshot: watch::Sender<ProgressSnapshot>,
    events: broadcast::Sender<ProgressEvent>,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    phase: LoopPhase,
    /// Bumped whenever a session ends or is replaced.
    generation: u64,
    reporter: ProgressReporter,
    supervisor: Option<Supervisor>,
    last_parameters: Option<RepeatParameters>,
}

/// Transitions reported with the current session attached.
#[derive(Debug, Clone, Copy)]
enum SessionTransition {
    Started,
    Progressed,
    Completed,
}

impl RepeatLoopController {
    /// Create a controller around `player`.
    ///
    /// # Errors
    ///
    /// Returns [`RepriseError::InvalidConfig`] if `config` fails validation.
    pub fn new(player: Arc<dyn PlayerHandle>, config: ControllerConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|reason| RepriseError::InvalidConfig {
                field: "controller".to_string(),
                reason,
            })?;

        let (samples, _) = watch::channel(None);
        let (snapshot, _) = watch::channel(ProgressSnapshot::default());
        let (events, _) = broadcast::channel(config.event_capacity);

        Ok(Self {
            shared: Arc::new(Shared {
                player,
                detector: BoundaryDetector::new(config.hysteresis_margin),
                config,
                samples,
                snapshot,
                events,
                inner: Mutex::new(Inner::default()),
            }),
        })
    }

    /// Start repeating `[start_time, end_time)`.
    ///
    /// `planned_repeats == 0` loops until [`stop`](Self::stop). A running
    /// session is stopped first. On success the player receives
    /// `seek(start_time)` then `play()` and the supervisor is armed.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a bad window; the running session,
    /// if any, is left untouched.
    pub fn start(
        &self,
        start_time: f64,
        end_time: f64,
        planned_repeats: u32,
    ) -> std::result::Result<(), ValidationError> {
        let parameters = RepeatParameters::new(start_time, end_time, planned_repeats);
        let shared = &self.shared;
        let mut guard = shared.lock();
        let inner = &mut *guard;

        if let Err(error) = parameters.validate() {
            warn!(
                kind = error.kind(),
                start_time, end_time, planned_repeats, "Rejected repeat request"
            );
            let state = inner.phase.state();
            let session_id = inner.phase.session().map(|s| s.id);
            shared.emit(
                &mut inner.reporter,
                state,
                session_id,
                Transition::Rejected(error),
            );
            return Err(error);
        }

        if let Some(previous) = inner.phase.session() {
            info!(session_id = %previous.id, "Superseding running repeat");
            let was_running = inner.phase.state() != SessionState::Completed;
            shared.halt(inner, was_running);
            shared.emit(&mut inner.reporter, SessionState::Idle, None, Transition::Superseded);
        }

        inner.generation += 1;
        let generation = inner.generation;
        // Positions reported before this seek belong to the previous playhead.
        shared.samples.send_replace(None);

        let session = RepeatSession::new(parameters);
        info!(
            session_id = %session.id,
            generation,
            start_time,
            end_time,
            planned_repeats,
            "Repeat armed"
        );
        inner.phase = LoopPhase::Armed(session);
        inner.last_parameters = Some(parameters);

        shared.command("seek", shared.player.seek(start_time));
        shared.command("play", shared.player.play());

        let weak = Arc::downgrade(&self.shared);
        inner.supervisor = Supervisor::spawn(generation, shared.config.poll_interval(), move || {
            match weak.upgrade() {
                Some(shared) => shared.tick(generation),
                None => TickOutcome::Finished,
            }
        });
        if inner.supervisor.is_none() {
            warn!(generation, "No async runtime; ticks must be driven with poll_now()");
        }

        inner.phase = std::mem::take(&mut inner.phase).into_looping();
        shared.emit_session(inner, SessionTransition::Started);
        Ok(())
    }

    /// Stop the current session.
    ///
    /// Idempotent. No tick runs against the stopped session once this
    /// returns.
    pub fn stop(&self) {
        let shared = &self.shared;
        let mut guard = shared.lock();
        let inner = &mut *guard;

        let Some(session) = inner.phase.session() else {
            debug!("stop() with no active session");
            return;
        };
        info!(
            session_id = %session.id,
            completed = session.completed_repeats,
            "Repeat stopped"
        );

        let was_running = inner.phase.state() != SessionState::Completed;
        shared.halt(inner, was_running);
        shared.emit(&mut inner.reporter, SessionState::Idle, None, Transition::Stopped);
    }

    /// Record the latest position reported by the player.
    ///
    /// Only the most recent sample is kept.
    pub fn on_position_sample(&self, current_time: f64, duration: f64) {
        self.shared
            .samples
            .send_replace(Some(PositionSample::new(current_time, duration)));
    }

    /// Process one tick for the active session right now.
    ///
    /// The supervisor calls the same handler on its interval.
    pub fn poll_now(&self) {
        let mut guard = self.shared.lock();
        self.shared.process_tick(&mut guard);
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shared.lock().phase.state()
    }

    /// Copy of the active session, if any.
    #[must_use]
    pub fn session(&self) -> Option<RepeatSession> {
        self.shared.lock().phase.session().cloned()
    }

    /// Parameters of the last accepted `start()`, for save requests.
    #[must_use]
    pub fn last_parameters(&self) -> Option<RepeatParameters> {
        self.shared.lock().last_parameters
    }

    /// Latest sample, if one arrived since the last `start()`.
    #[must_use]
    pub fn latest_sample(&self) -> Option<PositionSample> {
        *self.shared.samples.borrow()
    }

    /// Latest observable state.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.shared.snapshot.borrow().clone()
    }

    /// Watch the observable state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.shared.snapshot.subscribe()
    }

    /// Receive every progress event emitted from now on.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<ProgressEvent> {
        self.shared.events.subscribe()
    }

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.shared.config
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Supervisor entry point.
    fn tick(&self, generation: u64) -> TickOutcome {
        let mut guard = self.lock();
        if guard.generation != generation {
            debug!(generation, current = guard.generation, "Dropping stale tick");
            return TickOutcome::Finished;
        }
        self.process_tick(&mut guard)
    }

    fn process_tick(&self, inner: &mut Inner) -> TickOutcome {
        let LoopPhase::Looping(session) = &mut inner.phase else {
            return TickOutcome::Finished;
        };

        let Some(sample) = *self.samples.borrow() else {
            return TickOutcome::Continue;
        };
        if !sample.is_usable() {
            debug!(
                current_time = sample.current_time,
                "Ignoring unusable position sample"
            );
            return TickOutcome::Continue;
        }

        let window = session.parameters.window();
        let classification = self.detector.classify(
            sample.current_time,
            window,
            session.crossed_since_last_seek,
        );

        if classification.should_reset_debounce && session.crossed_since_last_seek {
            debug!(position = sample.current_time, "Boundary re-armed");
            session.reset_debounce();
        }
        if !classification.crossed {
            return TickOutcome::Continue;
        }

        session.record_crossing();
        debug!(
            session_id = %session.id,
            position = sample.current_time,
            completed = session.completed_repeats,
            planned = session.parameters.planned_repeats,
            "Boundary crossed"
        );

        if session.is_target_reached() {
            info!(
                session_id = %session.id,
                completed = session.completed_repeats,
                "Repeat target reached"
            );
            self.command("pause", self.player.pause());
            if let LoopPhase::Looping(session) = std::mem::take(&mut inner.phase) {
                inner.phase = LoopPhase::Completed(session);
            }
            inner.supervisor = None;
            self.emit_session(inner, SessionTransition::Completed);
            TickOutcome::Finished
        } else {
            let start = session.parameters.start_time;
            self.command("seek", self.player.seek(start));
            self.emit_session(inner, SessionTransition::Progressed);
            TickOutcome::Continue
        }
    }

    /// End the current session without reporting.
    fn halt(&self, inner: &mut Inner, issue_pause: bool) {
        inner.generation += 1;
        if let Some(supervisor) = inner.supervisor.take() {
            supervisor.cancel();
        }
        if issue_pause {
            self.command("pause", self.player.pause());
        }
        inner.phase = LoopPhase::Idle;
    }

    /// Log and swallow a failed fire-and-forget command.
    fn command(&self, name: &'static str, result: Result<()>) {
        if let Err(error) = result {
            warn!(command = name, %error, "Player command failed");
        }
    }

    fn emit_session(&self, inner: &mut Inner, kind: SessionTransition) {
        let Inner {
            phase, reporter, ..
        } = inner;
        let state = phase.state();
        let Some(session) = phase.session() else {
            return;
        };
        let transition = match kind {
            SessionTransition::Started => Transition::Started(session),
            SessionTransition::Progressed => Transition::Progressed(session),
            SessionTransition::Completed => Transition::Completed(session),
        };
        self.emit(reporter, state, Some(session.id), transition);
    }

    fn emit(
        &self,
        reporter: &mut ProgressReporter,
        state: SessionState,
        session_id: Option<SessionId>,
        transition: Transition<'_>,
    ) {
        let event = ProgressEvent {
            state,
            session_id,
            report: reporter.report(transition),
            at: Utc::now(),
        };
        let signaled = reporter.completion_signaled();
        self.snapshot.send_modify(|snapshot| snapshot.apply(&event, signaled));
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
