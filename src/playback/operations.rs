//! Simulated implementation of the player seam.
//!
//! [`SimulatedPlayer`] stands in for a real media player: a playhead that
//! advances with the tokio clock at a configurable rate, plus a feed task
//! that pushes position samples into a controller at its own cadence, the
//! way a bridge to a real player would.

use super::controller::RepeatLoopController;
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::testing::PlayerHandle;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, trace};

#[derive(Debug)]
struct Playhead {
    /// Position at `anchor`.
    position: f64,
    playing: bool,
    anchor: Instant,
}

/// A playhead driven by the tokio clock.
#[derive(Debug)]
pub struct SimulatedPlayer {
    playhead: Mutex<Playhead>,
    rate: f64,
    duration: Option<f64>,
}

impl SimulatedPlayer {
    /// Create a paused player at position zero.
    #[must_use]
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            playhead: Mutex::new(Playhead {
                position: 0.0,
                playing: false,
                anchor: Instant::now(),
            }),
            rate: config.rate,
            duration: config.duration,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Playhead> {
        self.playhead.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn position_of(&self, playhead: &Playhead) -> f64 {
        let position = if playhead.playing {
            playhead.position + playhead.anchor.elapsed().as_secs_f64() * self.rate
        } else {
            playhead.position
        };
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    /// Current playhead position in seconds.
    #[must_use]
    pub fn position(&self) -> f64 {
        let playhead = self.lock();
        self.position_of(&playhead)
    }

    /// Media duration, NaN when unknown.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration.unwrap_or(f64::NAN)
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.lock().playing
    }

    /// Push a sample into `controller` every `period`.
    ///
    /// Abort the returned handle to stop the feed.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn_feed(
        self: &Arc<Self>,
        controller: RepeatLoopController,
        period: Duration,
    ) -> JoinHandle<()> {
        let player = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let position = player.position();
                trace!(position, "Pushing position sample");
                controller.on_position_sample(position, player.duration());
            }
        })
    }
}

impl PlayerHandle for SimulatedPlayer {
    fn seek(&self, seconds: f64) -> Result<()> {
        let mut playhead = self.lock();
        playhead.position = seconds.max(0.0);
        playhead.anchor = Instant::now();
        debug!(seconds, "Simulated seek");
        Ok(())
    }

    fn play(&self) -> Result<()> {
        let mut playhead = self.lock();
        if !playhead.playing {
            playhead.position = self.position_of(&playhead);
            playhead.anchor = Instant::now();
            playhead.playing = true;
        }
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        let mut playhead = self.lock();
        if playhead.playing {
            playhead.position = self.position_of(&playhead);
            playhead.anchor = Instant::now();
            playhead.playing = false;
        }
        Ok(())
    }
}
