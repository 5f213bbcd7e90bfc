//! The participant progress engine.
//!
//! A [`Participant`] owns one bounded counter and an advancement loop,
//! [`Participant::run`], that ticks it toward `max_progress`. The loop owns no
//! state of its own: pausing means dropping the running future (e.g. aborting
//! the task it was spawned on) and resuming means calling `run` again over the
//! same counter.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;

use racetrack_core::{ParticipantConfig, ProgressSnapshot, Result};
use tracing::{debug, info, warn};

/// How a call to [`Participant::run`] ended.
///
/// Cancellation has no variant: a cancelled loop never returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The loop advanced progress up to `max_progress`
    Completed,
    /// Progress was already at or above `max_progress`; nothing happened
    AlreadyComplete,
    /// Another `run` on the same participant is still active; nothing happened
    AlreadyRunning,
}

/// One race entrant's resumable progress state.
#[derive(Debug)]
pub struct Participant {
    name: String,
    max_progress: i32,
    progress_increment: i32,
    progress_delay: Duration,
    current_progress: AtomicI32,
    running: AtomicBool,
}

impl Participant {
    /// Create a participant, rejecting out-of-range bounds.
    pub fn new(config: ParticipantConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    /// Create a participant with the default bounds.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self::from_valid_config(ParticipantConfig::new(name))
    }

    fn from_valid_config(config: ParticipantConfig) -> Self {
        let progress_delay = config.progress_delay();
        Self {
            name: config.name,
            max_progress: config.max_progress,
            progress_increment: config.progress_increment,
            progress_delay,
            current_progress: AtomicI32::new(config.initial_progress),
            running: AtomicBool::new(false),
        }
    }

    /// Participant label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Upper bound on progress.
    pub fn max_progress(&self) -> i32 {
        self.max_progress
    }

    /// Amount added per tick.
    pub fn progress_increment(&self) -> i32 {
        self.progress_increment
    }

    /// Delay between ticks.
    pub fn progress_delay(&self) -> Duration {
        self.progress_delay
    }

    /// Last committed progress value.
    pub fn current_progress(&self) -> i32 {
        self.current_progress.load(Ordering::Acquire)
    }

    /// `current_progress / max_progress`, computed on every read and not clamped.
    pub fn progress_factor(&self) -> f32 {
        self.current_progress() as f32 / self.max_progress as f32
    }

    /// Whether progress has reached `max_progress`.
    pub fn is_finished(&self) -> bool {
        self.current_progress() >= self.max_progress
    }

    /// Whether a `run` loop is currently active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Take a progress snapshot.
    pub fn snapshot(&self) -> ProgressSnapshot {
        let current_progress = self.current_progress();
        ProgressSnapshot {
            name: self.name.clone(),
            current_progress,
            max_progress: self.max_progress,
            progress_factor: current_progress as f32 / self.max_progress as f32,
            finished: current_progress >= self.max_progress,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Set progress back to zero. Bounds are untouched.
    ///
    /// Callers must stop any active loop first.
    pub fn reset(&self) {
        self.current_progress.store(0, Ordering::Release);
        debug!("Participant {} reset", self.name);
    }

    /// Advance progress one tick at a time until `max_progress` is reached.
    ///
    /// The inter-tick delay is the only await point, so dropping this future
    /// leaves progress at the value committed by the last completed tick.
    pub async fn run(&self) -> RunOutcome {
        if self.is_finished() {
            debug!(
                "Participant {} already at {}/{}",
                self.name,
                self.current_progress(),
                self.max_progress
            );
            return RunOutcome::AlreadyComplete;
        }

        let Some(_guard) = RunGuard::acquire(&self.running) else {
            warn!("Participant {} is already advancing, ignoring run", self.name);
            return RunOutcome::AlreadyRunning;
        };

        debug!(
            "Participant {} advancing from {}",
            self.name,
            self.current_progress()
        );

        loop {
            let current = self.current_progress();
            if current >= self.max_progress {
                break;
            }

            self.wait_for_tick().await;

            let next = next_progress(self.current_progress(), self.progress_increment, self.max_progress);
            self.current_progress.store(next, Ordering::Release);
            debug!("Participant {} tick: {}/{}", self.name, next, self.max_progress);
        }

        info!("Participant {} finished at {}", self.name, self.max_progress);
        RunOutcome::Completed
    }

    async fn wait_for_tick(&self) {
        if self.progress_delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.progress_delay).await;
        }
    }
}

/// Progress after one tick, never past `max`.
///
/// The remaining distance is taken in `i64` so neither the subtraction nor the
/// addition can overflow, even for a negative `current`.
fn next_progress(current: i32, increment: i32, max: i32) -> i32 {
    let remaining = i64::from(max) - i64::from(current);
    if remaining <= 0 {
        return current;
    }
    let step = i64::from(increment).min(remaining);
    // current < result <= max, so the cast is lossless.
    (i64::from(current) + step) as i32
}

/// Holds a participant's in-progress flag for the lifetime of one `run`.
///
/// Released on drop, which also covers a cancelled loop.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
