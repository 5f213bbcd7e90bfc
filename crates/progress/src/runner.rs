//! Lifecycle handle for a participant's advancement loop.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::participant::{Participant, RunOutcome};

/// Drives one participant: start, pause, resume and reset.
///
/// Each start spawns a fresh [`Participant::run`] task over the same counter;
/// the task's `JoinHandle` is the cancellation handle. Dropping the runner
/// aborts the active loop.
pub struct RaceRunner {
    participant: Arc<Participant>,
    task: Option<JoinHandle<RunOutcome>>,
}

impl RaceRunner {
    /// Create a runner owning a participant.
    pub fn new(participant: Participant) -> Self {
        Self::from_shared(Arc::new(participant))
    }

    /// Create a runner over a shared participant.
    pub fn from_shared(participant: Arc<Participant>) -> Self {
        Self {
            participant,
            task: None,
        }
    }

    /// The driven participant.
    pub fn participant(&self) -> &Arc<Participant> {
        &self.participant
    }

    /// Whether a spawned loop is still running.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Spawn the advancement loop. Returns false if one is already active.
    pub fn start(&mut self) -> bool {
        if self.is_active() {
            debug!("Runner for {} already active", self.participant.name());
            return false;
        }

        let participant = Arc::clone(&self.participant);
        self.task = Some(tokio::spawn(async move { participant.run().await }));
        info!(
            "Started {} at {}/{}",
            self.participant.name(),
            self.participant.current_progress(),
            self.participant.max_progress()
        );
        true
    }

    /// Relaunch the loop after a pause.
    pub fn resume(&mut self) -> bool {
        self.start()
    }

    /// Cancel the active loop and wait until it has stopped.
    ///
    /// Progress stays at the value of the last completed tick.
    pub async fn pause(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        task.abort();
        match task.await {
            Ok(outcome) => debug!("{} ended before pause: {:?}", self.participant.name(), outcome),
            Err(e) if e.is_cancelled() => info!(
                "Paused {} at {}",
                self.participant.name(),
                self.participant.current_progress()
            ),
            Err(e) => error!("Loop for {} panicked: {}", self.participant.name(), e),
        }
    }

    /// Stop the active loop, then set progress back to zero.
    pub async fn reset(&mut self) {
        self.pause().await;
        self.participant.reset();
        info!("Reset {}", self.participant.name());
    }

    /// Wait for the active loop to end on its own.
    ///
    /// Returns `None` if no loop was started or it did not complete normally.
    pub async fn finished(&mut self) -> Option<RunOutcome> {
        let task = self.task.take()?;
        match task.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                if !e.is_cancelled() {
                    error!("Loop for {} panicked: {}", self.participant.name(), e);
                }
                None
            }
        }
    }
}

impl Drop for RaceRunner {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use racetrack_core::ParticipantConfig;
    use std::time::Duration;

    const DELAY: Duration = Duration::from_millis(500);

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    async fn advance_ticks(ticks: usize) {
        for _ in 0..ticks {
            tokio::time::advance(DELAY).await;
            settle().await;
        }
    }

    fn runner(config: ParticipantConfig) -> RaceRunner {
        RaceRunner::new(Participant::new(config).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_at_tick_five_then_resume_to_finish() {
        let mut runner = runner(ParticipantConfig::new("Test"));
        assert!(runner.start());
        settle().await;

        advance_ticks(1).await;
        assert_eq!(runner.participant().current_progress(), 1);

        advance_ticks(4).await;
        runner.pause().await;
        assert_eq!(runner.participant().current_progress(), 5);
        assert!(!runner.is_active());

        advance_ticks(10).await;
        assert_eq!(runner.participant().current_progress(), 5);

        assert!(runner.resume());
        settle().await;
        advance_ticks(94).await;
        assert_eq!(runner.participant().current_progress(), 99);

        advance_ticks(1).await;
        assert_eq!(runner.participant().current_progress(), 100);
        assert_eq!(runner.finished().await, Some(RunOutcome::Completed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_resume_is_transparent() {
        let cases = [(1, 100), (3, 10), (7, 50), (150, 100)];
        let segments = [2, 1, 3, 1, 4, 2, 5, 1, 3, 2];

        for (increment, max) in cases {
            let config = ParticipantConfig::new("Test")
                .max_progress(max)
                .progress_increment(increment);

            let mut interrupted = runner(config.clone());
            let mut total_ticks = 0;
            for ticks in segments {
                interrupted.resume();
                settle().await;
                advance_ticks(ticks).await;
                interrupted.pause().await;
                total_ticks += ticks;
            }

            let mut continuous = runner(config);
            continuous.start();
            settle().await;
            advance_ticks(total_ticks).await;
            continuous.pause().await;

            assert_eq!(
                interrupted.participant().current_progress(),
                continuous.participant().current_progress(),
                "increment={increment} max={max}"
            );
            assert!(interrupted.participant().current_progress() <= max);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_is_noop() {
        let mut runner = runner(ParticipantConfig::new("Test"));
        assert!(runner.start());
        assert!(!runner.start());
        settle().await;

        advance_ticks(3).await;
        assert_eq!(runner.participant().current_progress(), 3);
        runner.pause().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_stops_loop_and_zeroes_progress() {
        let mut runner = runner(ParticipantConfig::new("Test").progress_increment(10));
        runner.start();
        settle().await;
        advance_ticks(3).await;
        assert_eq!(runner.participant().current_progress(), 30);

        runner.reset().await;
        assert!(!runner.is_active());
        assert_eq!(runner.participant().current_progress(), 0);

        advance_ticks(2).await;
        assert_eq!(runner.participant().current_progress(), 0);

        runner.resume();
        settle().await;
        advance_ticks(1).await;
        assert_eq!(runner.participant().current_progress(), 10);
        runner.pause().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_after_finish_allows_new_race() {
        let mut runner = runner(ParticipantConfig::new("Test").progress_increment(150));
        runner.start();
        settle().await;
        advance_ticks(1).await;
        assert_eq!(runner.finished().await, Some(RunOutcome::Completed));

        runner.reset().await;
        runner.start();
        settle().await;
        advance_ticks(1).await;
        assert_eq!(runner.participant().current_progress(), 100);
    }

    #[tokio::test]
    async fn test_start_when_already_complete() {
        let mut runner = runner(ParticipantConfig::new("Test").initial_progress(150));
        runner.start();
        assert_eq!(runner.finished().await, Some(RunOutcome::AlreadyComplete));
        assert_eq!(runner.participant().current_progress(), 150);
    }

    #[tokio::test]
    async fn test_pause_without_start() {
        let mut runner = runner(ParticipantConfig::new("Test"));
        runner.pause().await;
        assert_eq!(runner.finished().await, None);
        assert_eq!(runner.participant().current_progress(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_loop() {
        let runner = {
            let mut runner = runner(ParticipantConfig::new("Test"));
            runner.start();
            runner
        };
        settle().await;
        advance_ticks(2).await;

        let participant = Arc::clone(runner.participant());
        drop(runner);
        settle().await;
        advance_ticks(3).await;

        assert_eq!(participant.current_progress(), 2);
        assert!(!participant.is_running());
    }
}
