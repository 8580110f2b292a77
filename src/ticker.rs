//! Repeating task that keeps the puzzle clock display current.

use crate::puzzle::{Phase, PuzzleState};
use crate::timer::{elapsed_display, Clock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::trace;

/// Publishes the elapsed-time string for a puzzle while it runs.
///
/// Every tick re-reads the latest state, so a reset shows up as an empty
/// display on the next tick instead of a stale duration. Ticking pauses while
/// the puzzle is not started or solved and resumes when the state changes.
/// Dropping the ticker stops the task.
pub struct TimerTicker {
    handle: JoinHandle<()>,
    display: watch::Receiver<String>,
}

impl TimerTicker {
    /// Spawn onto the current tokio runtime.
    pub fn spawn<C>(mut states: watch::Receiver<PuzzleState>, clock: C, period: Duration) -> Self
    where
        C: Clock + Send + 'static,
    {
        let initial = {
            let state = states.borrow_and_update();
            elapsed_display(state.start_time, state.stop_time, clock.now())
        };
        let (tx, display) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                let (text, running) = {
                    let state = states.borrow_and_update();
                    (
                        elapsed_display(state.start_time, state.stop_time, clock.now()),
                        state.phase() == Phase::InProgress,
                    )
                };
                tx.send_if_modified(|current| {
                    if *current == text {
                        false
                    } else {
                        trace!(elapsed = %text, "timer display updated");
                        *current = text;
                        true
                    }
                });

                if running {
                    tokio::select! {
                        _ = interval.tick() => {}
                        changed = states.changed() => {
                            if changed.is_err() {
                                break;
                            }
                        }
                    }
                } else if states.changed().await.is_err() {
                    break;
                }
            }
        });

        Self { handle, display }
    }

    /// The most recently published display string.
    pub fn display(&self) -> String {
        self.display.borrow().clone()
    }

    /// Receiver notified whenever the display string changes.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.display.clone()
    }

    /// True once the task has ended, e.g. after the state sender went away.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TimerTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
