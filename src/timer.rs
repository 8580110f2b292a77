//! Elapsed-time display for the puzzle clock.
//!
//! The display is a pure function of the two optional timestamps and the
//! current instant; callers sample the clock and re-render on their own cadence.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// Source of wall-clock instants.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = instant;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Format a duration in milliseconds as `M:SS`, or `H:MM:SS` from one hour up.
///
/// Rounds half up to whole seconds. Negative durations read as zero.
pub fn format_elapsed(millis: i64) -> String {
    let total = (millis.max(0) + 500) / 1000;
    let s = total % 60;
    let m = (total / 60) % 60;
    let h = total / 3600;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Display string for the puzzle clock: empty until started, live until
/// stopped, frozen afterwards.
pub fn elapsed_display(
    start: Option<DateTime<Utc>>,
    stop: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    match start {
        None => String::new(),
        Some(start) => {
            let end = stop.unwrap_or(now);
            format_elapsed((end - start).num_milliseconds())
        }
    }
}
