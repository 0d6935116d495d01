use std::time::{Duration, Instant};

/// Quiet period before a burst of edits triggers a reflow
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1500);

/// A single cancellable scheduled task with last-write-wins semantics.
///
/// Each [`schedule`](Debouncer::schedule) replaces the pending payload and
/// restarts the quiet period; [`poll`](Debouncer::poll) hands the payload
/// out once the period has elapsed without a newer schedule. The caller owns
/// the clock, which keeps this usable from any event loop and trivially
/// testable.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet_period: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    payload: T,
    deadline: Instant,
    /// Schedules merged into this payload, including the first
    coalesced: usize,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl<T> Debouncer<T> {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Schedule `payload`, replacing and returning any pending one
    pub fn schedule(&mut self, payload: T, now: Instant) -> Option<T> {
        let deadline = now + self.quiet_period;
        match self.pending.take() {
            Some(previous) => {
                self.pending = Some(Pending {
                    payload,
                    deadline,
                    coalesced: previous.coalesced + 1,
                });
                Some(previous.payload)
            }
            None => {
                self.pending = Some(Pending {
                    payload,
                    deadline,
                    coalesced: 1,
                });
                None
            }
        }
    }

    /// Take the pending payload if its quiet period has elapsed by `now`
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.deadline <= now);
        if due { self.flush() } else { None }
    }

    /// Take the pending payload immediately, ignoring the deadline
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|pending| {
            if pending.coalesced > 1 {
                log::debug!("Coalesced {} triggers into one", pending.coalesced);
            }
            pending.payload
        })
    }

    /// Drop the pending payload without running it
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    /// Number of schedules merged into the pending payload
    pub fn coalesced(&self) -> usize {
        self.pending.as_ref().map_or(0, |pending| pending.coalesced)
    }
}
