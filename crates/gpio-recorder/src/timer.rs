//! Single countdown that shuts the recorder down after inactivity.
//!
//! The timer is a deadline owned by the coordinator and awaited inside its
//! event loop, so no process-wide signal handler is involved.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

/// Which countdown budget the timer was armed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// Between process launch and the first activation.
    Startup,
    /// After a recording ends.
    Idle,
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    budget: Budget,
    /// `None` when the budget reaches past the clock's range: never expires.
    deadline: Option<Instant>,
}

/// Arm/disarm countdown with two budgets.
#[derive(Debug)]
pub struct Timer {
    startup: Duration,
    idle: Duration,
    armed: Option<Armed>,
}

impl Timer {
    /// Create a disarmed timer with the given budgets.
    pub fn new(startup: Duration, idle: Duration) -> Self {
        Self {
            startup,
            idle,
            armed: None,
        }
    }

    /// Start (or restart) the countdown from zero.
    pub fn arm(&mut self, budget: Budget) {
        let length = self.length_of(budget);
        let deadline = Instant::now().checked_add(length);
        if deadline.is_none() {
            warn!(
                budget = ?budget,
                secs = length.as_secs(),
                "Budget out of clock range, timer will not expire"
            );
        }
        self.armed = Some(Armed { budget, deadline });
        debug!(budget = ?budget, secs = length.as_secs(), "Timer armed");
    }

    /// Cancel any running countdown.
    pub fn disarm(&mut self) {
        if let Some(remaining) = self.remaining() {
            debug!(budget = ?self.armed(), remaining_secs = remaining.as_secs(), "Timer disarmed");
        }
        self.armed = None;
    }

    /// Budget of the running countdown, if any.
    pub fn armed(&self) -> Option<Budget> {
        self.armed.map(|a| a.budget)
    }

    /// Time left on the running countdown, if any.
    ///
    /// [`Duration::MAX`] for a countdown that never expires.
    pub fn remaining(&self) -> Option<Duration> {
        self.armed.map(|a| match a.deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => Duration::MAX,
        })
    }

    /// Configured length of `budget`.
    pub fn length_of(&self, budget: Budget) -> Duration {
        match budget {
            Budget::Startup => self.startup,
            Budget::Idle => self.idle,
        }
    }

    /// Resolves with the armed budget once the deadline passes.
    ///
    /// Never resolves while disarmed or armed past the clock's range. The
    /// caller disarms after observing expiry so it is delivered once.
    pub async fn expired(&self) -> Budget {
        match self.armed {
            Some(Armed {
                budget,
                deadline: Some(deadline),
            }) => {
                sleep_until(deadline).await;
                budget
            }
            _ => std::future::pending().await,
        }
    }
}
