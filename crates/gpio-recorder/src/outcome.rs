use crate::{AppError, Budget};

/// Exit status after an orderly shutdown (timeout or interrupt).
pub(crate) const EXIT_OK: i32 = 0;
/// Exit status after an unrecoverable error while running.
pub(crate) const EXIT_FATAL: i32 = 1;
/// Exit status when configuration or hardware setup fails.
pub(crate) const EXIT_STARTUP: i32 = 2;

/// Why the coordinator loop ended.
#[derive(Debug)]
pub enum Outcome {
    /// The inactivity timer expired.
    TimedOut(Budget),
    /// SIGINT or SIGTERM was received.
    Interrupted,
    /// An unrecoverable error occurred.
    Fatal(AppError),
}

impl Outcome {
    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::TimedOut(_) | Outcome::Interrupted => EXIT_OK,
            Outcome::Fatal(_) => EXIT_FATAL,
        }
    }
}
