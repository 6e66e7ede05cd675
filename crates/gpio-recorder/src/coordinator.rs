//! Recorder state machine.
//!
//! The coordinator owns the recorder state, the inactivity timer and the
//! active session. It reconciles button activations, capture faults, timer
//! expiry and external interrupts in one loop, so transitions never
//! interleave.

use crate::{
    ActivationMailbox, AppError, AppResult, Budget, Indicator, IndicatorState, Outcome,
    RecorderState, Timer, artifact::next_artifact_path,
};

use gpio_recorder_core::{AudioError, CaptureChannel, CaptureFormat, CoreResult, SessionWriter};

use std::{
    future::Future,
    panic::Location,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::Utc;
use error_location::ErrorLocation;
use tokio::{sync::mpsc, time::Instant};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Opens the artifact for a new session at the given path.
pub type OpenArtifact = Box<dyn Fn(&Path, CaptureFormat) -> CoreResult<SessionWriter>>;

/// Opens artifacts as new WAV files on disk.
pub fn wav_file_artifacts() -> OpenArtifact {
    Box::new(|path: &Path, format: CaptureFormat| SessionWriter::create(path, format))
}

/// Everything the coordinator takes ownership of.
pub struct CoordinatorParts<C, I> {
    /// Audio capture channel, started and stopped per session.
    pub capture: C,
    /// Status output mirroring the recorder state.
    pub indicator: I,
    /// Activations posted by the button.
    pub mailbox: Arc<ActivationMailbox>,
    /// Write failures reported from the audio context.
    pub faults: mpsc::UnboundedReceiver<AudioError>,
    /// Inactivity timer (disarmed; armed by [`Coordinator::begin`]).
    pub timer: Timer,
    /// Directory receiving session artifacts.
    pub output_dir: PathBuf,
    /// How each session's artifact is opened.
    pub open_artifact: OpenArtifact,
    /// Format written into artifact headers.
    pub format: CaptureFormat,
}

/// The open session while recording.
struct ActiveSession {
    session_id: Uuid,
    started_at: Instant,
    writer: Arc<SessionWriter>,
}

/// Single owner of the recorder state and every transition.
pub struct Coordinator<C, I> {
    capture: C,
    indicator: I,
    mailbox: Arc<ActivationMailbox>,
    faults: mpsc::UnboundedReceiver<AudioError>,
    timer: Timer,
    output_dir: PathBuf,
    open_artifact: OpenArtifact,
    format: CaptureFormat,
    /// Present exactly while recording; the state is derived from it.
    session: Option<ActiveSession>,
}

impl<C: CaptureChannel, I: Indicator> Coordinator<C, I> {
    /// Assemble an idle coordinator.
    pub fn new(parts: CoordinatorParts<C, I>) -> Self {
        Self {
            capture: parts.capture,
            indicator: parts.indicator,
            mailbox: parts.mailbox,
            faults: parts.faults,
            timer: parts.timer,
            output_dir: parts.output_dir,
            open_artifact: parts.open_artifact,
            format: parts.format,
            session: None,
        }
    }

    /// Current recorder state.
    pub fn state(&self) -> RecorderState {
        match &self.session {
            None => RecorderState::Idle,
            Some(session) => RecorderState::Recording {
                started_at: session.started_at,
                session_id: session.session_id,
            },
        }
    }

    /// The inactivity timer.
    #[cfg(test)]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Enter the initial state: idle, indicator off, startup budget armed.
    pub fn begin(&mut self) {
        self.sync_indicator();
        self.timer.arm(Budget::Startup);
    }

    /// Run until timeout, interrupt or a fatal error, then shut down.
    ///
    /// The open session (if any) is closed and the indicator turned off
    /// before this returns.
    #[instrument(skip(self, interrupt))]
    pub async fn run<F>(&mut self, interrupt: F) -> Outcome
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(interrupt);
        self.begin();

        info!(
            output_dir = ?self.output_dir,
            startup_secs = self.timer.length_of(Budget::Startup).as_secs(),
            "Recorder ready"
        );

        let outcome = loop {
            tokio::select! {
                biased;

                Some(fault) = self.faults.recv() => {
                    error!(error = %fault, "Capture fault");
                    break Outcome::Fatal(AppError::SessionWrite {
                        source: fault,
                        location: ErrorLocation::from(Location::caller()),
                    });
                }

                () = self.mailbox.wait() => {
                    if !self.mailbox.take() {
                        continue;
                    }
                    match self.handle_activation() {
                        Ok(()) => {}
                        Err(e) if e.is_recoverable() => {
                            error!(error = %e, "Activation aborted, staying idle");
                        }
                        Err(e) => break Outcome::Fatal(e),
                    }
                }

                budget = self.timer.expired() => {
                    self.timer.disarm();
                    if self.session.is_some() {
                        break Outcome::Fatal(AppError::TimerViolation {
                            budget,
                            location: ErrorLocation::from(Location::caller()),
                        });
                    }
                    info!(budget = ?budget, "Timeout expired");
                    break Outcome::TimedOut(budget);
                }

                () = &mut interrupt => {
                    info!("Interrupt received");
                    break Outcome::Interrupted;
                }
            }
        };

        self.shutdown();

        match &outcome {
            Outcome::Fatal(e) => error!(error = %e, "Recorder stopped on fatal error"),
            other => info!(outcome = ?other, "Recorder stopped"),
        }

        outcome
    }

    /// Perform the one transition the current state allows.
    ///
    /// # Errors
    ///
    /// [`AppError::ArtifactCreate`] leaves the recorder idle and untouched;
    /// any other error is fatal.
    #[instrument(skip(self))]
    pub fn handle_activation(&mut self) -> AppResult<()> {
        if self.state().is_recording() {
            self.stop_recording()
        } else {
            self.start_recording()
        }
    }

    #[track_caller]
    fn start_recording(&mut self) -> AppResult<()> {
        let location = Location::caller();
        let path = next_artifact_path(&self.output_dir, Utc::now());

        // Nothing has changed yet if this fails.
        let writer = (self.open_artifact)(&path, self.format).map_err(|source| {
            AppError::ArtifactCreate {
                source,
                location: ErrorLocation::from(location),
            }
        })?;
        let writer = Arc::new(writer);

        if let Err(source) = self.capture.start(Arc::clone(&writer)) {
            if let Err(e) = writer.close() {
                warn!(error = %e, "Failed to close artifact after capture start failure");
            }
            return Err(AppError::Audio {
                source,
                location: ErrorLocation::from(location),
            });
        }

        let session = ActiveSession {
            session_id: Uuid::new_v4(),
            started_at: Instant::now(),
            writer,
        };

        self.timer.disarm();

        info!(
            session_id = %session.session_id,
            path = ?session.writer.path(),
            "Recording started"
        );

        self.session = Some(session);
        self.sync_indicator();

        Ok(())
    }

    #[track_caller]
    fn stop_recording(&mut self) -> AppResult<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };

        // No buffer reaches the writer once this returns.
        self.capture.stop();
        let closed = session.writer.close();

        self.timer.arm(Budget::Idle);
        self.sync_indicator();

        match closed {
            Ok(_) => {
                info!(
                    session_id = %session.session_id,
                    duration_ms = session.started_at.elapsed().as_millis(),
                    frames = session.writer.frames_written(),
                    "Recording stopped"
                );
                Ok(())
            }
            Err(source) => Err(AppError::SessionWrite {
                source,
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Stop any active channel, close any open artifact, turn the indicator
    /// off and disarm the timer.
    #[instrument(skip(self))]
    pub fn shutdown(&mut self) {
        self.timer.disarm();

        if self.mailbox.take() {
            info!("Discarding activation received during shutdown");
        }

        if let Some(session) = self.session.take() {
            self.capture.stop();
            match session.writer.close() {
                Ok(_) => info!(
                    session_id = %session.session_id,
                    frames = session.writer.frames_written(),
                    "Open session closed during shutdown"
                ),
                Err(e) => error!(
                    session_id = %session.session_id,
                    error = %e,
                    "Failed to close open session during shutdown"
                ),
            }
        }

        self.sync_indicator();
    }

    fn sync_indicator(&mut self) {
        let state = IndicatorState::from(self.state());
        self.indicator.show(state);
    }
}
