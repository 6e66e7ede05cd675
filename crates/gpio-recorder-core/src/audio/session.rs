use crate::{AudioError, CaptureFormat, CoreResult};

use std::{
    fs::OpenOptions,
    io::{BufWriter, Seek, Write},
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use error_location::ErrorLocation;
use hound::WavWriter;
use tracing::{debug, error, info, instrument};

/// Seekable byte storage an artifact is written to.
///
/// Implemented for every `Write + Seek + Send` type; files are wrapped in a
/// `BufWriter`.
pub trait ArtifactSink: Write + Seek + Send {}

impl<T: Write + Seek + Send> ArtifactSink for T {}

type SinkWavWriter = WavWriter<Box<dyn ArtifactSink>>;

/// Final statistics of a closed recording session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Path of the finalized artifact.
    pub path: PathBuf,
    /// Raw sample bytes written (excludes the header).
    pub bytes_written: u64,
    /// Frames written.
    pub frames_written: u64,
    /// Audio duration represented by the written frames.
    pub duration: Duration,
}

/// Owns one open WAV artifact for the lifetime of a recording session.
///
/// All methods take `&self` so the writer can be shared through an `Arc`
/// between the coordinator (which creates and closes it) and the audio
/// callback (which appends to it).
pub struct SessionWriter {
    path: PathBuf,
    format: CaptureFormat,
    /// `None` once the session has been closed.
    writer: Mutex<Option<SinkWavWriter>>,
    bytes_written: AtomicU64,
}

impl SessionWriter {
    /// Create a new artifact at `path`.
    ///
    /// Refuses to overwrite an existing file.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::ArtifactCreateFailed`] if the file cannot be
    /// created or the header cannot be written.
    #[track_caller]
    #[instrument(skip(path), fields(path = ?path.as_ref()))]
    pub fn create<P: AsRef<Path>>(path: P, format: CaptureFormat) -> CoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let location = Location::caller();

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| AudioError::ArtifactCreateFailed {
                path: path.clone(),
                source: hound::Error::from(e),
                location: ErrorLocation::from(location),
            })?;

        let session = Self::from_sink(&path, format, BufWriter::new(file))?;

        info!(path = ?path, "Artifact created");

        Ok(session)
    }

    /// Start an artifact in `sink`, recorded under `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::ArtifactCreateFailed`] if the header cannot be
    /// written.
    #[track_caller]
    pub fn from_sink<P, S>(path: P, format: CaptureFormat, sink: S) -> CoreResult<Self>
    where
        P: AsRef<Path>,
        S: ArtifactSink + 'static,
    {
        let path = path.as_ref().to_path_buf();
        let location = Location::caller();
        let sink: Box<dyn ArtifactSink> = Box::new(sink);

        let writer = WavWriter::new(sink, format.wav_spec()).map_err(|source| {
            AudioError::ArtifactCreateFailed {
                path: path.clone(),
                source,
                location: ErrorLocation::from(location),
            }
        })?;

        Ok(Self {
            path,
            format,
            writer: Mutex::new(Some(writer)),
            bytes_written: AtomicU64::new(0),
        })
    }

    /// Append one buffer of samples in arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::SessionClosed`] after [`close`](Self::close), or
    /// [`AudioError::WriteFailed`] on storage failure.
    #[track_caller]
    pub fn append(&self, samples: &[i16]) -> CoreResult<()> {
        let mut guard = self.writer.lock().unwrap_or_else(|e| {
            error!("Session writer lock poisoned, recovering: {}", e);
            e.into_inner()
        });

        let Some(writer) = guard.as_mut() else {
            return Err(AudioError::SessionClosed {
                path: self.path.clone(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        // Samples written before a failure stay counted; they are in the file.
        let mut appended = 0u64;
        let result = samples.iter().try_for_each(|&sample| -> hound::Result<()> {
            writer.write_sample(sample)?;
            appended += 1;
            Ok(())
        });

        let sample_bytes = u64::from(CaptureFormat::BITS_PER_SAMPLE / 8);
        self.bytes_written
            .fetch_add(appended * sample_bytes, Ordering::AcqRel);

        result.map_err(|source| AudioError::WriteFailed {
            path: self.path.clone(),
            source,
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Finalize the header length fields and release the file.
    ///
    /// Returns the session summary on the first call and `None` on any later
    /// call.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::WriteFailed`] if the header cannot be finalized.
    #[track_caller]
    #[instrument(skip(self), fields(path = ?self.path))]
    pub fn close(&self) -> CoreResult<Option<SessionSummary>> {
        let writer = self
            .writer
            .lock()
            .unwrap_or_else(|e| {
                error!("Session writer lock poisoned, recovering: {}", e);
                e.into_inner()
            })
            .take();

        let Some(writer) = writer else {
            debug!("Session already closed");
            return Ok(None);
        };

        writer
            .finalize()
            .map_err(|source| AudioError::WriteFailed {
                path: self.path.clone(),
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;

        let summary = SessionSummary {
            path: self.path.clone(),
            bytes_written: self.bytes_written(),
            frames_written: self.frames_written(),
            duration: self.duration(),
        };

        info!(
            path = ?summary.path,
            bytes = summary.bytes_written,
            frames = summary.frames_written,
            duration_ms = summary.duration.as_millis(),
            "Artifact finalized"
        );

        Ok(Some(summary))
    }

    /// Path of the artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sample bytes appended so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Acquire)
    }

    /// Frames appended so far.
    pub fn frames_written(&self) -> u64 {
        self.bytes_written() / u64::from(self.format.bytes_per_frame())
    }

    /// Audio duration appended so far.
    pub fn duration(&self) -> Duration {
        self.format.duration_of_frames(self.frames_written())
    }

    /// Whether [`close`](Self::close) has already released the file.
    pub fn is_closed(&self) -> bool {
        self.writer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }
}

impl std::fmt::Debug for SessionWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionWriter")
            .field("path", &self.path)
            .field("bytes_written", &self.bytes_written())
            .finish_non_exhaustive()
    }
}
