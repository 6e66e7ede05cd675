use crate::{AudioError, CaptureFormat, SessionWriter, tests::sinks::LimitedSink};

use std::fs;

/// WHAT: N appended buffers decode back to the same N*S samples
/// WHY: The artifact must contain exactly the captured audio in order
#[test]
#[allow(clippy::unwrap_used)]
fn given_appended_buffers_when_closed_then_artifact_decodes_identically() {
    // Given: A session writer in a scratch directory
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("take.wav");
    let writer = SessionWriter::create(&path, CaptureFormat::default()).unwrap();

    // When: Appending 12 buffers of 1024 distinct samples and closing
    let buffers: Vec<Vec<i16>> = (0..12i16)
        .map(|n| (0..1024i16).map(|i| i.wrapping_mul(31).wrapping_add(n * 7)).collect())
        .collect();
    for buffer in &buffers {
        writer.append(buffer).unwrap();
    }
    let summary = writer.close().unwrap().unwrap();

    // Then: Header matches the format and the content round-trips
    let mut reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_rate, 16_000);

    let expected: Vec<i16> = buffers.concat();
    assert_eq!(reader.len() as usize, expected.len());
    let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(decoded, expected);

    assert_eq!(summary.bytes_written, 12 * 1024 * 2);
    assert_eq!(summary.frames_written, 12 * 1024);
    assert_eq!(summary.path, path);
}

/// WHAT: Header length covers every appended byte
/// WHY: Players rely on the data chunk size written at close
#[test]
#[allow(clippy::unwrap_used)]
fn given_closed_session_when_reading_file_size_then_header_plus_data() {
    // Given: A session with 3000 appended samples
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("size.wav");
    let writer = SessionWriter::create(&path, CaptureFormat::default()).unwrap();
    writer.append(&[1i16; 3000]).unwrap();

    // When: Closing the session
    writer.close().unwrap();

    // Then: The file is a 44-byte canonical header plus 6000 data bytes
    assert_eq!(fs::metadata(&path).unwrap().len(), 44 + 6000);
}

/// WHAT: Creating in a missing directory fails with ArtifactCreateFailed
/// WHY: The coordinator must be able to stay Idle on storage failure
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_directory_when_creating_then_artifact_create_failed() {
    // Given: A path under a directory that does not exist
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("take.wav");

    // When: Creating a session writer
    let result = SessionWriter::create(&path, CaptureFormat::default());

    // Then: Creation fails and nothing is written
    assert!(matches!(
        result,
        Err(AudioError::ArtifactCreateFailed { .. })
    ));
    assert!(!path.exists());
}

/// WHAT: An existing artifact is never overwritten
/// WHY: A new session must not destroy a previous recording
#[test]
#[allow(clippy::unwrap_used)]
fn given_existing_file_when_creating_then_refused_and_file_untouched() {
    // Given: A file already at the target path
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("take.wav");
    fs::write(&path, b"previous").unwrap();

    // When: Creating a session writer at the same path
    let result = SessionWriter::create(&path, CaptureFormat::default());

    // Then: Creation fails and the previous content survives
    assert!(matches!(
        result,
        Err(AudioError::ArtifactCreateFailed { .. })
    ));
    assert_eq!(fs::read(&path).unwrap(), b"previous");
}

/// WHAT: Appending after close is rejected
/// WHY: A finalized artifact must not be extended behind its header
#[test]
#[allow(clippy::unwrap_used)]
fn given_closed_session_when_appending_then_session_closed_error() {
    // Given: A closed session
    let dir = tempfile::tempdir().unwrap();
    let writer =
        SessionWriter::create(dir.path().join("closed.wav"), CaptureFormat::default()).unwrap();
    writer.append(&[0i16; 16]).unwrap();
    writer.close().unwrap();

    // When: Appending another buffer
    let result = writer.append(&[0i16; 16]);

    // Then: The append fails and the counter is unchanged
    assert!(matches!(result, Err(AudioError::SessionClosed { .. })));
    assert_eq!(writer.bytes_written(), 32);
    assert!(writer.is_closed());
}

/// WHAT: A second close is a harmless no-op
/// WHY: Shutdown paths may race a normal stop
#[test]
#[allow(clippy::unwrap_used)]
fn given_closed_session_when_closing_again_then_returns_none() {
    // Given: A session closed once
    let dir = tempfile::tempdir().unwrap();
    let writer =
        SessionWriter::create(dir.path().join("twice.wav"), CaptureFormat::default()).unwrap();
    assert!(writer.close().unwrap().is_some());

    // When: Closing again
    let second = writer.close().unwrap();

    // Then: No summary is produced
    assert!(second.is_none());
}

/// WHAT: Storage running out mid-buffer keeps the count of samples written
/// WHY: The byte counter must agree with what reached storage
#[test]
#[allow(clippy::unwrap_used)]
fn given_storage_full_mid_buffer_when_appending_then_partial_bytes_counted() {
    // Given: Storage with room for the header plus 100 sample bytes
    let sink = LimitedSink::new(44 + 100);
    let writer = SessionWriter::from_sink("full.wav", CaptureFormat::default(), sink).unwrap();

    // When: Appending a full 1024-sample buffer
    let result = writer.append(&[5i16; 1024]);

    // Then: WriteFailed, with the 50 samples that fit counted
    assert!(matches!(result, Err(AudioError::WriteFailed { .. })));
    assert_eq!(writer.bytes_written(), 100);
    assert_eq!(writer.frames_written(), 50);
}

/// WHAT: A header that cannot be written fails creation
/// WHY: A session must never start without a valid artifact
#[test]
fn given_storage_without_room_for_header_when_creating_then_artifact_create_failed() {
    // Given: Storage smaller than a WAV header
    let sink = LimitedSink::new(10);

    // When: Starting an artifact in it
    let result = SessionWriter::from_sink("tiny.wav", CaptureFormat::default(), sink);

    // Then: ArtifactCreateFailed
    assert!(matches!(
        result,
        Err(AudioError::ArtifactCreateFailed { .. })
    ));
}
