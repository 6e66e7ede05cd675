//! Naming of per-session output files.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

const TIMESTAMP_FORMAT: &str = "%Y_%m_%d-%H.%M.%S-UTC";
const EXTENSION: &str = "wav";

/// File stem for a session started at `at`, e.g. `2024_03_01-14.05.09-UTC`.
pub fn artifact_stem(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// First free artifact path in `dir` for a session started at `at`.
///
/// Two sessions within one second get `-2`, `-3`, ... appended.
pub fn next_artifact_path(dir: &Path, at: DateTime<Utc>) -> PathBuf {
    let stem = artifact_stem(at);
    let first = dir.join(format!("{stem}.{EXTENSION}"));
    if !first.exists() {
        return first;
    }

    (2u32..)
        .map(|n| dir.join(format!("{stem}-{n}.{EXTENSION}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}
