//! Copy matched voice assets into place
//!
//! A found match copies the voice asset to `<output>/<id>.wem`, replacing any
//! file already there. Failures are returned as an outcome, not an error, so
//! one bad file never stops the rest of the batch.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::formats::txtp::DescriptorRecord;
use crate::matching::MatchResult;
use crate::voice::VoiceIndex;

/// Why a match was not copied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The descriptor has no usable `.wem` id
    MissingId,
    /// The run was cancelled before this item was dispatched
    Cancelled,
}

/// Result of applying one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReplacementOutcome {
    /// The voice asset was copied
    Copied { destination: PathBuf, bytes: u64 },
    /// No voice asset matched the descriptor
    Missing,
    /// Matched but not copied
    Skipped { reason: SkipReason },
    /// The copy failed
    Failed { destination: PathBuf, error: String },
}

impl ReplacementOutcome {
    #[must_use]
    pub fn is_copied(&self) -> bool {
        matches!(self, Self::Copied { .. })
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Destination of a descriptor's replacement file
#[must_use]
pub fn destination_path(output_root: &Path, id: u32) -> PathBuf {
    output_root.join(format!("{id}.wem"))
}

/// Copy the voice asset of `result` to `<output_root>/<id>.wem`
pub fn apply(
    result: &MatchResult,
    descriptors: &[DescriptorRecord],
    index: &VoiceIndex,
    output_root: &Path,
) -> ReplacementOutcome {
    let Some(voice) = result.voice().and_then(|id| index.record(id)) else {
        return ReplacementOutcome::Missing;
    };
    let Some(descriptor) = descriptors.get(result.descriptor.0) else {
        return ReplacementOutcome::Missing;
    };

    if descriptor.id == 0 {
        tracing::warn!(
            "Not copying {} for {}: descriptor has no wem id",
            voice.source_path.display(),
            descriptor.source_path.display()
        );
        return ReplacementOutcome::Skipped {
            reason: SkipReason::MissingId,
        };
    }

    let destination = destination_path(output_root, descriptor.id);
    match std::fs::copy(&voice.source_path, &destination) {
        Ok(bytes) => {
            tracing::debug!("Copied {} -> {}", voice.source_path.display(), destination.display());
            ReplacementOutcome::Copied { destination, bytes }
        }
        Err(e) => {
            tracing::warn!(
                "Failed to copy {} -> {}: {}",
                voice.source_path.display(),
                destination.display(),
                e
            );
            ReplacementOutcome::Failed {
                destination,
                error: e.to_string(),
            }
        }
    }
}
