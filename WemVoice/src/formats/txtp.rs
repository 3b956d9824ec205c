//! TXTP descriptor parser
//!
//! A `.txtp` file is a small text playlist describing one Wwise event. The
//! two facts `WemVoice` needs from it are the numeric id of the referenced
//! `.wem` stream and the codec plugin name:
//!
//! ```text
//! wem/412387021.wem #i
//! # ulPluginID:[Vorbis]
//! ```
//!
//! Parsing is best effort. A descriptor with a missing or malformed marker
//! still produces a record, with `id == 0` and/or an empty `codec`, so that a
//! single odd file never stops a batch.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Marker preceding the codec name
const PLUGIN_MARKER: &str = "ulPluginID:";

/// Extension marking the referenced stream
const WEM_MARKER: &str = ".wem";

/// Stable index of a descriptor within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DescriptorId(pub usize);

/// One parsed `.txtp` descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptorRecord {
    /// Path of the descriptor file
    pub source_path: PathBuf,
    /// Numeric `.wem` id, `0` if it could not be extracted
    pub id: u32,
    /// Codec plugin name, empty if it could not be extracted
    pub codec: String,
}

impl DescriptorRecord {
    /// True when the id or the codec could not be extracted
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.id == 0 || self.codec.is_empty()
    }

    /// File name of the descriptor, for logs
    #[must_use]
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Read and parse a descriptor file.
///
/// Never fails: an unreadable file yields a degraded record.
pub fn parse_txtp_file<P: AsRef<Path>>(path: P) -> DescriptorRecord {
    let path = path.as_ref();
    match std::fs::read(path) {
        Ok(bytes) => parse_txtp_str(path, &String::from_utf8_lossy(&bytes)),
        Err(e) => {
            tracing::warn!("Could not read descriptor {}: {}", path.display(), e);
            DescriptorRecord {
                source_path: path.to_path_buf(),
                id: 0,
                codec: String::new(),
            }
        }
    }
}

/// Parse descriptor text already in memory
pub fn parse_txtp_str<P: AsRef<Path>>(path: P, content: &str) -> DescriptorRecord {
    let record = DescriptorRecord {
        source_path: path.as_ref().to_path_buf(),
        id: extract_wem_id(content).unwrap_or(0),
        codec: extract_codec(content).unwrap_or_default().to_string(),
    };

    if record.is_degraded() {
        tracing::warn!(
            "Degraded descriptor {} (id={}, codec={:?})",
            record.source_path.display(),
            record.id,
            record.codec
        );
    }

    record
}

/// Text between the first `[` after `ulPluginID:` and the next `]`
fn extract_codec(content: &str) -> Option<&str> {
    let after_marker = &content[content.find(PLUGIN_MARKER)? + PLUGIN_MARKER.len()..];
    let after_open = &after_marker[after_marker.find('[')? + 1..];
    let close = after_open.find(']')?;
    Some(&after_open[..close])
}

/// Final path segment before the first `.wem`, as an unsigned integer
fn extract_wem_id(content: &str) -> Option<u32> {
    let before = &content[..content.find(WEM_MARKER)?];
    let segment = before
        .rsplit(|c: char| c == '/' || c == '\\' || c.is_whitespace())
        .next()?;
    segment.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_complete_descriptor() {
        let content = "wem/412387021.wem #i\n#\n# ulPluginID:[Vorbis]\n";
        let record = parse_txtp_str("Play_NPC_Guard_1.txtp", content);

        assert_eq!(record.id, 412_387_021);
        assert_eq!(record.codec, "Vorbis");
        assert!(!record.is_degraded());
    }

    #[test]
    fn test_codec_with_plugin_id_before_bracket() {
        let content = "wem/7.wem\n# ulPluginID: 0x00040001 [Vorbis]\n";
        let record = parse_txtp_str("a.txtp", content);
        assert_eq!(record.codec, "Vorbis");
        assert_eq!(record.id, 7);
    }

    #[test]
    fn test_id_from_nested_path() {
        let content = "ulPluginID:[PCM]\nsound/english(us)/wem/1234.wem\n";
        assert_eq!(parse_txtp_str("a.txtp", content).id, 1234);
    }

    #[test]
    fn test_id_from_windows_separators() {
        let content = "ulPluginID:[PCM]\nwem\\98765.wem\n";
        assert_eq!(parse_txtp_str("a.txtp", content).id, 98765);
    }

    #[test]
    fn test_missing_plugin_marker() {
        let record = parse_txtp_str("a.txtp", "wem/55.wem\n");
        assert_eq!(record.id, 55);
        assert_eq!(record.codec, "");
        assert!(record.is_degraded());
    }

    #[test]
    fn test_missing_wem_reference() {
        let record = parse_txtp_str("a.txtp", "# ulPluginID:[Vorbis]\n");
        assert_eq!(record.id, 0);
        assert_eq!(record.codec, "Vorbis");
    }

    #[test]
    fn test_non_numeric_id() {
        let record = parse_txtp_str("a.txtp", "wem/voice_line.wem ulPluginID:[ADPCM]");
        assert_eq!(record.id, 0);
        assert_eq!(record.codec, "ADPCM");
    }

    #[test]
    fn test_id_overflowing_u32() {
        let record = parse_txtp_str("a.txtp", "wem/99999999999.wem ulPluginID:[PCM]");
        assert_eq!(record.id, 0);
    }

    #[test]
    fn test_unclosed_codec_bracket() {
        let record = parse_txtp_str("a.txtp", "wem/1.wem ulPluginID:[Vorbis");
        assert_eq!(record.codec, "");
    }

    #[test]
    fn test_empty_content() {
        let record = parse_txtp_str("a.txtp", "");
        assert_eq!(record.id, 0);
        assert_eq!(record.codec, "");
    }

    #[test]
    fn test_unreadable_file_is_degraded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txtp");
        let record = parse_txtp_file(&path);
        assert_eq!(record.source_path, path);
        assert!(record.is_degraded());
    }
}
