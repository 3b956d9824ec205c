//! Canonical lookup keys
//!
//! Voice assets and descriptors name the same line differently. A voice asset
//! path such as
//!
//! ```text
//! /data/voices/Oblivion.esm/Imperial/M/Greeting 01.mp3
//! ```
//!
//! becomes the key `Play_Imperial_M_Greeting_01`, which is how the Wwise
//! descriptor for that line is named (`Play_Imperial_M_Greeting_01.txtp`).

use std::path::Path;

use crate::matching::{Rewrite, apply_rewrites};

/// Markers separating the archive name from the in-archive path
pub const CONTAINER_MARKERS: &[&str] = &[".esp/", ".esm/"];

/// Prefix shared by every canonical key
pub const KEY_PREFIX: &str = "Play_";

/// Derive the canonical key of a voice asset from its path.
///
/// Everything up to and including the first container marker is dropped,
/// separators and spaces become `_`, the key is prefixed with `Play_` and the
/// file extension is removed. Paths without a marker are used whole.
///
/// This is not idempotent for strings that still contain a marker.
pub fn normalize_voice_path<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    let full = path.to_string_lossy().replace('\\', "/");

    let relative = CONTAINER_MARKERS
        .iter()
        .filter_map(|marker| full.find(marker).map(|pos| pos + marker.len()))
        .min()
        .map_or(full.as_str(), |start| &full[start..]);

    let key = format!("{KEY_PREFIX}{}", relative.replace(['/', ' '], "_"));

    match path.extension() {
        Some(ext) => {
            let suffix = format!(".{}", ext.to_string_lossy());
            key.strip_suffix(&suffix).map_or_else(|| key.clone(), str::to_string)
        }
        None => key,
    }
}

/// Derive the lookup key of a descriptor from its file name.
///
/// `rewrites` are applied to the file name first (the default turns the
/// `v.txtp` variant into a plain `.txtp`), then the name is cut at its first
/// dot.
pub fn descriptor_key<P: AsRef<Path>>(path: P, rewrites: &[Rewrite]) -> String {
    let name = path
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = apply_rewrites(&name, rewrites);

    match name.find('.') {
        Some(dot) => name[..dot].to_string(),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_esm_path() {
        assert_eq!(
            normalize_voice_path("/data/voices/Oblivion.esm/Imperial/M/Greeting 01.mp3"),
            "Play_Imperial_M_Greeting_01"
        );
    }

    #[test]
    fn test_normalize_esp_path() {
        assert_eq!(
            normalize_voice_path("/mods/DLCShiveringIsles.esp/Dremora/F/Hello.wem"),
            "Play_Dremora_F_Hello"
        );
    }

    #[test]
    fn test_normalize_without_marker_uses_whole_path() {
        assert_eq!(normalize_voice_path("voices/NPC/Guard_1.mp3"), "Play_voices_NPC_Guard_1");
    }

    #[test]
    fn test_normalize_first_marker_wins() {
        // The .esm/ marker comes first, so the later .esp/ survives as text.
        assert_eq!(
            normalize_voice_path("root/Oblivion.esm/Patch.esp/Line.mp3"),
            "Play_Patch.esp_Line"
        );
        assert_eq!(
            normalize_voice_path("root/Patch.esp/Oblivion.esm/Line.mp3"),
            "Play_Oblivion.esm_Line"
        );
    }

    #[test]
    fn test_normalize_backslash_separators() {
        assert_eq!(
            normalize_voice_path("C:\\voices\\Oblivion.esm\\NPC\\Guard_1.mp3"),
            "Play_NPC_Guard_1"
        );
    }

    #[test]
    fn test_normalize_strips_only_final_extension() {
        assert_eq!(
            normalize_voice_path("v/Oblivion.esm/NPC/line.mp3.mp3"),
            "Play_NPC_line.mp3"
        );
        assert_eq!(normalize_voice_path("v/Oblivion.esm/NPC/line"), "Play_NPC_line");
    }

    #[test]
    fn test_normalize_is_not_idempotent() {
        let once = normalize_voice_path("a/Oblivion.esm/NPC/Guard_1.mp3");
        assert_eq!(once, "Play_NPC_Guard_1");
        assert_eq!(normalize_voice_path(&once), "Play_Play_NPC_Guard_1");

        // Re-running on a string that still holds a marker strips further.
        let partial = "Mod.esp/line";
        assert_eq!(normalize_voice_path("Oblivion.esm/Mod.esp/line"), "Play_Mod.esp_line");
        assert_eq!(normalize_voice_path(partial), "Play_line");
    }

    #[test]
    fn test_descriptor_key_plain() {
        assert_eq!(
            descriptor_key("/txtp/Play_NPC_Guard_1.txtp", &[]),
            "Play_NPC_Guard_1"
        );
    }

    #[test]
    fn test_descriptor_key_cuts_at_first_dot() {
        assert_eq!(descriptor_key("/txtp/Play_A.B.txtp", &[]), "Play_A");
    }

    #[test]
    fn test_descriptor_key_variant_rewrite() {
        let rewrites = [Rewrite::new("v.txtp", ".txtp")];
        assert_eq!(
            descriptor_key("/txtp/Play_NPC_Guard_1v.txtp", &rewrites),
            "Play_NPC_Guard_1"
        );
        // Rewrites apply to the file name only, not to folder names.
        assert_eq!(
            descriptor_key("/dev.txtp/Play_Line.txtp", &rewrites),
            "Play_Line"
        );
    }
}
