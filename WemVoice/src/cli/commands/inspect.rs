//! CLI commands for inspecting descriptors, voice keys and voice folders

use std::path::{Path, PathBuf};

use crate::config::WemVoiceConfig;
use crate::formats::txtp::parse_txtp_file;
use crate::pipeline::{RunProgress, build_voice_index};
use crate::scan::{CancelToken, FolderScanner};
use crate::voice::{descriptor_key, normalize_voice_path};

/// Print id, codec and lookup key of each descriptor
pub fn parse(files: &[PathBuf], config: Option<&Path>) -> anyhow::Result<()> {
    let config = WemVoiceConfig::load_or_default(config)?;
    let rewrites = &config.substitutions.descriptor_name_rewrites;

    for file in files {
        let record = parse_txtp_file(file);
        let id = if record.id == 0 {
            "-".to_string()
        } else {
            record.id.to_string()
        };
        let codec = if record.codec.is_empty() { "-" } else { record.codec.as_str() };

        println!("{}", file.display());
        println!("  Id:    {id}");
        println!("  Codec: {codec}");
        println!("  Key:   {}", descriptor_key(file, rewrites));
    }

    Ok(())
}

/// Print the canonical key of each voice path
pub fn normalize(paths: &[PathBuf]) -> anyhow::Result<()> {
    for path in paths {
        println!("{}\t{}", normalize_voice_path(path), path.display());
    }
    Ok(())
}

/// Index a voice folder and list its keys
pub fn index(voices: &Path, count_only: bool) -> anyhow::Result<()> {
    let paths = FolderScanner::voices(voices).scan(&CancelToken::new())?;
    let index = build_voice_index(&paths, &CancelToken::new(), &|_: &RunProgress| {});

    if !count_only {
        for (_, record) in index.iter() {
            let relative = record
                .source_path
                .strip_prefix(voices)
                .unwrap_or(record.source_path.as_path());
            println!("{}\t{}", record.canonical_key, relative.display());
        }
        println!();
    }

    println!("Voice files: {}", index.len());
    println!("Distinct keys: {}", index.key_count());

    if !index.collisions().is_empty() {
        println!();
        println!("Collisions ({}):", index.collisions().len());
        for collision in index.collisions() {
            let kept = index.record(collision.kept).map(|r| r.source_path.display().to_string());
            let replaced = index
                .record(collision.replaced)
                .map(|r| r.source_path.display().to_string());
            println!(
                "  {}: {} replaces {}",
                collision.key,
                kept.unwrap_or_default(),
                replaced.unwrap_or_default()
            );
        }
    }

    Ok(())
}
