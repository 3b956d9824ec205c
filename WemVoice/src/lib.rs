//! # WemVoice
//!
//! Replace Wwise voice lines with voice assets taken from another release of
//! the same game.
//!
//! The game's audio is described by `.txtp` descriptors, each naming a numeric
//! `.wem` id and a codec. Replacement voice assets live in a folder tree that
//! mirrors their archive paths (`Oblivion.esm/Voice/…/line.mp3`). `WemVoice`
//! derives a canonical key for both sides, matches them with a deterministic
//! fallback chain (exact key, literal rewrites, race aliases), and copies every
//! matched asset to `<output>/<id>.wem`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use wemvoice::prelude::*;
//!
//! let options = PipelineOptions::new("txtp/", "voices/", "out/");
//! let report = run(&options, &CancelToken::new(), |_progress| {})?;
//! let summary = report.summary();
//! println!("found {} / missing {}", summary.found, summary.missing);
//! # Ok::<(), wemvoice::Error>(())
//! ```
//!
//! ## Matching a single key
//!
//! ```
//! use wemvoice::prelude::*;
//!
//! let mut index = VoiceIndex::new();
//! index.insert(VoiceRecord::from_path("voices/Oblivion.esm/NPC/Guard_1.mp3"));
//!
//! let matcher = FallbackMatcher::new(SubstitutionConfig::default());
//! let result = matcher.match_key(DescriptorId(0), "Play_NPC_Guard_1", &index);
//! assert!(result.found());
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `wemvoice` command-line binary

pub mod config;
pub mod error;
pub mod formats;
pub mod matching;
pub mod pipeline;
pub mod replace;
pub mod report;
pub mod scan;
pub mod voice;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::WemVoiceConfig;
    pub use crate::error::{Error, Result};
    pub use crate::formats::txtp::{DescriptorId, DescriptorRecord, parse_txtp_file, parse_txtp_str};
    pub use crate::matching::{
        FallbackMatcher, MatchResult, MatchRule, Rewrite, SubstitutionConfig,
    };
    pub use crate::pipeline::{
        PipelineOptions, RunPhase, RunProgress, RunReport, RunSummary, run,
    };
    pub use crate::replace::{ReplacementOutcome, SkipReason};
    pub use crate::scan::{CancelToken, FolderScanner};
    pub use crate::voice::{
        VoiceId, VoiceIndex, VoiceLookup, VoiceRecord, descriptor_key, normalize_voice_path,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
