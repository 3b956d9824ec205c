//! Run orchestration
//!
//! A run is a linear sequence of stages separated by barriers:
//!
//! 1. scan the descriptor folder, parse every `.txtp` in parallel
//! 2. scan the voice folder, normalize every asset path in parallel, then
//!    build the [`VoiceIndex`] on a single thread
//! 3. match every descriptor in parallel against the now read-only index
//! 4. copy every match in parallel
//!
//! Every parallel stage returns its results in input order. All records of a
//! run are owned by the returned [`RunReport`]; nothing outlives it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::formats::txtp::{DescriptorId, DescriptorRecord, parse_txtp_file};
use crate::matching::{FallbackMatcher, MatchResult, SubstitutionConfig};
use crate::replace::{self, ReplacementOutcome, SkipReason};
use crate::scan::{CancelToken, FolderScanner};
use crate::voice::{VoiceIndex, VoiceRecord, descriptor_key};

/// Inputs of a run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Folder holding the `.txtp` descriptors
    pub descriptor_root: PathBuf,
    /// Folder holding the replacement voice assets
    pub voice_root: PathBuf,
    /// Folder receiving `<id>.wem` files
    pub output_root: PathBuf,
    pub substitutions: SubstitutionConfig,
}

impl PipelineOptions {
    pub fn new<D, V, O>(descriptor_root: D, voice_root: V, output_root: O) -> Self
    where
        D: Into<PathBuf>,
        V: Into<PathBuf>,
        O: Into<PathBuf>,
    {
        Self {
            descriptor_root: descriptor_root.into(),
            voice_root: voice_root.into(),
            output_root: output_root.into(),
            substitutions: SubstitutionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_substitutions(mut self, substitutions: SubstitutionConfig) -> Self {
        self.substitutions = substitutions;
        self
    }

    /// Check that all three folders exist
    pub fn validate(&self) -> Result<()> {
        for root in [&self.descriptor_root, &self.voice_root] {
            if !root.is_dir() {
                return Err(Error::InputNotFound { path: root.clone() });
            }
        }
        if !self.output_root.is_dir() {
            return Err(Error::OutputNotFound {
                path: self.output_root.clone(),
            });
        }
        Ok(())
    }
}

/// Stage of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunPhase {
    ScanningDescriptors,
    ParsingDescriptors,
    ScanningVoices,
    IndexingVoices,
    Matching,
    Replacing,
    Complete,
}

impl RunPhase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScanningDescriptors => "Scanning descriptors",
            Self::ParsingDescriptors => "Parsing descriptors",
            Self::ScanningVoices => "Scanning voices",
            Self::IndexingVoices => "Indexing voices",
            Self::Matching => "Matching",
            Self::Replacing => "Replacing",
            Self::Complete => "Complete",
        }
    }
}

/// Progress update sent to the caller's callback
#[derive(Debug, Clone)]
pub struct RunProgress {
    pub phase: RunPhase,
    /// Items finished in this phase (1-indexed while running)
    pub current: usize,
    pub total: usize,
    /// Item just processed, if any
    pub current_file: Option<String>,
}

impl RunProgress {
    #[must_use]
    pub fn new(phase: RunPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: None,
        }
    }

    #[must_use]
    pub fn with_file(phase: RunPhase, current: usize, total: usize, file: impl Into<String>) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: Some(file.into()),
        }
    }

    /// True for the event closing a phase
    #[must_use]
    pub fn is_stage_end(&self) -> bool {
        self.current == self.total && self.current_file.is_none()
    }

    /// Get the progress percentage (0.0 - 1.0)
    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Counts describing a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub descriptors: usize,
    /// Descriptors missing their id or codec
    pub degraded: usize,
    pub voices: usize,
    /// Voice keys that displaced an earlier asset
    pub collisions: usize,
    pub found: usize,
    pub missing: usize,
    pub copied: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Everything a run produced, indexed in descriptor order
#[derive(Debug)]
pub struct RunReport {
    voice_root: PathBuf,
    descriptors: Vec<DescriptorRecord>,
    index: VoiceIndex,
    matches: Vec<MatchResult>,
    outcomes: Vec<ReplacementOutcome>,
}

impl RunReport {
    #[must_use]
    pub fn voice_root(&self) -> &Path {
        &self.voice_root
    }

    #[must_use]
    pub fn descriptors(&self) -> &[DescriptorRecord] {
        &self.descriptors
    }

    #[must_use]
    pub fn index(&self) -> &VoiceIndex {
        &self.index
    }

    #[must_use]
    pub fn matches(&self) -> &[MatchResult] {
        &self.matches
    }

    #[must_use]
    pub fn outcomes(&self) -> &[ReplacementOutcome] {
        &self.outcomes
    }

    /// Descriptor, match and outcome of every item
    pub fn entries(
        &self,
    ) -> impl Iterator<Item = (&DescriptorRecord, &MatchResult, &ReplacementOutcome)> {
        self.matches
            .iter()
            .zip(&self.outcomes)
            .filter_map(|(m, outcome)| {
                self.descriptors
                    .get(m.descriptor.0)
                    .map(|descriptor| (descriptor, m, outcome))
            })
    }

    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            descriptors: self.descriptors.len(),
            degraded: self.descriptors.iter().filter(|d| d.is_degraded()).count(),
            voices: self.index.len(),
            collisions: self.index.collisions().len(),
            ..RunSummary::default()
        };
        for m in &self.matches {
            if m.found() {
                summary.found += 1;
            } else {
                summary.missing += 1;
            }
        }
        for outcome in &self.outcomes {
            match outcome {
                ReplacementOutcome::Copied { .. } => summary.copied += 1,
                ReplacementOutcome::Skipped { .. } => summary.skipped += 1,
                ReplacementOutcome::Failed { .. } => summary.failed += 1,
                ReplacementOutcome::Missing => {}
            }
        }
        summary
    }
}

/// Map `items` in parallel, keeping input order and reporting each item.
///
/// `cancel` is checked before each item; once it fires, remaining items get
/// `skipped(i, item)` instead of `f(i, item)`.
fn par_map_with_progress<T, U, F, S, P>(
    items: &[T],
    phase: RunPhase,
    cancel: &CancelToken,
    progress: &P,
    label: impl Fn(&T) -> String + Sync,
    f: F,
    skipped: S,
) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(usize, &T) -> U + Sync,
    S: Fn(usize, &T) -> U + Sync,
    P: Fn(&RunProgress) + Send + Sync,
{
    let processed = AtomicUsize::new(0);
    let total = items.len();

    let results: Vec<U> = items
        .par_iter()
        .enumerate()
        .map(|(i, item)| {
            let result = if cancel.is_cancelled() {
                skipped(i, item)
            } else {
                f(i, item)
            };
            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(&RunProgress::with_file(phase, current, total, label(item)));
            result
        })
        .collect();

    progress(&RunProgress::new(phase, total, total));
    results
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn ensure_running(cancel: &CancelToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

/// Scan a folder, reporting the phase. A cancelled scan is an error here
/// because the following stage cannot start.
fn scan_stage<P>(
    scanner: &FolderScanner,
    phase: RunPhase,
    cancel: &CancelToken,
    progress: &P,
) -> Result<Vec<PathBuf>>
where
    P: Fn(&RunProgress) + Send + Sync,
{
    progress(&RunProgress::with_file(
        phase,
        0,
        0,
        scanner.root().display().to_string(),
    ));
    let files = scanner.scan_with(cancel, |dir| {
        progress(&RunProgress::with_file(phase, 0, 0, dir.display().to_string()));
    })?;
    ensure_running(cancel)?;
    progress(&RunProgress::new(phase, files.len(), files.len()));
    Ok(files)
}

/// Parse descriptors in parallel.
///
/// Descriptors not yet read when `cancel` fires come back as unread,
/// degraded records so ids stay aligned with `paths`.
pub fn parse_descriptors<P>(
    paths: &[PathBuf],
    cancel: &CancelToken,
    progress: &P,
) -> Vec<DescriptorRecord>
where
    P: Fn(&RunProgress) + Send + Sync,
{
    par_map_with_progress(
        paths,
        RunPhase::ParsingDescriptors,
        cancel,
        progress,
        |path| file_label(path),
        |_, path| parse_txtp_file(path),
        |_, path| DescriptorRecord {
            source_path: path.clone(),
            id: 0,
            codec: String::new(),
        },
    )
}

/// Normalize voice paths in parallel, then index them in input order.
///
/// Paths not yet normalized when `cancel` fires are left out of the index.
pub fn build_voice_index<P>(paths: &[PathBuf], cancel: &CancelToken, progress: &P) -> VoiceIndex
where
    P: Fn(&RunProgress) + Send + Sync,
{
    let records = par_map_with_progress(
        paths,
        RunPhase::IndexingVoices,
        cancel,
        progress,
        |path| file_label(path),
        |_, path| Some(VoiceRecord::from_path(path)),
        |_, _| None,
    );
    VoiceIndex::build(records.into_iter().flatten())
}

/// Match every descriptor against the index in parallel.
///
/// Descriptors not yet matched when `cancel` fires are reported missing.
pub fn match_descriptors<P>(
    descriptors: &[DescriptorRecord],
    index: &VoiceIndex,
    matcher: &FallbackMatcher,
    cancel: &CancelToken,
    progress: &P,
) -> Vec<MatchResult>
where
    P: Fn(&RunProgress) + Send + Sync,
{
    let rewrites = &matcher.config().descriptor_name_rewrites;
    let key_of = |descriptor: &DescriptorRecord| descriptor_key(&descriptor.source_path, rewrites);
    par_map_with_progress(
        descriptors,
        RunPhase::Matching,
        cancel,
        progress,
        DescriptorRecord::file_name,
        |i, descriptor| matcher.match_key(DescriptorId(i), &key_of(descriptor), index),
        |i, descriptor| MatchResult::missing(DescriptorId(i), key_of(descriptor)),
    )
}

/// Copy every match in parallel. Matches not yet copied when `cancel` fires
/// are skipped.
pub fn apply_replacements<P>(
    matches: &[MatchResult],
    descriptors: &[DescriptorRecord],
    index: &VoiceIndex,
    output_root: &Path,
    cancel: &CancelToken,
    progress: &P,
) -> Vec<ReplacementOutcome>
where
    P: Fn(&RunProgress) + Send + Sync,
{
    par_map_with_progress(
        matches,
        RunPhase::Replacing,
        cancel,
        progress,
        |m| m.key.clone(),
        |_, m| replace::apply(m, descriptors, index, output_root),
        |_, m| {
            if m.found() {
                ReplacementOutcome::Skipped {
                    reason: SkipReason::Cancelled,
                }
            } else {
                ReplacementOutcome::Missing
            }
        },
    )
}

/// Run every stage and return the run's records.
///
/// Fails only if a folder is missing or the run is cancelled at a stage
/// boundary; per-item problems are reported in the [`RunReport`].
pub fn run<P>(options: &PipelineOptions, cancel: &CancelToken, progress: P) -> Result<RunReport>
where
    P: Fn(&RunProgress) + Send + Sync,
{
    options.validate()?;

    let descriptor_paths = scan_stage(
        &FolderScanner::descriptors(&options.descriptor_root),
        RunPhase::ScanningDescriptors,
        cancel,
        &progress,
    )?;
    let descriptors = parse_descriptors(&descriptor_paths, cancel, &progress);
    tracing::debug!("Parsed {} descriptors", descriptors.len());
    ensure_running(cancel)?;

    let voice_paths = scan_stage(
        &FolderScanner::voices(&options.voice_root),
        RunPhase::ScanningVoices,
        cancel,
        &progress,
    )?;
    let index = build_voice_index(&voice_paths, cancel, &progress);
    tracing::debug!("Indexed {} voice files ({} keys)", index.len(), index.key_count());
    ensure_running(cancel)?;

    let matcher = FallbackMatcher::new(options.substitutions.clone());
    let matches = match_descriptors(&descriptors, &index, &matcher, cancel, &progress);
    ensure_running(cancel)?;

    let outcomes = apply_replacements(
        &matches,
        &descriptors,
        &index,
        &options.output_root,
        cancel,
        &progress,
    );

    let report = RunReport {
        voice_root: options.voice_root.clone(),
        descriptors,
        index,
        matches,
        outcomes,
    };

    let summary = report.summary();
    tracing::info!(
        "Run complete: {} found, {} missing, {} copied, {} failed",
        summary.found,
        summary.missing,
        summary.copied,
        summary.failed
    );
    progress(&RunProgress::new(RunPhase::Complete, 1, 1));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_par_map_keeps_order() {
        let items: Vec<usize> = (0..500).collect();
        let out = par_map_with_progress(
            &items,
            RunPhase::Matching,
            &CancelToken::new(),
            &|_: &RunProgress| {},
            ToString::to_string,
            |i, v| {
                assert_eq!(i, *v);
                v * 2
            },
            |_, _| unreachable!(),
        );
        assert_eq!(out, items.iter().map(|v| v * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_par_map_reports_every_item_then_stage_end() {
        let events = Mutex::new(Vec::new());
        let items = ["a", "b", "c"];
        par_map_with_progress(
            &items,
            RunPhase::ParsingDescriptors,
            &CancelToken::new(),
            &|p: &RunProgress| events.lock().unwrap().push(p.clone()),
            |s| (*s).to_string(),
            |_, s| s.len(),
            |_, _| 0,
        );

        let events = events.into_inner().unwrap();
        assert_eq!(events.len(), 4);
        let last = events.last().unwrap();
        assert!(last.is_stage_end());
        assert_eq!(last.phase, RunPhase::ParsingDescriptors);
        let mut counts: Vec<_> = events[..3].iter().map(|p| p.current).collect();
        counts.sort_unstable();
        assert_eq!(counts, [1, 2, 3]);
    }

    /// Run `f` on a single worker so "items after the cancel" is exact
    fn single_threaded<R: Send>(f: impl FnOnce() -> R + Send) -> R {
        rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap()
            .install(f)
    }

    fn descriptor_tree(dir: &Path, count: u32) -> Vec<PathBuf> {
        (1..=count)
            .map(|i| {
                let path = dir.join(format!("Play_line_{i:03}.txtp"));
                std::fs::write(&path, format!("wem/{i}.wem ulPluginID:[Vorbis]")).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_parse_stops_dispatching_after_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let paths = descriptor_tree(dir.path(), 200);
        let cancel = CancelToken::new();

        let records = single_threaded(|| {
            parse_descriptors(&paths, &cancel, &|_: &RunProgress| cancel.cancel())
        });

        assert_eq!(records.len(), 200);
        assert_eq!(records.iter().filter(|r| !r.is_degraded()).count(), 1);
        assert_eq!(records[199].source_path, paths[199]);
    }

    #[test]
    fn test_index_leaves_out_paths_after_cancel() {
        let paths: Vec<PathBuf> = (0..50)
            .map(|i| PathBuf::from(format!("v/Oblivion.esm/NPC/{i}.mp3")))
            .collect();
        let cancel = CancelToken::new();

        let index = single_threaded(|| {
            build_voice_index(&paths, &cancel, &|p: &RunProgress| {
                if p.current == 3 {
                    cancel.cancel();
                }
            })
        });
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_match_reports_missing_after_cancel() {
        let descriptors: Vec<DescriptorRecord> = ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, name)| DescriptorRecord {
                source_path: PathBuf::from(format!("Play_{name}.txtp")),
                id: i as u32 + 1,
                codec: "Vorbis".to_string(),
            })
            .collect();
        let index = VoiceIndex::build(
            ["a", "b", "c"].map(|name| VoiceRecord::from_path(format!("x.esm/{name}.mp3"))),
        );
        let matcher = FallbackMatcher::new(SubstitutionConfig::empty());
        let cancel = CancelToken::new();

        let matches = single_threaded(|| {
            match_descriptors(&descriptors, &index, &matcher, &cancel, &|_: &RunProgress| {
                cancel.cancel();
            })
        });

        let found: Vec<_> = matches.iter().map(MatchResult::found).collect();
        assert_eq!(found, [true, false, false]);
        assert_eq!(matches[2].key, "Play_c");
        assert_eq!(matches[2].descriptor, DescriptorId(2));
    }

    #[test]
    fn test_run_cancelled_mid_stage() {
        let dir = tempfile::tempdir().unwrap();
        let txtp = dir.path().join("txtp");
        std::fs::create_dir(&txtp).unwrap();
        descriptor_tree(&txtp, 20);
        let cancel = CancelToken::new();
        let options = PipelineOptions::new(&txtp, dir.path(), dir.path());

        let result = run(&options, &cancel, |p| {
            if p.phase == RunPhase::ParsingDescriptors {
                cancel.cancel();
            }
        });
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_validate_reports_missing_folders() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let options = PipelineOptions::new(&missing, dir.path(), dir.path());
        assert!(matches!(options.validate(), Err(Error::InputNotFound { path }) if path == missing));

        let options = PipelineOptions::new(dir.path(), dir.path(), &missing);
        assert!(matches!(options.validate(), Err(Error::OutputNotFound { .. })));
    }

    #[test]
    fn test_cancelled_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        let options = PipelineOptions::new(dir.path(), dir.path(), dir.path());
        assert!(matches!(run(&options, &cancel, |_| {}), Err(Error::Cancelled)));
    }

    #[test]
    fn test_cancelled_replacements_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let voice = dir.path().join("Oblivion.esm/a.mp3");
        std::fs::create_dir_all(voice.parent().unwrap()).unwrap();
        std::fs::write(&voice, b"v").unwrap();

        let descriptors = vec![DescriptorRecord {
            source_path: dir.path().join("Play_a.txtp"),
            id: 1,
            codec: "Vorbis".to_string(),
        }];
        let index = VoiceIndex::build([VoiceRecord::from_path(&voice)]);
        let matcher = FallbackMatcher::new(SubstitutionConfig::empty());
        let matches =
            match_descriptors(&descriptors, &index, &matcher, &CancelToken::new(), &|_: &RunProgress| {});
        assert!(matches[0].found());

        let cancel = CancelToken::new();
        cancel.cancel();
        let outcomes = apply_replacements(
            &matches,
            &descriptors,
            &index,
            dir.path(),
            &cancel,
            &|_: &RunProgress| {},
        );
        assert_eq!(
            outcomes,
            [ReplacementOutcome::Skipped {
                reason: SkipReason::Cancelled
            }]
        );
        assert!(!dir.path().join("1.wem").exists());
    }
}
