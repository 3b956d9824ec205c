//! CLI progress display utilities
//!
//! Step indicators with emojis, and a stage display that turns the
//! pipeline's [`RunProgress`] events into one progress bar per stage.

use std::sync::Mutex;
use std::time::Duration;

use console::{Emoji, style};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

use crate::pipeline::{RunPhase, RunProgress};

// =============================================================================
// Emoji Constants (with ASCII fallbacks for terminals without emoji support)
// =============================================================================

/// Magnifying glass - for scanning operations
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Document - for descriptor parsing
pub static DOCUMENT: Emoji<'_, '_> = Emoji("📄 ", "");
/// Link - for indexing and matching
pub static LINK: Emoji<'_, '_> = Emoji("🔗 ", "");
/// Floppy disk - for writing operations
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");
/// Sparkles - for completion
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

/// Number of numbered steps shown for a run
const RUN_STEPS: usize = 6;

/// Print a step indicator: `[1/3] 📄 Message...`
pub fn print_step(current: usize, total: usize, emoji: Emoji, msg: &str) {
    println!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    );
}

/// Print completion message: `✨ Done in 2s`
pub fn print_done(elapsed: Duration) {
    println!("{} Done in {}", SPARKLE, HumanDuration(elapsed));
}

/// Progress bar style for determinate progress
///
/// # Panics
/// Panics if the template string is invalid (this is a compile-time constant).
#[must_use]
pub fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
        .expect("valid template")
}

/// Create a simple spinner
///
/// # Panics
/// Panics if the template string is invalid (this is a compile-time constant).
#[must_use]
pub fn simple_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("valid template"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn step_of(phase: RunPhase) -> Option<(usize, Emoji<'static, 'static>)> {
    match phase {
        RunPhase::ScanningDescriptors => Some((1, LOOKING_GLASS)),
        RunPhase::ParsingDescriptors => Some((2, DOCUMENT)),
        RunPhase::ScanningVoices => Some((3, LOOKING_GLASS)),
        RunPhase::IndexingVoices => Some((4, LINK)),
        RunPhase::Matching => Some((5, LINK)),
        RunPhase::Replacing => Some((6, DISK)),
        RunPhase::Complete => None,
    }
}

/// Renders pipeline events: a step line when a phase starts, a spinner
/// while scanning, a bar while items are processed.
pub struct StageDisplay {
    quiet: bool,
    current: Mutex<Option<(RunPhase, ProgressBar)>>,
}

impl StageDisplay {
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            current: Mutex::new(None),
        }
    }

    /// Handle one progress event
    pub fn update(&self, progress: &RunProgress) {
        if self.quiet {
            return;
        }
        let Ok(mut current) = self.current.lock() else {
            return;
        };

        let same_phase = current.as_ref().is_some_and(|(phase, _)| *phase == progress.phase);
        if !same_phase {
            if let Some((_, pb)) = current.take() {
                pb.finish_and_clear();
            }
            let Some((step, emoji)) = step_of(progress.phase) else {
                return;
            };
            print_step(step, RUN_STEPS, emoji, &format!("{}...", progress.phase.as_str()));

            let pb = if progress.total == 0 && !progress.is_stage_end() {
                simple_spinner(progress.current_file.as_deref().unwrap_or_default())
            } else {
                let pb = ProgressBar::new(progress.total as u64);
                pb.set_style(bar_style());
                pb
            };
            *current = Some((progress.phase, pb));
        }

        if let Some((_, pb)) = current.as_ref() {
            if progress.total > 0 {
                pb.set_length(progress.total as u64);
                pb.set_position(progress.current as u64);
            }
            if let Some(ref name) = progress.current_file {
                pb.set_message(name.clone());
            }
        }
    }

    /// Clear whatever bar is still on screen
    pub fn finish(&self) {
        if let Ok(mut current) = self.current.lock() {
            if let Some((_, pb)) = current.take() {
                pb.finish_and_clear();
            }
        }
    }
}
