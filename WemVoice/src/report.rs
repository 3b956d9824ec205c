//! Tab-separated run logs
//!
//! | File                | Line format                                  |
//! |---------------------|----------------------------------------------|
//! | `voice_files.log`   | `name \t\t\t path relative to voice root`    |
//! | `found_files.log`   | `descriptor \t voice \t id`                  |
//! | `missing_files.log` | `descriptor \t [id]`                         |
//! | `failed_files.log`  | `descriptor \t id \t reason`                 |

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::pipeline::RunReport;
use crate::replace::{ReplacementOutcome, SkipReason};

pub const VOICE_FILES_LOG: &str = "voice_files.log";
pub const FOUND_FILES_LOG: &str = "found_files.log";
pub const MISSING_FILES_LOG: &str = "missing_files.log";
pub const FAILED_FILES_LOG: &str = "failed_files.log";

/// Paths of the logs written for a run
#[derive(Debug, Clone)]
pub struct LogFiles {
    pub voice_files: PathBuf,
    pub found: PathBuf,
    pub missing: PathBuf,
    pub failed: PathBuf,
}

/// Every discovered voice asset
pub fn write_voice_files<W: Write>(out: &mut W, report: &RunReport) -> Result<()> {
    for (_, voice) in report.index().iter() {
        let relative = voice
            .source_path
            .strip_prefix(report.voice_root())
            .unwrap_or(&voice.source_path);
        writeln!(out, "{}\t\t\t{}", voice.file_name(), relative.display())?;
    }
    Ok(())
}

/// Descriptors that matched a voice asset
pub fn write_found<W: Write>(out: &mut W, report: &RunReport) -> Result<()> {
    for (descriptor, m, _) in report.entries() {
        let Some(voice) = m.voice().and_then(|id| report.index().record(id)) else {
            continue;
        };
        writeln!(
            out,
            "{}\t{}\t{}",
            descriptor.file_name(),
            voice.file_name(),
            descriptor.id
        )?;
    }
    Ok(())
}

/// Descriptors no rule could match
pub fn write_missing<W: Write>(out: &mut W, report: &RunReport) -> Result<()> {
    for (descriptor, m, _) in report.entries() {
        if !m.found() {
            writeln!(out, "{}\t[{}]", descriptor.file_name(), descriptor.id)?;
        }
    }
    Ok(())
}

/// Matches that were not copied
pub fn write_failed<W: Write>(out: &mut W, report: &RunReport) -> Result<()> {
    for (descriptor, _, outcome) in report.entries() {
        let reason = match outcome {
            ReplacementOutcome::Failed { error, .. } => error.as_str(),
            ReplacementOutcome::Skipped {
                reason: SkipReason::MissingId,
            } => "no wem id",
            ReplacementOutcome::Skipped {
                reason: SkipReason::Cancelled,
            } => "cancelled",
            ReplacementOutcome::Copied { .. } | ReplacementOutcome::Missing => continue,
        };
        writeln!(out, "{}\t{}\t{}", descriptor.file_name(), descriptor.id, reason)?;
    }
    Ok(())
}

fn write_log<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let mut out = BufWriter::new(File::create(path)?);
    write(&mut out)?;
    out.flush()?;
    Ok(())
}

/// Write all four logs into `log_dir`, creating it if needed
pub fn write_run_logs<P: AsRef<Path>>(report: &RunReport, log_dir: P) -> Result<LogFiles> {
    let log_dir = log_dir.as_ref();
    std::fs::create_dir_all(log_dir)?;

    let files = LogFiles {
        voice_files: log_dir.join(VOICE_FILES_LOG),
        found: log_dir.join(FOUND_FILES_LOG),
        missing: log_dir.join(MISSING_FILES_LOG),
        failed: log_dir.join(FAILED_FILES_LOG),
    };

    write_log(&files.voice_files, |out| write_voice_files(out, report))?;
    write_log(&files.found, |out| write_found(out, report))?;
    write_log(&files.missing, |out| write_missing(out, report))?;
    write_log(&files.failed, |out| write_failed(out, report))?;

    tracing::debug!("Wrote run logs to {}", log_dir.display());
    Ok(files)
}
