//! Recursive folder scanning with cooperative cancellation
//!
//! Both inputs of a run (the `.txtp` descriptor tree and the voice asset tree)
//! are discovered with a [`FolderScanner`]. A scan is all-or-nothing: if the
//! run's [`CancelToken`] fires mid-walk the scan yields no files at all rather
//! than a partial listing.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};

/// Extensions of descriptor files
pub const DESCRIPTOR_EXTENSIONS: &[&str] = &["txtp"];

/// Extensions of voice asset files
pub const VOICE_EXTENSIONS: &[&str] = &["mp3", "wem"];

/// Run-scoped cancellation flag, shared between the caller and the pipeline
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Already dispatched work runs to completion.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Recursive file lister filtered by extension
#[derive(Debug, Clone)]
pub struct FolderScanner {
    root: PathBuf,
    extensions: Vec<String>,
}

impl FolderScanner {
    /// Create a scanner for `root` keeping files whose extension is one of
    /// `extensions` (given without the dot, compared case-insensitively).
    pub fn new<P, I, S>(root: P, extensions: I) -> Self
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_string())
                .collect(),
        }
    }

    /// Scanner for `.txtp` descriptor files
    pub fn descriptors<P: AsRef<Path>>(root: P) -> Self {
        Self::new(root, DESCRIPTOR_EXTENSIONS)
    }

    /// Scanner for `.mp3` / `.wem` voice assets
    pub fn voices<P: AsRef<Path>>(root: P) -> Self {
        Self::new(root, VOICE_EXTENSIONS)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check that the root exists and is a directory
    pub fn check_root(&self) -> Result<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(Error::InputNotFound {
                path: self.root.clone(),
            })
        }
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| {
            let ext = ext.to_string_lossy();
            self.extensions
                .iter()
                .any(|wanted| ext.eq_ignore_ascii_case(wanted))
        })
    }

    fn walk(&self) -> walkdir::IntoIter {
        WalkDir::new(&self.root).follow_links(true).into_iter()
    }

    /// Keep matching files, turn walk errors into ours
    fn select(&self, entry: walkdir::Result<DirEntry>) -> Option<Result<PathBuf>> {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                (entry.file_type().is_file() && self.accepts(path))
                    .then(|| Ok(path.to_path_buf()))
            }
            Err(e) => Some(Err(Error::from(e))),
        }
    }

    /// Lazily walk the tree. Every call starts a new walk.
    ///
    /// Entries that cannot be read are yielded as errors; the caller decides
    /// whether to skip them.
    pub fn entries(&self) -> impl Iterator<Item = Result<PathBuf>> + '_ {
        self.walk().filter_map(move |entry| self.select(entry))
    }

    /// Collect every matching file under the root, sorted.
    ///
    /// Returns an empty list if `cancel` fires before the walk completes.
    pub fn scan(&self, cancel: &CancelToken) -> Result<Vec<PathBuf>> {
        self.scan_with(cancel, |_| {})
    }

    /// Like [`scan`](Self::scan), calling `on_dir` for every directory
    /// entered. `cancel` is checked before each walked entry, matching or
    /// not.
    pub fn scan_with<F>(&self, cancel: &CancelToken, mut on_dir: F) -> Result<Vec<PathBuf>>
    where
        F: FnMut(&Path),
    {
        self.check_root()?;

        let mut files = Vec::new();
        for entry in self.walk() {
            if cancel.is_cancelled() {
                tracing::debug!("Scan of {} cancelled", self.root.display());
                return Ok(Vec::new());
            }
            if let Ok(entry) = &entry {
                if entry.file_type().is_dir() {
                    on_dir(entry.path());
                }
            }
            match self.select(entry) {
                Some(Ok(path)) => files.push(path),
                Some(Err(e)) => {
                    tracing::warn!("Skipping unreadable entry under {}: {}", self.root.display(), e);
                }
                None => {}
            }
        }

        files.sort();
        tracing::debug!("Found {} files under {}", files.len(), self.root.display());
        Ok(files)
    }
}
