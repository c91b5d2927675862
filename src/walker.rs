/// Recursive, idempotent file categorization.
///
/// The walker visits a directory tree depth-first, creates the four category
/// subdirectories in every directory it enters, and moves each file into the
/// category matching its extension. Directories named after a category are
/// never entered, so running it again on an organized tree moves nothing.
///
/// Errors inside the walk are logged and recorded in the [`WalkReport`]; none
/// of them stops the walk.
use crate::category::{Category, ExtensionMap, is_category_dir_name};
use crate::config::CompiledFilters;
use crate::logger::Logger;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Folds `.` and `..` components without touching the filesystem.
///
/// `a/images/sub/..` becomes `a/images`, so the base name seen by the
/// category-directory check is the directory actually walked. A `..` that
/// would climb above the root of an absolute path is dropped; leading `..`
/// of a relative path are kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Errors encountered while walking. None of them are fatal.
#[derive(Debug, Error)]
pub enum WalkError {
    /// A directory could not be listed; its subtree is abandoned.
    #[error("unable to list directory {}: {source}", path.display())]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A category directory could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be moved into its category directory.
    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    MoveFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The type of a directory entry could not be determined.
    #[error("unable to read file type of {}: {source}", path.display())]
    FileType {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which step of the walk a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    List,
    CreateDir,
    Move,
    FileType,
}

/// A recorded, non-fatal failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalkFailure {
    pub kind: FailureKind,
    pub path: PathBuf,
    pub message: String,
}

impl From<&WalkError> for WalkFailure {
    fn from(error: &WalkError) -> Self {
        let (kind, path) = match error {
            WalkError::ListDirectory { path, .. } => (FailureKind::List, path),
            WalkError::CreateDirectory { path, .. } => (FailureKind::CreateDir, path),
            WalkError::MoveFile { from, .. } => (FailureKind::Move, from),
            WalkError::FileType { path, .. } => (FailureKind::FileType, path),
        };
        Self {
            kind,
            path: path.clone(),
            message: error.to_string(),
        }
    }
}

/// A file move, performed or (in a dry run) planned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMove {
    pub from: PathBuf,
    pub to: PathBuf,
    pub category: Category,
}

/// Summary of one organize run.
#[derive(Debug, Clone, Serialize)]
pub struct WalkReport {
    pub root: PathBuf,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Non-category directories the walker tried to list.
    pub directories_visited: usize,
    pub category_dirs_skipped: usize,
    /// Category directories that did not exist before this run.
    pub directories_created: usize,
    pub moves: Vec<FileMove>,
    /// Files left in place by the configured filters.
    pub excluded: Vec<PathBuf>,
    pub failures: Vec<WalkFailure>,
}

impl WalkReport {
    fn new(root: &Path, dry_run: bool) -> Self {
        let now = Utc::now();
        Self {
            root: root.to_path_buf(),
            dry_run,
            started_at: now,
            finished_at: now,
            directories_visited: 0,
            category_dirs_skipped: 0,
            directories_created: 0,
            moves: Vec::new(),
            excluded: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn moved_count(&self) -> usize {
        self.moves.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Number of moves per category. Categories with no moves are omitted.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for mv in &self.moves {
            *counts.entry(mv.category).or_insert(0) += 1;
        }
        counts
    }
}

/// Sorts a directory tree into category subdirectories.
pub struct Walker<L: Logger> {
    extensions: ExtensionMap,
    filters: CompiledFilters,
    logger: L,
}

impl<L: Logger> Walker<L> {
    pub fn new(extensions: ExtensionMap, filters: CompiledFilters, logger: L) -> Self {
        Self {
            extensions,
            filters,
            logger,
        }
    }

    /// Walker with the built-in extension table and no filters.
    pub fn with_defaults(logger: L) -> Self {
        Self::new(ExtensionMap::default(), CompiledFilters::default(), logger)
    }

    pub fn extensions(&self) -> &ExtensionMap {
        &self.extensions
    }

    pub fn logger(&self) -> &L {
        &self.logger
    }

    /// Organizes `root` and everything below it.
    ///
    /// With `dry_run` set, nothing on disk changes: every directory creation
    /// and move is logged and recorded as planned instead.
    ///
    /// Moving onto an existing destination file replaces it; the platform's
    /// rename semantics decide, there is no conflict handling.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::logger::ConsoleLogger;
    /// use dirsort::walker::Walker;
    /// use std::path::Path;
    ///
    /// let walker = Walker::with_defaults(ConsoleLogger::new(false));
    /// let report = walker.organize(Path::new("/home/user/Downloads"), true);
    /// println!("{} files would move", report.moved_count());
    /// ```
    pub fn organize(&self, root: &Path, dry_run: bool) -> WalkReport {
        let root = normalize_path(root);
        let mut report = WalkReport::new(&root, dry_run);
        self.visit(&root, dry_run, &mut report);
        report.finished_at = Utc::now();
        report
    }

    fn visit(&self, dir: &Path, dry_run: bool, report: &mut WalkReport) {
        self.logger
            .info(&format!("Entered directory: {}", dir.display()));

        if self.is_category_dir(dir) {
            self.logger
                .info(&format!("{} is a category directory", dir.display()));
            report.category_dirs_skipped += 1;
            return;
        }

        report.directories_visited += 1;

        // Read the whole listing up front so the category directories created
        // below never show up as entries of this pass.
        let entries = match fs::read_dir(dir).and_then(|rd| rd.collect::<Result<Vec<_>, _>>()) {
            Ok(entries) => entries,
            Err(source) => {
                self.record(
                    report,
                    WalkError::ListDirectory {
                        path: dir.to_path_buf(),
                        source,
                    },
                );
                return;
            }
        };

        self.logger.debug(&format!(
            "{} has {} entries",
            dir.display(),
            entries.len()
        ));

        if dry_run {
            self.logger.info(&format!(
                "[DRY RUN] entered directory named: {}",
                dir.display()
            ));
        }

        self.create_category_dirs(dir, dry_run, report);

        for entry in entries {
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();

            if dry_run {
                self.logger
                    .info(&format!("[DRY RUN] {} has entry: {}", dir.display(), name));
            }

            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(source) => {
                    self.record(report, WalkError::FileType { path, source });
                    continue;
                }
            };

            if file_type.is_dir() {
                if is_category_dir_name(&name) {
                    self.logger
                        .debug(&format!("Skipping category directory {}", path.display()));
                    report.category_dirs_skipped += 1;
                } else {
                    self.visit(&path, dry_run, report);
                }
                continue;
            }

            self.organize_file(dir, &name, path, dry_run, report);
        }
    }

    fn is_category_dir(&self, dir: &Path) -> bool {
        self.logger.debug(&format!(
            "Checking if {} is category directory",
            dir.display()
        ));
        dir.file_name()
            .map(|name| is_category_dir_name(&name.to_string_lossy()))
            .unwrap_or(false)
    }

    fn create_category_dirs(&self, dir: &Path, dry_run: bool, report: &mut WalkReport) {
        self.logger.debug("Creating category directories");
        for category in Category::ALL {
            if dry_run {
                self.logger.info(&format!(
                    "[DRY RUN] would ensure directory {} exists in {}",
                    category,
                    dir.display()
                ));
                continue;
            }

            let category_path = dir.join(category.dir_name());
            self.logger
                .debug(&format!("Ensuring directory {}", category_path.display()));
            let existed = category_path.is_dir();
            match fs::create_dir_all(&category_path) {
                Ok(()) => {
                    if !existed {
                        self.logger
                            .info(&format!("Created directory {}", category_path.display()));
                        report.directories_created += 1;
                    }
                }
                Err(source) => self.record(
                    report,
                    WalkError::CreateDirectory {
                        path: category_path,
                        source,
                    },
                ),
            }
        }
    }

    fn organize_file(
        &self,
        dir: &Path,
        name: &str,
        path: PathBuf,
        dry_run: bool,
        report: &mut WalkReport,
    ) {
        if !self.filters.should_move(&path, name) {
            self.logger
                .debug(&format!("Leaving excluded file {}", path.display()));
            report.excluded.push(path);
            return;
        }

        let category = self.extensions.category_for_name(name);
        // Join the raw file name so non-UTF-8 names survive the move intact.
        let raw_name = path.file_name().unwrap_or(OsStr::new(name));
        let destination = dir.join(category.dir_name()).join(raw_name);

        if dry_run {
            self.logger.info(&format!(
                "[DRY RUN] would move {} -> {}",
                path.display(),
                destination.display()
            ));
            report.moves.push(FileMove {
                from: path,
                to: destination,
                category,
            });
            return;
        }

        self.logger.info(&format!(
            "Moving {} -> {}",
            path.display(),
            destination.display()
        ));
        match fs::rename(&path, &destination) {
            Ok(()) => report.moves.push(FileMove {
                from: path,
                to: destination,
                category,
            }),
            Err(source) => self.record(
                report,
                WalkError::MoveFile {
                    from: path,
                    to: destination,
                    source,
                },
            ),
        }
    }

    fn record(&self, report: &mut WalkReport, error: WalkError) {
        self.logger.error(&error.to_string());
        report.failures.push(WalkFailure::from(&error));
    }
}
