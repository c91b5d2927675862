//! Command-line interface module for dirsort.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Root path resolution and validation
//! - Configuration loading
//! - Running the walker and reporting the result

use crate::config::{ConfigError, OrganizerConfig};
use crate::logger::{ConsoleLogger, Logger};
use crate::output::OutputFormatter;
use crate::walker::{WalkReport, Walker, normalize_path};
use clap::Parser;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sort the files of a directory tree into category subdirectories.
#[derive(Debug, Clone, Parser)]
#[command(name = "dirsort")]
#[command(version)]
#[command(about = "Sort files into images/audios/documents/unknown subdirectories by extension")]
pub struct Cli {
    /// Directory to organize
    #[arg(short, long, value_name = "PATH")]
    pub folder: PathBuf,

    /// Show what would be done without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print debug messages
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file (defaults to .dirsortrc.toml, then ~/.config/dirsort/config.toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the run report as JSON instead of the summary table
    #[arg(long)]
    pub json: bool,
}

/// Errors that stop the tool before any directory is walked.
#[derive(Debug, Error)]
pub enum CliError {
    /// The folder argument does not name an existing directory.
    #[error("invalid folder {}: {reason}", path.display())]
    InvalidRoot { path: PathBuf, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

/// Makes `folder` absolute, folds `.`/`..` components, and checks that it is
/// a directory.
///
/// # Errors
///
/// Returns `CliError::InvalidRoot` if the path cannot be made absolute,
/// does not exist, or is not a directory.
pub fn resolve_root(folder: &Path) -> Result<PathBuf, CliError> {
    let invalid = |reason: String| CliError::InvalidRoot {
        path: folder.to_path_buf(),
        reason,
    };

    let absolute = std::path::absolute(folder)
        .map(|p| normalize_path(&p))
        .map_err(|e| invalid(e.to_string()))?;
    let metadata = std::fs::metadata(&absolute).map_err(|e| invalid(e.to_string()))?;
    if !metadata.is_dir() {
        return Err(invalid("not a directory".to_string()));
    }
    Ok(absolute)
}

/// Loads configuration, validates the root, and runs the walker.
///
/// All fatal checks happen before the walk starts; once it starts, failures
/// only end up in the returned report.
pub fn organize_with<L: Logger>(cli: &Cli, logger: L) -> Result<WalkReport, CliError> {
    let root = resolve_root(&cli.folder)?;
    let (config, source) = OrganizerConfig::load_with_source(cli.config.as_deref())?;
    let mut config = config.compile()?;

    // The configuration file may sit inside the tree being sorted.
    if let Some(source) = source {
        let source = std::path::absolute(&source).unwrap_or(source);
        config.filters = config.filters.with_protected_path(&source);
    }

    let walker = Walker::new(config.extensions, config.filters, logger);
    Ok(walker.organize(&root, cli.dry_run))
}

/// Runs the CLI application.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use dirsort::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["dirsort", "--folder", "/tmp/downloads", "--dry-run"]);
/// if let Err(e) = run_cli(&cli) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<(), CliError> {
    // Log lines would corrupt the JSON document on stdout.
    let report = if cli.json {
        organize_with(cli, crate::logger::NullLogger)?
    } else {
        organize_with(cli, ConsoleLogger::new(cli.verbose))?
    };

    if cli.json {
        OutputFormatter::plain(&serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    OutputFormatter::summary_table(&report);

    if report.has_failures() {
        OutputFormatter::warning("Some entries could not be organized. Please review errors above.");
    } else if report.dry_run {
        OutputFormatter::dry_run_notice("complete. No files were modified.");
        OutputFormatter::plain(&format!(
            "Run 'dirsort --folder {}' (without --dry-run) to execute the organization.",
            report.root.display()
        ));
    } else {
        OutputFormatter::success("Organization complete!");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{MemoryLogger, NullLogger};
    use tempfile::TempDir;

    #[test]
    fn test_folder_is_required() {
        let result = Cli::try_parse_from(["dirsort", "--dry-run"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = Cli::try_parse_from([
            "dirsort",
            "--folder",
            "some/dir",
            "--dry-run",
            "-v",
            "--config",
            "rules.toml",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.folder, PathBuf::from("some/dir"));
        assert!(cli.dry_run);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("rules.toml")));
        assert!(cli.json);
    }

    #[test]
    fn test_resolve_root_rejects_missing_and_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("missing");
        assert!(matches!(
            resolve_root(&missing),
            Err(CliError::InvalidRoot { .. })
        ));

        let file = temp_dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            resolve_root(&file),
            Err(CliError::InvalidRoot { .. })
        ));

        let resolved = resolve_root(temp_dir.path()).unwrap();
        assert!(resolved.is_absolute());
    }

    #[test]
    fn test_parent_dir_folder_inside_category_moves_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let images = temp_dir.path().join("images");
        std::fs::create_dir_all(images.join("sub")).unwrap();
        std::fs::write(images.join("notes.txt"), "x").unwrap();

        let folder = images.join("sub").join("..");
        assert_eq!(resolve_root(&folder).unwrap(), images);

        let config = temp_dir.path().join("empty.toml");
        std::fs::write(&config, "").unwrap();
        let cli = Cli::try_parse_from([
            "dirsort",
            "--folder",
            folder.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .unwrap();

        let report = organize_with(&cli, NullLogger).unwrap();
        assert_eq!(report.moved_count(), 0);
        assert_eq!(report.category_dirs_skipped, 1);
        assert!(images.join("notes.txt").exists());
        assert!(!images.join("documents").exists());
    }

    #[test]
    fn test_invalid_root_walks_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cli = Cli::try_parse_from([
            "dirsort",
            "--folder",
            temp_dir.path().join("missing").to_str().unwrap(),
        ])
        .unwrap();

        let logger = MemoryLogger::new();
        let result = organize_with(&cli, &logger);
        assert!(matches!(result, Err(CliError::InvalidRoot { .. })));
        assert!(logger.records().is_empty());
    }
}
