//! dirsort - recursive directory sorting by file extension
//!
//! This library walks a directory tree and moves every file into an
//! `images`, `audios`, `documents` or `unknown` subdirectory of the directory
//! it lives in. Directories already named after a category are left alone,
//! so repeated runs are no-ops. A dry run reports the same actions without
//! touching the filesystem.

pub mod category;
pub mod cli;
pub mod config;
pub mod logger;
pub mod output;
pub mod walker;

pub use category::{Category, ExtensionMap};
pub use cli::{Cli, CliError, run_cli};
pub use config::{CompiledConfig, CompiledFilters, ConfigError, OrganizerConfig};
pub use logger::{ConsoleLogger, LogLevel, Logger, MemoryLogger, NullLogger};
pub use walker::{FileMove, WalkError, WalkReport, Walker};
