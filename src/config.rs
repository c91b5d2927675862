//! Organizer configuration: extension overrides and file filters.
//!
//! Configuration is optional. Without a file the organizer uses the built-in
//! extension table and moves every file it finds.
//!
//! # Configuration File Format
//!
//! ```toml
//! [extensions]
//! replace_defaults = false
//!
//! [extensions.map]
//! ".heic" = "images"
//! "flac" = "audios"
//!
//! [filters]
//! skip_hidden = false
//!
//! [filters.exclude]
//! filenames = [".DS_Store", "Thumbs.db"]
//! patterns = ["*.tmp"]
//! extensions = ["part", "crdownload"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use crate::category::{Category, ExtensionMap, extension_of, normalize_extension};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".dirsortrc.toml";

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Invalid TOML syntax or structure.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// An extension key was empty.
    #[error("invalid extension '{0}': must not be empty")]
    InvalidExtension(String),

    /// Invalid glob pattern provided.
    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },

    /// Invalid regex pattern provided.
    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    /// IO error while reading configuration.
    #[error("failed to read configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level organizer configuration as stored in TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizerConfig {
    /// Extension-to-category overrides.
    #[serde(default)]
    pub extensions: ExtensionRules,

    /// Rules for leaving files in place.
    #[serde(default)]
    pub filters: FilterRules,
}

/// Extension table overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionRules {
    /// Start from an empty table instead of the built-in one.
    #[serde(default)]
    pub replace_defaults: bool,

    /// Extension (dot optional) to category name.
    #[serde(default)]
    pub map: BTreeMap<String, Category>,
}

/// Root-level filter rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterRules {
    /// Leave files whose name starts with "." in place. Defaults to false.
    #[serde(default)]
    pub skip_hidden: bool,

    /// Rules for excluding files.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including files (whitelist, overrides exclude rules).
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for excluding files from organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude (e.g., ".DS_Store").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the file name (e.g., "*.tmp").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude, dot optional (e.g., "part").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including files, overriding exclude rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncludeRules {
    /// Glob patterns that override exclude rules.
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Configuration ready to hand to the walker.
#[derive(Debug, Clone)]
pub struct CompiledConfig {
    pub extensions: ExtensionMap,
    pub filters: CompiledFilters,
}

impl OrganizerConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.dirsortrc.toml` in the current directory
    /// 3. Look for `~/.config/dirsort/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any discovered file is malformed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        Ok(Self::load_with_source(config_path)?.0)
    }

    /// Like [`load`](Self::load), also returning the file that was read.
    pub fn load_with_source(
        config_path: Option<&Path>,
    ) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let source = Self::locate(config_path);
        match source {
            Some(path) => Ok((Self::load_from_file(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    fn locate(config_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = config_path {
            return Some(path.to_path_buf());
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("dirsort")
                .join("config.toml");
            if home_config.exists() {
                return Some(home_config);
            }
        }

        None
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Builds the extension table and compiled filters.
    ///
    /// # Errors
    ///
    /// Returns an error if an extension key is empty or any pattern is invalid.
    pub fn compile(self) -> Result<CompiledConfig, ConfigError> {
        let mut extensions = if self.extensions.replace_defaults {
            ExtensionMap::empty()
        } else {
            ExtensionMap::default()
        };
        for (ext, category) in &self.extensions.map {
            if ext.trim().trim_start_matches('.').is_empty() {
                return Err(ConfigError::InvalidExtension(ext.clone()));
            }
            extensions.insert(ext, *category);
        }

        Ok(CompiledConfig {
            extensions,
            filters: CompiledFilters::new(self.filters)?,
        })
    }
}

/// Pre-compiled filter rules.
///
/// The default value excludes nothing.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilters {
    skip_hidden: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
    protected_paths: HashSet<PathBuf>,
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                pattern: pattern.clone(),
                reason: e.msg.to_string(),
            })
        })
        .collect()
}

impl CompiledFilters {
    fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            skip_hidden: rules.skip_hidden,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
            protected_paths: HashSet::new(),
        })
    }

    /// Never move the file at `path` (typically the configuration file that
    /// was loaded for this run).
    pub fn with_protected_path(mut self, path: &Path) -> Self {
        self.protected_paths.insert(crate::walker::normalize_path(path));
        self
    }

    /// Full check for a directory entry: protected paths stay put, then the
    /// name rules of [`should_include`](Self::should_include) apply.
    pub fn should_move(&self, path: &Path, file_name: &str) -> bool {
        if self.protected_paths.contains(path) {
            return false;
        }
        self.should_include(file_name)
    }

    /// Decides from the bare file name whether a file is moved.
    ///
    /// An include glob wins outright. Otherwise the name is left in place if
    /// it is a dot-file while `skip_hidden` is on, or if it is listed
    /// verbatim, or if its extension (as `extension_of` computes it) is
    /// listed, or if an exclude glob or regex matches it.
    pub fn should_include(&self, file_name: &str) -> bool {
        if self.include_patterns.iter().any(|p| p.matches(file_name)) {
            return true;
        }

        if self.skip_hidden && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name) {
            return false;
        }

        let ext = extension_of(file_name);
        if !ext.is_empty() && self.exclude_extensions.contains(&ext) {
            return false;
        }

        if self.exclude_patterns.iter().any(|p| p.matches(file_name)) {
            return false;
        }

        if self.exclude_regexes.iter().any(|r| r.is_match(file_name)) {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(rules: FilterRules) -> CompiledFilters {
        CompiledFilters::new(rules).unwrap()
    }

    #[test]
    fn test_default_config_moves_everything() {
        let compiled = OrganizerConfig::default().compile().unwrap();
        assert_eq!(compiled.extensions, ExtensionMap::default());
        assert!(compiled.filters.should_include(".DS_Store"));
        assert!(compiled.filters.should_include("photo.png"));
    }

    #[test]
    fn test_parse_full_config() {
        let config = OrganizerConfig::from_toml_str(
            r#"
            [extensions]
            replace_defaults = false

            [extensions.map]
            ".HEIC" = "images"
            "flac" = "audios"

            [filters]
            skip_hidden = true

            [filters.exclude]
            filenames = ["Thumbs.db"]
            extensions = ["part"]
            "#,
        )
        .unwrap();

        assert!(config.filters.skip_hidden);
        assert_eq!(config.extensions.map.get("flac"), Some(&Category::Audios));

        let compiled = config.compile().unwrap();
        assert_eq!(
            compiled.extensions.category_for_name("a.heic"),
            Category::Images
        );
        assert_eq!(
            compiled.extensions.category_for_name("a.FLAC"),
            Category::Audios
        );
        // Built-in mappings are kept.
        assert_eq!(
            compiled.extensions.category_for_name("a.txt"),
            Category::Documents
        );
        assert!(!compiled.filters.should_include("Thumbs.db"));
        assert!(!compiled.filters.should_include("movie.mkv.PART"));
        assert!(!compiled.filters.should_include(".hidden"));
    }

    #[test]
    fn test_replace_defaults_starts_empty() {
        let config = OrganizerConfig::from_toml_str(
            r#"
            [extensions]
            replace_defaults = true

            [extensions.map]
            pdf = "documents"
            "#,
        )
        .unwrap();
        let compiled = config.compile().unwrap();
        assert_eq!(compiled.extensions.len(), 1);
        assert_eq!(
            compiled.extensions.category_for_name("a.png"),
            Category::Unknown
        );
        assert_eq!(
            compiled.extensions.category_for_name("a.pdf"),
            Category::Documents
        );
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let result = OrganizerConfig::from_toml_str(
            r#"
            [extensions.map]
            mp4 = "videos"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_extension_is_rejected() {
        let config = OrganizerConfig::from_toml_str(
            r#"
            [extensions.map]
            "." = "images"
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.compile(),
            Err(ConfigError::InvalidExtension(_))
        ));
    }

    #[test]
    fn test_load_with_source_reports_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("rules.toml");
        fs::write(&path, "[filters]\nskip_hidden = true\n").unwrap();

        let (config, source) = OrganizerConfig::load_with_source(Some(&path)).unwrap();
        assert!(config.filters.skip_hidden);
        assert_eq!(source, Some(path));
    }

    #[test]
    fn test_protected_path_overrides_include_rules() {
        let compiled = filters(FilterRules {
            include: IncludeRules {
                patterns: vec!["*".to_string()],
            },
            ..Default::default()
        })
        .with_protected_path(Path::new("/data/./.dirsortrc.toml"));

        assert!(!compiled.should_move(Path::new("/data/.dirsortrc.toml"), ".dirsortrc.toml"));
        assert!(compiled.should_move(Path::new("/data/sub/.dirsortrc.toml"), ".dirsortrc.toml"));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = OrganizerConfig::load(Some(Path::new("/non/existent/dirsort.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_exclude_glob_and_regex() {
        let compiled = filters(FilterRules {
            exclude: ExcludeRules {
                patterns: vec!["*.tmp".to_string(), "[0-9]*.log".to_string()],
                regex: vec![r"^~\$".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!compiled.should_include("scratch.tmp"));
        assert!(!compiled.should_include("1app.log"));
        assert!(compiled.should_include("app.log"));
        assert!(!compiled.should_include("~$report.docx"));
        assert!(compiled.should_include("report.docx"));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let compiled = filters(FilterRules {
            skip_hidden: true,
            include: IncludeRules {
                patterns: vec![".keep*".to_string()],
            },
            ..Default::default()
        });

        assert!(compiled.should_include(".keepme"));
        assert!(!compiled.should_include(".other"));
    }

    #[test]
    fn test_invalid_patterns_return_errors() {
        let glob = CompiledFilters::new(FilterRules {
            exclude: ExcludeRules {
                patterns: vec!["[invalid".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(matches!(glob, Err(ConfigError::InvalidGlobPattern { .. })));

        let regex = CompiledFilters::new(FilterRules {
            exclude: ExcludeRules {
                regex: vec!["[invalid(".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(matches!(regex, Err(ConfigError::InvalidRegexPattern { .. })));
    }
}
