//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored
//! log lines and the closing summary table. The console logger writes through
//! here so styling can change in one place.

use crate::logger::LogLevel;
use crate::walker::WalkReport;
use colored::*;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::success("Organization complete!");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Prints one log line with a colored level prefix.
    ///
    /// All levels share stdout so the walk reads as one ordered stream.
    pub fn log_line(level: LogLevel, message: &str) {
        println!("{}", Self::format_log_line(level, message));
    }

    /// Builds a log line: `LEVEL: message`, with the prefix colored by level.
    pub fn format_log_line(level: LogLevel, message: &str) -> String {
        let prefix = format!("{}:", level);
        match level {
            LogLevel::Info => format!("{} {}", prefix.cyan(), message),
            LogLevel::Debug => format!("{} {}", prefix.dimmed(), message.dimmed()),
            LogLevel::Error => format!("{} {}", prefix.red().bold(), message),
        }
    }

    /// Prints a summary table of a walk: files per category, then totals.
    pub fn summary_table(report: &WalkReport) {
        Self::header(if report.dry_run {
            "DRY RUN SUMMARY"
        } else {
            "SUMMARY"
        });

        let counts = report.category_counts();

        let max_category_len = counts
            .keys()
            .map(|c| c.dir_name().len())
            .max()
            .unwrap_or(0)
            .max(8); // At least "Category" width

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in &counts {
            println!(
                "{:<width$} | {} {}",
                category.dir_name(),
                count.to_string().green(),
                plural(*count),
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        let total = report.moved_count();
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            plural(total),
            width = max_category_len
        );

        println!(
            "Directories visited: {}, category directories skipped: {}, created: {}",
            report.directories_visited, report.category_dirs_skipped, report.directories_created
        );
        if !report.excluded.is_empty() {
            println!("Left in place by filters: {}", report.excluded.len());
        }
        if report.has_failures() {
            println!(
                "{} {}",
                "Failures:".red().bold(),
                report.failures.len().to_string().red()
            );
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_log_line_prefixes_level() {
        colored::control::set_override(false);
        assert_eq!(
            OutputFormatter::format_log_line(LogLevel::Error, "failed to move a"),
            "ERROR: failed to move a"
        );
        assert_eq!(
            OutputFormatter::format_log_line(LogLevel::Info, "Entered directory: /x"),
            "INFO: Entered directory: /x"
        );
        assert_eq!(
            OutputFormatter::format_log_line(LogLevel::Debug, "checking"),
            "DEBUG: checking"
        );
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(0), "files");
        assert_eq!(plural(1), "file");
        assert_eq!(plural(2), "files");
    }
}
