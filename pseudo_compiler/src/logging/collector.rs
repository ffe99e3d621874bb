//! Per-file event collection with a cargo-style report

use super::codes;
use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// The file currently being compiled on this thread
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self { file_path, file_id }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
}

/// Thread-safe store of events grouped by source file
pub struct ErrorCollector {
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<LogEvent>>> {
        self.file_events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record an event for a file. Past the per-file limit a single
    /// warning marks the truncation and further events are dropped.
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = self.lock();
        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            file_events.push(LogEvent::warning(
                codes::system::EVENT_LIMIT_REACHED,
                &format!(
                    "Too many events for file (limit: {})",
                    MAX_LOG_EVENTS_PER_FILE
                ),
            ));
        }
    }

    /// Make a file known to the collector even if it never logs an event
    pub fn register_file(&self, file_path: &Path) {
        self.lock().entry(file_path.to_path_buf()).or_default();
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.lock().clone()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.lock();
        let mut summary = ProcessingSummary {
            total_files: events.len(),
            total_processing_time: self.processing_start.elapsed(),
            ..ProcessingSummary::default()
        };

        for file_events in events.values() {
            let errors = file_events.iter().filter(|e| e.is_error()).count();
            let warnings = file_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_files += 1;
            } else {
                summary.successful_files += 1;
            }
            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }

        summary
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Render every collected error and warning grouped by file
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.get_all_file_events() {
        let reported: Vec<_> = events
            .iter()
            .filter(|e| e.is_error() || e.is_warning())
            .collect();
        if reported.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));

        for event in reported {
            let label = if event.is_error() { "error" } else { "warning" };
            let location = event
                .span
                .as_ref()
                .map(|s| {
                    format!(
                        " --> {}:{}:{}",
                        file_path.display(),
                        s.start.line,
                        s.start.column
                    )
                })
                .unwrap_or_default();

            output.push_str(&format!(
                "{}[{}]: {}{}\n",
                label, event.code, event.message, location
            ));

            for (key, value) in &event.context {
                if key != "file_path" && key != "file_id" {
                    output.push_str(&format!("  = {}: {}\n", key, value));
                }
            }

            if event.is_error() {
                let action = codes::get_action(event.code.as_str());
                if action != "No specific action available" {
                    output.push_str(&format!("  = help: {}\n", action));
                }
            }
        }
        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!(
            "Total errors: {} in {} of {} file(s)\n",
            summary.total_errors, summary.failed_files, summary.total_files
        ));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_collector_groups_by_file() {
        let collector = ErrorCollector::new();
        let first = PathBuf::from("uno.txt");
        let second = PathBuf::from("dos.txt");

        collector.record_event(
            &first,
            LogEvent::error(codes::semantic::TYPE_MISMATCH, "bad operands"),
        );
        collector.record_event(&second, LogEvent::info("fine"));

        let events = collector.get_all_file_events();
        assert_eq!(events[&first].iter().filter(|e| e.is_error()).count(), 1);
        assert!(!events[&second].iter().any(|e| e.is_error()));

        let summary = collector.get_summary();
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.failed_files, 1);
        assert_eq!(summary.successful_files, 1);
    }

    #[test]
    fn test_event_limit_adds_single_warning() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("ruido.txt");

        for _ in 0..MAX_LOG_EVENTS_PER_FILE + 5 {
            collector.record_event(&path, LogEvent::debug("noise"));
        }

        let events = collector.get_all_file_events().remove(&path).unwrap_or_default();
        assert_eq!(events.len(), MAX_LOG_EVENTS_PER_FILE + 1);
        assert_eq!(
            events.last().map(|e| e.code),
            Some(codes::system::EVENT_LIMIT_REACHED)
        );
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("prog.txt");
        collector.record_event(
            &path,
            LogEvent::error(codes::semantic::UNDECLARED_IDENTIFIER, "'x' is not declared")
                .with_context("line", "3"),
        );

        let report = format_cargo_style_errors(&collector);
        assert!(report.contains("Checking prog.txt..."));
        assert!(report.contains("error[E110]: 'x' is not declared"));
        assert!(report.contains("= line: 3"));
        assert!(report.contains("= help: Declare the name before using it"));
        assert!(report.contains("Total errors: 1 in 1 of 1 file(s)"));
    }
}
