//! Global structured logging for the compiler
//!
//! A process-wide `LoggingService` plus an `ErrorCollector` that groups
//! errors per source file. Until `init_global_logging_with_preferences` runs every logging
//! call is a no-op, so the library can be used without any setup.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use crate::config::runtime::LoggingPreferences;
use crate::utils::Span;
use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ErrorCollector, FileProcessingContext, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<Arc<ErrorCollector>> = OnceLock::new();

thread_local! {
    static FILE_CONTEXT: RefCell<Option<FileProcessingContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize logging with the run's preferences (environment or `--config`)
pub fn init_global_logging_with_preferences(
    preferences: LoggingPreferences,
) -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;
    config::init_runtime_preferences(preferences)?;

    let service = Arc::new(LoggingService::with_config());
    install(service.clone())?;

    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));
    Ok(())
}

fn install(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())?;
    GLOBAL_ERROR_COLLECTOR
        .set(Arc::new(ErrorCollector::new()))
        .map_err(|_| "Global error collector already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some() && GLOBAL_ERROR_COLLECTOR.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR
        .get()
        .map(|collector| collector.as_ref())
}

// ============================================================================
// FILE CONTEXT
// ============================================================================

pub fn set_file_context(file_path: PathBuf, file_id: usize) {
    if let Some(collector) = try_get_global_error_collector() {
        collector.register_file(&file_path);
    }
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(FileProcessingContext::new(file_path, file_id));
    });
}

pub fn clear_file_context() {
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with every event tagged with, and collected under, `file_path`
pub fn with_file_context<F, R>(file_path: PathBuf, file_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_file_context(file_path, file_id);
    let result = f();
    clear_file_context();
    result
}

pub fn get_current_file_context() -> Option<FileProcessingContext> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT
// ============================================================================

fn truncate_message(message: &str) -> String {
    let limit = config::get_max_log_message_length();
    if message.chars().count() <= limit {
        message.to_string()
    } else {
        let mut truncated: String = message.chars().take(limit).collect();
        truncated.push_str("...");
        truncated
    }
}

fn build_event(mut event: LogEvent, span: Option<Span>, context: Vec<(&str, &str)>) -> LogEvent {
    if let Some(s) = span {
        event = event.with_span(s);
    }
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    if let Some(file_ctx) = get_current_file_context() {
        event = event
            .with_file_path(&file_ctx.file_path.display().to_string())
            .with_context("file_id", &file_ctx.file_id.to_string());
    }
    event
}

/// Send to the global logger; errors and warnings also land in the collector
fn dispatch(event: LogEvent) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };

    if event.is_error() || event.is_warning() {
        if let (Some(file_ctx), Some(collector)) =
            (get_current_file_context(), try_get_global_error_collector())
        {
            collector.record_event(&file_ctx.file_path, event.clone());
        }
    }

    logger.log_event(event);
}

pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<Span>,
    context: Vec<(&str, &str)>,
) {
    if !is_initialized() {
        return;
    }
    let event = LogEvent::error(code, &truncate_message(message));
    dispatch(build_event(event, span, context));
}

pub fn log_warning_with_context(
    code: Code,
    message: &str,
    span: Option<Span>,
    context: Vec<(&str, &str)>,
) {
    if !is_initialized() {
        return;
    }
    let event = LogEvent::warning(code, &truncate_message(message));
    dispatch(build_event(event, span, context));
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    if !is_initialized() {
        return;
    }
    let event = LogEvent::success(code, &truncate_message(message));
    dispatch(build_event(event, None, context));
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    if !is_initialized() {
        return;
    }
    let event = LogEvent::info(&truncate_message(message));
    dispatch(build_event(event, None, context));
}

pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };
    if !logger.should_log(LogLevel::Debug) {
        return;
    }
    let event = LogEvent::debug(&truncate_message(message));
    dispatch(build_event(event, None, context));
}

// ============================================================================
// REPORTING
// ============================================================================

/// Print the cargo-style report when enabled in the preferences
pub fn print_cargo_style_summary() {
    if !config::use_cargo_style_output() {
        return;
    }
    if let Some(collector) = try_get_global_error_collector() {
        let report = collector::format_cargo_style_errors(collector);
        if !report.is_empty() {
            eprint!("{}", report);
        }
    }
}
