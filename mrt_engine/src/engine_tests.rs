//! Unit tests for the Engine logging hub
//!
//! IMPORTANT: the logger is a process-wide singleton shared by every test.
//! All tests here are #[serial] and only look at entries carrying their own source tag.

use crate::mrt::Engine;
use crate::mrt::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn tagged(entries: &Arc<Mutex<Vec<LogEntry>>>, source: &str) -> Vec<LogEntry> {
    entries
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.source == source)
        .cloned()
        .collect()
}

// ============================================================================
// LOGGER TESTS
// ============================================================================

#[test]
#[serial]
fn test_set_logger_captures_entries() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    Engine::log(LogSeverity::Info, "test::capture", "hello".to_string());

    let captured = tagged(&entries, "test::capture");
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].message, "hello");
    assert!(captured[0].file.is_none());

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_log_detailed_keeps_location() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    Engine::log_detailed(LogSeverity::Error, "test::detailed", "boom".to_string(), "a.rs", 3);

    let captured = tagged(&entries, "test::detailed");
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].file, Some("a.rs"));
    assert_eq!(captured[0].line, Some(3));

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_min_severity_filters_entries() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);
    Engine::set_min_severity(LogSeverity::Warn);
    assert_eq!(Engine::min_severity(), LogSeverity::Warn);

    Engine::log(LogSeverity::Debug, "test::filter", "dropped".to_string());
    Engine::log(LogSeverity::Warn, "test::filter", "kept".to_string());

    let captured = tagged(&entries, "test::filter");
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].message, "kept");

    Engine::set_min_severity(LogSeverity::Trace);
    Engine::reset_logger();
}

// ============================================================================
// MACRO TESTS
// ============================================================================

#[test]
#[serial]
fn test_engine_err_logs_and_builds_backend_error() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    let err = crate::engine_err!("test::err", "code {}", 7);
    match err {
        crate::mrt::Error::BackendError(msg) => assert_eq!(msg, "code 7"),
        other => panic!("unexpected error: {:?}", other),
    }

    let captured = tagged(&entries, "test::err");
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Error);
    assert!(captured[0].line.is_some());

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_bail_returns_early() {
    fn guarded(flag: bool) -> crate::mrt::Result<u32> {
        if flag {
            crate::engine_bail!("test::bail", "flag was set");
        }
        Ok(1)
    }

    let (logger, _entries) = TestLogger::new();
    Engine::set_logger(logger);

    assert_eq!(guarded(false).unwrap(), 1);
    assert!(matches!(guarded(true), Err(crate::mrt::Error::BackendError(_))));

    Engine::reset_logger();
}
