//! Unit tests for error.rs
//!
//! Tests Error variants, Display output and propagation through Result.

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("draw called outside of a pass".to_string());
    let display = format!("{}", err);
    assert!(display.starts_with("Backend error"));
    assert!(display.contains("draw called outside of a pass"));
}

#[test]
fn test_out_of_memory_display() {
    assert_eq!(format!("{}", Error::OutOfMemory), "Out of GPU memory");
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("texture handle already released".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid resource"));
    assert!(display.contains("already released"));
}

#[test]
fn test_initialization_failed_display() {
    let err = Error::InitializationFailed("missing offscreen.frag.spv".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Initialization failed"));
    assert!(display.contains("offscreen.frag.spv"));
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::OutOfMemory;
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_clone_keeps_message() {
    let err = Error::InvalidResource("pass".to_string());
    let copy = err.clone();
    assert_eq!(format!("{}", err), format!("{}", copy));
    assert!(format!("{:?}", copy).contains("InvalidResource"));
}

// ============================================================================
// RESULT PROPAGATION
// ============================================================================

#[test]
fn test_error_propagation_with_question_mark() {
    fn inner() -> Result<u32> {
        Err(Error::InitializationFailed("surface".to_string()))
    }

    fn outer() -> Result<u32> {
        let value = inner()?;
        Ok(value + 1)
    }

    match outer() {
        Err(Error::InitializationFailed(msg)) => assert_eq!(msg, "surface"),
        other => panic!("unexpected result: {:?}", other),
    }
}
