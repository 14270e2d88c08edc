//! Utility helpers for tests.
//!
//! Shared fakes for the host collaborators plus a few world builders. Every
//! fake that records calls keeps its log behind an `Arc`, so a test can clone
//! the handle before boxing the fake into an orchestrator.

pub mod fakes;
pub mod worlds;

pub use fakes::{FakeEntity, Placement, RecordingExecutor, RecordingListener, SharedPosture};
pub use worlds::{floor_world, ledge_world};

/// Assert that all strings in `keys` are present in `text`.
///
/// # Panics
/// Panics with a helpful message if any key is missing.
pub fn assert_all_present(text: &str, keys: &[&str]) {
    for key in keys {
        assert!(text.contains(key), "`{key}` not found in `{text}`");
    }
}

/// Assert that all strings in `keys` are absent from `text`.
///
/// # Panics
/// Panics with a helpful message if any key is found.
pub fn assert_all_absent(text: &str, keys: &[&str]) {
    for key in keys {
        assert!(!text.contains(key), "`{key}` should not be present in `{text}`");
    }
}
