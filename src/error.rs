//! Error types for window-tree consistency violations.
//!
//! Routine outcomes of event processing (foreign windows, hit-test misses,
//! grab conflicts) are not errors and never show up here. A [`WindowError`]
//! means a caller used a handle the tree cannot honour.

use log::error;
use thiserror::Error;

use crate::window::WindowId;

/// Errors raised by window-tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// The handle does not name a window in this tree.
    #[error("unknown window {0:?}")]
    UnknownWindow(WindowId),
    /// The window has been destroyed and only survives as a tombstone.
    #[error("window {0:?} has been destroyed")]
    Destroyed(WindowId),
    /// The root window cannot be the subject of this operation.
    #[error("operation not permitted on the root window")]
    RootWindow,
    /// Only child windows can move between parents, and never under the root.
    #[error("window {0:?} cannot be reparented there")]
    CannotReparent(WindowId),
    /// Reparenting would make a window its own ancestor.
    #[error("reparenting {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle { child: WindowId, parent: WindowId },
    /// A native view can only back one logical window.
    #[error("native view {0} is already bound to a window")]
    ViewAlreadyBound(u64),
}

/// Reports a consistency violation.
///
/// Logs and carries on, unless the `strict-checks` feature turns violations
/// into panics.
pub fn report_violation(operation: &str, err: &WindowError) {
    error!("🚫 {} failed: {}", operation, err);

    #[cfg(feature = "strict-checks")]
    panic!("{} failed: {}", operation, err);
}

/// Converts a tree result into an option, reporting the violation on error.
pub(crate) fn checked<T>(operation: &str, result: Result<T, WindowError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            report_violation(operation, &err);
            None
        }
    }
}
