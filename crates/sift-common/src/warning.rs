//! Deduplicated warnings for unsupported selector features.
//!
//! Selector evaluation never fails on unsupported syntax; it matches nothing
//! instead. These warnings tell the caller why, once per distinct message,
//! so a selector evaluated inside a loop does not flood the log.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about an unsupported feature (emitted once per unique message)
///
/// The warning is reported as a `tracing` event at WARN level with the
/// component as a structured field.
///
/// Returns `true` if this call emitted the warning, `false` if the same
/// message had already been reported.
///
/// # Example
/// ```
/// use sift_common::warning::warn_once;
///
/// let _ = warn_once("selector", "unsupported pseudo-class ':hover'");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_emit = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_emit {
        tracing::warn!(component, "{message}");
    }
    should_emit
}

/// Clear all recorded warnings (call before evaluating a new batch of selectors)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
