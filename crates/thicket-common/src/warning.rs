//! Parser warnings with deduplication.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the tokenizer, the tree builder, and the DOM to report recoverable
//! anomalies. Output goes through the `log` facade so the host decides where
//! (and whether) it is printed.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already logged (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Log a warning once per unique `(component, message)` pair.
///
/// Returns `true` if the warning was new and has been logged.
///
/// # Example
/// ```
/// use thicket_common::warning::warn_once;
///
/// let _ = warn_once("HTML Tokenizer", "unexpected-null-character");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let is_new = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if is_new {
        log::warn!(target: "thicket", "[{component}] {message}");
    }
    is_new
}

/// Clear all recorded warnings (call before parsing an unrelated document)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_deduplicates() {
        let message = "test_warn_once_deduplicates unique message";
        assert!(warn_once("Test", message));
        assert!(!warn_once("Test", message));
        assert!(warn_once("Other", message));
    }
}
