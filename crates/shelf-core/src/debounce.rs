//! # Decode Debouncer
//!
//! A camera sees the same barcode on many consecutive frames. The debouncer
//! suppresses a repeat of the most recently accepted code inside a short
//! window.
//!
//! ```text
//!  t=0      accept("X") → true    last = (X, 0)
//!  t=1000   accept("X") → false   (same code, 1000 < 1500)
//!  t=1200   accept("Y") → true    last = (Y, 1200)
//!  t=1300   accept("X") → true    (X is no longer the last code)
//! ```
//!
//! Only the single most recent acceptance is remembered; suppressed calls do
//! not refresh it.

use crate::DEBOUNCE_WINDOW_MS;

/// Suppresses duplicate scans of the same code within a time window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window_ms: i64,
    last: Option<(String, i64)>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Debouncer::new(DEBOUNCE_WINDOW_MS)
    }
}

impl Debouncer {
    /// Creates a debouncer with the given window in milliseconds.
    pub fn new(window_ms: i64) -> Self {
        Debouncer {
            window_ms,
            last: None,
        }
    }

    /// Returns the window in milliseconds.
    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Decides whether `code` observed at `now_ms` should be accepted.
    ///
    /// Returns false if the same code was last accepted less than the window
    /// ago. Otherwise records `(code, now_ms)` and returns true.
    pub fn accept(&mut self, code: &str, now_ms: i64) -> bool {
        if let Some((last_code, last_ts)) = &self.last {
            if last_code == code && now_ms - last_ts < self.window_ms {
                return false;
            }
        }

        self.last = Some((code.to_string(), now_ms));
        true
    }

    /// Returns the last accepted code.
    pub fn last_code(&self) -> Option<&str> {
        self.last.as_ref().map(|(code, _)| code.as_str())
    }

    /// Forgets the last accepted code.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
