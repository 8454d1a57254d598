//! Bounded retry for the workspace schema-lock error class.
//!
//! Schema-lock contention is the one transient failure the pipeline
//! retries, and only around point-layer creation. Every other error
//! propagates immediately.

use dtw_store::StoreError;
use std::time::Duration;

/// Maximum total attempts at an operation under schema-lock contention.
pub const SCHEMA_LOCK_ATTEMPTS: u32 = 5;

/// Pause between attempts.
pub const SCHEMA_LOCK_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Run `op`, retrying schema-lock failures up to `attempts` total tries
/// with `delay` between them.
///
/// Non-lock errors propagate immediately; exhausting the budget returns
/// the final schema-lock error.
pub fn with_schema_lock_retry<T>(
    label: &str,
    attempts: u32,
    delay: Duration,
    mut op: impl FnMut() -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op() {
            Err(e) if e.is_schema_lock() && attempt < attempts => {
                log::warn!(
                    "schema lock error on '{}'. Retrying {} more times...",
                    label,
                    attempts - attempt
                );
                std::thread::sleep(delay);
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn lock_err() -> StoreError {
        StoreError::SchemaLock {
            dataset: "DTWPoint".to_string(),
        }
    }

    #[test]
    fn succeeds_after_three_lock_failures() {
        let calls = Cell::new(0u32);
        let result = with_schema_lock_retry("DTWPoint", SCHEMA_LOCK_ATTEMPTS, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            if calls.get() <= 3 {
                Err(lock_err())
            } else {
                Ok(calls.get())
            }
        });
        assert_eq!(result.unwrap(), 4, "Should succeed on the 4th call");
        assert_eq!(calls.get(), 4, "Exactly 3 retries, no 4th retry after success");
    }

    #[test]
    fn exhausts_the_budget_and_stops() {
        let calls = Cell::new(0u32);
        let result: Result<(), _> =
            with_schema_lock_retry("DTWPoint", SCHEMA_LOCK_ATTEMPTS, Duration::ZERO, || {
                calls.set(calls.get() + 1);
                Err(lock_err())
            });
        assert!(result.unwrap_err().is_schema_lock(), "Exhaustion returns the lock error");
        assert_eq!(
            calls.get(),
            SCHEMA_LOCK_ATTEMPTS,
            "Must stop at the attempt budget, never a 6th attempt"
        );
    }

    #[test]
    fn non_lock_errors_are_not_retried() {
        let calls = Cell::new(0u32);
        let result: Result<(), _> =
            with_schema_lock_retry("DTWPoint", SCHEMA_LOCK_ATTEMPTS, Duration::ZERO, || {
                calls.set(calls.get() + 1);
                Err(StoreError::NotFound("DTWPoint".to_string()))
            });
        assert!(matches!(result.unwrap_err(), StoreError::NotFound(_)));
        assert_eq!(calls.get(), 1, "Non-transient errors must propagate immediately");
    }

    #[test]
    fn first_try_success_needs_no_retry() {
        let calls = Cell::new(0u32);
        let result = with_schema_lock_retry("DTWPoint", SCHEMA_LOCK_ATTEMPTS, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            Ok(())
        });
        assert!(result.is_ok());
        assert_eq!(calls.get(), 1);
    }
}
