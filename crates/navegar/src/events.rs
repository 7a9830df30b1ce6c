//! Ordered capture of page events during a load window.
//!
//! Listener tasks append records in arrival order; nothing is dropped or
//! reordered. Collection stops at an explicit cutoff (the settle-timer
//! expiry), at which point the listener task is aborted and the log is
//! drained.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::task::JoinHandle;

/// One network request observed during page load.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRequestRecord {
    /// HTTP method
    pub method: String,
    /// Request URL
    pub url: String,
    /// Resource type as reported by the browser (lowercase)
    pub resource_type: String,
    /// Request headers
    pub headers: serde_json::Value,
}

/// Source position of a console message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleLocation {
    /// Script URL
    pub url: String,
    /// Zero-based line number
    pub line_number: i64,
    /// Zero-based column number
    pub column_number: i64,
}

/// One console message observed during page load.
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleMessageRecord {
    /// Message severity (log, info, warning, error, ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Message text, arguments joined with spaces
    pub text: String,
    /// Where the message was emitted, when the browser reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<ConsoleLocation>,
}

/// Append-only, ordered, shared event log.
#[derive(Debug)]
pub struct CaptureLog<T> {
    inner: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for CaptureLog<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> Default for CaptureLog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> CaptureLog<T> {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append a record, preserving arrival order
    pub fn push(&self, record: T) {
        if let Ok(mut records) = self.inner.lock() {
            records.push(record);
        }
    }

    /// Clone out everything collected so far
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of records collected so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether nothing has been collected yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A running capture: the log plus the listener task feeding it.
#[derive(Debug)]
pub struct CaptureHandle<T> {
    log: CaptureLog<T>,
    task: JoinHandle<()>,
}

impl<T: Clone> CaptureHandle<T> {
    /// Pair a log with the task appending to it
    #[must_use]
    pub fn new(log: CaptureLog<T>, task: JoinHandle<()>) -> Self {
        Self { log, task }
    }

    /// Cut off collection and drain the log.
    ///
    /// The listener task is aborted; records that arrived before the
    /// cutoff are returned in order.
    #[must_use]
    pub fn stop(self) -> Vec<T> {
        self.task.abort();
        self.log.snapshot()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let log = CaptureLog::new();
        log.push(1);
        log.push(2);
        log.push(3);
        assert_eq!(log.snapshot(), vec![1, 2, 3]);
    }

    #[test]
    fn test_clones_share_the_same_log() {
        let log = CaptureLog::new();
        let writer = log.clone();
        writer.push("a");
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_empty_log() {
        let log: CaptureLog<u8> = CaptureLog::new();
        assert!(log.is_empty());
        assert!(log.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_stop_aborts_task_and_drains() {
        let log = CaptureLog::new();
        let writer = log.clone();
        writer.push("before");
        let task = tokio::spawn(async {
            // never completes on its own
            std::future::pending::<()>().await;
        });
        let handle = CaptureHandle::new(log, task);
        let records = handle.stop();
        assert_eq!(records, vec!["before"]);
    }

    #[test]
    fn test_network_record_serializes_camel_case() {
        let record = NetworkRequestRecord {
            method: "GET".to_string(),
            url: "https://example.com/app.js".to_string(),
            resource_type: "script".to_string(),
            headers: serde_json::json!({ "accept": "*/*" }),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["resourceType"], "script");
        assert_eq!(json["method"], "GET");
    }

    #[test]
    fn test_console_record_renames_kind_to_type() {
        let record = ConsoleMessageRecord {
            kind: "warning".to_string(),
            text: "deprecated API".to_string(),
            location: Some(ConsoleLocation {
                url: "https://example.com/app.js".to_string(),
                line_number: 10,
                column_number: 4,
            }),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "warning");
        assert_eq!(json["location"]["lineNumber"], 10);
    }

    #[test]
    fn test_console_record_omits_missing_location() {
        let record = ConsoleMessageRecord {
            kind: "log".to_string(),
            text: "hello".to_string(),
            location: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("location").is_none());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_snapshot_preserves_push_order(
                records in proptest::collection::vec(any::<u32>(), 0..50)
            ) {
                let log = CaptureLog::new();
                for record in &records {
                    log.push(*record);
                }
                prop_assert_eq!(log.snapshot(), records);
            }
        }
    }
}
