/// JSONL request audit log
///
/// Append-only file of one JSON object per served request (type, request_id,
/// query, intent, top_k, timestamp). Thread-safe via an internal mutex.
/// Separate from tracing output: this is a durable record the service layer
/// can query, not operator logging.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::Value;

use crate::errors::ApiRankError;

pub struct AuditLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        AuditLog {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Append one entry, stamping `timestamp` if the caller did not.
    pub fn append(&self, entry: &Value) -> Result<(), ApiRankError> {
        let mut entry = entry.clone();
        if let Value::Object(map) = &mut entry {
            map.entry("timestamp".to_string())
                .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
        }

        let _guard = self.lock.lock().map_err(|_| {
            ApiRankError::Internal("audit log lock poisoned".to_string())
        })?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ApiRankError::Internal(format!("Failed to open audit log: {}", e)))?;
        writeln!(file, "{}", entry)
            .map_err(|e| ApiRankError::Internal(format!("Failed to write audit log: {}", e)))?;
        Ok(())
    }

    /// Read the most recent entries, newest first. Missing file is empty.
    pub fn read_recent(&self, limit: usize) -> Result<Vec<Value>, ApiRankError> {
        let _guard = self.lock.lock().map_err(|_| {
            ApiRankError::Internal("audit log lock poisoned".to_string())
        })?;
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ApiRankError::Internal(format!(
                    "Failed to read audit log: {}",
                    e
                )))
            }
        };

        let mut entries: Vec<Value> = BufReader::new(file)
            .lines()
            .filter_map(|l| l.ok())
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| serde_json::from_str(&l).ok())
            .collect();
        entries.sort_by(|a, b| {
            let ts = |v: &Value| v["timestamp"].as_str().unwrap_or("").to_string();
            ts(b).cmp(&ts(a))
        });
        entries.truncate(limit);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_log(name: &str) -> AuditLog {
        let mut path = std::env::temp_dir();
        path.push(format!("apirank-audit-{}-{}.jsonl", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        AuditLog::new(path)
    }

    #[test]
    fn test_append_and_read_back() {
        let log = temp_log("roundtrip");
        log.append(&json!({"type": "recommend", "request_id": "r1", "query": "q"}))
            .unwrap();
        log.append(&json!({"type": "ask", "request_id": "r2", "query": "q"}))
            .unwrap();

        let entries = log.read_recent(10).unwrap();
        assert_eq!(entries.len(), 2);
        for e in &entries {
            assert!(e["timestamp"].is_string());
        }
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let log = temp_log("missing");
        assert!(log.read_recent(10).unwrap().is_empty());
    }

    #[test]
    fn test_limit_truncates() {
        let log = temp_log("limit");
        for i in 0..5 {
            log.append(&json!({"type": "recommend", "request_id": format!("r{}", i)}))
                .unwrap();
        }
        assert_eq!(log.read_recent(3).unwrap().len(), 3);
    }
}
