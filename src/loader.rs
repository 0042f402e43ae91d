use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::store::{RecordSink, StoreError};

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("{path} must contain a top-level JSON array")]
    NotAnArray { path: String },
    #[error("record {index} in {path} is not a JSON object")]
    NotAnObject { path: String, index: usize },
}

/// Parse the input file as an array of JSON objects. Anything else is a
/// fatal error, reported before any network I/O happens.
pub fn read_records(path: &Path) -> Result<Vec<Map<String, Value>>, LoaderError> {
    let display = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| LoaderError::Read {
        path: display.clone(),
        source,
    })?;
    let parsed: Value = serde_json::from_str(&contents).map_err(|source| LoaderError::Parse {
        path: display.clone(),
        source,
    })?;

    let Value::Array(items) = parsed else {
        return Err(LoaderError::NotAnArray { path: display });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            _ => Err(LoaderError::NotAnObject {
                path: display.clone(),
                index,
            }),
        })
        .collect()
}

/// Drop any `id` key so the store assigns its own surrogate key. Re-running
/// the loader against regenerated input must not collide with stale ids.
pub fn strip_ids(records: &mut [Map<String, Value>]) {
    for record in records.iter_mut() {
        record.remove("id");
    }
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub succeeded: usize,
    pub failed: Vec<FailedRecord>,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len()
    }
}

#[derive(Debug)]
pub struct FailedRecord {
    pub record: Map<String, Value>,
    pub reason: String,
}

/// Upsert every record, collecting per-row outcomes. Row-level rejections
/// are recorded and skipped; a transport failure means the store cannot be
/// reached and aborts the whole run.
pub async fn load_records<S: RecordSink>(
    sink: &S,
    records: Vec<Map<String, Value>>,
) -> Result<LoadReport, StoreError> {
    let mut report = LoadReport::default();

    for (index, record) in records.into_iter().enumerate() {
        match sink.upsert(&record).await {
            Ok(()) => {
                info!(index, "upserted record");
                report.succeeded += 1;
            }
            Err(e @ StoreError::Rejected { .. }) => {
                warn!(index, error = %e, "record rejected, skipping");
                report.failed.push(FailedRecord {
                    record,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}
