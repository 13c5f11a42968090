//! Compute request parsing.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use lab_kpi_core::{PeriodInput, ProductivityRecord, TestRecord};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Request source meaning standard input.
pub const STDIN_SOURCE: &str = "-";

/// Request errors. All of these are the caller's to fix.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Failed to read request from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid request JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid request format: {0}")]
    InvalidFormat(String),
}

pub type RequestResult<T> = Result<T, RequestError>;

/// A single KPI computation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeRequest {
    pub period: PeriodInput,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tests: Vec<TestRecord>,
    #[serde(default)]
    pub productivity: Option<Vec<ProductivityRecord>>,
}

impl ComputeRequest {
    /// Number of productivity entries supplied (0 when absent).
    pub fn productivity_items(&self) -> usize {
        self.productivity.as_ref().map_or(0, Vec::len)
    }
}

/// Parse a request document.
pub fn parse_compute_request(json: &str) -> RequestResult<ComputeRequest> {
    let trimmed = json.trim();
    if trimmed.is_empty() {
        return Err(RequestError::InvalidFormat("Request is empty".into()));
    }
    if !trimmed.starts_with('{') {
        return Err(RequestError::InvalidFormat(
            "Request must be a JSON object".into(),
        ));
    }

    Ok(serde_json::from_str(trimmed)?)
}

/// Read a request from a file path, or from stdin when the source is `-`.
pub fn read_request(source: &str) -> RequestResult<ComputeRequest> {
    let raw = if source == STDIN_SOURCE {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| RequestError::Io {
                path: PathBuf::from("<stdin>"),
                source,
            })?;
        buf
    } else {
        fs::read_to_string(source).map_err(|e| RequestError::Io {
            path: PathBuf::from(source),
            source: e,
        })?
    };

    parse_compute_request(&raw)
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<TestRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<TestRecord>>::deserialize(deserializer)?.unwrap_or_default())
}
