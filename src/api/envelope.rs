use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::de::lenient_i64;
use crate::error::ConsoleError;

/// The `{ success, message, data, ... }` wrapper every backend endpoint returns
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    pub data: Option<T>,
    #[serde(rename = "totalCount", default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub pagination: Option<WirePagination>,
    #[serde(default)]
    pub upper_rate: Option<String>,
    #[serde(rename = "totalStats", default)]
    pub total_stats: Option<BTreeMap<String, Value>>,
    #[serde(rename = "affectedChildren", default)]
    pub affected_children: Vec<i64>,
    /// Top-level fields not covered above (menu counters live here)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WirePagination {
    #[serde(rename = "totalCount", default, deserialize_with = "lenient_i64")]
    pub total_count: i64,
}

impl<T> Envelope<T> {
    /// Converts `success: false` into a rejection carrying the server's own words
    pub fn into_result(self) -> Result<Self, ConsoleError> {
        if self.success {
            return Ok(self);
        }

        let message = self
            .message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "The request was rejected by the server".to_string());
        Err(ConsoleError::rejected(message))
    }

    pub fn data_or_default(self) -> T
    where
        T: Default,
    {
        self.data.unwrap_or_default()
    }

    /// Total row count from either the flat or the nested pagination field
    pub fn total(&self) -> u64 {
        self.total_count
            .or_else(|| self.pagination.as_ref().map(|p| p.total_count.max(0) as u64))
            .unwrap_or(0)
    }
}
