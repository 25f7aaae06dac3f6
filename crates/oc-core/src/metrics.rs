//! Metrics sink: before/after sizes per engine call.
//!
//! The engine only appends. Ownership, persistence and reporting belong to the
//! caller that injects the sink.

use crate::types::{InputKind, TechniqueKind};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One processed call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub timestamp: DateTime<Utc>,
    pub input: InputKind,
    /// Command line, file path or search command that produced the input.
    pub label: String,
    pub techniques: Vec<TechniqueKind>,
    pub original_chars: usize,
    pub compacted_chars: usize,
}

impl MetricsRecord {
    pub fn new(
        input: InputKind,
        label: impl Into<String>,
        techniques: Vec<TechniqueKind>,
        original_chars: usize,
        compacted_chars: usize,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            input,
            label: label.into(),
            techniques,
            original_chars,
            compacted_chars,
        }
    }

    pub fn saved_chars(&self) -> usize {
        self.original_chars.saturating_sub(self.compacted_chars)
    }

    /// One JSONL entry for an external log writer.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Append-only sink shared by concurrent callers.
pub trait MetricsSink: Send + Sync {
    /// Atomically record one call.
    fn append(&self, record: MetricsRecord);

    /// Every record appended before this call returns.
    fn snapshot(&self) -> Vec<MetricsRecord>;

    fn clear(&self);
}

/// In-memory sink guarded by a mutex.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    records: Mutex<Vec<MetricsRecord>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl MetricsSink for InMemoryMetrics {
    fn append(&self, record: MetricsRecord) {
        self.records.lock().push(record);
    }

    fn snapshot(&self) -> Vec<MetricsRecord> {
        self.records.lock().clone()
    }

    fn clear(&self) {
        self.records.lock().clear();
    }
}

/// Aggregate view over a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub calls: usize,
    pub original_chars: usize,
    pub compacted_chars: usize,
    pub saved_chars: usize,
    pub technique_counts: BTreeMap<TechniqueKind, usize>,
}

impl MetricsSummary {
    pub fn from_records(records: &[MetricsRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            summary.calls += 1;
            summary.original_chars += record.original_chars;
            summary.compacted_chars += record.compacted_chars;
            summary.saved_chars += record.saved_chars();
            for kind in &record.techniques {
                *summary.technique_counts.entry(*kind).or_insert(0) += 1;
            }
        }
        summary
    }

    pub fn saved_pct(&self) -> f64 {
        if self.original_chars == 0 {
            return 0.0;
        }
        self.saved_chars as f64 / self.original_chars as f64 * 100.0
    }
}
