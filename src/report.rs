//! Fire-and-forget reporting of craft conditions.

use std::sync::Mutex;

use serde_json::Value;

// -------------------------------------------------------------------------------------------------

/// Receives structured reports about skipped content and failed segments. Reports are never
/// read back by the craft pipeline.
pub trait ReportSink: Send + Sync {
    fn put_report(&self, key: &str, data: Value);
}

// -------------------------------------------------------------------------------------------------

/// A [`ReportSink`] which drops all reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReportSink;

impl ReportSink for NullReportSink {
    fn put_report(&self, _key: &str, _data: Value) {
        // nothing to do
    }
}

// -------------------------------------------------------------------------------------------------

/// A [`ReportSink`] which collects all reports in memory.
#[derive(Debug, Default)]
pub struct MemoryReportSink {
    reports: Mutex<Vec<(String, Value)>>,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All reports so far, in the order they got put.
    pub fn reports(&self) -> Vec<(String, Value)> {
        match self.reports.lock() {
            Ok(reports) => reports.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// All reports with the given key.
    pub fn reports_of(&self, key: &str) -> Vec<Value> {
        self.reports()
            .into_iter()
            .filter_map(|(other, data)| (other == key).then_some(data))
            .collect()
    }
}

impl ReportSink for MemoryReportSink {
    fn put_report(&self, key: &str, data: Value) {
        let mut reports = match self.reports.lock() {
            Ok(reports) => reports,
            Err(poisoned) => poisoned.into_inner(),
        };
        reports.push((key.to_string(), data));
    }
}

// -------------------------------------------------------------------------------------------------
