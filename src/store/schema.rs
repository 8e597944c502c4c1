use serde::{Deserialize, Serialize};

use crate::quiz::options::Direction;

pub const SCHEMA_VERSION: u32 = 1;

/// One finished round on the leaderboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Local date, `YYYY-MM-DD`.
    pub date: String,
    #[serde(alias = "yomikaki")]
    pub mode: Direction,
    #[serde(alias = "gradeSet")]
    pub set_label: String,
    #[serde(alias = "timeMs")]
    pub elapsed_ms: u64,
}

impl HistoryRecord {
    pub fn today(mode: Direction, set_label: &str, elapsed_ms: u64) -> Self {
        Self {
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            mode,
            set_label: set_label.to_string(),
            elapsed_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryData {
    pub schema_version: u32,
    pub records: Vec<HistoryRecord>,
}

impl Default for HistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            records: Vec::new(),
        }
    }
}

/// Accepts the current layout and the bare array older builds wrote.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum StoredHistory {
    Current(HistoryData),
    Legacy(Vec<HistoryRecord>),
}

impl StoredHistory {
    pub(crate) fn into_records(self) -> Vec<HistoryRecord> {
        match self {
            StoredHistory::Current(data) => data.records,
            StoredHistory::Legacy(records) => records,
        }
    }
}
