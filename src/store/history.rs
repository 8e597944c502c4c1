use crate::store::kv::KvStore;
use crate::store::schema::{HistoryData, HistoryRecord, SCHEMA_VERSION, StoredHistory};

/// Fixed namespace the leaderboard is stored under.
pub const STORAGE_KEY: &str = "yomifall_history";

/// Maximum number of records kept.
pub const MAX_RECORDS: usize = 10;

/// Fastest-first leaderboard of finished rounds.
///
/// History is not gameplay-critical: unreadable or malformed data reads as
/// an empty list and failed writes are logged and dropped.
pub struct HistoryStore<S: KvStore> {
    kv: S,
}

impl<S: KvStore> HistoryStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn list(&self) -> Vec<HistoryRecord> {
        let raw = match self.kv.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("history read failed: {e:#}");
                return Vec::new();
            }
        };
        match serde_json::from_str::<StoredHistory>(&raw) {
            Ok(stored) => {
                let mut records = stored.into_records();
                records.sort_by_key(|r| r.elapsed_ms);
                records.truncate(MAX_RECORDS);
                records
            }
            Err(e) => {
                log::warn!("history payload malformed, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    /// Insert `entry`, keep the fastest `MAX_RECORDS`, persist.
    ///
    /// A new record ranks ahead of existing records with the same time.
    /// Returns its 1-based rank, or `None` if it did not make the cut.
    pub fn record(&self, entry: HistoryRecord) -> Option<usize> {
        let records = self.list();
        let (records, rank) = insert_ranked(records, entry);

        let data = HistoryData {
            schema_version: SCHEMA_VERSION,
            records,
        };
        match serde_json::to_string_pretty(&data) {
            Ok(json) => {
                if let Err(e) = self.kv.set(STORAGE_KEY, &json) {
                    log::warn!("history write failed: {e:#}");
                }
            }
            Err(e) => log::warn!("history serialize failed: {e}"),
        }
        rank
    }
}

fn insert_ranked(
    mut records: Vec<HistoryRecord>,
    entry: HistoryRecord,
) -> (Vec<HistoryRecord>, Option<usize>) {
    let pos = records
        .iter()
        .position(|r| entry.elapsed_ms <= r.elapsed_ms)
        .unwrap_or(records.len());
    records.insert(pos, entry);
    records.truncate(MAX_RECORDS);
    let rank = (pos < MAX_RECORDS).then_some(pos + 1);
    (records, rank)
}
