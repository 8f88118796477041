use std::collections::HashMap;
use std::sync::Mutex;

use crate::types::{MatchRecord, PlayerAggregate};

/// Persistence seam for match records and rolling aggregates. Records are
/// keyed by (match ID, tracked summoner): two tracked players sharing a game
/// keep independent rows.
pub trait ProfileStore {
    /// Inserts placeholder rows for newly discovered match IDs. `match_ids`
    /// arrives newest-first, so discovery stops at the first ID that already
    /// has a row; everything older is known too.
    fn record_match_ids(&self, summoner: &str, match_ids: &[String]);

    /// Newest-first match IDs still missing their detail blob, capped at one
    /// fetch page.
    fn ids_needing_detail(&self, summoner: &str, limit: usize) -> Vec<String>;

    fn load_or_create_aggregate(&self, summoner: &str) -> PlayerAggregate;

    fn save_aggregate(&self, aggregate: PlayerAggregate);

    /// Populates the placeholder rows for a finished batch. A populated row is
    /// never overwritten, which is what makes a re-run idempotent.
    fn save_match_details(&self, records: Vec<MatchRecord>);

    fn match_record(&self, summoner: &str, match_id: &str) -> Option<MatchRecord>;

    /// Populated records newest-first (match IDs are chronological within a
    /// platform).
    fn matches_for(&self, summoner: &str) -> Vec<MatchRecord>;
}

/// In-memory store used by the CLI and the tests. The interior mutex keeps the
/// trait object shareable across the async callers.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<(String, String), MatchRecord>>,
    aggregates: Mutex<HashMap<String, PlayerAggregate>>,
}

impl ProfileStore for MemoryStore {
    fn record_match_ids(&self, summoner: &str, match_ids: &[String]) {
        let mut records = self.records.lock().unwrap();
        for match_id in match_ids {
            let key = (match_id.clone(), summoner.to_string());
            if records.contains_key(&key) {
                break;
            }
            records.insert(key, MatchRecord::placeholder(match_id, summoner));
        }
    }

    fn ids_needing_detail(&self, summoner: &str, limit: usize) -> Vec<String> {
        let records = self.records.lock().unwrap();
        let mut pending: Vec<String> = records
            .values()
            .filter(|r| r.summoner == summoner && !r.is_populated())
            .map(|r| r.match_id.clone())
            .collect();
        pending.sort_unstable_by(|a, b| b.cmp(a));
        pending.truncate(limit);
        pending
    }

    fn load_or_create_aggregate(&self, summoner: &str) -> PlayerAggregate {
        self.aggregates
            .lock()
            .unwrap()
            .get(summoner)
            .cloned()
            .unwrap_or_else(|| PlayerAggregate::new(summoner))
    }

    fn save_aggregate(&self, aggregate: PlayerAggregate) {
        self.aggregates
            .lock()
            .unwrap()
            .insert(aggregate.summoner.clone(), aggregate);
    }

    fn save_match_details(&self, incoming: Vec<MatchRecord>) {
        let mut records = self.records.lock().unwrap();
        for record in incoming {
            let key = (record.match_id.clone(), record.summoner.clone());
            let populated = records.get(&key).is_some_and(MatchRecord::is_populated);
            if !populated {
                records.insert(key, record);
            }
        }
    }

    fn match_record(&self, summoner: &str, match_id: &str) -> Option<MatchRecord> {
        self.records
            .lock()
            .unwrap()
            .get(&(match_id.to_string(), summoner.to_string()))
            .cloned()
    }

    fn matches_for(&self, summoner: &str) -> Vec<MatchRecord> {
        let records = self.records.lock().unwrap();
        let mut matches: Vec<MatchRecord> = records
            .values()
            .filter(|r| r.summoner == summoner && r.is_populated())
            .cloned()
            .collect();
        matches.sort_unstable_by(|a, b| b.match_id.cmp(&a.match_id));
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn discovery_stops_at_the_first_known_id() {
        let store = MemoryStore::default();
        store.record_match_ids("player", &ids(&["EUW1_30", "EUW1_20", "EUW1_10"]));
        assert_eq!(store.ids_needing_detail("player", 10).len(), 3);

        // newest-first page with one new game on top; the known EUW1_30 stops
        // the scan before the trailing new-looking ID is even considered
        store.record_match_ids("player", &ids(&["EUW1_40", "EUW1_30", "EUW1_99"]));
        let pending = store.ids_needing_detail("player", 10);
        assert_eq!(pending, ids(&["EUW1_40", "EUW1_30", "EUW1_20", "EUW1_10"]));
    }

    #[test]
    fn pending_ids_respect_the_page_limit() {
        let store = MemoryStore::default();
        store.record_match_ids("player", &ids(&["EUW1_3", "EUW1_2", "EUW1_1"]));
        let pending = store.ids_needing_detail("player", 2);
        assert_eq!(pending, ids(&["EUW1_3", "EUW1_2"]));
    }

    #[test]
    fn populated_records_are_never_overwritten() {
        let store = MemoryStore::default();
        store.record_match_ids("player", &ids(&["EUW1_1"]));

        let mut first = MatchRecord::placeholder("EUW1_1", "player");
        first.detail = json!({"info": {"gameId": 1}});
        store.save_match_details(vec![first]);

        let mut second = MatchRecord::placeholder("EUW1_1", "player");
        second.detail = json!({"info": {"gameId": 2}});
        store.save_match_details(vec![second]);

        let record = store.match_record("player", "EUW1_1").unwrap();
        assert_eq!(record.detail, json!({"info": {"gameId": 1}}));
        assert!(store.ids_needing_detail("player", 10).is_empty());
    }

    #[test]
    fn tracked_players_keep_independent_rows() {
        let store = MemoryStore::default();
        store.record_match_ids("alice", &ids(&["EUW1_1"]));
        store.record_match_ids("bob", &ids(&["EUW1_1"]));

        let mut record = MatchRecord::placeholder("EUW1_1", "alice");
        record.detail = json!({"info": {}});
        store.save_match_details(vec![record]);

        assert!(store.ids_needing_detail("alice", 10).is_empty());
        assert_eq!(store.ids_needing_detail("bob", 10), ids(&["EUW1_1"]));
    }

    #[test]
    fn match_listing_is_newest_first() {
        let store = MemoryStore::default();
        let mut records = Vec::new();
        for id in ["EUW1_1", "EUW1_3", "EUW1_2"] {
            let mut record = MatchRecord::placeholder(id, "player");
            record.detail = json!({"id": id});
            records.push(record);
        }
        store.save_match_details(records);
        let listed: Vec<String> = store
            .matches_for("player")
            .into_iter()
            .map(|r| r.match_id)
            .collect();
        assert_eq!(listed, ids(&["EUW1_3", "EUW1_2", "EUW1_1"]));
    }
}
