//! Shared in-memory roster behind the admin console.
//!
//! Every write carries a stamp from a process-wide monotonic sequence. A
//! refresh records the sequence value current when its fetch started and the
//! merge skips any record stamped after that mark, so a refresh that raced a
//! local commit can never roll the commit back. Last writer wins by stamp,
//! not by arrival order.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::accounts::models::UserRecord;

const EVENT_BUFFER_CAPACITY: usize = 64;

/// Change-feed notification fanned out to SSE subscribers, already worded
/// for toast display.
#[derive(Debug, Clone, Serialize)]
pub struct RosterEvent {
    pub kind: &'static str,
    pub message: &'static str,
}

impl RosterEvent {
    pub fn created() -> Self {
        Self {
            kind: "created",
            message: "New user created. User list has been updated.",
        }
    }

    pub fn updated() -> Self {
        Self {
            kind: "updated",
            message: "User updated. User list has been refreshed.",
        }
    }

    pub fn deleted() -> Self {
        Self {
            kind: "deleted",
            message: "User deleted. User list has been updated.",
        }
    }

    pub fn refreshed() -> Self {
        Self {
            kind: "refreshed",
            message: "User list has been refreshed.",
        }
    }
}

#[derive(Debug, Clone)]
struct Stamped {
    record: UserRecord,
    stamp: u64,
}

pub struct Roster {
    next_sequence: AtomicU64,
    records: RwLock<HashMap<String, Stamped>>,
    demo: AtomicBool,
    loaded: AtomicBool,
    events: broadcast::Sender<RosterEvent>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

impl Roster {
    pub fn new() -> Self {
        let (events, _receiver) = broadcast::channel(EVENT_BUFFER_CAPACITY);
        Self {
            next_sequence: AtomicU64::new(0),
            records: RwLock::new(HashMap::new()),
            demo: AtomicBool::new(false),
            loaded: AtomicBool::new(false),
            events,
        }
    }

    fn next_stamp(&self) -> u64 {
        self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Sequence value at the start of a refresh fetch. Stamps handed out
    /// after this call are strictly greater.
    pub fn begin_refresh(&self) -> u64 {
        self.next_sequence.load(Ordering::SeqCst)
    }

    /// Merges a completed fetch into the roster. Records with a stamp newer
    /// than `mark` were committed while the fetch was in flight and are left
    /// alone, both against overwrites and against removal.
    pub fn complete_refresh(&self, rows: Vec<UserRecord>, mark: u64, demo: bool) {
        let mut records = self.records.write().expect("roster lock poisoned");
        let fetched_ids: HashSet<&str> = rows.iter().map(|r| r.id.as_str()).collect();

        records.retain(|id, stamped| fetched_ids.contains(id.as_str()) || stamped.stamp > mark);

        for record in rows {
            match records.get(&record.id) {
                Some(existing) if existing.stamp > mark => {}
                _ => {
                    records.insert(record.id.clone(), Stamped { record, stamp: mark });
                }
            }
        }

        self.demo.store(demo, Ordering::SeqCst);
        self.loaded.store(true, Ordering::SeqCst);
    }

    /// Inserts or replaces a record with a fresh stamp. Used after a
    /// confirmed commit, never speculatively.
    pub fn commit(&self, record: UserRecord) {
        let stamp = self.next_stamp();
        let mut records = self.records.write().expect("roster lock poisoned");
        records.insert(record.id.clone(), Stamped { record, stamp });
    }

    /// Applies a confirmed mutation to one record, restamping it. Returns
    /// the updated record, or `None` when the id is unknown.
    pub fn apply<F>(&self, id: &str, mutate: F) -> Option<UserRecord>
    where
        F: FnOnce(&mut UserRecord),
    {
        let stamp = self.next_stamp();
        let mut records = self.records.write().expect("roster lock poisoned");
        let stamped = records.get_mut(id)?;
        mutate(&mut stamped.record);
        stamped.stamp = stamp;
        Some(stamped.record.clone())
    }

    /// Current roster, newest first (ties broken by name for stable pages).
    pub fn snapshot(&self) -> Vec<UserRecord> {
        let records = self.records.read().expect("roster lock poisoned");
        let mut rows: Vec<UserRecord> = records.values().map(|s| s.record.clone()).collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        rows
    }

    pub fn ids(&self) -> HashSet<String> {
        let records = self.records.read().expect("roster lock poisoned");
        records.keys().cloned().collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        let records = self.records.read().expect("roster lock poisoned");
        records.contains_key(id)
    }

    pub fn is_demo(&self) -> bool {
        self.demo.load(Ordering::SeqCst)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RosterEvent> {
        self.events.subscribe()
    }

    /// Fan-out is best-effort: with no subscribers the event is dropped.
    pub fn publish(&self, event: RosterEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::models::BillingStatus;

    fn record(id: &str, name: &str) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{id}@x.com"),
            role: "user".to_string(),
            manager: "Unassigned".to_string(),
            status: BillingStatus::Unpaid,
            created_at: "2025-01-01".to_string(),
            last_login: None,
        }
    }

    #[test]
    fn refresh_populates_and_marks_loaded() {
        let roster = Roster::new();
        assert!(!roster.is_loaded());

        let mark = roster.begin_refresh();
        roster.complete_refresh(vec![record("a", "Alice"), record("b", "Bob")], mark, false);

        assert!(roster.is_loaded());
        assert!(!roster.is_demo());
        assert_eq!(roster.snapshot().len(), 2);
    }

    #[test]
    fn late_refresh_does_not_overwrite_a_newer_commit() {
        let roster = Roster::new();
        let mark = roster.begin_refresh();

        // A commit lands while the fetch is in flight.
        let mut edited = record("a", "Alice");
        edited.manager = "Robert Wilson".to_string();
        roster.commit(edited);

        // The fetch still carries the pre-edit owner.
        roster.complete_refresh(vec![record("a", "Alice")], mark, false);

        let rows = roster.snapshot();
        assert_eq!(rows[0].manager, "Robert Wilson");
    }

    #[test]
    fn refresh_removes_vanished_rows_but_keeps_newer_commits() {
        let roster = Roster::new();
        let mark = roster.begin_refresh();
        roster.complete_refresh(vec![record("old", "Old")], mark, false);

        let mark = roster.begin_refresh();
        roster.commit(record("new", "New"));
        roster.complete_refresh(vec![record("kept", "Kept")], mark, false);

        let ids = roster.ids();
        assert!(ids.contains("kept"));
        assert!(ids.contains("new"));
        assert!(!ids.contains("old"));
    }

    #[test]
    fn apply_restamps_and_returns_the_updated_record() {
        let roster = Roster::new();
        let mark = roster.begin_refresh();
        roster.complete_refresh(vec![record("a", "Alice")], mark, false);

        let updated = roster
            .apply("a", |r| r.status = BillingStatus::Paid)
            .unwrap();
        assert_eq!(updated.status, BillingStatus::Paid);
        assert!(roster.apply("missing", |_| {}).is_none());

        // A refresh from before the edit cannot roll it back.
        roster.complete_refresh(vec![record("a", "Alice")], mark, false);
        assert_eq!(roster.snapshot()[0].status, BillingStatus::Paid);
    }

    #[test]
    fn demo_flag_follows_the_latest_refresh() {
        let roster = Roster::new();
        let mark = roster.begin_refresh();
        roster.complete_refresh(Vec::new(), mark, true);
        assert!(roster.is_demo());

        let mark = roster.begin_refresh();
        roster.complete_refresh(vec![record("a", "Alice")], mark, false);
        assert!(!roster.is_demo());
    }

    #[test]
    fn snapshot_sorts_newest_first_then_by_name() {
        let roster = Roster::new();
        let mark = roster.begin_refresh();
        let mut older = record("a", "Zoe");
        older.created_at = "2024-06-01".to_string();
        roster.complete_refresh(
            vec![older, record("b", "Bob"), record("c", "Alice")],
            mark,
            false,
        );

        let names: Vec<String> = roster.snapshot().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Zoe"]);
    }

    #[test]
    fn events_reach_subscribers() {
        let roster = Roster::new();
        let mut rx = roster.subscribe();
        roster.publish(RosterEvent::created());
        let event = rx.try_recv().unwrap();
        assert_eq!(event.kind, "created");
    }
}
