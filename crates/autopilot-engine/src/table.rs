//! In-memory registry of work items that currently have an agent session.
//!
//! A slot is either *pending* (a launch holds a [`Reservation`] for it) or
//! *active* (a [`SessionRecord`] exists). Claiming a slot is a single atomic
//! map operation, so concurrent launches for one work item cannot both pass
//! the "already active" check. Pending slots are invisible to readers of
//! records ([`SessionTable::get`], [`SessionTable::snapshot`]).

use std::collections::BTreeMap;
use std::sync::Arc;

use autopilot_core::{SessionName, SessionRecord, SessionStatus, WorkItemId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

#[derive(Debug)]
enum Slot {
    Pending,
    Active(SessionRecord),
}

/// Shared session registry. Cloning yields another handle to the same table.
#[derive(Clone, Debug, Default)]
pub struct SessionTable {
    slots: Arc<DashMap<WorkItemId, Slot>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `work_item`, or `None` if it is pending or active.
    pub fn try_reserve(&self, work_item: &WorkItemId) -> Option<Reservation> {
        match self.slots.entry(work_item.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                vacant.insert(Slot::Pending);
                Some(Reservation {
                    table: self.clone(),
                    work_item: work_item.clone(),
                    committed: false,
                })
            }
        }
    }

    /// True if the item is being launched or has a record.
    pub fn is_claimed(&self, work_item: &WorkItemId) -> bool {
        self.slots.contains_key(work_item)
    }

    pub fn get(&self, work_item: &WorkItemId) -> Option<SessionRecord> {
        match self.slots.get(work_item)?.value() {
            Slot::Active(record) => Some(record.clone()),
            Slot::Pending => None,
        }
    }

    /// True if `work_item` maps to an active record for `session`.
    pub fn is_current(&self, work_item: &WorkItemId, session: &SessionName) -> bool {
        self.slots.get(work_item).is_some_and(|slot| match slot.value() {
            Slot::Active(record) => record.session_name() == session,
            Slot::Pending => false,
        })
    }

    /// Mark the record for `session` as ended. Returns false if the item no
    /// longer maps to that session.
    pub fn mark_ended(&self, work_item: &WorkItemId, session: &SessionName) -> bool {
        match self.slots.get_mut(work_item) {
            Some(mut slot) => match slot.value_mut() {
                Slot::Active(record) if record.session_name() == session => {
                    record.status = SessionStatus::Ended;
                    true
                }
                _ => false,
            },
            None => false,
        }
    }

    /// Remove the active record for `work_item` if it belongs to `session`.
    pub fn remove_session(&self, work_item: &WorkItemId, session: &SessionName) -> Option<SessionRecord> {
        let (_, slot) = self.slots.remove_if(work_item, |_, slot| {
            matches!(slot, Slot::Active(record) if record.session_name() == session)
        })?;
        match slot {
            Slot::Active(record) => Some(record),
            Slot::Pending => None,
        }
    }

    /// Number of active records.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot.value(), Slot::Active(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of all active records, ordered by work-item id.
    pub fn snapshot(&self) -> BTreeMap<WorkItemId, SessionRecord> {
        self.slots
            .iter()
            .filter_map(|slot| match slot.value() {
                Slot::Active(record) => Some((slot.key().clone(), record.clone())),
                Slot::Pending => None,
            })
            .collect()
    }
}

/// Exclusive claim on a table slot held while a launch is in flight.
///
/// Dropping an uncommitted reservation frees the slot again.
#[derive(Debug)]
pub struct Reservation {
    table: SessionTable,
    work_item: WorkItemId,
    committed: bool,
}

impl Reservation {
    pub fn work_item(&self) -> &WorkItemId {
        &self.work_item
    }

    /// Turn the pending slot into an active record.
    pub fn commit(mut self, record: SessionRecord) {
        self.table
            .slots
            .insert(self.work_item.clone(), Slot::Active(record));
        self.committed = true;
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if !self.committed {
            let _ = self
                .table
                .slots
                .remove_if(&self.work_item, |_, slot| matches!(slot, Slot::Pending));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autopilot_core::SessionHandle;

    fn id(s: &str) -> WorkItemId {
        WorkItemId::from_raw(s)
    }

    fn record(item: &str, session: &str) -> SessionRecord {
        SessionRecord::running(
            id(item),
            "title",
            SessionHandle::new(SessionName::from_raw(session), Some(1)),
        )
    }

    #[test]
    fn reserve_is_exclusive() {
        let table = SessionTable::new();
        let first = table.try_reserve(&id("ENG-1"));
        assert!(first.is_some());
        assert!(table.try_reserve(&id("ENG-1")).is_none());
        assert!(table.try_reserve(&id("ENG-2")).is_some());
    }

    #[test]
    fn pending_slots_are_hidden() {
        let table = SessionTable::new();
        let _reservation = table.try_reserve(&id("ENG-1")).unwrap();
        assert!(table.is_claimed(&id("ENG-1")));
        assert!(table.get(&id("ENG-1")).is_none());
        assert!(table.snapshot().is_empty());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn dropped_reservation_frees_slot() {
        let table = SessionTable::new();
        drop(table.try_reserve(&id("ENG-1")).unwrap());
        assert!(!table.is_claimed(&id("ENG-1")));
        assert!(table.try_reserve(&id("ENG-1")).is_some());
    }

    #[test]
    fn committed_reservation_becomes_record() {
        let table = SessionTable::new();
        let reservation = table.try_reserve(&id("ENG-1")).unwrap();
        reservation.commit(record("ENG-1", "s1"));

        let stored = table.get(&id("ENG-1")).unwrap();
        assert_eq!(stored.session_name().as_str(), "s1");
        assert_eq!(table.len(), 1);
        assert!(table.try_reserve(&id("ENG-1")).is_none());
    }

    #[test]
    fn mark_ended_only_touches_matching_session() {
        let table = SessionTable::new();
        table.try_reserve(&id("ENG-1")).unwrap().commit(record("ENG-1", "s1"));

        assert!(!table.mark_ended(&id("ENG-1"), &SessionName::from_raw("s0")));
        assert_eq!(table.get(&id("ENG-1")).unwrap().status, SessionStatus::Running);

        assert!(table.mark_ended(&id("ENG-1"), &SessionName::from_raw("s1")));
        assert_eq!(table.get(&id("ENG-1")).unwrap().status, SessionStatus::Ended);
        assert!(!table.mark_ended(&id("ENG-9"), &SessionName::from_raw("s1")));
    }

    #[test]
    fn remove_session_is_idempotent() {
        let table = SessionTable::new();
        table.try_reserve(&id("ENG-1")).unwrap().commit(record("ENG-1", "s1"));
        let s1 = SessionName::from_raw("s1");

        assert!(table.remove_session(&id("ENG-1"), &SessionName::from_raw("other")).is_none());
        assert!(table.remove_session(&id("ENG-1"), &s1).is_some());
        assert!(table.remove_session(&id("ENG-1"), &s1).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn remove_session_leaves_pending_slot() {
        let table = SessionTable::new();
        let _reservation = table.try_reserve(&id("ENG-1")).unwrap();
        assert!(table.remove_session(&id("ENG-1"), &SessionName::from_raw("s1")).is_none());
        assert!(table.is_claimed(&id("ENG-1")));
    }

    #[test]
    fn snapshot_is_ordered() {
        let table = SessionTable::new();
        for item in ["ENG-3", "ENG-1", "ENG-2"] {
            table.try_reserve(&id(item)).unwrap().commit(record(item, item));
        }
        let keys: Vec<String> = table.snapshot().keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["ENG-1", "ENG-2", "ENG-3"]);
    }

    #[test]
    fn clones_share_state() {
        let table = SessionTable::new();
        let other = table.clone();
        table.try_reserve(&id("ENG-1")).unwrap().commit(record("ENG-1", "s1"));
        assert_eq!(other.len(), 1);
    }
}
