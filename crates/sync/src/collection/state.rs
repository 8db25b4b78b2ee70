//! Per-key state machine of a client-side collection
//!
//! Every key is in exactly one state:
//!
//! ```text
//!             add issued              add confirmed
//!   (absent) ───────────> PendingAdd ───────────────> Committed
//!       ^                     │ add failed                │ remove issued
//!       └─────────────────────┘                           v
//!       ^            remove confirmed / not found   PendingRemove
//!       └─────────────────────────────────────────────────┤
//!                    Committed <──────────────────────────┘ remove failed
//! ```
//!
//! A toggle on a key whose request is still in flight is queued on the entry
//! (`then_remove` / `then_add`) and sent once the first request completes.
//! `contains` reports the latest intent; `items` lists only `Committed` records.
//! All merges are keyed, never positional, so completions may arrive in any order.
//!
//! Confirmed mutations are stamped with a sequence number while a fetch is in
//! flight. A fetch response only overrides keys that were not confirmed after
//! the fetch was issued.

use crate::record::CollectionRecord;
use serde::Serialize;

/// State of one key
#[derive(Debug, Clone)]
pub enum EntryState<R: CollectionRecord> {
    Committed(R),
    PendingAdd {
        /// A remove was requested while the add was in flight
        then_remove: bool,
    },
    PendingRemove {
        /// Restored on rollback
        kept: R,
        /// An add was requested while the remove was in flight
        then_add: Option<R::Draft>,
    },
}

impl<R: CollectionRecord> EntryState<R> {
    /// Whether the key is present once every queued request has landed
    pub fn intends_present(&self) -> bool {
        match self {
            EntryState::Committed(_) => true,
            EntryState::PendingAdd { then_remove } => !then_remove,
            EntryState::PendingRemove { then_add, .. } => then_add.is_some(),
        }
    }

    pub fn is_pending(&self) -> bool {
        !matches!(self, EntryState::Committed(_))
    }
}

/// Result of requesting an add or remove on a key
#[derive(Debug, PartialEq)]
pub(crate) enum Begin<T> {
    /// No request in flight for the key; send this one now
    Send(T),
    /// A request is in flight; this one runs after it
    Queued,
    /// The key already has the requested outcome
    Noop,
}

#[derive(Debug, Clone)]
struct Entry<R: CollectionRecord> {
    key: R::Key,
    state: EntryState<R>,
}

/// Server-confirmed outcome of a mutation, kept while fetches are in flight
#[derive(Debug, Clone)]
struct Confirmation<R: CollectionRecord> {
    seq: u64,
    key: R::Key,
    /// `None` for a confirmed remove
    record: Option<R>,
}

/// Point-in-time view of a collection handed to the UI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionState<R> {
    pub items: Vec<R>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub owner_identity: Option<String>,
}

/// Mutable collection state guarded by the manager's lock
#[derive(Debug)]
pub(crate) struct CollectionEntries<R: CollectionRecord> {
    entries: Vec<Entry<R>>,
    owner: Option<String>,
    /// Bumped on every owner change; completions compare it to detect staleness
    epoch: u64,
    in_flight_fetches: usize,
    /// Bumped on every confirmed add or remove
    mutation_seq: u64,
    confirmations: Vec<Confirmation<R>>,
    error: Option<String>,
}

impl<R: CollectionRecord> CollectionEntries<R> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            owner: None,
            epoch: 0,
            in_flight_fetches: 0,
            mutation_seq: 0,
            confirmations: Vec::new(),
            error: None,
        }
    }

    pub(crate) fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    /// Switch owner, dropping everything that belonged to the previous one
    pub(crate) fn reset(&mut self, owner: Option<String>) -> Option<String> {
        self.entries.clear();
        self.confirmations.clear();
        self.error = None;
        self.in_flight_fetches = 0;
        self.epoch += 1;
        std::mem::replace(&mut self.owner, owner)
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.in_flight_fetches > 0
    }

    /// Returns the mutation sequence the fetch response will be compared against
    pub(crate) fn begin_fetch(&mut self) -> u64 {
        self.in_flight_fetches += 1;
        self.mutation_seq
    }

    pub(crate) fn end_fetch(&mut self) {
        self.in_flight_fetches = self.in_flight_fetches.saturating_sub(1);
        if self.in_flight_fetches == 0 {
            self.confirmations.clear();
        }
    }

    pub(crate) fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }

    fn position(&self, key: &R::Key) -> Option<usize> {
        self.entries.iter().position(|e| &e.key == key)
    }

    pub(crate) fn state_of(&self, key: &R::Key) -> Option<&EntryState<R>> {
        self.entries
            .iter()
            .find(|e| &e.key == key)
            .map(|e| &e.state)
    }

    pub(crate) fn contains(&self, key: &R::Key) -> bool {
        self.state_of(key)
            .map(EntryState::intends_present)
            .unwrap_or(false)
    }

    /// Committed records in order
    pub(crate) fn items(&self) -> Vec<R> {
        self.entries
            .iter()
            .filter_map(|e| match &e.state {
                EntryState::Committed(record) => Some(record.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn begin_add(&mut self, draft: &R::Draft) -> Begin<()> {
        let key = R::draft_key(draft);
        let Some(idx) = self.position(&key) else {
            self.entries.push(Entry {
                key,
                state: EntryState::PendingAdd { then_remove: false },
            });
            return Begin::Send(());
        };

        match &mut self.entries[idx].state {
            EntryState::PendingAdd { then_remove } if *then_remove => {
                *then_remove = false;
                Begin::Queued
            }
            EntryState::PendingRemove { then_add, .. } if then_add.is_none() => {
                *then_add = Some(draft.clone());
                Begin::Queued
            }
            _ => Begin::Noop,
        }
    }

    /// Store the confirmed record, appended at the end unless already committed
    ///
    /// Returns the record if a remove was queued behind the add; the entry is
    /// then `PendingRemove` and the caller sends the remove.
    pub(crate) fn confirm_add(&mut self, key: &R::Key, record: R) -> Option<R> {
        self.note_confirmed(key, Some(record.clone()));
        match self.position(key) {
            Some(idx) => match self.entries[idx].state {
                EntryState::PendingAdd { then_remove: true } => {
                    self.entries[idx].state = EntryState::PendingRemove {
                        kept: record.clone(),
                        then_add: None,
                    };
                    Some(record)
                }
                EntryState::PendingAdd { then_remove: false } => {
                    self.entries.remove(idx);
                    self.push_committed(record);
                    None
                }
                EntryState::Committed(_) => {
                    self.entries[idx].state = EntryState::Committed(record);
                    None
                }
                EntryState::PendingRemove { .. } => None,
            },
            None => {
                self.push_committed(record);
                None
            }
        }
    }

    /// Drop the pending add; returns true if a remove was queued behind it,
    /// which the failed add already satisfies
    pub(crate) fn abort_add(&mut self, key: &R::Key) -> bool {
        let Some(idx) = self.position(key) else {
            return false;
        };
        match self.entries[idx].state {
            EntryState::PendingAdd { then_remove } => {
                self.entries.remove(idx);
                then_remove
            }
            _ => false,
        }
    }

    /// Committed key becomes `PendingRemove` and the record is returned for the request
    pub(crate) fn begin_remove(&mut self, key: &R::Key) -> Begin<R> {
        let Some(idx) = self.position(key) else {
            return Begin::Noop;
        };

        let entry = &mut self.entries[idx];
        match &mut entry.state {
            EntryState::Committed(record) => {
                let record = record.clone();
                entry.state = EntryState::PendingRemove {
                    kept: record.clone(),
                    then_add: None,
                };
                Begin::Send(record)
            }
            EntryState::PendingAdd { then_remove } if !*then_remove => {
                *then_remove = true;
                Begin::Queued
            }
            EntryState::PendingRemove { then_add, .. } if then_add.is_some() => {
                *then_add = None;
                Begin::Queued
            }
            _ => Begin::Noop,
        }
    }

    /// Drop the removed entry
    ///
    /// Returns the draft if an add was queued behind the remove; the entry is
    /// then `PendingAdd` and the caller sends the add.
    pub(crate) fn confirm_remove(&mut self, key: &R::Key) -> Option<R::Draft> {
        self.note_confirmed(key, None);
        let idx = self.position(key)?;
        let EntryState::PendingRemove { then_add, .. } = &mut self.entries[idx].state else {
            return None;
        };
        match then_add.take() {
            Some(draft) => {
                self.entries[idx].state = EntryState::PendingAdd { then_remove: false };
                Some(draft)
            }
            None => {
                self.entries.remove(idx);
                None
            }
        }
    }

    /// Set-union reinsertion: never produces a second entry for the key
    ///
    /// Returns true if an add was queued behind the remove, which the
    /// restored record already satisfies.
    pub(crate) fn rollback_remove(&mut self, record: R) -> bool {
        let key = record.key();
        match self.position(&key) {
            Some(idx) => match &self.entries[idx].state {
                EntryState::PendingRemove { kept, then_add } => {
                    let queued = then_add.is_some();
                    self.entries[idx].state = EntryState::Committed(kept.clone());
                    queued
                }
                _ => false,
            },
            None => {
                self.push_committed(record);
                false
            }
        }
    }

    /// Replace committed records wholesale with the server list
    ///
    /// `since` is the mutation sequence captured when the fetch was issued.
    /// Mutations confirmed after it win over the listed records. Keys with an
    /// operation in flight keep their pending state so the completion still
    /// finds them.
    pub(crate) fn replace_committed(&mut self, records: Vec<R>, since: u64) {
        let pending: Vec<Entry<R>> = self
            .entries
            .drain(..)
            .filter(|e| e.state.is_pending())
            .collect();

        let mut next: Vec<Entry<R>> = Vec::with_capacity(records.len() + pending.len());
        for record in records {
            let key = record.key();
            if next.iter().any(|e| e.key == key) {
                continue;
            }
            next.push(Entry {
                key,
                state: EntryState::Committed(record),
            });
        }

        for confirmation in self.confirmations.iter().filter(|c| c.seq > since) {
            let idx = next.iter().position(|e| e.key == confirmation.key);
            match (idx, &confirmation.record) {
                (Some(idx), None) => {
                    next.remove(idx);
                }
                (None, Some(record)) => next.push(Entry {
                    key: confirmation.key.clone(),
                    state: EntryState::Committed(record.clone()),
                }),
                _ => {}
            }
        }

        for Entry { key, state } in pending {
            let idx = next.iter().position(|e| e.key == key);
            match (idx, state) {
                (Some(idx), EntryState::PendingRemove { kept, then_add }) => {
                    let kept = match &next[idx].state {
                        EntryState::Committed(fresh) => fresh.clone(),
                        _ => kept,
                    };
                    next[idx].state = EntryState::PendingRemove { kept, then_add };
                }
                // The add completion commits the confirmed record
                (Some(idx), state) => next[idx].state = state,
                (None, state) => next.push(Entry { key, state }),
            }
        }

        self.entries = next;
    }

    pub(crate) fn snapshot(&self) -> CollectionState<R> {
        CollectionState {
            items: self.items(),
            is_loading: self.is_loading(),
            error: self.error.clone(),
            owner_identity: self.owner.clone(),
        }
    }

    fn note_confirmed(&mut self, key: &R::Key, record: Option<R>) {
        self.mutation_seq += 1;
        if self.in_flight_fetches > 0 {
            self.confirmations.push(Confirmation {
                seq: self.mutation_seq,
                key: key.clone(),
                record,
            });
        }
    }

    fn push_committed(&mut self, record: R) {
        self.entries.push(Entry {
            key: record.key(),
            state: EntryState::Committed(record),
        });
    }
}
