//! Abort registry: per-state abort-range entries with sticky fault bits.
//!
//! Built once from the abort table. Only the four monitored states carry
//! entries; every lookup for another state returns nothing. Each state keeps
//! its entries in table order with a dense key index for O(1) lookup.

use pod_common::abort::{AbortRangeEntry, AbortTable};
use pod_common::sensor::SensorKey;
use pod_common::state::PodState;

const MONITORED_COUNT: usize = PodState::MONITORED.len();

/// Entries for one monitored state.
#[derive(Debug, Clone)]
struct StateEntries {
    entries: Vec<(SensorKey, AbortRangeEntry)>,
    index: [Option<u8>; SensorKey::COUNT],
}

impl StateEntries {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: [None; SensorKey::COUNT],
        }
    }

    fn position(&self, key: SensorKey) -> Option<usize> {
        self.index[key.index()].map(usize::from)
    }
}

#[derive(Debug, Clone)]
pub struct AbortRegistry {
    states: [StateEntries; MONITORED_COUNT],
}

#[inline]
fn slot(state: PodState) -> Option<usize> {
    PodState::MONITORED.iter().position(|&s| s == state)
}

impl AbortRegistry {
    /// Registry with no entries.
    pub fn empty() -> Self {
        Self {
            states: core::array::from_fn(|_| StateEntries::new()),
        }
    }

    /// Expand table rows into per-state entries, preserving row order.
    ///
    /// The table loader already rejects duplicate labels, so each state holds
    /// at most one entry per key.
    pub fn from_table(table: &AbortTable) -> Self {
        let mut registry = Self::empty();
        for row in table.rows() {
            for state in PodState::MONITORED {
                if row.states.contains_state(state) {
                    registry.insert(state, row.key, row.entry);
                }
            }
        }
        registry
    }

    /// Add or replace the entry for `(state, key)`. Ignored for states that
    /// are not monitored.
    pub fn insert(&mut self, state: PodState, key: SensorKey, entry: AbortRangeEntry) {
        let Some(s) = slot(state) else {
            return;
        };
        let per_state = &mut self.states[s];
        match per_state.position(key) {
            Some(pos) => per_state.entries[pos].1 = entry,
            None => {
                per_state.index[key.index()] = Some(per_state.entries.len() as u8);
                per_state.entries.push((key, entry));
            }
        }
    }

    pub fn lookup(&self, state: PodState, key: SensorKey) -> Option<AbortRangeEntry> {
        let per_state = &self.states[slot(state)?];
        per_state.position(key).map(|pos| per_state.entries[pos].1)
    }

    /// Latch the fault bit. Returns `false` if no entry exists.
    pub fn mark_fault(&mut self, state: PodState, key: SensorKey) -> bool {
        let Some(s) = slot(state) else {
            return false;
        };
        let per_state = &mut self.states[s];
        match per_state.position(key) {
            Some(pos) => {
                per_state.entries[pos].1.fault = true;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_faulted(&self, state: PodState, key: SensorKey) -> bool {
        self.lookup(state, key).is_some_and(|e| e.fault)
    }

    /// Entries for `state` in configuration order.
    pub fn entries_for(
        &self,
        state: PodState,
    ) -> impl Iterator<Item = (SensorKey, &AbortRangeEntry)> + '_ {
        slot(state)
            .map(|s| self.states[s].entries.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|(k, e)| (*k, e))
    }

    /// Entries for `state` in configuration order, mutable.
    pub(crate) fn entries_for_mut(
        &mut self,
        state: PodState,
    ) -> impl Iterator<Item = (SensorKey, &mut AbortRangeEntry)> + '_ {
        let entries: &mut [(SensorKey, AbortRangeEntry)] = match slot(state) {
            Some(s) => self.states[s].entries.as_mut_slice(),
            None => &mut [],
        };
        entries.iter_mut().map(|(k, e)| (*k, e))
    }

    /// Total entries across all states.
    pub fn len(&self) -> usize {
        self.states.iter().map(|s| s.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AbortRegistry {
    fn default() -> Self {
        Self::empty()
    }
}
