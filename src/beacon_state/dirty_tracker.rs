use std::collections::{BTreeSet, HashMap, HashSet};

/// Addressable state fields, as seen by the dirty tracker and the Merkle
/// layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeaconStateField {
    Validators,
    Balances,
    Slashings,
    InactivityScores,
    RandaoMixes,
    Eth1Data,
    Eth1DataVotes,
    Eth1DepositIndex,
    CurrentSyncCommittee,
    NextSyncCommittee,
    NextWithdrawalIndex,
    NextWithdrawalValidatorIndex,
}

/// Records which fields changed since the Merkle layer last drained.
///
/// A field replaced wholesale carries the rebuild flag; a field mutated at
/// specific positions enumerates those positions instead, so the Merkle
/// layer can recompute single leaves.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    dirty_fields: HashSet<BeaconStateField>,
    dirty_indices: HashMap<BeaconStateField, BTreeSet<u64>>,
    rebuild_trie: HashSet<BeaconStateField>,
}

impl DirtyTracker {
    /// Marks a field as changed. Idempotent.
    pub fn mark_field_dirty(&mut self, field: BeaconStateField) {
        self.dirty_fields.insert(field);
    }

    /// Adds element positions that changed within `field`, keeping whatever
    /// was already recorded.
    pub fn add_dirty_indices(&mut self, field: BeaconStateField, indices: &[u64]) {
        self.dirty_indices
            .entry(field)
            .or_default()
            .extend(indices.iter().copied());
    }

    /// Requests (or cancels) a full subtree rebuild for `field`.
    pub fn set_rebuild_trie(&mut self, field: BeaconStateField, rebuild: bool) {
        if rebuild {
            self.rebuild_trie.insert(field);
        } else {
            self.rebuild_trie.remove(&field);
        }
    }

    pub fn is_dirty(&self, field: BeaconStateField) -> bool {
        self.dirty_fields.contains(&field)
    }

    pub fn dirty_indices(&self, field: BeaconStateField) -> Option<&BTreeSet<u64>> {
        self.dirty_indices.get(&field)
    }

    pub fn needs_rebuild(&self, field: BeaconStateField) -> bool {
        self.rebuild_trie.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.dirty_fields.is_empty() && self.dirty_indices.is_empty() && self.rebuild_trie.is_empty()
    }

    /// Hands the accumulated change set to the Merkle layer, leaving the
    /// tracker empty.
    pub fn drain(&mut self) -> DirtySnapshot {
        DirtySnapshot {
            dirty_fields: std::mem::take(&mut self.dirty_fields),
            dirty_indices: std::mem::take(&mut self.dirty_indices),
            rebuild_trie: std::mem::take(&mut self.rebuild_trie),
        }
    }
}

/// One drained change set. Index sets are ordered so leaves are visited in
/// position order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtySnapshot {
    pub dirty_fields: HashSet<BeaconStateField>,
    pub dirty_indices: HashMap<BeaconStateField, BTreeSet<u64>>,
    pub rebuild_trie: HashSet<BeaconStateField>,
}

impl DirtySnapshot {
    pub fn is_empty(&self) -> bool {
        self.dirty_fields.is_empty() && self.dirty_indices.is_empty() && self.rebuild_trie.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marking_is_idempotent() {
        let mut tracker = DirtyTracker::default();
        tracker.mark_field_dirty(BeaconStateField::Balances);
        let once = tracker.clone().drain();
        tracker.mark_field_dirty(BeaconStateField::Balances);
        assert_eq!(tracker.drain(), once);
    }

    #[test]
    fn indices_union() {
        let mut tracker = DirtyTracker::default();
        tracker.add_dirty_indices(BeaconStateField::Validators, &[3, 1]);
        tracker.add_dirty_indices(BeaconStateField::Validators, &[1, 7]);
        let indices = tracker
            .dirty_indices(BeaconStateField::Validators)
            .unwrap()
            .iter()
            .copied()
            .collect::<Vec<_>>();
        assert_eq!(indices, vec![1, 3, 7]);
    }

    #[test]
    fn rebuild_flag_toggles() {
        let mut tracker = DirtyTracker::default();
        tracker.set_rebuild_trie(BeaconStateField::RandaoMixes, true);
        assert!(tracker.needs_rebuild(BeaconStateField::RandaoMixes));
        tracker.set_rebuild_trie(BeaconStateField::RandaoMixes, false);
        assert!(!tracker.needs_rebuild(BeaconStateField::RandaoMixes));
    }

    #[test]
    fn drain_empties_the_tracker() {
        let mut tracker = DirtyTracker::default();
        tracker.mark_field_dirty(BeaconStateField::Eth1DataVotes);
        tracker.add_dirty_indices(BeaconStateField::Eth1DataVotes, &[0]);
        tracker.set_rebuild_trie(BeaconStateField::RandaoMixes, true);

        let snapshot = tracker.drain();
        assert!(snapshot.dirty_fields.contains(&BeaconStateField::Eth1DataVotes));
        assert!(snapshot.rebuild_trie.contains(&BeaconStateField::RandaoMixes));
        assert!(tracker.is_empty());
        assert!(tracker.drain().is_empty());
    }
}
