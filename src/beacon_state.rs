//! The versioned beacon state container.
//!
//! All mutable fields live behind one reader-writer lock. Composite fields
//! that state copies share sit behind `Arc`s: cloning the state bumps their
//! refcounts, and the first write to a shared buffer clones it
//! (`Arc::make_mut`), leaving every other holder untouched. Each mutation is
//! recorded in the dirty tracker so the Merkle layer can recompute only the
//! subtrees that changed: wholesale replacement raises the rebuild flag,
//! element-wise mutation enumerates the touched positions.

pub mod dirty_tracker;
pub mod pubkey_cache;
pub mod read_only_validator;

use crate::eth_spec::EthSpec;
use crate::fork_name::ForkName;
use crate::proto;
use crate::{Hash256, PublicKeyBytes, ValidatorIndex};
use parking_lot::RwLock;
use self::dirty_tracker::{BeaconStateField, DirtySnapshot, DirtyTracker};
use self::pubkey_cache::PubkeyCache;
use self::read_only_validator::ReadOnlyValidator;
use ssz_types::FixedVector;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by state accessors and setters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeaconStateError {
    #[error("index {0} out of range")]
    IndexOutOfRange(u64),
    #[error("index of {0} does not exist")]
    IndexDoesNotExist(u64),
    #[error("invalid index provided {0}")]
    InvalidIndex(u64),
    #[error("nil validators in state")]
    NilValidatorsInState,
    #[error("nil validator cannot be wrapped as read only")]
    NilValidator,
    #[error("{0} is not supported for {1}")]
    NotSupported(&'static str, ForkName),
}

type Validators = Vec<Option<proto::Validator>>;
type RandaoMixes<E> = FixedVector<Hash256, <E as EthSpec>::EpochsPerHistoricalVector>;
type Slashings<E> = FixedVector<u64, <E as EthSpec>::EpochsPerSlashingsVector>;

/// The mutable fields, all guarded by the state's lock. Methods on this type
/// assume the lock is held; they are reachable only through a guard.
#[derive(Debug, Clone)]
struct StateData<E: EthSpec> {
    validators: Option<Arc<Validators>>,
    balances: Option<Arc<Vec<u64>>>,
    slashings: Option<Arc<Slashings<E>>>,
    inactivity_scores: Option<Arc<Vec<u64>>>,
    randao_mixes: Option<Arc<RandaoMixes<E>>>,
    eth1_data: Option<proto::Eth1Data>,
    eth1_data_votes: Option<Arc<Vec<proto::Eth1Data>>>,
    eth1_deposit_index: u64,
    current_sync_committee: Option<proto::SyncCommittee>,
    next_sync_committee: Option<proto::SyncCommittee>,
    next_withdrawal_index: u64,
    next_withdrawal_validator_index: ValidatorIndex,
    val_map: PubkeyCache,
    dirty_tracker: DirtyTracker,
}

impl<E: EthSpec> StateData<E> {
    fn validators_val(&self) -> Validators {
        match &self.validators {
            Some(validators) => validators.as_ref().clone(),
            None => Vec::new(),
        }
    }

    fn balances_val(&self) -> Vec<u64> {
        match &self.balances {
            Some(balances) => balances.as_ref().clone(),
            None => Vec::new(),
        }
    }

    fn slashings_val(&self) -> Vec<u64> {
        match &self.slashings {
            Some(slashings) => slashings.to_vec(),
            None => Vec::new(),
        }
    }

    fn inactivity_scores_val(&self) -> Vec<u64> {
        match &self.inactivity_scores {
            Some(scores) => scores.as_ref().clone(),
            None => Vec::new(),
        }
    }

    fn num_validators(&self) -> usize {
        self.validators.as_ref().map(|v| v.len()).unwrap_or(0)
    }
}

/// The versioned beacon state consumed by the transition engine.
///
/// Getters copy out under the shared lock; setters mutate under the
/// exclusive lock with copy-on-write on shared buffers. The fork version is
/// fixed at construction, so version gating never needs the lock.
#[derive(Debug)]
pub struct BeaconState<E: EthSpec> {
    version: ForkName,
    data: RwLock<StateData<E>>,
}

impl<E: EthSpec> BeaconState<E> {
    /// An empty state of the given fork version. Fields start absent, the
    /// way a freshly decoded snapshot leaves unset messages.
    pub fn new(version: ForkName) -> Self {
        Self {
            version,
            data: RwLock::new(StateData {
                validators: None,
                balances: None,
                slashings: None,
                inactivity_scores: None,
                randao_mixes: None,
                eth1_data: None,
                eth1_data_votes: None,
                eth1_deposit_index: 0,
                current_sync_committee: None,
                next_sync_committee: None,
                next_withdrawal_index: 0,
                next_withdrawal_validator_index: 0,
                val_map: PubkeyCache::default(),
                dirty_tracker: DirtyTracker::default(),
            }),
        }
    }

    pub fn version(&self) -> ForkName {
        self.version
    }

    /// Hands the accumulated change set to the Merkle layer.
    pub fn drain_dirty(&self) -> DirtySnapshot {
        self.data.write().dirty_tracker.drain()
    }

    /*
     * Validator read path.
     */

    /// The validator registry as an owned, element-wise copy. Vacant slots
    /// stay vacant; an absent registry reads as empty.
    pub fn validators(&self) -> Validators {
        self.data.read().validators_val()
    }

    /// The validator at `index`, deep-copied.
    ///
    /// An absent registry yields the zero validator with no error (legacy
    /// behavior, kept deliberately); an out-of-range index fails.
    pub fn validator_at_index(
        &self,
        index: ValidatorIndex,
    ) -> Result<proto::Validator, BeaconStateError> {
        let data = self.data.read();
        let validators = match &data.validators {
            Some(validators) => validators,
            None => return Ok(proto::Validator::default()),
        };
        if validators.len() as u64 <= index {
            return Err(BeaconStateError::IndexOutOfRange(index));
        }
        match &validators[index as usize] {
            Some(validator) => Ok(validator.clone()),
            None => Ok(proto::Validator::default()),
        }
    }

    /// A read-only view of the validator at `index`, without copying the
    /// record.
    pub fn validator_at_index_read_only(
        &self,
        index: ValidatorIndex,
    ) -> Result<ReadOnlyValidator, BeaconStateError> {
        let data = self.data.read();
        let validators = data
            .validators
            .as_ref()
            .ok_or(BeaconStateError::NilValidatorsInState)?;
        if validators.len() as u64 <= index {
            return Err(BeaconStateError::IndexOutOfRange(index));
        }
        ReadOnlyValidator::new(Arc::clone(validators), index as usize)
    }

    /// Looks up a validator's registry index by pubkey.
    ///
    /// The map is advisory: an entry at or beyond the current registry
    /// length reads as absent.
    pub fn validator_index_by_pubkey(&self, pubkey: &PublicKeyBytes) -> Option<ValidatorIndex> {
        let data = self.data.read();
        if data.val_map.is_nil() {
            return None;
        }
        let num_validators = data.num_validators() as u64;
        let index = data.val_map.get(pubkey)?;
        if index >= num_validators {
            return None;
        }
        Some(index)
    }

    /// The pubkey at `index`; all-zero when the index is out of range or the
    /// slot is vacant.
    pub fn pubkey_at_index(&self, index: ValidatorIndex) -> PublicKeyBytes {
        let data = self.data.read();
        data.validators
            .as_ref()
            .and_then(|validators| validators.get(index as usize)?.as_ref())
            .map(|validator| validator.pubkey)
            .unwrap_or_else(PublicKeyBytes::empty)
    }

    pub fn num_validators(&self) -> usize {
        self.data.read().num_validators()
    }

    /// Applies `f` to every validator.
    ///
    /// The registry buffer is snapshotted under the shared lock and iterated
    /// with the lock released; the snapshot's `Arc` keeps the buffer alive
    /// while writers copy-on-write past it.
    pub fn read_from_every_validator<F>(&self, mut f: F) -> Result<(), BeaconStateError>
    where
        F: FnMut(usize, &ReadOnlyValidator) -> Result<(), BeaconStateError>,
    {
        let validators = {
            let data = self.data.read();
            data.validators
                .as_ref()
                .map(Arc::clone)
                .ok_or(BeaconStateError::NilValidatorsInState)?
        };
        for index in 0..validators.len() {
            let validator = ReadOnlyValidator::new(Arc::clone(&validators), index)?;
            f(index, &validator)?;
        }
        Ok(())
    }

    /*
     * Balance / slashings / inactivity read path.
     */

    /// Balances as an owned copy; an absent field reads as empty.
    pub fn balances(&self) -> Vec<u64> {
        self.data.read().balances_val()
    }

    /// The balance at `index`. An absent field reads as zero with no error;
    /// an out-of-range index fails.
    pub fn balance_at_index(&self, index: ValidatorIndex) -> Result<u64, BeaconStateError> {
        let data = self.data.read();
        let balances = match &data.balances {
            Some(balances) => balances,
            None => return Ok(0),
        };
        if balances.len() as u64 <= index {
            return Err(BeaconStateError::IndexDoesNotExist(index));
        }
        Ok(balances[index as usize])
    }

    pub fn balances_length(&self) -> usize {
        self.data.read().balances.as_ref().map(|b| b.len()).unwrap_or(0)
    }

    /// The slashed-balance ring as an owned copy.
    pub fn slashings(&self) -> Vec<u64> {
        self.data.read().slashings_val()
    }

    /// Inactivity scores, Altair and later.
    pub fn inactivity_scores(&self) -> Result<Vec<u64>, BeaconStateError> {
        if self.version == ForkName::Phase0 {
            return Err(BeaconStateError::NotSupported(
                "inactivity_scores",
                self.version,
            ));
        }
        Ok(self.data.read().inactivity_scores_val())
    }

    /*
     * Randao read path.
     */

    /// The randao mix ring as an owned copy; absent reads as empty.
    pub fn randao_mixes(&self) -> Vec<Hash256> {
        self.data
            .read()
            .randao_mixes
            .as_ref()
            .map(|mixes| mixes.to_vec())
            .unwrap_or_default()
    }

    /// The mix at `index`. An absent ring reads as zero with no error.
    pub fn randao_mix_at_index(&self, index: u64) -> Result<Hash256, BeaconStateError> {
        let data = self.data.read();
        let mixes = match &data.randao_mixes {
            Some(mixes) => mixes,
            None => return Ok(Hash256::zero()),
        };
        if mixes.len() as u64 <= index {
            return Err(BeaconStateError::IndexOutOfRange(index));
        }
        Ok(mixes[index as usize])
    }

    pub fn randao_mixes_length(&self) -> usize {
        self.data
            .read()
            .randao_mixes
            .as_ref()
            .map(|mixes| mixes.len())
            .unwrap_or(0)
    }

    /*
     * Eth1 read path.
     */

    pub fn eth1_data(&self) -> Option<proto::Eth1Data> {
        self.data.read().eth1_data.clone()
    }

    pub fn eth1_data_votes(&self) -> Vec<proto::Eth1Data> {
        self.data
            .read()
            .eth1_data_votes
            .as_ref()
            .map(|votes| votes.as_ref().clone())
            .unwrap_or_default()
    }

    pub fn eth1_deposit_index(&self) -> u64 {
        self.data.read().eth1_deposit_index
    }

    /*
     * Sync committee and withdrawal read path.
     */

    /// The current sync committee, Altair and later.
    pub fn current_sync_committee(
        &self,
    ) -> Result<Option<proto::SyncCommittee>, BeaconStateError> {
        if self.version == ForkName::Phase0 {
            return Err(BeaconStateError::NotSupported(
                "current_sync_committee",
                self.version,
            ));
        }
        Ok(self.data.read().current_sync_committee.clone())
    }

    /// The next sync committee, Altair and later.
    pub fn next_sync_committee(&self) -> Result<Option<proto::SyncCommittee>, BeaconStateError> {
        if self.version == ForkName::Phase0 {
            return Err(BeaconStateError::NotSupported(
                "next_sync_committee",
                self.version,
            ));
        }
        Ok(self.data.read().next_sync_committee.clone())
    }

    /// The index assigned to the next withdrawal, Capella and later.
    pub fn next_withdrawal_index(&self) -> Result<u64, BeaconStateError> {
        if self.version < ForkName::Capella {
            return Err(BeaconStateError::NotSupported(
                "next_withdrawal_index",
                self.version,
            ));
        }
        Ok(self.data.read().next_withdrawal_index)
    }

    /// The validator next in line for a partial withdrawal, Capella and
    /// later.
    pub fn next_withdrawal_validator_index(&self) -> Result<ValidatorIndex, BeaconStateError> {
        if self.version < ForkName::Capella {
            return Err(BeaconStateError::NotSupported(
                "next_withdrawal_validator_index",
                self.version,
            ));
        }
        Ok(self.data.read().next_withdrawal_validator_index)
    }

    /*
     * Validator write path.
     */

    /// Replaces the whole registry and rebuilds the pubkey map from it.
    pub fn set_validators(&self, validators: Validators) -> Result<(), BeaconStateError> {
        let mut data = self.data.write();
        data.val_map = PubkeyCache::from_validators(&validators);
        data.validators = Some(Arc::new(validators));
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::Validators);
        data.dirty_tracker
            .set_rebuild_trie(BeaconStateField::Validators, true);
        Ok(())
    }

    /// Appends a validator and registers its pubkey.
    pub fn append_validator(&self, validator: proto::Validator) -> Result<(), BeaconStateError> {
        let mut data = self.data.write();
        let (index, pubkey) = {
            let validators =
                Arc::make_mut(data.validators.get_or_insert_with(|| Arc::new(Vec::new())));
            let index = validators.len() as u64;
            let pubkey = validator.pubkey;
            validators.push(Some(validator));
            (index, pubkey)
        };
        data.val_map.set(pubkey, index);
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::Validators);
        data.dirty_tracker
            .add_dirty_indices(BeaconStateField::Validators, &[index]);
        Ok(())
    }

    /// Overwrites the validator at `index`, copying the registry first when
    /// it is shared.
    pub fn update_validator_at_index(
        &self,
        index: ValidatorIndex,
        validator: proto::Validator,
    ) -> Result<(), BeaconStateError> {
        let mut data = self.data.write();
        let validators = match data.validators.as_mut() {
            Some(validators) if (validators.len() as u64) > index => Arc::make_mut(validators),
            _ => return Err(BeaconStateError::InvalidIndex(index)),
        };
        validators[index as usize] = Some(validator);
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::Validators);
        data.dirty_tracker
            .add_dirty_indices(BeaconStateField::Validators, &[index]);
        Ok(())
    }

    /// Runs `f` over every occupied slot with a mutable record, copying the
    /// registry first when it is shared. Slots for which `f` returns `true`
    /// are recorded as dirty.
    pub fn apply_to_every_validator<F>(&self, mut f: F) -> Result<(), BeaconStateError>
    where
        F: FnMut(usize, &mut proto::Validator) -> Result<bool, BeaconStateError>,
    {
        let mut data = self.data.write();
        let mut changed = Vec::new();
        {
            let validators = match data.validators.as_mut() {
                Some(validators) => Arc::make_mut(validators),
                None => return Err(BeaconStateError::NilValidatorsInState),
            };
            for (index, slot) in validators.iter_mut().enumerate() {
                if let Some(validator) = slot {
                    if f(index, validator)? {
                        changed.push(index as u64);
                    }
                }
            }
        }
        if !changed.is_empty() {
            data.dirty_tracker
                .mark_field_dirty(BeaconStateField::Validators);
            data.dirty_tracker
                .add_dirty_indices(BeaconStateField::Validators, &changed);
        }
        Ok(())
    }

    /*
     * Balance / slashings / inactivity write path.
     */

    /// Replaces all balances.
    pub fn set_balances(&self, balances: Vec<u64>) -> Result<(), BeaconStateError> {
        let mut data = self.data.write();
        data.balances = Some(Arc::new(balances));
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::Balances);
        data.dirty_tracker
            .set_rebuild_trie(BeaconStateField::Balances, true);
        Ok(())
    }

    /// Appends a balance, in lockstep with `append_validator`.
    pub fn append_balance(&self, balance: u64) -> Result<(), BeaconStateError> {
        let mut data = self.data.write();
        let index = {
            let balances =
                Arc::make_mut(data.balances.get_or_insert_with(|| Arc::new(Vec::new())));
            balances.push(balance);
            balances.len() as u64 - 1
        };
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::Balances);
        data.dirty_tracker
            .add_dirty_indices(BeaconStateField::Balances, &[index]);
        Ok(())
    }

    /// Overwrites the balance at `index`, copying first when shared.
    pub fn update_balance_at_index(
        &self,
        index: ValidatorIndex,
        balance: u64,
    ) -> Result<(), BeaconStateError> {
        let mut data = self.data.write();
        let balances = match data.balances.as_mut() {
            Some(balances) if (balances.len() as u64) > index => Arc::make_mut(balances),
            _ => return Err(BeaconStateError::InvalidIndex(index)),
        };
        balances[index as usize] = balance;
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::Balances);
        data.dirty_tracker
            .add_dirty_indices(BeaconStateField::Balances, &[index]);
        Ok(())
    }

    /// Replaces the slashings ring, normalizing to the protocol length.
    pub fn set_slashings(&self, slashings: Vec<u64>) -> Result<(), BeaconStateError> {
        let mut data = self.data.write();
        data.slashings = Some(Arc::new(FixedVector::from(slashings)));
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::Slashings);
        data.dirty_tracker
            .set_rebuild_trie(BeaconStateField::Slashings, true);
        Ok(())
    }

    /// Overwrites one slashings entry, copying first when shared.
    pub fn update_slashings_at_index(
        &self,
        index: u64,
        value: u64,
    ) -> Result<(), BeaconStateError> {
        let mut data = self.data.write();
        let slashings = match data.slashings.as_mut() {
            Some(slashings) if (slashings.len() as u64) > index => Arc::make_mut(slashings),
            _ => return Err(BeaconStateError::InvalidIndex(index)),
        };
        slashings[index as usize] = value;
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::Slashings);
        data.dirty_tracker
            .add_dirty_indices(BeaconStateField::Slashings, &[index]);
        Ok(())
    }

    /// Replaces the inactivity scores, Altair and later.
    pub fn set_inactivity_scores(&self, scores: Vec<u64>) -> Result<(), BeaconStateError> {
        if self.version == ForkName::Phase0 {
            return Err(BeaconStateError::NotSupported(
                "set_inactivity_scores",
                self.version,
            ));
        }
        let mut data = self.data.write();
        data.inactivity_scores = Some(Arc::new(scores));
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::InactivityScores);
        data.dirty_tracker
            .set_rebuild_trie(BeaconStateField::InactivityScores, true);
        Ok(())
    }

    /// Appends an inactivity score for a fresh validator, Altair and later.
    pub fn append_inactivity_score(&self, score: u64) -> Result<(), BeaconStateError> {
        if self.version == ForkName::Phase0 {
            return Err(BeaconStateError::NotSupported(
                "append_inactivity_score",
                self.version,
            ));
        }
        let mut data = self.data.write();
        let index = {
            let scores = Arc::make_mut(
                data.inactivity_scores
                    .get_or_insert_with(|| Arc::new(Vec::new())),
            );
            scores.push(score);
            scores.len() as u64 - 1
        };
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::InactivityScores);
        data.dirty_tracker
            .add_dirty_indices(BeaconStateField::InactivityScores, &[index]);
        Ok(())
    }

    /*
     * Eth1 write path.
     */

    pub fn set_eth1_data(&self, eth1_data: proto::Eth1Data) -> Result<(), BeaconStateError> {
        let mut data = self.data.write();
        data.eth1_data = Some(eth1_data);
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::Eth1Data);
        Ok(())
    }

    /// Replaces the whole vote list.
    pub fn set_eth1_data_votes(
        &self,
        votes: Vec<proto::Eth1Data>,
    ) -> Result<(), BeaconStateError> {
        let mut data = self.data.write();
        data.eth1_data_votes = Some(Arc::new(votes));
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::Eth1DataVotes);
        data.dirty_tracker
            .set_rebuild_trie(BeaconStateField::Eth1DataVotes, true);
        Ok(())
    }

    pub fn set_eth1_deposit_index(&self, index: u64) -> Result<(), BeaconStateError> {
        let mut data = self.data.write();
        data.eth1_deposit_index = index;
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::Eth1DepositIndex);
        Ok(())
    }

    /// Appends a vote, copying the list first when it is shared.
    pub fn append_eth1_data_votes(
        &self,
        vote: proto::Eth1Data,
    ) -> Result<(), BeaconStateError> {
        let mut data = self.data.write();
        let index = {
            let votes = Arc::make_mut(
                data.eth1_data_votes
                    .get_or_insert_with(|| Arc::new(Vec::new())),
            );
            votes.push(vote);
            votes.len() as u64 - 1
        };
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::Eth1DataVotes);
        data.dirty_tracker
            .add_dirty_indices(BeaconStateField::Eth1DataVotes, &[index]);
        Ok(())
    }

    /*
     * Randao write path.
     */

    /// Replaces the whole mix ring, normalizing input to the protocol
    /// length.
    pub fn set_randao_mixes(&self, mixes: Vec<Hash256>) -> Result<(), BeaconStateError> {
        let mut data = self.data.write();
        data.randao_mixes = Some(Arc::new(FixedVector::from(mixes)));
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::RandaoMixes);
        data.dirty_tracker
            .set_rebuild_trie(BeaconStateField::RandaoMixes, true);
        Ok(())
    }

    /// Overwrites one mix, copying the ring first when it is shared.
    pub fn update_randao_mixes_at_index(
        &self,
        index: u64,
        mix: Hash256,
    ) -> Result<(), BeaconStateError> {
        let mut data = self.data.write();
        let mixes = match data.randao_mixes.as_mut() {
            Some(mixes) if (mixes.len() as u64) > index => Arc::make_mut(mixes),
            _ => return Err(BeaconStateError::InvalidIndex(index)),
        };
        mixes[index as usize] = mix;
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::RandaoMixes);
        data.dirty_tracker
            .add_dirty_indices(BeaconStateField::RandaoMixes, &[index]);
        Ok(())
    }

    /*
     * Sync committee and withdrawal write path.
     */

    /// Sets the current sync committee, Altair and later.
    pub fn set_current_sync_committee(
        &self,
        committee: proto::SyncCommittee,
    ) -> Result<(), BeaconStateError> {
        if self.version == ForkName::Phase0 {
            return Err(BeaconStateError::NotSupported(
                "set_current_sync_committee",
                self.version,
            ));
        }
        let mut data = self.data.write();
        data.current_sync_committee = Some(committee);
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::CurrentSyncCommittee);
        Ok(())
    }

    /// Sets the next sync committee, Altair and later.
    pub fn set_next_sync_committee(
        &self,
        committee: proto::SyncCommittee,
    ) -> Result<(), BeaconStateError> {
        if self.version == ForkName::Phase0 {
            return Err(BeaconStateError::NotSupported(
                "set_next_sync_committee",
                self.version,
            ));
        }
        let mut data = self.data.write();
        data.next_sync_committee = Some(committee);
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::NextSyncCommittee);
        Ok(())
    }

    /// Sets the index assigned to the next withdrawal, Capella and later.
    pub fn set_next_withdrawal_index(&self, index: u64) -> Result<(), BeaconStateError> {
        if self.version < ForkName::Capella {
            return Err(BeaconStateError::NotSupported(
                "set_next_withdrawal_index",
                self.version,
            ));
        }
        let mut data = self.data.write();
        data.next_withdrawal_index = index;
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::NextWithdrawalIndex);
        Ok(())
    }

    /// Sets the validator next in line for a partial withdrawal, Capella and
    /// later.
    pub fn set_next_withdrawal_validator_index(
        &self,
        index: ValidatorIndex,
    ) -> Result<(), BeaconStateError> {
        if self.version < ForkName::Capella {
            return Err(BeaconStateError::NotSupported(
                "set_next_withdrawal_validator_index",
                self.version,
            ));
        }
        let mut data = self.data.write();
        data.next_withdrawal_validator_index = index;
        data.dirty_tracker
            .mark_field_dirty(BeaconStateField::NextWithdrawalValidatorIndex);
        Ok(())
    }
}

impl<E: EthSpec> Clone for BeaconState<E> {
    /// A cheap copy: shared buffers gain a reference instead of being
    /// duplicated, and the copy starts with a clean dirty tracker.
    fn clone(&self) -> Self {
        let data = self.data.read();
        let mut copy = data.clone();
        copy.dirty_tracker = DirtyTracker::default();
        Self {
            version: self.version,
            data: RwLock::new(copy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MinimalEthSpec;
    use std::collections::BTreeSet;

    type State = BeaconState<MinimalEthSpec>;

    fn pubkey(byte: u8) -> PublicKeyBytes {
        PublicKeyBytes::from([byte; 48])
    }

    fn validator(byte: u8) -> proto::Validator {
        proto::Validator {
            pubkey: pubkey(byte),
            effective_balance: 32_000_000_000,
            ..Default::default()
        }
    }

    fn vote(byte: u8) -> proto::Eth1Data {
        proto::Eth1Data {
            deposit_root: Hash256::repeat_byte(byte),
            deposit_count: byte as u64,
            block_hash: Hash256::repeat_byte(byte),
        }
    }

    fn indices(snapshot: &DirtySnapshot, field: BeaconStateField) -> BTreeSet<u64> {
        snapshot.dirty_indices.get(&field).cloned().unwrap_or_default()
    }

    #[test]
    fn append_vote_copies_a_shared_list() {
        let state = State::new(ForkName::Phase0);
        state
            .set_eth1_data_votes(vec![vote(1), vote(2), vote(3)])
            .unwrap();
        state.drain_dirty();

        let copy = state.clone();
        state.append_eth1_data_votes(vote(9)).unwrap();

        assert_eq!(copy.eth1_data_votes().len(), 3);
        assert_eq!(state.eth1_data_votes().len(), 4);
        assert_eq!(state.eth1_data_votes()[3], vote(9));

        let snapshot = state.drain_dirty();
        assert!(snapshot
            .dirty_fields
            .contains(&BeaconStateField::Eth1DataVotes));
        assert_eq!(
            indices(&snapshot, BeaconStateField::Eth1DataVotes),
            BTreeSet::from([3]),
        );
        assert!(!snapshot
            .rebuild_trie
            .contains(&BeaconStateField::Eth1DataVotes));
    }

    #[test]
    fn randao_update_copies_a_shared_ring() {
        let state = State::new(ForkName::Phase0);
        state
            .set_randao_mixes(vec![Hash256::zero(); 64])
            .unwrap();
        state.drain_dirty();

        let copy = state.clone();
        state
            .update_randao_mixes_at_index(5, Hash256::repeat_byte(0xaa))
            .unwrap();

        assert_eq!(copy.randao_mix_at_index(5).unwrap(), Hash256::zero());
        assert_eq!(
            state.randao_mix_at_index(5).unwrap(),
            Hash256::repeat_byte(0xaa),
        );

        let snapshot = state.drain_dirty();
        assert_eq!(
            indices(&snapshot, BeaconStateField::RandaoMixes),
            BTreeSet::from([5]),
        );
        assert!(!snapshot
            .rebuild_trie
            .contains(&BeaconStateField::RandaoMixes));
    }

    #[test]
    fn whole_replacement_requests_a_rebuild() {
        let state = State::new(ForkName::Phase0);
        state.set_randao_mixes(vec![Hash256::zero(); 64]).unwrap();

        let snapshot = state.drain_dirty();
        assert!(snapshot
            .dirty_fields
            .contains(&BeaconStateField::RandaoMixes));
        assert!(snapshot
            .rebuild_trie
            .contains(&BeaconStateField::RandaoMixes));
        assert_eq!(state.randao_mixes_length(), 64);
    }

    #[test]
    fn stale_pubkey_map_entries_read_as_absent() {
        let state = State::new(ForkName::Phase0);
        state.append_validator(validator(1)).unwrap();
        state.append_validator(validator(2)).unwrap();

        let stale = pubkey(9);
        let num = state.num_validators() as u64;
        state.data.write().val_map.set(stale, num + 3);

        assert_eq!(state.validator_index_by_pubkey(&stale), None);
        assert_eq!(state.validator_index_by_pubkey(&pubkey(2)), Some(1));
    }

    #[test]
    fn pubkey_lookup_on_a_fresh_state_is_nil() {
        let state = State::new(ForkName::Phase0);
        assert!(state.data.read().val_map.is_nil());
        assert_eq!(state.validator_index_by_pubkey(&pubkey(1)), None);
    }

    #[test]
    fn validator_reads_at_the_boundary() {
        let state = State::new(ForkName::Phase0);

        // Absent registry: zero validator, no error.
        assert_eq!(
            state.validator_at_index(3).unwrap(),
            proto::Validator::default(),
        );
        assert_eq!(
            state.validator_at_index_read_only(0).unwrap_err(),
            BeaconStateError::NilValidatorsInState,
        );

        state.append_validator(validator(1)).unwrap();
        assert_eq!(
            state.validator_at_index(1).unwrap_err(),
            BeaconStateError::IndexOutOfRange(1),
        );
        assert_eq!(state.validator_at_index(0).unwrap().pubkey, pubkey(1));
    }

    #[test]
    fn balance_reads_at_the_boundary() {
        let state = State::new(ForkName::Phase0);
        assert_eq!(state.balance_at_index(7).unwrap(), 0);

        state.set_balances(vec![1, 2]).unwrap();
        assert_eq!(
            state.balance_at_index(2).unwrap_err(),
            BeaconStateError::IndexDoesNotExist(2),
        );
        assert_eq!(state.balance_at_index(1).unwrap(), 2);
        assert_eq!(state.balances_length(), 2);
    }

    #[test]
    fn pubkey_at_index_tolerates_vacancies() {
        let state = State::new(ForkName::Phase0);
        state
            .set_validators(vec![Some(validator(1)), None])
            .unwrap();

        assert_eq!(state.pubkey_at_index(0), pubkey(1));
        assert_eq!(state.pubkey_at_index(1), PublicKeyBytes::empty());
        assert_eq!(state.pubkey_at_index(9), PublicKeyBytes::empty());
    }

    #[test]
    fn registry_and_balances_grow_in_lockstep() {
        let state = State::new(ForkName::Phase0);
        for byte in 1..=4 {
            state.append_validator(validator(byte)).unwrap();
            state.append_balance(32_000_000_000).unwrap();
        }
        assert_eq!(state.num_validators(), state.balances_length());
    }

    #[test]
    fn pubkey_map_matches_the_registry() {
        let state = State::new(ForkName::Phase0);
        for byte in 1..=4 {
            state.append_validator(validator(byte)).unwrap();
        }
        let validators = state.validators();
        for byte in 1..=4u8 {
            let index = state.validator_index_by_pubkey(&pubkey(byte)).unwrap();
            assert_eq!(
                validators[index as usize].as_ref().unwrap().pubkey,
                pubkey(byte),
            );
        }
    }

    #[test]
    fn set_validators_rebuilds_the_map() {
        let state = State::new(ForkName::Phase0);
        state.append_validator(validator(1)).unwrap();
        state.append_validator(validator(2)).unwrap();

        state.set_validators(vec![Some(validator(3))]).unwrap();
        assert_eq!(state.validator_index_by_pubkey(&pubkey(1)), None);
        assert_eq!(state.validator_index_by_pubkey(&pubkey(3)), Some(0));
    }

    #[test]
    fn clone_is_unaffected_by_later_writes() {
        let state = State::new(ForkName::Phase0);
        state
            .set_validators(vec![Some(validator(1)), Some(validator(2))])
            .unwrap();
        let copy = state.clone();

        let mut updated = validator(1);
        updated.slashed = true;
        state.update_validator_at_index(0, updated).unwrap();

        assert!(state.validators()[0].as_ref().unwrap().slashed);
        assert!(!copy.validators()[0].as_ref().unwrap().slashed);

        // The copy starts with nothing to report to the Merkle layer.
        assert!(copy.drain_dirty().is_empty());
    }

    #[test]
    fn read_only_view_outlives_a_registry_swap() {
        let state = State::new(ForkName::Phase0);
        state.set_validators(vec![Some(validator(1))]).unwrap();

        let view = state.validator_at_index_read_only(0).unwrap();
        state.set_validators(vec![Some(validator(9))]).unwrap();

        // The view still reads the buffer it snapshotted.
        assert_eq!(view.pubkey(), pubkey(1));
        assert_eq!(state.pubkey_at_index(0), pubkey(9));
    }

    #[test]
    fn read_from_every_validator_visits_occupied_slots() {
        let state = State::new(ForkName::Phase0);
        for byte in 1..=3 {
            state.append_validator(validator(byte)).unwrap();
        }

        let mut seen = Vec::new();
        state
            .read_from_every_validator(|index, validator| {
                seen.push((index, validator.pubkey()));
                Ok(())
            })
            .unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2], (2, pubkey(3)));

        let empty = State::new(ForkName::Phase0);
        assert_eq!(
            empty.read_from_every_validator(|_, _| Ok(())).unwrap_err(),
            BeaconStateError::NilValidatorsInState,
        );
    }

    #[test]
    fn read_from_every_validator_propagates_callback_errors() {
        let state = State::new(ForkName::Phase0);
        state.append_validator(validator(1)).unwrap();
        let err = state
            .read_from_every_validator(|_, _| Err(BeaconStateError::InvalidIndex(42)))
            .unwrap_err();
        assert_eq!(err, BeaconStateError::InvalidIndex(42));
    }

    #[test]
    fn apply_to_every_validator_records_changes() {
        let state = State::new(ForkName::Phase0);
        for byte in 1..=3 {
            state.append_validator(validator(byte)).unwrap();
        }
        state.drain_dirty();
        let copy = state.clone();

        state
            .apply_to_every_validator(|index, validator| {
                if index == 1 {
                    validator.slashed = true;
                    Ok(true)
                } else {
                    Ok(false)
                }
            })
            .unwrap();

        assert!(state.validators()[1].as_ref().unwrap().slashed);
        assert!(!copy.validators()[1].as_ref().unwrap().slashed);

        let snapshot = state.drain_dirty();
        assert_eq!(
            indices(&snapshot, BeaconStateField::Validators),
            BTreeSet::from([1]),
        );
    }

    #[test]
    fn inactivity_scores_are_version_gated() {
        let phase0 = State::new(ForkName::Phase0);
        assert_eq!(
            phase0.inactivity_scores().unwrap_err(),
            BeaconStateError::NotSupported("inactivity_scores", ForkName::Phase0),
        );
        assert!(phase0.set_inactivity_scores(vec![1]).is_err());

        let altair = State::new(ForkName::Altair);
        assert_eq!(altair.inactivity_scores().unwrap(), Vec::<u64>::new());
        altair.set_inactivity_scores(vec![1, 2]).unwrap();
        altair.append_inactivity_score(3).unwrap();
        assert_eq!(altair.inactivity_scores().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn sync_committees_are_version_gated() {
        let committee = proto::SyncCommittee {
            pubkeys: vec![pubkey(1); 32],
            aggregate_pubkey: pubkey(2),
        };

        let phase0 = State::new(ForkName::Phase0);
        assert!(phase0.set_current_sync_committee(committee.clone()).is_err());
        assert!(phase0.current_sync_committee().is_err());

        let altair = State::new(ForkName::Altair);
        altair.set_current_sync_committee(committee.clone()).unwrap();
        altair.set_next_sync_committee(committee.clone()).unwrap();
        assert_eq!(altair.current_sync_committee().unwrap(), Some(committee));
    }

    #[test]
    fn withdrawal_fields_require_capella() {
        for version in [
            ForkName::Phase0,
            ForkName::Altair,
            ForkName::Bellatrix,
            ForkName::BellatrixBlind,
        ] {
            let state = State::new(version);
            assert_eq!(
                state.set_next_withdrawal_index(1).unwrap_err(),
                BeaconStateError::NotSupported("set_next_withdrawal_index", version),
            );
            assert!(state.set_next_withdrawal_validator_index(1).is_err());
            assert!(state.next_withdrawal_index().is_err());
        }

        let capella = State::new(ForkName::Capella);
        capella.set_next_withdrawal_index(5).unwrap();
        capella.set_next_withdrawal_validator_index(7).unwrap();
        assert_eq!(capella.next_withdrawal_index().unwrap(), 5);
        assert_eq!(capella.next_withdrawal_validator_index().unwrap(), 7);
    }

    #[test]
    fn scalar_setters_mark_without_rebuild() {
        let state = State::new(ForkName::Phase0);
        state.set_eth1_data(vote(1)).unwrap();
        state.set_eth1_deposit_index(11).unwrap();

        assert_eq!(state.eth1_data(), Some(vote(1)));
        assert_eq!(state.eth1_deposit_index(), 11);

        let snapshot = state.drain_dirty();
        assert!(snapshot.dirty_fields.contains(&BeaconStateField::Eth1Data));
        assert!(snapshot
            .dirty_fields
            .contains(&BeaconStateField::Eth1DepositIndex));
        assert!(snapshot.rebuild_trie.is_empty());
    }

    #[test]
    fn update_setters_reject_bad_indices() {
        let state = State::new(ForkName::Phase0);
        assert_eq!(
            state.update_balance_at_index(0, 1).unwrap_err(),
            BeaconStateError::InvalidIndex(0),
        );
        assert_eq!(
            state
                .update_randao_mixes_at_index(64, Hash256::zero())
                .unwrap_err(),
            BeaconStateError::InvalidIndex(64),
        );

        state.set_slashings(vec![0; 64]).unwrap();
        assert_eq!(
            state.update_slashings_at_index(64, 1).unwrap_err(),
            BeaconStateError::InvalidIndex(64),
        );
        state.update_slashings_at_index(2, 17).unwrap();
        assert_eq!(state.slashings()[2], 17);
    }

    #[test]
    fn slashings_normalize_to_the_protocol_length() {
        let state = State::new(ForkName::Phase0);
        state.set_slashings(vec![1, 2, 3]).unwrap();
        let slashings = state.slashings();
        assert_eq!(slashings.len(), 64);
        assert_eq!(&slashings[..3], &[1, 2, 3]);
        assert_eq!(slashings[3], 0);
    }

    #[test]
    fn concurrent_readers_and_writers_make_progress() {
        let state = std::sync::Arc::new(State::new(ForkName::Phase0));
        state.set_validators(vec![Some(validator(1))]).unwrap();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let state = std::sync::Arc::clone(&state);
                scope.spawn(move || {
                    for _ in 0..200 {
                        let _ = state.validators();
                        let _ = state.num_validators();
                    }
                });
            }
            let writer = std::sync::Arc::clone(&state);
            scope.spawn(move || {
                for byte in 0..100u8 {
                    writer.append_validator(validator(byte)).unwrap();
                }
            });
        });

        assert_eq!(state.num_validators(), 101);
    }
}
