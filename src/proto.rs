//! Value objects handed over by the wire codec.
//!
//! These are the decoded shapes the factory and the state container consume.
//! Message-typed fields are `Option`al: `None` is the decoder's rendition of
//! an omitted message, which is why the view layer guards against nil before
//! touching any field. Scalar fields always carry a value.

use crate::{Address, Epoch, Hash256, PublicKeyBytes, SignatureBytes, Slot, Uint256, ValidatorIndex};
use serde::{Deserialize, Serialize};

/// A record in the validator registry. The zero value (`Default`) is the
/// placeholder returned for reads against an absent registry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Validator {
    pub pubkey: PublicKeyBytes,
    pub withdrawal_credentials: Hash256,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub effective_balance: u64,
    pub slashed: bool,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub activation_eligibility_epoch: Epoch,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub activation_epoch: Epoch,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub exit_epoch: Epoch,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub withdrawable_epoch: Epoch,
}

/// A summary of the deposit contract state on the ingress chain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Eth1Data {
    pub deposit_root: Hash256,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub deposit_count: u64,
    pub block_hash: Hash256,
}

/// The rotating committee responsible for light-client attestations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncCommittee {
    pub pubkeys: Vec<PublicKeyBytes>,
    pub aggregate_pubkey: PublicKeyBytes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncAggregate {
    pub sync_committee_bits: Vec<u8>,
    pub sync_committee_signature: SignatureBytes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPayload {
    pub parent_hash: Hash256,
    pub fee_recipient: Address,
    pub state_root: Hash256,
    pub receipts_root: Hash256,
    pub logs_bloom: Vec<u8>,
    pub prev_randao: Hash256,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub block_number: u64,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub gas_limit: u64,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub gas_used: u64,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub timestamp: u64,
    pub extra_data: Vec<u8>,
    pub base_fee_per_gas: Uint256,
    pub block_hash: Hash256,
    pub transactions: Vec<Vec<u8>>,
}

/// An execution payload with the transaction list replaced by its root, as
/// committed to by builder relays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPayloadHeader {
    pub parent_hash: Hash256,
    pub fee_recipient: Address,
    pub state_root: Hash256,
    pub receipts_root: Hash256,
    pub logs_bloom: Vec<u8>,
    pub prev_randao: Hash256,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub block_number: u64,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub gas_limit: u64,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub gas_used: u64,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub timestamp: u64,
    pub extra_data: Vec<u8>,
    pub base_fee_per_gas: Uint256,
    pub block_hash: Hash256,
    pub transactions_root: Hash256,
}

/*
 * Block bodies, one shape per fork.
 */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconBlockBody {
    pub randao_reveal: SignatureBytes,
    pub eth1_data: Option<Eth1Data>,
    pub graffiti: Hash256,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconBlockBodyAltair {
    pub randao_reveal: SignatureBytes,
    pub eth1_data: Option<Eth1Data>,
    pub graffiti: Hash256,
    pub sync_aggregate: Option<SyncAggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconBlockBodyBellatrix {
    pub randao_reveal: SignatureBytes,
    pub eth1_data: Option<Eth1Data>,
    pub graffiti: Hash256,
    pub sync_aggregate: Option<SyncAggregate>,
    pub execution_payload: Option<ExecutionPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlindedBeaconBlockBodyBellatrix {
    pub randao_reveal: SignatureBytes,
    pub eth1_data: Option<Eth1Data>,
    pub graffiti: Hash256,
    pub sync_aggregate: Option<SyncAggregate>,
    pub execution_payload_header: Option<ExecutionPayloadHeader>,
}

/// Decoded by the wire layer; the block factory does not wrap this shape yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconBlockBodyCapella {
    pub randao_reveal: SignatureBytes,
    pub eth1_data: Option<Eth1Data>,
    pub graffiti: Hash256,
    pub sync_aggregate: Option<SyncAggregate>,
    pub execution_payload: Option<ExecutionPayload>,
}

/*
 * Unsigned blocks.
 */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconBlock {
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub slot: Slot,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub proposer_index: ValidatorIndex,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body: Option<BeaconBlockBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconBlockAltair {
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub slot: Slot,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub proposer_index: ValidatorIndex,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body: Option<BeaconBlockBodyAltair>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconBlockBellatrix {
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub slot: Slot,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub proposer_index: ValidatorIndex,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body: Option<BeaconBlockBodyBellatrix>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlindedBeaconBlockBellatrix {
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub slot: Slot,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub proposer_index: ValidatorIndex,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body: Option<BlindedBeaconBlockBodyBellatrix>,
}

/// Decoded by the wire layer; the block factory does not wrap this shape yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconBlockCapella {
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub slot: Slot,
    #[serde(with = "eth2_serde_utils::quoted_u64")]
    pub proposer_index: ValidatorIndex,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body: Option<BeaconBlockBodyCapella>,
}

/*
 * Signed blocks.
 */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedBeaconBlock {
    pub block: Option<BeaconBlock>,
    pub signature: SignatureBytes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedBeaconBlockAltair {
    pub block: Option<BeaconBlockAltair>,
    pub signature: SignatureBytes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedBeaconBlockBellatrix {
    pub block: Option<BeaconBlockBellatrix>,
    pub signature: SignatureBytes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedBlindedBeaconBlockBellatrix {
    pub block: Option<BlindedBeaconBlockBellatrix>,
    pub signature: SignatureBytes,
}

/// Decoded by the wire layer; the block factory does not wrap this shape yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedBeaconBlockCapella {
    pub block: Option<BeaconBlockCapella>,
    pub signature: SignatureBytes,
}

/*
 * Generic envelopes: a block tagged with its fork version. The inner enums
 * are the envelope's one-of.
 */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenericSignedBlock {
    Phase0(SignedBeaconBlock),
    Altair(SignedBeaconBlockAltair),
    Bellatrix(SignedBeaconBlockBellatrix),
    BlindedBellatrix(SignedBlindedBeaconBlockBellatrix),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericSignedBeaconBlock {
    pub block: Option<GenericSignedBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenericBlock {
    Phase0(BeaconBlock),
    Altair(BeaconBlockAltair),
    Bellatrix(BeaconBlockBellatrix),
    BlindedBellatrix(BlindedBeaconBlockBellatrix),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericBeaconBlock {
    pub block: Option<GenericBlock>,
}
