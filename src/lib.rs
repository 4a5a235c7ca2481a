//! Core consensus types for a beacon node: the versioned, structurally-shared
//! state container and the polymorphic views over per-fork block shapes.
//!
//! The two halves are consumed by the surrounding transition engine:
//!
//! * [`BeaconState`] owns the mutable chain state behind a reader-writer
//!   lock. Composite fields are shared between state copies and cloned on
//!   first write, and every mutation is recorded in a dirty tracker that the
//!   Merkle layer drains to recompute only the subtrees that changed.
//! * [`SignedBeaconBlock`], [`BeaconBlock`] and [`BeaconBlockBody`] present
//!   the per-fork wire shapes in [`proto`] through one capability set. The
//!   [`factory`] module builds them from decoded wire objects.
//!
//! SSZ encoding, Merkle hashing, signature verification and consensus rules
//! live in other crates.

pub mod beacon_block;
pub mod beacon_block_body;
pub mod beacon_state;
pub mod eth_spec;
pub mod factory;
pub mod fork_name;
pub mod proto;
pub mod public_key_bytes;
pub mod signature_bytes;
pub mod signed_beacon_block;
pub mod test_utils;

pub use beacon_block::{BeaconBlock, BeaconBlockRef};
pub use beacon_block_body::{BeaconBlockBody, BeaconBlockBodyRef};
pub use beacon_state::dirty_tracker::{BeaconStateField, DirtySnapshot, DirtyTracker};
pub use beacon_state::pubkey_cache::PubkeyCache;
pub use beacon_state::read_only_validator::ReadOnlyValidator;
pub use beacon_state::{BeaconState, BeaconStateError};
pub use eth_spec::{EthSpec, MainnetEthSpec, MinimalEthSpec};
pub use factory::{
    beacon_block_is_nil, build_signed_beacon_block, new_beacon_block, new_beacon_block_body,
    new_signed_beacon_block, new_signed_beacon_block_from_generic, BlockBodyObject, BlockError,
    BlockObject, SignedBlockObject,
};
pub use fork_name::ForkName;
pub use public_key_bytes::{PublicKeyBytes, PUBLIC_KEY_BYTES_LEN};
pub use signature_bytes::{SignatureBytes, SIGNATURE_BYTES_LEN};
pub use signed_beacon_block::SignedBeaconBlock;

pub use ssz_types::typenum;
pub use ssz_types::FixedVector;

pub type Hash256 = ethereum_types::H256;
pub type Address = ethereum_types::H160;
pub type Uint256 = ethereum_types::U256;

pub type Slot = u64;
pub type Epoch = u64;
pub type ValidatorIndex = u64;
