use crate::beacon_block_body::BeaconBlockBodyRef;
use crate::factory::{BlockError, BlockObject};
use crate::fork_name::ForkName;
use crate::proto;
use crate::{Hash256, Slot, ValidatorIndex};

/// A polymorphic handle over one fork's unsigned block.
///
/// Built by [`crate::factory::new_beacon_block`]; the wrapped object is
/// `None` only when a handle is assembled around an absent message.
#[derive(Debug, Clone, PartialEq)]
pub enum BeaconBlock {
    Phase0(Option<proto::BeaconBlock>),
    Altair(Option<proto::BeaconBlockAltair>),
    Bellatrix(Option<proto::BeaconBlockBellatrix>),
    BlindedBellatrix(Option<proto::BlindedBeaconBlockBellatrix>),
}

impl BeaconBlock {
    pub fn version(&self) -> ForkName {
        self.to_ref().version()
    }

    pub fn is_nil(&self) -> bool {
        self.to_ref().is_nil()
    }

    pub fn to_ref(&self) -> BeaconBlockRef<'_> {
        match self {
            BeaconBlock::Phase0(block) => BeaconBlockRef::Phase0(block.as_ref()),
            BeaconBlock::Altair(block) => BeaconBlockRef::Altair(block.as_ref()),
            BeaconBlock::Bellatrix(block) => BeaconBlockRef::Bellatrix(block.as_ref()),
            BeaconBlock::BlindedBellatrix(block) => {
                BeaconBlockRef::BlindedBellatrix(block.as_ref())
            }
        }
    }

    pub fn slot(&self) -> Slot {
        self.to_ref().slot()
    }

    pub fn body(&self) -> BeaconBlockBodyRef<'_> {
        self.to_ref().body()
    }

    /// The underlying value object.
    pub fn proto(&self) -> Result<BlockObject, BlockError> {
        self.to_ref().proto()
    }
}

/// A borrowed view of one fork's unsigned block. `None` inside a variant is
/// the decoder's nil, reached by traversing a signed block whose inner block
/// was omitted.
///
/// Field accessors read as zero on a nil block;
/// [`crate::factory::beacon_block_is_nil`] is the first-line defense.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BeaconBlockRef<'a> {
    Phase0(Option<&'a proto::BeaconBlock>),
    Altair(Option<&'a proto::BeaconBlockAltair>),
    Bellatrix(Option<&'a proto::BeaconBlockBellatrix>),
    BlindedBellatrix(Option<&'a proto::BlindedBeaconBlockBellatrix>),
}

impl<'a> BeaconBlockRef<'a> {
    pub fn version(&self) -> ForkName {
        match self {
            BeaconBlockRef::Phase0(_) => ForkName::Phase0,
            BeaconBlockRef::Altair(_) => ForkName::Altair,
            BeaconBlockRef::Bellatrix(_) => ForkName::Bellatrix,
            BeaconBlockRef::BlindedBellatrix(_) => ForkName::BellatrixBlind,
        }
    }

    pub fn is_nil(&self) -> bool {
        match self {
            BeaconBlockRef::Phase0(block) => block.is_none(),
            BeaconBlockRef::Altair(block) => block.is_none(),
            BeaconBlockRef::Bellatrix(block) => block.is_none(),
            BeaconBlockRef::BlindedBellatrix(block) => block.is_none(),
        }
    }

    pub fn slot(&self) -> Slot {
        match self {
            BeaconBlockRef::Phase0(block) => block.map(|b| b.slot),
            BeaconBlockRef::Altair(block) => block.map(|b| b.slot),
            BeaconBlockRef::Bellatrix(block) => block.map(|b| b.slot),
            BeaconBlockRef::BlindedBellatrix(block) => block.map(|b| b.slot),
        }
        .unwrap_or_default()
    }

    pub fn proposer_index(&self) -> ValidatorIndex {
        match self {
            BeaconBlockRef::Phase0(block) => block.map(|b| b.proposer_index),
            BeaconBlockRef::Altair(block) => block.map(|b| b.proposer_index),
            BeaconBlockRef::Bellatrix(block) => block.map(|b| b.proposer_index),
            BeaconBlockRef::BlindedBellatrix(block) => block.map(|b| b.proposer_index),
        }
        .unwrap_or_default()
    }

    pub fn parent_root(&self) -> Hash256 {
        match self {
            BeaconBlockRef::Phase0(block) => block.map(|b| b.parent_root),
            BeaconBlockRef::Altair(block) => block.map(|b| b.parent_root),
            BeaconBlockRef::Bellatrix(block) => block.map(|b| b.parent_root),
            BeaconBlockRef::BlindedBellatrix(block) => block.map(|b| b.parent_root),
        }
        .unwrap_or_else(Hash256::zero)
    }

    pub fn state_root(&self) -> Hash256 {
        match self {
            BeaconBlockRef::Phase0(block) => block.map(|b| b.state_root),
            BeaconBlockRef::Altair(block) => block.map(|b| b.state_root),
            BeaconBlockRef::Bellatrix(block) => block.map(|b| b.state_root),
            BeaconBlockRef::BlindedBellatrix(block) => block.map(|b| b.state_root),
        }
        .unwrap_or_else(Hash256::zero)
    }

    /// The block body; nil when either the block or its body was omitted.
    pub fn body(&self) -> BeaconBlockBodyRef<'a> {
        match self {
            BeaconBlockRef::Phase0(block) => {
                BeaconBlockBodyRef::Phase0(block.and_then(|b| b.body.as_ref()))
            }
            BeaconBlockRef::Altair(block) => {
                BeaconBlockBodyRef::Altair(block.and_then(|b| b.body.as_ref()))
            }
            BeaconBlockRef::Bellatrix(block) => {
                BeaconBlockBodyRef::Bellatrix(block.and_then(|b| b.body.as_ref()))
            }
            BeaconBlockRef::BlindedBellatrix(block) => {
                BeaconBlockBodyRef::BlindedBellatrix(block.and_then(|b| b.body.as_ref()))
            }
        }
    }

    /// The underlying value object.
    pub fn proto(&self) -> Result<BlockObject, BlockError> {
        match self {
            BeaconBlockRef::Phase0(block) => block
                .map(|b| BlockObject::Phase0(b.clone()))
                .ok_or(BlockError::NilBeaconBlock),
            BeaconBlockRef::Altair(block) => block
                .map(|b| BlockObject::Altair(b.clone()))
                .ok_or(BlockError::NilBeaconBlock),
            BeaconBlockRef::Bellatrix(block) => block
                .map(|b| BlockObject::Bellatrix(b.clone()))
                .ok_or(BlockError::NilBeaconBlock),
            BeaconBlockRef::BlindedBellatrix(block) => block
                .map(|b| BlockObject::BlindedBellatrix(b.clone()))
                .ok_or(BlockError::NilBeaconBlock),
        }
    }
}
