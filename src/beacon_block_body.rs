use crate::factory::{BlockBodyObject, BlockError};
use crate::fork_name::ForkName;
use crate::proto;
use crate::{Hash256, SignatureBytes};

/// A polymorphic handle over one fork's block body.
///
/// Built by [`crate::factory::new_beacon_block_body`]; the wrapped object is
/// `None` only when a handle is assembled around an absent message, which
/// [`crate::factory::beacon_block_is_nil`] reports before any accessor runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BeaconBlockBody {
    Phase0(Option<proto::BeaconBlockBody>),
    Altair(Option<proto::BeaconBlockBodyAltair>),
    Bellatrix(Option<proto::BeaconBlockBodyBellatrix>),
    BlindedBellatrix(Option<proto::BlindedBeaconBlockBodyBellatrix>),
}

impl BeaconBlockBody {
    pub fn version(&self) -> ForkName {
        self.to_ref().version()
    }

    pub fn is_nil(&self) -> bool {
        self.to_ref().is_nil()
    }

    pub fn to_ref(&self) -> BeaconBlockBodyRef<'_> {
        match self {
            BeaconBlockBody::Phase0(body) => BeaconBlockBodyRef::Phase0(body.as_ref()),
            BeaconBlockBody::Altair(body) => BeaconBlockBodyRef::Altair(body.as_ref()),
            BeaconBlockBody::Bellatrix(body) => BeaconBlockBodyRef::Bellatrix(body.as_ref()),
            BeaconBlockBody::BlindedBellatrix(body) => {
                BeaconBlockBodyRef::BlindedBellatrix(body.as_ref())
            }
        }
    }

    /// The underlying value object.
    pub fn proto(&self) -> Result<BlockBodyObject, BlockError> {
        self.to_ref().proto()
    }
}

/// A borrowed view of one fork's block body. `None` inside a variant is the
/// decoder's nil, reached by traversing a block whose body was omitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BeaconBlockBodyRef<'a> {
    Phase0(Option<&'a proto::BeaconBlockBody>),
    Altair(Option<&'a proto::BeaconBlockBodyAltair>),
    Bellatrix(Option<&'a proto::BeaconBlockBodyBellatrix>),
    BlindedBellatrix(Option<&'a proto::BlindedBeaconBlockBodyBellatrix>),
}

impl<'a> BeaconBlockBodyRef<'a> {
    pub fn version(&self) -> ForkName {
        match self {
            BeaconBlockBodyRef::Phase0(_) => ForkName::Phase0,
            BeaconBlockBodyRef::Altair(_) => ForkName::Altair,
            BeaconBlockBodyRef::Bellatrix(_) => ForkName::Bellatrix,
            BeaconBlockBodyRef::BlindedBellatrix(_) => ForkName::BellatrixBlind,
        }
    }

    pub fn is_nil(&self) -> bool {
        match self {
            BeaconBlockBodyRef::Phase0(body) => body.is_none(),
            BeaconBlockBodyRef::Altair(body) => body.is_none(),
            BeaconBlockBodyRef::Bellatrix(body) => body.is_none(),
            BeaconBlockBodyRef::BlindedBellatrix(body) => body.is_none(),
        }
    }

    /// The proposer's RANDAO reveal; zero when the body is nil.
    pub fn randao_reveal(&self) -> SignatureBytes {
        match self {
            BeaconBlockBodyRef::Phase0(body) => body.map(|b| b.randao_reveal),
            BeaconBlockBodyRef::Altair(body) => body.map(|b| b.randao_reveal),
            BeaconBlockBodyRef::Bellatrix(body) => body.map(|b| b.randao_reveal),
            BeaconBlockBodyRef::BlindedBellatrix(body) => body.map(|b| b.randao_reveal),
        }
        .unwrap_or_else(SignatureBytes::empty)
    }

    pub fn eth1_data(&self) -> Option<&'a proto::Eth1Data> {
        match self {
            BeaconBlockBodyRef::Phase0(body) => body.and_then(|b| b.eth1_data.as_ref()),
            BeaconBlockBodyRef::Altair(body) => body.and_then(|b| b.eth1_data.as_ref()),
            BeaconBlockBodyRef::Bellatrix(body) => body.and_then(|b| b.eth1_data.as_ref()),
            BeaconBlockBodyRef::BlindedBellatrix(body) => body.and_then(|b| b.eth1_data.as_ref()),
        }
    }

    /// Proposer graffiti; zero when the body is nil.
    pub fn graffiti(&self) -> Hash256 {
        match self {
            BeaconBlockBodyRef::Phase0(body) => body.map(|b| b.graffiti),
            BeaconBlockBodyRef::Altair(body) => body.map(|b| b.graffiti),
            BeaconBlockBodyRef::Bellatrix(body) => body.map(|b| b.graffiti),
            BeaconBlockBodyRef::BlindedBellatrix(body) => body.map(|b| b.graffiti),
        }
        .unwrap_or_else(Hash256::zero)
    }

    /// The sync aggregate, present from Altair onwards.
    pub fn sync_aggregate(&self) -> Result<Option<&'a proto::SyncAggregate>, BlockError> {
        match self {
            BeaconBlockBodyRef::Phase0(_) => {
                Err(BlockError::UnsupportedField("sync_aggregate", self.version()))
            }
            BeaconBlockBodyRef::Altair(body) => Ok(body.and_then(|b| b.sync_aggregate.as_ref())),
            BeaconBlockBodyRef::Bellatrix(body) => {
                Ok(body.and_then(|b| b.sync_aggregate.as_ref()))
            }
            BeaconBlockBodyRef::BlindedBellatrix(body) => {
                Ok(body.and_then(|b| b.sync_aggregate.as_ref()))
            }
        }
    }

    /// The full execution payload carried by Bellatrix bodies.
    pub fn execution_payload(&self) -> Result<Option<&'a proto::ExecutionPayload>, BlockError> {
        match self {
            BeaconBlockBodyRef::Bellatrix(body) => {
                Ok(body.and_then(|b| b.execution_payload.as_ref()))
            }
            _ => Err(BlockError::UnsupportedField(
                "execution_payload",
                self.version(),
            )),
        }
    }

    /// The payload header commitment carried by blinded Bellatrix bodies.
    pub fn execution_payload_header(
        &self,
    ) -> Result<Option<&'a proto::ExecutionPayloadHeader>, BlockError> {
        match self {
            BeaconBlockBodyRef::BlindedBellatrix(body) => {
                Ok(body.and_then(|b| b.execution_payload_header.as_ref()))
            }
            _ => Err(BlockError::UnsupportedField(
                "execution_payload_header",
                self.version(),
            )),
        }
    }

    /// The underlying value object.
    pub fn proto(&self) -> Result<BlockBodyObject, BlockError> {
        match self {
            BeaconBlockBodyRef::Phase0(body) => body
                .map(|b| BlockBodyObject::Phase0(b.clone()))
                .ok_or(BlockError::NilBeaconBlockBody),
            BeaconBlockBodyRef::Altair(body) => body
                .map(|b| BlockBodyObject::Altair(b.clone()))
                .ok_or(BlockError::NilBeaconBlockBody),
            BeaconBlockBodyRef::Bellatrix(body) => body
                .map(|b| BlockBodyObject::Bellatrix(b.clone()))
                .ok_or(BlockError::NilBeaconBlockBody),
            BeaconBlockBodyRef::BlindedBellatrix(body) => body
                .map(|b| BlockBodyObject::BlindedBellatrix(b.clone()))
                .ok_or(BlockError::NilBeaconBlockBody),
        }
    }
}
