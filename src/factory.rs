//! Builds block views from decoded wire objects.
//!
//! Each constructor dispatches on the concrete shape of its input and wraps
//! it in the matching view variant. `None` inputs are rejected up front, and
//! shapes the wire layer decodes but this layer cannot wrap yet surface as
//! `Unsupported*` errors naming the offending shape.

use crate::beacon_block::BeaconBlock;
use crate::beacon_block_body::BeaconBlockBody;
use crate::fork_name::ForkName;
use crate::proto;
use crate::signed_beacon_block::SignedBeaconBlock;
use crate::SignatureBytes;
use thiserror::Error;

/// Errors surfaced by the factory and the block views.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("attempted to wrap nil object")]
    NilObjectWrapped,
    #[error("unsupported signed beacon block: unable to wrap block of type {0}")]
    UnsupportedSignedBeaconBlock(String),
    #[error("unsupported beacon block: unable to wrap block of type {0}")]
    UnsupportedBeaconBlock(String),
    #[error("unsupported beacon block body: unable to wrap block body of type {0}")]
    UnsupportedBeaconBlockBody(String),
    #[error("signed beacon block can't be nil")]
    NilSignedBeaconBlock,
    #[error("beacon block can't be nil")]
    NilBeaconBlock,
    #[error("beacon block body can't be nil")]
    NilBeaconBlockBody,
    #[error("version and wrapped object disagree")]
    InternalShapeMismatch,
    #[error("{0} is not supported for {1} blocks")]
    UnsupportedField(&'static str, ForkName),
}

/// Decoded objects accepted by [`new_signed_beacon_block`]: the direct form
/// of each shape, plus the fork-tagged form found inside a generic envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum SignedBlockObject {
    Phase0(proto::SignedBeaconBlock),
    Altair(proto::SignedBeaconBlockAltair),
    Bellatrix(proto::SignedBeaconBlockBellatrix),
    BlindedBellatrix(proto::SignedBlindedBeaconBlockBellatrix),
    Capella(proto::SignedBeaconBlockCapella),
    Generic(proto::GenericSignedBlock),
}

/// Decoded objects accepted by [`new_beacon_block`].
#[derive(Debug, Clone, PartialEq)]
pub enum BlockObject {
    Phase0(proto::BeaconBlock),
    Altair(proto::BeaconBlockAltair),
    Bellatrix(proto::BeaconBlockBellatrix),
    BlindedBellatrix(proto::BlindedBeaconBlockBellatrix),
    Capella(proto::BeaconBlockCapella),
    Generic(proto::GenericBlock),
}

/// Decoded objects accepted by [`new_beacon_block_body`].
#[derive(Debug, Clone, PartialEq)]
pub enum BlockBodyObject {
    Phase0(proto::BeaconBlockBody),
    Altair(proto::BeaconBlockBodyAltair),
    Bellatrix(proto::BeaconBlockBodyBellatrix),
    BlindedBellatrix(proto::BlindedBeaconBlockBodyBellatrix),
    Capella(proto::BeaconBlockBodyCapella),
}

/// Creates a signed block view from a decoded signed block.
pub fn new_signed_beacon_block(
    obj: Option<SignedBlockObject>,
) -> Result<SignedBeaconBlock, BlockError> {
    match obj {
        Some(SignedBlockObject::Phase0(pb)) => Ok(SignedBeaconBlock::Phase0(pb)),
        Some(SignedBlockObject::Altair(pb)) => Ok(SignedBeaconBlock::Altair(pb)),
        Some(SignedBlockObject::Bellatrix(pb)) => Ok(SignedBeaconBlock::Bellatrix(pb)),
        Some(SignedBlockObject::BlindedBellatrix(pb)) => {
            Ok(SignedBeaconBlock::BlindedBellatrix(pb))
        }
        Some(SignedBlockObject::Generic(oneof)) => match oneof {
            proto::GenericSignedBlock::Phase0(pb) => Ok(SignedBeaconBlock::Phase0(pb)),
            proto::GenericSignedBlock::Altair(pb) => Ok(SignedBeaconBlock::Altair(pb)),
            proto::GenericSignedBlock::Bellatrix(pb) => Ok(SignedBeaconBlock::Bellatrix(pb)),
            proto::GenericSignedBlock::BlindedBellatrix(pb) => {
                Ok(SignedBeaconBlock::BlindedBellatrix(pb))
            }
        },
        Some(SignedBlockObject::Capella(_)) => Err(BlockError::UnsupportedSignedBeaconBlock(
            "SignedBeaconBlockCapella".into(),
        )),
        None => Err(BlockError::NilObjectWrapped),
    }
}

/// Creates an unsigned block view from a decoded block.
pub fn new_beacon_block(obj: Option<BlockObject>) -> Result<BeaconBlock, BlockError> {
    match obj {
        Some(BlockObject::Phase0(pb)) => Ok(BeaconBlock::Phase0(Some(pb))),
        Some(BlockObject::Altair(pb)) => Ok(BeaconBlock::Altair(Some(pb))),
        Some(BlockObject::Bellatrix(pb)) => Ok(BeaconBlock::Bellatrix(Some(pb))),
        Some(BlockObject::BlindedBellatrix(pb)) => Ok(BeaconBlock::BlindedBellatrix(Some(pb))),
        Some(BlockObject::Generic(oneof)) => match oneof {
            proto::GenericBlock::Phase0(pb) => Ok(BeaconBlock::Phase0(Some(pb))),
            proto::GenericBlock::Altair(pb) => Ok(BeaconBlock::Altair(Some(pb))),
            proto::GenericBlock::Bellatrix(pb) => Ok(BeaconBlock::Bellatrix(Some(pb))),
            proto::GenericBlock::BlindedBellatrix(pb) => {
                Ok(BeaconBlock::BlindedBellatrix(Some(pb)))
            }
        },
        Some(BlockObject::Capella(_)) => Err(BlockError::UnsupportedBeaconBlock(
            "BeaconBlockCapella".into(),
        )),
        None => Err(BlockError::NilObjectWrapped),
    }
}

/// Creates a block body view from a decoded body.
pub fn new_beacon_block_body(obj: Option<BlockBodyObject>) -> Result<BeaconBlockBody, BlockError> {
    match obj {
        Some(BlockBodyObject::Phase0(pb)) => Ok(BeaconBlockBody::Phase0(Some(pb))),
        Some(BlockBodyObject::Altair(pb)) => Ok(BeaconBlockBody::Altair(Some(pb))),
        Some(BlockBodyObject::Bellatrix(pb)) => Ok(BeaconBlockBody::Bellatrix(Some(pb))),
        Some(BlockBodyObject::BlindedBellatrix(pb)) => {
            Ok(BeaconBlockBody::BlindedBellatrix(Some(pb)))
        }
        Some(BlockBodyObject::Capella(_)) => Err(BlockError::UnsupportedBeaconBlockBody(
            "BeaconBlockBodyCapella".into(),
        )),
        None => Err(BlockError::NilObjectWrapped),
    }
}

/// Assembles a signed block view from an unsigned view and a signature.
///
/// The view's version and wrapped object are matched against each other; a
/// disagreement means the view was constructed inconsistently.
pub fn build_signed_beacon_block(
    block: &BeaconBlock,
    signature: SignatureBytes,
) -> Result<SignedBeaconBlock, BlockError> {
    let pb = block.proto()?;
    match (block.version(), pb) {
        (ForkName::Phase0, BlockObject::Phase0(pb)) => {
            new_signed_beacon_block(Some(SignedBlockObject::Phase0(proto::SignedBeaconBlock {
                block: Some(pb),
                signature,
            })))
        }
        (ForkName::Altair, BlockObject::Altair(pb)) => new_signed_beacon_block(Some(
            SignedBlockObject::Altair(proto::SignedBeaconBlockAltair {
                block: Some(pb),
                signature,
            }),
        )),
        (ForkName::Bellatrix, BlockObject::Bellatrix(pb)) => new_signed_beacon_block(Some(
            SignedBlockObject::Bellatrix(proto::SignedBeaconBlockBellatrix {
                block: Some(pb),
                signature,
            }),
        )),
        (ForkName::BellatrixBlind, BlockObject::BlindedBellatrix(pb)) => new_signed_beacon_block(
            Some(SignedBlockObject::BlindedBellatrix(
                proto::SignedBlindedBeaconBlockBellatrix {
                    block: Some(pb),
                    signature,
                },
            )),
        ),
        (
            ForkName::Phase0 | ForkName::Altair | ForkName::Bellatrix | ForkName::BellatrixBlind,
            _,
        ) => Err(BlockError::InternalShapeMismatch),
        (version, _) => Err(BlockError::UnsupportedBeaconBlockBody(version.to_string())),
    }
}

/// Unwraps a generic signed block envelope and wraps the tagged shape.
pub fn new_signed_beacon_block_from_generic(
    gb: Option<&proto::GenericSignedBeaconBlock>,
) -> Result<SignedBeaconBlock, BlockError> {
    let gb = gb.ok_or(BlockError::NilObjectWrapped)?;
    match &gb.block {
        Some(oneof) => new_signed_beacon_block(Some(SignedBlockObject::Generic(oneof.clone()))),
        None => Err(BlockError::UnsupportedSignedBeaconBlock(
            "GenericSignedBeaconBlock".into(),
        )),
    }
}

/// First-line nil defense: checks the handle, the inner block and its body
/// before any accessor is trusted.
pub fn beacon_block_is_nil(b: Option<&SignedBeaconBlock>) -> Result<(), BlockError> {
    let b = b.ok_or(BlockError::NilSignedBeaconBlock)?;
    let block = b.block();
    if block.is_nil() {
        return Err(BlockError::NilBeaconBlock);
    }
    if block.body().is_nil() {
        return Err(BlockError::NilBeaconBlockBody);
    }
    Ok(())
}
