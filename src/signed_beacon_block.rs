use crate::beacon_block::BeaconBlockRef;
use crate::factory::SignedBlockObject;
use crate::fork_name::ForkName;
use crate::proto;
use crate::SignatureBytes;

/// A polymorphic handle over one fork's signed block.
///
/// Built by [`crate::factory::new_signed_beacon_block`]. The inner unsigned
/// block may be absent (the decoder's nil);
/// [`crate::factory::beacon_block_is_nil`] reports that before any accessor
/// is used.
#[derive(Debug, Clone, PartialEq)]
pub enum SignedBeaconBlock {
    Phase0(proto::SignedBeaconBlock),
    Altair(proto::SignedBeaconBlockAltair),
    Bellatrix(proto::SignedBeaconBlockBellatrix),
    BlindedBellatrix(proto::SignedBlindedBeaconBlockBellatrix),
}

impl SignedBeaconBlock {
    pub fn version(&self) -> ForkName {
        match self {
            SignedBeaconBlock::Phase0(_) => ForkName::Phase0,
            SignedBeaconBlock::Altair(_) => ForkName::Altair,
            SignedBeaconBlock::Bellatrix(_) => ForkName::Bellatrix,
            SignedBeaconBlock::BlindedBellatrix(_) => ForkName::BellatrixBlind,
        }
    }

    /// True when the wrapped object carries no inner block.
    pub fn is_nil(&self) -> bool {
        self.block().is_nil()
    }

    pub fn signature(&self) -> SignatureBytes {
        match self {
            SignedBeaconBlock::Phase0(inner) => inner.signature,
            SignedBeaconBlock::Altair(inner) => inner.signature,
            SignedBeaconBlock::Bellatrix(inner) => inner.signature,
            SignedBeaconBlock::BlindedBellatrix(inner) => inner.signature,
        }
    }

    /// The inner unsigned block as a borrowed view.
    pub fn block(&self) -> BeaconBlockRef<'_> {
        match self {
            SignedBeaconBlock::Phase0(inner) => BeaconBlockRef::Phase0(inner.block.as_ref()),
            SignedBeaconBlock::Altair(inner) => BeaconBlockRef::Altair(inner.block.as_ref()),
            SignedBeaconBlock::Bellatrix(inner) => {
                BeaconBlockRef::Bellatrix(inner.block.as_ref())
            }
            SignedBeaconBlock::BlindedBellatrix(inner) => {
                BeaconBlockRef::BlindedBellatrix(inner.block.as_ref())
            }
        }
    }

    /// The underlying value object.
    pub fn proto(&self) -> SignedBlockObject {
        match self {
            SignedBeaconBlock::Phase0(inner) => SignedBlockObject::Phase0(inner.clone()),
            SignedBeaconBlock::Altair(inner) => SignedBlockObject::Altair(inner.clone()),
            SignedBeaconBlock::Bellatrix(inner) => SignedBlockObject::Bellatrix(inner.clone()),
            SignedBeaconBlock::BlindedBellatrix(inner) => {
                SignedBlockObject::BlindedBellatrix(inner.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Hash256;

    fn altair_signed() -> proto::SignedBeaconBlockAltair {
        proto::SignedBeaconBlockAltair {
            block: Some(proto::BeaconBlockAltair {
                slot: 11,
                proposer_index: 2,
                parent_root: Hash256::repeat_byte(8),
                state_root: Hash256::repeat_byte(9),
                body: Some(proto::BeaconBlockBodyAltair {
                    randao_reveal: SignatureBytes::empty(),
                    eth1_data: None,
                    graffiti: Hash256::zero(),
                    sync_aggregate: None,
                }),
            }),
            signature: SignatureBytes::from([6; 96]),
        }
    }

    #[test]
    fn traversal_reaches_inner_fields() {
        let signed = SignedBeaconBlock::Altair(altair_signed());
        assert_eq!(signed.version(), ForkName::Altair);
        assert!(!signed.is_nil());
        assert_eq!(signed.signature(), SignatureBytes::from([6; 96]));
        assert_eq!(signed.block().slot(), 11);
        assert!(!signed.block().body().is_nil());
    }

    #[test]
    fn nil_inner_block() {
        let signed = SignedBeaconBlock::Altair(proto::SignedBeaconBlockAltair {
            block: None,
            signature: SignatureBytes::empty(),
        });
        assert!(signed.is_nil());
        assert!(signed.block().is_nil());
        assert!(signed.block().body().is_nil());
    }
}
