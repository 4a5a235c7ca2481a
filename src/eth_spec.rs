use ssz_types::typenum::{Unsigned, U32, U512, U64, U65536, U8192};
use std::fmt::Debug;

/// Protocol constants consumed by the state container, fixed at the type
/// level so protocol-constant-length fields cannot be built with the wrong
/// length.
pub trait EthSpec: 'static + Default + Clone + Sync + Send + Debug + PartialEq + Eq {
    /*
     * State list lengths
     */
    type EpochsPerHistoricalVector: Unsigned + Clone + Sync + Send + Debug + PartialEq;
    type EpochsPerSlashingsVector: Unsigned + Clone + Sync + Send + Debug + PartialEq;
    /*
     * New in Altair
     */
    type SyncCommitteeSize: Unsigned + Clone + Sync + Send + Debug + PartialEq;

    /// Length of the `randao_mixes` ring.
    fn epochs_per_historical_vector() -> usize {
        Self::EpochsPerHistoricalVector::to_usize()
    }

    /// Length of the `slashings` ring.
    fn epochs_per_slashings_vector() -> usize {
        Self::EpochsPerSlashingsVector::to_usize()
    }

    fn sync_committee_size() -> usize {
        Self::SyncCommitteeSize::to_usize()
    }
}

/// Ethereum Foundation mainnet specification.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct MainnetEthSpec;

impl EthSpec for MainnetEthSpec {
    type EpochsPerHistoricalVector = U65536;
    type EpochsPerSlashingsVector = U8192;
    type SyncCommitteeSize = U512;
}

/// Ethereum Foundation minimal spec, used for testing.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct MinimalEthSpec;

impl EthSpec for MinimalEthSpec {
    type EpochsPerHistoricalVector = U64;
    type EpochsPerSlashingsVector = U64;
    type SyncCommitteeSize = U32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_constants() {
        assert_eq!(MainnetEthSpec::epochs_per_historical_vector(), 65_536);
        assert_eq!(MainnetEthSpec::epochs_per_slashings_vector(), 8_192);
        assert_eq!(MainnetEthSpec::sync_committee_size(), 512);
    }

    #[test]
    fn minimal_constants() {
        assert_eq!(MinimalEthSpec::epochs_per_historical_vector(), 64);
        assert_eq!(MinimalEthSpec::epochs_per_slashings_vector(), 64);
        assert_eq!(MinimalEthSpec::sync_committee_size(), 32);
    }
}
