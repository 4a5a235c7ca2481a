use crate::proto;
use crate::{Address, Hash256, PublicKeyBytes, SignatureBytes, Uint256};
use rand::RngCore;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use std::sync::Arc;

/// Returns `T` built from a fixed-seed generator, so fixtures are stable
/// across runs.
pub fn test_random_instance<T: TestRandom>() -> T {
    let mut rng = XorShiftRng::from_seed([0x42; 16]);
    T::random_for_test(&mut rng)
}

pub trait TestRandom {
    fn random_for_test(rng: &mut impl RngCore) -> Self;
}

impl TestRandom for bool {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        (rng.next_u32() % 2) == 1
    }
}

impl TestRandom for u64 {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        rng.next_u64()
    }
}

impl TestRandom for u8 {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        rng.next_u32().to_be_bytes()[0]
    }
}

impl TestRandom for usize {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        rng.next_u32() as usize
    }
}

impl<U> TestRandom for Vec<U>
where
    U: TestRandom,
{
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        let mut output = vec![];

        for _ in 0..(usize::random_for_test(rng) % 4) {
            output.push(<U>::random_for_test(rng));
        }

        output
    }
}

impl<U> TestRandom for Arc<U>
where
    U: TestRandom,
{
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Arc::new(U::random_for_test(rng))
    }
}

macro_rules! impl_test_random_for_u8_array {
    ($len: expr) => {
        impl TestRandom for [u8; $len] {
            fn random_for_test(rng: &mut impl RngCore) -> Self {
                let mut bytes = [0; $len];
                rng.fill_bytes(&mut bytes);
                bytes
            }
        }
    };
}

impl_test_random_for_u8_array!(20);
impl_test_random_for_u8_array!(32);
impl_test_random_for_u8_array!(48);
impl_test_random_for_u8_array!(96);

impl TestRandom for Hash256 {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Hash256::from(<[u8; 32]>::random_for_test(rng))
    }
}

impl TestRandom for Address {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Address::from(<[u8; 20]>::random_for_test(rng))
    }
}

impl TestRandom for Uint256 {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Uint256::from(u64::random_for_test(rng))
    }
}

impl TestRandom for PublicKeyBytes {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        PublicKeyBytes::from(<[u8; 48]>::random_for_test(rng))
    }
}

impl TestRandom for SignatureBytes {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        SignatureBytes::from(<[u8; 96]>::random_for_test(rng))
    }
}

impl TestRandom for proto::Validator {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            pubkey: PublicKeyBytes::random_for_test(rng),
            withdrawal_credentials: Hash256::random_for_test(rng),
            effective_balance: u64::random_for_test(rng),
            slashed: bool::random_for_test(rng),
            activation_eligibility_epoch: u64::random_for_test(rng),
            activation_epoch: u64::random_for_test(rng),
            exit_epoch: u64::random_for_test(rng),
            withdrawable_epoch: u64::random_for_test(rng),
        }
    }
}

impl TestRandom for proto::Eth1Data {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            deposit_root: Hash256::random_for_test(rng),
            deposit_count: u64::random_for_test(rng),
            block_hash: Hash256::random_for_test(rng),
        }
    }
}

impl TestRandom for proto::SyncCommittee {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            pubkeys: Vec::random_for_test(rng),
            aggregate_pubkey: PublicKeyBytes::random_for_test(rng),
        }
    }
}

impl TestRandom for proto::SyncAggregate {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            sync_committee_bits: Vec::random_for_test(rng),
            sync_committee_signature: SignatureBytes::random_for_test(rng),
        }
    }
}

impl TestRandom for proto::ExecutionPayload {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            parent_hash: Hash256::random_for_test(rng),
            fee_recipient: Address::random_for_test(rng),
            state_root: Hash256::random_for_test(rng),
            receipts_root: Hash256::random_for_test(rng),
            logs_bloom: Vec::random_for_test(rng),
            prev_randao: Hash256::random_for_test(rng),
            block_number: u64::random_for_test(rng),
            gas_limit: u64::random_for_test(rng),
            gas_used: u64::random_for_test(rng),
            timestamp: u64::random_for_test(rng),
            extra_data: Vec::random_for_test(rng),
            base_fee_per_gas: Uint256::random_for_test(rng),
            block_hash: Hash256::random_for_test(rng),
            transactions: Vec::random_for_test(rng),
        }
    }
}

impl TestRandom for proto::ExecutionPayloadHeader {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            parent_hash: Hash256::random_for_test(rng),
            fee_recipient: Address::random_for_test(rng),
            state_root: Hash256::random_for_test(rng),
            receipts_root: Hash256::random_for_test(rng),
            logs_bloom: Vec::random_for_test(rng),
            prev_randao: Hash256::random_for_test(rng),
            block_number: u64::random_for_test(rng),
            gas_limit: u64::random_for_test(rng),
            gas_used: u64::random_for_test(rng),
            timestamp: u64::random_for_test(rng),
            extra_data: Vec::random_for_test(rng),
            base_fee_per_gas: Uint256::random_for_test(rng),
            block_hash: Hash256::random_for_test(rng),
            transactions_root: Hash256::random_for_test(rng),
        }
    }
}

/*
 * Bodies and blocks are generated with every message field present, since
 * most tests start from a whole object and knock fields out themselves.
 */

impl TestRandom for proto::BeaconBlockBody {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            randao_reveal: SignatureBytes::random_for_test(rng),
            eth1_data: Some(proto::Eth1Data::random_for_test(rng)),
            graffiti: Hash256::random_for_test(rng),
        }
    }
}

impl TestRandom for proto::BeaconBlockBodyAltair {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            randao_reveal: SignatureBytes::random_for_test(rng),
            eth1_data: Some(proto::Eth1Data::random_for_test(rng)),
            graffiti: Hash256::random_for_test(rng),
            sync_aggregate: Some(proto::SyncAggregate::random_for_test(rng)),
        }
    }
}

impl TestRandom for proto::BeaconBlockBodyBellatrix {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            randao_reveal: SignatureBytes::random_for_test(rng),
            eth1_data: Some(proto::Eth1Data::random_for_test(rng)),
            graffiti: Hash256::random_for_test(rng),
            sync_aggregate: Some(proto::SyncAggregate::random_for_test(rng)),
            execution_payload: Some(proto::ExecutionPayload::random_for_test(rng)),
        }
    }
}

impl TestRandom for proto::BlindedBeaconBlockBodyBellatrix {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            randao_reveal: SignatureBytes::random_for_test(rng),
            eth1_data: Some(proto::Eth1Data::random_for_test(rng)),
            graffiti: Hash256::random_for_test(rng),
            sync_aggregate: Some(proto::SyncAggregate::random_for_test(rng)),
            execution_payload_header: Some(proto::ExecutionPayloadHeader::random_for_test(rng)),
        }
    }
}

impl TestRandom for proto::BeaconBlockBodyCapella {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            randao_reveal: SignatureBytes::random_for_test(rng),
            eth1_data: Some(proto::Eth1Data::random_for_test(rng)),
            graffiti: Hash256::random_for_test(rng),
            sync_aggregate: Some(proto::SyncAggregate::random_for_test(rng)),
            execution_payload: Some(proto::ExecutionPayload::random_for_test(rng)),
        }
    }
}

impl TestRandom for proto::BeaconBlock {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            slot: u64::random_for_test(rng),
            proposer_index: u64::random_for_test(rng),
            parent_root: Hash256::random_for_test(rng),
            state_root: Hash256::random_for_test(rng),
            body: Some(proto::BeaconBlockBody::random_for_test(rng)),
        }
    }
}

impl TestRandom for proto::BeaconBlockAltair {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            slot: u64::random_for_test(rng),
            proposer_index: u64::random_for_test(rng),
            parent_root: Hash256::random_for_test(rng),
            state_root: Hash256::random_for_test(rng),
            body: Some(proto::BeaconBlockBodyAltair::random_for_test(rng)),
        }
    }
}

impl TestRandom for proto::BeaconBlockBellatrix {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            slot: u64::random_for_test(rng),
            proposer_index: u64::random_for_test(rng),
            parent_root: Hash256::random_for_test(rng),
            state_root: Hash256::random_for_test(rng),
            body: Some(proto::BeaconBlockBodyBellatrix::random_for_test(rng)),
        }
    }
}

impl TestRandom for proto::BlindedBeaconBlockBellatrix {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            slot: u64::random_for_test(rng),
            proposer_index: u64::random_for_test(rng),
            parent_root: Hash256::random_for_test(rng),
            state_root: Hash256::random_for_test(rng),
            body: Some(proto::BlindedBeaconBlockBodyBellatrix::random_for_test(rng)),
        }
    }
}

impl TestRandom for proto::SignedBeaconBlock {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            block: Some(proto::BeaconBlock::random_for_test(rng)),
            signature: SignatureBytes::random_for_test(rng),
        }
    }
}

impl TestRandom for proto::SignedBeaconBlockAltair {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            block: Some(proto::BeaconBlockAltair::random_for_test(rng)),
            signature: SignatureBytes::random_for_test(rng),
        }
    }
}

impl TestRandom for proto::SignedBeaconBlockBellatrix {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            block: Some(proto::BeaconBlockBellatrix::random_for_test(rng)),
            signature: SignatureBytes::random_for_test(rng),
        }
    }
}

impl TestRandom for proto::SignedBlindedBeaconBlockBellatrix {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        Self {
            block: Some(proto::BlindedBeaconBlockBellatrix::random_for_test(rng)),
            signature: SignatureBytes::random_for_test(rng),
        }
    }
}
