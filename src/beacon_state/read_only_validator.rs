use crate::beacon_state::BeaconStateError;
use crate::proto;
use crate::{Epoch, Hash256, PublicKeyBytes};
use std::sync::Arc;

/// A non-mutating view of one validator record.
///
/// The view holds the registry buffer it was created from, so the record
/// stays readable after the owning state copies the field on write. No
/// accessor hands out a mutable path into the record.
#[derive(Debug, Clone)]
pub struct ReadOnlyValidator {
    validators: Arc<Vec<Option<proto::Validator>>>,
    index: usize,
}

impl ReadOnlyValidator {
    /// Wraps the validator at `index`. Fails on an out-of-range index or a
    /// vacant slot.
    pub(crate) fn new(
        validators: Arc<Vec<Option<proto::Validator>>>,
        index: usize,
    ) -> Result<Self, BeaconStateError> {
        match validators.get(index) {
            None => Err(BeaconStateError::IndexOutOfRange(index as u64)),
            Some(None) => Err(BeaconStateError::NilValidator),
            Some(Some(_)) => Ok(Self { validators, index }),
        }
    }

    fn validator(&self) -> &proto::Validator {
        self.validators[self.index]
            .as_ref()
            .expect("slot occupancy checked on construction")
    }

    pub fn pubkey(&self) -> PublicKeyBytes {
        self.validator().pubkey
    }

    pub fn withdrawal_credentials(&self) -> Hash256 {
        self.validator().withdrawal_credentials
    }

    pub fn effective_balance(&self) -> u64 {
        self.validator().effective_balance
    }

    pub fn slashed(&self) -> bool {
        self.validator().slashed
    }

    pub fn activation_eligibility_epoch(&self) -> Epoch {
        self.validator().activation_eligibility_epoch
    }

    pub fn activation_epoch(&self) -> Epoch {
        self.validator().activation_epoch
    }

    pub fn exit_epoch(&self) -> Epoch {
        self.validator().exit_epoch
    }

    pub fn withdrawable_epoch(&self) -> Epoch {
        self.validator().withdrawable_epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Arc<Vec<Option<proto::Validator>>> {
        Arc::new(vec![
            Some(proto::Validator {
                pubkey: PublicKeyBytes::from([1; 48]),
                effective_balance: 32_000_000_000,
                slashed: true,
                exit_epoch: 9,
                ..Default::default()
            }),
            None,
        ])
    }

    #[test]
    fn accessors_read_the_record() {
        let validator = ReadOnlyValidator::new(registry(), 0).unwrap();
        assert_eq!(validator.pubkey(), PublicKeyBytes::from([1; 48]));
        assert_eq!(validator.effective_balance(), 32_000_000_000);
        assert!(validator.slashed());
        assert_eq!(validator.exit_epoch(), 9);
        assert_eq!(validator.activation_epoch(), 0);
    }

    #[test]
    fn vacant_slot_is_rejected() {
        assert_eq!(
            ReadOnlyValidator::new(registry(), 1).unwrap_err(),
            BeaconStateError::NilValidator
        );
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert_eq!(
            ReadOnlyValidator::new(registry(), 2).unwrap_err(),
            BeaconStateError::IndexOutOfRange(2)
        );
    }
}
