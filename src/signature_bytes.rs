use eth2_serde_utils::hex::{encode as hex_encode, PrefixedHexVisitor};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::fmt;

pub const SIGNATURE_BYTES_LEN: usize = 96;

/// A BLS signature, kept as the opaque bytes that arrived on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureBytes([u8; SIGNATURE_BYTES_LEN]);

impl SignatureBytes {
    /// The all-zero signature, which can never be a valid point.
    pub fn empty() -> Self {
        Self([0; SIGNATURE_BYTES_LEN])
    }

    pub fn serialize(&self) -> [u8; SIGNATURE_BYTES_LEN] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for SignatureBytes {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<[u8; SIGNATURE_BYTES_LEN]> for SignatureBytes {
    fn from(bytes: [u8; SIGNATURE_BYTES_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for SignatureBytes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex_encode(self.0))
    }
}

impl fmt::Display for SignatureBytes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex_encode(self.0))
    }
}

impl Serialize for SignatureBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex_encode(self.0))
    }
}

impl<'de> Deserialize<'de> for SignatureBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = deserializer.deserialize_str(PrefixedHexVisitor)?;
        if bytes.len() != SIGNATURE_BYTES_LEN {
            return Err(serde::de::Error::custom(format!(
                "invalid signature byte length: {}",
                bytes.len()
            )));
        }
        let mut array = [0; SIGNATURE_BYTES_LEN];
        array.copy_from_slice(&bytes);
        Ok(Self(array))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_all_zero() {
        assert_eq!(SignatureBytes::empty().serialize(), [0; 96]);
    }

    #[test]
    fn round_trip_from_array() {
        let sig = SignatureBytes::from([7; 96]);
        assert_eq!(sig.serialize(), [7; 96]);
        assert_ne!(sig, SignatureBytes::empty());
    }
}
