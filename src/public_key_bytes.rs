use eth2_serde_utils::hex::{encode as hex_encode, PrefixedHexVisitor};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::fmt;

pub const PUBLIC_KEY_BYTES_LEN: usize = 48;

/// A compressed BLS public key, kept as the opaque bytes that arrived on the
/// wire. Decompression and signature checking happen in the crypto layer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKeyBytes([u8; PUBLIC_KEY_BYTES_LEN]);

impl PublicKeyBytes {
    /// The all-zero key, which can never be a valid compressed point.
    pub fn empty() -> Self {
        Self([0; PUBLIC_KEY_BYTES_LEN])
    }

    pub fn serialize(&self) -> [u8; PUBLIC_KEY_BYTES_LEN] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for PublicKeyBytes {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<[u8; PUBLIC_KEY_BYTES_LEN]> for PublicKeyBytes {
    fn from(bytes: [u8; PUBLIC_KEY_BYTES_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for PublicKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex_encode(self.0))
    }
}

impl fmt::Display for PublicKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex_encode(self.0))
    }
}

impl Serialize for PublicKeyBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex_encode(self.0))
    }
}

impl<'de> Deserialize<'de> for PublicKeyBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = deserializer.deserialize_str(PrefixedHexVisitor)?;
        if bytes.len() != PUBLIC_KEY_BYTES_LEN {
            return Err(serde::de::Error::custom(format!(
                "invalid public key byte length: {}",
                bytes.len()
            )));
        }
        let mut array = [0; PUBLIC_KEY_BYTES_LEN];
        array.copy_from_slice(&bytes);
        Ok(Self(array))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_all_zero() {
        assert_eq!(PublicKeyBytes::empty().serialize(), [0; 48]);
    }

    #[test]
    fn debug_is_prefixed_hex() {
        let key = PublicKeyBytes::from([0xab; 48]);
        let repr = format!("{:?}", key);
        assert!(repr.starts_with("0x"));
        assert!(repr.contains("abab"));
    }
}
