use crate::proto;
use crate::{PublicKeyBytes, ValidatorIndex};
use rpds::HashTrieMapSync as HashTrieMap;

/// Maps validator pubkeys to registry indices.
///
/// Backed by a persistent hash-trie map, so state copies share structure and
/// cloning is cheap. A default cache is nil (a state decoded without one);
/// the first write materializes the map. The map is advisory: the state's
/// lookup path validates entries against the current registry length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PubkeyCache {
    map: Option<HashTrieMap<PublicKeyBytes, ValidatorIndex>>,
}

impl PubkeyCache {
    pub fn new() -> Self {
        Self {
            map: Some(HashTrieMap::new_sync()),
        }
    }

    /// Builds the cache from a registry, skipping vacant slots.
    pub fn from_validators(validators: &[Option<proto::Validator>]) -> Self {
        let mut map = HashTrieMap::new_sync();
        for (index, validator) in validators.iter().enumerate() {
            if let Some(validator) = validator {
                map.insert_mut(validator.pubkey, index as ValidatorIndex);
            }
        }
        Self { map: Some(map) }
    }

    pub fn is_nil(&self) -> bool {
        self.map.is_none()
    }

    pub fn get(&self, pubkey: &PublicKeyBytes) -> Option<ValidatorIndex> {
        self.map.as_ref()?.get(pubkey).copied()
    }

    pub fn set(&mut self, pubkey: PublicKeyBytes, index: ValidatorIndex) {
        self.map
            .get_or_insert_with(HashTrieMap::new_sync)
            .insert_mut(pubkey, index);
    }

    /// Removes an entry, reporting whether it was present.
    pub fn remove(&mut self, pubkey: &PublicKeyBytes) -> bool {
        match self.map.as_mut() {
            Some(map) => map.remove_mut(pubkey),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.map.as_ref().map(|map| map.size()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> PublicKeyBytes {
        PublicKeyBytes::from([byte; 48])
    }

    #[test]
    fn default_is_nil_until_written() {
        let mut cache = PubkeyCache::default();
        assert!(cache.is_nil());
        assert_eq!(cache.get(&key(1)), None);

        cache.set(key(1), 0);
        assert!(!cache.is_nil());
        assert_eq!(cache.get(&key(1)), Some(0));
    }

    #[test]
    fn set_get_remove() {
        let mut cache = PubkeyCache::new();
        cache.set(key(1), 0);
        cache.set(key(2), 1);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&key(2)), Some(1));

        assert!(cache.remove(&key(1)));
        assert!(!cache.remove(&key(1)));
        assert_eq!(cache.get(&key(1)), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn overwriting_an_entry_keeps_len() {
        let mut cache = PubkeyCache::new();
        cache.set(key(1), 0);
        cache.set(key(1), 5);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key(1)), Some(5));
    }

    #[test]
    fn clones_share_structure_but_not_mutations() {
        let mut cache = PubkeyCache::new();
        cache.set(key(1), 0);
        let copy = cache.clone();

        cache.set(key(2), 1);
        assert_eq!(cache.len(), 2);
        assert_eq!(copy.len(), 1);
        assert_eq!(copy.get(&key(2)), None);
    }

    #[test]
    fn from_validators_skips_vacant_slots() {
        let validators = vec![
            Some(proto::Validator {
                pubkey: key(1),
                ..Default::default()
            }),
            None,
            Some(proto::Validator {
                pubkey: key(3),
                ..Default::default()
            }),
        ];
        let cache = PubkeyCache::from_validators(&validators);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&key(1)), Some(0));
        assert_eq!(cache.get(&key(3)), Some(2));
    }
}
