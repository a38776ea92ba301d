use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize};

use crate::errors::{KuromojiError, Result};

/// Double-array trie from surface forms to trie ids.
#[derive(Archive, Serialize, Deserialize)]
pub struct Trie {
    da: crawdad_rkyv::Trie,
}

impl Trie {
    /// Builds the trie from `(surface, trie id)` records.
    pub fn from_records<K>(records: &[(K, u32)]) -> Result<Self>
    where
        K: AsRef<str>,
    {
        Ok(Self {
            da: crawdad_rkyv::Trie::from_records(records.iter().map(|(k, v)| (k, *v)))
                .map_err(|e| KuromojiError::invalid_argument("records", e.to_string()))?,
        })
    }

    /// Iterates over every key that is a prefix of `input`, shortest first.
    #[inline(always)]
    pub fn common_prefix_iterator<'a>(
        &'a self,
        input: &'a [char],
    ) -> impl Iterator<Item = TrieMatch> + 'a {
        self.da
            .common_prefix_search(input.iter().cloned())
            .map(move |(value, end_char)| TrieMatch::new(value, end_char))
    }

    /// Gets the trie id of `key` if it was inserted.
    pub fn exact_match(&self, key: &str) -> Option<u32> {
        let chars: Vec<char> = key.chars().collect();
        self.common_prefix_iterator(&chars)
            .find(|m| m.end_char == chars.len())
            .map(|m| m.value)
    }

    /// Serializes the trie.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(rkyv::to_bytes::<rkyv::rancor::Error>(self)?.to_vec())
    }

    /// Deserializes a trie written by [`Trie::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut aligned: AlignedVec = AlignedVec::with_capacity(bytes.len());
        aligned.extend_from_slice(bytes);
        Ok(rkyv::from_bytes::<Self, rkyv::rancor::Error>(&aligned)?)
    }
}

/// A common-prefix match.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct TrieMatch {
    /// Trie id of the matched surface.
    pub value: u32,
    /// Length of the match in characters.
    pub end_char: usize,
}

impl TrieMatch {
    /// Creates a new instance.
    #[inline(always)]
    pub const fn new(value: u32, end_char: usize) -> Self {
        Self { value, end_char }
    }
}
