/// Double-array trie over surfaces.
pub mod trie;

use std::collections::BTreeMap;

use crate::buffer::ByteBuffer;
use crate::errors::Result;

/// Ordered multimap from a source id (trie id or class id) to word ids.
///
/// Serialized as `i32 key_count`, then per key `i32 key`, `i32 value_count`
/// and the values. A reader consumes entries until the buffer is exhausted.
#[derive(Default, Clone, Debug, Eq, PartialEq)]
pub struct IdMultimap {
    map: BTreeMap<u32, Vec<u32>>,
}

impl IdMultimap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `word_id` to the ids mapped from `source`.
    pub fn add(&mut self, source: u32, word_id: u32) {
        self.map.entry(source).or_default().push(word_id);
    }

    /// Gets the word ids mapped from `source`, in insertion order.
    #[inline(always)]
    pub fn get(&self, source: u32) -> &[u32] {
        self.map.get(&source).map_or(&[], Vec::as_slice)
    }

    /// Gets the number of distinct keys.
    pub fn num_keys(&self) -> usize {
        self.map.len()
    }

    /// Iterates over every mapped value.
    pub fn values(&self) -> impl Iterator<Item = u32> + '_ {
        self.map.values().flatten().copied()
    }

    /// Serializes the map.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = ByteBuffer::with_capacity(4 + self.map.len() * 12);
        buffer.put_i32(i32::try_from(self.map.len())?);
        for (&key, ids) in &self.map {
            buffer.put_i32(i32::try_from(key)?);
            buffer.put_i32(i32::try_from(ids.len())?);
            for &id in ids {
                buffer.put_i32(i32::try_from(id)?);
            }
        }
        buffer.shrink();
        Ok(buffer.into_bytes())
    }

    /// Deserializes a map written by [`IdMultimap::to_bytes`].
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let mut map = Self::new();
        let mut buffer = ByteBuffer::from_bytes(bytes);
        if buffer.remaining() == 0 {
            return Ok(map);
        }
        // The key count is informational only.
        buffer.read_i32()?;
        while buffer.remaining() > 0 {
            let key = u32::try_from(buffer.read_i32()?)?;
            let count = usize::try_from(buffer.read_i32()?)?;
            let ids = map.map.entry(key).or_default();
            for _ in 0..count {
                ids.push(u32::try_from(buffer.read_i32()?)?);
            }
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut map = IdMultimap::new();
        map.add(5, 30);
        map.add(1, 10);
        map.add(5, 20);
        assert_eq!(map.get(5), &[30, 20]);
        assert_eq!(map.get(1), &[10]);
        assert!(map.get(2).is_empty());
        assert_eq!(map.num_keys(), 2);
        assert_eq!(map.values().collect::<Vec<_>>(), vec![10, 30, 20]);
    }

    #[test]
    fn test_layout() {
        let mut map = IdMultimap::new();
        map.add(7, 0);
        map.add(7, 10);
        let bytes = map.to_bytes().unwrap();
        let ints: Vec<i32> = bytes
            .chunks(4)
            .map(|c| i32::from_le_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(ints, vec![1, 7, 2, 0, 10]);
        assert_eq!(IdMultimap::from_bytes(bytes).unwrap(), map);
    }

    #[test]
    fn test_truncated() {
        let mut map = IdMultimap::new();
        map.add(1, 10);
        let mut bytes = map.to_bytes().unwrap();
        bytes.truncate(bytes.len() - 2);
        assert!(IdMultimap::from_bytes(bytes).is_err());
    }

    #[test]
    fn test_empty() {
        assert_eq!(IdMultimap::from_bytes(vec![]).unwrap(), IdMultimap::new());
    }
}
