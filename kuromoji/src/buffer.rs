//! Growable byte buffer with fixed-width integers and zero-terminated strings.
//!
//! All binary dictionary segments go through this codec. Integers are
//! little-endian; a string is written as its UTF-8 bytes (1 to 4 bytes per
//! code point) followed by a single `0` terminator.

use crate::errors::{KuromojiError, Result};

const DEFAULT_CAPACITY: usize = 1024 * 1024;

/// Growable byte store with a cursor.
///
/// The backing storage is zero-filled and doubles whenever a put would
/// overflow it. Puts and sequential reads advance the cursor, positional
/// reads do not.
#[derive(Clone, Debug)]
pub struct ByteBuffer {
    buffer: Vec<u8>,
    position: usize,
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ByteBuffer {
    /// Creates an empty buffer with `capacity` bytes of storage.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            position: 0,
        }
    }

    /// Wraps existing bytes for reading, with the cursor at the head.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            buffer: bytes,
            position: 0,
        }
    }

    /// Size of the backing storage in bytes.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    #[inline(always)]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline(always)]
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Number of bytes between the cursor and the end of the storage.
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.size().saturating_sub(self.position)
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Truncates the storage to the bytes written so far.
    pub fn shrink(&mut self) {
        self.buffer.truncate(self.position);
        self.buffer.shrink_to_fit();
    }

    fn reserve(&mut self, additional: usize) {
        let required = self.position + additional;
        if required > self.buffer.len() {
            let new_len = (self.buffer.len() * 2).max(required);
            self.buffer.resize(new_len, 0);
        }
    }

    fn put_bytes(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        self.buffer[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
    }

    pub fn put_u8(&mut self, value: u8) {
        self.put_bytes(&[value]);
    }

    pub fn put_i16(&mut self, value: i16) {
        self.put_bytes(&value.to_le_bytes());
    }

    pub fn put_i32(&mut self, value: i32) {
        self.put_bytes(&value.to_le_bytes());
    }

    /// Writes `s` followed by the `0` terminator.
    ///
    /// # Errors
    ///
    /// [`KuromojiError`] is returned when `s` contains U+0000, which cannot be
    /// distinguished from the terminator.
    pub fn put_str(&mut self, s: &str) -> Result<()> {
        if s.contains('\0') {
            return Err(KuromojiError::invalid_argument(
                "s",
                "a string written to the buffer must not contain U+0000",
            ));
        }
        self.reserve(encoded_len(s));
        self.put_bytes(s.as_bytes());
        self.put_u8(0);
        Ok(())
    }

    fn get_array<const N: usize>(&self, at: usize) -> Option<[u8; N]> {
        let bytes = self.buffer.get(at..at.checked_add(N)?)?;
        bytes.try_into().ok()
    }

    #[inline(always)]
    pub fn get_u8(&self, at: usize) -> Option<u8> {
        self.buffer.get(at).copied()
    }

    #[inline(always)]
    pub fn get_i16(&self, at: usize) -> Option<i16> {
        self.get_array(at).map(i16::from_le_bytes)
    }

    #[inline(always)]
    pub fn get_i32(&self, at: usize) -> Option<i32> {
        self.get_array(at).map(i32::from_le_bytes)
    }

    /// Decodes the string starting at `at`.
    ///
    /// Returns `None` if no terminator follows or the bytes are not valid UTF-8.
    pub fn get_str(&self, at: usize) -> Option<&str> {
        let tail = self.buffer.get(at..)?;
        let len = tail.iter().position(|&b| b == 0)?;
        std::str::from_utf8(&tail[..len]).ok()
    }

    fn exhausted(&self, what: &str) -> KuromojiError {
        KuromojiError::invalid_format(
            "buffer",
            format!("unexpected end of buffer at {} reading {what}", self.position),
        )
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let value = self.get_u8(self.position).ok_or_else(|| self.exhausted("u8"))?;
        self.position += 1;
        Ok(value)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let value = self.get_i16(self.position).ok_or_else(|| self.exhausted("i16"))?;
        self.position += 2;
        Ok(value)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let value = self.get_i32(self.position).ok_or_else(|| self.exhausted("i32"))?;
        self.position += 4;
        Ok(value)
    }

    pub fn read_str(&mut self) -> Result<String> {
        let value = self
            .get_str(self.position)
            .ok_or_else(|| self.exhausted("string"))?
            .to_string();
        self.position += value.len() + 1;
        Ok(value)
    }
}

/// Number of bytes [`ByteBuffer::put_str`] writes for `s`.
pub fn encoded_len(s: &str) -> usize {
    s.chars().map(char::len_utf8).sum::<usize>() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_str_lengths() {
        for (s, expected) in [
            ("âbcde", 7),
            ("あいうえお", 16),
            ("𠮷野屋", 11),
            ("", 1),
        ] {
            let mut buffer = ByteBuffer::default();
            buffer.put_str(s).unwrap();
            assert_eq!(buffer.position(), expected, "{s}");
            assert_eq!(encoded_len(s), expected, "{s}");
        }
    }

    #[test]
    fn test_put_long_str() {
        let s = "0123456789".repeat(6);
        let mut buffer = ByteBuffer::default();
        buffer.put_str(&s).unwrap();
        assert_eq!(buffer.position(), 61);
        assert_eq!(buffer.get_str(0), Some(s.as_str()));
    }

    #[test]
    fn test_str_with_astral_char() {
        let mut buffer = ByteBuffer::with_capacity(2);
        buffer.put_str("𠮷野屋").unwrap();
        buffer.put_str("âbcde").unwrap();
        buffer.shrink();
        assert_eq!(buffer.size(), 18);

        let mut buffer = ByteBuffer::from_bytes(buffer.into_bytes());
        assert_eq!(buffer.read_str().unwrap(), "𠮷野屋");
        assert_eq!(buffer.read_str().unwrap(), "âbcde");
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    fn test_put_str_nul() {
        let mut buffer = ByteBuffer::default();
        assert!(buffer.put_str("a\0b").is_err());
        assert_eq!(buffer.position(), 0);
    }

    #[test]
    fn test_integers() {
        let mut buffer = ByteBuffer::with_capacity(1);
        buffer.put_i16(-413);
        buffer.put_i32(-1_234_567);
        buffer.put_u8(255);
        assert_eq!(buffer.position(), 7);

        assert_eq!(buffer.get_i16(0), Some(-413));
        assert_eq!(buffer.get_i32(2), Some(-1_234_567));
        assert_eq!(buffer.get_u8(6), Some(255));
        assert_eq!(buffer.position(), 7);

        buffer.shrink();
        assert_eq!(buffer.as_bytes()[..2], (-413i16).to_le_bytes());
    }

    #[test]
    fn test_storage_doubles() {
        let mut buffer = ByteBuffer::with_capacity(4);
        buffer.put_i32(1);
        assert_eq!(buffer.size(), 4);
        buffer.put_u8(2);
        assert_eq!(buffer.size(), 8);
        buffer.put_i32(3);
        assert_eq!(buffer.size(), 16);
        buffer.shrink();
        assert_eq!(buffer.size(), 9);
    }

    #[test]
    fn test_sequential_read_exhausted() {
        let mut buffer = ByteBuffer::from_bytes(vec![1, 0, 0]);
        assert_eq!(buffer.read_i16().unwrap(), 1);
        assert!(buffer.read_i16().is_err());
        assert_eq!(buffer.read_u8().unwrap(), 0);
        assert!(buffer.read_u8().is_err());
    }

    #[test]
    fn test_get_str_out_of_range() {
        let buffer = ByteBuffer::from_bytes(b"abc".to_vec());
        assert_eq!(buffer.get_str(0), None);
        assert_eq!(buffer.get_str(10), None);
    }
}
