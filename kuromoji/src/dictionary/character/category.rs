use std::fmt;

use crate::common::MAX_CATEGORIES;

/// Fixed-width set of character class ids.
///
/// Class ids are bit positions, so at most [`MAX_CATEGORIES`] classes exist.
#[derive(Default, Clone, Copy, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct CategorySet(u32);

impl CategorySet {
    /// Creates an empty set.
    #[inline(always)]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Creates a set from its bit representation.
    #[inline(always)]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Gets the bit representation.
    #[inline(always)]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Checks if the set is empty.
    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Adds `class_id` to the set.
    #[inline(always)]
    pub fn insert(&mut self, class_id: u8) {
        debug_assert!(usize::from(class_id) < MAX_CATEGORIES);
        self.0 |= 1 << class_id;
    }

    /// Checks if `class_id` is in the set.
    #[inline(always)]
    pub const fn contains(self, class_id: u8) -> bool {
        (class_id as usize) < MAX_CATEGORIES && self.0 & (1 << class_id) != 0
    }

    /// Checks if the sets share a class.
    #[inline(always)]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Gets the union of the sets.
    #[inline(always)]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Iterates class ids in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let class_id = bits.trailing_zeros() as u8;
            bits &= bits - 1;
            Some(class_id)
        })
    }
}

impl fmt::Debug for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_iter() {
        let mut set = CategorySet::new();
        assert!(set.is_empty());
        set.insert(31);
        set.insert(3);
        set.insert(0);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 3, 31]);
        assert!(set.contains(31));
        assert!(!set.contains(2));
        assert!(!set.contains(40));
    }

    #[test]
    fn test_intersects() {
        let a = CategorySet::from_bits(0b0110);
        let b = CategorySet::from_bits(0b0100);
        let c = CategorySet::from_bits(0b1000);
        assert!(a.intersects(b));
        assert!(!a.intersects(c));
        assert_eq!(a.union(c).bits(), 0b1110);
    }
}
