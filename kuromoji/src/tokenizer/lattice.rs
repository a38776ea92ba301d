use crate::common::BOS_EOS_CONNECTION_ID;
use crate::dictionary::WordType;
use crate::dictionary::lexicon::WordParam;

pub(crate) const MAX_COST: i32 = i32::MAX;
pub(crate) const INVALID_IDX: u32 = u32::MAX;

/// Word id of BOS, EOS and fallback nodes without a dictionary entry.
pub const INVALID_WORD_ID: u32 = u32::MAX;

/// Kind of a lattice node.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NodeKind {
    /// Beginning of the sentence.
    Bos,
    /// End of the sentence.
    Eos,
    /// A word of the given type.
    Word(WordType),
}

/// A node in the lattice.
#[derive(Debug, Clone, Copy)]
pub struct Node {
    /// Word id in the store of its type.
    pub word_id: u32,
    /// Kind of the node.
    pub kind: NodeKind,
    /// Start position in characters.
    pub start: usize,
    /// Left connection id.
    pub left_id: u16,
    /// Right connection id.
    pub right_id: u16,
    /// Cost of the word itself.
    pub word_cost: i16,
    /// Index of the best predecessor among the nodes ending at `start`.
    pub min_idx: u32,
    /// Minimum cumulative cost from BOS, including this node's word cost.
    pub min_cost: i32,
}

impl Node {
    /// Checks if the forward pass found a path from BOS to the node.
    #[inline(always)]
    pub fn is_connected_to_bos(&self) -> bool {
        self.min_cost != MAX_COST
    }

    /// Checks if the node is BOS.
    #[inline(always)]
    pub fn is_bos(&self) -> bool {
        self.kind == NodeKind::Bos
    }

    /// Gets the word type, or [`None`] for BOS and EOS.
    #[inline(always)]
    pub fn word_type(&self) -> Option<WordType> {
        match self.kind {
            NodeKind::Word(word_type) => Some(word_type),
            _ => None,
        }
    }
}

/// Candidate words of a sentence bucketed by end position.
///
/// `ends[i]` holds the nodes ending at character position `i`; BOS is the
/// only node in `ends[0]`.
#[derive(Default)]
pub struct Lattice {
    ends: Vec<Vec<Node>>,
    eos: Option<Node>,
    len_char: usize, // needed for avoiding to free ends
}

impl Lattice {
    /// Clears the lattice for a sentence of `len_char` characters and inserts BOS.
    pub fn reset(&mut self, len_char: usize) {
        Self::reset_vec(&mut self.ends, len_char + 1);
        self.len_char = len_char;
        self.eos = None;
        self.insert_bos();
    }

    fn reset_vec<T>(data: &mut Vec<Vec<T>>, new_len: usize) {
        for v in data.iter_mut() {
            v.clear();
        }
        let cur_len = data.len();
        if cur_len <= new_len {
            data.reserve(new_len - cur_len);
            for _ in cur_len..new_len {
                data.push(Vec::with_capacity(16))
            }
        }
    }

    /// Returns the number of characters of the set sentence.
    #[inline(always)]
    pub const fn len_char(&self) -> usize {
        self.len_char
    }

    fn insert_bos(&mut self) {
        self.ends[0].push(Node {
            word_id: INVALID_WORD_ID,
            kind: NodeKind::Bos,
            start: 0,
            left_id: u16::MAX,
            right_id: BOS_EOS_CONNECTION_ID,
            word_cost: 0,
            min_idx: INVALID_IDX,
            min_cost: 0,
        });
    }

    /// Places EOS at the end of the sentence.
    pub fn insert_eos(&mut self) {
        self.eos = Some(Node {
            word_id: INVALID_WORD_ID,
            kind: NodeKind::Eos,
            start: self.len_char,
            left_id: BOS_EOS_CONNECTION_ID,
            right_id: u16::MAX,
            word_cost: 0,
            min_idx: INVALID_IDX,
            min_cost: MAX_COST,
        });
    }

    /// Inserts a word node spanning `start..end`.
    pub fn insert_node(
        &mut self,
        start: usize,
        end: usize,
        word_id: u32,
        word_type: WordType,
        word_param: WordParam,
    ) {
        debug_assert!(start < end);
        self.ends[end].push(Node {
            word_id,
            kind: NodeKind::Word(word_type),
            start,
            left_id: word_param.left_id,
            right_id: word_param.right_id,
            word_cost: word_param.word_cost,
            min_idx: INVALID_IDX,
            min_cost: MAX_COST,
        });
    }

    /// Checks if there exist at least one at the word end boundary
    #[inline(always)]
    pub fn has_previous_node(&self, i: usize) -> bool {
        self.ends.get(i).is_some_and(|d| !d.is_empty())
    }

    /// Gets the nodes ending at `end` in insertion order.
    #[inline(always)]
    pub fn ends_at(&self, end: usize) -> &[Node] {
        self.ends.get(end).map_or(&[], Vec::as_slice)
    }

    /// Gets EOS once it has been inserted.
    #[inline(always)]
    pub fn eos(&self) -> Option<&Node> {
        self.eos.as_ref()
    }

    /// Iterates over `(end, node)` of every word node.
    pub fn nodes(&self) -> impl Iterator<Item = (usize, &Node)> {
        self.ends
            .iter()
            .take(self.len_char + 1)
            .enumerate()
            .skip(1)
            .flat_map(|(end, nodes)| nodes.iter().map(move |node| (end, node)))
    }

    /// Splits into the finished buckets before `end` and the bucket at `end`.
    #[inline(always)]
    pub(crate) fn split_at_end_mut(&mut self, end: usize) -> (&[Vec<Node>], &mut [Node]) {
        let (left, right) = self.ends.split_at_mut(end);
        (left, &mut right[0])
    }

    #[inline(always)]
    pub(crate) fn eos_with_ends_mut(&mut self) -> (Option<&mut Node>, &[Vec<Node>]) {
        (self.eos.as_mut(), &self.ends)
    }
}

impl std::fmt::Debug for Lattice {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "Lattice {{ eos: {:?}, ends: [", &self.eos)?;
        for (i, e) in self.ends.iter().take(self.len_char + 1).enumerate() {
            writeln!(f, "{i} => {e:?}")?;
        }
        writeln!(f, "]}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_reuses_buckets() {
        let mut lattice = Lattice::default();
        lattice.reset(3);
        lattice.insert_node(0, 3, 0, WordType::Known, WordParam::new(1, 1, 1));
        assert!(lattice.has_previous_node(3));
        assert_eq!(lattice.nodes().count(), 1);

        lattice.reset(2);
        assert_eq!(lattice.len_char(), 2);
        assert!(lattice.has_previous_node(0));
        assert!(lattice.ends_at(0)[0].is_bos());
        assert!(!lattice.has_previous_node(1));
        assert!(!lattice.has_previous_node(3));
        assert_eq!(lattice.nodes().count(), 0);
        assert!(lattice.eos().is_none());
    }

    #[test]
    fn test_insert_eos() {
        let mut lattice = Lattice::default();
        lattice.reset(0);
        lattice.insert_eos();
        let eos = lattice.eos().unwrap();
        assert_eq!(eos.kind, NodeKind::Eos);
        assert_eq!(eos.left_id, BOS_EOS_CONNECTION_ID);
        assert!(!eos.is_connected_to_bos());
    }
}
