/// Connection ids and emission cost of a word.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct WordParam {
    /// Left connection id.
    pub left_id: u16,
    /// Right connection id.
    pub right_id: u16,
    /// Cost of the word.
    pub word_cost: i16,
}

impl WordParam {
    /// Creates a new instance.
    #[inline(always)]
    pub const fn new(left_id: u16, right_id: u16, word_cost: i16) -> Self {
        Self {
            left_id,
            right_id,
            word_cost,
        }
    }
}
