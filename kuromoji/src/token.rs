//! Container of resultant tokens.
use std::ops::Range;

use crate::common::MISSING_FEATURE;
use crate::dictionary::WordType;
use crate::tokenizer::lattice::Node;
use crate::tokenizer::worker::Worker;
use crate::utils::parse_csv_row;

/// Resultant token.
pub struct Token<'w> {
    worker: &'w Worker,
    index: usize,
}

impl<'w> Token<'w> {
    #[inline(always)]
    pub(crate) const fn new(worker: &'w Worker, index: usize) -> Self {
        Self { worker, index }
    }

    #[inline(always)]
    fn node(&self) -> &'w (usize, Node) {
        &self.worker.top_nodes[self.index]
    }

    /// Gets the position range of the token in characters.
    #[inline(always)]
    pub fn range_char(&self) -> Range<usize> {
        let (end, node) = self.node();
        node.start..*end
    }

    /// Gets the position range of the token in bytes.
    #[inline(always)]
    pub fn range_byte(&self) -> Range<usize> {
        let sent = &self.worker.sent;
        let (end, node) = self.node();
        sent.byte_position(node.start)..sent.byte_position(*end)
    }

    /// Gets the 1-based character position of the token in the sentence.
    #[inline(always)]
    pub fn position(&self) -> usize {
        self.node().1.start + 1
    }

    /// Gets the surface string of the token.
    #[inline(always)]
    pub fn surface(&self) -> &'w str {
        let sent = &self.worker.sent;
        &sent.raw()[self.range_byte()]
    }

    /// Gets the word id, [`INVALID_WORD_ID`](crate::tokenizer::lattice::INVALID_WORD_ID) for a fallback word.
    #[inline(always)]
    pub fn word_id(&self) -> u32 {
        self.node().1.word_id
    }

    /// Gets the type of the token's word.
    #[inline(always)]
    pub fn word_type(&self) -> WordType {
        self.node().1.word_type().unwrap_or_default()
    }

    /// Gets the `surface,feature,...` string of the token's word.
    ///
    /// Empty for a fallback word without a dictionary entry.
    #[inline(always)]
    pub fn feature(&self) -> &'w str {
        self.worker
            .tokenizer
            .dictionary()
            .word_feature(self.word_type(), self.word_id())
    }

    /// Gets the left id of the token's node.
    #[inline(always)]
    pub fn left_id(&self) -> u16 {
        self.node().1.left_id
    }

    /// Gets the right id of the token's node.
    #[inline(always)]
    pub fn right_id(&self) -> u16 {
        self.node().1.right_id
    }

    /// Gets the word cost of the token's node.
    #[inline(always)]
    pub fn word_cost(&self) -> i16 {
        self.node().1.word_cost
    }

    /// Gets the total cost from BOS to the token's node.
    #[inline(always)]
    pub fn total_cost(&self) -> i32 {
        self.node().1.min_cost
    }

    /// Copies the token into an owned [`TokenBuf`] with its features split.
    pub fn to_buf(&self) -> TokenBuf {
        let fields = match self.word_type() {
            WordType::User => vec![],
            _ => parse_csv_row(self.feature()).unwrap_or_default(),
        };
        let field = |i: usize| {
            fields
                .get(i)
                .filter(|f| !f.is_empty())
                .map_or_else(|| MISSING_FEATURE.to_string(), Clone::clone)
        };
        let (reading, pronunciation) = match self.word_type() {
            WordType::Known => (field(8), field(9)),
            _ => (MISSING_FEATURE.to_string(), MISSING_FEATURE.to_string()),
        };
        TokenBuf {
            word_id: self.word_id(),
            word_type: self.word_type(),
            word_position: self.position(),
            surface_form: self.surface().to_string(),
            pos: field(1),
            pos_detail_1: field(2),
            pos_detail_2: field(3),
            pos_detail_3: field(4),
            conjugated_type: field(5),
            conjugated_form: field(6),
            basic_form: field(7),
            reading,
            pronunciation,
            range_char: self.range_char(),
            range_byte: self.range_byte(),
            left_id: self.left_id(),
            right_id: self.right_id(),
            word_cost: self.word_cost(),
            total_cost: self.total_cost(),
        }
    }
}

impl std::fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("surface", &self.surface())
            .field("range_char", &self.range_char())
            .field("range_byte", &self.range_byte())
            .field("feature", &self.feature())
            .field("word_type", &self.word_type())
            .field("left_id", &self.left_id())
            .field("right_id", &self.right_id())
            .field("word_cost", &self.word_cost())
            .field("total_cost", &self.total_cost())
            .finish()
    }
}

/// Iterator of tokens.
pub struct TokenIter<'w> {
    worker: &'w Worker,
    i: usize,
}

impl<'w> TokenIter<'w> {
    #[inline(always)]
    pub(crate) const fn new(worker: &'w Worker) -> Self {
        Self { worker, i: 0 }
    }
}

impl<'w> Iterator for TokenIter<'w> {
    type Item = Token<'w>;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.i < self.worker.num_tokens() {
            let t = self.worker.token(self.i);
            self.i += 1;
            Some(t)
        } else {
            None
        }
    }
}

/// An owned token with IPADIC-style fields.
///
/// Fields the dictionary does not provide are `"*"`. Unknown words never
/// carry a reading or pronunciation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TokenBuf {
    /// Word id in the store of its type.
    pub word_id: u32,
    /// Known or unknown.
    pub word_type: WordType,
    /// 1-based character position in the whole input text.
    pub word_position: usize,
    /// Surface string.
    pub surface_form: String,
    /// Part of speech.
    pub pos: String,
    /// Part-of-speech subdivision 1.
    pub pos_detail_1: String,
    /// Part-of-speech subdivision 2.
    pub pos_detail_2: String,
    /// Part-of-speech subdivision 3.
    pub pos_detail_3: String,
    /// Conjugation type.
    pub conjugated_type: String,
    /// Conjugation form.
    pub conjugated_form: String,
    /// Dictionary form.
    pub basic_form: String,
    /// Reading in katakana.
    pub reading: String,
    /// Pronunciation in katakana.
    pub pronunciation: String,
    /// Position range in characters of the whole text.
    pub range_char: Range<usize>,
    /// Position range in bytes of the whole text.
    pub range_byte: Range<usize>,
    /// Left connection id.
    pub left_id: u16,
    /// Right connection id.
    pub right_id: u16,
    /// Cost of the word itself.
    pub word_cost: i16,
    /// Total cost from the beginning of its sentence.
    pub total_cost: i32,
}

impl TokenBuf {
    /// Shifts the positions by a sentence offset in characters and bytes.
    pub(crate) fn shift(&mut self, offset_char: usize, offset_byte: usize) {
        self.word_position += offset_char;
        self.range_char = self.range_char.start + offset_char..self.range_char.end + offset_char;
        self.range_byte = self.range_byte.start + offset_byte..self.range_byte.end + offset_byte;
    }

    /// Formats the token as a MeCab output line.
    pub fn to_mecab_line(&self) -> String {
        format!(
            "{}\t{},{},{},{},{},{},{},{},{}",
            self.surface_form,
            self.pos,
            self.pos_detail_1,
            self.pos_detail_2,
            self.pos_detail_3,
            self.conjugated_type,
            self.conjugated_form,
            self.basic_form,
            self.reading,
            self.pronunciation,
        )
    }
}

impl<'w> From<Token<'w>> for TokenBuf {
    fn from(token: Token<'w>) -> Self {
        token.to_buf()
    }
}
