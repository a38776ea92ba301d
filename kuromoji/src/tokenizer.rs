//! Viterbi-based tokenizer.
/// Lattice of candidate words.
pub mod lattice;
/// Minimum-cost path search.
pub mod viterbi;
/// Reusable tokenization state.
pub mod worker;

use std::sync::Arc;

use crate::Dictionary;
use crate::dictionary::WordType;
use crate::dictionary::character::CharacterClass;
use crate::dictionary::lexicon::WordParam;
use crate::sentence::{Sentence, split_by_punctuation};
use crate::token::TokenBuf;
use crate::tokenizer::lattice::{INVALID_WORD_ID, Lattice};
use crate::tokenizer::worker::Worker;

/// Tokenizer.
#[derive(Clone)]
pub struct Tokenizer {
    dict: Arc<Dictionary>,
    max_grouping_len: Option<usize>,
}

impl Tokenizer {
    /// Creates a new tokenizer.
    ///
    /// The dictionary is moved into the tokenizer. If you need to share the dictionary
    /// among multiple tokenizers, use [`Tokenizer::from_shared_dictionary`].
    pub fn new(dict: Dictionary) -> Self {
        Self {
            dict: Arc::new(dict),
            max_grouping_len: None,
        }
    }

    /// Creates a new Tokenizer from a shared Dictionary.
    pub fn from_shared_dictionary(dict: Arc<Dictionary>) -> Self {
        Self {
            dict,
            max_grouping_len: None,
        }
    }

    /// Specifies the maximum grouping length for unknown words.
    /// By default, the length is infinity.
    ///
    /// A run of characters longer than this does not become a single
    /// grouped unknown word; its prefix words are still generated.
    ///
    /// # Arguments
    ///
    ///  - `max_grouping_len`: The maximum grouping length for unknown words.
    ///    The default value is 0, indicating the infinity length.
    pub const fn max_grouping_len(mut self, max_grouping_len: usize) -> Self {
        if max_grouping_len != 0 {
            self.max_grouping_len = Some(max_grouping_len);
        } else {
            self.max_grouping_len = None;
        }
        self
    }

    /// Gets the reference to the dictionary.
    #[inline(always)]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// Creates a new worker.
    pub fn new_worker(&self) -> Worker {
        Worker::new(self.clone())
    }

    /// Tokenizes `text` into owned tokens.
    ///
    /// The text is split after every `、` and `。` and each sentence is
    /// decoded independently. Token positions are relative to the whole
    /// text.
    pub fn tokenize(&self, text: &str) -> Vec<TokenBuf> {
        let mut worker = self.new_worker();
        let mut tokens = vec![];
        let (mut offset_char, mut offset_byte) = (0, 0);
        for sentence in split_by_punctuation(text) {
            worker.reset_sentence(sentence);
            worker.tokenize();
            tokens.extend(worker.token_iter().map(|t| {
                let mut token = t.to_buf();
                token.shift(offset_char, offset_byte);
                token
            }));
            offset_char += sentence.chars().count();
            offset_byte += sentence.len();
        }
        tokens
    }

    pub(crate) fn build_lattice(&self, sent: &Sentence, lattice: &mut Lattice) {
        lattice.reset(sent.len_char());
        for start in 0..sent.len_char() {
            debug_assert!(lattice.has_previous_node(start));
            self.add_lattice_edges(sent, lattice, start);
        }
        lattice.insert_eos();
    }

    fn add_lattice_edges(&self, sent: &Sentence, lattice: &mut Lattice, start: usize) {
        let dict = &*self.dict;
        let mut has_matched = false;

        if let Some(trie) = dict.trie() {
            let suffix = &sent.chars()[start..];
            for m in trie.common_prefix_iterator(suffix) {
                debug_assert!(start + m.end_char <= sent.len_char());
                for &word_id in dict.known().lookup(m.value) {
                    let param = dict.word_param(WordType::Known, word_id);
                    lattice.insert_node(start, start + m.end_char, word_id, WordType::Known, param);
                    has_matched = true;
                }
            }
        }

        let char_def = dict.char_def();
        let mut has_unknown = false;
        if let Some(class) = char_def.lookup(sent.chars()[start])
            && (!has_matched || class.always_invoke())
        {
            let compatible = char_def.lookup_compatible(sent.chars()[start]);
            for class in std::iter::once(class).chain(compatible) {
                has_unknown |= self.add_unknown_words(sent, lattice, start, class);
            }
        }

        if !(has_matched || has_unknown) || !lattice.has_previous_node(start + 1) {
            self.add_fallback_word(lattice, start);
        }
    }

    /// Adds the unknown words of `class` starting at `start`, returning
    /// whether any was added.
    fn add_unknown_words(
        &self,
        sent: &Sentence,
        lattice: &mut Lattice,
        start: usize,
        class: &CharacterClass,
    ) -> bool {
        let word_ids = self.dict.unknown().lookup(u32::from(class.class_id()));
        if word_ids.is_empty() {
            return false;
        }
        let mut inserted = false;
        let mut insert = |len: usize| {
            for &word_id in word_ids {
                let param = self.dict.word_param(WordType::Unknown, word_id);
                lattice.insert_node(start, start + len, word_id, WordType::Unknown, param);
            }
            inserted = true;
        };

        let run = sent.run_length(start, class.class_id()).max(1);
        let mut grouped = None;
        if class.grouping() && self.max_grouping_len.is_none_or(|max| run <= max) {
            insert(run);
            grouped = Some(run);
        }
        for len in 1..=run.min(class.max_length() as usize) {
            if Some(len) != grouped {
                insert(len);
            }
        }
        inserted
    }

    /// Adds a single-character word of `DEFAULT` so that the lattice stays
    /// connected.
    fn add_fallback_word(&self, lattice: &mut Lattice, start: usize) {
        let word_ids = self
            .dict
            .char_def()
            .default_class()
            .map_or(&[][..], |class| {
                self.dict.unknown().lookup(u32::from(class.class_id()))
            });
        if word_ids.is_empty() {
            lattice.insert_node(
                start,
                start + 1,
                INVALID_WORD_ID,
                WordType::Unknown,
                WordParam::default(),
            );
            return;
        }
        for &word_id in word_ids {
            let param = self.dict.word_param(WordType::Unknown, word_id);
            lattice.insert_node(start, start + 1, word_id, WordType::Unknown, param);
        }
    }
}
