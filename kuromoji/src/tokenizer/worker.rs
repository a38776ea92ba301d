//! Provider of a routine for tokenization.
use crate::sentence::Sentence;
use crate::token::{Token, TokenIter};
use crate::tokenizer::Tokenizer;
use crate::tokenizer::lattice::{Lattice, Node};
use crate::tokenizer::viterbi;

/// Provider of a routine for tokenization.
///
/// It holds the internal data structures used in tokenization,
/// which can be reused to avoid unnecessary memory reallocation.
pub struct Worker {
    pub(crate) tokenizer: Tokenizer,
    pub(crate) sent: Sentence,
    pub(crate) lattice: Lattice,
    pub(crate) top_nodes: Vec<(usize, Node)>,
}

impl Worker {
    /// Creates a new instance.
    pub(crate) fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            sent: Sentence::new(),
            lattice: Lattice::default(),
            top_nodes: vec![],
        }
    }

    /// Resets the input sentence to be tokenized.
    pub fn reset_sentence<S>(&mut self, input: S)
    where
        S: AsRef<str>,
    {
        self.sent.clear();
        self.top_nodes.clear();
        let input = input.as_ref();
        if !input.is_empty() {
            self.sent.set_sentence(input);
            self.sent.compile(self.tokenizer.dictionary().char_def());
        }
    }

    /// Builds the lattice of the input sentence without decoding it.
    pub fn build_lattice(&mut self) {
        self.tokenizer.build_lattice(&self.sent, &mut self.lattice);
    }

    /// Tokenizes the sentence set by [`Self::reset_sentence`].
    /// The result is read through [`Self::token`] or [`Self::token_iter`].
    pub fn tokenize(&mut self) {
        self.top_nodes.clear();
        if self.sent.chars().is_empty() {
            return;
        }
        self.build_lattice();
        viterbi::forward(&mut self.lattice, self.tokenizer.dictionary().connector());
        viterbi::backward(&self.lattice, &mut self.top_nodes);
    }

    /// Gets the lattice built at the last call of [`Self::build_lattice`] or
    /// [`Self::tokenize`].
    #[inline(always)]
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Gets the number of resultant tokens.
    #[inline(always)]
    pub fn num_tokens(&self) -> usize {
        self.top_nodes.len()
    }

    /// Gets the `i`-th resultant token.
    #[inline(always)]
    pub fn token<'w>(&'w self, i: usize) -> Token<'w> {
        let index = self.num_tokens() - i - 1;
        Token::new(self, index)
    }

    /// Creates an iterator of resultant tokens.
    #[inline(always)]
    pub fn token_iter<'w>(&'w self) -> TokenIter<'w> {
        TokenIter::new(self)
    }
}
