//! Dictionary for tokenization.
pub(crate) mod builder;
/// Character classification.
pub mod character;
/// Segment layout and loading policy.
pub mod config;
/// Connection costs between adjacent words.
pub mod connector;
/// Word stores.
pub mod lexicon;
pub(crate) mod storage;

use crate::dictionary::character::CharacterDefinition;
use crate::dictionary::connector::MatrixConnector;
use crate::dictionary::lexicon::map::trie::Trie;
use crate::dictionary::lexicon::{WordParam, WordStore};

pub use crate::dictionary::builder::SystemDictionaryBuilder;
pub use crate::dictionary::config::{LoadPolicy, Segment, SegmentGroup};

/// Type of a word.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Default)]
pub enum WordType {
    /// Word from the system lexicon.
    #[default]
    Known,
    /// Word synthesized from a character class.
    Unknown,
    /// Word from a user lexicon. User lexicons are not supported, so no
    /// token has this type.
    User,
}

/// Dictionary for tokenization.
///
/// A dictionary consists of the surface trie, the known-word store, the
/// connection matrix, the unknown-word store and the character classifier.
/// It is immutable once built or loaded and can be shared between threads.
pub struct Dictionary {
    pub(crate) trie: Option<Trie>,
    pub(crate) known: WordStore,
    pub(crate) connector: MatrixConnector,
    pub(crate) unknown: WordStore,
    pub(crate) char_def: CharacterDefinition,
    pub(crate) degraded: Vec<SegmentGroup>,
}

impl Dictionary {
    pub(crate) fn new(
        trie: Option<Trie>,
        known: WordStore,
        connector: MatrixConnector,
        unknown: WordStore,
        char_def: CharacterDefinition,
    ) -> Self {
        Self {
            trie,
            known,
            connector,
            unknown,
            char_def,
            degraded: vec![],
        }
    }

    /// Gets the surface trie, or `None` if the lexicon is empty or its
    /// segment failed to load.
    #[inline(always)]
    pub fn trie(&self) -> Option<&Trie> {
        self.trie.as_ref()
    }

    /// Gets the store of known words.
    #[inline(always)]
    pub fn known(&self) -> &WordStore {
        &self.known
    }

    /// Gets the store of unknown-word templates.
    #[inline(always)]
    pub fn unknown(&self) -> &WordStore {
        &self.unknown
    }

    /// Gets the connection cost matrix.
    #[inline(always)]
    pub fn connector(&self) -> &MatrixConnector {
        &self.connector
    }

    /// Gets the character classifier.
    #[inline(always)]
    pub fn char_def(&self) -> &CharacterDefinition {
        &self.char_def
    }

    /// Segment groups that failed to load under [`LoadPolicy::Lenient`].
    pub fn degraded_segments(&self) -> &[SegmentGroup] {
        &self.degraded
    }

    /// Whether every segment group is available.
    pub fn is_complete(&self) -> bool {
        self.degraded.is_empty()
    }

    fn store(&self, word_type: WordType) -> Option<&WordStore> {
        match word_type {
            WordType::Known => Some(&self.known),
            WordType::Unknown => Some(&self.unknown),
            WordType::User => None,
        }
    }

    /// Gets the parameters of a word; invalid ids yield zero parameters.
    #[inline(always)]
    pub(crate) fn word_param(&self, word_type: WordType, word_id: u32) -> WordParam {
        self.store(word_type)
            .and_then(|store| store.word_param(word_id))
            .unwrap_or_default()
    }

    /// Gets the `surface,feature,...` string of a word.
    #[inline(always)]
    pub fn word_feature(&self, word_type: WordType, word_id: u32) -> &str {
        self.store(word_type)
            .map_or("", |store| store.features(word_id))
    }
}
