use std::io::Read;

use hashbrown::HashMap;

use crate::dictionary::Dictionary;
use crate::dictionary::character::CharacterDefinition;
use crate::dictionary::connector::{ConnectorView, MatrixConnector};
use crate::dictionary::lexicon::map::trie::Trie;
use crate::dictionary::lexicon::{RawWordEntry, WordStore};
use crate::errors::{Diagnostic, KuromojiError, Result, skip_line};

/// Builder for a [`Dictionary`] from MeCab-style source files.
pub struct SystemDictionaryBuilder {}

impl SystemDictionaryBuilder {
    /// Creates a new [`Dictionary`] from readers of the source files.
    ///
    /// Skipped lines are logged; use
    /// [`from_readers_with_diagnostics`](Self::from_readers_with_diagnostics)
    /// to inspect them.
    ///
    /// # Arguments
    ///
    /// * `lexicon_rdr` - A reader of `lex.csv`.
    /// * `matrix_rdr` - A reader of `matrix.def`.
    /// * `char_def_rdr` - A reader of `char.def`.
    /// * `unk_def_rdr` - A reader of `unk.def`.
    ///
    /// # Errors
    ///
    /// [`KuromojiError`] is returned when an input cannot be read, a
    /// structural element is malformed, or a connection id is outside the
    /// matrix.
    pub fn from_readers<S, C, P, U>(
        lexicon_rdr: S,
        matrix_rdr: C,
        char_def_rdr: P,
        unk_def_rdr: U,
    ) -> Result<Dictionary>
    where
        S: Read,
        C: Read,
        P: Read,
        U: Read,
    {
        Self::from_readers_with_diagnostics(lexicon_rdr, matrix_rdr, char_def_rdr, unk_def_rdr)
            .map(|(dict, _)| dict)
    }

    /// Same as [`from_readers`](Self::from_readers), also returning the
    /// lines skipped in every source.
    pub fn from_readers_with_diagnostics<S, C, P, U>(
        lexicon_rdr: S,
        matrix_rdr: C,
        char_def_rdr: P,
        unk_def_rdr: U,
    ) -> Result<(Dictionary, Vec<Diagnostic>)>
    where
        S: Read,
        C: Read,
        P: Read,
        U: Read,
    {
        let mut diagnostics = vec![];

        let known_entries = RawWordEntry::from_reader(lexicon_rdr, "lex.csv", &mut diagnostics)?;
        let connector = MatrixConnector::from_reader(matrix_rdr, &mut diagnostics)?;
        let char_def = CharacterDefinition::from_reader(char_def_rdr, &mut diagnostics)?;
        let unk_entries = RawWordEntry::from_reader(unk_def_rdr, "unk.def", &mut diagnostics)?;

        let (trie, known) = Self::build_known(&known_entries)?;
        let unknown = Self::build_unknown(&unk_entries, &char_def, &mut diagnostics)?;

        if !known.verify(&connector) {
            return Err(KuromojiError::invalid_argument(
                "lexicon_rdr",
                "includes a connection id whose is out of range.",
            ));
        }
        if !unknown.verify(&connector) {
            return Err(KuromojiError::invalid_argument(
                "unk_def_rdr",
                "includes a connection id whose is out of range.",
            ));
        }
        log::info!(
            "built a dictionary of {} known words, {} unknown words, {}x{} connection ids and {} character classes",
            known.num_words(),
            unknown.num_words(),
            connector.num_right(),
            connector.num_left(),
            char_def.registry().len(),
        );

        Ok((
            Dictionary::new(trie, known, connector, unknown, char_def),
            diagnostics,
        ))
    }

    /// Stores every entry and maps each distinct surface, numbered in order
    /// of first occurrence, to all words with that surface.
    fn build_known(entries: &[RawWordEntry]) -> Result<(Option<Trie>, WordStore)> {
        let mut store = WordStore::default();
        let ids = store.build_dictionary(entries)?;

        let mut trie_ids: HashMap<&str, u32> = HashMap::new();
        let mut records = vec![];
        for (word_id, surface) in ids {
            let next_id = u32::try_from(trie_ids.len())?;
            let trie_id = *trie_ids.entry(surface).or_insert_with(|| {
                records.push((surface, next_id));
                next_id
            });
            store.add_mapping(trie_id, word_id);
        }

        let trie = if records.is_empty() {
            None
        } else {
            Some(Trie::from_records(&records)?)
        };
        Ok((trie, store))
    }

    /// Stores every entry and maps class ids to the words of that class.
    /// Entries naming an undefined class are stored but left unmapped.
    fn build_unknown(
        entries: &[RawWordEntry],
        char_def: &CharacterDefinition,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<WordStore> {
        let mut store = WordStore::default();
        let ids = store.build_dictionary(entries)?;
        for ((word_id, class_name), entry) in ids.into_iter().zip(entries) {
            match char_def.registry().id(class_name) {
                Some(class_id) => store.add_mapping(u32::from(class_id), word_id),
                None => skip_line(
                    diagnostics,
                    "unk.def",
                    entry.line,
                    &entry.raw,
                    "undefined character class",
                ),
            }
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dictionary::WordType;

    const CHAR_DEF: &str = "DEFAULT 0 1 0\nKANJI 0 0 2\n0x4E00..0x9FA5 KANJI\n";
    const MATRIX_DEF: &str = "2 2\n0 0 0\n0 1 0\n1 0 0\n1 1 0\n";

    #[test]
    fn test_build() {
        let lexicon_csv = "自然,1,1,1,名詞\n言語,1,1,4,名詞\n自然,0,0,2,形容動詞\n";
        let unk_def = "DEFAULT,0,0,100,*\nKANJI,1,1,200,名詞\n";
        let (dict, diagnostics) = SystemDictionaryBuilder::from_readers_with_diagnostics(
            lexicon_csv.as_bytes(),
            MATRIX_DEF.as_bytes(),
            CHAR_DEF.as_bytes(),
            unk_def.as_bytes(),
        )
        .unwrap();
        assert!(diagnostics.is_empty());

        let trie = dict.trie().unwrap();
        assert_eq!(trie.exact_match("自然"), Some(0));
        assert_eq!(trie.exact_match("言語"), Some(1));
        assert_eq!(dict.known().lookup(0), &[0, 20]);
        assert_eq!(dict.known().lookup(1), &[10]);
        assert_eq!(dict.word_feature(WordType::Known, 20), "自然,形容動詞");

        let kanji = dict.char_def().registry().id("KANJI").unwrap();
        let unk_ids = dict.unknown().lookup(u32::from(kanji));
        assert_eq!(unk_ids, &[10]);
        assert_eq!(dict.word_param(WordType::Unknown, 10).word_cost, 200);
    }

    #[test]
    fn test_undefined_unknown_class() {
        let unk_def = "DEFAULT,0,0,100,*\nHIRAGANA,1,1,200,名詞\n";
        let (dict, diagnostics) = SystemDictionaryBuilder::from_readers_with_diagnostics(
            "".as_bytes(),
            MATRIX_DEF.as_bytes(),
            CHAR_DEF.as_bytes(),
            unk_def.as_bytes(),
        )
        .unwrap();
        assert!(dict.trie().is_none());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].source, "unk.def");
        assert_eq!(diagnostics[0].line, 2);
        assert_eq!(diagnostics[0].text, "HIRAGANA,1,1,200,名詞");
        assert_eq!(dict.unknown().map().num_keys(), 1);
    }

    #[test]
    fn test_oor_lex() {
        let lexicon_csv = "自然,1,1,1\n言語,1,2,4\n";
        let unk_def = "DEFAULT,0,0,100,*\n";
        let result = SystemDictionaryBuilder::from_readers(
            lexicon_csv.as_bytes(),
            MATRIX_DEF.as_bytes(),
            CHAR_DEF.as_bytes(),
            unk_def.as_bytes(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_oor_unk() {
        let lexicon_csv = "自然,1,1,1\n";
        let unk_def = "DEFAULT,0,2,100,*\n";
        let result = SystemDictionaryBuilder::from_readers(
            lexicon_csv.as_bytes(),
            MATRIX_DEF.as_bytes(),
            CHAR_DEF.as_bytes(),
            unk_def.as_bytes(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_default_class() {
        let result = SystemDictionaryBuilder::from_readers(
            "".as_bytes(),
            MATRIX_DEF.as_bytes(),
            "KANJI 0 0 2\n".as_bytes(),
            "".as_bytes(),
        );
        assert!(result.is_err());
    }
}
