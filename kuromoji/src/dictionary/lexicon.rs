//! Word records, features and the source-to-word multimap.
//!
//! A word is a fixed 10-byte record in the record buffer:
//!
//! | offset | type | field          |
//! |--------|------|----------------|
//! | 0      | i16  | left id        |
//! | 2      | i16  | right id       |
//! | 4      | i16  | word cost      |
//! | 6      | i32  | feature offset |
//!
//! The byte offset of a record is its word id. The feature offset points at
//! a zero-terminated `surface,feature,...` string in the feature buffer.
/// Source-to-word multimap and the surface trie.
pub mod map;
/// Connection ids and costs of words.
pub mod param;

use std::io::Read;

use crate::buffer::ByteBuffer;
use crate::dictionary::connector::ConnectorView;
use crate::errors::{Diagnostic, KuromojiError, Result, skip_line};
use crate::utils::{join_csv_row, parse_csv_row};

pub use crate::dictionary::lexicon::map::IdMultimap;
pub use crate::dictionary::lexicon::param::WordParam;

/// Size of a word record in bytes.
pub const RECORD_SIZE: u32 = 10;

/// Dictionary entry parsed from a `lex.csv` or `unk.def` row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawWordEntry {
    /// Surface form, or the class name for unknown-word entries.
    pub key: String,
    /// Connection ids and cost.
    pub param: WordParam,
    /// Remaining fields joined as a csv row.
    pub features: String,
    /// 1-based line number in the source.
    pub line: usize,
    /// The row as it appears in the source.
    pub raw: String,
}

impl RawWordEntry {
    /// Parses rows of `key,left_id,right_id,cost[,feature...]`.
    ///
    /// Rows with fewer than four fields, unparsable ids or costs, or an
    /// empty key are skipped and recorded in `diagnostics`.
    pub fn from_reader<R>(
        mut rdr: R,
        source: &'static str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<Self>>
    where
        R: Read,
    {
        let mut text = String::new();
        rdr.read_to_string(&mut text)?;

        let mut entries = vec![];
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match Self::parse_row(line) {
                Ok(mut entry) => {
                    entry.line = i + 1;
                    entry.raw = line.to_string();
                    entries.push(entry);
                }
                Err(msg) => skip_line(diagnostics, source, i + 1, line, msg),
            }
        }
        Ok(entries)
    }

    fn parse_row(line: &str) -> std::result::Result<Self, &'static str> {
        let fields = parse_csv_row(line).ok_or("malformed csv row")?;
        if fields.len() < 4 {
            return Err("a row must have at least four fields");
        }
        if fields[0].is_empty() {
            return Err("the surface must not be empty");
        }
        let left_id = parse_id(&fields[1]).ok_or("invalid left id")?;
        let right_id = parse_id(&fields[2]).ok_or("invalid right id")?;
        let word_cost = fields[3].trim().parse().map_err(|_| "invalid word cost")?;
        Ok(Self {
            key: fields[0].clone(),
            param: WordParam::new(left_id, right_id, word_cost),
            features: join_csv_row(&fields[4..]),
            line: 0,
            raw: String::new(),
        })
    }
}

/// Connection ids are stored as non-negative i16.
fn parse_id(s: &str) -> Option<u16> {
    s.trim()
        .parse::<i16>()
        .ok()
        .and_then(|v| u16::try_from(v).ok())
}

/// Word records with their features and lookup multimap.
#[derive(Clone, Debug)]
pub struct WordStore {
    records: ByteBuffer,
    features: ByteBuffer,
    map: IdMultimap,
}

impl Default for WordStore {
    fn default() -> Self {
        Self {
            records: ByteBuffer::from_bytes(vec![]),
            features: ByteBuffer::from_bytes(vec![]),
            map: IdMultimap::new(),
        }
    }
}

impl WordStore {
    /// Appends a record per entry and returns `(word_id, key)` pairs in
    /// entry order.
    ///
    /// # Errors
    ///
    /// [`KuromojiError`] is returned when a connection id does not fit in
    /// the record, or a feature string contains U+0000.
    pub fn build_dictionary<'a>(
        &mut self,
        entries: &'a [RawWordEntry],
    ) -> Result<Vec<(u32, &'a str)>> {
        let mut records = std::mem::replace(&mut self.records, ByteBuffer::from_bytes(vec![]));
        let mut features = std::mem::replace(&mut self.features, ByteBuffer::from_bytes(vec![]));
        records.set_position(records.size());
        features.set_position(features.size());

        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            let word_id = u32::try_from(records.position())?;
            let offset = i32::try_from(features.position())?;
            records.put_i16(i16::try_from(entry.param.left_id)?);
            records.put_i16(i16::try_from(entry.param.right_id)?);
            records.put_i16(entry.param.word_cost);
            records.put_i32(offset);
            features.put_str(&format!(
                "{},{}",
                join_csv_row([&entry.key]),
                entry.features
            ))?;
            ids.push((word_id, entry.key.as_str()));
        }
        records.shrink();
        features.shrink();
        self.records = records;
        self.features = features;
        Ok(ids)
    }

    /// Maps `source` to `word_id`.
    pub fn add_mapping(&mut self, source: u32, word_id: u32) {
        self.map.add(source, word_id);
    }

    /// Gets the word ids mapped from `source`.
    #[inline(always)]
    pub fn lookup(&self, source: u32) -> &[u32] {
        self.map.get(source)
    }

    /// Number of word records.
    pub fn num_words(&self) -> usize {
        self.records.size() / RECORD_SIZE as usize
    }

    #[inline(always)]
    fn record_offset(&self, word_id: u32) -> Option<usize> {
        let offset = usize::try_from(word_id).ok()?;
        (word_id % RECORD_SIZE == 0 && offset + RECORD_SIZE as usize <= self.records.size())
            .then_some(offset)
    }

    /// Gets the parameters of a word, or `None` if `word_id` is not a
    /// record boundary.
    #[inline(always)]
    pub fn word_param(&self, word_id: u32) -> Option<WordParam> {
        let offset = self.record_offset(word_id)?;
        let left_id = u16::try_from(self.records.get_i16(offset)?).ok()?;
        let right_id = u16::try_from(self.records.get_i16(offset + 2)?).ok()?;
        let word_cost = self.records.get_i16(offset + 4)?;
        Some(WordParam::new(left_id, right_id, word_cost))
    }

    /// Gets the `surface,feature,...` string of a word.
    ///
    /// Returns an empty string for an invalid `word_id`.
    pub fn features(&self, word_id: u32) -> &str {
        self.record_offset(word_id)
            .and_then(|offset| self.records.get_i32(offset + 6))
            .and_then(|offset| usize::try_from(offset).ok())
            .and_then(|offset| self.features.get_str(offset))
            .unwrap_or_default()
    }

    /// Same as [`Self::features`] for a word id given as text.
    ///
    /// Returns an empty string if `word_id` is not a number or not a
    /// record.
    pub fn features_by_str(&self, word_id: &str) -> &str {
        word_id
            .trim()
            .parse()
            .map_or("", |word_id| self.features(word_id))
    }

    /// Iterates over `(word_id, param)` of every record.
    pub fn iter_params(&self) -> impl Iterator<Item = (u32, WordParam)> + '_ {
        (0..self.num_words()).filter_map(|i| {
            let word_id = u32::try_from(i).ok()? * RECORD_SIZE;
            Some((word_id, self.word_param(word_id)?))
        })
    }

    /// Checks that every connection id is inside the matrix.
    pub fn verify<C>(&self, conn: &C) -> bool
    where
        C: ConnectorView,
    {
        self.iter_params().all(|(_, param)| {
            usize::from(param.left_id) < conn.num_left()
                && usize::from(param.right_id) < conn.num_right()
        })
    }

    /// Gets the raw record bytes.
    #[inline(always)]
    pub fn records(&self) -> &[u8] {
        self.records.as_bytes()
    }

    /// Gets the raw feature bytes.
    #[inline(always)]
    pub fn feature_bytes(&self) -> &[u8] {
        self.features.as_bytes()
    }

    /// Gets the source-id to word-id map.
    #[inline(always)]
    pub fn map(&self) -> &IdMultimap {
        &self.map
    }

    /// Reassembles a store from its serialized parts.
    ///
    /// # Errors
    ///
    /// [`KuromojiError`] is returned when the record buffer is not a whole
    /// number of records or the multimap refers to a missing record.
    pub fn from_parts(records: Vec<u8>, features: Vec<u8>, map: IdMultimap) -> Result<Self> {
        if records.len() % RECORD_SIZE as usize != 0 {
            return Err(KuromojiError::invalid_format(
                "records",
                format!("{} bytes is not a multiple of {RECORD_SIZE}", records.len()),
            ));
        }
        let store = Self {
            records: ByteBuffer::from_bytes(records),
            features: ByteBuffer::from_bytes(features),
            map,
        };
        if let Some(word_id) = store
            .map
            .values()
            .find(|&word_id| store.record_offset(word_id).is_none())
        {
            return Err(KuromojiError::invalid_format(
                "map",
                format!("word id {word_id} does not refer to a record"),
            ));
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dictionary::connector::MatrixConnector;

    fn entries(data: &str) -> Vec<RawWordEntry> {
        let mut diagnostics = vec![];
        let entries = RawWordEntry::from_reader(data.as_bytes(), "lex.csv", &mut diagnostics).unwrap();
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        entries
    }

    #[test]
    fn test_parse_entries() {
        let entries = entries("もも,1,2,-30,名詞,一般\n\n\"1,2\",0,0,5,記号\n");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "もも");
        assert_eq!(entries[0].param, WordParam::new(1, 2, -30));
        assert_eq!(entries[0].features, "名詞,一般");
        assert_eq!(entries[0].line, 1);
        assert_eq!(entries[1].key, "1,2");
        assert_eq!(entries[1].line, 3);
        assert_eq!(entries[1].raw, "\"1,2\",0,0,5,記号");
    }

    #[test]
    fn test_malformed_entries() {
        let data = "a,1,1\n,1,1,1\nb,x,1,1\nc,1,-1,1\nd,1,1,40000\ne,1,1,1\n";
        let mut diagnostics = vec![];
        let entries = RawWordEntry::from_reader(data.as_bytes(), "lex.csv", &mut diagnostics).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "e");
        let lines: Vec<_> = diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![1, 2, 3, 4, 5]);
        assert!(diagnostics.iter().all(|d| d.source == "lex.csv"));
    }

    #[test]
    fn test_build_dictionary() {
        let entries = entries("すもも,1,1,-30,名詞,一般\nもも,2,3,40,名詞,一般\nも,4,4,5\n");
        let mut store = WordStore::default();
        let ids = store.build_dictionary(&entries).unwrap();
        assert_eq!(ids, vec![(0, "すもも"), (10, "もも"), (20, "も")]);
        assert_eq!(store.num_words(), 3);
        assert_eq!(store.records().len(), 30);

        assert_eq!(store.word_param(10), Some(WordParam::new(2, 3, 40)));
        assert_eq!(store.word_param(5), None);
        assert_eq!(store.word_param(30), None);
        assert_eq!(store.features(0), "すもも,名詞,一般");
        assert_eq!(store.features(20), "も,");
        assert_eq!(store.features(7), "");
    }

    #[test]
    fn test_mapping() {
        let entries = entries("a,0,0,1,x\nb,0,0,2,y\nc,0,0,3,z\n");
        let mut store = WordStore::default();
        let ids = store.build_dictionary(&entries).unwrap();
        store.add_mapping(1, ids[2].0);
        store.add_mapping(1, ids[0].0);
        assert_eq!(store.lookup(1), &[20, 0]);
        assert!(store.lookup(0).is_empty());
        assert_eq!(store.features_by_str("20"), "c,z");
        assert_eq!(store.features_by_str("x20"), "");
        assert_eq!(store.features_by_str("-10"), "");
        assert_eq!(store.features_by_str("15"), "");
    }

    #[test]
    fn test_verify() {
        let entries = entries("a,1,2,0\n");
        let mut store = WordStore::default();
        store.build_dictionary(&entries).unwrap();
        assert!(store.verify(&MatrixConnector::new(3, 2)));
        assert!(!store.verify(&MatrixConnector::new(2, 2)));
        assert!(!store.verify(&MatrixConnector::new(3, 1)));
    }

    #[test]
    fn test_from_parts() {
        let entries = entries("a,0,0,1,x\nb,0,0,2,y\n");
        let mut store = WordStore::default();
        store.build_dictionary(&entries).unwrap();
        store.add_mapping(0, 10);

        let restored = WordStore::from_parts(
            store.records().to_vec(),
            store.feature_bytes().to_vec(),
            store.map().clone(),
        )
        .unwrap();
        assert_eq!(restored.features(10), "b,y");
        assert_eq!(restored.lookup(0), &[10]);

        let mut map = IdMultimap::new();
        map.add(0, 40);
        assert!(WordStore::from_parts(store.records().to_vec(), vec![], map).is_err());
        assert!(WordStore::from_parts(vec![0; 9], vec![], IdMultimap::new()).is_err());
    }
}
