//! Reading and writing a dictionary as a directory of compressed segments.
//!
//! Every segment is a separate zstd-compressed file. When a
//! `<file>.sha256` checksum exists next to a segment, it holds the hex
//! SHA-256 of the compressed bytes and is verified on load.
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::thread;

use memmap2::Mmap;
use sha2::{Digest, Sha256};

use crate::common::CLASSIFIED_CODE_POINTS;
use crate::dictionary::Dictionary;
use crate::dictionary::character::{CategoryRegistry, CharacterDefinition};
use crate::dictionary::config::{CHECKSUM_EXTENSION, LoadPolicy, Segment, SegmentGroup, ZSTD_LEVEL};
use crate::dictionary::connector::MatrixConnector;
use crate::dictionary::lexicon::map::trie::Trie;
use crate::dictionary::lexicon::{IdMultimap, WordStore};
use crate::errors::{KuromojiError, Result};

impl Dictionary {
    /// Writes every segment into `dir`, creating it if needed.
    ///
    /// Each file is written to a temporary file in `dir` and renamed into
    /// place, followed by its checksum file.
    ///
    /// # Errors
    ///
    /// [`KuromojiError`] is returned when writing fails or the dictionary is
    /// degraded.
    pub fn write_segments<P>(&self, dir: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        if !self.is_complete() {
            return Err(KuromojiError::invalid_state(
                "cannot write a degraded dictionary",
                format!("missing {:?}", self.degraded),
            ));
        }
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        for group in SegmentGroup::ALL {
            for &segment in group.segments() {
                let bytes = self.segment_bytes(segment)?;
                write_segment(dir, segment, &bytes)
                    .map_err(|e| KuromojiError::segment(segment.file_name(), e))?;
            }
        }
        log::info!("wrote dictionary segments to {}", dir.display());
        Ok(())
    }

    fn segment_bytes(&self, segment: Segment) -> Result<Vec<u8>> {
        Ok(match segment {
            Segment::Trie => match &self.trie {
                Some(trie) => trie.to_bytes()?,
                None => vec![],
            },
            Segment::KnownRecords => self.known.records().to_vec(),
            Segment::KnownFeatures => self.known.feature_bytes().to_vec(),
            Segment::KnownMap => self.known.map().to_bytes()?,
            Segment::Costs => self.connector.to_bytes()?,
            Segment::UnknownRecords => self.unknown.records().to_vec(),
            Segment::UnknownFeatures => self.unknown.feature_bytes().to_vec(),
            Segment::UnknownMap => self.unknown.map().to_bytes()?,
            Segment::CharDefault => self.char_def.default_table().to_vec(),
            Segment::CharCompat => self
                .char_def
                .compat_table()
                .iter()
                .flat_map(|bits| bits.to_le_bytes())
                .collect(),
            Segment::CharClasses => self.char_def.registry().to_bytes()?,
        })
    }

    /// Loads a dictionary from the segments in `dir`.
    ///
    /// The four segment groups are decoded on separate threads. Under
    /// [`LoadPolicy::Lenient`], a group that fails is logged and left empty,
    /// and is listed by [`Dictionary::degraded_segments`].
    ///
    /// # Errors
    ///
    /// [`KuromojiError`] is returned under [`LoadPolicy::Strict`] when any
    /// group fails, or when a loading thread panics.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use kuromoji::{Dictionary, LoadPolicy, errors::Result};
    /// # fn main() -> Result<()> {
    /// let dict = Dictionary::load_segments("path/to/dict", LoadPolicy::Strict)?;
    /// assert!(dict.is_complete());
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_segments<P>(dir: P, policy: LoadPolicy) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(KuromojiError::invalid_argument(
                "dir",
                format!("{} is not a directory", dir.display()),
            ));
        }

        let (trie, known, costs, unknown) = thread::scope(|s| {
            let trie = s.spawn(|| load_trie(dir));
            let known = s.spawn(|| load_store(dir, SegmentGroup::Known));
            let costs = s.spawn(|| load_connector(dir));
            let unknown = s.spawn(|| load_unknown(dir));
            (
                join(trie.join()),
                join(known.join()),
                join(costs.join()),
                join(unknown.join()),
            )
        });

        let mut degraded = vec![];
        let trie = accept(trie?, SegmentGroup::Trie, policy, &mut degraded)?.flatten();
        let known = accept(known?, SegmentGroup::Known, policy, &mut degraded)?.unwrap_or_default();
        let connector =
            accept(costs?, SegmentGroup::Costs, policy, &mut degraded)?.unwrap_or_default();
        let (unknown, char_def) =
            accept(unknown?, SegmentGroup::Unknown, policy, &mut degraded)?.unwrap_or_default();

        let mut dict = Self::new(trie, known, connector, unknown, char_def);
        dict.degraded = degraded;
        if dict.is_complete() {
            log::info!("loaded dictionary segments from {}", dir.display());
        }
        Ok(dict)
    }
}

type JoinResult<T> = std::thread::Result<Result<T>>;

/// Converts a panic of a loading thread into an error.
fn join<T>(result: JoinResult<T>) -> Result<Result<T>> {
    result.map_err(|e| {
        let msg = if let Some(s) = e.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = e.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        KuromojiError::ThreadPanic(msg)
    })
}

fn accept<T>(
    result: Result<T>,
    group: SegmentGroup,
    policy: LoadPolicy,
    degraded: &mut Vec<SegmentGroup>,
) -> Result<Option<T>> {
    match (result, policy) {
        (Ok(value), _) => Ok(Some(value)),
        (Err(e), LoadPolicy::Strict) => Err(e),
        (Err(e), LoadPolicy::Lenient) => {
            log::error!("failed to load the {group} segments, continuing without them: {e}");
            degraded.push(group);
            Ok(None)
        }
    }
}

fn write_segment(dir: &Path, segment: Segment, bytes: &[u8]) -> Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut encoder = zstd::Encoder::new(tmp.as_file_mut(), ZSTD_LEVEL)?;
        encoder.write_all(bytes)?;
        encoder.finish()?;
    }
    tmp.as_file().sync_all()?;

    let path = dir.join(segment.file_name());
    let file = tmp.persist(&path).map_err(|e| e.error)?;
    let mmap = unsafe { Mmap::map(&file)? };
    fs::write(
        path.with_added_extension(CHECKSUM_EXTENSION),
        hex::encode(Sha256::digest(&mmap[..])),
    )?;
    Ok(())
}

/// Reads, verifies and decompresses one segment.
fn read_segment(dir: &Path, segment: Segment) -> Result<Vec<u8>> {
    let read = || -> Result<Vec<u8>> {
        let path = dir.join(segment.file_name());
        let file = File::open(&path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        let checksum_path = path.with_added_extension(CHECKSUM_EXTENSION);
        if checksum_path.exists() {
            let expected = fs::read_to_string(&checksum_path)?;
            let actual = hex::encode(Sha256::digest(&mmap[..]));
            if expected.trim() != actual {
                return Err(KuromojiError::invalid_state(
                    "checksum mismatch",
                    format!("expected {}, found {actual}", expected.trim()),
                ));
            }
        }
        Ok(zstd::decode_all(&mmap[..])?)
    };
    read().map_err(|e| KuromojiError::segment(segment.file_name(), e))
}

fn load_trie(dir: &Path) -> Result<Option<Trie>> {
    let bytes = read_segment(dir, Segment::Trie)?;
    if bytes.is_empty() {
        return Ok(None);
    }
    Trie::from_bytes(&bytes)
        .map(Some)
        .map_err(|e| KuromojiError::segment(Segment::Trie.file_name(), e))
}

fn load_store(dir: &Path, group: SegmentGroup) -> Result<WordStore> {
    let (records, features, map_segment) = match group {
        SegmentGroup::Unknown => (
            Segment::UnknownRecords,
            Segment::UnknownFeatures,
            Segment::UnknownMap,
        ),
        _ => (
            Segment::KnownRecords,
            Segment::KnownFeatures,
            Segment::KnownMap,
        ),
    };
    let map = IdMultimap::from_bytes(read_segment(dir, map_segment)?)
        .map_err(|e| KuromojiError::segment(map_segment.file_name(), e))?;
    WordStore::from_parts(
        read_segment(dir, records)?,
        read_segment(dir, features)?,
        map,
    )
    .map_err(|e| KuromojiError::segment(records.file_name(), e))
}

fn load_connector(dir: &Path) -> Result<MatrixConnector> {
    MatrixConnector::from_bytes(read_segment(dir, Segment::Costs)?)
        .map_err(|e| KuromojiError::segment(Segment::Costs.file_name(), e))
}

fn load_unknown(dir: &Path) -> Result<(WordStore, CharacterDefinition)> {
    let store = load_store(dir, SegmentGroup::Unknown)?;

    let registry = CategoryRegistry::from_bytes(read_segment(dir, Segment::CharClasses)?)
        .map_err(|e| KuromojiError::segment(Segment::CharClasses.file_name(), e))?;
    let default_table = read_segment(dir, Segment::CharDefault)?;
    let compat_bytes = read_segment(dir, Segment::CharCompat)?;
    if compat_bytes.len() != CLASSIFIED_CODE_POINTS * 4 {
        return Err(KuromojiError::segment(
            Segment::CharCompat.file_name(),
            KuromojiError::invalid_format(
                "compat table",
                format!("expected {} bytes", CLASSIFIED_CODE_POINTS * 4),
            ),
        ));
    }
    let compat_table = compat_bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    let char_def = CharacterDefinition::from_parts(registry, default_table, compat_table)
        .map_err(|e| KuromojiError::segment(Segment::CharDefault.file_name(), e))?;
    Ok((store, char_def))
}
