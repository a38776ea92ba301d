use std::fmt;

/// Compression level used when writing segments.
pub const ZSTD_LEVEL: i32 = 19;

/// Extension of the checksum file written next to each segment.
pub const CHECKSUM_EXTENSION: &str = "sha256";

/// Specifies how [`Dictionary::load_segments`](crate::Dictionary::load_segments)
/// reacts to a segment group that fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Logs the failure and leaves the group empty.
    ///
    /// The dictionary still loads and reports the group through
    /// [`Dictionary::degraded_segments`](crate::Dictionary::degraded_segments).
    /// Tokenizing with a degraded dictionary produces unreliable output.
    #[default]
    Lenient,

    /// Fails the whole load on the first broken group.
    Strict,
}

/// Groups of segments loaded together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentGroup {
    /// Surface-form trie.
    Trie,
    /// Known-word records, features and trie-id map.
    Known,
    /// Connection cost matrix.
    Costs,
    /// Unknown-word records and the character classifier.
    Unknown,
}

impl SegmentGroup {
    /// Every group in loading order.
    pub const ALL: [Self; 4] = [Self::Trie, Self::Known, Self::Costs, Self::Unknown];

    /// Gets the segments of the group.
    pub const fn segments(self) -> &'static [Segment] {
        match self {
            Self::Trie => &[Segment::Trie],
            Self::Known => &[Segment::KnownRecords, Segment::KnownFeatures, Segment::KnownMap],
            Self::Costs => &[Segment::Costs],
            Self::Unknown => &[
                Segment::UnknownRecords,
                Segment::UnknownFeatures,
                Segment::UnknownMap,
                Segment::CharDefault,
                Segment::CharCompat,
                Segment::CharClasses,
            ],
        }
    }
}

impl fmt::Display for SegmentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trie => write!(f, "trie"),
            Self::Known => write!(f, "known words"),
            Self::Costs => write!(f, "connection costs"),
            Self::Unknown => write!(f, "unknown words"),
        }
    }
}

/// A binary dictionary segment stored as its own compressed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Double-array trie of surfaces.
    Trie,
    /// Known word records.
    KnownRecords,
    /// Known word feature strings.
    KnownFeatures,
    /// Trie id to known word ids.
    KnownMap,
    /// Connection cost matrix.
    Costs,
    /// Unknown word records.
    UnknownRecords,
    /// Unknown word feature strings.
    UnknownFeatures,
    /// Class id to unknown word ids.
    UnknownMap,
    /// Default class of every code point.
    CharDefault,
    /// Compatible classes of every code point.
    CharCompat,
    /// Class names and invocation flags.
    CharClasses,
}

impl Segment {
    /// Gets the file name of the segment.
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Trie => "trie.dat.zst",
            Self::KnownRecords => "tid.dat.zst",
            Self::KnownFeatures => "tid_pos.dat.zst",
            Self::KnownMap => "tid_map.dat.zst",
            Self::Costs => "cc.dat.zst",
            Self::UnknownRecords => "unk.dat.zst",
            Self::UnknownFeatures => "unk_pos.dat.zst",
            Self::UnknownMap => "unk_map.dat.zst",
            Self::CharDefault => "unk_char.dat.zst",
            Self::CharCompat => "unk_compat.dat.zst",
            Self::CharClasses => "unk_invoke.dat.zst",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use hashbrown::HashSet;

    #[test]
    fn test_segment_files_are_distinct() {
        let files: HashSet<_> = SegmentGroup::ALL
            .iter()
            .flat_map(|g| g.segments())
            .map(|s| s.file_name())
            .collect();
        assert_eq!(files.len(), 11);
    }
}
