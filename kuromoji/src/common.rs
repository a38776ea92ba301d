//! Common settings in Kuromoji.

/// Name of the character class every unclassified character falls back to.
pub const DEFAULT_CATEGORY: &str = "DEFAULT";

/// The maximum number of character classes.
///
/// Class ids are bit positions of a 32-bit set, so this is a hard limit of
/// the serialized format.
pub const MAX_CATEGORIES: usize = 32;

/// Number of code points covered by the classifier tables.
///
/// Code points above U+FFFF are never classified and always resolve to
/// [`DEFAULT_CATEGORY`].
pub const CLASSIFIED_CODE_POINTS: usize = 0x10000;

/// The fixed connection id of BOS/EOS.
pub const BOS_EOS_CONNECTION_ID: u16 = 0;

/// Placeholder for a feature field the dictionary does not provide.
pub const MISSING_FEATURE: &str = "*";
