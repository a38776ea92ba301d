//! # Kuromoji
//!
//! Kuromoji is a lattice-based Japanese morphological analyzer. Candidate
//! words from a system lexicon and unknown words synthesized from character
//! classes are put into a lattice, and the minimum-cost path is found with
//! the Viterbi algorithm.
//!
//! A dictionary is compiled from IPADIC-style sources and stored as a
//! directory of zstd-compressed segments.
//!
//! ## Examples
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kuromoji::{Dictionary, LoadPolicy, SystemDictionaryBuilder, Tokenizer};
//!
//! let lexicon_csv = "京都,4,4,5,名詞,固有名詞,地名,一般,*,*,京都,キョウト,キョウト
//! 東京都,5,5,9,名詞,固有名詞,地名,一般,*,*,東京都,トウキョウト,トーキョート";
//! let matrix_def = "10 10\n0 4 -5\n0 5 -9";
//! let char_def = "DEFAULT 0 1 0";
//! let unk_def = "DEFAULT,0,0,100,名詞,一般,*,*,*,*,*";
//!
//! let dict = SystemDictionaryBuilder::from_readers(
//!     lexicon_csv.as_bytes(),
//!     matrix_def.as_bytes(),
//!     char_def.as_bytes(),
//!     unk_def.as_bytes(),
//! )?;
//!
//! let dir = tempfile::tempdir()?;
//! dict.write_segments(dir.path())?;
//! let dict = Dictionary::load_segments(dir.path(), LoadPolicy::Strict)?;
//!
//! let tokenizer = Tokenizer::new(dict);
//! let mut worker = tokenizer.new_worker();
//!
//! worker.reset_sentence("京都東京都");
//! worker.tokenize();
//! assert_eq!(worker.num_tokens(), 2);
//!
//! let t0 = worker.token(0);
//! assert_eq!(t0.surface(), "京都");
//! assert_eq!(t0.range_char(), 0..2);
//! assert_eq!(t0.range_byte(), 0..6);
//! assert_eq!(t0.feature(), "京都,名詞,固有名詞,地名,一般,*,*,京都,キョウト,キョウト");
//!
//! let t1 = worker.token(1);
//! assert_eq!(t1.surface(), "東京都");
//! assert_eq!(t1.range_char(), 2..5);
//! assert_eq!(t1.range_byte(), 6..15);
//!
//! let tokens = tokenizer.tokenize("京都、東京都");
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[2].surface_form, "東京都");
//! assert_eq!(tokens[2].word_position, 4);
//! assert_eq!(tokens[2].reading, "トウキョウト");
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("`target_pointer_width` must be 32 or 64");

mod buffer;
pub mod common;
pub mod dictionary;
pub mod errors;
mod sentence;
pub mod token;
pub mod tokenizer;
mod utils;


pub use dictionary::{Dictionary, LoadPolicy, SystemDictionaryBuilder, WordType};
pub use sentence::split_by_punctuation;
pub use token::TokenBuf;
pub use tokenizer::Tokenizer;

/// Version number of this library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
