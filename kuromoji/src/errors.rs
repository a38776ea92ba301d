//! Definition of errors and build diagnostics.

use std::error::Error;
use std::fmt;

/// A specialized Result type for Kuromoji.
pub type Result<T, E = KuromojiError> = std::result::Result<T, E>;

/// The error type for Kuromoji.
#[derive(Debug, thiserror::Error)]
pub enum KuromojiError {
    /// The error variant for [`InvalidArgumentError`].
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// The error variant for [`InvalidFormatError`].
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// The error variant for [`InvalidStateError`].
    #[error(transparent)]
    InvalidState(InvalidStateError),

    /// A dictionary segment could not be loaded.
    #[error("SegmentError: {file}: {source}")]
    Segment {
        /// File name of the segment.
        file: &'static str,

        /// Underlying cause of the error.
        #[source]
        source: Box<KuromojiError>,
    },

    /// The error variant for [`TryFromIntError`](std::num::TryFromIntError).
    #[error(transparent)]
    TryFromInt(#[from] std::num::TryFromIntError),

    /// The error variant for [`ParseIntError`](std::num::ParseIntError).
    #[error(transparent)]
    ParseInt(#[from] std::num::ParseIntError),

    /// The error variant for [`std::io::Error`].
    #[error(transparent)]
    StdIo(#[from] std::io::Error),

    /// The error variant for [`std::str::Utf8Error`].
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),

    /// The error variant for [`rkyv::rancor::Error`](rkyv::rancor::Error).
    #[error(transparent)]
    Rkyv(#[from] rkyv::rancor::Error),

    /// A worker thread panicked while loading segments.
    #[error("ThreadPanic: {0}")]
    ThreadPanic(String),
}

impl KuromojiError {
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn invalid_state<S, M>(msg: S, cause: M) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self::InvalidState(InvalidStateError {
            msg: msg.into(),
            cause: cause.into(),
        })
    }

    pub(crate) fn segment(file: &'static str, source: KuromojiError) -> Self {
        Self::Segment {
            file,
            source: Box::new(source),
        }
    }
}

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// Error used when the input format is invalid.
#[derive(Debug)]
pub struct InvalidFormatError {
    /// Name of the format.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

/// Error used when the state is invalid.
#[derive(Debug)]
pub struct InvalidStateError {
    /// Error message.
    pub(crate) msg: String,

    /// Underlying cause of the error.
    pub(crate) cause: String,
}

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidStateError: {}: {}", self.msg, self.cause)
    }
}

impl Error for InvalidStateError {}

/// A line skipped while reading a dictionary source file.
///
/// Building is forgiving: malformed lines are logged and skipped instead of
/// aborting the build. Each skipped line is recorded as a diagnostic so that
/// callers can inspect what was dropped.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Diagnostic {
    /// Name of the source, e.g. `char.def`.
    pub source: &'static str,

    /// 1-based line number.
    pub line: usize,

    /// Raw text of the skipped line.
    pub text: String,

    /// Reason for skipping.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} (skipped {:?})",
            self.source, self.line, self.message, self.text
        )
    }
}

/// Records a skipped line.
pub(crate) fn skip_line<S>(
    diagnostics: &mut Vec<Diagnostic>,
    source: &'static str,
    line: usize,
    text: &str,
    message: S,
) where
    S: Into<String>,
{
    let diagnostic = Diagnostic {
        source,
        line,
        text: text.to_string(),
        message: message.into(),
    };
    log::warn!("{diagnostic}");
    diagnostics.push(diagnostic);
}
