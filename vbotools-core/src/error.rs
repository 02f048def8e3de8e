//! Error types for vbotools operations

/// Errors that can occur while reading, converting or synchronizing telemetry
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VboError {
    /// Input file could not be opened or read
    #[error("Malformed file {path}: {reason}")]
    MalformedFile {
        /// Path (or description) of the offending input.
        path: String,
        /// Why the input was rejected.
        reason: String,
    },

    /// None of the candidate separators splits the first data line
    #[error("Cannot determine data separator (supported: space, comma, tab)")]
    UndeterminedSeparator,

    /// Too few data lines to estimate the sampling interval
    #[error("Insufficient samples: need at least {required} data lines, got {actual}")]
    InsufficientSamples {
        /// Minimum number of data lines required.
        required: usize,
        /// Number of data lines actually present.
        actual: usize,
    },

    /// Time field does not follow the `HHMMSS.ss` layout
    #[error("Unexpected VBO time value {0:?}")]
    InvalidTimeFormat(String),

    /// DBN packet checksum does not match its payload
    #[error("Checksum mismatch in frame {frame}: expected {expected:04x}, got {actual:04x}")]
    ChecksumMismatch {
        /// Zero-based index of the frame in the data block.
        frame: usize,
        /// The checksum stored in the frame.
        expected: u16,
        /// The checksum computed over the payload.
        actual: u16,
    },

    /// Input already carries video sync columns (strict mode)
    #[error("File already contains avifileindex/avisynctime columns")]
    AlreadySynchronized,

    /// Video container is neither MP4 nor AVI
    #[error("Unsupported video container: {0}")]
    UnsupportedVideoContainer(String),

    /// A required section is absent
    #[error("Missing section [{0}]")]
    MissingSection(String),

    /// A required channel is absent from `[header]`
    #[error("Missing column {0:?} in [header]")]
    MissingColumn(String),

    /// A data field could not be interpreted
    #[error("Invalid value {value:?} for column {column:?} on data line {line}")]
    InvalidField {
        /// Zero-based data line index.
        line: usize,
        /// Column name.
        column: String,
        /// Raw field text.
        value: String,
    },

    /// IO error while writing output
    #[error("IO error: {0}")]
    Io(String),
}

impl VboError {
    /// Build a `MalformedFile` error for `path`
    pub fn malformed(path: impl Into<String>, reason: impl ToString) -> Self {
        VboError::MalformedFile {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<std::io::Error> for VboError {
    fn from(err: std::io::Error) -> Self {
        VboError::Io(err.to_string())
    }
}
