//! Error handling for the fasplit library.
//!
//! This module defines all error types that can occur while splitting a FASTA
//! file, including I/O errors at each stage of a run, parameter file errors,
//! and formatting errors.

use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for fasplit operations.
///
/// It's equivalent to `std::result::Result<T, SplitError>`.
///
/// # Examples
///
/// ```rust
/// use fasplit::{FormatOptions, Result};
///
/// fn wide_format() -> Result<FormatOptions> {
///     FormatOptions::new(b'>', b' ', 80)
/// }
/// # assert!(wide_format().is_ok());
/// ```
pub type Result<T> = std::result::Result<T, SplitError>;

/// Error types for split runs.
///
/// Every variant names the stage of the run that failed. Variants wrapping
/// an I/O error keep it as their `source`, so the underlying system error
/// text stays reachable.
///
/// # Examples
///
/// ```rust
/// use fasplit::{SplitError, Splitter};
///
/// let mut splitter = Splitter::default();
/// match splitter.split_by_count("does/not/exist.fasta", "", 4, "") {
///     Err(SplitError::InvalidInputPath(path)) => {
///         println!("No such input: {}", path.display());
///     }
///     Err(e) => println!("Other error: {}", e),
///     Ok(_) => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum SplitError {
    /// I/O error from the underlying reader, typically a failed read in the
    /// middle of the input stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Compression/decompression error from niffler.
    #[cfg(feature = "niffler")]
    #[error("Niffler error: {0}")]
    Niffler(#[from] niffler::Error),

    /// The input path is empty or does not point at an existing file.
    #[error("Invalid input path: {0:?}")]
    InvalidInputPath(PathBuf),

    /// A directory could not be listed while resolving input paths.
    #[error("Error searching {path:?} for input files: {source}")]
    SearchPath {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The output directory could not be used.
    #[error("Invalid output directory {path:?}: {source}")]
    InvalidOutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The input file exists but could not be opened for reading.
    #[error("Error opening input file {path:?}: {source}")]
    OpenInput {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An output bucket could not be created.
    #[error("Error creating output file {path:?}: {source}")]
    CreateOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing a record to an open output bucket failed.
    #[error("Error writing record to {path:?}: {source}")]
    WriteRecord {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The summary table could not be written.
    #[error("Error writing split stats to {path:?}: {source}")]
    WriteStats {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The parameter file does not exist.
    #[error("Parameter file not found: {0:?}")]
    ParameterFileNotFound(PathBuf),

    /// The parameter file exists but is unreadable or lacks the options section.
    #[error("Invalid parameter file {path:?}: {reason}")]
    InvalidParameterFile { path: PathBuf, reason: String },

    /// Rejected record formatting options.
    #[error("Invalid format options: {0}")]
    InvalidFormatOptions(String),

    /// Any other failure during a run.
    #[error("Unspecified error: {0}")]
    Unspecified(Box<dyn StdError + Send + Sync>),
}

impl SplitError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidInputPath(_) => ErrorCode::InvalidInputFilePath,
            Self::InvalidOutputDir { .. } => ErrorCode::InvalidOutputFolderPath,
            Self::SearchPath { .. } => ErrorCode::FilePathError,
            Self::ParameterFileNotFound(_) => ErrorCode::ParameterFileNotFound,
            Self::InvalidParameterFile { .. } => ErrorCode::InvalidParameterFile,
            Self::InvalidFormatOptions(_) => ErrorCode::InvalidParameterFile,
            Self::OpenInput { .. } | Self::Io(_) => ErrorCode::ErrorReadingInputFile,
            #[cfg(feature = "niffler")]
            Self::Niffler(_) => ErrorCode::ErrorReadingInputFile,
            Self::CreateOutput { .. } | Self::WriteRecord { .. } => {
                ErrorCode::ErrorCreatingOutputFiles
            }
            Self::WriteStats { .. } => ErrorCode::ErrorWritingStats,
            Self::Unspecified(_) => ErrorCode::UnspecifiedError,
        }
    }
}

/// Error enumeration reported to callers and used as the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum ErrorCode {
    NoError = 0,
    InvalidInputFilePath = 1,
    InvalidOutputFolderPath = 2,
    ParameterFileNotFound = 3,
    InvalidParameterFile = 4,
    FilePathError = 5,
    ErrorReadingInputFile = 6,
    ErrorCreatingOutputFiles = 7,
    ErrorWritingStats = 8,
    UnspecifiedError = -1,
}
impl ErrorCode {
    pub fn exit_code(self) -> i32 {
        self as i32
    }
}

/// Trait for converting foreign errors into `SplitError::Unspecified`.
///
/// # Examples
///
/// ```rust
/// use fasplit::{IntoSplitError, SplitError};
///
/// let err = "12x".parse::<u32>().unwrap_err().into_split_error();
/// assert!(matches!(err, SplitError::Unspecified(_)));
/// ```
pub trait IntoSplitError {
    /// Converts the error into a `SplitError`.
    fn into_split_error(self) -> SplitError;
}

impl<E> IntoSplitError for E
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn into_split_error(self) -> SplitError {
        SplitError::Unspecified(self.into())
    }
}
