//! Initialization errors produced while building a [`DataSet`](crate::DataSet).
//!
//! Every failure to bring a dataset (or the scratch state sized from it) into
//! existence maps onto exactly one of five kinds. Callers match on the variant;
//! each one carries enough context to produce a useful message.
//!
//! | Variant | Raised when |
//! |---------|-------------|
//! | [`NotSet`](InitError::NotSet) | no data source was configured |
//! | [`InsufficientMemory`](InitError::InsufficientMemory) | a buffer could not be reserved |
//! | [`CorruptData`](InitError::CorruptData) | the file is not a valid data file |
//! | [`IncorrectVersion`](InitError::IncorrectVersion) | the file format version is unsupported |
//! | [`FileNotFound`](InitError::FileNotFound) | the file could not be opened |
//!
//! ```rust
//! use dataset::{DataSet, InitError};
//!
//! match DataSet::from_file("/no/such/file.json", "IsMobile") {
//!     Err(InitError::FileNotFound { path, .. }) => {
//!         assert!(path.ends_with("file.json"));
//!     }
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal outcome of dataset (or pool) initialization.
#[derive(Debug, Error)]
pub enum InitError {
    /// No data source was configured, or a component was asked to initialise
    /// with nothing to work from.
    #[error("device data file could not be initialised: {reason}")]
    NotSet { reason: String },

    /// A buffer sized from the data file could not be reserved.
    #[error("insufficient memory: could not reserve {requested} bytes for {what}")]
    InsufficientMemory {
        /// What the reservation was for, e.g. `"workset input buffer"`.
        what: &'static str,
        /// Size of the failed reservation, in bytes.
        requested: usize,
    },

    /// The file is readable but is not a structurally valid data file.
    #[error("device data file is corrupted: {}: {reason}", path.display())]
    CorruptData { path: PathBuf, reason: String },

    /// The file declares a format version this build does not understand.
    #[error(
        "device data file is not correct: {} has version {found}, expected {expected}",
        path.display()
    )]
    IncorrectVersion {
        path: PathBuf,
        found: String,
        expected: &'static str,
    },

    /// The file could not be opened.
    #[error("device data file not found: {}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InitError {
    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        InitError::CorruptData {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
