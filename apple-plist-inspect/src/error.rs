// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    std::path::{Path, PathBuf},
    thiserror::Error,
};

/// Unified error type for plist inspection.
#[derive(Debug, Error)]
pub enum PlistError {
    #[error("unknown command")]
    CliUnknownCommand,

    #[error("bad argument")]
    CliBadArgument,

    #[error("invalid plist input: {0}")]
    InvalidInput(String),

    #[error("{} does not exist or is not a regular file", .0.display())]
    NotFound(PathBuf),

    #[error("{0}")]
    InvalidFile(String),

    #[error("plist is not backed by a file")]
    NotFileBacked,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("JSON serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl PlistError {
    /// Construct an [PlistError::InvalidFile] for content read from `source`.
    pub(crate) fn invalid_file(source: &str) -> Self {
        Self::InvalidFile(format!(
            "{} is not a valid binary or XML plist file; use plutil (macOS, BSD) \
            or plistutil (Debian, Ubuntu) to check the file",
            source
        ))
    }

    /// Map an I/O error on `path` to [PlistError::NotFound] when it means the path is gone.
    pub(crate) fn from_io_at(err: std::io::Error, path: &Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path.to_path_buf())
        } else {
            Self::Io(err)
        }
    }
}
