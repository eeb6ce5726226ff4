// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Searching directories for plist files.

use {
    crate::{entity::PLIST_EXTENSION, Plist, PlistError},
    log::debug,
    std::path::{Path, PathBuf},
};

/// A search for plist files in a directory.
///
/// Searches are lazy and restartable: every call to [PlistSearch::iter] walks
/// the directory again.
#[derive(Clone, Debug)]
pub struct PlistSearch {
    root: PathBuf,
    recursive: bool,
}

impl PlistSearch {
    /// Define a search of `directory`.
    ///
    /// If `recursive` is true, the entire directory tree is searched. Otherwise
    /// only files directly in `directory` are considered.
    ///
    /// Errors with [PlistError::NotFound] if `directory` does not exist.
    pub fn new(directory: impl AsRef<Path>, recursive: bool) -> Result<Self, PlistError> {
        let directory = directory.as_ref();

        let root = directory
            .canonicalize()
            .map_err(|e| PlistError::from_io_at(e, directory))?;

        Ok(Self { root, recursive })
    }

    /// The resolved directory being searched.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    fn walker(&self) -> walkdir::IntoIter {
        let walker = walkdir::WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name();

        if self.recursive {
            walker.into_iter()
        } else {
            walker.max_depth(1).into_iter()
        }
    }

    /// Enumerate paths of candidate plist files.
    ///
    /// Candidates are files whose name ends in `.plist`, in file name order.
    /// No attempt is made to decode them.
    pub fn candidate_paths(&self) -> impl Iterator<Item = Result<PathBuf, PlistError>> {
        self.walker().filter_map(|entry| match entry {
            Ok(entry) => {
                let path = entry.path();

                if path.is_file()
                    && entry
                        .file_name()
                        .to_string_lossy()
                        .ends_with(PLIST_EXTENSION)
                {
                    Some(Ok(path.to_path_buf()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(e.into())),
        })
    }

    /// Iterate over valid plist files.
    ///
    /// Candidates which are not valid plists are skipped.
    pub fn iter(&self) -> PlistIter {
        PlistIter {
            candidates: Box::new(self.candidate_paths()),
        }
    }
}

impl IntoIterator for &PlistSearch {
    type Item = Result<Plist, PlistError>;
    type IntoIter = PlistIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the valid plist files of a [PlistSearch].
pub struct PlistIter {
    candidates: Box<dyn Iterator<Item = Result<PathBuf, PlistError>>>,
}

impl Iterator for PlistIter {
    type Item = Result<Plist, PlistError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let path = match self.candidates.next()? {
                Ok(path) => path,
                Err(e) => return Some(Err(e)),
            };

            match Plist::from_path(&path) {
                Ok(plist) => return Some(Ok(plist)),
                Err(PlistError::InvalidFile(msg)) => {
                    debug!("skipping {}: {}", path.display(), msg);
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Find valid plist files in a directory.
///
/// See [PlistSearch::new] for the meaning of arguments.
pub fn find_plists(directory: impl AsRef<Path>, recursive: bool) -> Result<PlistIter, PlistError> {
    Ok(PlistSearch::new(directory, recursive)?.iter())
}
