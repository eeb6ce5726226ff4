// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Plist entities.

A [Plist] is either backed by a file or by an in-memory snapshot.

File-backed instances hold nothing but the path. Every data access decodes
and flattens the file again, so observed content always reflects what is on
disk at the time of the call. If the file is deleted or corrupted after the
instance is constructed, subsequent accesses fail.

Memory-backed instances decode once at construction and hold the flattened
result.
*/

use {
    crate::{
        decode_path, decode_reader, file_metadata, flatten,
        process::{launch_agent_program, ProcessLookup, ProcessRecord},
        EncodingKind, FileMetadata, FlatPlist, PlistError,
    },
    chrono::{DateTime, Utc},
    plist::{Dictionary, Value},
    serde::Serialize,
    std::{
        io::Read,
        path::{Path, PathBuf},
    },
};

/// File extension of plist files.
pub const PLIST_EXTENSION: &str = ".plist";

/// Format of timestamps in [FileSummary].
const SUMMARY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Input to construct a [Plist] from.
pub enum PlistInput {
    /// Path to a plist file. The instance remains bound to the file.
    Path(PathBuf),

    /// A reader yielding plist file content.
    Reader(Box<dyn Read>),

    /// Raw plist file content.
    Bytes(Vec<u8>),

    /// A decoded, still nested plist dictionary.
    Dictionary(Dictionary),

    /// An already flattened plist.
    Flattened(FlatPlist),
}

impl From<PathBuf> for PlistInput {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for PlistInput {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for PlistInput {
    fn from(data: Vec<u8>) -> Self {
        Self::Bytes(data)
    }
}

impl From<Dictionary> for PlistInput {
    fn from(dict: Dictionary) -> Self {
        Self::Dictionary(dict)
    }
}

impl From<FlatPlist> for PlistInput {
    fn from(flat: FlatPlist) -> Self {
        Self::Flattened(flat)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum PlistSource {
    Path(PathBuf),
    Memory(FlatPlist),
}

/// Summary of the file backing a [Plist].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub dir: String,
    pub exists: bool,
    #[serde(rename = "type")]
    pub file_type: String,
    pub user: String,
    pub group: String,
    pub size: u64,
    pub mode: String,
    pub created: String,
    pub updated: String,
    pub accessed: String,
}

/// A logical plist with content identity semantics.
///
/// Two instances are content-equal if their flattened keys and canonical values
/// match, regardless of paths, names, or encodings. See [Plist::content_eq].
#[derive(Clone, Debug)]
pub struct Plist {
    source: PlistSource,
    name: Option<String>,
}

impl Plist {
    /// Construct an instance from any supported input.
    pub fn new(input: PlistInput) -> Result<Self, PlistError> {
        match input {
            PlistInput::Path(path) => Self::from_path(path),
            PlistInput::Reader(reader) => Self::from_reader(reader),
            PlistInput::Bytes(data) => Self::from_bytes(&data),
            PlistInput::Dictionary(dict) => Ok(Self::from_dictionary(&dict)),
            PlistInput::Flattened(flat) => Ok(Self::from_flattened(flat)),
        }
    }

    /// Construct a file-backed instance.
    ///
    /// The file is decoded once to validate it. A missing or undecodable file is
    /// reported as [PlistError::InvalidFile]. The path is made absolute but
    /// symlinks are not resolved.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PlistError> {
        let path = path.as_ref();

        match decode_path(path) {
            Ok(_) => {}
            Err(PlistError::NotFound(_)) => {
                return Err(PlistError::invalid_file(&path.display().to_string()));
            }
            Err(e) => return Err(e),
        }

        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        Ok(Self {
            source: PlistSource::Path(path),
            name: None,
        })
    }

    /// Construct a memory-backed instance from a reader of plist file content.
    pub fn from_reader(reader: impl Read) -> Result<Self, PlistError> {
        let (dict, _) = decode_reader(reader)?;

        Ok(Self::from_dictionary(&dict))
    }

    /// Construct a memory-backed instance from plist file content.
    pub fn from_bytes(data: &[u8]) -> Result<Self, PlistError> {
        let (dict, _) = crate::decode_bytes(data)?;

        Ok(Self::from_dictionary(&dict))
    }

    /// Construct a memory-backed instance from a nested plist dictionary.
    pub fn from_dictionary(dict: &Dictionary) -> Self {
        Self::from_flattened(flatten(dict))
    }

    /// Construct a memory-backed instance from flattened data.
    pub fn from_flattened(flat: FlatPlist) -> Self {
        Self {
            source: PlistSource::Memory(flat),
            name: None,
        }
    }

    /// Set the display name, consuming and returning self.
    pub fn with_name(mut self, name: impl ToString) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// The explicitly assigned name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Name suitable for display.
    ///
    /// This is the assigned name or, for file-backed instances, the file name
    /// without its `.plist` extension.
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = &self.name {
            return Some(name.clone());
        }

        let file_name = self.path()?.file_name()?.to_string_lossy().to_string();

        Some(match file_name.strip_suffix(PLIST_EXTENSION) {
            Some(stem) => stem.to_string(),
            None => file_name,
        })
    }

    /// Path of the backing file, if file-backed.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            PlistSource::Path(path) => Some(path),
            PlistSource::Memory(_) => None,
        }
    }

    pub fn is_file_backed(&self) -> bool {
        matches!(self.source, PlistSource::Path(_))
    }

    fn backing_path(&self) -> Result<&Path, PlistError> {
        self.path().ok_or(PlistError::NotFileBacked)
    }

    /// Obtain the current flattened data.
    ///
    /// File-backed instances read and decode the file on every call.
    pub fn data(&self) -> Result<FlatPlist, PlistError> {
        match &self.source {
            PlistSource::Path(path) => {
                let (dict, _) = decode_path(path)?;
                Ok(flatten(&dict))
            }
            PlistSource::Memory(flat) => Ok(flat.clone()),
        }
    }

    /// Flattened keys, in discovery order.
    pub fn keys(&self) -> Result<Vec<String>, PlistError> {
        Ok(self.data()?.keys().map(|k| k.to_string()).collect())
    }

    /// Flattened values, in discovery order.
    pub fn values(&self) -> Result<Vec<Value>, PlistError> {
        Ok(self.data()?.values().cloned().collect())
    }

    /// Compute the hex content digest of the current data.
    pub fn digest(&self) -> Result<String, PlistError> {
        Ok(self.data()?.digest())
    }

    /// Whether this and another instance have the same current content.
    pub fn content_eq(&self, other: &Self) -> Result<bool, PlistError> {
        Ok(self.data()?.content_eq(&other.data()?))
    }

    /// The current encoding of the backing file.
    pub fn file_type(&self) -> Result<EncodingKind, PlistError> {
        let (_, kind) = decode_path(self.backing_path()?)?;

        Ok(kind)
    }

    /// Obtain current file system metadata of the backing file.
    pub fn metadata(&self) -> Result<FileMetadata, PlistError> {
        file_metadata(self.backing_path()?)
    }

    /// Whether the backing file currently exists.
    ///
    /// Always false for memory-backed instances.
    pub fn file_exists(&self) -> bool {
        self.path().map(|p| p.exists()).unwrap_or(false)
    }

    pub fn file_size(&self) -> Result<u64, PlistError> {
        Ok(self.metadata()?.size)
    }

    pub fn file_mode(&self) -> Result<String, PlistError> {
        Ok(self.metadata()?.mode)
    }

    pub fn file_owner(&self) -> Result<String, PlistError> {
        Ok(self.metadata()?.owner)
    }

    pub fn file_group(&self) -> Result<String, PlistError> {
        Ok(self.metadata()?.group)
    }

    pub fn file_created(&self) -> Result<DateTime<Utc>, PlistError> {
        Ok(self.metadata()?.created)
    }

    pub fn file_updated(&self) -> Result<DateTime<Utc>, PlistError> {
        Ok(self.metadata()?.updated)
    }

    pub fn file_accessed(&self) -> Result<DateTime<Utc>, PlistError> {
        Ok(self.metadata()?.accessed)
    }

    /// Summarize the backing file.
    pub fn file_summary(&self) -> Result<FileSummary, PlistError> {
        let path = self.backing_path()?;
        let metadata = self.metadata()?;
        let file_type = self.file_type()?;

        Ok(FileSummary {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            dir: path
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            exists: metadata.exists,
            file_type: file_type.to_string(),
            user: metadata.owner,
            group: metadata.group,
            size: metadata.size,
            mode: metadata.mode,
            created: metadata.created.format(SUMMARY_TIME_FORMAT).to_string(),
            updated: metadata.updated.format(SUMMARY_TIME_FORMAT).to_string(),
            accessed: metadata.accessed.format(SUMMARY_TIME_FORMAT).to_string(),
        })
    }

    /// The program this plist runs, if it is a launch agent or daemon plist.
    pub fn program(&self) -> Result<Option<PathBuf>, PlistError> {
        Ok(launch_agent_program(&self.data()?))
    }

    /// Find running processes of the program this plist runs.
    ///
    /// Plists not naming a program have no associated processes.
    pub fn associated_processes(
        &self,
        lookup: &impl ProcessLookup,
    ) -> Result<Vec<ProcessRecord>, PlistError> {
        Ok(match self.program()? {
            Some(program) => lookup.processes_for_executable(&program),
            None => vec![],
        })
    }
}
