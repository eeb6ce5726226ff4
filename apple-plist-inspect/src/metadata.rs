// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! File system metadata of plist files.

use {
    crate::PlistError,
    chrono::{DateTime, TimeZone, Utc},
    std::path::Path,
};

#[cfg(unix)]
use {log::warn, std::os::unix::fs::MetadataExt};

/// File system attributes of a file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileMetadata {
    /// Size in bytes.
    pub size: u64,

    /// Permission string in `ls -l` form, e.g. `-rw-r--r--`.
    pub mode: String,

    /// Name of the owning user.
    pub owner: String,

    /// Name of the owning group.
    pub group: String,

    /// Creation time.
    ///
    /// On Unix this is the inode change time.
    pub created: DateTime<Utc>,

    /// Last modification time.
    pub updated: DateTime<Utc>,

    /// Last access time.
    pub accessed: DateTime<Utc>,

    pub exists: bool,
}

const S_IFMT: u32 = 0o170000;
const S_IFSOCK: u32 = 0o140000;
const S_IFLNK: u32 = 0o120000;
const S_IFREG: u32 = 0o100000;
const S_IFBLK: u32 = 0o060000;
const S_IFDIR: u32 = 0o040000;
const S_IFCHR: u32 = 0o020000;
const S_IFIFO: u32 = 0o010000;

/// Render a raw `st_mode` value as a `ls -l` style permission string.
pub fn mode_string(mode: u32) -> String {
    let mut s = String::with_capacity(10);

    s.push(match mode & S_IFMT {
        S_IFSOCK => 's',
        S_IFLNK => 'l',
        S_IFREG => '-',
        S_IFBLK => 'b',
        S_IFDIR => 'd',
        S_IFCHR => 'c',
        S_IFIFO => 'p',
        _ => '?',
    });

    // (read bit, write bit, execute bit, special bit, special char)
    let triples = [
        (0o400, 0o200, 0o100, 0o4000, 's'),
        (0o040, 0o020, 0o010, 0o2000, 's'),
        (0o004, 0o002, 0o001, 0o1000, 't'),
    ];

    for (read, write, execute, special, special_char) in triples {
        s.push(if mode & read != 0 { 'r' } else { '-' });
        s.push(if mode & write != 0 { 'w' } else { '-' });
        s.push(match (mode & execute != 0, mode & special != 0) {
            (true, true) => special_char,
            (false, true) => special_char.to_ascii_uppercase(),
            (true, false) => 'x',
            (false, false) => '-',
        });
    }

    s
}

fn utc_timestamp(secs: i64, nanos: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, nanos.clamp(0, 999_999_999) as u32)
        .single()
        .unwrap_or_else(|| DateTime::<Utc>::from(std::time::UNIX_EPOCH))
}

#[cfg(unix)]
fn lookup_name(
    id: u32,
    lookup: impl Fn(&mut Vec<libc::c_char>) -> Result<Option<String>, i32>,
) -> String {
    let mut buffer = vec![0 as libc::c_char; 1024];

    loop {
        match lookup(&mut buffer) {
            Ok(Some(name)) => return name,
            Ok(None) => break,
            Err(libc::ERANGE) if buffer.len() < 1 << 20 => {
                let len = buffer.len() * 2;
                buffer.resize(len, 0);
            }
            Err(_) => break,
        }
    }

    warn!("unable to resolve name for id {}", id);
    id.to_string()
}

/// Resolve the login name of a user id.
///
/// Falls back to the numeric id when no name is known.
#[cfg(unix)]
pub fn user_name(uid: u32) -> String {
    lookup_name(uid, |buffer| {
        // SAFETY: every pointer refers to storage living through the call and
        // `pw_name` is only read when `result` is non-null.
        unsafe {
            let mut pwd: libc::passwd = std::mem::zeroed();
            let mut result: *mut libc::passwd = std::ptr::null_mut();
            let rc = libc::getpwuid_r(
                uid as libc::uid_t,
                &mut pwd,
                buffer.as_mut_ptr(),
                buffer.len(),
                &mut result,
            );

            if rc != 0 {
                Err(rc)
            } else if result.is_null() || pwd.pw_name.is_null() {
                Ok(None)
            } else {
                Ok(Some(
                    std::ffi::CStr::from_ptr(pwd.pw_name)
                        .to_string_lossy()
                        .into_owned(),
                ))
            }
        }
    })
}

/// Resolve the name of a group id.
///
/// Falls back to the numeric id when no name is known.
#[cfg(unix)]
pub fn group_name(gid: u32) -> String {
    lookup_name(gid, |buffer| {
        // SAFETY: see `user_name`.
        unsafe {
            let mut grp: libc::group = std::mem::zeroed();
            let mut result: *mut libc::group = std::ptr::null_mut();
            let rc = libc::getgrgid_r(
                gid as libc::gid_t,
                &mut grp,
                buffer.as_mut_ptr(),
                buffer.len(),
                &mut result,
            );

            if rc != 0 {
                Err(rc)
            } else if result.is_null() || grp.gr_name.is_null() {
                Ok(None)
            } else {
                Ok(Some(
                    std::ffi::CStr::from_ptr(grp.gr_name)
                        .to_string_lossy()
                        .into_owned(),
                ))
            }
        }
    })
}

/// Obtain metadata for a file.
///
/// Errors with [PlistError::NotFound] if `path` does not exist.
#[cfg(unix)]
pub fn file_metadata(path: &Path) -> Result<FileMetadata, PlistError> {
    let metadata = std::fs::metadata(path).map_err(|e| PlistError::from_io_at(e, path))?;

    Ok(FileMetadata {
        size: metadata.len(),
        mode: mode_string(metadata.mode()),
        owner: user_name(metadata.uid()),
        group: group_name(metadata.gid()),
        created: utc_timestamp(metadata.ctime(), metadata.ctime_nsec()),
        updated: utc_timestamp(metadata.mtime(), metadata.mtime_nsec()),
        accessed: utc_timestamp(metadata.atime(), metadata.atime_nsec()),
        exists: true,
    })
}

/// Obtain metadata for a file.
///
/// Owner and group are not available on this platform and are empty.
#[cfg(not(unix))]
pub fn file_metadata(path: &Path) -> Result<FileMetadata, PlistError> {
    let metadata = std::fs::metadata(path).map_err(|e| PlistError::from_io_at(e, path))?;

    let system_time = |t: std::io::Result<std::time::SystemTime>| {
        t.map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| utc_timestamp(0, 0))
    };

    let mode = if metadata.is_dir() { S_IFDIR | 0o755 } else { S_IFREG | 0o644 };
    let mode = if metadata.permissions().readonly() {
        mode & !0o222
    } else {
        mode
    };

    Ok(FileMetadata {
        size: metadata.len(),
        mode: mode_string(mode),
        owner: String::new(),
        group: String::new(),
        created: system_time(metadata.created()),
        updated: system_time(metadata.modified()),
        accessed: system_time(metadata.accessed()),
        exists: true,
    })
}
