// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoding of binary and XML plist files.

use {
    crate::PlistError,
    log::debug,
    plist::{Dictionary, Value},
    std::{
        fmt,
        io::{Cursor, Read},
        path::Path,
    },
};

/// Header magic of binary plists.
pub const BINARY_PLIST_MAGIC: &[u8] = b"bplist00";

/// The on-disk encoding of a plist.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EncodingKind {
    Binary,
    Xml,
}

impl EncodingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn decode_binary(data: &[u8]) -> Result<Dictionary, String> {
    if !data.starts_with(BINARY_PLIST_MAGIC) {
        return Err("missing bplist00 header".to_string());
    }

    Value::from_reader(Cursor::new(data))
        .map_err(|e| e.to_string())?
        .into_dictionary()
        .ok_or_else(|| "root is not a dictionary".to_string())
}

fn decode_xml(data: &[u8]) -> Result<Dictionary, String> {
    Value::from_reader_xml(data)
        .map_err(|e| e.to_string())?
        .into_dictionary()
        .ok_or_else(|| "root is not a dictionary".to_string())
}

/// Decode plist content held in memory.
///
/// Binary decoding is attempted first. If it fails for any reason, including
/// the content not having a dictionary root, the same bytes are decoded as XML.
///
/// `source` describes where the bytes came from and is used in error messages.
pub fn decode_bytes_from(
    data: &[u8],
    source: &str,
) -> Result<(Dictionary, EncodingKind), PlistError> {
    match decode_binary(data) {
        Ok(dict) => {
            debug!("{}: decoded as binary plist", source);
            return Ok((dict, EncodingKind::Binary));
        }
        Err(e) => {
            debug!("{}: binary plist decode failed: {}", source, e);
        }
    }

    match decode_xml(data) {
        Ok(dict) => {
            debug!("{}: decoded as XML plist", source);
            Ok((dict, EncodingKind::Xml))
        }
        Err(e) => {
            debug!("{}: XML plist decode failed: {}", source, e);
            Err(PlistError::invalid_file(source))
        }
    }
}

/// Decode plist content held in memory.
pub fn decode_bytes(data: &[u8]) -> Result<(Dictionary, EncodingKind), PlistError> {
    decode_bytes_from(data, "plist data")
}

/// Decode plist content from a reader.
///
/// The reader is consumed to its end before decoding.
pub fn decode_reader(
    mut reader: impl Read,
) -> Result<(Dictionary, EncodingKind), PlistError> {
    let mut data = vec![];
    reader.read_to_end(&mut data)?;

    decode_bytes_from(&data, "plist stream")
}

/// Decode a plist file.
///
/// Errors with [PlistError::NotFound] if `path` does not resolve to an existing
/// regular file and [PlistError::InvalidFile] if its content is neither a
/// binary nor an XML plist with a dictionary root.
pub fn decode_path(path: &Path) -> Result<(Dictionary, EncodingKind), PlistError> {
    if path.as_os_str().is_empty() {
        return Err(PlistError::InvalidInput("empty path".to_string()));
    }

    let metadata = std::fs::metadata(path).map_err(|e| PlistError::from_io_at(e, path))?;
    if !metadata.is_file() {
        return Err(PlistError::NotFound(path.to_path_buf()));
    }

    let data = std::fs::read(path).map_err(|e| PlistError::from_io_at(e, path))?;

    decode_bytes_from(&data, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::testutil::*,
        std::io::Write,
    };

    #[test]
    fn xml_file() -> Result<(), PlistError> {
        let file = write_temp_plist(ABC_XML.as_bytes());

        let (dict, kind) = decode_path(file.path())?;
        assert_eq!(kind, EncodingKind::Xml);
        assert_eq!(dict, abc_dictionary());

        Ok(())
    }

    #[test]
    fn binary_file() -> Result<(), PlistError> {
        let file = write_temp_plist(&binary_plist(&abc_dictionary()));

        let (dict, kind) = decode_path(file.path())?;
        assert_eq!(kind, EncodingKind::Binary);
        assert_eq!(dict, abc_dictionary());

        Ok(())
    }

    #[test]
    fn reader_and_bytes() -> Result<(), PlistError> {
        let data = binary_plist(&abc_dictionary());

        let (dict, kind) = decode_reader(Cursor::new(data.clone()))?;
        assert_eq!(kind, EncodingKind::Binary);
        assert_eq!(dict, abc_dictionary());

        let (dict, kind) = decode_bytes(ABC_XML.as_bytes())?;
        assert_eq!(kind, EncodingKind::Xml);
        assert_eq!(dict, abc_dictionary());

        Ok(())
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.plist");

        assert!(matches!(decode_path(&path), Err(PlistError::NotFound(p)) if p == path));

        let err = decode_path(dir.path()).unwrap_err();
        assert!(matches!(err, PlistError::NotFound(_)));
        assert!(err.to_string().ends_with("is not a regular file"));

        assert!(matches!(
            decode_path(Path::new("")),
            Err(PlistError::InvalidInput(_))
        ));
    }

    #[test]
    fn garbage_content() {
        let file = write_temp_plist("!BAD£%$@£DATA".as_bytes());
        assert!(matches!(
            decode_path(file.path()),
            Err(PlistError::InvalidFile(_))
        ));

        assert!(matches!(decode_bytes(b""), Err(PlistError::InvalidFile(_))));
        assert!(matches!(
            decode_bytes(b"bplist00garbage"),
            Err(PlistError::InvalidFile(_))
        ));
    }

    #[test]
    fn non_dictionary_root() {
        let array_xml = indoc::indoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
            <plist version="1.0">
            <array>
                <string>x</string>
            </array>
            </plist>
        "#};
        assert!(matches!(
            decode_bytes(array_xml.as_bytes()),
            Err(PlistError::InvalidFile(_))
        ));

        let mut data = vec![];
        Value::Array(vec![Value::String("x".into())])
            .to_writer_binary(&mut data)
            .unwrap();
        assert!(matches!(
            decode_bytes(&data),
            Err(PlistError::InvalidFile(_))
        ));
    }

    #[test]
    fn truncated_binary() {
        let data = binary_plist(&abc_dictionary());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&data[0..data.len() / 2]).unwrap();
        file.flush().unwrap();

        assert!(matches!(
            decode_path(file.path()),
            Err(PlistError::InvalidFile(_))
        ));
    }

    #[test]
    fn encoding_kind_display() {
        assert_eq!(EncodingKind::Binary.to_string(), "binary");
        assert_eq!(EncodingKind::Xml.to_string(), "xml");
    }
}
