//! Log archive access
//!
//! The CI system delivers a run's logs as one zip archive with a text file
//! per executed step. The archive is held fully in memory so entries can be
//! read in any order.

use std::io::{Cursor, Read};
use thiserror::Error;
use zip::ZipArchive;
use zip::result::ZipError;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("log bundle is not a valid zip archive: {0}")]
    Malformed(#[source] ZipError),

    #[error("failed to open log entry {name}: {source}")]
    Entry {
        name: String,
        #[source]
        source: ZipError,
    },

    #[error("failed to read log entry {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("log entry {name} exceeds {limit} bytes")]
    TooLarge { name: String, limit: u64 },
}

/// Largest entry [`LogArchive::read_entry`] will load unless configured otherwise
pub const DEFAULT_MAX_ENTRY_SIZE: u64 = 256 * 1024 * 1024;

/// Upper bound on the buffer reserved up front from an entry's declared size
const MAX_PREALLOCATION: u64 = 1024 * 1024;

/// Random-access view over a downloaded log bundle
pub struct LogArchive {
    inner: ZipArchive<Cursor<Vec<u8>>>,
    max_entry_size: u64,
}

impl LogArchive {
    /// Loads an archive from the raw downloaded bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ArchiveError> {
        let inner = ZipArchive::new(Cursor::new(bytes)).map_err(ArchiveError::Malformed)?;
        Ok(Self {
            inner,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
        })
    }

    /// Caps the number of bytes a single entry may inflate to
    pub fn with_max_entry_size(mut self, limit: u64) -> Self {
        self.max_entry_size = limit;
        self
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.inner.file_names()
    }

    /// Reads an entry fully, `None` if the archive has no entry by that name
    ///
    /// The size recorded in the archive is only a hint; an entry that
    /// inflates past the configured limit is rejected.
    pub fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        let mut file = match self.inner.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(source) => {
                return Err(ArchiveError::Entry {
                    name: name.to_string(),
                    source,
                });
            }
        };

        let limit = self.max_entry_size;
        let reserve = file.size().min(limit).min(MAX_PREALLOCATION);
        let mut contents = Vec::with_capacity(reserve as usize);
        (&mut file)
            .take(limit.saturating_add(1))
            .read_to_end(&mut contents)
            .map_err(|source| ArchiveError::Read {
                name: name.to_string(),
                source,
            })?;

        if contents.len() as u64 > limit {
            return Err(ArchiveError::TooLarge {
                name: name.to_string(),
                limit,
            });
        }

        Ok(Some(contents))
    }
}

impl std::fmt::Debug for LogArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogArchive")
            .field("entries", &self.inner.len())
            .field("max_entry_size", &self.max_entry_size)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    /// Builds an in-memory zip with the given entries
    pub(crate) fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_read_existing_entry() {
        let bytes = zip_bytes(&[("plan/7_Command.txt", b"hello\n")]);
        let mut archive = LogArchive::from_bytes(bytes).unwrap();

        assert_eq!(archive.len(), 1);
        assert_eq!(
            archive.read_entry("plan/7_Command.txt").unwrap(),
            Some(b"hello\n".to_vec())
        );
    }

    #[test]
    fn test_missing_entry_is_none() {
        let bytes = zip_bytes(&[("plan/1_Set up job.txt", b"setup\n")]);
        let mut archive = LogArchive::from_bytes(bytes).unwrap();

        assert_eq!(archive.read_entry("plan/7_Command.txt").unwrap(), None);
        assert_eq!(
            archive.entry_names().collect::<Vec<_>>(),
            vec!["plan/1_Set up job.txt"]
        );
    }

    #[test]
    fn test_entry_over_limit_is_rejected() {
        let bytes = zip_bytes(&[("plan/7_Command.txt", &[b'x'; 64])]);
        let mut archive = LogArchive::from_bytes(bytes)
            .unwrap()
            .with_max_entry_size(16);

        match archive.read_entry("plan/7_Command.txt") {
            Err(ArchiveError::TooLarge { name, limit }) => {
                assert_eq!(name, "plan/7_Command.txt");
                assert_eq!(limit, 16);
            }
            other => panic!("expected TooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_entry_at_limit_is_read() {
        let bytes = zip_bytes(&[("plan/7_Command.txt", &[b'x'; 16])]);
        let mut archive = LogArchive::from_bytes(bytes)
            .unwrap()
            .with_max_entry_size(16);

        assert_eq!(
            archive.read_entry("plan/7_Command.txt").unwrap(),
            Some(vec![b'x'; 16])
        );
    }

    #[test]
    fn test_inflated_declared_size_is_not_trusted() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        writer.start_file("plan/7_Command.txt", options).unwrap();
        writer.write_all(b"hello\n").unwrap();
        let mut bytes = writer.finish().unwrap().into_inner();

        // Central directory record: uncompressed size sits 24 bytes past the signature
        let header = bytes
            .windows(4)
            .position(|w| w == b"PK\x01\x02")
            .unwrap();
        bytes[header + 24..header + 28].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());

        let mut archive = LogArchive::from_bytes(bytes).unwrap();
        assert_eq!(
            archive.read_entry("plan/7_Command.txt").unwrap(),
            Some(b"hello\n".to_vec())
        );
    }

    #[test]
    fn test_rejects_non_zip_bytes() {
        let result = LogArchive::from_bytes(b"<html>not a zip</html>".to_vec());
        assert!(matches!(result, Err(ArchiveError::Malformed(_))));
    }
}
