//! Byte-stream access abstraction.
//!
//! The framing codec never touches `std::fs` directly; it asks an
//! [`Opener`] for an append handle or a seekable read handle to a named
//! byte stream. [`FsOpener`] is the default, zero-configuration
//! implementation backed by the real filesystem.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, Write};

use crate::errors::MixedFieldsResult;

/// Abstracts append/read access to a named byte stream.
///
/// Implementations only need to support the access patterns the framing
/// codec actually uses: open-for-append (never truncates, never seeks),
/// and open-for-read-and-seek (never writes).
pub trait Opener {
    type Writer: Write;
    type Reader: Read + Seek;

    /// Opens `path` for appending, creating it if it does not exist.
    fn open_append(&self, path: &str) -> MixedFieldsResult<Self::Writer>;

    /// Opens `path` for reading and seeking.
    fn open_read(&self, path: &str) -> MixedFieldsResult<Self::Reader>;

    /// Whether `path` currently exists.
    fn exists(&self, path: &str) -> MixedFieldsResult<bool>;

    /// The current length of `path` in bytes.
    fn len(&self, path: &str) -> MixedFieldsResult<u64>;
}

/// The default [`Opener`], backed by `std::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsOpener;

impl Opener for FsOpener {
    type Writer = File;
    type Reader = File;

    fn open_append(&self, path: &str) -> MixedFieldsResult<File> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(file)
    }

    fn open_read(&self, path: &str) -> MixedFieldsResult<File> {
        let file = OpenOptions::new().read(true).open(path)?;
        Ok(file)
    }

    fn exists(&self, path: &str) -> MixedFieldsResult<bool> {
        Ok(fs::metadata(path).is_ok())
    }

    fn len(&self, path: &str) -> MixedFieldsResult<u64> {
        Ok(fs::metadata(path)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn reports_len_and_existence_of_a_real_file() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"hello").unwrap();
        temp.flush().unwrap();

        let opener = FsOpener;
        let path = temp.path().to_str().unwrap();
        assert!(opener.exists(path).unwrap());
        assert_eq!(opener.len(path).unwrap(), 5);
    }

    #[test]
    fn missing_path_does_not_exist() {
        let opener = FsOpener;
        assert!(!opener.exists("/nonexistent/path/mixed-fields-test").unwrap());
    }

    #[test]
    fn open_append_creates_a_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("created.mixd");
        let path_str = path.to_str().unwrap();

        let opener = FsOpener;
        {
            let mut writer = opener.open_append(path_str).unwrap();
            writer.write_all(b"abc").unwrap();
        }
        assert_eq!(opener.len(path_str).unwrap(), 3);
    }
}
