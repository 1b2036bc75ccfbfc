//! Streaming writer: emits a valid mixed fields file incrementally from
//! user payloads.

use std::io::Write as _;

use crate::errors::{MixedFieldsError, MixedFieldsResult};
use crate::field::Tag;
use crate::grammar::*;
use crate::opener::{FsOpener, Opener};
use crate::session::Session;
use crate::size_codec;

/// Appends DATA and EXTRA_METADATA fields to a mixed fields file, writing
/// the HEADER and METADATA prelude before the first user field and the
/// ENDFILE terminator on `close`.
///
/// Generic over the byte-stream backend `O`; defaults to [`FsOpener`], the
/// real filesystem.
pub struct Writer<O: Opener = FsOpener> {
    session: Session,
    opener: O,
}

impl Writer<FsOpener> {
    /// Creates a writer, optionally pre-bound to `path`, backed by the
    /// real filesystem.
    pub fn new(path: Option<String>) -> Self {
        Writer {
            session: Session::new(path),
            opener: FsOpener,
        }
    }
}

impl<O: Opener> Writer<O> {
    /// Creates a writer against a custom [`Opener`].
    pub fn with_opener(path: Option<String>, opener: O) -> Self {
        Writer {
            session: Session::new(path),
            opener,
        }
    }

    pub fn bytes_written(&self) -> u64 {
        self.session.bytes_written()
    }

    pub fn is_finalized(&self) -> bool {
        self.session.is_finalized()
    }

    /// Binds `path`, resetting write progress. Fails with `DirtyState` if
    /// the session is currently dirty and `ignore_errors` is false.
    pub fn set_path(&mut self, path: impl Into<String>, ignore_errors: bool) -> MixedFieldsResult<()> {
        self.session.set_path(path, ignore_errors)
    }

    /// Appends one user field. `tag` must be `Tag::Data` or
    /// `Tag::ExtraMetadata`; any other tag fails with `InvalidWriteTag`
    /// without touching the stream. Writes the HEADER and METADATA
    /// prelude first if this is the first field written to this path.
    pub fn write_item(&mut self, bytes: &[u8], tag: Tag) -> MixedFieldsResult<()> {
        let path = self.session.path()?.to_string();

        if !tag.is_user_writable() {
            return Err(MixedFieldsError::InvalidWriteTag { tag: tag.to_bytes() });
        }

        self.session.mark_not_finalized();

        if self.session.bytes_written() == 0 {
            self.append(&path, &Self::header_bytes())?;
            self.append(&path, &Self::metadata_bytes())?;
            log::debug!("wrote header and metadata prelude to {path}");
        }

        let size = size_codec::encode(bytes.len() as u64);
        let mut field = Vec::with_capacity(TAG_SIZE + size.len() + bytes.len() + 1);
        field.extend_from_slice(&tag.to_bytes());
        field.extend_from_slice(&size);
        field.extend_from_slice(bytes);
        field.push(tag.endbyte());

        log::trace!("writing {tag:?} field, {} payload bytes", bytes.len());
        self.append(&path, &field)
    }

    /// Appends the ENDFILE terminator if any user bytes have been written
    /// and the session is not already finalized. Idempotent.
    pub fn close(&mut self) -> MixedFieldsResult<()> {
        if self.session.bytes_written() > 0 && !self.session.is_finalized() {
            let path = self.session.path()?.to_string();
            let mut field = Vec::with_capacity(TAG_SIZE + 1);
            field.extend_from_slice(&TAG_ENDFILE);
            field.push(ENDBYTE_ENDFILE);
            self.append(&path, &field)?;
            log::debug!("wrote ENDFILE to {path}");
        }
        self.session.mark_finalized();
        Ok(())
    }

    fn header_bytes() -> Vec<u8> {
        let mut bytes = Vec::with_capacity(TAG_SIZE + PAYLOAD_HEADER.len() + 1);
        bytes.extend_from_slice(&TAG_HEADER);
        bytes.extend_from_slice(PAYLOAD_HEADER);
        bytes.push(ENDBYTE_HEADER);
        bytes
    }

    fn metadata_bytes() -> Vec<u8> {
        let mut bytes = Vec::with_capacity(TAG_SIZE + 1 + PAYLOAD_METADATA_EMPTY.len() + 1);
        bytes.extend_from_slice(&TAG_METADATA);
        bytes.push(PAYLOAD_METADATA_EMPTY.len() as u8);
        bytes.extend_from_slice(&PAYLOAD_METADATA_EMPTY);
        bytes.push(ENDBYTE_METADATA);
        bytes
    }

    fn append(&mut self, path: &str, bytes: &[u8]) -> MixedFieldsResult<()> {
        let mut stream = self.opener.open_append(path)?;
        let committed_before = self.session.bytes_written();
        stream.write_all(bytes).map_err(|source| MixedFieldsError::FileWriteError {
            bytes_committed: committed_before,
            source,
        })?;
        stream.flush().map_err(|source| MixedFieldsError::FileWriteError {
            bytes_committed: committed_before,
            source,
        })?;
        self.session.record_write(bytes.len() as u64);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn temp_path() -> (NamedTempFile, String) {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().to_str().unwrap().to_string();
        (temp, path)
    }

    #[test]
    fn empty_session_closed_immediately_writes_nothing() {
        let (_temp, path) = temp_path();
        let mut writer = Writer::new(Some(path.clone()));
        writer.close().unwrap();
        assert_eq!(writer.bytes_written(), 0);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn first_write_emits_header_and_metadata_prelude() {
        let (_temp, path) = temp_path();
        let mut writer = Writer::new(Some(path.clone()));
        writer.write_item(b"", Tag::Data).unwrap();
        writer.close().unwrap();

        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(&on_disk[0..5], &TAG_HEADER);
        assert_eq!(&on_disk[5..9], PAYLOAD_HEADER);
        assert_eq!(on_disk[9], ENDBYTE_HEADER);
        assert_eq!(&on_disk[10..15], &TAG_METADATA);
    }

    #[test]
    fn invalid_write_tag_does_not_touch_the_stream() {
        let (_temp, path) = temp_path();
        let mut writer = Writer::new(Some(path.clone()));
        let result = writer.write_item(b"x", Tag::Header);
        assert!(matches!(result, Err(MixedFieldsError::InvalidWriteTag { .. })));
        assert_eq!(writer.bytes_written(), 0);
    }

    #[test]
    fn close_is_idempotent() {
        let (_temp, path) = temp_path();
        let mut writer = Writer::new(Some(path));
        writer.write_item(b"x", Tag::Data).unwrap();
        writer.close().unwrap();
        let bytes_after_first_close = writer.bytes_written();
        writer.close().unwrap();
        assert_eq!(writer.bytes_written(), bytes_after_first_close);
    }

    #[test]
    fn dirty_rebind_without_ignore_errors_fails() {
        let (_temp, path) = temp_path();
        let (_temp2, other_path) = temp_path();
        let mut writer = Writer::new(Some(path));
        writer.write_item(b"x", Tag::Data).unwrap();
        assert!(matches!(
            writer.set_path(other_path, false),
            Err(MixedFieldsError::DirtyState)
        ));
    }

    #[test]
    fn dirty_rebind_with_ignore_errors_resets_the_writer() {
        let (_temp, path) = temp_path();
        let (_temp2, other_path) = temp_path();
        let mut writer = Writer::new(Some(path));
        writer.write_item(b"x", Tag::Data).unwrap();
        writer.set_path(other_path, true).unwrap();
        assert_eq!(writer.bytes_written(), 0);
        assert!(!writer.is_finalized());
    }
}
