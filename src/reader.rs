//! Streaming reader: consumes one user field per call, validating the
//! mixed fields structure as it goes.

use std::io::{Read, Seek, SeekFrom};

use crate::errors::{MixedFieldsError, MixedFieldsResult};
use crate::field::{Field, ReadOutcome, Tag};
use crate::grammar::*;
use crate::opener::{FsOpener, Opener};
use crate::session::Session;
use crate::size_codec;

/// Forward-only reader over a mixed fields file. Each call to
/// [`Reader::read_item`] advances past exactly one user field, or
/// observes the terminal ENDFILE.
///
/// Generic over the byte-stream backend `O`; defaults to [`FsOpener`], the
/// real filesystem.
pub struct Reader<O: Opener = FsOpener> {
    session: Session,
    opener: O,
    strict_compat: bool,
}

impl Reader<FsOpener> {
    /// Creates a reader, optionally pre-bound to `path`, backed by the
    /// real filesystem.
    pub fn new(path: Option<String>) -> Self {
        Reader {
            session: Session::new(path),
            opener: FsOpener,
            strict_compat: false,
        }
    }
}

impl<O: Opener> Reader<O> {
    /// Creates a reader against a custom [`Opener`].
    pub fn with_opener(path: Option<String>, opener: O) -> Self {
        Reader {
            session: Session::new(path),
            opener,
            strict_compat: false,
        }
    }

    /// Enables strict-compat mode, under which the legacy `GS`-delimited
    /// DATA tag/endbyte is also accepted. Off by default.
    pub fn set_strict_compat(&mut self, enabled: bool) {
        self.strict_compat = enabled;
    }

    /// Binds `path`, resetting read progress. Fails with `DirtyState` if
    /// the session is currently dirty and `ignore_errors` is false.
    pub fn set_path(&mut self, path: impl Into<String>, ignore_errors: bool) -> MixedFieldsResult<()> {
        self.session.set_path(path, ignore_errors)
    }

    /// Returns the next user field (DATA or EXTRA_METADATA), or
    /// `ReadOutcome::EndOfStream` once the ENDFILE terminator has been
    /// consumed. HEADER, METADATA, and ENDFILE are never surfaced.
    pub fn read_item(&mut self) -> MixedFieldsResult<ReadOutcome> {
        let path = self.session.path()?.to_string();
        if self.session.is_dirty() {
            return Err(MixedFieldsError::DirtyState);
        }
        if !self.opener.exists(&path)? {
            return Err(MixedFieldsError::FileDoesNotExist);
        }
        let stream_len = self.opener.len(&path)?;
        if stream_len == 0 {
            return Err(MixedFieldsError::FileEmpty);
        }
        if self.session.read_cursor() >= stream_len {
            return if self.session.seen_eof() {
                Ok(ReadOutcome::EndOfStream)
            } else {
                Err(MixedFieldsError::MissingEof)
            };
        }

        let mut stream = self.opener.open_read(&path)?;
        stream.seek(SeekFrom::Start(self.session.read_cursor()))?;

        loop {
            let offset = stream.stream_position()?;
            let tag = self.read_tag(&mut stream, offset)?;

            let payload = if tag.is_variable_length() {
                self.read_variable_payload(&mut stream, offset)?
            } else if tag == Tag::Header {
                let mut buf = [0u8; 4];
                stream
                    .read_exact(&mut buf)
                    .map_err(|_| MixedFieldsError::BadHeaderPayload { offset })?;
                buf.to_vec()
            } else {
                Vec::new()
            };

            if !self.session.seen_header() {
                self.validate_header(tag, &payload, offset)?;
                let endbyte = self.read_endbyte(&mut stream, offset)?;
                if endbyte != ENDBYTE_HEADER {
                    log::warn!("bad header endbyte at offset {offset}");
                    return Err(MixedFieldsError::BadHeaderEndbyte { offset });
                }
                self.session.mark_seen_header();
                log::debug!("prelude: header validated");
                continue;
            }

            if !self.session.seen_metadata() {
                self.validate_metadata(tag, &payload, offset)?;
                let endbyte = self.read_endbyte(&mut stream, offset)?;
                if endbyte != ENDBYTE_METADATA {
                    log::warn!("bad metadata endbyte at offset {offset}");
                    return Err(MixedFieldsError::BadMetadataEndbyte { offset });
                }
                self.session.mark_seen_metadata();
                log::debug!("prelude: metadata validated");
                continue;
            }

            if tag == Tag::Endfile {
                let endbyte = self.read_endbyte(&mut stream, offset)?;
                if endbyte != ENDBYTE_ENDFILE {
                    log::warn!("bad endfile endbyte at offset {offset}");
                    return Err(MixedFieldsError::BadEndfileEndbyte { offset });
                }
                self.session.mark_seen_eof();
                let position = stream.stream_position()?;
                self.session.advance_cursor_to(position);
                log::debug!("reached ENDFILE at offset {offset}");
                return Ok(ReadOutcome::EndOfStream);
            }

            let endbyte = self.read_endbyte(&mut stream, offset)?;
            self.validate_user_endbyte(tag, endbyte, offset)?;

            let position = stream.stream_position()?;
            self.session.advance_cursor_to(position);
            log::trace!("read {tag:?} field, {} payload bytes, offset {offset}", payload.len());
            return Ok(ReadOutcome::Item(Field { tag, payload, endbyte }));
        }
    }

    fn read_tag<R: Read>(&self, stream: &mut R, offset: u64) -> MixedFieldsResult<Tag> {
        let mut buf = [0u8; TAG_SIZE];
        let read_result = stream.read_exact(&mut buf);

        // Before HEADER is seen, any short read or non-HEADER tag (known or
        // not) is reported as a bad header rather than an unrecognized tag;
        // there is no vocabulary to check against until the file is known
        // to actually be a mixed fields file.
        if !self.session.seen_header() {
            read_result.map_err(|_| MixedFieldsError::BadHeader { offset })?;
            return match Tag::from_bytes(&buf) {
                Some(Tag::Header) => Ok(Tag::Header),
                _ => {
                    log::warn!("expected HEADER as the first field, found something else at offset {offset}");
                    Err(MixedFieldsError::BadHeader { offset })
                }
            };
        }

        read_result.map_err(|_| MixedFieldsError::BadTag {
            offset,
            detail: "truncated tag".to_string(),
        })?;
        let tag = Tag::from_bytes(&buf).ok_or_else(|| {
            log::warn!("unrecognized tag at offset {offset}");
            MixedFieldsError::InvalidTag { offset, tag: buf }
        })?;
        if tag == Tag::DataLegacy && !self.strict_compat {
            log::warn!("legacy DATA tag rejected outside strict-compat mode at offset {offset}");
            return Err(MixedFieldsError::InvalidTag { offset, tag: buf });
        }
        Ok(tag)
    }

    fn read_variable_payload<R: Read>(&self, stream: &mut R, offset: u64) -> MixedFieldsResult<Vec<u8>> {
        let (size, _consumed) = size_codec::read_stream(&mut *stream, offset + TAG_SIZE as u64)?;
        let mut payload = vec![0u8; size as usize];
        stream.read_exact(&mut payload).map_err(|_| MixedFieldsError::BadSize { offset })?;
        Ok(payload)
    }

    fn read_endbyte<R: Read>(&self, stream: &mut R, offset: u64) -> MixedFieldsResult<u8> {
        let mut buf = [0u8; 1];
        stream.read_exact(&mut buf).map_err(|_| MixedFieldsError::BadTag {
            offset,
            detail: "truncated endbyte".to_string(),
        })?;
        Ok(buf[0])
    }

    fn validate_header(&self, tag: Tag, payload: &[u8], offset: u64) -> MixedFieldsResult<()> {
        if tag != Tag::Header {
            log::warn!("expected HEADER as the first field, found {tag:?} at offset {offset}");
            return Err(MixedFieldsError::BadHeader { offset });
        }
        // HEADER has a fixed (not size-prefixed) payload; read it directly.
        if payload != PAYLOAD_HEADER {
            return Err(MixedFieldsError::BadHeaderPayload { offset });
        }
        Ok(())
    }

    fn validate_metadata(&self, tag: Tag, payload: &[u8], offset: u64) -> MixedFieldsResult<()> {
        if tag != Tag::Metadata {
            log::warn!("expected METADATA as the second field, found {tag:?} at offset {offset}");
            return Err(MixedFieldsError::BadMetadataField { offset });
        }
        if payload != PAYLOAD_METADATA_EMPTY {
            return Err(MixedFieldsError::BadMetadataPayload { offset });
        }
        Ok(())
    }

    fn validate_user_endbyte(&self, tag: Tag, endbyte: u8, offset: u64) -> MixedFieldsResult<()> {
        if endbyte == tag.endbyte() {
            return Ok(());
        }
        log::warn!("bad endbyte for {tag:?} at offset {offset}");
        match tag {
            Tag::ExtraMetadata => Err(MixedFieldsError::BadExtraMetadataEndbyte { offset }),
            _ => Err(MixedFieldsError::BadDataEndbyte { offset }),
        }
    }
}
