//! Crate-wide error taxonomy for the mixed fields framing codec.

use std::io;
use thiserror::Error;

/// Every failure mode the framing codec can surface.
///
/// Variants raised while parsing a byte stream carry the `offset` at which
/// the mismatch was detected, so a caller can report exactly where a file
/// went bad without re-scanning it.
#[derive(Debug, Error)]
pub enum MixedFieldsError {
    #[error("path is not set")]
    PathNone,

    #[error("session is dirty: bytes have been written but the file was not closed")]
    DirtyState,

    #[error("file does not exist")]
    FileDoesNotExist,

    #[error("file is empty")]
    FileEmpty,

    #[error("bad tag at offset {offset}: {detail}")]
    BadTag { offset: u64, detail: String },

    #[error("tag {tag:?} at offset {offset} is not part of the mixed fields vocabulary")]
    InvalidTag { offset: u64, tag: [u8; 5] },

    #[error("size subfield truncated at offset {offset}")]
    BadSize { offset: u64 },

    #[error("cannot decode a size subfield from an empty chunk")]
    EmptyChunk,

    #[error("bad header tag at offset {offset}")]
    BadHeader { offset: u64 },

    #[error("bad header payload at offset {offset}: expected \"Flds\"")]
    BadHeaderPayload { offset: u64 },

    #[error("bad header endbyte at offset {offset}")]
    BadHeaderEndbyte { offset: u64 },

    #[error("bad metadata tag at offset {offset}")]
    BadMetadataField { offset: u64 },

    #[error("bad metadata payload at offset {offset}: expected 8 NUL bytes")]
    BadMetadataPayload { offset: u64 },

    #[error("bad metadata endbyte at offset {offset}")]
    BadMetadataEndbyte { offset: u64 },

    #[error("bad data endbyte at offset {offset}")]
    BadDataEndbyte { offset: u64 },

    #[error("bad extra-metadata endbyte at offset {offset}")]
    BadExtraMetadataEndbyte { offset: u64 },

    #[error("bad endfile endbyte at offset {offset}")]
    BadEndfileEndbyte { offset: u64 },

    #[error("cannot write tag {tag:?}; only DATA and EXTRA_METADATA are writable")]
    InvalidWriteTag { tag: [u8; 5] },

    #[error("stream ended without an ENDFILE field")]
    MissingEof,

    #[error("write failed after {bytes_committed} bytes were committed: {source}")]
    FileWriteError {
        bytes_committed: u64,
        #[source]
        source: io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias used throughout the crate.
pub type MixedFieldsResult<T> = Result<T, MixedFieldsError>;
