//! Per-stream lifecycle state shared by [`crate::writer::Writer`] and
//! [`crate::reader::Reader`].

use crate::errors::{MixedFieldsError, MixedFieldsResult};

/// Tracks the path binding, write progress, and read cursor for one
/// logical mixed fields file.
///
/// A `Session` is not safe for concurrent use; callers sharing one across
/// threads must provide their own synchronization.
#[derive(Clone, Debug, Default)]
pub struct Session {
    path: Option<String>,
    bytes_written: u64,
    finalized: bool,
    read_cursor: u64,
    seen_header: bool,
    seen_metadata: bool,
    seen_eof: bool,
}

impl Session {
    /// Creates a session, optionally pre-bound to `path`.
    pub fn new(path: Option<String>) -> Self {
        Session {
            path,
            ..Default::default()
        }
    }

    pub fn path(&self) -> MixedFieldsResult<&str> {
        self.path.as_deref().ok_or(MixedFieldsError::PathNone)
    }

    pub fn is_dirty(&self) -> bool {
        self.bytes_written > 0 && !self.finalized
    }

    /// Binds `path`, resetting all lifecycle state. Fails with
    /// `DirtyState` if the session is currently dirty, unless
    /// `ignore_errors` is set, in which case the in-progress file is
    /// abandoned without an EOF.
    pub fn set_path(&mut self, path: impl Into<String>, ignore_errors: bool) -> MixedFieldsResult<()> {
        if self.is_dirty() && !ignore_errors {
            return Err(MixedFieldsError::DirtyState);
        }

        *self = Session::new(Some(path.into()));
        log::debug!("session rebound to a new path");
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub(crate) fn record_write(&mut self, n: u64) {
        self.bytes_written += n;
    }

    pub(crate) fn mark_not_finalized(&mut self) {
        self.finalized = false;
    }

    pub(crate) fn mark_finalized(&mut self) {
        self.finalized = true;
    }

    pub fn read_cursor(&self) -> u64 {
        self.read_cursor
    }

    pub(crate) fn advance_cursor_to(&mut self, offset: u64) {
        self.read_cursor = offset;
    }

    pub fn seen_header(&self) -> bool {
        self.seen_header
    }

    pub(crate) fn mark_seen_header(&mut self) {
        self.seen_header = true;
    }

    pub fn seen_metadata(&self) -> bool {
        self.seen_metadata
    }

    pub(crate) fn mark_seen_metadata(&mut self) {
        self.seen_metadata = true;
    }

    pub fn seen_eof(&self) -> bool {
        self.seen_eof
    }

    pub(crate) fn mark_seen_eof(&mut self) {
        self.seen_eof = true;
    }
}
