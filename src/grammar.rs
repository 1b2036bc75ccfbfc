//! Byte-exact constants for the mixed fields wire grammar.
//!
//! Tags are a 5-byte separator-prefixed mnemonic; the canonical grammar is
//! `HEADER METADATA (DATA | EXTRA_METADATA)* ENDFILE`. See the crate docs
//! for the full grammar.

/// ASCII file separator, `0x1C`.
pub const SEP_FILE: u8 = 0x1C;
/// ASCII group separator, `0x1D`. Only ever seen on the wire as the legacy
/// DATA tag/endbyte accepted by strict-compat readers.
pub const SEP_GROUP: u8 = 0x1D;
/// ASCII record separator, `0x1E`.
pub const SEP_RECORD: u8 = 0x1E;

pub const TAG_SIZE: usize = 5;

pub const TAG_HEADER: [u8; TAG_SIZE] = [SEP_FILE, b'M', b'i', b'x', b'd'];
pub const ENDBYTE_HEADER: u8 = SEP_FILE;
pub const PAYLOAD_HEADER: &[u8] = b"Flds";

pub const TAG_METADATA: [u8; TAG_SIZE] = [SEP_RECORD, b's', b'M', b'D', b'T'];
pub const ENDBYTE_METADATA: u8 = SEP_RECORD;
pub const PAYLOAD_METADATA_EMPTY: [u8; 8] = [0; 8];

pub const TAG_EXTRA_METADATA: [u8; TAG_SIZE] = [SEP_RECORD, b'e', b'M', b'D', b'T'];
pub const ENDBYTE_EXTRA_METADATA: u8 = SEP_RECORD;

pub const TAG_DATA: [u8; TAG_SIZE] = [SEP_RECORD, b's', b'D', b'A', b'T'];
pub const ENDBYTE_DATA: u8 = SEP_RECORD;

/// The legacy DATA tag/endbyte from the `GS`-delimited branch of the
/// original implementation. Accepted by a strict-compat reader only;
/// the canonical writer never emits it.
pub const TAG_DATA_LEGACY: [u8; TAG_SIZE] = [SEP_GROUP, b's', b'D', b'A', b'T'];
pub const ENDBYTE_DATA_LEGACY: u8 = SEP_GROUP;

pub const TAG_ENDFILE: [u8; TAG_SIZE] = [SEP_FILE, b'x', b'E', b'O', b'F'];
pub const ENDBYTE_ENDFILE: u8 = SEP_FILE;
