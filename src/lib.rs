//! `mixed_fields`: a self-delimiting binary container format.
//!
//! A mixed fields file is a sequence of tagged fields:
//! `HEADER METADATA (DATA | EXTRA_METADATA)* ENDFILE`. Each field is
//! `TAG + [SIZE] + PAYLOAD + ENDBYTE`, where `SIZE` is present only for
//! variable-length fields and is itself a base-128, continuation-bit
//! encoded integer (see [`size_codec`]).
//!
//! [`Writer`] appends user payloads one at a time, emitting the HEADER and
//! METADATA prelude before the first and the ENDFILE terminator on
//! [`Writer::close`]. [`Reader`] consumes one user field per
//! [`Reader::read_item`] call, validating the prelude once and the
//! terminator at the end. Both are generic over an [`Opener`], the trait
//! that abstracts the underlying byte stream; [`FsOpener`] is the default,
//! real-filesystem-backed implementation.

pub use errors::{MixedFieldsError, MixedFieldsResult};
pub use field::{Field, ReadOutcome, Tag};
pub use opener::{FsOpener, Opener};
pub use reader::Reader;
pub use writer::Writer;

pub mod errors;
pub mod field;
pub mod grammar;
pub mod opener;
pub mod reader;
pub mod session;
pub mod size_codec;
pub mod writer;

#[cfg(test)]
mod tests;
