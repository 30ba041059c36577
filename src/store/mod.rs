//! Package implement the store file, its writer and its readers.
//!
//! A store is one self-contained file, laid out as metadata, then one
//! open-addressed sub-index per serialized key length, then one data block
//! per key length:
//!
//! ```text
//! *------------------------------------------* 0
//! |       varint-utf "PALDB", version        |
//! |   built-at, key-count, bloom, names      |
//! |        per-length table, offsets         |
//! *------------------------------------------* index_region_offset
//! |        sub-index for length L1           |
//! |        sub-index for length L2           |
//! |                  ...                     |
//! *------------------------------------------* data_region_offset
//! |  0x00 | data block for length L1         |
//! |  0x00 | data block for length L2         |
//! |                  ...                     |
//! *------------------------------------------* EOF
//! ```
//!
//! A sub-index is `slot_count` fixed-width slots of
//! `[key bytes][packed offset]`; the offset is a varint into the length's
//! data block, padded with zeros to the sub-index's offset width. Offset
//! zero means vacant, which is why every data block burns its first byte.
//! Lookups hash the serialized key with seed 42 and probe linearly.
//!
//! [Writer] builds a file, [Reader] serves lookups over it, and [Store]
//! overlays in-memory updates on a reader, rebuilding the file on flush.

use lazy_static::lazy_static;

mod build;
mod files;
mod metadata;
mod reader;
mod rw;
mod segment;
mod writer;

pub use reader::{Entries, Keys, Reader, Stats};
pub use rw::Store;
pub use writer::Writer;

/// Magic prefix of every store file.
pub const MAGIC: &str = "PALDB";

/// Format-version label following the magic.
pub const FORMAT_V1: &str = "PALDB_V1";

lazy_static! {
    // varint-utf encoding of [MAGIC], the literal first bytes on disk.
    pub(crate) static ref MAGIC_PREFIX: Vec<u8> = {
        let mut buf = vec![];
        crate::varint::write_utf(&mut buf, MAGIC).unwrap();
        buf
    };
}
