//! Package implement a write-once, read-many key-value store.
//!
//! A store is a single self-contained file, built once (typically offline)
//! and subsequently memory-mapped by any number of reader processes. The
//! sweet spot is side data: datasets too large for in-memory hash maps and
//! too static for general purpose engines.
//!
//! Use [Writer] to build a new store file. And subsequently load the store
//! using the [Reader] type. Once a file is built it is immutable; readers
//! map it in segments and answer point lookups without locks or syscalls on
//! the hot path.
//!
//! **Inventory of features**
//!
//! * Single output file, keyed-by-length open-addressed hash indexes.
//! * Values are serialized through a self-describing tagged codec, [Value].
//! * Optional per-value block compression.
//! * Optional bloom filter, embedded in the file's metadata.
//! * API `get()` / `get_or()` operation, with bloom-filter support.
//! * API `iter()` and `iter_keys()` operation for full-store iteration.
//! * Read-write overlay, [Store], that rebuilds the file on flush.
//!
//! Typical workflow:
//!
//! ```ignore
//! let config = Config::new();
//! let mut writer = Writer::create(loc.as_ref(), config.clone()).unwrap();
//! writer.put(1, "foo").unwrap();
//! writer.close().unwrap();
//!
//! let reader = Reader::open(loc.as_ref(), config).unwrap();
//! assert_eq!(reader.get(1).unwrap(), Value::from("foo"));
//! ```

#[macro_use]
mod error;
pub mod util;

pub mod bloom;
pub mod config;
pub mod hash;
pub mod store;
pub mod value;
pub mod varint;

pub use crate::bloom::BloomFilter;
pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::store::{Reader, Stats, Store, Writer};
pub use crate::value::{Serializers, Value};
