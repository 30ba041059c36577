//! Module implement the store reader.
//!
//! A reader maps the store file in fixed-size segments and stays frozen
//! for its lifetime: metadata and mappings are immutable, so any number of
//! threads can call `get` and the iterators concurrently without external
//! synchronization. Slot reads that straddle a segment boundary are
//! stitched through a per-call scratch buffer.

use fs2::FileExt;
use log::info;

use std::{convert::TryFrom, ffi, fs, io};

use crate::{
    config::Config,
    hash,
    store::{
        metadata::{LengthMeta, Metadata},
        segment::Segments,
    },
    util,
    value::{self, Serializers, Value},
    varint, Error, Result,
};

/// Read-only handle over a built store file.
pub struct Reader {
    location: ffi::OsString,
    config: Config,
    fd: fs::File,
    segments: Segments,
    pub(crate) meta: Metadata,
    // serialized key length to entry in the metadata table.
    by_len: Vec<Option<usize>>,
    // positional reads for the data region when it is not mapped.
    mapped_data: bool,
}

/// Statistics for an open store, assembled from its metadata.
#[derive(Clone, Debug)]
pub struct Stats {
    pub version: String,
    /// Milliseconds since the epoch at build time.
    pub built_at: i64,
    /// Live keys after duplicate and tombstone resolution.
    pub key_count: u64,
    /// Number of per-key-length sub-indexes.
    pub length_count: usize,
    pub max_key_length: usize,
    pub index_region_offset: u64,
    pub data_region_offset: u64,
    /// Bloom filter bit size, zero when no filter is embedded.
    pub bloom_bit_size: u64,
    /// Declared custom-serializer identifiers, in registration order.
    pub serializers: Vec<String>,
}

impl Drop for Reader {
    fn drop(&mut self) {
        if let Err(err) = self.fd.unlock() {
            panic!("fail to unlock reader lock for {:?}: {}", self.location, err)
        }
    }
}

impl Reader {
    /// Open the store at `location`. The magic prefix and version label
    /// are validated before anything is mapped.
    pub fn open(location: &ffi::OsStr, config: Config) -> Result<Reader> {
        let fd = util::open_file_r(location)?;
        err_at!(IOError, fd.lock_shared())?;

        let mut reader = io::BufReader::new(&fd);
        let meta = Metadata::decode(&mut reader)?;
        std::mem::drop(reader);

        let file_len = err_at!(IOError, fd.metadata())?.len();
        if meta.data_region_offset > file_len || meta.index_region_offset > file_len {
            err_at!(
                Corruption, msg: "regions {}/{} beyond file {}",
                meta.index_region_offset, meta.data_region_offset, file_len
            )?
        }

        let segment_size = config.to_segment_size()?;
        for lm in meta.lengths.iter() {
            if (lm.slot_size as u64) > segment_size {
                err_at!(
                    InvalidInput, msg: "slot {} exceeds segment {}",
                    lm.slot_size, segment_size
                )?
            }
        }

        let mapped_data = config.to_mmap_data()?;
        let map_len = if mapped_data { file_len } else { meta.data_region_offset };
        let segments = Segments::map(&fd, map_len, segment_size)?;

        let by_len = {
            let max = meta.lengths.last().map(|lm| lm.key_len).unwrap_or(0);
            let mut by_len: Vec<Option<usize>> = vec![None; max + 1];
            for (i, lm) in meta.lengths.iter().enumerate() {
                by_len[lm.key_len] = Some(i);
            }
            by_len
        };

        info!(
            target: "paldb",
            "opened {:?}, {} keys in {} sub-indexes", location, meta.key_count,
            meta.lengths.len()
        );

        Ok(Reader {
            location: location.to_os_string(),
            config,
            fd,
            segments,
            meta,
            by_len,
            mapped_data,
        })
    }

    /// Open another handle over the same store file. Mappings, locks and
    /// iteration cursors are per handle.
    pub fn try_clone(&self) -> Result<Reader> {
        Reader::open(&self.location, self.config.clone())
    }

    /// Number of live keys in the store.
    pub fn size(&self) -> u64 {
        self.meta.key_count
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn to_location(&self) -> ffi::OsString {
        self.location.clone()
    }

    pub fn to_stats(&self) -> Stats {
        Stats {
            version: self.meta.version.clone(),
            built_at: self.meta.built_at,
            key_count: self.meta.key_count,
            length_count: self.meta.lengths.len(),
            max_key_length: self.meta.lengths.last().map(|lm| lm.key_len).unwrap_or(0),
            index_region_offset: self.meta.index_region_offset,
            data_region_offset: self.meta.data_region_offset,
            bloom_bit_size: self.meta.bloom.as_ref().map(|b| b.bit_size()).unwrap_or(0),
            serializers: self.meta.serializers.as_names().to_vec(),
        }
    }

    /// Declared custom-serializer identifiers, in registration order.
    pub fn as_serializers(&self) -> &Serializers {
        &self.meta.serializers
    }

    /// Fetch the value for `key`, failing with `KeyNotFound` on a miss.
    pub fn get<K>(&self, key: K) -> Result<Value>
    where
        K: Into<Value>,
    {
        let key = key.into();
        match self.get_value(&key)? {
            Some(value) => Ok(value),
            None => err_at!(KeyNotFound, msg: "{:?}", key),
        }
    }

    /// Fetch the value for `key`, handing back `default` on a miss.
    pub fn get_or<K>(&self, key: K, default: Value) -> Result<Value>
    where
        K: Into<Value>,
    {
        match self.get_value(&key.into())? {
            Some(value) => Ok(value),
            None => Ok(default),
        }
    }

    fn get_value(&self, key: &Value) -> Result<Option<Value>> {
        let key = value::serialize_key(key, &self.meta.serializers)?;
        match self.get_raw(&key)? {
            Some(data) => Ok(Some(value::deserialize(&data, &self.meta.serializers)?)),
            None => Ok(None),
        }
    }

    /// Typed getter. Fails with `KeyNotFound` when the key is absent and
    /// with `FailConvert` when the stored value has another shape. The
    /// remaining typed getters below behave the same way.
    pub fn get_int<K>(&self, key: K) -> Result<i32>
    where
        K: Into<Value>,
    {
        TryFrom::try_from(self.get(key)?)
    }

    pub fn get_long<K>(&self, key: K) -> Result<i64>
    where
        K: Into<Value>,
    {
        TryFrom::try_from(self.get(key)?)
    }

    pub fn get_bool<K>(&self, key: K) -> Result<bool>
    where
        K: Into<Value>,
    {
        TryFrom::try_from(self.get(key)?)
    }

    pub fn get_float<K>(&self, key: K) -> Result<f32>
    where
        K: Into<Value>,
    {
        TryFrom::try_from(self.get(key)?)
    }

    pub fn get_double<K>(&self, key: K) -> Result<f64>
    where
        K: Into<Value>,
    {
        TryFrom::try_from(self.get(key)?)
    }

    pub fn get_string<K>(&self, key: K) -> Result<String>
    where
        K: Into<Value>,
    {
        TryFrom::try_from(self.get(key)?)
    }

    pub fn get_bytes<K>(&self, key: K) -> Result<Vec<u8>>
    where
        K: Into<Value>,
    {
        TryFrom::try_from(self.get(key)?)
    }

    /// Probe for a serialized key, handing back the raw value bytes.
    pub fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let lm = match self.by_len.get(key.len()).copied().flatten() {
            Some(i) => &self.meta.lengths[i],
            None => return Ok(None),
        };
        if let Some(bloom) = &self.meta.bloom {
            if !bloom.might_contain(key) {
                return Ok(None);
            }
        }

        let h = hash::murmur3_positive(key, hash::KEY_SEED);
        let index_base = self.meta.index_region_offset + lm.index_offset;
        let mut scratch = vec![];

        for probe in 0..lm.slot_count {
            let slot = (h + probe) % lm.slot_count;
            let off = index_base + slot * (lm.slot_size as u64);
            let bytes = self.segments.read(off, lm.slot_size, &mut scratch)?;

            let (packed, _) = varint::unpack_long_at(bytes, lm.key_len)?;
            if packed == 0 {
                return Ok(None);
            }
            if &bytes[..lm.key_len] == key {
                let data_off =
                    self.meta.data_region_offset + lm.data_offset + (packed as u64);
                return Ok(Some(self.read_value(data_off)?));
            }
        }
        Ok(None)
    }

    // read `[packed_length][value bytes]` at an absolute file offset.
    fn read_value(&self, off: u64) -> Result<Vec<u8>> {
        let file_len = self.file_len();
        if off >= file_len {
            return err_at!(Corruption, msg: "value offset {} beyond {}", off, file_len);
        }

        let mut prefix = [0_u8; 5];
        let n = prefix.len().min((file_len - off) as usize);
        self.read_data(off, &mut prefix[..n])?;
        let (len, consumed) = varint::unpack_long_at(&prefix[..n], 0)?;

        let mut value = vec![0; len as usize];
        self.read_data(off + (consumed as u64), &mut value)?;
        Ok(value)
    }

    fn read_data(&self, off: u64, buf: &mut [u8]) -> Result<()> {
        if self.mapped_data {
            self.segments.read_into(off, buf)
        } else {
            util::read_at(&self.fd, off, buf)
        }
    }

    fn file_len(&self) -> u64 {
        if self.mapped_data {
            self.segments.len()
        } else {
            // the mapping stops at the data region; ask the file.
            match self.fd.metadata() {
                Ok(m) => m.len(),
                Err(_) => self.segments.len(),
            }
        }
    }

    /// Lazy, finite, non-restartable walk over every entry, in key-length
    /// order and slot order within a length.
    pub fn iter(&self) -> Entries {
        Entries { walk: SlotWalk::new(self) }
    }

    /// Like [Reader::iter], skipping value decoding altogether.
    pub fn iter_keys(&self) -> Keys {
        Keys { walk: SlotWalk::new(self) }
    }

    /// Raw variant of [Reader::iter], yielding serialized key and value
    /// bytes.
    pub(crate) fn iter_raw(&self) -> RawEntries {
        RawEntries { walk: SlotWalk::new(self) }
    }

    /// Release the handle. Mappings and the shared file lock go with it.
    pub fn close(self) -> Result<()> {
        Ok(())
    }

    /// Remove the store file from disk. Fails while another handle still
    /// holds a lock on it.
    pub fn purge(self) -> Result<()> {
        let location = self.location.clone();
        std::mem::drop(self);

        let fd = util::open_file_r(&location)?;
        match fd.try_lock_exclusive() {
            Ok(_) => {
                err_at!(IOError, fs::remove_file(&location), "remove {:?}", location)?;
                err_at!(IOError, fd.unlock())
            }
            Err(_) => err_at!(InvalidFile, msg: "{:?} locked", location),
        }
    }
}

// cursor over occupied slots, shared by the three iterators.
struct SlotWalk<'a> {
    reader: &'a Reader,
    len_idx: usize,
    slot: u64,
    scratch: Vec<u8>,
}

impl<'a> SlotWalk<'a> {
    fn new(reader: &'a Reader) -> SlotWalk<'a> {
        SlotWalk { reader, len_idx: 0, slot: 0, scratch: vec![] }
    }

    // next occupied slot as (key bytes, absolute value offset).
    fn next_occupied(&mut self) -> Option<Result<(Vec<u8>, u64)>> {
        let meta = &self.reader.meta;
        loop {
            let lm: &LengthMeta = meta.lengths.get(self.len_idx)?;
            if self.slot >= lm.slot_count {
                self.len_idx += 1;
                self.slot = 0;
                continue;
            }

            let off = meta.index_region_offset
                + lm.index_offset
                + self.slot * (lm.slot_size as u64);
            self.slot += 1;

            let bytes =
                match self.reader.segments.read(off, lm.slot_size, &mut self.scratch) {
                    Ok(bytes) => bytes,
                    Err(err) => return Some(Err(err)),
                };
            let packed = match varint::unpack_long_at(bytes, lm.key_len) {
                Ok((packed, _)) => packed,
                Err(err) => return Some(Err(err)),
            };
            if packed == 0 {
                continue;
            }

            let key = bytes[..lm.key_len].to_vec();
            let data_off = meta.data_region_offset + lm.data_offset + (packed as u64);
            return Some(Ok((key, data_off)));
        }
    }
}

/// Entry iterator handed out by [Reader::iter].
pub struct Entries<'a> {
    walk: SlotWalk<'a>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = Result<(Value, Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, data_off) = match self.walk.next_occupied()? {
            Ok(found) => found,
            Err(err) => return Some(Err(err)),
        };
        let reader = self.walk.reader;
        let item = || -> Result<(Value, Value)> {
            let serializers = &reader.meta.serializers;
            let key = value::deserialize(&key, serializers)?;
            let data = reader.read_value(data_off)?;
            Ok((key, value::deserialize(&data, serializers)?))
        }();
        Some(item)
    }
}

/// Key iterator handed out by [Reader::iter_keys].
pub struct Keys<'a> {
    walk: SlotWalk<'a>,
}

impl<'a> Iterator for Keys<'a> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, _) = match self.walk.next_occupied()? {
            Ok(found) => found,
            Err(err) => return Some(Err(err)),
        };
        Some(value::deserialize(&key, &self.walk.reader.meta.serializers))
    }
}

pub(crate) struct RawEntries<'a> {
    walk: SlotWalk<'a>,
}

impl<'a> Iterator for RawEntries<'a> {
    type Item = Result<(Vec<u8>, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, data_off) = match self.walk.next_occupied()? {
            Ok(found) => found,
            Err(err) => return Some(Err(err)),
        };
        match self.walk.reader.read_value(data_off) {
            Ok(data) => Some(Ok((key, data))),
            Err(err) => Some(Err(err)),
        }
    }
}

#[cfg(test)]
#[path = "reader_test.rs"]
mod reader_test;
