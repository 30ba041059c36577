//! Module implement the store writer.
//!
//! Writing is two-phased. `put` stages records into per-key-length temp
//! streams under a scratch directory; `close` replays each stream into a
//! memory-mapped slot index, then concatenates metadata, sub-indexes and
//! data blocks into the output file. The writer is single threaded and
//! must be closed exactly once; a second close is a no-op.

use log::{debug, info};

use std::{
    collections::BTreeMap,
    convert::TryFrom,
    ffi, fs,
    io::{self, Read, Seek, Write},
    time,
};

use crate::{
    bloom::BloomFilter,
    config::Config,
    store::{
        build::{Insert, SlotIndex},
        files,
        metadata::{LengthMeta, Metadata},
        FORMAT_V1,
    },
    util,
    value::{self, Serializers, Value},
    varint, Error, Result,
};

/// Build a new store file. Records go in through [Writer::put] and the
/// file materializes on [Writer::close].
pub struct Writer {
    location: ffi::OsString,
    scratch_dir: ffi::OsString,
    streams: BTreeMap<usize, LengthStream>,
    serializers: Serializers,
    // typed out of Config up front so a bad value fails create, not close.
    segment_size: u64,
    load_factor: f64,
    compression: bool,
    duplicates: bool,
    bloom_enabled: bool,
    bloom_error_factor: f64,
    closed: bool,
    output_created: bool,
}

// staged record streams for one serialized key length.
struct LengthStream {
    key_len: usize,
    keys_loc: ffi::OsString,
    data_loc: ffi::OsString,
    keys: io::BufWriter<fs::File>,
    data: io::BufWriter<fs::File>,
    key_count: u64,
    actual_key_count: u64,
    data_len: u64,
    max_offset_len: usize,
    last_value: Option<Vec<u8>>,
    last_offset: u64,
}

impl LengthStream {
    fn create(scratch_dir: &ffi::OsStr, key_len: usize) -> Result<LengthStream> {
        let keys_loc = files::to_keys_location(scratch_dir, key_len);
        let data_loc = files::to_data_location(scratch_dir, key_len);
        let keys = io::BufWriter::new(util::create_file_rw(&keys_loc)?);
        let mut data = io::BufWriter::new(util::create_file_rw(&data_loc)?);

        // burn the first data byte so offset zero always means vacant.
        err_at!(IOError, data.write_all(&[0]))?;

        Ok(LengthStream {
            key_len,
            keys_loc,
            data_loc,
            keys,
            data,
            key_count: 0,
            actual_key_count: 0,
            data_len: 1,
            max_offset_len: 1,
            last_value: None,
            last_offset: 0,
        })
    }

    fn stage(&mut self, key: &[u8], value: Option<&[u8]>) -> Result<()> {
        let offset = match value {
            Some(value) if self.last_value.as_deref() == Some(value) => self.last_offset,
            Some(value) => {
                let offset = self.data_len;
                let n = varint::pack_int(&mut self.data, value.len() as i32)?;
                err_at!(IOError, self.data.write_all(value))?;
                self.data_len += (n + value.len()) as u64;
                self.last_value = Some(value.to_vec());
                self.last_offset = offset;
                offset
            }
            None => 0,
        };

        err_at!(IOError, self.keys.write_all(key))?;
        varint::pack_long(&mut self.keys, offset as i64)?;
        varint::pack_int(&mut self.keys, if value.is_none() { 1 } else { 0 })?;

        self.key_count += 1;
        if value.is_some() {
            self.actual_key_count += 1;
            let n = varint::packed_len_long(offset as i64);
            self.max_offset_len = self.max_offset_len.max(n);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        err_at!(IOError, self.keys.flush())?;
        err_at!(IOError, self.data.flush())
    }
}

impl Writer {
    /// Start a build of the store at `location`. The file itself is only
    /// created by [Writer::close]; staging happens in a scratch directory
    /// beside it.
    pub fn create(location: &ffi::OsStr, config: Config) -> Result<Writer> {
        let segment_size = config.to_segment_size()?;
        let load_factor = config.to_load_factor()?;
        let compression = config.to_compression()?;
        let duplicates = config.to_duplicates()?;
        let bloom_enabled = config.to_bloom_filter()?;
        let bloom_error_factor = config.to_bloom_error_factor()?;

        let scratch_dir = files::to_scratch_dir(location)?;
        err_at!(IOError, fs::create_dir_all(&scratch_dir))?;

        info!(target: "paldb", "writer for {:?}, scratch {:?}", location, scratch_dir);

        Ok(Writer {
            location: location.to_os_string(),
            scratch_dir,
            streams: BTreeMap::new(),
            serializers: config.serializers.clone(),
            segment_size,
            load_factor,
            compression,
            duplicates,
            bloom_enabled,
            bloom_error_factor,
            closed: false,
            output_created: false,
        })
    }

    /// Stage one record. A [Value::Null] value stages a tombstone, same as
    /// [Writer::remove].
    pub fn put<K, V>(&mut self, key: K, value: V) -> Result<()>
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        let key = value::serialize_key(&key.into(), &self.serializers)?;
        match value.into() {
            Value::Null => self.put_raw(&key, None),
            value => {
                let data =
                    value::serialize_value(&value, &self.serializers, self.compression)?;
                self.put_raw(&key, Some(&data))
            }
        }
    }

    /// Stage a batch of records.
    pub fn put_all<I, K, V>(&mut self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        for (key, value) in iter {
            self.put(key, value)?;
        }
        Ok(())
    }

    /// Stage a removal of `key`; the key is left out of the built index.
    pub fn remove<K>(&mut self, key: K) -> Result<()>
    where
        K: Into<Value>,
    {
        let key = value::serialize_key(&key.into(), &self.serializers)?;
        self.put_raw(&key, None)
    }

    /// Stage an already-serialized record; `None` stages a tombstone.
    pub fn put_raw(&mut self, key: &[u8], value: Option<&[u8]>) -> Result<()> {
        if self.closed {
            return err_at!(StoreClosed, msg: "put on closed writer");
        }
        if key.is_empty() {
            return err_at!(InvalidInput, msg: "empty key");
        }

        let key_len = key.len();
        if !self.streams.contains_key(&key_len) {
            let stream = LengthStream::create(&self.scratch_dir, key_len)?;
            self.streams.insert(key_len, stream);
        }
        self.streams.get_mut(&key_len).unwrap().stage(key, value)
    }

    /// Build the indexes and merge everything into the output file. Exactly
    /// one close does the work; later calls return without effect.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let res = self.build_and_merge();
        fs::remove_dir_all(&self.scratch_dir).ok();
        if res.is_err() && self.output_created {
            // a failed merge leaves no partial output behind.
            fs::remove_file(&self.location).ok();
        }
        res
    }

    fn build_and_merge(&mut self) -> Result<()> {
        let streams = std::mem::take(&mut self.streams);
        let staged: u64 = streams.values().map(|s| s.key_count).sum();

        let mut bloom = if self.bloom_enabled {
            Some(BloomFilter::new(staged, self.bloom_error_factor)?)
        } else {
            None
        };

        // phase one, replay every staged stream into its slot index.
        let mut lengths: Vec<LengthMeta> = vec![];
        let mut slots: Vec<fs::File> = vec![];
        let mut data_locs: Vec<ffi::OsString> = vec![];
        let (mut index_off, mut data_off) = (0_u64, 0_u64);

        for (key_len, mut stream) in streams.into_iter() {
            stream.flush()?;

            let slot_count = ((stream.key_count as f64) / self.load_factor).ceil() as u64;
            let (index, actual) = self.build_slots(&stream, slot_count, bloom.as_mut())?;

            let lm = LengthMeta {
                key_len,
                key_count: stream.key_count,
                actual_key_count: actual,
                slot_count,
                slot_size: key_len + stream.max_offset_len,
                index_offset: index_off,
                data_offset: data_off,
            };
            debug!(
                target: "paldb",
                "length {}, {}/{} keys, {} slots, {} collisions",
                key_len, actual, stream.key_count, slot_count, index.to_collisions()
            );

            index_off += lm.index_size();
            data_off += stream.data_len;
            slots.push(index.into_file()?);
            data_locs.push(stream.data_loc.clone());
            lengths.push(lm);
        }

        // phase two, metadata then concatenation.
        let mut meta = Metadata {
            version: FORMAT_V1.to_string(),
            built_at: to_epoch_millis()?,
            key_count: lengths.iter().map(|l| l.actual_key_count).sum(),
            bloom,
            serializers: self.serializers.clone(),
            lengths,
            index_region_offset: 0,
            data_region_offset: 0,
        };
        let meta_len = meta.encoded_len()? as u64;
        meta.index_region_offset = meta_len;
        meta.data_region_offset = meta_len + index_off;

        self.check_free_space(meta_len + index_off + data_off)?;

        let mut out = io::BufWriter::new(util::create_file_w(&self.location)?);
        self.output_created = true;
        meta.encode(&mut out)?;
        for fd in slots.into_iter() {
            copy_into(fd, &mut out)?;
        }
        for loc in data_locs.into_iter() {
            copy_into(util::open_file_r(&loc)?, &mut out)?;
        }

        err_at!(IOError, out.flush())?;
        let fd = match out.into_inner() {
            Ok(fd) => fd,
            Err(err) => return err_at!(IOError, msg: "{}", err),
        };
        err_at!(IOError, fd.sync_all())?;

        info!(
            target: "paldb",
            "built {:?}, {} keys in {} sub-indexes, {} bytes",
            self.location,
            meta.key_count,
            meta.lengths.len(),
            meta.data_region_offset + data_off
        );
        Ok(())
    }

    fn build_slots(
        &self,
        stream: &LengthStream,
        slot_count: u64,
        mut bloom: Option<&mut BloomFilter>,
    ) -> Result<(SlotIndex, u64)> {
        let loc = files::to_slots_location(&self.scratch_dir, stream.key_len);
        let mut index = SlotIndex::create(
            &loc,
            stream.key_len,
            stream.max_offset_len,
            slot_count,
            stream.key_count,
            self.segment_size,
        )?;

        let mut actual = stream.actual_key_count;
        let mut keys = io::BufReader::new(util::open_file_r(&stream.keys_loc)?);
        let mut key = vec![0; stream.key_len];
        for _ in 0..stream.key_count {
            err_at!(IOError, keys.read_exact(&mut key))?;
            let offset = varint::unpack_long(&mut keys)? as u64;
            let tombstone = varint::unpack_int(&mut keys)? == 1;

            if let Some(bloom) = bloom.as_mut() {
                bloom.add(&key);
            }

            match index.insert(&key, offset, tombstone, self.duplicates)? {
                Insert::Fresh | Insert::Dropped => (),
                // the record this one displaced was counted live at stage time.
                Insert::Overwrote | Insert::Collapsed => actual -= 1,
            }
        }

        Ok((index, actual))
    }

    // expected output must fit in two thirds of the usable free space.
    fn check_free_space(&self, expected: u64) -> Result<()> {
        let dir = match std::path::Path::new(&self.location).parent() {
            Some(dir) => dir.to_path_buf(),
            None => return err_at!(InvalidFile, msg: "{:?}", self.location),
        };
        let available = err_at!(IOError, fs2::available_space(&dir))?;
        if (expected as u128) * 3 > (available as u128) * 2 {
            return err_at!(
                OutOfDiskSpace, msg: "need {} of {} available", expected, available
            );
        }
        Ok(())
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        if !self.closed {
            fs::remove_dir_all(&self.scratch_dir).ok();
        }
    }
}

fn copy_into<W>(mut fd: fs::File, out: &mut W) -> Result<u64>
where
    W: io::Write,
{
    err_at!(IOError, fd.seek(io::SeekFrom::Start(0)))?;
    err_at!(IOError, io::copy(&mut fd, out))
}

fn to_epoch_millis() -> Result<i64> {
    let elapsed = err_at!(Fatal, time::UNIX_EPOCH.elapsed())?;
    err_at!(FailConvert, i64::try_from(elapsed.as_millis()))
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod writer_test;
