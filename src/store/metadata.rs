//! Module implement the store's metadata header.
//!
//! The header is hand framed, byte for byte, so files written by any
//! conforming implementation decode everywhere. Refer to the package
//! documentation for the full layout.

use std::{convert::TryFrom, io};

use crate::{
    bloom::BloomFilter,
    store::{FORMAT_V1, MAGIC_PREFIX},
    value::Serializers,
    varint, Error, Result,
};

/// Shape of one per-key-length sub-index, as recorded in the header.
#[derive(Clone, Debug, PartialEq)]
pub struct LengthMeta {
    pub key_len: usize,
    /// Records staged for this length, duplicates and tombstones included.
    pub key_count: u64,
    /// Occupied slots after duplicate and tombstone resolution.
    pub actual_key_count: u64,
    pub slot_count: u64,
    pub slot_size: usize,
    /// Byte offset of this sub-index within the index region.
    pub index_offset: u64,
    /// Byte offset of this length's data block within the data region.
    pub data_offset: u64,
}

impl LengthMeta {
    pub fn index_size(&self) -> u64 {
        self.slot_count * (self.slot_size as u64)
    }
}

/// Decoded store header.
#[derive(Clone, Debug, PartialEq)]
pub struct Metadata {
    pub version: String,
    /// Milliseconds since the epoch at build time.
    pub built_at: i64,
    /// Global key count after duplicate and tombstone resolution.
    pub key_count: u64,
    pub bloom: Option<BloomFilter>,
    pub serializers: Serializers,
    /// Per key-length table, ascending.
    pub lengths: Vec<LengthMeta>,
    /// Absolute offset of the first sub-index byte.
    pub index_region_offset: u64,
    /// Absolute offset of the first data region byte.
    pub data_region_offset: u64,
}

impl Metadata {
    pub fn encode<W>(&self, out: &mut W) -> Result<usize>
    where
        W: io::Write,
    {
        let mut buf: Vec<u8> = vec![];

        buf.extend_from_slice(&MAGIC_PREFIX);
        varint::write_utf(&mut buf, &self.version)?;
        varint::write_long(&mut buf, self.built_at)?;
        varint::write_long(&mut buf, to_i64(self.key_count)?)?;

        match &self.bloom {
            Some(bloom) => {
                varint::write_int(&mut buf, to_i32(bloom.bit_size())?)?;
                varint::write_int(&mut buf, to_i32(bloom.as_words().len() as u64)?)?;
                varint::write_int(&mut buf, bloom.hashes() as i32)?;
                for word in bloom.as_words().iter() {
                    varint::write_long(&mut buf, *word as i64)?;
                }
            }
            None => {
                varint::write_int(&mut buf, 0)?;
                varint::write_int(&mut buf, 0)?;
                varint::write_int(&mut buf, 0)?;
            }
        }

        varint::write_int(&mut buf, self.serializers.len() as i32)?;
        for name in self.serializers.as_names().iter() {
            varint::write_utf(&mut buf, name)?;
        }

        varint::write_int(&mut buf, self.lengths.len() as i32)?;
        let max_key_len = self.lengths.last().map(|l| l.key_len).unwrap_or(0);
        varint::write_int(&mut buf, max_key_len as i32)?;
        for lm in self.lengths.iter() {
            varint::write_int(&mut buf, lm.key_len as i32)?;
            varint::write_long(&mut buf, to_i64(lm.key_count)?)?;
            varint::write_long(&mut buf, to_i64(lm.actual_key_count)?)?;
            varint::write_long(&mut buf, to_i64(lm.slot_count)?)?;
            varint::write_int(&mut buf, lm.slot_size as i32)?;
            varint::write_long(&mut buf, to_i64(lm.index_offset)?)?;
            varint::write_long(&mut buf, to_i64(lm.data_offset)?)?;
        }

        varint::write_long(&mut buf, to_i64(self.index_region_offset)?)?;
        varint::write_long(&mut buf, to_i64(self.data_region_offset)?)?;

        err_at!(IOError, out.write_all(&buf))?;
        Ok(buf.len())
    }

    /// Byte length [Metadata::encode] shall produce. The trailing region
    /// offsets are fixed width, so the length is stable while the writer
    /// fills them in.
    pub fn encoded_len(&self) -> Result<usize> {
        let mut buf: Vec<u8> = vec![];
        self.encode(&mut buf)
    }

    pub fn decode<R>(r: &mut R) -> Result<Metadata>
    where
        R: io::Read,
    {
        let mut magic = vec![0; MAGIC_PREFIX.len()];
        if r.read_exact(&mut magic).is_err() || magic != *MAGIC_PREFIX {
            return err_at!(Corruption, msg: "bad magic {:?}", magic);
        }
        let version = varint::read_utf(r)?;
        if version != FORMAT_V1 {
            return err_at!(Corruption, msg: "unknown version {:?}", version);
        }

        let built_at = varint::read_long(r)?;
        let key_count = to_u64(varint::read_long(r)?)?;

        let bloom = {
            let bit_size = varint::read_int(r)?;
            let word_count = varint::read_int(r)?;
            let hash_count = varint::read_int(r)?;
            if bit_size < 0 || word_count < 0 || hash_count < 0 {
                return err_at!(
                    Corruption, msg: "bloom {}/{}/{}", bit_size, word_count, hash_count
                );
            }
            let mut words = Vec::with_capacity(word_count as usize);
            for _ in 0..word_count {
                words.push(varint::read_long(r)? as u64);
            }
            match bit_size {
                0 if hash_count == 0 && words.is_empty() => None,
                0 => return err_at!(Corruption, msg: "bloom bits 0"),
                n => Some(BloomFilter::from_parts(n as u64, hash_count as u32, words)?),
            }
        };

        let serializers = {
            let count = varint::read_int(r)?;
            if count < 0 {
                return err_at!(Corruption, msg: "serializer count {}", count);
            }
            let mut serializers = Serializers::default();
            for _ in 0..count {
                let name = varint::read_utf(r)?;
                serializers.register(&name);
            }
            serializers
        };

        let length_count = varint::read_int(r)?;
        let max_key_len = varint::read_int(r)?;
        if length_count < 0 || max_key_len < 0 {
            return err_at!(Corruption, msg: "lengths {}/{}", length_count, max_key_len);
        }

        let mut lengths: Vec<LengthMeta> = Vec::with_capacity(length_count as usize);
        for _ in 0..length_count {
            let lm = LengthMeta {
                key_len: to_usize(varint::read_int(r)?)?,
                key_count: to_u64(varint::read_long(r)?)?,
                actual_key_count: to_u64(varint::read_long(r)?)?,
                slot_count: to_u64(varint::read_long(r)?)?,
                slot_size: to_usize(varint::read_int(r)?)?,
                index_offset: to_u64(varint::read_long(r)?)?,
                data_offset: to_u64(varint::read_long(r)?)?,
            };
            if lm.slot_size <= lm.key_len || lm.slot_count < lm.actual_key_count {
                return err_at!(Corruption, msg: "length meta {:?}", lm);
            }
            match lengths.last() {
                Some(prev) if prev.key_len >= lm.key_len => {
                    return err_at!(Corruption, msg: "lengths out of order");
                }
                _ => (),
            }
            lengths.push(lm);
        }
        match lengths.last() {
            Some(last) if last.key_len != (max_key_len as usize) => {
                return err_at!(Corruption, msg: "max key length {}", max_key_len);
            }
            None if max_key_len != 0 => {
                return err_at!(Corruption, msg: "max key length {}", max_key_len);
            }
            _ => (),
        }

        let index_region_offset = to_u64(varint::read_long(r)?)?;
        let data_region_offset = to_u64(varint::read_long(r)?)?;

        let val = Metadata {
            version,
            built_at,
            key_count,
            bloom,
            serializers,
            lengths,
            index_region_offset,
            data_region_offset,
        };

        Ok(val)
    }
}

fn to_i64(val: u64) -> Result<i64> {
    err_at!(FailConvert, i64::try_from(val))
}

fn to_u64(val: i64) -> Result<u64> {
    err_at!(Corruption, u64::try_from(val))
}

fn to_i32(val: u64) -> Result<i32> {
    err_at!(FailConvert, i32::try_from(val))
}

fn to_usize(val: i32) -> Result<usize> {
    err_at!(Corruption, usize::try_from(val))
}

#[cfg(test)]
#[path = "metadata_test.rs"]
mod metadata_test;
