//! Slot construction for one key length.
//!
//! Replays a staged key stream, in insertion order, into an open-addressed
//! table living in a memory-mapped scratch file. A slot is
//! `[key bytes][packed offset]`, the offset area padded with zeros to the
//! sub-index's fixed width; an all-zero offset marks a vacant slot.

use std::{ffi, fs};

use crate::{
    hash,
    store::segment::SegmentsMut,
    util, varint, Error, Result,
};

// Outcome of replaying one staged record into the table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Insert {
    /// Key landed in a vacant slot.
    Fresh,
    /// Duplicate key overwritten in place, duplicates enabled.
    Overwrote,
    /// Tombstone found no live slot and was dropped.
    Dropped,
    /// Tombstone erased a previously inserted key.
    Collapsed,
}

pub struct SlotIndex {
    key_len: usize,
    slot_size: usize,
    slot_count: u64,
    // replay probes are bounded by the staged record count.
    max_probes: u64,
    segs: SegmentsMut,
    fd: fs::File,
    slot: Vec<u8>,
    collisions: u64,
}

impl SlotIndex {
    pub fn create(
        loc: &ffi::OsStr,
        key_len: usize,
        offset_len: usize,
        slot_count: u64,
        max_probes: u64,
        segment_size: u64,
    ) -> Result<SlotIndex> {
        let slot_size = key_len + offset_len;
        if (slot_size as u64) > segment_size {
            return err_at!(
                InvalidInput, msg: "slot {} exceeds segment {}", slot_size, segment_size
            );
        }

        let size = slot_count * (slot_size as u64);
        let fd = util::create_file_rw(loc)?;
        err_at!(IOError, fd.set_len(size))?;
        let segs = SegmentsMut::map(&fd, size, segment_size)?;

        Ok(SlotIndex {
            key_len,
            slot_size,
            slot_count,
            max_probes,
            segs,
            fd,
            slot: vec![0; slot_size],
            collisions: 0,
        })
    }

    /// Replay one staged record. `packed` is the record's data offset,
    /// zero for tombstones.
    pub fn insert(
        &mut self,
        key: &[u8],
        packed: u64,
        tombstone: bool,
        duplicates: bool,
    ) -> Result<Insert> {
        let h = hash::murmur3_positive(key, hash::KEY_SEED);

        for probe in 0..=self.max_probes {
            let slot = (h + probe) % self.slot_count;
            let off = slot * (self.slot_size as u64);
            self.segs.read_into(off, &mut self.slot)?;

            let (existing, _) = varint::unpack_long_at(&self.slot, self.key_len)?;
            if existing == 0 {
                // vacant; a tombstone has nothing to erase.
                if tombstone {
                    return Ok(Insert::Dropped);
                }
                self.fill_slot(key, packed)?;
                self.segs.write_at(off, &self.slot)?;
                return Ok(Insert::Fresh);
            } else if &self.slot[..self.key_len] == key {
                if tombstone {
                    // wire must stay indistinguishable from vacancy.
                    self.slot.iter_mut().for_each(|b| *b = 0);
                    self.segs.write_at(off, &self.slot)?;
                    return Ok(Insert::Collapsed);
                } else if duplicates {
                    self.fill_slot(key, packed)?;
                    self.segs.write_at(off, &self.slot)?;
                    return Ok(Insert::Overwrote);
                }
                return err_at!(DuplicateKey, msg: "key {:?}", key);
            }
            self.collisions += 1;
        }

        err_at!(Fatal, msg: "no vacancy within {} probes", self.max_probes)
    }

    fn fill_slot(&mut self, key: &[u8], packed: u64) -> Result<()> {
        self.slot.iter_mut().for_each(|b| *b = 0);
        self.slot[..self.key_len].copy_from_slice(key);
        let mut tail = &mut self.slot[self.key_len..];
        varint::pack_long(&mut tail, packed as i64)?;
        Ok(())
    }

    pub fn to_collisions(&self) -> u64 {
        self.collisions
    }

    /// Flush the mapping and hand back the sized scratch file for the
    /// merge pass.
    pub fn into_file(self) -> Result<fs::File> {
        self.segs.flush()?;
        Ok(self.fd)
    }
}
