//! Module implement segmented memory-mapped regions.
//!
//! A file is mapped as a chain of fixed-size segments so that stores larger
//! than a single mapping limit stay addressable. Reads and writes that
//! straddle a segment boundary are stitched through a caller supplied
//! scratch buffer; reads within one segment borrow straight out of the map.

use std::{cmp, convert::TryFrom, fs};

use crate::{Error, Result};

/// Immutable chain of mapped segments over a store file.
pub struct Segments {
    maps: Vec<memmap2::Mmap>,
    segment_size: u64,
    len: u64,
}

impl Segments {
    /// Map the first `len` bytes of `fd` in segments of `segment_size`.
    pub fn map(fd: &fs::File, len: u64, segment_size: u64) -> Result<Segments> {
        if segment_size == 0 {
            return err_at!(InvalidInput, msg: "segment size 0");
        }

        let mut maps = vec![];
        let mut off = 0;
        while off < len {
            let n = usize::try_from(cmp::min(segment_size, len - off)).unwrap();
            let map = {
                let mut opts = memmap2::MmapOptions::new();
                err_at!(IOError, unsafe { opts.offset(off).len(n).map(fd) })?
            };
            maps.push(map);
            off += n as u64;
        }

        Ok(Segments { maps, segment_size, len })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fill the whole of `buf` starting at `off`, stitching across
    /// segment boundaries.
    pub fn read_into(&self, off: u64, buf: &mut [u8]) -> Result<()> {
        if off + (buf.len() as u64) > self.len {
            return err_at!(
                Corruption, msg: "read {}+{} beyond {}", off, buf.len(), self.len
            );
        }

        let mut seg = usize::try_from(off / self.segment_size).unwrap();
        let mut soff = usize::try_from(off % self.segment_size).unwrap();
        let mut done = 0;
        while done < buf.len() {
            let map = &self.maps[seg];
            let n = cmp::min(buf.len() - done, map.len() - soff);
            buf[done..done + n].copy_from_slice(&map[soff..soff + n]);
            done += n;
            seg += 1;
            soff = 0;
        }
        Ok(())
    }

    /// Read `n` bytes at `off`. Borrows out of the mapping when the span
    /// stays within one segment, copies into `scratch` otherwise.
    pub fn read<'a>(&'a self, off: u64, n: usize, scratch: &'a mut Vec<u8>) -> Result<&'a [u8]> {
        let soff = usize::try_from(off % self.segment_size).unwrap();
        let seg = usize::try_from(off / self.segment_size).unwrap();

        match self.maps.get(seg) {
            Some(map) if soff + n <= map.len() => Ok(&map[soff..soff + n]),
            _ => {
                scratch.resize(n, 0);
                self.read_into(off, scratch)?;
                Ok(scratch)
            }
        }
    }
}

/// Mutable chain of mapped segments, used while building slot indexes in
/// scratch files.
pub struct SegmentsMut {
    maps: Vec<memmap2::MmapMut>,
    segment_size: u64,
    len: u64,
}

impl SegmentsMut {
    /// Map `len` bytes of `fd` for writing. The file must already be sized.
    pub fn map(fd: &fs::File, len: u64, segment_size: u64) -> Result<SegmentsMut> {
        if segment_size == 0 {
            return err_at!(InvalidInput, msg: "segment size 0");
        }

        let mut maps = vec![];
        let mut off = 0;
        while off < len {
            let n = usize::try_from(cmp::min(segment_size, len - off)).unwrap();
            let map = {
                let mut opts = memmap2::MmapOptions::new();
                err_at!(IOError, unsafe { opts.offset(off).len(n).map_mut(fd) })?
            };
            maps.push(map);
            off += n as u64;
        }

        Ok(SegmentsMut { maps, segment_size, len })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn read_into(&self, off: u64, buf: &mut [u8]) -> Result<()> {
        if off + (buf.len() as u64) > self.len {
            return err_at!(
                Corruption, msg: "read {}+{} beyond {}", off, buf.len(), self.len
            );
        }

        let mut seg = usize::try_from(off / self.segment_size).unwrap();
        let mut soff = usize::try_from(off % self.segment_size).unwrap();
        let mut done = 0;
        while done < buf.len() {
            let map = &self.maps[seg];
            let n = cmp::min(buf.len() - done, map.len() - soff);
            buf[done..done + n].copy_from_slice(&map[soff..soff + n]);
            done += n;
            seg += 1;
            soff = 0;
        }
        Ok(())
    }

    /// Write the whole of `buf` at `off`, stitching across boundaries.
    pub fn write_at(&mut self, off: u64, buf: &[u8]) -> Result<()> {
        if off + (buf.len() as u64) > self.len {
            return err_at!(
                Fatal, msg: "write {}+{} beyond {}", off, buf.len(), self.len
            );
        }

        let mut seg = usize::try_from(off / self.segment_size).unwrap();
        let mut soff = usize::try_from(off % self.segment_size).unwrap();
        let mut done = 0;
        while done < buf.len() {
            let map = &mut self.maps[seg];
            let n = cmp::min(buf.len() - done, map.len() - soff);
            map[soff..soff + n].copy_from_slice(&buf[done..done + n]);
            done += n;
            seg += 1;
            soff = 0;
        }
        Ok(())
    }

    /// Flush dirty pages back to the file.
    pub fn flush(&self) -> Result<()> {
        for map in self.maps.iter() {
            err_at!(IOError, map.flush())?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "segment_test.rs"]
mod segment_test;
