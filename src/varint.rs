//! Module implement the bit/byte codec used across the store.
//!
//! Non-negative integers are packed 7 bits to a byte, continuation bit set
//! on all but the last byte; ints take 1-5 bytes, longs 1-10 bytes. Strings
//! are packed as a varint count of UTF-16 code units followed by one varint
//! per code unit, which keeps the wire self-delimiting and cheap for ascii.
//! Fixed width integers are big-endian.

use std::io;

use crate::{Error, Result};

/// Pack a non-negative int, return the number of bytes written.
pub fn pack_int<W>(out: &mut W, val: i32) -> Result<usize>
where
    W: io::Write,
{
    if val < 0 {
        return err_at!(InvalidInput, msg: "pack_int on negative {}", val);
    }
    pack(out, val as u64)
}

/// Pack a non-negative long, return the number of bytes written.
pub fn pack_long<W>(out: &mut W, val: i64) -> Result<usize>
where
    W: io::Write,
{
    if val < 0 {
        return err_at!(InvalidInput, msg: "pack_long on negative {}", val);
    }
    pack(out, val as u64)
}

fn pack<W>(out: &mut W, mut val: u64) -> Result<usize>
where
    W: io::Write,
{
    let mut n = 0;
    loop {
        let byte = (val & 0x7f) as u8;
        val >>= 7;
        n += 1;
        if val == 0 {
            err_at!(IOError, out.write_all(&[byte]))?;
            break Ok(n);
        }
        err_at!(IOError, out.write_all(&[byte | 0x80]))?;
    }
}

/// Number of bytes [pack_long] shall take for `val`.
pub fn packed_len_long(val: i64) -> usize {
    let mut val = val as u64;
    let mut n = 1;
    while val >= 0x80 {
        val >>= 7;
        n += 1;
    }
    n
}

/// Mirror of [pack_int]. Fails with `Corruption` when no terminating byte
/// is found within 5 bytes.
pub fn unpack_int<R>(r: &mut R) -> Result<i32>
where
    R: io::Read,
{
    let val = unpack(r, 5)?;
    if val > (i32::MAX as u64) {
        err_at!(Corruption, msg: "unpack_int overflow {}", val)
    } else {
        Ok(val as i32)
    }
}

/// Mirror of [pack_long]. Fails with `Corruption` when no terminating byte
/// is found within 10 bytes.
pub fn unpack_long<R>(r: &mut R) -> Result<i64>
where
    R: io::Read,
{
    let val = unpack(r, 10)?;
    if val > (i64::MAX as u64) {
        err_at!(Corruption, msg: "unpack_long overflow {}", val)
    } else {
        Ok(val as i64)
    }
}

fn unpack<R>(r: &mut R, limit: usize) -> Result<u64>
where
    R: io::Read,
{
    let mut val = 0_u64;
    for i in 0..limit {
        let mut byte = [0_u8; 1];
        read_exact(r, &mut byte)?;
        val |= ((byte[0] & 0x7f) as u64) << (7 * i);
        if byte[0] & 0x80 == 0 {
            return Ok(val);
        }
    }
    err_at!(Corruption, msg: "varint exceeds {} bytes", limit)
}

// end-of-stream while decoding is a corrupt wire, not an I/O failure.
fn read_exact<R>(r: &mut R, buf: &mut [u8]) -> Result<()>
where
    R: io::Read,
{
    match r.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
            err_at!(Corruption, msg: "unexpected end of stream")
        }
        err => err_at!(IOError, err),
    }
}

/// Unpack a long straight out of `buf` at `off`. Return the value and the
/// offset one past its last byte.
pub fn unpack_long_at(buf: &[u8], off: usize) -> Result<(i64, usize)> {
    let mut val = 0_u64;
    for i in 0..10 {
        let byte = match buf.get(off + i) {
            Some(byte) => *byte,
            None => return err_at!(Corruption, msg: "varint past end of buffer"),
        };
        val |= ((byte & 0x7f) as u64) << (7 * i);
        if byte & 0x80 == 0 {
            if val > (i64::MAX as u64) {
                return err_at!(Corruption, msg: "varint overflow {}", val);
            }
            return Ok((val as i64, off + i + 1));
        }
    }
    err_at!(Corruption, msg: "varint exceeds 10 bytes")
}

/// Fixed-width big-endian int32.
pub fn write_int<W>(out: &mut W, val: i32) -> Result<()>
where
    W: io::Write,
{
    err_at!(IOError, out.write_all(&val.to_be_bytes()))
}

/// Fixed-width big-endian int64.
pub fn write_long<W>(out: &mut W, val: i64) -> Result<()>
where
    W: io::Write,
{
    err_at!(IOError, out.write_all(&val.to_be_bytes()))
}

pub fn read_int<R>(r: &mut R) -> Result<i32>
where
    R: io::Read,
{
    let mut buf = [0_u8; 4];
    read_exact(r, &mut buf)?;
    Ok(i32::from_be_bytes(buf))
}

pub fn read_long<R>(r: &mut R) -> Result<i64>
where
    R: io::Read,
{
    let mut buf = [0_u8; 8];
    read_exact(r, &mut buf)?;
    Ok(i64::from_be_bytes(buf))
}

/// Write `s` as a varint count of UTF-16 code units followed by one varint
/// per code unit. Note that the wire is not modified UTF-8.
pub fn write_utf<W>(out: &mut W, s: &str) -> Result<()>
where
    W: io::Write,
{
    let units: Vec<u16> = s.encode_utf16().collect();
    pack_int(out, units.len() as i32)?;
    for unit in units.into_iter() {
        pack_int(out, unit as i32)?;
    }
    Ok(())
}

/// Mirror of [write_utf].
pub fn read_utf<R>(r: &mut R) -> Result<String>
where
    R: io::Read,
{
    let count = unpack_int(r)?;
    let mut units = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let unit = unpack_int(r)?;
        if unit > 0xffff {
            return err_at!(Corruption, msg: "utf code unit {} out of range", unit);
        }
        units.push(unit as u16);
    }
    err_at!(Corruption, String::from_utf16(&units))
}

#[cfg(test)]
#[path = "varint_test.rs"]
mod varint_test;
