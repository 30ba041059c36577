//! Module implement the tagged value codec.
//!
//! Every serialized value starts with a one-byte tag; decoding dispatches
//! on it. The codec is a closed union, [Value], with one escape hatch for
//! application types: [Value::Custom], resolved through the ordered
//! serializer registry, [Serializers], whose declared names persist in the
//! store's metadata.
//!
//! Wire shapes, by tag:
//!
//! ```text
//! 0  null
//! 1  true                 tag only
//! 2  false                tag only
//! 3  int -1               tag only
//! 4  int 0                tag only
//! 5  int 1                tag only
//! 6  int, 1 byte          values 2..=255
//! 7  int, 2 bytes         values 256..=65535, big-endian
//! 8  int, 3 bytes         values 65536..=16777215, big-endian
//! 9  int, 4 bytes         everything else, big-endian two's complement
//! 10 long -1              tag only
//! 11 long 0               tag only
//! 12 long 1               tag only
//! 13 long, 1 byte         values 2..=255
//! 14 long, 2 bytes        values 256..=65535, big-endian
//! 15 long, 3 bytes        values 65536..=16777215, big-endian
//! 16 long, 8 bytes        everything else, big-endian two's complement
//! 17 short                2 bytes big-endian
//! 18 byte                 1 byte
//! 19 char                 varint scalar value
//! 20 float                4 byte big-endian bits
//! 21 double               8 byte big-endian bits
//! 22 string               utf-packed
//! 23 big integer          varint length + two's complement big-endian bytes
//! 24 big decimal          4 byte scale + varint length + unscaled bytes
//! 25 class name           utf-packed
//! 26 enum                 utf-packed class + varint ordinal
//! 27 bool[]               varint count + one byte each
//! 28 byte[]               varint count + raw bytes
//! 29 short[]              varint count + 2 bytes each
//! 30 char[]               varint count + one varint each
//! 31 int[]                varint count + 4 bytes each
//! 32 long[]               varint count + 8 bytes each
//! 33 float[]              varint count + 4 bytes each
//! 34 double[]             varint count + 8 bytes each
//! 35 string[]             varint count + utf-packed each
//! 36 object[]             varint count + fully tagged elements, recursive
//! 37 custom               varint registry index + varint length + payload
//! 38 compressed           varint length + snappy block over a tagged value
//! ```

use std::{convert::TryFrom, io};

use crate::{varint, Error, Result};

const TAG_NULL: u8 = 0;
const TAG_TRUE: u8 = 1;
const TAG_FALSE: u8 = 2;
const TAG_INT_M1: u8 = 3;
const TAG_INT_0: u8 = 4;
const TAG_INT_1: u8 = 5;
const TAG_INT_8: u8 = 6;
const TAG_INT_16: u8 = 7;
const TAG_INT_24: u8 = 8;
const TAG_INT_32: u8 = 9;
const TAG_LONG_M1: u8 = 10;
const TAG_LONG_0: u8 = 11;
const TAG_LONG_1: u8 = 12;
const TAG_LONG_8: u8 = 13;
const TAG_LONG_16: u8 = 14;
const TAG_LONG_24: u8 = 15;
const TAG_LONG_64: u8 = 16;
const TAG_SHORT: u8 = 17;
const TAG_BYTE: u8 = 18;
const TAG_CHAR: u8 = 19;
const TAG_FLOAT: u8 = 20;
const TAG_DOUBLE: u8 = 21;
const TAG_STRING: u8 = 22;
const TAG_BIG_INT: u8 = 23;
const TAG_BIG_DECIMAL: u8 = 24;
const TAG_CLASS: u8 = 25;
const TAG_ENUM: u8 = 26;
const TAG_ARRAY_BOOL: u8 = 27;
const TAG_ARRAY_BYTE: u8 = 28;
const TAG_ARRAY_SHORT: u8 = 29;
const TAG_ARRAY_CHAR: u8 = 30;
const TAG_ARRAY_INT: u8 = 31;
const TAG_ARRAY_LONG: u8 = 32;
const TAG_ARRAY_FLOAT: u8 = 33;
const TAG_ARRAY_DOUBLE: u8 = 34;
const TAG_ARRAY_STRING: u8 = 35;
const TAG_ARRAY_OBJECT: u8 = 36;
const TAG_CUSTOM: u8 = 37;
const TAG_COMPRESSED: u8 = 38;

/// Closed union of every shape the store can serialize.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Short(i16),
    Byte(i8),
    Char(char),
    Float(f32),
    Double(f64),
    String(String),
    /// Two's complement big-endian bytes of an arbitrary precision integer.
    BigInt(Vec<u8>),
    /// Unscaled two's complement big-endian bytes and a base-10 scale.
    BigDecimal { scale: i32, unscaled: Vec<u8> },
    ClassName(String),
    Enum { class: String, ordinal: u32 },
    BoolArray(Vec<bool>),
    ByteArray(Vec<u8>),
    ShortArray(Vec<i16>),
    CharArray(Vec<char>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    StringArray(Vec<String>),
    /// Heterogenous and multi-dimensional arrays, elements fully tagged.
    Array(Vec<Value>),
    /// Application payload encoded by a registered serializer.
    Custom { name: String, data: Vec<u8> },
}

/// Ordered registry of application serializer identifiers. The declared
/// names persist in store metadata, in registration order, so readers
/// rehydrate the index-to-name mapping without consulting the writer's
/// configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Serializers {
    names: Vec<String>,
}

impl Serializers {
    /// Register `name`, first match wins: re-registering an existing name
    /// returns its original index.
    pub fn register(&mut self, name: &str) -> usize {
        match self.index_of(name) {
            Some(index) => index,
            None => {
                self.names.push(name.to_string());
                self.names.len() - 1
            }
        }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|n| n.as_str())
    }

    pub fn as_names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Serialize a key. Keys are stored raw in index slots and compared byte
/// for byte, hence null keys and compression are rejected outright.
pub fn serialize_key(key: &Value, serializers: &Serializers) -> Result<Vec<u8>> {
    if let Value::Null = key {
        return err_at!(InvalidInput, msg: "null key");
    }
    let mut buf = vec![];
    encode(&mut buf, key, serializers)?;
    Ok(buf)
}

/// Serialize a value. With `compress` the tagged encoding is wrapped in a
/// length-prefixed snappy frame.
pub fn serialize_value(
    value: &Value,
    serializers: &Serializers,
    compress: bool,
) -> Result<Vec<u8>> {
    let mut buf = vec![];
    encode(&mut buf, value, serializers)?;

    if compress {
        let block = err_at!(Fatal, snap::raw::Encoder::new().compress_vec(&buf))?;
        let mut framed = Vec::with_capacity(block.len() + 6);
        framed.push(TAG_COMPRESSED);
        varint::pack_int(&mut framed, block.len() as i32)?;
        framed.extend_from_slice(&block);
        Ok(framed)
    } else {
        Ok(buf)
    }
}

/// Decode one value out of `buf`, which must hold exactly one encoding.
pub fn deserialize(buf: &[u8], serializers: &Serializers) -> Result<Value> {
    let mut r: &[u8] = buf;
    let value = decode(&mut r, serializers)?;
    if !r.is_empty() {
        return err_at!(Corruption, msg: "{} trailing bytes after value", r.len());
    }
    Ok(value)
}

fn encode<W>(out: &mut W, value: &Value, serializers: &Serializers) -> Result<()>
where
    W: io::Write,
{
    match value {
        Value::Null => put(out, &[TAG_NULL]),
        Value::Bool(true) => put(out, &[TAG_TRUE]),
        Value::Bool(false) => put(out, &[TAG_FALSE]),
        Value::Int(val) => encode_int(out, *val),
        Value::Long(val) => encode_long(out, *val),
        Value::Short(val) => {
            put(out, &[TAG_SHORT])?;
            put(out, &val.to_be_bytes())
        }
        Value::Byte(val) => put(out, &[TAG_BYTE, *val as u8]),
        Value::Char(val) => {
            put(out, &[TAG_CHAR])?;
            varint::pack_int(out, *val as i32)?;
            Ok(())
        }
        Value::Float(val) => {
            put(out, &[TAG_FLOAT])?;
            put(out, &val.to_bits().to_be_bytes())
        }
        Value::Double(val) => {
            put(out, &[TAG_DOUBLE])?;
            put(out, &val.to_bits().to_be_bytes())
        }
        Value::String(val) => {
            put(out, &[TAG_STRING])?;
            varint::write_utf(out, val)
        }
        Value::BigInt(bytes) => {
            put(out, &[TAG_BIG_INT])?;
            varint::pack_int(out, bytes.len() as i32)?;
            put(out, bytes)
        }
        Value::BigDecimal { scale, unscaled } => {
            put(out, &[TAG_BIG_DECIMAL])?;
            varint::write_int(out, *scale)?;
            varint::pack_int(out, unscaled.len() as i32)?;
            put(out, unscaled)
        }
        Value::ClassName(name) => {
            put(out, &[TAG_CLASS])?;
            varint::write_utf(out, name)
        }
        Value::Enum { class, ordinal } => {
            put(out, &[TAG_ENUM])?;
            varint::write_utf(out, class)?;
            varint::pack_int(out, *ordinal as i32)?;
            Ok(())
        }
        Value::BoolArray(vals) => {
            put(out, &[TAG_ARRAY_BOOL])?;
            varint::pack_int(out, vals.len() as i32)?;
            for val in vals.iter() {
                put(out, &[*val as u8])?;
            }
            Ok(())
        }
        Value::ByteArray(bytes) => {
            put(out, &[TAG_ARRAY_BYTE])?;
            varint::pack_int(out, bytes.len() as i32)?;
            put(out, bytes)
        }
        Value::ShortArray(vals) => {
            put(out, &[TAG_ARRAY_SHORT])?;
            varint::pack_int(out, vals.len() as i32)?;
            for val in vals.iter() {
                put(out, &val.to_be_bytes())?;
            }
            Ok(())
        }
        Value::CharArray(vals) => {
            put(out, &[TAG_ARRAY_CHAR])?;
            varint::pack_int(out, vals.len() as i32)?;
            for val in vals.iter() {
                varint::pack_int(out, *val as i32)?;
            }
            Ok(())
        }
        Value::IntArray(vals) => {
            put(out, &[TAG_ARRAY_INT])?;
            varint::pack_int(out, vals.len() as i32)?;
            for val in vals.iter() {
                put(out, &val.to_be_bytes())?;
            }
            Ok(())
        }
        Value::LongArray(vals) => {
            put(out, &[TAG_ARRAY_LONG])?;
            varint::pack_int(out, vals.len() as i32)?;
            for val in vals.iter() {
                put(out, &val.to_be_bytes())?;
            }
            Ok(())
        }
        Value::FloatArray(vals) => {
            put(out, &[TAG_ARRAY_FLOAT])?;
            varint::pack_int(out, vals.len() as i32)?;
            for val in vals.iter() {
                put(out, &val.to_bits().to_be_bytes())?;
            }
            Ok(())
        }
        Value::DoubleArray(vals) => {
            put(out, &[TAG_ARRAY_DOUBLE])?;
            varint::pack_int(out, vals.len() as i32)?;
            for val in vals.iter() {
                put(out, &val.to_bits().to_be_bytes())?;
            }
            Ok(())
        }
        Value::StringArray(vals) => {
            put(out, &[TAG_ARRAY_STRING])?;
            varint::pack_int(out, vals.len() as i32)?;
            for val in vals.iter() {
                varint::write_utf(out, val)?;
            }
            Ok(())
        }
        Value::Array(vals) => match demote(vals) {
            Some(prim) => encode(out, &prim, serializers),
            None => {
                put(out, &[TAG_ARRAY_OBJECT])?;
                varint::pack_int(out, vals.len() as i32)?;
                for val in vals.iter() {
                    encode(out, val, serializers)?;
                }
                Ok(())
            }
        },
        Value::Custom { name, data } => match serializers.index_of(name) {
            Some(index) => {
                put(out, &[TAG_CUSTOM])?;
                varint::pack_int(out, index as i32)?;
                varint::pack_int(out, data.len() as i32)?;
                put(out, data)
            }
            None => err_at!(UnsupportedType, msg: "no serializer for {:?}", name),
        },
    }
}

fn put<W>(out: &mut W, bytes: &[u8]) -> Result<()>
where
    W: io::Write,
{
    err_at!(IOError, out.write_all(bytes))
}

// narrowest lossless width; negatives other than -1 take the full form.
fn encode_int<W>(out: &mut W, val: i32) -> Result<()>
where
    W: io::Write,
{
    match val {
        -1 => put(out, &[TAG_INT_M1]),
        0 => put(out, &[TAG_INT_0]),
        1 => put(out, &[TAG_INT_1]),
        2..=0xff => put(out, &[TAG_INT_8, val as u8]),
        0x100..=0xffff => {
            let b = val.to_be_bytes();
            put(out, &[TAG_INT_16, b[2], b[3]])
        }
        0x1_0000..=0xff_ffff => {
            let b = val.to_be_bytes();
            put(out, &[TAG_INT_24, b[1], b[2], b[3]])
        }
        _ => {
            put(out, &[TAG_INT_32])?;
            put(out, &val.to_be_bytes())
        }
    }
}

fn encode_long<W>(out: &mut W, val: i64) -> Result<()>
where
    W: io::Write,
{
    match val {
        -1 => put(out, &[TAG_LONG_M1]),
        0 => put(out, &[TAG_LONG_0]),
        1 => put(out, &[TAG_LONG_1]),
        2..=0xff => put(out, &[TAG_LONG_8, val as u8]),
        0x100..=0xffff => {
            let b = val.to_be_bytes();
            put(out, &[TAG_LONG_16, b[6], b[7]])
        }
        0x1_0000..=0xff_ffff => {
            let b = val.to_be_bytes();
            put(out, &[TAG_LONG_24, b[5], b[6], b[7]])
        }
        _ => {
            put(out, &[TAG_LONG_64])?;
            put(out, &val.to_be_bytes())
        }
    }
}

// Boxed arrays of one primitive shape collapse to the typed wire form,
// null elements replaced by the type's zero.
fn demote(vals: &[Value]) -> Option<Value> {
    use Value::*;

    let shape = vals.iter().find_map(|v| match v {
        Null => None,
        v => Some(std::mem::discriminant(v)),
    })?;
    let uniform = vals
        .iter()
        .all(|v| matches!(v, Null) || std::mem::discriminant(v) == shape);
    if !uniform {
        return None;
    }

    match vals.iter().find(|v| !matches!(v, Null))? {
        Bool(_) => Some(BoolArray(
            vals.iter()
                .map(|v| match v {
                    Bool(b) => *b,
                    _ => false,
                })
                .collect(),
        )),
        Byte(_) => Some(ByteArray(
            vals.iter()
                .map(|v| match v {
                    Byte(b) => *b as u8,
                    _ => 0,
                })
                .collect(),
        )),
        Short(_) => Some(ShortArray(
            vals.iter()
                .map(|v| match v {
                    Short(s) => *s,
                    _ => 0,
                })
                .collect(),
        )),
        Char(_) => Some(CharArray(
            vals.iter()
                .map(|v| match v {
                    Char(c) => *c,
                    _ => '\0',
                })
                .collect(),
        )),
        Int(_) => Some(IntArray(
            vals.iter()
                .map(|v| match v {
                    Int(i) => *i,
                    _ => 0,
                })
                .collect(),
        )),
        Long(_) => Some(LongArray(
            vals.iter()
                .map(|v| match v {
                    Long(l) => *l,
                    _ => 0,
                })
                .collect(),
        )),
        Float(_) => Some(FloatArray(
            vals.iter()
                .map(|v| match v {
                    Float(f) => *f,
                    _ => 0.0,
                })
                .collect(),
        )),
        Double(_) => Some(DoubleArray(
            vals.iter()
                .map(|v| match v {
                    Double(d) => *d,
                    _ => 0.0,
                })
                .collect(),
        )),
        // strings are not primitive; nulls keep the array heterogenous.
        String(_) if vals.iter().all(|v| !matches!(v, Null)) => Some(StringArray(
            vals.iter()
                .map(|v| match v {
                    String(s) => s.clone(),
                    _ => unreachable!(),
                })
                .collect(),
        )),
        _ => None,
    }
}

fn decode(r: &mut &[u8], serializers: &Serializers) -> Result<Value> {
    let tag = take(r, 1)?[0];
    let value = match tag {
        TAG_NULL => Value::Null,
        TAG_TRUE => Value::Bool(true),
        TAG_FALSE => Value::Bool(false),
        TAG_INT_M1 => Value::Int(-1),
        TAG_INT_0 => Value::Int(0),
        TAG_INT_1 => Value::Int(1),
        TAG_INT_8 => Value::Int(take(r, 1)?[0] as i32),
        TAG_INT_16 => {
            let b = take(r, 2)?;
            Value::Int(((b[0] as i32) << 8) | (b[1] as i32))
        }
        TAG_INT_24 => {
            let b = take(r, 3)?;
            Value::Int(((b[0] as i32) << 16) | ((b[1] as i32) << 8) | (b[2] as i32))
        }
        TAG_INT_32 => Value::Int(varint::read_int(r)?),
        TAG_LONG_M1 => Value::Long(-1),
        TAG_LONG_0 => Value::Long(0),
        TAG_LONG_1 => Value::Long(1),
        TAG_LONG_8 => Value::Long(take(r, 1)?[0] as i64),
        TAG_LONG_16 => {
            let b = take(r, 2)?;
            Value::Long(((b[0] as i64) << 8) | (b[1] as i64))
        }
        TAG_LONG_24 => {
            let b = take(r, 3)?;
            Value::Long(((b[0] as i64) << 16) | ((b[1] as i64) << 8) | (b[2] as i64))
        }
        TAG_LONG_64 => Value::Long(varint::read_long(r)?),
        TAG_SHORT => {
            let b = take(r, 2)?;
            Value::Short(i16::from_be_bytes([b[0], b[1]]))
        }
        TAG_BYTE => Value::Byte(take(r, 1)?[0] as i8),
        TAG_CHAR => {
            let scalar = varint::unpack_int(r)? as u32;
            match char::try_from(scalar) {
                Ok(c) => Value::Char(c),
                Err(_) => return err_at!(Corruption, msg: "bad char {}", scalar),
            }
        }
        TAG_FLOAT => {
            let b = take(r, 4)?;
            Value::Float(f32::from_bits(u32::from_be_bytes([b[0], b[1], b[2], b[3]])))
        }
        TAG_DOUBLE => {
            let b = take(r, 8)?;
            let bits = u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]);
            Value::Double(f64::from_bits(bits))
        }
        TAG_STRING => Value::String(varint::read_utf(r)?),
        TAG_BIG_INT => {
            let n = count(r, varint::unpack_int(r)?)?;
            Value::BigInt(take(r, n)?.to_vec())
        }
        TAG_BIG_DECIMAL => {
            let scale = varint::read_int(r)?;
            let n = count(r, varint::unpack_int(r)?)?;
            Value::BigDecimal { scale, unscaled: take(r, n)?.to_vec() }
        }
        TAG_CLASS => Value::ClassName(varint::read_utf(r)?),
        TAG_ENUM => {
            let class = varint::read_utf(r)?;
            let ordinal = varint::unpack_int(r)? as u32;
            Value::Enum { class, ordinal }
        }
        TAG_ARRAY_BOOL => {
            let n = count(r, varint::unpack_int(r)?)?;
            let mut vals = Vec::with_capacity(n);
            for _ in 0..n {
                vals.push(take(r, 1)?[0] != 0);
            }
            Value::BoolArray(vals)
        }
        TAG_ARRAY_BYTE => {
            let n = count(r, varint::unpack_int(r)?)?;
            Value::ByteArray(take(r, n)?.to_vec())
        }
        TAG_ARRAY_SHORT => {
            let n = count(r, varint::unpack_int(r)?)?;
            let mut vals = Vec::with_capacity(n);
            for _ in 0..n {
                let b = take(r, 2)?;
                vals.push(i16::from_be_bytes([b[0], b[1]]));
            }
            Value::ShortArray(vals)
        }
        TAG_ARRAY_CHAR => {
            let n = count(r, varint::unpack_int(r)?)?;
            let mut vals = Vec::with_capacity(n);
            for _ in 0..n {
                let scalar = varint::unpack_int(r)? as u32;
                match char::try_from(scalar) {
                    Ok(c) => vals.push(c),
                    Err(_) => return err_at!(Corruption, msg: "bad char {}", scalar),
                }
            }
            Value::CharArray(vals)
        }
        TAG_ARRAY_INT => {
            let n = count(r, varint::unpack_int(r)?)?;
            let mut vals = Vec::with_capacity(n);
            for _ in 0..n {
                vals.push(varint::read_int(r)?);
            }
            Value::IntArray(vals)
        }
        TAG_ARRAY_LONG => {
            let n = count(r, varint::unpack_int(r)?)?;
            let mut vals = Vec::with_capacity(n);
            for _ in 0..n {
                vals.push(varint::read_long(r)?);
            }
            Value::LongArray(vals)
        }
        TAG_ARRAY_FLOAT => {
            let n = count(r, varint::unpack_int(r)?)?;
            let mut vals = Vec::with_capacity(n);
            for _ in 0..n {
                let b = take(r, 4)?;
                let bits = u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
                vals.push(f32::from_bits(bits));
            }
            Value::FloatArray(vals)
        }
        TAG_ARRAY_DOUBLE => {
            let n = count(r, varint::unpack_int(r)?)?;
            let mut vals = Vec::with_capacity(n);
            for _ in 0..n {
                let b = take(r, 8)?;
                let bits =
                    u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]);
                vals.push(f64::from_bits(bits));
            }
            Value::DoubleArray(vals)
        }
        TAG_ARRAY_STRING => {
            let n = count(r, varint::unpack_int(r)?)?;
            let mut vals = Vec::with_capacity(n);
            for _ in 0..n {
                vals.push(varint::read_utf(r)?);
            }
            Value::StringArray(vals)
        }
        TAG_ARRAY_OBJECT => {
            let n = count(r, varint::unpack_int(r)?)?;
            let mut vals = Vec::with_capacity(n);
            for _ in 0..n {
                vals.push(decode(r, serializers)?);
            }
            Value::Array(vals)
        }
        TAG_CUSTOM => {
            let index = varint::unpack_int(r)? as usize;
            let n = count(r, varint::unpack_int(r)?)?;
            let data = take(r, n)?.to_vec();
            match serializers.name_of(index) {
                Some(name) => Value::Custom { name: name.to_string(), data },
                None => {
                    return err_at!(Corruption, msg: "serializer index {}", index)
                }
            }
        }
        TAG_COMPRESSED => {
            let n = count(r, varint::unpack_int(r)?)?;
            let block = take(r, n)?;
            let buf = err_at!(Corruption, snap::raw::Decoder::new().decompress_vec(block))?;
            let mut inner: &[u8] = &buf;
            let value = decode(&mut inner, serializers)?;
            if !inner.is_empty() {
                return err_at!(Corruption, msg: "trailing bytes in frame");
            }
            value
        }
        tag => return err_at!(Corruption, msg: "unknown tag {}", tag),
    };
    Ok(value)
}

fn take<'a>(r: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    if r.len() < n {
        return err_at!(Corruption, msg: "unexpected end of stream {}/{}", r.len(), n);
    }
    let (head, tail) = r.split_at(n);
    *r = tail;
    Ok(head)
}

// every element costs at least one byte, so a count beyond the remaining
// input is corrupt; checked before sizing buffers off wire data.
fn count(r: &[u8], n: i32) -> Result<usize> {
    let n = n as usize;
    if n > r.len() {
        return err_at!(Corruption, msg: "count {} exceeds input {}", n, r.len());
    }
    Ok(n)
}

impl From<bool> for Value {
    fn from(val: bool) -> Value {
        Value::Bool(val)
    }
}

impl From<i32> for Value {
    fn from(val: i32) -> Value {
        Value::Int(val)
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Value {
        Value::Long(val)
    }
}

impl From<i16> for Value {
    fn from(val: i16) -> Value {
        Value::Short(val)
    }
}

impl From<i8> for Value {
    fn from(val: i8) -> Value {
        Value::Byte(val)
    }
}

impl From<char> for Value {
    fn from(val: char) -> Value {
        Value::Char(val)
    }
}

impl From<f32> for Value {
    fn from(val: f32) -> Value {
        Value::Float(val)
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Value {
        Value::Double(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Value {
        Value::String(val.to_string())
    }
}

impl From<String> for Value {
    fn from(val: String) -> Value {
        Value::String(val)
    }
}

impl From<Vec<u8>> for Value {
    fn from(val: Vec<u8>) -> Value {
        Value::ByteArray(val)
    }
}

impl From<Vec<i32>> for Value {
    fn from(val: Vec<i32>) -> Value {
        Value::IntArray(val)
    }
}

impl From<Vec<i64>> for Value {
    fn from(val: Vec<i64>) -> Value {
        Value::LongArray(val)
    }
}

impl From<Vec<String>> for Value {
    fn from(val: Vec<String>) -> Value {
        Value::StringArray(val)
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(val: Value) -> Result<bool> {
        match val {
            Value::Bool(val) => Ok(val),
            val => err_at!(FailConvert, msg: "not a bool {:?}", val),
        }
    }
}

impl TryFrom<Value> for i32 {
    type Error = Error;

    fn try_from(val: Value) -> Result<i32> {
        match val {
            Value::Int(val) => Ok(val),
            val => err_at!(FailConvert, msg: "not an int {:?}", val),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(val: Value) -> Result<i64> {
        match val {
            Value::Long(val) => Ok(val),
            val => err_at!(FailConvert, msg: "not a long {:?}", val),
        }
    }
}

impl TryFrom<Value> for i16 {
    type Error = Error;

    fn try_from(val: Value) -> Result<i16> {
        match val {
            Value::Short(val) => Ok(val),
            val => err_at!(FailConvert, msg: "not a short {:?}", val),
        }
    }
}

impl TryFrom<Value> for i8 {
    type Error = Error;

    fn try_from(val: Value) -> Result<i8> {
        match val {
            Value::Byte(val) => Ok(val),
            val => err_at!(FailConvert, msg: "not a byte {:?}", val),
        }
    }
}

impl TryFrom<Value> for char {
    type Error = Error;

    fn try_from(val: Value) -> Result<char> {
        match val {
            Value::Char(val) => Ok(val),
            val => err_at!(FailConvert, msg: "not a char {:?}", val),
        }
    }
}

impl TryFrom<Value> for f32 {
    type Error = Error;

    fn try_from(val: Value) -> Result<f32> {
        match val {
            Value::Float(val) => Ok(val),
            val => err_at!(FailConvert, msg: "not a float {:?}", val),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(val: Value) -> Result<f64> {
        match val {
            Value::Double(val) => Ok(val),
            val => err_at!(FailConvert, msg: "not a double {:?}", val),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(val: Value) -> Result<String> {
        match val {
            Value::String(val) => Ok(val),
            val => err_at!(FailConvert, msg: "not a string {:?}", val),
        }
    }
}

impl TryFrom<Value> for Vec<u8> {
    type Error = Error;

    fn try_from(val: Value) -> Result<Vec<u8>> {
        match val {
            Value::ByteArray(val) => Ok(val),
            val => err_at!(FailConvert, msg: "not a byte array {:?}", val),
        }
    }
}

impl TryFrom<Value> for Vec<i32> {
    type Error = Error;

    fn try_from(val: Value) -> Result<Vec<i32>> {
        match val {
            Value::IntArray(val) => Ok(val),
            val => err_at!(FailConvert, msg: "not an int array {:?}", val),
        }
    }
}

impl TryFrom<Value> for Vec<i64> {
    type Error = Error;

    fn try_from(val: Value) -> Result<Vec<i64>> {
        match val {
            Value::LongArray(val) => Ok(val),
            val => err_at!(FailConvert, msg: "not a long array {:?}", val),
        }
    }
}

impl TryFrom<Value> for Vec<String> {
    type Error = Error;

    fn try_from(val: Value) -> Result<Vec<String>> {
        match val {
            Value::StringArray(val) => Ok(val),
            val => err_at!(FailConvert, msg: "not a string array {:?}", val),
        }
    }
}

#[cfg(test)]
#[path = "value_test.rs"]
mod value_test;
