//! Module implement the read-write store.
//!
//! A thin facade for workloads that tweak side data in place: an in-memory
//! overlay of puts and removes sits over an open [Reader]. Reads consult
//! the overlay first. A flush merges the reader's entries with the overlay
//! into a fresh file, renames it over the store location and swaps in a
//! new reader. The overlay is not a log; a crash between flushes loses it.

use log::info;
use parking_lot::RwLock;

use std::{collections::BTreeMap, ffi, fs, sync::Arc};

use crate::{
    config::Config,
    store::{files, Reader, Writer},
    value::{self, Value},
    Error, Result,
};

/// Read-write store over a single store file.
#[derive(Clone)]
pub struct Store {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    config: Config,
    location: ffi::OsString,
    reader: Reader,
    // serialized key to live value bytes, or None for a pending remove.
    overlay: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    write_buffer_size: usize,
    auto_flush: bool,
    compression: bool,
    closed: bool,
}

impl Store {
    /// Open the store at `location`, building an empty file first when
    /// none exists.
    pub fn create(location: &ffi::OsStr, config: Config) -> Result<Store> {
        if !std::path::Path::new(location).exists() {
            let mut writer = Writer::create(location, config.clone())?;
            writer.close()?;
        }
        Self::open(location, config)
    }

    /// Open an existing store at `location`.
    pub fn open(location: &ffi::OsStr, config: Config) -> Result<Store> {
        let write_buffer_size = config.to_write_buffer_size()?;
        let auto_flush = config.to_auto_flush()?;
        let compression = config.to_compression()?;
        let reader = Reader::open(location, config.clone())?;

        let inner = Inner {
            config,
            location: location.to_os_string(),
            reader,
            overlay: BTreeMap::new(),
            write_buffer_size,
            auto_flush,
            compression,
            closed: false,
        };

        Ok(Store { inner: Arc::new(RwLock::new(inner)) })
    }

    /// Fetch `key`, overlay first, then the backing reader. Fails with
    /// `KeyNotFound` on a miss.
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

    /// Fetch `key`, handing back `default` on a miss.
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
        let inner = self.inner.read();
        if inner.closed {
            return err_at!(StoreClosed, msg: "get on closed store");
        }

        let serializers = inner.reader.as_serializers();
        let kb = value::serialize_key(key, serializers)?;
        let data = match inner.overlay.get(&kb) {
            Some(Some(data)) => Some(data.clone()),
            Some(None) => None,
            None => inner.reader.get_raw(&kb)?,
        };
        match data {
            Some(data) => Ok(Some(value::deserialize(&data, serializers)?)),
            None => Ok(None),
        }
    }

    /// Stage `key` into the overlay; visible to readers of this handle at
    /// once, durable after the next flush.
    pub fn put<K, V>(&self, key: K, value: V) -> Result<()>
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        let mut inner = self.inner.write();
        if inner.closed {
            return err_at!(StoreClosed, msg: "put on closed store");
        }

        let serializers = inner.reader.as_serializers().clone();
        let kb = value::serialize_key(&key.into(), &serializers)?;
        match value.into() {
            Value::Null => {
                inner.overlay.insert(kb, None);
            }
            value => {
                let data =
                    value::serialize_value(&value, &serializers, inner.compression)?;
                inner.overlay.insert(kb, Some(data));
            }
        }

        if inner.auto_flush && inner.overlay.len() >= inner.write_buffer_size {
            flush_inner(&mut inner)?;
        }
        Ok(())
    }

    /// Stage a removal of `key`.
    pub fn remove<K>(&self, key: K) -> Result<()>
    where
        K: Into<Value>,
    {
        let mut inner = self.inner.write();
        if inner.closed {
            return err_at!(StoreClosed, msg: "remove on closed store");
        }

        let serializers = inner.reader.as_serializers().clone();
        let kb = value::serialize_key(&key.into(), &serializers)?;
        inner.overlay.insert(kb, None);

        if inner.auto_flush && inner.overlay.len() >= inner.write_buffer_size {
            flush_inner(&mut inner)?;
        }
        Ok(())
    }

    /// Rebuild the store file from the reader and the overlay, atomically
    /// swap it in, and clear the overlay.
    pub fn flush(&self) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.closed {
            return err_at!(StoreClosed, msg: "flush on closed store");
        }
        flush_inner(&mut inner)
    }

    /// Flush, then hand back the last entry of the rebuilt store.
    pub fn compact(&self) -> Result<Option<(Value, Value)>> {
        let mut inner = self.inner.write();
        if inner.closed {
            return err_at!(StoreClosed, msg: "compact on closed store");
        }
        flush_inner(&mut inner)?;

        let mut last = None;
        for entry in inner.reader.iter() {
            last = Some(entry?);
        }
        Ok(last)
    }

    /// Number of pending overlay records, puts and removes alike.
    pub fn pending(&self) -> usize {
        self.inner.read().overlay.len()
    }

    /// Close the handle; pending overlay records are dropped.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.write();
        inner.closed = true;
        inner.overlay.clear();
        Ok(())
    }
}

fn flush_inner(inner: &mut Inner) -> Result<()> {
    let rebuild_loc = files::to_rebuild_location(&inner.location)?;

    let res = || -> Result<()> {
        let mut config = inner.config.clone();
        // duplicates never arise in a merge; keep the rebuild strict.
        config.set_duplicates(false);
        let mut writer = Writer::create(&rebuild_loc, config)?;

        for entry in inner.reader.iter_raw() {
            let (kb, vb) = entry?;
            if !inner.overlay.contains_key(&kb) {
                writer.put_raw(&kb, Some(&vb))?;
            }
        }
        for (kb, vb) in inner.overlay.iter() {
            if let Some(vb) = vb {
                writer.put_raw(kb, Some(vb))?;
            }
        }
        writer.close()
    }();
    if let Err(err) = res {
        fs::remove_file(&rebuild_loc).ok();
        return Err(err);
    }

    err_at!(IOError, fs::rename(&rebuild_loc, &inner.location))?;
    inner.reader = Reader::open(&inner.location, inner.config.clone())?;
    inner.overlay.clear();

    info!(
        target: "paldb",
        "flushed {:?}, {} keys", inner.location, inner.reader.size()
    );
    Ok(())
}

#[cfg(test)]
#[path = "rw_test.rs"]
mod rw_test;
