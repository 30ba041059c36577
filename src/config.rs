//! Module implement the store configuration.
//!
//! Configuration is a map of recognized string keys with typed accessors,
//! plus the custom serializer registry as an explicit field; there is no
//! process-global state. Use the `set_*` methods to tune parameters before
//! handing the configuration to a writer, reader or read-write store.

use std::collections::BTreeMap;

use crate::{value::Serializers, Error, Result};

/// Size of each mapped segment, in bytes.
pub const MMAP_SEGMENT_SIZE: &str = "mmap.segment.size";
/// Whether the data region is memory-mapped; positional reads otherwise.
pub const MMAP_DATA_ENABLED: &str = "mmap.data.enabled";
/// Index slot density, must fall in (0, 1).
pub const LOAD_FACTOR: &str = "load.factor";
/// Block-compress values on write.
pub const COMPRESSION_ENABLED: &str = "compression.enabled";
/// Embed a bloom filter in metadata.
pub const BLOOM_FILTER_ENABLED: &str = "bloom.filter.enabled";
/// Bloom filter target false-positive rate.
pub const BLOOM_FILTER_ERROR_FACTOR: &str = "bloom.filter.error.factor";
/// Last-write-wins instead of failing on duplicate keys.
pub const DUPLICATES_ENABLED: &str = "duplicates.enabled";
/// Overlay size that triggers a read-write store flush.
pub const WRITE_BUFFER_SIZE: &str = "write.buffer.size";
/// Rebuild the read-write store automatically once the overlay fills.
pub const WRITE_AUTO_FLUSH_ENABLED: &str = "write.auto.flush.enabled";

pub const DEFAULT_SEGMENT_SIZE: u64 = 1024 * 1024 * 1024;
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;
pub const DEFAULT_BLOOM_ERROR_FACTOR: f64 = 0.01;
pub const DEFAULT_WRITE_BUFFER_SIZE: usize = 100_000;

/// Configuration for building and opening store files.
#[derive(Clone, Debug, Default)]
pub struct Config {
    props: BTreeMap<String, String>,
    /// Registered application serializers, persisted with every store
    /// built from this configuration.
    pub serializers: Serializers,
}

impl Config {
    /// Create a configuration carrying the default for every key.
    pub fn new() -> Config {
        Config::default()
    }

    /// Set a raw property. Typed `set_*` variants below are preferred.
    pub fn set(&mut self, key: &str, value: &str) -> &mut Self {
        self.props.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(|v| v.as_str())
    }

    /// Configure the mapped segment size, in bytes.
    pub fn set_segment_size(&mut self, size: u64) -> &mut Self {
        self.set(MMAP_SEGMENT_SIZE, &size.to_string())
    }

    /// Map the data region (default), or fall back to positional reads.
    pub fn set_mmap_data(&mut self, enabled: bool) -> &mut Self {
        self.set(MMAP_DATA_ENABLED, &enabled.to_string())
    }

    /// Configure index slot density.
    pub fn set_load_factor(&mut self, load_factor: f64) -> &mut Self {
        self.set(LOAD_FACTOR, &load_factor.to_string())
    }

    /// Enable per-value block compression.
    pub fn set_compression(&mut self, enabled: bool) -> &mut Self {
        self.set(COMPRESSION_ENABLED, &enabled.to_string())
    }

    /// Embed a bloom filter, at `error_factor` target false-positive rate.
    pub fn set_bloom_filter(&mut self, enabled: bool, error_factor: f64) -> &mut Self {
        self.set(BLOOM_FILTER_ENABLED, &enabled.to_string());
        self.set(BLOOM_FILTER_ERROR_FACTOR, &error_factor.to_string())
    }

    /// Allow duplicate keys, resolving them last-write-wins.
    pub fn set_duplicates(&mut self, enabled: bool) -> &mut Self {
        self.set(DUPLICATES_ENABLED, &enabled.to_string())
    }

    /// Configure the read-write overlay flush trigger.
    pub fn set_write_buffer_size(&mut self, size: usize) -> &mut Self {
        self.set(WRITE_BUFFER_SIZE, &size.to_string())
    }

    pub fn set_auto_flush(&mut self, enabled: bool) -> &mut Self {
        self.set(WRITE_AUTO_FLUSH_ENABLED, &enabled.to_string())
    }

    /// Register an application serializer under its declared identifier.
    /// Returns the registry index the wire shall carry.
    pub fn register_serializer(&mut self, name: &str) -> usize {
        self.serializers.register(name)
    }
}

impl Config {
    pub fn to_segment_size(&self) -> Result<u64> {
        let size = self.parse(MMAP_SEGMENT_SIZE, DEFAULT_SEGMENT_SIZE)?;
        if size == 0 {
            return err_at!(InvalidInput, msg: "segment size 0");
        }
        Ok(size)
    }

    pub fn to_mmap_data(&self) -> Result<bool> {
        self.parse(MMAP_DATA_ENABLED, true)
    }

    pub fn to_load_factor(&self) -> Result<f64> {
        let load_factor: f64 = self.parse(LOAD_FACTOR, DEFAULT_LOAD_FACTOR)?;
        if load_factor <= 0.0 || load_factor >= 1.0 {
            return err_at!(InvalidInput, msg: "load factor {}", load_factor);
        }
        Ok(load_factor)
    }

    pub fn to_compression(&self) -> Result<bool> {
        self.parse(COMPRESSION_ENABLED, false)
    }

    pub fn to_bloom_filter(&self) -> Result<bool> {
        self.parse(BLOOM_FILTER_ENABLED, false)
    }

    pub fn to_bloom_error_factor(&self) -> Result<f64> {
        let p: f64 = self.parse(BLOOM_FILTER_ERROR_FACTOR, DEFAULT_BLOOM_ERROR_FACTOR)?;
        if p <= 0.0 || p >= 1.0 {
            return err_at!(InvalidInput, msg: "bloom error factor {}", p);
        }
        Ok(p)
    }

    pub fn to_duplicates(&self) -> Result<bool> {
        self.parse(DUPLICATES_ENABLED, false)
    }

    pub fn to_write_buffer_size(&self) -> Result<usize> {
        self.parse(WRITE_BUFFER_SIZE, DEFAULT_WRITE_BUFFER_SIZE)
    }

    pub fn to_auto_flush(&self) -> Result<bool> {
        self.parse(WRITE_AUTO_FLUSH_ENABLED, true)
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr,
        <T as std::str::FromStr>::Err: std::fmt::Display,
    {
        match self.props.get(key) {
            Some(val) => err_at!(InvalidInput, val.parse(), "key {}", key),
            None => Ok(default),
        }
    }
}

impl<'a> arbitrary::Arbitrary<'a> for Config {
    fn arbitrary(u: &mut arbitrary::Unstructured) -> arbitrary::Result<Self> {
        let mut config = Config::new();
        config.set_segment_size(*u.choose(&[4096, 65_536, 1 << 20])?);
        config.set_mmap_data(u.arbitrary()?);
        config.set_load_factor(*u.choose(&[0.5, 0.75, 0.9])?);
        config.set_compression(u.arbitrary()?);
        config.set_bloom_filter(u.arbitrary()?, 0.01);
        config.set_duplicates(u.arbitrary()?);
        Ok(config)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
