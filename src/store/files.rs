//! Scratch files and their naming.
//!
//! A build stages everything in a hidden scratch directory next to the
//! output file; the directory name carries a uuid so concurrent builds of
//! different stores never collide. Per key-length the scratch directory
//! holds a `keys` stream, a `data` stream and a `slots` file.

use uuid::Uuid;

use std::{ffi, path};

use crate::{Error, Result};

/// Compose the scratch directory path for a build of `location`.
pub fn to_scratch_dir(location: &ffi::OsStr) -> Result<ffi::OsString> {
    let (dir, name) = split_location(location)?;
    let scratch = format!(".{}-build-{}", name, Uuid::new_v4());
    let loc: path::PathBuf = [dir, scratch.into()].iter().collect();
    Ok(loc.into_os_string())
}

/// Compose the rebuild target used by the read-write store while flushing;
/// the finished file is renamed over `location`.
pub fn to_rebuild_location(location: &ffi::OsStr) -> Result<ffi::OsString> {
    let (dir, name) = split_location(location)?;
    let rebuild = format!(".{}-rebuild-{}", name, Uuid::new_v4());
    let loc: path::PathBuf = [dir, rebuild.into()].iter().collect();
    Ok(loc.into_os_string())
}

/// Temp stream of key records for key-length `n`.
pub fn to_keys_location(scratch_dir: &ffi::OsStr, n: usize) -> ffi::OsString {
    let file: ffi::OsString = format!("keys-{}.tmp", n).into();
    let loc: path::PathBuf = [scratch_dir.to_os_string(), file].iter().collect();
    loc.into_os_string()
}

/// Temp stream of value records for key-length `n`.
pub fn to_data_location(scratch_dir: &ffi::OsStr, n: usize) -> ffi::OsString {
    let file: ffi::OsString = format!("data-{}.tmp", n).into();
    let loc: path::PathBuf = [scratch_dir.to_os_string(), file].iter().collect();
    loc.into_os_string()
}

/// Memory-mapped slot scratch file for key-length `n`.
pub fn to_slots_location(scratch_dir: &ffi::OsStr, n: usize) -> ffi::OsString {
    let file: ffi::OsString = format!("slots-{}.tmp", n).into();
    let loc: path::PathBuf = [scratch_dir.to_os_string(), file].iter().collect();
    loc.into_os_string()
}

fn split_location(location: &ffi::OsStr) -> Result<(ffi::OsString, String)> {
    let loc = path::Path::new(location);
    let dir = match loc.parent() {
        Some(dir) => dir.as_os_str().to_os_string(),
        None => return err_at!(InvalidFile, msg: "{:?} has no parent", location),
    };
    let name = match loc.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.to_string(),
        None => return err_at!(InvalidFile, msg: "{:?} has no file name", location),
    };
    Ok((dir, name))
}

#[cfg(test)]
#[path = "files_test.rs"]
mod files_test;
