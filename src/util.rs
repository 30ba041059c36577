//! Module implement common file utility functions.

use std::{ffi, fs, path};

use crate::{Error, Result};

/// Create a file for writing, failing if it already exists. Parent
/// directories are created as needed.
pub fn create_file_w(file: &ffi::OsStr) -> Result<fs::File> {
    let os_file = path::Path::new(file);

    {
        let parent = match os_file.parent() {
            Some(parent) => Ok(parent),
            None => err_at!(InvalidFile, msg: "{:?}", file),
        }?;
        err_at!(IOError, fs::create_dir_all(parent))?;
    };

    let mut opts = fs::OpenOptions::new();
    Ok(err_at!(
        IOError,
        opts.write(true).create_new(true).open(os_file)
    )?)
}

/// Open file for reading.
pub fn open_file_r(file: &ffi::OsStr) -> Result<fs::File> {
    let os_file = path::Path::new(file);
    Ok(err_at!(
        IOError,
        fs::OpenOptions::new().read(true).open(os_file)
    )?)
}

/// Open file for reading and writing, creating and truncating it.
pub fn create_file_rw(file: &ffi::OsStr) -> Result<fs::File> {
    let os_file = path::Path::new(file);
    let mut opts = fs::OpenOptions::new();
    Ok(err_at!(
        IOError,
        opts.read(true).write(true).create(true).truncate(true).open(os_file)
    )?)
}

/// Positional read, the whole of `buf` at `fpos`, without touching any
/// shared cursor.
#[cfg(unix)]
pub fn read_at(fd: &fs::File, fpos: u64, buf: &mut [u8]) -> Result<()> {
    use std::os::unix::fs::FileExt;

    err_at!(IOError, fd.read_exact_at(buf, fpos))
}

#[cfg(windows)]
pub fn read_at(fd: &fs::File, fpos: u64, buf: &mut [u8]) -> Result<()> {
    use std::os::windows::fs::FileExt;

    let mut done = 0;
    while done < buf.len() {
        let fpos = fpos + (done as u64);
        match err_at!(IOError, fd.seek_read(&mut buf[done..], fpos))? {
            0 => return err_at!(IOError, msg: "eof at {}", fpos),
            n => done += n,
        }
    }
    Ok(())
}
