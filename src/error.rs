use std::{error, fmt, result};

/// Short form of `Result` type, used across this package.
pub type Result<T> = result::Result<T, Error>;

/// Error variants carried by all fallible operations. Each variant holds a
/// `file:line` prefix, stamped by [err_at], and a human readable message.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Distinct write for an already present key, duplicates disabled.
    DuplicateKey(String, String),
    /// Malformed varint, unknown tag, wrong magic, truncated stream.
    Corruption(String, String),
    /// Eager pre-merge free-disk-space check failed.
    OutOfDiskSpace(String, String),
    /// Value has no registered serializer.
    UnsupportedType(String, String),
    /// Lookup miss on the failing getter variant.
    KeyNotFound(String, String),
    /// Operation on a closed writer or facade.
    StoreClosed(String, String),
    InvalidInput(String, String),
    InvalidFile(String, String),
    IOError(String, String),
    FailConvert(String, String),
    Fatal(String, String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        use Error::*;

        match self {
            DuplicateKey(p, m) => write!(f, "DuplicateKey:{} {}", p, m),
            Corruption(p, m) => write!(f, "Corruption:{} {}", p, m),
            OutOfDiskSpace(p, m) => write!(f, "OutOfDiskSpace:{} {}", p, m),
            UnsupportedType(p, m) => write!(f, "UnsupportedType:{} {}", p, m),
            KeyNotFound(p, m) => write!(f, "KeyNotFound:{} {}", p, m),
            StoreClosed(p, m) => write!(f, "StoreClosed:{} {}", p, m),
            InvalidInput(p, m) => write!(f, "InvalidInput:{} {}", p, m),
            InvalidFile(p, m) => write!(f, "InvalidFile:{} {}", p, m),
            IOError(p, m) => write!(f, "IOError:{} {}", p, m),
            FailConvert(p, m) => write!(f, "FailConvert:{} {}", p, m),
            Fatal(p, m) => write!(f, "Fatal:{} {}", p, m),
        }
    }
}

impl error::Error for Error {}

/// Wrap a fallible expression, or construct an error in place, stamping the
/// `file!:line!` location into the error value.
///
/// ```ignore
/// err_at!(IOError, fs::metadata(loc))?;
/// err_at!(Corruption, msg: "unknown tag {}", tag)?;
/// err_at!(IOError, fd.sync_all(), "syncing {:?}", loc)?;
/// ```
#[macro_export]
macro_rules! err_at {
    ($v:ident, msg: $($arg:expr),+) => {{
        let prefix = format!("{}:{}", file!(), line!());
        Err(Error::$v(prefix, format!($($arg),+)))
    }};
    ($v:ident, $e:expr) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                Err(Error::$v(prefix, format!("{}", err)))
            }
        }
    }};
    ($v:ident, $e:expr, $($arg:expr),+) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                let msg = format!($($arg),+);
                Err(Error::$v(prefix, format!("{} {}", err, msg)))
            }
        }
    }};
}
