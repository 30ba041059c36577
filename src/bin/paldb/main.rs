use structopt::StructOpt;

use std::{ffi, process};

use paldb::{Config, Reader, Value};

/// Inspect store files from the command line.
#[derive(Debug, StructOpt)]
struct Opt {
    /// Size of each mapped segment, in bytes.
    #[structopt(long = "seg-size", default_value = "1073741824")]
    seg_size: u64,

    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, StructOpt)]
enum Cmd {
    /// Print the store's metadata summary.
    Stats { file: String },
    /// Look up one key. Keys parse as ints unless told otherwise.
    Get {
        file: String,
        key: String,
        /// Treat the key as a long.
        #[structopt(long = "long-key")]
        long_key: bool,
        /// Treat the key as a string.
        #[structopt(long = "string-key")]
        string_key: bool,
    },
    /// List every key in the store.
    Keys { file: String },
    /// Dump every entry as `key = value`.
    Entries { file: String },
}

fn main() {
    env_logger::init();

    let opt = Opt::from_args();
    if let Err(err) = run(opt) {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn run(opt: Opt) -> paldb::Result<()> {
    let mut config = Config::new();
    config.set_segment_size(opt.seg_size);

    match opt.cmd {
        Cmd::Stats { file } => {
            let reader = open(&file, config)?;
            let stats = reader.to_stats();
            println!("version            : {}", stats.version);
            println!("built at           : {}", stats.built_at);
            println!("key count          : {}", stats.key_count);
            println!("sub-indexes        : {}", stats.length_count);
            println!("max key length     : {}", stats.max_key_length);
            println!("index region at    : {}", stats.index_region_offset);
            println!("data region at     : {}", stats.data_region_offset);
            println!("bloom bits         : {}", stats.bloom_bit_size);
            println!("serializers        : {:?}", stats.serializers);
            reader.close()
        }
        Cmd::Get { file, key, long_key, string_key } => {
            let reader = open(&file, config)?;
            let key = to_key(&key, long_key, string_key)?;
            let value = reader.get(key)?;
            println!("{:?}", value);
            reader.close()
        }
        Cmd::Keys { file } => {
            let reader = open(&file, config)?;
            for key in reader.iter_keys() {
                println!("{:?}", key?);
            }
            reader.close()
        }
        Cmd::Entries { file } => {
            let reader = open(&file, config)?;
            for entry in reader.iter() {
                let (key, value) = entry?;
                println!("{:?} = {:?}", key, value);
            }
            reader.close()
        }
    }
}

fn open(file: &str, config: Config) -> paldb::Result<Reader> {
    let file: &ffi::OsStr = file.as_ref();
    Reader::open(file, config)
}

fn to_key(arg: &str, long_key: bool, string_key: bool) -> paldb::Result<Value> {
    use paldb::{err_at, Error};

    if string_key {
        Ok(Value::from(arg))
    } else if long_key {
        match arg.parse::<i64>() {
            Ok(key) => Ok(Value::Long(key)),
            Err(_) => err_at!(InvalidInput, msg: "not a long {:?}", arg),
        }
    } else if let Ok(key) = arg.parse::<i32>() {
        Ok(Value::Int(key))
    } else if let Ok(key) = arg.parse::<i64>() {
        Ok(Value::Long(key))
    } else {
        Ok(Value::from(arg))
    }
}
