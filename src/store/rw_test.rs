use std::{ffi, fs};

use super::*;

fn loc(name: &str) -> ffi::OsString {
    let loc = std::env::temp_dir().join(name);
    fs::remove_file(&loc).ok();
    loc.into_os_string()
}

#[test]
fn test_create_and_overlay() {
    let loc = loc("test_rw_create.paldb");
    let store = Store::create(&loc, Config::new()).unwrap();

    // overlay reads win before any flush.
    store.put(1, "one").unwrap();
    store.put(2, "two").unwrap();
    assert_eq!(store.get(1).unwrap(), Value::from("one"));
    assert_eq!(store.get(2).unwrap(), Value::from("two"));
    assert_eq!(store.pending(), 2);

    match store.get(3) {
        Err(Error::KeyNotFound(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    assert_eq!(store.get_or(3, Value::Null).unwrap(), Value::Null);

    // puts overwrite in place, removes shadow the backing store.
    store.put(1, "uno").unwrap();
    assert_eq!(store.get(1).unwrap(), Value::from("uno"));
    store.remove(2).unwrap();
    match store.get(2) {
        Err(Error::KeyNotFound(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
}

#[test]
fn test_flush_persists() {
    env_logger::builder().is_test(true).try_init().ok();

    let loc = loc("test_rw_flush.paldb");
    let store = Store::create(&loc, Config::new()).unwrap();
    for i in 0..50_i32 {
        store.put(i, i * 3).unwrap();
    }
    store.remove(7).unwrap();
    store.flush().unwrap();
    assert_eq!(store.pending(), 0);

    // overlay survives into the rebuilt file.
    for i in 0..50_i32 {
        if i == 7 {
            assert_eq!(store.get_or(i, Value::Null).unwrap(), Value::Null);
        } else {
            assert_eq!(store.get(i).unwrap(), Value::Int(i * 3));
        }
    }

    // and is visible to an independent reader.
    let reader = crate::Reader::open(&loc, Config::new()).unwrap();
    assert_eq!(reader.size(), 49);
    assert_eq!(reader.get(11).unwrap(), Value::Int(33));
    std::mem::drop(reader);

    // a second flush round merges reader entries with fresh mutations.
    store.put(100, "hundred").unwrap();
    store.remove(0).unwrap();
    store.flush().unwrap();
    assert_eq!(store.get(100).unwrap(), Value::from("hundred"));
    assert_eq!(store.get_or(0, Value::Null).unwrap(), Value::Null);
    assert_eq!(store.get(49).unwrap(), Value::Int(147));
}

#[test]
fn test_open_existing() {
    let loc = loc("test_rw_open_existing.paldb");
    {
        let mut writer = Writer::create(&loc, Config::new()).unwrap();
        writer.put(1, "seed").unwrap();
        writer.close().unwrap();
    }

    let store = Store::open(&loc, Config::new()).unwrap();
    assert_eq!(store.get(1).unwrap(), Value::from("seed"));
    store.put(2, "grown").unwrap();
    store.flush().unwrap();

    let reader = crate::Reader::open(&loc, Config::new()).unwrap();
    assert_eq!(reader.size(), 2);
}

#[test]
fn test_auto_flush() {
    let loc = loc("test_rw_auto_flush.paldb");
    let mut config = Config::new();
    config.set_write_buffer_size(10);

    let store = Store::create(&loc, config).unwrap();
    for i in 0..10_i32 {
        store.put(i, i).unwrap();
    }
    // the tenth put crossed the buffer threshold and flushed.
    assert_eq!(store.pending(), 0);

    let reader = crate::Reader::open(&loc, Config::new()).unwrap();
    assert_eq!(reader.size(), 10);
    std::mem::drop(reader);

    // auto flush can be turned off.
    let loc = self::loc("test_rw_auto_flush_off.paldb");
    let mut config = Config::new();
    config.set_write_buffer_size(10).set_auto_flush(false);
    let store = Store::create(&loc, config).unwrap();
    for i in 0..20_i32 {
        store.put(i, i).unwrap();
    }
    assert_eq!(store.pending(), 20);
}

#[test]
fn test_compact_last_entry() {
    let loc = loc("test_rw_compact.paldb");
    let store = Store::create(&loc, Config::new()).unwrap();
    store.put(1, "a").unwrap();
    let last = store.compact().unwrap();
    assert_eq!(last, Some((Value::Int(1), Value::from("a"))));
    assert_eq!(store.pending(), 0);

    // an empty store compacts to nothing.
    let loc = self::loc("test_rw_compact_empty.paldb");
    let store = Store::create(&loc, Config::new()).unwrap();
    assert_eq!(store.compact().unwrap(), None);
}

#[test]
fn test_closed_store() {
    let loc = loc("test_rw_closed.paldb");
    let store = Store::create(&loc, Config::new()).unwrap();
    store.put(1, 1).unwrap();
    store.close().unwrap();

    match store.get(1) {
        Err(Error::StoreClosed(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    match store.put(2, 2) {
        Err(Error::StoreClosed(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    match store.flush() {
        Err(Error::StoreClosed(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
}

#[test]
fn test_clone_shares_state() {
    let loc = loc("test_rw_clone.paldb");
    let store = Store::create(&loc, Config::new()).unwrap();
    let other = store.clone();

    store.put(5, "five").unwrap();
    assert_eq!(other.get(5).unwrap(), Value::from("five"));
    other.flush().unwrap();
    assert_eq!(store.pending(), 0);
}
