use std::{fs, path};

use super::*;
use crate::store::Reader;

fn loc(name: &str) -> ffi::OsString {
    let loc = std::env::temp_dir().join(name);
    fs::remove_file(&loc).ok();
    loc.into_os_string()
}

#[test]
fn test_empty_store() {
    let loc = loc("test_empty_store.paldb");
    let mut writer = Writer::create(&loc, Config::new()).unwrap();
    writer.close().unwrap();

    // file starts with varint-utf magic then the version label.
    let bytes = fs::read(&loc).unwrap();
    assert_eq!(&bytes[..6], &[0x05, b'P', b'A', b'L', b'D', b'B']);
    assert_eq!(bytes[6] as usize, FORMAT_V1.len());
    assert_eq!(&bytes[7..7 + FORMAT_V1.len()], FORMAT_V1.as_bytes());

    let reader = Reader::open(&loc, Config::new()).unwrap();
    assert_eq!(reader.size(), 0);
    match reader.get(1) {
        Err(Error::KeyNotFound(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    assert_eq!(reader.get_or(1, Value::Null).unwrap(), Value::Null);
    assert_eq!(reader.iter().count(), 0);
}

#[test]
fn test_single_record() {
    env_logger::builder().is_test(true).try_init().ok();

    let loc = loc("test_single_record.paldb");
    let mut writer = Writer::create(&loc, Config::new()).unwrap();
    writer.put(1, "foo").unwrap();
    writer.close().unwrap();

    let reader = Reader::open(&loc, Config::new()).unwrap();
    assert_eq!(reader.size(), 1);
    assert_eq!(reader.get(1).unwrap(), Value::from("foo"));

    // one sub-index at serialized length 1, exactly one occupied slot.
    assert_eq!(reader.meta.lengths.len(), 1);
    assert_eq!(reader.meta.lengths[0].key_len, 1);
    assert_eq!(reader.meta.lengths[0].key_count, 1);
    assert_eq!(reader.meta.lengths[0].actual_key_count, 1);
}

#[test]
fn test_close_is_idempotent() {
    let loc = loc("test_close_idempotent.paldb");
    let mut writer = Writer::create(&loc, Config::new()).unwrap();
    writer.put(1, 1).unwrap();
    writer.close().unwrap();
    writer.close().unwrap();

    match writer.put(2, 2) {
        Err(Error::StoreClosed(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    match writer.remove(1) {
        Err(Error::StoreClosed(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
}

#[test]
fn test_duplicate_key_rejected() {
    let loc_a = loc("test_duplicate_rejected.paldb");
    let mut writer = Writer::create(&loc_a, Config::new()).unwrap();
    writer.put(0, "A").unwrap();
    writer.put(0, "B").unwrap();
    match writer.close() {
        Err(Error::DuplicateKey(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    // a failed build leaves no output file behind.
    assert!(!path::Path::new(&loc_a).exists());

    // last write wins once duplicates are enabled.
    let loc_b = loc("test_duplicate_enabled.paldb");
    let mut config = Config::new();
    config.set_duplicates(true);
    let mut writer = Writer::create(&loc_b, config.clone()).unwrap();
    writer.put(0, "A").unwrap();
    writer.put(0, "B").unwrap();
    writer.close().unwrap();

    let reader = Reader::open(&loc_b, config).unwrap();
    assert_eq!(reader.size(), 1);
    assert_eq!(reader.get(0).unwrap(), Value::from("B"));
}

#[test]
fn test_tombstones() {
    let loc = loc("test_tombstones.paldb");
    let mut writer = Writer::create(&loc, Config::new()).unwrap();
    writer.put(1, "keep").unwrap();
    writer.put(2, "gone").unwrap();
    writer.remove(2).unwrap();
    writer.remove(99).unwrap(); // never present, dropped at build
    writer.close().unwrap();

    let reader = Reader::open(&loc, Config::new()).unwrap();
    assert_eq!(reader.size(), 1);
    assert_eq!(reader.get(1).unwrap(), Value::from("keep"));
    match reader.get(2) {
        Err(Error::KeyNotFound(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    assert_eq!(reader.iter().count(), 1);
}

#[test]
fn test_null_value_is_tombstone() {
    let loc = loc("test_null_tombstone.paldb");
    let mut writer = Writer::create(&loc, Config::new()).unwrap();
    writer.put(7, "x").unwrap();
    writer.put(7, Value::Null).unwrap();
    // a tombstone never raises DuplicateKey.
    writer.close().unwrap();

    let reader = Reader::open(&loc, Config::new()).unwrap();
    assert_eq!(reader.size(), 0);
}

#[test]
fn test_value_dedup() {
    let loc_a = loc("test_value_dedup_on.paldb");
    let mut writer = Writer::create(&loc_a, Config::new()).unwrap();
    let blob = "abcdefgh".repeat(64);
    for i in 10..60_i32 {
        writer.put(i, blob.as_str()).unwrap();
    }
    writer.close().unwrap();

    let loc_b = loc("test_value_dedup_off.paldb");
    let mut writer = Writer::create(&loc_b, Config::new()).unwrap();
    for i in 10..60_i32 {
        writer.put(i, format!("{}{}", blob, i)).unwrap();
    }
    writer.close().unwrap();

    // identical consecutive values share one data record.
    let same = fs::metadata(&loc_a).unwrap().len();
    let distinct = fs::metadata(&loc_b).unwrap().len();
    assert!(same < distinct / 10, "{} {}", same, distinct);

    let reader = Reader::open(&loc_a, Config::new()).unwrap();
    for i in 10..60_i32 {
        assert_eq!(reader.get(i).unwrap(), Value::from(blob.as_str()));
    }
}

#[test]
fn test_put_all_and_raw() {
    let loc = loc("test_put_all.paldb");
    let mut writer = Writer::create(&loc, Config::new()).unwrap();
    writer
        .put_all((0..10_i32).map(|i| (i, i * 2)))
        .unwrap();
    writer.close().unwrap();

    let reader = Reader::open(&loc, Config::new()).unwrap();
    assert_eq!(reader.size(), 10);
    for i in 0..10_i32 {
        assert_eq!(reader.get(i).unwrap(), Value::Int(i * 2));
    }

    match writer.put_raw(&[], Some(&[1])) {
        Err(Error::StoreClosed(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
}

#[test]
fn test_empty_key_rejected() {
    let loc = loc("test_empty_key.paldb");
    let mut writer = Writer::create(&loc, Config::new()).unwrap();
    match writer.put_raw(&[], Some(&[1])) {
        Err(Error::InvalidInput(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    match writer.put(Value::Null, 1) {
        Err(Error::InvalidInput(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    writer.close().unwrap();
}

#[test]
fn test_scratch_cleanup() {
    let dir = std::env::temp_dir();
    let loc = loc("test_scratch_cleanup.paldb");

    let mut writer = Writer::create(&loc, Config::new()).unwrap();
    writer.put(1, "x").unwrap();
    let scratch = writer.scratch_dir.clone();
    assert!(path::Path::new(&scratch).exists());
    writer.close().unwrap();
    assert!(!path::Path::new(&scratch).exists());

    // dropping an unclosed writer also reclaims its scratch space.
    let loc2 = dir.join("test_scratch_cleanup2.paldb");
    fs::remove_file(&loc2).ok();
    let mut writer = Writer::create(loc2.as_os_str(), Config::new()).unwrap();
    writer.put(1, "x").unwrap();
    let scratch = writer.scratch_dir.clone();
    std::mem::drop(writer);
    assert!(!path::Path::new(&scratch).exists());
}

#[test]
fn test_compressed_store() {
    let loc = loc("test_compressed_store.paldb");
    let mut config = Config::new();
    config.set_compression(true);
    let mut writer = Writer::create(&loc, config.clone()).unwrap();
    let blob = "squeeze me ".repeat(200);
    writer.put(1, blob.as_str()).unwrap();
    writer.put(2, 42).unwrap();
    writer.close().unwrap();

    let reader = Reader::open(&loc, config).unwrap();
    assert_eq!(reader.get(1).unwrap(), Value::from(blob.as_str()));
    assert_eq!(reader.get(2).unwrap(), Value::Int(42));
}

#[test]
fn test_custom_serializer_store() {
    let loc = loc("test_custom_store.paldb");
    let mut config = Config::new();
    config.register_serializer("com.example.Point");

    let mut writer = Writer::create(&loc, config.clone()).unwrap();
    let point = Value::Custom {
        name: "com.example.Point".to_string(),
        data: vec![0, 0, 0, 7],
    };
    writer.put(1, point.clone()).unwrap();

    // unregistered type fails this put alone, the build carries on.
    let other = Value::Custom { name: "com.example.Other".to_string(), data: vec![] };
    match writer.put(2, other) {
        Err(Error::UnsupportedType(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    writer.put(3, "fine").unwrap();
    writer.close().unwrap();

    // a fresh configuration decodes through the persisted registry.
    let reader = Reader::open(&loc, Config::new()).unwrap();
    assert_eq!(reader.get(1).unwrap(), point);
    assert_eq!(reader.get(3).unwrap(), Value::from("fine"));
    assert_eq!(reader.as_serializers().as_names(), &["com.example.Point".to_string()]);
}
