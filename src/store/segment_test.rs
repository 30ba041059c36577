use rand::{prelude::random, rngs::SmallRng, Rng, SeedableRng};

use std::io::Write;

use super::*;
use crate::util;

fn scratch_file(name: &str, bytes: &[u8]) -> fs::File {
    let loc = std::env::temp_dir().join(name);
    fs::remove_file(&loc).ok();
    let mut fd = util::create_file_rw(loc.as_os_str()).unwrap();
    fd.write_all(bytes).unwrap();
    fd.sync_all().unwrap();
    fd
}

#[test]
fn test_segments_read() {
    let seed: u64 = random();
    println!("test_segments_read seed:{}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let bytes: Vec<u8> = (0..10_000).map(|_| rng.gen()).collect();
    let fd = scratch_file("test_segments_read.data", &bytes);

    // segment smaller than the file forces boundary stitches.
    for segment_size in [512_u64, 4096, 16_384].iter() {
        let segs = Segments::map(&fd, bytes.len() as u64, *segment_size).unwrap();
        assert_eq!(segs.len(), bytes.len() as u64);

        let mut scratch = vec![];
        for _ in 0..1000 {
            let off = rng.gen::<u64>() % (bytes.len() as u64);
            let n = (rng.gen::<usize>() % 700).min(bytes.len() - off as usize);
            let got = segs.read(off, n, &mut scratch).unwrap();
            assert_eq!(got, &bytes[off as usize..off as usize + n]);
        }

        // span across a boundary when one exists.
        if segment_size + 512 <= (bytes.len() as u64) {
            let mut buf = vec![0; 1024];
            let off = segment_size - 512;
            segs.read_into(off, &mut buf).unwrap();
            assert_eq!(&buf, &bytes[off as usize..off as usize + 1024]);
        }
    }
}

#[test]
fn test_segments_bounds() {
    let fd = scratch_file("test_segments_bounds.data", &[0xab; 100]);
    let segs = Segments::map(&fd, 100, 64).unwrap();

    let mut buf = vec![0; 8];
    segs.read_into(92, &mut buf).unwrap();
    match segs.read_into(93, &mut buf) {
        Err(Error::Corruption(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
}

#[test]
fn test_segments_empty() {
    let fd = scratch_file("test_segments_empty.data", &[]);
    let segs = Segments::map(&fd, 0, 1024).unwrap();
    assert!(segs.is_empty());
    let mut buf: [u8; 0] = [];
    segs.read_into(0, &mut buf).unwrap();
}

#[test]
fn test_segments_mut() {
    let seed: u64 = random();
    println!("test_segments_mut seed:{}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let loc = std::env::temp_dir().join("test_segments_mut.data");
    fs::remove_file(&loc).ok();
    let fd = util::create_file_rw(loc.as_os_str()).unwrap();
    fd.set_len(4096).unwrap();

    let mut segs = SegmentsMut::map(&fd, 4096, 256).unwrap();

    let mut shadow = vec![0_u8; 4096];
    for _ in 0..500 {
        let off = rng.gen::<u64>() % 4096;
        let n = (rng.gen::<usize>() % 600).min(4096 - off as usize);
        let bytes: Vec<u8> = (0..n).map(|_| rng.gen()).collect();
        segs.write_at(off, &bytes).unwrap();
        shadow[off as usize..off as usize + n].copy_from_slice(&bytes);
    }
    segs.flush().unwrap();

    let mut buf = vec![0; 4096];
    segs.read_into(0, &mut buf).unwrap();
    assert_eq!(buf, shadow);

    // flushed content is visible through a fresh read-only mapping.
    let segs = Segments::map(&fd, 4096, 1024).unwrap();
    let mut buf = vec![0; 4096];
    segs.read_into(0, &mut buf).unwrap();
    assert_eq!(buf, shadow);
}
