use rand::{prelude::random, rngs::SmallRng, Rng, SeedableRng};

use super::*;

#[test]
fn test_murmur3_reference() {
    // canonical verification vectors for the x86 32-bit variant.
    assert_eq!(murmur3(b"", 0), 0x0000_0000);
    assert_eq!(murmur3(b"", 1), 0x514e_28b7);
    assert_eq!(murmur3(b"", 0xffff_ffff), 0x81f1_6f39);
    assert_eq!(murmur3(&[0x00, 0x00, 0x00, 0x00], 0), 0x2362_f9de);
    assert_eq!(murmur3(&[0xff, 0xff, 0xff, 0xff], 0), 0x7629_3b50);
    assert_eq!(murmur3(&[0x21, 0x43, 0x65, 0x87], 0), 0xf55b_516b);
    assert_eq!(murmur3(&[0x21, 0x43, 0x65, 0x87], 0x5082_edee), 0x2362_f9de);
    assert_eq!(murmur3(&[0x21, 0x43, 0x65], 0), 0x7e4a_8634);
    assert_eq!(murmur3(&[0x21, 0x43], 0), 0xa0f7_b07a);
    assert_eq!(murmur3(&[0x21], 0), 0x7266_1cf4);
}

#[test]
fn test_murmur3_stable() {
    let seed: u64 = random();
    println!("test_murmur3_stable seed:{}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    for _ in 0..1000 {
        let n = rng.gen::<usize>() % 64;
        let bytes: Vec<u8> = (0..n).map(|_| rng.gen()).collect();
        let s: u32 = rng.gen();
        assert_eq!(murmur3(&bytes, s), murmur3(&bytes, s));
    }
}

#[test]
fn test_murmur3_positive() {
    let seed: u64 = random();
    println!("test_murmur3_positive seed:{}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    for _ in 0..10_000 {
        let bytes: Vec<u8> = (0..rng.gen::<usize>() % 16).map(|_| rng.gen()).collect();
        let h = murmur3_positive(&bytes, KEY_SEED);
        assert!(h <= 0x8000_0000);
    }
}
