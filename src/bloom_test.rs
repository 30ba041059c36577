use rand::{prelude::random, rngs::SmallRng, Rng, SeedableRng};

use super::*;

#[test]
fn test_bloom_sizing() {
    let filter = BloomFilter::new(10_000, 0.01).unwrap();
    // m = ceil(-n ln p / ln^2 2) ≈ 95851 bits, k ≈ 7.
    assert_eq!(filter.bit_size(), 95_851);
    assert_eq!(filter.hashes(), 7);
    assert_eq!(filter.as_words().len(), (95_851 + 63) / 64);

    // floor at 64 bits and one hash.
    let filter = BloomFilter::new(0, 0.5).unwrap();
    assert_eq!(filter.bit_size(), 64);
    assert!(filter.hashes() >= 1);

    match BloomFilter::new(10, 1.5) {
        Err(Error::InvalidInput(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
}

#[test]
fn test_bloom_no_false_negatives() {
    let seed: u64 = random();
    println!("test_bloom_no_false_negatives seed:{}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut filter = BloomFilter::new(10_000, 0.01).unwrap();
    let keys: Vec<Vec<u8>> = (0..10_000_u64)
        .map(|i| {
            let mut key = i.to_be_bytes().to_vec();
            key.push(rng.gen());
            key
        })
        .collect();

    for key in keys.iter() {
        filter.add(key);
    }
    for key in keys.iter() {
        assert!(filter.might_contain(key));
    }
}

#[test]
fn test_bloom_false_positive_rate() {
    let mut filter = BloomFilter::new(10_000, 0.01).unwrap();
    for i in 0_u64..10_000 {
        filter.add(&i.to_be_bytes());
    }

    let trials = 1_000_000_u64;
    let mut hits = 0_u64;
    for i in 0..trials {
        // disjoint from the inserted key space.
        let miss = (0x8000_0000_0000_0000 | i).to_be_bytes();
        if filter.might_contain(&miss) {
            hits += 1;
        }
    }

    let observed = (hits as f64) / (trials as f64);
    assert!(observed <= 0.01 * 1.10, "observed fp rate {}", observed);
}

#[test]
fn test_bloom_from_parts() {
    let mut filter = BloomFilter::new(100, 0.05).unwrap();
    for i in 0_u64..100 {
        filter.add(&i.to_be_bytes());
    }

    let copy = BloomFilter::from_parts(
        filter.bit_size(),
        filter.hashes(),
        filter.as_words().to_vec(),
    )
    .unwrap();
    assert_eq!(copy, filter);
    for i in 0_u64..100 {
        assert!(copy.might_contain(&i.to_be_bytes()));
    }

    match BloomFilter::from_parts(1024, 3, vec![0; 3]) {
        Err(Error::Corruption(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
}
