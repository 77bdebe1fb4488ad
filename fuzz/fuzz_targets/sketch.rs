#![no_main]

use cardinality_lab::sketch::{HyperLogLog, RegisterSketch};
use libfuzzer_sys::fuzz_target;
use wyhash::wyhash;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let precision = 4 + u32::from(data[0]) % 15;
    let mut sketch = HyperLogLog::create(precision).unwrap();
    for chunk in data[1..].chunks(4) {
        sketch.insert_hash(wyhash(chunk, 0));
        let estimate = sketch.estimate();
        assert!(estimate.is_finite() && estimate >= 0.0);
        assert!(sketch.size_of() > 0);
    }

    let packed = sketch.register_bytes();
    assert_eq!(packed.len(), (1usize << precision) * 6 / 8);
    let expanded = sketch.expand_registers();
    assert_eq!(expanded.len(), 1 << precision);
    let max_rank = (64 - precision + 1) as u8;
    assert!(expanded.iter().all(|&rank| rank <= max_rank));
});
