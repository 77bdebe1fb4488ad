#![no_main]

use cardinality_lab::counter::WideCounter;
use libfuzzer_sys::fuzz_target;

const LIMIT: u128 = 1 << 124;

fn value(bytes: &[u8]) -> u128 {
    let mut buffer = [0u8; 16];
    buffer.copy_from_slice(bytes);
    u128::from_le_bytes(buffer) % LIMIT
}

// Differential check of WideCounter arithmetic against u128.
fuzz_target!(|data: &[u8]| {
    if data.len() < 32 {
        return;
    }
    let a = value(&data[..16]);
    let b = value(&data[16..32]);

    let mut wide = WideCounter::from_u128(a);
    assert_eq!(wide.as_u128(), a);
    assert_eq!(wide.to_string(), a.to_string());

    wide.add(WideCounter::from_u128(b));
    assert_eq!(wide.as_u128(), a + b);

    let small = b as u64;
    wide.add_u64(small);
    assert_eq!(wide.as_u128(), a + b + u128::from(small));

    wide.increment();
    assert_eq!(wide.as_u128(), a + b + u128::from(small) + 1);
    wide.decrement();
    assert_eq!(wide.as_u128(), a + b + u128::from(small));

    assert_eq!(
        WideCounter::from_u128(a).cmp(&WideCounter::from_u128(b)),
        a.cmp(&b)
    );
});
