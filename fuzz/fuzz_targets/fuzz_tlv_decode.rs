//! Fuzz target: TLV stream decoding.
//!
//! Arbitrary bytes are what a compromised peer puts in a shared buffer,
//! so the decoder must be total: no panics, no record pointing outside
//! the input, and at most one error before the stream is poisoned.
//!
//! cargo fuzz run fuzz_tlv_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use trustgate::tlv::{tlv_find, TlvIter};

fuzz_target!(|data: &[u8]| {
    let mut errors = 0;
    for record in TlvIter::new(data) {
        match record {
            Ok(r) => {
                let base = data.as_ptr() as usize;
                let start = r.value.as_ptr() as usize;
                assert!(start >= base && start + r.value.len() <= base + data.len());
            }
            Err(_) => errors += 1,
        }
    }
    assert!(errors <= 1, "a malformed stream must fail at most once");

    // Search must agree with iteration on stream validity.
    let _ = tlv_find(data, 1);
});
