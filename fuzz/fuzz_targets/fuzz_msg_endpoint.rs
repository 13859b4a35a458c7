//! Fuzz target: message-transport endpoint adapter.
//!
//! Feeds arbitrary request frames into a `MsgEndpoint` fronting the
//! crypto provider and checks the response-frame invariants: a response
//! header always comes back, its status code is from the fixed
//! enumeration, and the declared payload never exceeds what was written.
//!
//! cargo fuzz run fuzz_msg_endpoint

#![no_main]

use libfuzzer_sys::fuzz_target;
use trustgate::call::{ENCODING_PACKED, ENCODING_POSTCARD};
use trustgate::service::crypto::serializer::{PackedCryptoSerializer, PostcardCryptoSerializer};
use trustgate::service::crypto::CryptoProvider;
use trustgate::transport::{MsgEndpoint, RESP_HDR_LEN};

fuzz_target!(|data: &[u8]| {
    let mut provider = CryptoProvider::new();
    provider.register_hash_serializer(ENCODING_PACKED, &PackedCryptoSerializer);
    provider.register_hash_serializer(ENCODING_POSTCARD, &PostcardCryptoSerializer);
    provider.register_mac_serializer(ENCODING_PACKED, &PackedCryptoSerializer);
    let mut endpoint = MsgEndpoint::new(provider);

    let mut out = [0u8; 4096 + RESP_HDR_LEN];
    let written = endpoint.handle(1, data, &mut out);

    assert!(written >= RESP_HDR_LEN && written <= out.len());
    let code = i32::from_le_bytes(out[0..4].try_into().unwrap());
    assert!((-10..=0).contains(&code), "status escaped the enumeration");
    let payload_len = u32::from_le_bytes(out[12..16].try_into().unwrap()) as usize;
    assert_eq!(RESP_HDR_LEN + payload_len, written);
});
