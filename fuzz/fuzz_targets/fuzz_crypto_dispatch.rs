//! Fuzz target: crypto provider dispatch with attacker-shaped calls.
//!
//! Splits the input into (opcode selector, caller id, body) and runs a
//! short sequence of calls against one provider instance. Invariants:
//! no panics, op_status only ever set when the body parsed, and the
//! context pool never exceeds its fixed capacity.
//!
//! cargo fuzz run fuzz_crypto_dispatch

#![no_main]

use libfuzzer_sys::fuzz_target;
use trustgate::buffer::CallBuffer;
use trustgate::call::{CallRequest, ENCODING_PACKED};
use trustgate::endpoint::CallEndpoint;
use trustgate::service::crypto::serializer::PackedCryptoSerializer;
use trustgate::service::crypto::{opcode, CryptoProvider, CRYPTO_CONTEXT_POOL_SIZE};

const OPCODES: [u32; 8] = [
    opcode::HASH_SETUP,
    opcode::HASH_UPDATE,
    opcode::HASH_FINISH,
    opcode::HASH_ABORT,
    opcode::MAC_SETUP,
    opcode::MAC_UPDATE,
    opcode::MAC_SIGN,
    opcode::MAC_ABORT,
];

fuzz_target!(|data: &[u8]| {
    let mut provider = CryptoProvider::new();
    provider.register_hash_serializer(ENCODING_PACKED, &PackedCryptoSerializer);
    provider.register_mac_serializer(ENCODING_PACKED, &PackedCryptoSerializer);

    for chunk in data.chunks(64).take(16) {
        if chunk.len() < 2 {
            continue;
        }
        let op = OPCODES[(chunk[0] % OPCODES.len() as u8) as usize];
        let caller_id = u32::from(chunk[1] % 3);
        let body = &chunk[2..];

        let mut req_storage = [0u8; 64];
        let mut resp_storage = [0u8; 128];
        req_storage[..body.len()].copy_from_slice(body);

        let mut req = CallRequest::new(
            caller_id,
            op,
            ENCODING_PACKED,
            CallBuffer::full(&mut req_storage, body.len()).unwrap(),
            CallBuffer::empty(&mut resp_storage),
        );

        let result = provider.receive(&mut req);
        if result.is_err() {
            // Transport-level rejection before the operation ran, except
            // for setup calls that died on pool exhaustion after parsing.
            assert!(req.op_status.is_none());
        }
        assert!(provider.live_contexts() <= CRYPTO_CONTEXT_POOL_SIZE);
    }
});
