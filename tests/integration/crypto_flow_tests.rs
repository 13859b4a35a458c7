//! Crypto service flows driven from the client side, over a real caller.
//!
//! These mirror what a client library for the service would do: size the
//! request with `tlv_required_space`, encode the packed layout, invoke,
//! decode the response.

use trustgate::call::ENCODING_PACKED;
use trustgate::caller::{CallerError, RpcCaller};
use trustgate::context_pool::OpHandle;
use trustgate::direct::DirectCaller;
use trustgate::error::RpcError;
use trustgate::service::crypto::serializer::packed::tag;
use trustgate::service::crypto::serializer::PackedCryptoSerializer;
use trustgate::service::crypto::{
    alg, opcode, CryptoProvider, CRYPTO_CONTEXT_POOL_SIZE, DIGEST_LEN,
};
use trustgate::service::status;
use trustgate::tlv::{tlv_find, tlv_required_space, TlvWriter};

fn provider() -> CryptoProvider {
    let mut p = CryptoProvider::new();
    p.register_hash_serializer(ENCODING_PACKED, &PackedCryptoSerializer);
    p.register_mac_serializer(ENCODING_PACKED, &PackedCryptoSerializer);
    p
}

fn hash_setup(caller: &mut dyn RpcCaller) -> Result<OpHandle, CallerError> {
    let (handle, buf) = caller.begin(4)?;
    buf.copy_from_slice(&alg::SHA256.to_le_bytes());
    let op_handle = {
        let outcome = caller.invoke(handle, opcode::HASH_SETUP)?;
        assert_eq!(outcome.op_status, Some(status::SUCCESS));
        u32::from_le_bytes(outcome.response[..4].try_into().unwrap())
    };
    caller.end(handle);
    Ok(op_handle)
}

fn hash_update(caller: &mut dyn RpcCaller, op_handle: OpHandle, data: &[u8]) {
    let (handle, buf) = caller.begin(4 + tlv_required_space(data.len())).unwrap();
    buf[..4].copy_from_slice(&op_handle.to_le_bytes());
    let mut writer = TlvWriter::new(&mut buf[4..]);
    writer.put(tag::HASH_UPDATE_DATA, data).unwrap();
    let _ = writer.finish();

    let outcome = caller.invoke(handle, opcode::HASH_UPDATE).unwrap();
    assert_eq!(outcome.op_status, Some(status::SUCCESS));
    caller.end(handle);
}

fn hash_finish(caller: &mut dyn RpcCaller, op_handle: OpHandle) -> [u8; DIGEST_LEN] {
    let (handle, buf) = caller.begin(4).unwrap();
    buf.copy_from_slice(&op_handle.to_le_bytes());

    let digest = {
        let outcome = caller.invoke(handle, opcode::HASH_FINISH).unwrap();
        assert_eq!(outcome.op_status, Some(status::SUCCESS));
        let value = tlv_find(outcome.response, tag::HASH_FINISH_HASH)
            .unwrap()
            .unwrap();
        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(value);
        digest
    };
    caller.end(handle);
    digest
}

#[test]
fn incremental_hash_matches_the_one_shot_digest() {
    let mut endpoint = provider();
    let mut caller = DirectCaller::new(&mut endpoint, 1, ENCODING_PACKED);

    let op_handle = hash_setup(&mut caller).unwrap();
    hash_update(&mut caller, op_handle, b"the quick brown fox ");
    hash_update(&mut caller, op_handle, b"jumps over the lazy dog");

    let digest = hash_finish(&mut caller, op_handle);
    assert_eq!(
        digest,
        hmac_sha256::Hash::hash(b"the quick brown fox jumps over the lazy dog")
    );
}

#[test]
fn interleaved_sessions_do_not_share_state() {
    let mut endpoint = provider();

    // Session A starts an operation and goes quiet.
    let mut caller_a = DirectCaller::new(&mut endpoint, 100, ENCODING_PACKED);
    let op_a = hash_setup(&mut caller_a).unwrap();
    hash_update(&mut caller_a, op_a, b"partial ");
    drop(caller_a);

    // Session B cannot touch A's context, even with the right handle.
    let mut caller_b = DirectCaller::new(&mut endpoint, 200, ENCODING_PACKED);
    let (handle, buf) = caller_b.begin(4).unwrap();
    buf.copy_from_slice(&op_a.to_le_bytes());
    let outcome = caller_b.invoke(handle, opcode::HASH_FINISH).unwrap();
    assert_eq!(outcome.op_status, Some(status::BAD_STATE));
    caller_b.end(handle);
    drop(caller_b);

    // Session A resumes exactly where it left off.
    let mut caller_a = DirectCaller::new(&mut endpoint, 100, ENCODING_PACKED);
    hash_update(&mut caller_a, op_a, b"input");
    let digest = hash_finish(&mut caller_a, op_a);
    assert_eq!(digest, hmac_sha256::Hash::hash(b"partial input"));
}

#[test]
fn pool_exhaustion_surfaces_as_a_retriable_resource_failure() {
    let mut endpoint = provider();
    let mut caller = DirectCaller::new(&mut endpoint, 1, ENCODING_PACKED);

    let mut handles = Vec::new();
    for _ in 0..CRYPTO_CONTEXT_POOL_SIZE {
        handles.push(hash_setup(&mut caller).unwrap());
    }

    // One more setup: transport-level resource failure, no op status.
    let (handle, buf) = caller.begin(4).unwrap();
    buf.copy_from_slice(&alg::SHA256.to_le_bytes());
    assert!(matches!(
        caller.invoke(handle, opcode::HASH_SETUP),
        Err(CallerError::Transport(RpcError::ResourceFailure))
    ));
    caller.end(handle);

    // Retriable by policy: finishing one operation frees its slot.
    let _ = hash_finish(&mut caller, handles[0]);
    let _ = hash_setup(&mut caller).unwrap();
}

#[test]
fn mac_sign_over_rpc_matches_the_local_hmac() {
    let mut endpoint = provider();
    let mut caller = DirectCaller::new(&mut endpoint, 3, ENCODING_PACKED);
    let key = b"0123456789abcdef";

    let (handle, buf) = caller
        .begin(4 + tlv_required_space(key.len()))
        .unwrap();
    buf[..4].copy_from_slice(&alg::HMAC_SHA256.to_le_bytes());
    let mut writer = TlvWriter::new(&mut buf[4..]);
    writer.put(tag::MAC_SETUP_KEY, key).unwrap();
    let _ = writer.finish();

    let op_handle = {
        let outcome = caller.invoke(handle, opcode::MAC_SETUP).unwrap();
        assert_eq!(outcome.op_status, Some(status::SUCCESS));
        u32::from_le_bytes(outcome.response[..4].try_into().unwrap())
    };
    caller.end(handle);

    let (handle, buf) = caller.begin(4 + tlv_required_space(9)).unwrap();
    buf[..4].copy_from_slice(&op_handle.to_le_bytes());
    let mut writer = TlvWriter::new(&mut buf[4..]);
    writer.put(tag::MAC_UPDATE_DATA, b"trust me.").unwrap();
    let _ = writer.finish();
    let outcome = caller.invoke(handle, opcode::MAC_UPDATE).unwrap();
    assert_eq!(outcome.op_status, Some(status::SUCCESS));
    caller.end(handle);

    let (handle, buf) = caller.begin(4).unwrap();
    buf.copy_from_slice(&op_handle.to_le_bytes());
    let outcome = caller.invoke(handle, opcode::MAC_SIGN).unwrap();
    assert_eq!(outcome.op_status, Some(status::SUCCESS));
    let mac = tlv_find(outcome.response, tag::MAC_SIGN_MAC)
        .unwrap()
        .unwrap()
        .to_vec();
    caller.end(handle);

    assert_eq!(mac, hmac_sha256::HMAC::mac(b"trust me.", key));
}
