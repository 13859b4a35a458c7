//! Discovery over a chained deployment, the way sessions really start:
//! the discovery provider sits in front of the crypto service, answering
//! session-setup opcodes while everything else falls through.

use trustgate::call::{ENCODING_PACKED, ENCODING_POSTCARD};
use trustgate::caller::{CallerError, RpcCaller};
use trustgate::config::DeploymentConfig;
use trustgate::direct::DirectCaller;
use trustgate::endpoint::EndpointChain;
use trustgate::error::RpcError;
use trustgate::service::crypto::serializer::{PackedCryptoSerializer, PostcardCryptoSerializer};
use trustgate::service::crypto::{alg, opcode as crypto_opcode, CryptoProvider};
use trustgate::service::discovery::serializer::{
    PackedDiscoverySerializer, PostcardDiscoverySerializer,
};
use trustgate::service::discovery::{DiscoveryClient, DiscoveryProvider};
use trustgate::service::status;

/// The deployment wiring an integrator would write: discovery chained in
/// front of crypto, serializers registered per encoding.
fn deploy() -> EndpointChain<DiscoveryProvider, CryptoProvider> {
    let config = DeploymentConfig {
        interface_id: 0x0C05,
        instance: 0,
        max_payload_override: 0,
    };
    config.validate().unwrap();

    let mut discovery = DiscoveryProvider::new(config);
    discovery.register_serializer(ENCODING_PACKED, &PackedDiscoverySerializer);
    discovery.register_serializer(ENCODING_POSTCARD, &PostcardDiscoverySerializer);
    discovery.register_supported_encoding(ENCODING_PACKED);
    discovery.register_supported_encoding(ENCODING_POSTCARD);

    let mut crypto = CryptoProvider::new();
    crypto.register_hash_serializer(ENCODING_PACKED, &PackedCryptoSerializer);
    crypto.register_hash_serializer(ENCODING_POSTCARD, &PostcardCryptoSerializer);
    crypto.register_mac_serializer(ENCODING_PACKED, &PackedCryptoSerializer);

    EndpointChain::new(discovery, crypto)
}

#[test]
fn session_setup_then_service_call_through_one_chain() {
    let mut deployment = deploy();
    let mut caller = DirectCaller::new(&mut deployment, 1, ENCODING_PACKED);

    // Session setup: discovery first, cached for the session.
    let mut discovery = DiscoveryClient::new();
    let info = discovery.service_info(&mut caller).unwrap();
    assert_eq!(info.interface_id, 0x0C05);
    assert_eq!(info.supported_encodings, 0b11);
    assert!(info.max_payload >= 64);

    // Real call through the same chain: falls through to crypto.
    let (handle, buf) = caller.begin(4).unwrap();
    buf.copy_from_slice(&alg::SHA256.to_le_bytes());
    let outcome = caller.invoke(handle, crypto_opcode::HASH_SETUP).unwrap();
    assert_eq!(outcome.op_status, Some(status::SUCCESS));
    caller.end(handle);
}

#[test]
fn discovery_answers_in_the_sessions_own_encoding() {
    let mut deployment = deploy();
    let mut caller = DirectCaller::new(&mut deployment, 2, ENCODING_POSTCARD);

    let info = DiscoveryClient::new().service_info(&mut caller).unwrap();
    assert_eq!(info.interface_id, 0x0C05);
}

#[test]
fn probing_an_optional_discovery_opcode_is_not_a_transport_error() {
    use trustgate::service::discovery::opcode;

    let mut deployment = deploy();
    let mut caller = DirectCaller::new(&mut deployment, 1, ENCODING_PACKED);

    let (handle, _) = caller.begin(0).unwrap();
    let outcome = caller.invoke(handle, opcode::GET_PROVIDER_INFO).unwrap();
    assert_eq!(outcome.op_status, Some(status::NOT_SUPPORTED));
    caller.end(handle);
}

#[test]
fn opcodes_neither_provider_knows_are_rejected_by_the_chain() {
    let mut deployment = deploy();
    let mut caller = DirectCaller::new(&mut deployment, 1, ENCODING_PACKED);

    let (handle, _) = caller.begin(0).unwrap();
    assert!(matches!(
        caller.invoke(handle, 0xEEEE),
        Err(CallerError::Transport(RpcError::InvalidOpcode))
    ));
    caller.end(handle);
}
