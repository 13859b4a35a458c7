//! Parameter serializers for the crypto service.
//!
//! A provider may have several serializers registered at once, one per
//! parameter encoding; selection is purely data-driven by the encoding tag
//! of each request, never negotiated mid-call. Hash and mac operations
//! have separate traits so a deployment can support them with different
//! encoding sets.

use crate::buffer::CallBuffer;
use crate::context_pool::OpHandle;
use crate::error::{RpcError, RpcResult};

pub mod packed;
pub mod postcard;

pub use packed::PackedCryptoSerializer;
pub use postcard::PostcardCryptoSerializer;

/// Request/response codec for the incremental hash operations.
///
/// Deserializers report [`RpcError::InvalidRequestBody`] for anything they
/// cannot parse; serializers report [`RpcError::InvalidResponseBody`] when
/// the response cannot fit the session's buffer.
pub trait HashSerializer: Sync {
    fn deserialize_hash_setup_req(&self, req: &[u8]) -> Result<u32, RpcError>;
    fn serialize_hash_setup_resp(&self, resp: &mut CallBuffer<'_>, op_handle: OpHandle)
        -> RpcResult;
    fn deserialize_hash_update_req<'a>(
        &self,
        req: &'a [u8],
    ) -> Result<(OpHandle, &'a [u8]), RpcError>;
    fn deserialize_hash_finish_req(&self, req: &[u8]) -> Result<OpHandle, RpcError>;
    fn serialize_hash_finish_resp(&self, resp: &mut CallBuffer<'_>, digest: &[u8]) -> RpcResult;
    fn deserialize_hash_abort_req(&self, req: &[u8]) -> Result<OpHandle, RpcError>;
}

/// Request/response codec for the keyed MAC operations.
pub trait MacSerializer: Sync {
    fn deserialize_mac_setup_req<'a>(&self, req: &'a [u8])
        -> Result<(u32, &'a [u8]), RpcError>;
    fn serialize_mac_setup_resp(&self, resp: &mut CallBuffer<'_>, op_handle: OpHandle)
        -> RpcResult;
    fn deserialize_mac_update_req<'a>(
        &self,
        req: &'a [u8],
    ) -> Result<(OpHandle, &'a [u8]), RpcError>;
    fn deserialize_mac_sign_req(&self, req: &[u8]) -> Result<OpHandle, RpcError>;
    fn serialize_mac_sign_resp(&self, resp: &mut CallBuffer<'_>, tag: &[u8]) -> RpcResult;
    fn deserialize_mac_abort_req(&self, req: &[u8]) -> Result<OpHandle, RpcError>;
}
