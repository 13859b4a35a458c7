//! Postcard parameter encoding for the crypto service (encoding 1).
//!
//! Messages are the serde structs below, serialized with `postcard`.
//! Byte fields borrow from the request buffer, so decoding stays
//! zero-copy just like the TLV path. The structs are public: clients
//! speaking this encoding serialize the very same types, which keeps the
//! two sides from drifting apart.
//!
//! Registered for hash operations only in the bundled deployments; a mac
//! request arriving with this encoding is answered with
//! "serialization not supported".

use serde::{Deserialize, Serialize};

use crate::buffer::CallBuffer;
use crate::context_pool::OpHandle;
use crate::error::{RpcError, RpcResult};

use super::HashSerializer;

// ── Message types ─────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct HashSetupIn {
    pub alg: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HashSetupOut {
    pub op_handle: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HashUpdateIn<'a> {
    pub op_handle: u32,
    #[serde(borrow)]
    pub data: &'a [u8],
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HashFinishIn {
    pub op_handle: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HashFinishOut<'a> {
    #[serde(borrow)]
    pub digest: &'a [u8],
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HashAbortIn {
    pub op_handle: u32,
}

// ── Serializer ────────────────────────────────────────────────

pub struct PostcardCryptoSerializer;

fn encode<T: Serialize>(resp: &mut CallBuffer<'_>, value: &T) -> RpcResult {
    let used = postcard::to_slice(value, resp.writable())
        .map_err(|_| RpcError::InvalidResponseBody)?
        .len();
    resp.set_used(used).map_err(|_| RpcError::InvalidResponseBody)
}

impl HashSerializer for PostcardCryptoSerializer {
    fn deserialize_hash_setup_req(&self, req: &[u8]) -> Result<u32, RpcError> {
        let msg: HashSetupIn =
            postcard::from_bytes(req).map_err(|_| RpcError::InvalidRequestBody)?;
        Ok(msg.alg)
    }

    fn serialize_hash_setup_resp(
        &self,
        resp: &mut CallBuffer<'_>,
        op_handle: OpHandle,
    ) -> RpcResult {
        encode(resp, &HashSetupOut { op_handle })
    }

    fn deserialize_hash_update_req<'a>(
        &self,
        req: &'a [u8],
    ) -> Result<(OpHandle, &'a [u8]), RpcError> {
        let msg: HashUpdateIn<'a> =
            postcard::from_bytes(req).map_err(|_| RpcError::InvalidRequestBody)?;
        Ok((msg.op_handle, msg.data))
    }

    fn deserialize_hash_finish_req(&self, req: &[u8]) -> Result<OpHandle, RpcError> {
        let msg: HashFinishIn =
            postcard::from_bytes(req).map_err(|_| RpcError::InvalidRequestBody)?;
        Ok(msg.op_handle)
    }

    fn serialize_hash_finish_resp(&self, resp: &mut CallBuffer<'_>, digest: &[u8]) -> RpcResult {
        encode(resp, &HashFinishOut { digest })
    }

    fn deserialize_hash_abort_req(&self, req: &[u8]) -> Result<OpHandle, RpcError> {
        let msg: HashAbortIn =
            postcard::from_bytes(req).map_err(|_| RpcError::InvalidRequestBody)?;
        Ok(msg.op_handle)
    }
}
