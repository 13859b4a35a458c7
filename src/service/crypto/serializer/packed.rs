//! Packed parameter encoding for the crypto service (encoding 0).
//!
//! Each message is a fixed little-endian section followed, where the
//! operation carries variable-length data, by a TLV stream:
//!
//! ```text
//! hash_setup_in:   alg u32
//! hash_setup_out:  op_handle u32
//! hash_update_in:  op_handle u32 | TLV { DATA }
//! hash_finish_in:  op_handle u32
//! hash_finish_out: TLV { HASH }
//! hash_abort_in:   op_handle u32
//! mac_setup_in:    alg u32 | TLV { KEY }
//! mac_setup_out:   op_handle u32
//! mac_update_in:   op_handle u32 | TLV { DATA }
//! mac_sign_in:     op_handle u32
//! mac_sign_out:    TLV { MAC }
//! mac_abort_in:    op_handle u32
//! ```
//!
//! A missing DATA record decodes as zero-length data; a missing KEY record
//! is a malformed request. Unknown TLV tags are ignored on decode, which
//! is what lets newer clients add records without breaking this provider.

use crate::buffer::CallBuffer;
use crate::context_pool::OpHandle;
use crate::error::{RpcError, RpcResult};
use crate::tlv::{tlv_find, TlvWriter};

use super::{HashSerializer, MacSerializer};

/// TLV tags, scoped per message.
pub mod tag {
    pub const HASH_UPDATE_DATA: u32 = 1;
    pub const HASH_FINISH_HASH: u32 = 1;
    pub const MAC_SETUP_KEY: u32 = 1;
    pub const MAC_UPDATE_DATA: u32 = 1;
    pub const MAC_SIGN_MAC: u32 = 1;
}

const FIXED_LEN: usize = 4;

pub struct PackedCryptoSerializer;

// ── Shared fixed-section helpers ──────────────────────────────

fn read_u32(req: &[u8]) -> Result<u32, RpcError> {
    let bytes = req
        .get(..FIXED_LEN)
        .ok_or(RpcError::InvalidRequestBody)?;
    Ok(u32::from_le_bytes(bytes.try_into().unwrap_or([0; 4])))
}

fn write_handle(resp: &mut CallBuffer<'_>, op_handle: OpHandle) -> RpcResult {
    let out = resp.writable();
    if out.len() < FIXED_LEN {
        return Err(RpcError::InvalidResponseBody);
    }
    out[..FIXED_LEN].copy_from_slice(&op_handle.to_le_bytes());
    resp.set_used(FIXED_LEN).map_err(|_| RpcError::InvalidResponseBody)
}

/// `op_handle u32 | TLV { data_tag }`, data defaulting to empty.
fn read_handle_and_data(req: &[u8], data_tag: u32) -> Result<(OpHandle, &[u8]), RpcError> {
    let handle = read_u32(req)?;
    let data = tlv_find(&req[FIXED_LEN..], data_tag)
        .map_err(|_| RpcError::InvalidRequestBody)?
        .unwrap_or(&[]);
    Ok((handle, data))
}

fn write_single_record(resp: &mut CallBuffer<'_>, tag: u32, value: &[u8]) -> RpcResult {
    let mut writer = TlvWriter::new(resp.writable());
    writer
        .put(tag, value)
        .map_err(|_| RpcError::InvalidResponseBody)?;
    let used = writer.finish();
    resp.set_used(used).map_err(|_| RpcError::InvalidResponseBody)
}

// ── Hash ──────────────────────────────────────────────────────

impl HashSerializer for PackedCryptoSerializer {
    fn deserialize_hash_setup_req(&self, req: &[u8]) -> Result<u32, RpcError> {
        read_u32(req)
    }

    fn serialize_hash_setup_resp(
        &self,
        resp: &mut CallBuffer<'_>,
        op_handle: OpHandle,
    ) -> RpcResult {
        write_handle(resp, op_handle)
    }

    fn deserialize_hash_update_req<'a>(
        &self,
        req: &'a [u8],
    ) -> Result<(OpHandle, &'a [u8]), RpcError> {
        read_handle_and_data(req, tag::HASH_UPDATE_DATA)
    }

    fn deserialize_hash_finish_req(&self, req: &[u8]) -> Result<OpHandle, RpcError> {
        read_u32(req)
    }

    fn serialize_hash_finish_resp(&self, resp: &mut CallBuffer<'_>, digest: &[u8]) -> RpcResult {
        write_single_record(resp, tag::HASH_FINISH_HASH, digest)
    }

    fn deserialize_hash_abort_req(&self, req: &[u8]) -> Result<OpHandle, RpcError> {
        read_u32(req)
    }
}

// ── Mac ───────────────────────────────────────────────────────

impl MacSerializer for PackedCryptoSerializer {
    fn deserialize_mac_setup_req<'a>(&self, req: &'a [u8]) -> Result<(u32, &'a [u8]), RpcError> {
        let alg = read_u32(req)?;
        // Unlike update data, the key record is mandatory.
        let key = tlv_find(&req[FIXED_LEN..], tag::MAC_SETUP_KEY)
            .map_err(|_| RpcError::InvalidRequestBody)?
            .ok_or(RpcError::InvalidRequestBody)?;
        Ok((alg, key))
    }

    fn serialize_mac_setup_resp(
        &self,
        resp: &mut CallBuffer<'_>,
        op_handle: OpHandle,
    ) -> RpcResult {
        write_handle(resp, op_handle)
    }

    fn deserialize_mac_update_req<'a>(
        &self,
        req: &'a [u8],
    ) -> Result<(OpHandle, &'a [u8]), RpcError> {
        read_handle_and_data(req, tag::MAC_UPDATE_DATA)
    }

    fn deserialize_mac_sign_req(&self, req: &[u8]) -> Result<OpHandle, RpcError> {
        read_u32(req)
    }

    fn serialize_mac_sign_resp(&self, resp: &mut CallBuffer<'_>, tag_bytes: &[u8]) -> RpcResult {
        write_single_record(resp, tag::MAC_SIGN_MAC, tag_bytes)
    }

    fn deserialize_mac_abort_req(&self, req: &[u8]) -> Result<OpHandle, RpcError> {
        read_u32(req)
    }
}
