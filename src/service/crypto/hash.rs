//! Hash operation handlers.
//!
//! Setup allocates a pool context, update feeds it, finish produces the
//! digest and frees it, abort frees it early. Every post-setup handler
//! reaches the context only through the pool's triple-checked lookup; a
//! handle that fails the check is an operation-level bad state, not a
//! transport error, because the request itself was well-formed.

use log::{info, warn};

use crate::call::CallRequest;
use crate::error::{RpcError, RpcResult};
use crate::service::status;

use super::{alg, CryptoOperation, CryptoProvider, HashOperation, OP_KIND_HASH};

pub(super) fn setup(p: &mut CryptoProvider, req: &mut CallRequest<'_>) -> RpcResult {
    let serializer = p
        .hash_serializer(req.encoding)
        .ok_or(RpcError::SerializationNotSupported)?;
    let alg_id = serializer.deserialize_hash_setup_req(req.request.payload())?;

    if alg_id != alg::SHA256 {
        req.set_op_status(status::NOT_SUPPORTED);
        return Ok(());
    }

    let (handle, slot) = match p.pool.alloc(OP_KIND_HASH, req.caller_id) {
        Ok(claimed) => claimed,
        Err(e) => {
            warn!("crypto[{}]: hash setup: {e}", req.caller_id);
            return Err(RpcError::ResourceFailure);
        }
    };
    *slot = CryptoOperation::Hash(HashOperation::new());

    if let Err(e) = serializer.serialize_hash_setup_resp(&mut req.response, handle) {
        p.pool.free(OP_KIND_HASH, req.caller_id, handle);
        return Err(e);
    }

    info!("crypto[{}]: hash setup -> handle {handle}", req.caller_id);
    req.set_op_status(status::SUCCESS);
    Ok(())
}

pub(super) fn update(p: &mut CryptoProvider, req: &mut CallRequest<'_>) -> RpcResult {
    let serializer = p
        .hash_serializer(req.encoding)
        .ok_or(RpcError::SerializationNotSupported)?;
    let (handle, data) = serializer.deserialize_hash_update_req(req.request.payload())?;

    match p.pool.find(OP_KIND_HASH, req.caller_id, handle) {
        Some(CryptoOperation::Hash(op)) => {
            op.update(data);
            req.set_op_status(status::SUCCESS);
        }
        _ => {
            warn!("crypto[{}]: hash update: no context {handle}", req.caller_id);
            req.set_op_status(status::BAD_STATE);
        }
    }
    Ok(())
}

pub(super) fn finish(p: &mut CryptoProvider, req: &mut CallRequest<'_>) -> RpcResult {
    let serializer = p
        .hash_serializer(req.encoding)
        .ok_or(RpcError::SerializationNotSupported)?;
    let handle = serializer.deserialize_hash_finish_req(req.request.payload())?;

    let digest = match p.pool.find(OP_KIND_HASH, req.caller_id, handle) {
        Some(CryptoOperation::Hash(op)) => op.finish(),
        _ => {
            req.set_op_status(status::BAD_STATE);
            return Ok(());
        }
    };
    // The operation is complete either way; release the slot first so a
    // response serialization failure cannot leak the context.
    p.pool.free(OP_KIND_HASH, req.caller_id, handle);

    serializer.serialize_hash_finish_resp(&mut req.response, &digest)?;
    req.set_op_status(status::SUCCESS);
    Ok(())
}

pub(super) fn abort(p: &mut CryptoProvider, req: &mut CallRequest<'_>) -> RpcResult {
    let serializer = p
        .hash_serializer(req.encoding)
        .ok_or(RpcError::SerializationNotSupported)?;
    let handle = serializer.deserialize_hash_abort_req(req.request.payload())?;

    if p.pool.free(OP_KIND_HASH, req.caller_id, handle) {
        info!("crypto[{}]: hash abort {handle}", req.caller_id);
        req.set_op_status(status::SUCCESS);
    } else {
        req.set_op_status(status::BAD_STATE);
    }
    Ok(())
}
