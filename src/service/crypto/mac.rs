//! MAC operation handlers.
//!
//! Same lifecycle as the hash handlers, with two differences: setup
//! carries key material, validated before a pool slot is committed, and
//! the context retains its key block until the pool scrubs it on free.

use log::{info, warn};

use crate::call::CallRequest;
use crate::error::{RpcError, RpcResult};
use crate::service::status;

use super::{alg, CryptoOperation, CryptoProvider, MacOperation, OP_KIND_MAC};

pub(super) fn setup(p: &mut CryptoProvider, req: &mut CallRequest<'_>) -> RpcResult {
    let serializer = p
        .mac_serializer(req.encoding)
        .ok_or(RpcError::SerializationNotSupported)?;
    let (alg_id, key) = serializer.deserialize_mac_setup_req(req.request.payload())?;

    if alg_id != alg::HMAC_SHA256 {
        req.set_op_status(status::NOT_SUPPORTED);
        return Ok(());
    }

    let Some(op) = MacOperation::new(key) else {
        req.set_op_status(status::INVALID_ARGUMENT);
        return Ok(());
    };

    let (handle, slot) = match p.pool.alloc(OP_KIND_MAC, req.caller_id) {
        Ok(claimed) => claimed,
        Err(e) => {
            warn!("crypto[{}]: mac setup: {e}", req.caller_id);
            return Err(RpcError::ResourceFailure);
        }
    };
    *slot = CryptoOperation::Mac(op);

    if let Err(e) = serializer.serialize_mac_setup_resp(&mut req.response, handle) {
        p.pool.free(OP_KIND_MAC, req.caller_id, handle);
        return Err(e);
    }

    info!("crypto[{}]: mac setup -> handle {handle}", req.caller_id);
    req.set_op_status(status::SUCCESS);
    Ok(())
}

pub(super) fn update(p: &mut CryptoProvider, req: &mut CallRequest<'_>) -> RpcResult {
    let serializer = p
        .mac_serializer(req.encoding)
        .ok_or(RpcError::SerializationNotSupported)?;
    let (handle, data) = serializer.deserialize_mac_update_req(req.request.payload())?;

    match p.pool.find(OP_KIND_MAC, req.caller_id, handle) {
        Some(CryptoOperation::Mac(op)) => {
            op.update(data);
            req.set_op_status(status::SUCCESS);
        }
        _ => {
            warn!("crypto[{}]: mac update: no context {handle}", req.caller_id);
            req.set_op_status(status::BAD_STATE);
        }
    }
    Ok(())
}

pub(super) fn sign(p: &mut CryptoProvider, req: &mut CallRequest<'_>) -> RpcResult {
    let serializer = p
        .mac_serializer(req.encoding)
        .ok_or(RpcError::SerializationNotSupported)?;
    let handle = serializer.deserialize_mac_sign_req(req.request.payload())?;

    let tag = match p.pool.find(OP_KIND_MAC, req.caller_id, handle) {
        Some(CryptoOperation::Mac(op)) => op.sign(),
        _ => {
            req.set_op_status(status::BAD_STATE);
            return Ok(());
        }
    };
    // Free scrubs the key block before the slot can be reassigned.
    p.pool.free(OP_KIND_MAC, req.caller_id, handle);

    serializer.serialize_mac_sign_resp(&mut req.response, &tag)?;
    req.set_op_status(status::SUCCESS);
    Ok(())
}

pub(super) fn abort(p: &mut CryptoProvider, req: &mut CallRequest<'_>) -> RpcResult {
    let serializer = p
        .mac_serializer(req.encoding)
        .ok_or(RpcError::SerializationNotSupported)?;
    let handle = serializer.deserialize_mac_abort_req(req.request.payload())?;

    if p.pool.free(OP_KIND_MAC, req.caller_id, handle) {
        info!("crypto[{}]: mac abort {handle}", req.caller_id);
        req.set_op_status(status::SUCCESS);
    } else {
        req.set_op_status(status::BAD_STATE);
    }
    Ok(())
}
