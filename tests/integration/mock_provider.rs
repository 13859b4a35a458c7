//! Mock echo provider for integration tests.
//!
//! One opcode: decode the TLV record tagged [`TAG_REQ`] from the request
//! and echo its value back tagged [`TAG_RESP`]. Small enough to read in
//! one glance, which makes it the reference endpoint for exercising the
//! caller and transport layers.

use trustgate::call::CallRequest;
use trustgate::endpoint::CallEndpoint;
use trustgate::error::{RpcError, RpcResult};
use trustgate::tlv::{tlv_find, TlvWriter};

pub const OPCODE_ECHO: u32 = 0x0042;
pub const TAG_REQ: u32 = 1;
pub const TAG_RESP: u32 = 2;

pub struct EchoProvider {
    pub calls: u32,
}

impl EchoProvider {
    pub fn new() -> Self {
        Self { calls: 0 }
    }
}

impl CallEndpoint for EchoProvider {
    fn receive(&mut self, req: &mut CallRequest<'_>) -> RpcResult {
        if req.opcode != OPCODE_ECHO {
            return Err(RpcError::InvalidOpcode);
        }
        self.calls += 1;

        let mut staged = [0u8; 256];
        let value = tlv_find(req.request.payload(), TAG_REQ)
            .map_err(|_| RpcError::InvalidRequestBody)?
            .ok_or(RpcError::InvalidRequestBody)?;
        if value.len() > staged.len() {
            return Err(RpcError::InvalidRequestBody);
        }
        staged[..value.len()].copy_from_slice(value);
        let staged = &staged[..value.len()];

        let mut writer = TlvWriter::new(req.response.writable());
        writer
            .put(TAG_RESP, staged)
            .map_err(|_| RpcError::InvalidResponseBody)?;
        let used = writer.finish();
        req.response
            .set_used(used)
            .map_err(|_| RpcError::InvalidResponseBody)?;

        req.set_op_status(0);
        Ok(())
    }
}
