//! Direct caller: the shared-memory reference transport.
//!
//! Client and provider share an address space here, so "transport" is a
//! plain function call into the endpoint with the session's own buffers
//! mounted in the [`CallRequest`]. This is the deployment used when a
//! service runs in-process, and the reference implementation the message
//! transports are tested against.
//!
//! The caller id is assigned at construction by whatever wires the
//! deployment together; it identifies this session to the provider's
//! context pool and is not writable through the call interface.

use crate::buffer::CallBuffer;
use crate::call::CallRequest;
use crate::caller::{CallHandle, CallOutcome, CallerError, RpcCaller, Transaction};
use crate::endpoint::CallEndpoint;
use crate::error::RpcError;

/// Fixed request/response storage per session.
pub const DEFAULT_CALL_BUF_SIZE: usize = 4096;

/// An [`RpcCaller`] bound directly to an in-process endpoint.
///
/// The endpoint is exclusively borrowed for the session's lifetime, which
/// is exactly the single-threaded-per-request model the provider side
/// assumes.
pub struct DirectCaller<'e, E: CallEndpoint> {
    endpoint: &'e mut E,
    caller_id: u32,
    encoding: u32,
    txn: Transaction,
    req_storage: [u8; DEFAULT_CALL_BUF_SIZE],
    resp_storage: [u8; DEFAULT_CALL_BUF_SIZE],
    resp_len: usize,
    op_status: Option<i32>,
}

impl<'e, E: CallEndpoint> DirectCaller<'e, E> {
    /// Open a session against `endpoint`. `caller_id` is the
    /// transport-assigned session identity; `encoding` is the parameter
    /// encoding this client will use for the whole session.
    pub fn new(endpoint: &'e mut E, caller_id: u32, encoding: u32) -> Self {
        Self {
            endpoint,
            caller_id,
            encoding,
            txn: Transaction::new(),
            req_storage: [0; DEFAULT_CALL_BUF_SIZE],
            resp_storage: [0; DEFAULT_CALL_BUF_SIZE],
            resp_len: 0,
            op_status: None,
        }
    }
}

impl<E: CallEndpoint> RpcCaller for DirectCaller<'_, E> {
    fn begin(&mut self, req_len: usize) -> Result<(CallHandle, &mut [u8]), CallerError> {
        let handle = self.txn.begin(req_len, DEFAULT_CALL_BUF_SIZE)?;
        Ok((handle, &mut self.req_storage[..req_len]))
    }

    fn invoke(&mut self, handle: CallHandle, opcode: u32) -> Result<CallOutcome<'_>, CallerError> {
        let req_len = self.txn.take_for_invoke(handle)?;

        let request = CallBuffer::full(&mut self.req_storage, req_len)
            .map_err(|_| CallerError::Transport(RpcError::Internal))?;
        let response = CallBuffer::empty(&mut self.resp_storage);

        let mut call = CallRequest::new(self.caller_id, opcode, self.encoding, request, response);
        let status = self.endpoint.receive(&mut call);

        self.resp_len = call.response.used();
        self.op_status = call.op_status;
        drop(call);

        status.map_err(CallerError::Transport)?;
        Ok(CallOutcome {
            op_status: self.op_status,
            response: &self.resp_storage[..self.resp_len],
        })
    }

    fn end(&mut self, handle: CallHandle) {
        self.txn.end(handle);
        self.resp_len = 0;
        self.op_status = None;
    }

    fn encoding(&self) -> u32 {
        self.encoding
    }
}
