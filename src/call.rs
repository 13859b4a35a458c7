//! Call message model.
//!
//! A [`CallRequest`] is the transport-independent representation of one
//! in-flight call: who is calling, which operation, which parameter
//! encoding, and a pair of request/response buffer views. The caller side
//! builds one per call, dispatch passes it through by mutable reference,
//! and it is dropped when the call ends.
//!
//! `caller_id` identifies the *session* and is assigned by the transport,
//! never taken from data the calling domain writes. The ownership check in
//! the operation context pool relies on this.

use crate::buffer::CallBuffer;

// ── Parameter encodings ───────────────────────────────────────

/// Fixed little-endian structs with TLV records for variable-length parts.
pub const ENCODING_PACKED: u32 = 0;

/// serde/postcard schema encoding.
pub const ENCODING_POSTCARD: u32 = 1;

/// Number of defined encodings; serializer registries are sized by this.
pub const ENCODING_LIMIT: usize = 2;

// ── Call request ──────────────────────────────────────────────

/// One in-flight call, passed by reference through endpoint dispatch.
#[derive(Debug)]
pub struct CallRequest<'a> {
    /// Transport-assigned session identifier.
    pub caller_id: u32,
    /// Operation selector, looked up in the provider's dispatch table.
    pub opcode: u32,
    /// Parameter encoding tag ([`ENCODING_PACKED`] / [`ENCODING_POSTCARD`]).
    pub encoding: u32,
    /// Operation status, set by a handler only once it has parsed its
    /// parameters. `None` means no operation was attempted.
    pub op_status: Option<i32>,
    /// Request parameters written by the caller.
    pub request: CallBuffer<'a>,
    /// Response parameters written by the handler.
    pub response: CallBuffer<'a>,
}

impl<'a> CallRequest<'a> {
    pub fn new(
        caller_id: u32,
        opcode: u32,
        encoding: u32,
        request: CallBuffer<'a>,
        response: CallBuffer<'a>,
    ) -> Self {
        Self {
            caller_id,
            opcode,
            encoding,
            op_status: None,
            request,
            response,
        }
    }

    /// Record the outcome of the operation itself, orthogonal to the
    /// transport status returned by dispatch.
    pub fn set_op_status(&mut self, status: i32) {
        self.op_status = Some(status);
    }
}
