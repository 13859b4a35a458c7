//! Message transports: the byte-moving collaborator contract and the call
//! envelope shared by every such transport.
//!
//! Inter-partition messaging, mm-communicate and device-ioctl transports
//! all look the same to the core: a [`Transport`] delivers one opaque
//! request frame and blocks for one response frame. The envelope carried
//! inside those frames is fixed here, so neither dispatch nor the codecs
//! know which transport is in use.
//!
//! Frame layout, little-endian:
//!
//! ```text
//! request:   opcode u32 | encoding u32 | payload_len u32 | payload
//! response:  rpc_status i32 | op_status i32 | flags u32 | payload_len u32 | payload
//! ```
//!
//! The caller id is deliberately absent from the request frame. The
//! endpoint side of the transport assigns it per session, so a calling
//! domain cannot impersonate another session by forging envelope bytes.

use log::warn;

use crate::buffer::CallBuffer;
use crate::call::CallRequest;
use crate::caller::{CallHandle, CallOutcome, CallerError, RpcCaller, Transaction};
use crate::endpoint::CallEndpoint;
use crate::error::RpcError;

/// Request frame header: opcode, encoding, payload length.
pub const REQ_HDR_LEN: usize = 12;

/// Response frame header: rpc status, op status, flags, payload length.
pub const RESP_HDR_LEN: usize = 16;

/// Response flag bit: the op_status field holds a value set by a handler.
pub const RESP_FLAG_OP_STATUS: u32 = 1;

/// Fixed payload capacity of a message session, each direction.
pub const MSG_PAYLOAD_SIZE: usize = 4096;

const TX_SIZE: usize = REQ_HDR_LEN + MSG_PAYLOAD_SIZE;
const RX_SIZE: usize = RESP_HDR_LEN + MSG_PAYLOAD_SIZE;

// ── Transport contract ────────────────────────────────────────

/// What the core requires from a concrete transport. Opening a session is
/// construction; addressing stays inside the implementation.
pub trait Transport {
    /// Deliver `request` and block until a response frame arrives in
    /// `response`. Returns the response length. Failures use the fixed
    /// status enumeration verbatim; they are fatal for the session.
    fn send_and_wait(&mut self, request: &[u8], response: &mut [u8]) -> Result<usize, RpcError>;

    /// Release transport resources. Implementations also close on drop.
    fn close(&mut self) {}
}

/// A transport with no peer: discards requests and reports
/// [`RpcError::NotReady`]. Useful as a default when no provider is wired.
pub struct NullTransport;

impl Transport for NullTransport {
    fn send_and_wait(&mut self, _request: &[u8], _response: &mut [u8]) -> Result<usize, RpcError> {
        Err(RpcError::NotReady)
    }
}

// ── Client side ───────────────────────────────────────────────

/// An [`RpcCaller`] over any [`Transport`].
///
/// The request payload is written in place directly behind the frame
/// header, so invoking costs no payload copy on the send path.
pub struct MsgCaller<T: Transport> {
    transport: T,
    encoding: u32,
    txn: Transaction,
    tx: [u8; TX_SIZE],
    rx: [u8; RX_SIZE],
    resp_len: usize,
    op_status: Option<i32>,
}

impl<T: Transport> MsgCaller<T> {
    /// Open a session over `transport` using `encoding` for the whole
    /// session's parameters.
    pub fn new(transport: T, encoding: u32) -> Self {
        Self {
            transport,
            encoding,
            txn: Transaction::new(),
            tx: [0; TX_SIZE],
            rx: [0; RX_SIZE],
            resp_len: 0,
            op_status: None,
        }
    }

    /// Close the underlying transport and consume the session.
    pub fn close(mut self) {
        self.transport.close();
    }

    fn parse_response(&mut self) -> Result<(), CallerError> {
        let frame = &self.rx[..self.resp_len];
        if frame.len() < RESP_HDR_LEN {
            return Err(CallerError::Transport(RpcError::InvalidResponseBody));
        }

        let rpc_status = i32::from_le_bytes(frame[0..4].try_into().unwrap_or([0; 4]));
        let op_status = i32::from_le_bytes(frame[4..8].try_into().unwrap_or([0; 4]));
        let flags = u32::from_le_bytes(frame[8..12].try_into().unwrap_or([0; 4]));
        let payload_len = u32::from_le_bytes(frame[12..16].try_into().unwrap_or([0; 4])) as usize;

        if payload_len > frame.len() - RESP_HDR_LEN {
            return Err(CallerError::Transport(RpcError::InvalidResponseBody));
        }

        if let Some(err) = RpcError::from_code(rpc_status) {
            return Err(CallerError::Transport(err));
        }

        self.op_status = (flags & RESP_FLAG_OP_STATUS != 0).then_some(op_status);
        self.resp_len = RESP_HDR_LEN + payload_len;
        Ok(())
    }
}

impl<T: Transport> RpcCaller for MsgCaller<T> {
    fn begin(&mut self, req_len: usize) -> Result<(CallHandle, &mut [u8]), CallerError> {
        let handle = self.txn.begin(req_len, MSG_PAYLOAD_SIZE)?;
        Ok((handle, &mut self.tx[REQ_HDR_LEN..REQ_HDR_LEN + req_len]))
    }

    fn invoke(&mut self, handle: CallHandle, opcode: u32) -> Result<CallOutcome<'_>, CallerError> {
        let req_len = self.txn.take_for_invoke(handle)?;

        self.tx[0..4].copy_from_slice(&opcode.to_le_bytes());
        self.tx[4..8].copy_from_slice(&self.encoding.to_le_bytes());
        self.tx[8..12].copy_from_slice(&(req_len as u32).to_le_bytes());

        self.op_status = None;
        let n = self
            .transport
            .send_and_wait(&self.tx[..REQ_HDR_LEN + req_len], &mut self.rx)
            .map_err(CallerError::Transport)?;
        // A transport reporting more bytes than the frame it was given is
        // itself malformed.
        if n > self.rx.len() {
            return Err(CallerError::Transport(RpcError::InvalidResponseBody));
        }
        self.resp_len = n;
        self.parse_response()?;

        Ok(CallOutcome {
            op_status: self.op_status,
            response: &self.rx[RESP_HDR_LEN..self.resp_len],
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

// ── Endpoint side ─────────────────────────────────────────────

/// Server-side adapter: parses request frames arriving over a message
/// transport, dispatches them into a [`CallEndpoint`] and produces the
/// response frame.
///
/// The transport hands in the session's caller id together with each
/// frame; nothing inside the frame can override it.
pub struct MsgEndpoint<E: CallEndpoint> {
    endpoint: E,
    req_storage: [u8; MSG_PAYLOAD_SIZE],
    resp_storage: [u8; MSG_PAYLOAD_SIZE],
}

impl<E: CallEndpoint> MsgEndpoint<E> {
    pub fn new(endpoint: E) -> Self {
        Self {
            endpoint,
            req_storage: [0; MSG_PAYLOAD_SIZE],
            resp_storage: [0; MSG_PAYLOAD_SIZE],
        }
    }

    pub fn endpoint(&mut self) -> &mut E {
        &mut self.endpoint
    }

    /// Handle one request frame for the session identified by
    /// `caller_id`; the response frame is written into `out`.
    /// Returns the number of bytes written (0 only if `out` cannot even
    /// hold a response header).
    pub fn handle(&mut self, caller_id: u32, frame: &[u8], out: &mut [u8]) -> usize {
        let Some((opcode, encoding, payload)) = parse_request(frame) else {
            warn!("rpc[{caller_id}]: malformed request frame ({} bytes)", frame.len());
            return write_response(out, Err(RpcError::InvalidRequestBody), None, &[]);
        };

        self.req_storage[..payload.len()].copy_from_slice(payload);
        let Ok(request) = CallBuffer::full(&mut self.req_storage, payload.len()) else {
            return write_response(out, Err(RpcError::InvalidRequestBody), None, &[]);
        };
        let response = CallBuffer::empty(&mut self.resp_storage);

        let mut req = CallRequest::new(caller_id, opcode, encoding, request, response);
        let status = self.endpoint.receive(&mut req);
        let op_status = req.op_status;
        let resp_used = req.response.used();
        drop(req);

        write_response(out, status, op_status, &self.resp_storage[..resp_used])
    }
}

fn parse_request(frame: &[u8]) -> Option<(u32, u32, &[u8])> {
    if frame.len() < REQ_HDR_LEN {
        return None;
    }
    let opcode = u32::from_le_bytes(frame[0..4].try_into().ok()?);
    let encoding = u32::from_le_bytes(frame[4..8].try_into().ok()?);
    let payload_len = u32::from_le_bytes(frame[8..12].try_into().ok()?) as usize;

    if payload_len > MSG_PAYLOAD_SIZE || payload_len != frame.len() - REQ_HDR_LEN {
        return None;
    }
    Some((opcode, encoding, &frame[REQ_HDR_LEN..]))
}

fn write_response(
    out: &mut [u8],
    status: Result<(), RpcError>,
    op_status: Option<i32>,
    payload: &[u8],
) -> usize {
    if out.len() < RESP_HDR_LEN {
        return 0;
    }

    // A payload that cannot fit the destination frame degrades the call
    // to a response-body failure rather than truncating silently.
    let (status, payload) = if RESP_HDR_LEN + payload.len() > out.len() {
        (Err(RpcError::InvalidResponseBody), &[][..])
    } else {
        (status, payload)
    };

    let code = RpcError::status_code(status);
    let flags = if op_status.is_some() { RESP_FLAG_OP_STATUS } else { 0 };

    out[0..4].copy_from_slice(&code.to_le_bytes());
    out[4..8].copy_from_slice(&op_status.unwrap_or(0).to_le_bytes());
    out[8..12].copy_from_slice(&flags.to_le_bytes());
    out[12..16].copy_from_slice(&(payload.len() as u32).to_le_bytes());
    out[RESP_HDR_LEN..RESP_HDR_LEN + payload.len()].copy_from_slice(payload);

    RESP_HDR_LEN + payload.len()
}
