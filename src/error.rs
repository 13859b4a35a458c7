//! RPC transport status codes.
//!
//! Two orthogonal error channels exist in this runtime and are never
//! conflated:
//!
//! - **transport status** ([`RpcError`]): did the call reach a handler and
//!   come back intact. A fixed enumeration shared by every transport and
//!   every provider; individual services never invent new codes.
//! - **operation status** (`i32`, see [`crate::service::status`]): did the
//!   requested operation itself succeed. Provider-defined domain, carried
//!   opaquely by the call envelope.
//!
//! On the wire, "accepted" is `0` and each error variant carries the fixed
//! negative code listed below, so a response frame produced on one side of
//! the trust boundary decodes identically on the other.

use core::fmt;

/// Transport-level failure of an RPC transaction.
///
/// Wire representation is a signed 32-bit code; `Ok(())` on the Rust side
/// corresponds to code `0` (call accepted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum RpcError {
    /// No endpoint exists at the requested destination.
    EndpointDoesNotExist = -1,
    /// The endpoint has no handler for the requested opcode.
    InvalidOpcode = -2,
    /// No serializer is registered for the request's parameter encoding.
    SerializationNotSupported = -3,
    /// The request parameter body could not be parsed.
    InvalidRequestBody = -4,
    /// The response parameter body could not be produced or parsed.
    InvalidResponseBody = -5,
    /// A bounded resource (context slot, buffer) was exhausted.
    /// Retriable by policy: the resource may free up.
    ResourceFailure = -6,
    /// The endpoint exists but is not ready to take calls.
    NotReady = -7,
    /// Call lifecycle misuse. A client programming error, not retriable.
    InvalidTransaction = -8,
    /// Unclassified failure inside the RPC layer or the transport.
    Internal = -9,
    /// A call parameter was rejected before dispatch.
    InvalidParameter = -10,
}

/// Wire code for an accepted call.
pub const RPC_CALL_ACCEPTED: i32 = 0;

/// Result alias used across dispatch: `Ok(())` means the call was accepted
/// at the transport level, independent of the operation status.
pub type RpcResult = core::result::Result<(), RpcError>;

impl RpcError {
    /// The fixed signed wire code for this error.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Decode a wire status code. `0` is not an error and yields `None`;
    /// unknown codes collapse to [`RpcError::Internal`] rather than being
    /// invented as new variants.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            RPC_CALL_ACCEPTED => None,
            -1 => Some(Self::EndpointDoesNotExist),
            -2 => Some(Self::InvalidOpcode),
            -3 => Some(Self::SerializationNotSupported),
            -4 => Some(Self::InvalidRequestBody),
            -5 => Some(Self::InvalidResponseBody),
            -6 => Some(Self::ResourceFailure),
            -7 => Some(Self::NotReady),
            -8 => Some(Self::InvalidTransaction),
            -10 => Some(Self::InvalidParameter),
            _ => Some(Self::Internal),
        }
    }

    /// Encode a dispatch result as a wire status code.
    pub fn status_code(result: RpcResult) -> i32 {
        match result {
            Ok(()) => RPC_CALL_ACCEPTED,
            Err(e) => e.code(),
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndpointDoesNotExist => write!(f, "endpoint does not exist"),
            Self::InvalidOpcode => write!(f, "invalid opcode"),
            Self::SerializationNotSupported => write!(f, "serialization not supported"),
            Self::InvalidRequestBody => write!(f, "invalid request body"),
            Self::InvalidResponseBody => write!(f, "invalid response body"),
            Self::ResourceFailure => write!(f, "resource failure"),
            Self::NotReady => write!(f, "not ready"),
            Self::InvalidTransaction => write!(f, "invalid transaction"),
            Self::Internal => write!(f, "internal error"),
            Self::InvalidParameter => write!(f, "invalid parameter"),
        }
    }
}
