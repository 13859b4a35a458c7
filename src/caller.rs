//! Client-side call lifecycle.
//!
//! An [`RpcCaller`] is a transport-agnostic state machine:
//!
//! ```text
//!   Idle ──begin──▶ Pending ──invoke──▶ Done ──end──▶ Idle
//! ```
//!
//! One concrete implementation exists per transport ([`crate::direct`],
//! [`crate::transport`]); all of them share the [`Transaction`] helper so
//! the at-most-one-transaction invariant is enforced in exactly one place.
//!
//! `invoke` is synchronous: it blocks the caller's thread of control until
//! the provider has produced a response, and there is no cancellation. A
//! transport failure mid-call is fatal for the session and surfaces as
//! [`CallerError::Transport`] with the fixed status enumeration, verbatim.

use core::fmt;

use crate::error::RpcError;

/// Identifier for one call transaction, valid from `begin` to `end`.
/// Opaque to callers; `0` is never issued.
pub type CallHandle = u32;

/// Errors surfaced by the caller-side state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerError {
    /// No transaction slot or request buffer is available. Either a call
    /// is already in progress on this session, or the requested length
    /// exceeds the session's fixed request-buffer capacity.
    NoBufferAvailable,
    /// The handle does not name this session's active transaction, or the
    /// transaction is not in the right state for the attempted step.
    InvalidTransaction,
    /// The transport failed to complete the call. Non-retriable; the
    /// wrapped status is propagated from the transport unchanged.
    Transport(RpcError),
}

impl fmt::Display for CallerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoBufferAvailable => write!(f, "no call buffer available"),
            Self::InvalidTransaction => write!(f, "invalid call transaction"),
            Self::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

impl From<RpcError> for CallerError {
    fn from(e: RpcError) -> Self {
        Self::Transport(e)
    }
}

/// Result of a successfully transported call.
///
/// The transport accepting the call says nothing about whether the
/// operation itself succeeded; both channels are surfaced side by side.
#[derive(Debug)]
pub struct CallOutcome<'a> {
    /// Operation status set by the handler; `None` if the handler never
    /// got as far as attempting the operation.
    pub op_status: Option<i32>,
    /// Read-only view into the session's response buffer. Valid until the
    /// borrow ends; the underlying storage is reused after `end`.
    pub response: &'a [u8],
}

/// A transport-agnostic RPC call session.
pub trait RpcCaller {
    /// Start a transaction, claiming the session's request buffer.
    /// Returns a writable view sized exactly `req_len`.
    fn begin(&mut self, req_len: usize) -> Result<(CallHandle, &mut [u8]), CallerError>;

    /// Deliver the request and block until the response arrives.
    /// Valid only for the handle returned by the most recent `begin`.
    fn invoke(&mut self, handle: CallHandle, opcode: u32) -> Result<CallOutcome<'_>, CallerError>;

    /// Release the transaction slot. Buffer contents are no longer
    /// guaranteed preserved. Calling `end` without a matching transaction
    /// is a no-op, never a fault.
    fn end(&mut self, handle: CallHandle);

    /// The parameter encoding this session was constructed with.
    fn encoding(&self) -> u32;
}

// ── Shared transaction state machine ──────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxnState {
    Idle,
    /// `begin` has claimed the request buffer.
    Pending { handle: CallHandle, req_len: usize },
    /// `invoke` has completed; the response view is live until `end`.
    Done { handle: CallHandle },
}

/// At-most-one-transaction bookkeeping shared by every concrete caller.
#[derive(Debug)]
pub(crate) struct Transaction {
    state: TxnState,
    next_handle: CallHandle,
}

impl Transaction {
    pub(crate) fn new() -> Self {
        Self {
            state: TxnState::Idle,
            next_handle: 1,
        }
    }

    /// Claim the transaction slot for a request of `req_len` bytes.
    pub(crate) fn begin(
        &mut self,
        req_len: usize,
        capacity: usize,
    ) -> Result<CallHandle, CallerError> {
        if self.state != TxnState::Idle || req_len > capacity {
            return Err(CallerError::NoBufferAvailable);
        }

        let handle = self.next_handle;
        // Skip 0 on wrap so a zero handle can never name a transaction.
        self.next_handle = match self.next_handle.wrapping_add(1) {
            0 => 1,
            h => h,
        };

        self.state = TxnState::Pending { handle, req_len };
        Ok(handle)
    }

    /// Transition Pending -> Done for `invoke`; yields the request length
    /// declared at `begin`.
    pub(crate) fn take_for_invoke(&mut self, handle: CallHandle) -> Result<usize, CallerError> {
        match self.state {
            TxnState::Pending { handle: h, req_len } if h == handle => {
                self.state = TxnState::Done { handle };
                Ok(req_len)
            }
            _ => Err(CallerError::InvalidTransaction),
        }
    }

    /// Release the slot if `handle` names the active transaction.
    pub(crate) fn end(&mut self, handle: CallHandle) {
        match self.state {
            TxnState::Pending { handle: h, .. } | TxnState::Done { handle: h } if h == handle => {
                self.state = TxnState::Idle;
            }
            // No matching transaction: a no-op by contract.
            _ => {}
        }
    }
}
