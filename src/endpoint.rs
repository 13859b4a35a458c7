//! Call endpoints and opcode dispatch.
//!
//! A [`CallEndpoint`] receives one [`CallRequest`] at a time and returns a
//! transport status. Service providers implement it by delegating to a
//! [`DispatchTable`]: a static, immutable mapping from opcode to handler
//! function, built at provider construction and searched linearly (tables
//! are small, typically well under twenty entries).
//!
//! Providers compose through [`EndpointChain`]: opcodes the primary
//! endpoint does not recognise fall through to a successor, so a base
//! service can be layered under a richer one without duplicating the
//! dispatch loop.

use log::warn;

use crate::call::CallRequest;
use crate::error::{RpcError, RpcResult};

/// Receives call requests. Providers run single-threaded to completion
/// per request; the `&mut self` receiver encodes that.
pub trait CallEndpoint {
    fn receive(&mut self, req: &mut CallRequest<'_>) -> RpcResult;
}

// ── Dispatch table ────────────────────────────────────────────

/// One opcode-to-handler mapping for provider type `P`.
pub struct ServiceHandler<P> {
    pub opcode: u32,
    pub invoke: fn(&mut P, &mut CallRequest<'_>) -> RpcResult,
}

/// Static handler table for provider type `P`. Fixed at construction,
/// never mutated.
pub struct DispatchTable<P: 'static> {
    handlers: &'static [ServiceHandler<P>],
}

impl<P> DispatchTable<P> {
    pub const fn new(handlers: &'static [ServiceHandler<P>]) -> Self {
        Self { handlers }
    }

    /// Look up the request's opcode and invoke its handler exactly once.
    ///
    /// No match: transport status [`RpcError::InvalidOpcode`]; the
    /// request's operation status is left untouched.
    pub fn dispatch(&self, provider: &mut P, req: &mut CallRequest<'_>) -> RpcResult {
        let Some(handler) = self.handlers.iter().find(|h| h.opcode == req.opcode) else {
            warn!(
                "rpc[{}]: no handler for opcode {:#06x}",
                req.caller_id, req.opcode
            );
            return Err(RpcError::InvalidOpcode);
        };

        (handler.invoke)(provider, req)
    }
}

// ── Endpoint composition ──────────────────────────────────────

/// Chains two endpoints: `InvalidOpcode` misses from `primary` are
/// forwarded to `next`; every other outcome is final.
pub struct EndpointChain<A, B> {
    primary: A,
    next: B,
}

impl<A: CallEndpoint, B: CallEndpoint> EndpointChain<A, B> {
    pub fn new(primary: A, next: B) -> Self {
        Self { primary, next }
    }

    pub fn primary(&mut self) -> &mut A {
        &mut self.primary
    }

    pub fn next(&mut self) -> &mut B {
        &mut self.next
    }
}

impl<A: CallEndpoint, B: CallEndpoint> CallEndpoint for EndpointChain<A, B> {
    fn receive(&mut self, req: &mut CallRequest<'_>) -> RpcResult {
        match self.primary.receive(req) {
            Err(RpcError::InvalidOpcode) => self.next.receive(req),
            other => other,
        }
    }
}
