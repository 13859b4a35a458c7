//! TrustGate RPC runtime.
//!
//! Lets isolated security domains (a client domain and a provider domain,
//! potentially separated by a hardware trust boundary) exchange typed
//! requests and responses without a shared address space or runtime.
//!
//! ```text
//! client ─▶ caller ─▶ transport ─▶ endpoint ─▶ dispatch ─▶ handler
//!                                                  │           │
//!                                                codec    context pool
//! ```
//!
//! The core holds no heap allocations: buffers are fixed at session
//! construction and multi-step operation state lives in bounded,
//! caller-scoped context pools. Everything above the transport is
//! agnostic to whether calls move over a shared-memory direct call or a
//! message-passing transport.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unused_must_use)]

pub mod buffer;
pub mod call;
pub mod caller;
pub mod config;
pub mod context_pool;
pub mod direct;
pub mod endpoint;
pub mod error;
pub mod service;
pub mod tlv;
pub mod transport;

pub use buffer::CallBuffer;
pub use call::CallRequest;
pub use caller::{CallHandle, CallOutcome, CallerError, RpcCaller};
pub use endpoint::{CallEndpoint, EndpointChain};
pub use error::{RpcError, RpcResult};
