//! Service providers built on the RPC core.
//!
//! Each provider is a [`crate::endpoint::CallEndpoint`] with a static
//! dispatch table and, where the service needs multi-step operations, a
//! bounded context pool. Providers compose through
//! [`crate::endpoint::EndpointChain`]; the discovery provider is chained
//! in front of every deployed service so session setup looks the same
//! everywhere.

pub mod crypto;
pub mod discovery;
pub mod status;
