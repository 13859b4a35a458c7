//! Operation status codes shared by the bundled service providers.
//!
//! This is the second of the two error channels: a handler that parsed its
//! parameters reports the outcome of the operation itself through one of
//! these codes, with transport status "accepted". Providers built outside
//! this crate may use any `i32` domain they wish; the RPC layer carries
//! the value opaquely.

/// The operation completed.
pub const SUCCESS: i32 = 0;

/// The operation or algorithm is not supported by this provider.
pub const NOT_SUPPORTED: i32 = -1;

/// The referenced operation context does not exist for this caller, or is
/// not in a state that permits the request.
pub const BAD_STATE: i32 = -2;

/// A request parameter was decoded but rejected.
pub const INVALID_ARGUMENT: i32 = -3;

/// The provider failed internally after accepting the parameters.
pub const INTERNAL: i32 = -4;
