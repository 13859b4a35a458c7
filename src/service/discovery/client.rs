//! Client-side discovery.
//!
//! Called once after opening a session, before any real requests; the
//! result is cached for the session's lifetime so repeated lookups cost
//! nothing.

use core::fmt;

use crate::call::{ENCODING_PACKED, ENCODING_POSTCARD};
use crate::caller::{CallerError, RpcCaller};
use crate::service::status;

use super::opcode;
use super::serializer::{
    DiscoverySerializer, PackedDiscoverySerializer, PostcardDiscoverySerializer,
};
use super::ServiceInfo;

/// Errors from a discovery exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryError {
    /// The call itself failed at the RPC level.
    Call(CallerError),
    /// The provider answered, but the operation failed with this status.
    Operation(i32),
    /// The session's encoding has no discovery serializer on this side.
    UnsupportedEncoding,
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call(e) => write!(f, "discovery call failed: {e}"),
            Self::Operation(code) => write!(f, "discovery rejected: op status {code}"),
            Self::UnsupportedEncoding => write!(f, "no serializer for session encoding"),
        }
    }
}

impl From<CallerError> for DiscoveryError {
    fn from(e: CallerError) -> Self {
        Self::Call(e)
    }
}

/// Session-scoped discovery cache.
#[derive(Default)]
pub struct DiscoveryClient {
    cached: Option<ServiceInfo>,
}

impl DiscoveryClient {
    pub fn new() -> Self {
        Self { cached: None }
    }

    /// The service info for the endpoint behind `caller`, fetched on
    /// first use and cached afterwards.
    pub fn service_info(
        &mut self,
        caller: &mut dyn RpcCaller,
    ) -> Result<ServiceInfo, DiscoveryError> {
        if let Some(info) = self.cached {
            return Ok(info);
        }

        let serializer = serializer_for(caller.encoding())
            .ok_or(DiscoveryError::UnsupportedEncoding)?;

        // GET_SERVICE_INFO carries no request parameters.
        let (handle, _) = caller.begin(0)?;
        let result = match caller.invoke(handle, opcode::GET_SERVICE_INFO) {
            Ok(outcome) => match outcome.op_status {
                Some(status::SUCCESS) => serializer
                    .deserialize_service_info(outcome.response)
                    .map_err(|e| DiscoveryError::Call(CallerError::Transport(e))),
                other => Err(DiscoveryError::Operation(other.unwrap_or(status::INTERNAL))),
            },
            Err(e) => Err(DiscoveryError::Call(e)),
        };
        caller.end(handle);

        let info = result?;
        self.cached = Some(info);
        Ok(info)
    }
}

fn serializer_for(encoding: u32) -> Option<&'static dyn DiscoverySerializer> {
    match encoding {
        ENCODING_PACKED => Some(&PackedDiscoverySerializer),
        ENCODING_POSTCARD => Some(&PostcardDiscoverySerializer),
        _ => None,
    }
}
