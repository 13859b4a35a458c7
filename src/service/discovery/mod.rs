//! Discovery service.
//!
//! Every deployed provider answers a fixed `GET_SERVICE_INFO` opcode so a
//! client can learn, once per session, what it is talking to: interface
//! identity, instance, the largest payload the endpoint accepts and a
//! bitmask of supported parameter encodings. The provider is normally
//! chained in front of a concrete service with
//! [`crate::endpoint::EndpointChain`].
//!
//! The remaining fixed discovery opcodes are recognised but not backed by
//! an operation here; they answer with operation status
//! [`status::NOT_SUPPORTED`] and transport status accepted, which is what
//! lets newer clients probe older deployments safely.

use log::info;
use serde::{Deserialize, Serialize};

use crate::call::{CallRequest, ENCODING_LIMIT};
use crate::config::DeploymentConfig;
use crate::endpoint::{CallEndpoint, DispatchTable, ServiceHandler};
use crate::error::{RpcError, RpcResult};
use crate::service::status;

pub mod client;
pub mod serializer;

pub use client::DiscoveryClient;

// ── Opcodes ───────────────────────────────────────────────────

pub mod opcode {
    pub const GET_SERVICE_INFO: u32 = 0x0001;
    pub const GET_PROVIDER_INFO: u32 = 0x0002;
    pub const GET_SERVICE_CAPS: u32 = 0x0003;
}

// ── Service info ──────────────────────────────────────────────

/// What a provider reports about itself during session setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub interface_id: u16,
    pub instance: u16,
    /// Largest request payload the endpoint accepts, in bytes.
    pub max_payload: u32,
    /// Bit `e` set means parameter encoding `e` is supported.
    pub supported_encodings: u32,
}

// ── Provider ──────────────────────────────────────────────────

/// Answers the discovery opcodes for one deployed endpoint.
pub struct DiscoveryProvider {
    config: DeploymentConfig,
    supported_encodings: u32,
    serializers: [Option<&'static dyn serializer::DiscoverySerializer>; ENCODING_LIMIT],
}

static DISPATCH: DispatchTable<DiscoveryProvider> = DispatchTable::new(&[
    ServiceHandler {
        opcode: opcode::GET_SERVICE_INFO,
        invoke: get_service_info_handler,
    },
    ServiceHandler {
        opcode: opcode::GET_PROVIDER_INFO,
        invoke: not_supported_handler,
    },
    ServiceHandler {
        opcode: opcode::GET_SERVICE_CAPS,
        invoke: not_supported_handler,
    },
]);

impl DiscoveryProvider {
    /// `config` must have been validated by the deployment wiring.
    pub fn new(config: DeploymentConfig) -> Self {
        Self {
            config,
            supported_encodings: 0,
            serializers: [None; ENCODING_LIMIT],
        }
    }

    /// Register a serializer so discovery itself can answer in `encoding`.
    pub fn register_serializer(
        &mut self,
        encoding: u32,
        serializer: &'static dyn serializer::DiscoverySerializer,
    ) {
        if (encoding as usize) < ENCODING_LIMIT {
            self.serializers[encoding as usize] = Some(serializer);
        }
    }

    /// Advertise that the service behind this endpoint accepts `encoding`.
    /// Kept separate from [`Self::register_serializer`]: the bitmask
    /// describes the backing service, not the discovery opcodes.
    pub fn register_supported_encoding(&mut self, encoding: u32) {
        if (encoding as usize) < ENCODING_LIMIT {
            self.supported_encodings |= 1 << encoding;
        }
    }

    fn serializer(&self, encoding: u32) -> Option<&'static dyn serializer::DiscoverySerializer> {
        if (encoding as usize) < ENCODING_LIMIT {
            self.serializers[encoding as usize]
        } else {
            None
        }
    }

    /// The advertised payload limit: an explicit deployment override, or
    /// the tighter of the two call buffers the session actually has.
    fn max_payload(&self, req: &CallRequest<'_>) -> u32 {
        if self.config.max_payload_override != 0 {
            self.config.max_payload_override
        } else {
            req.request.capacity().min(req.response.capacity()) as u32
        }
    }
}

impl CallEndpoint for DiscoveryProvider {
    fn receive(&mut self, req: &mut CallRequest<'_>) -> RpcResult {
        DISPATCH.dispatch(self, req)
    }
}

fn get_service_info_handler(
    provider: &mut DiscoveryProvider,
    req: &mut CallRequest<'_>,
) -> RpcResult {
    let serializer = provider
        .serializer(req.encoding)
        .ok_or(RpcError::SerializationNotSupported)?;

    let info = ServiceInfo {
        interface_id: provider.config.interface_id,
        instance: provider.config.instance,
        max_payload: provider.max_payload(req),
        supported_encodings: provider.supported_encodings,
    };

    info!(
        "rpc[{}]: service info: interface {:#06x} instance {}",
        req.caller_id, info.interface_id, info.instance
    );

    serializer.serialize_service_info(&mut req.response, &info)?;
    req.set_op_status(status::SUCCESS);
    Ok(())
}

fn not_supported_handler(_provider: &mut DiscoveryProvider, req: &mut CallRequest<'_>) -> RpcResult {
    req.set_op_status(status::NOT_SUPPORTED);
    Ok(())
}
