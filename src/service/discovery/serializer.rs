//! Discovery response serializers, one per parameter encoding.
//!
//! The packed layout is the fixed little-endian struct documented in the
//! external interface: `interface_id u16 | instance u16 | max_payload u32 |
//! supported_encodings u32`. The postcard layout is the serde derivation
//! of [`ServiceInfo`].

use crate::buffer::CallBuffer;
use crate::error::{RpcError, RpcResult};

use super::ServiceInfo;

/// Packed response size on the wire.
pub const PACKED_SERVICE_INFO_LEN: usize = 12;

/// Encodes/decodes the `GET_SERVICE_INFO` response in one encoding.
/// Both directions live here so clients and providers cannot drift apart.
pub trait DiscoverySerializer: Sync {
    fn serialize_service_info(&self, resp: &mut CallBuffer<'_>, info: &ServiceInfo) -> RpcResult;
    fn deserialize_service_info(&self, resp: &[u8]) -> Result<ServiceInfo, RpcError>;
}

// ── Packed (encoding 0) ───────────────────────────────────────

pub struct PackedDiscoverySerializer;

impl DiscoverySerializer for PackedDiscoverySerializer {
    fn serialize_service_info(&self, resp: &mut CallBuffer<'_>, info: &ServiceInfo) -> RpcResult {
        let out = resp.writable();
        if out.len() < PACKED_SERVICE_INFO_LEN {
            return Err(RpcError::InvalidResponseBody);
        }
        out[0..2].copy_from_slice(&info.interface_id.to_le_bytes());
        out[2..4].copy_from_slice(&info.instance.to_le_bytes());
        out[4..8].copy_from_slice(&info.max_payload.to_le_bytes());
        out[8..12].copy_from_slice(&info.supported_encodings.to_le_bytes());
        resp.set_used(PACKED_SERVICE_INFO_LEN)
            .map_err(|_| RpcError::InvalidResponseBody)
    }

    fn deserialize_service_info(&self, resp: &[u8]) -> Result<ServiceInfo, RpcError> {
        if resp.len() < PACKED_SERVICE_INFO_LEN {
            return Err(RpcError::InvalidResponseBody);
        }
        Ok(ServiceInfo {
            interface_id: u16::from_le_bytes(resp[0..2].try_into().unwrap_or([0; 2])),
            instance: u16::from_le_bytes(resp[2..4].try_into().unwrap_or([0; 2])),
            max_payload: u32::from_le_bytes(resp[4..8].try_into().unwrap_or([0; 4])),
            supported_encodings: u32::from_le_bytes(resp[8..12].try_into().unwrap_or([0; 4])),
        })
    }
}

// ── Postcard (encoding 1) ─────────────────────────────────────

pub struct PostcardDiscoverySerializer;

impl DiscoverySerializer for PostcardDiscoverySerializer {
    fn serialize_service_info(&self, resp: &mut CallBuffer<'_>, info: &ServiceInfo) -> RpcResult {
        let used = postcard::to_slice(info, resp.writable())
            .map_err(|_| RpcError::InvalidResponseBody)?
            .len();
        resp.set_used(used).map_err(|_| RpcError::InvalidResponseBody)
    }

    fn deserialize_service_info(&self, resp: &[u8]) -> Result<ServiceInfo, RpcError> {
        postcard::from_bytes(resp).map_err(|_| RpcError::InvalidResponseBody)
    }
}
