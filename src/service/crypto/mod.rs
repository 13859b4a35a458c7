//! Crypto service provider: incremental hash and keyed MAC operations.
//!
//! This is the reference multi-step service. Each `*_SETUP` opcode parks
//! an operation in the provider's bounded context pool and hands the
//! client an opaque handle; `*_UPDATE` calls feed data in any number of
//! steps; `*_FINISH`/`*_SIGN` produce the result and release the context;
//! `*_ABORT` releases it early. The pool's triple check (slot live, owner
//! caller id, operation kind) is what stops one session from touching
//! another session's half-finished operation.
//!
//! Hashing is SHA-256 and MACs are HMAC-SHA-256, both via the
//! `hmac-sha256` backend. The MAC context buffers its key block and wipes
//! it when the context is scrubbed.

use core::mem;

use zeroize::Zeroize;

use crate::call::{CallRequest, ENCODING_LIMIT};
use crate::context_pool::{ContextPool, OperationState};
use crate::endpoint::{CallEndpoint, DispatchTable, ServiceHandler};
use crate::error::RpcResult;

pub mod serializer;

mod hash;
mod mac;

use serializer::{HashSerializer, MacSerializer};

// ── Protocol constants ────────────────────────────────────────

pub mod opcode {
    pub const HASH_SETUP: u32 = 0x0110;
    pub const HASH_UPDATE: u32 = 0x0111;
    pub const HASH_FINISH: u32 = 0x0112;
    pub const HASH_ABORT: u32 = 0x0113;

    pub const MAC_SETUP: u32 = 0x0120;
    pub const MAC_UPDATE: u32 = 0x0121;
    pub const MAC_SIGN: u32 = 0x0122;
    pub const MAC_ABORT: u32 = 0x0123;
}

/// Algorithm identifiers carried in setup requests.
pub mod alg {
    pub const SHA256: u32 = 1;
    pub const HMAC_SHA256: u32 = 2;
}

/// Context slots per provider instance. Build-time constant: exhaustion
/// is reported as a resource failure, never grown.
pub const CRYPTO_CONTEXT_POOL_SIZE: usize = 8;

/// SHA-256 digest and HMAC tag length.
pub const DIGEST_LEN: usize = 32;

/// Largest accepted MAC key: one SHA-256 block.
pub const MAC_MAX_KEY_LEN: usize = 64;

const OP_KIND_HASH: u32 = 1;
const OP_KIND_MAC: u32 = 2;

// ── Operation state ───────────────────────────────────────────

/// Running state of an incremental hash.
pub struct HashOperation {
    hash: hmac_sha256::Hash,
}

impl HashOperation {
    fn new() -> Self {
        Self {
            hash: hmac_sha256::Hash::new(),
        }
    }

    fn update(&mut self, data: &[u8]) {
        self.hash.update(data);
    }

    /// Produce the digest and rearm the state for reuse.
    fn finish(&mut self) -> [u8; DIGEST_LEN] {
        mem::replace(&mut self.hash, hmac_sha256::Hash::new()).finalize()
    }
}

/// Running state of a keyed MAC. Holds the key block for its whole
/// lifetime; the pool scrubs it before the slot is reused.
pub struct MacOperation {
    key: [u8; MAC_MAX_KEY_LEN],
    key_len: usize,
    mac: hmac_sha256::HMAC,
}

impl MacOperation {
    /// Keys must be non-empty and at most one block long.
    fn new(key: &[u8]) -> Option<Self> {
        if key.is_empty() || key.len() > MAC_MAX_KEY_LEN {
            return None;
        }
        let mut key_buf = [0u8; MAC_MAX_KEY_LEN];
        key_buf[..key.len()].copy_from_slice(key);
        Some(Self {
            key: key_buf,
            key_len: key.len(),
            mac: hmac_sha256::HMAC::new(key),
        })
    }

    fn update(&mut self, data: &[u8]) {
        self.mac.update(data);
    }

    /// Produce the tag; the context is rearmed with the buffered key.
    fn sign(&mut self) -> [u8; DIGEST_LEN] {
        let rearmed = hmac_sha256::HMAC::new(&self.key[..self.key_len]);
        mem::replace(&mut self.mac, rearmed).finalize()
    }

    /// Wipe the key block. The pad state derived from it inside the
    /// backend's HMAC value is overwritten when the slot is reassigned.
    fn wipe(&mut self) {
        self.key.zeroize();
        self.key_len = 0;
    }

    #[cfg(test)]
    fn key_block(&self) -> &[u8] {
        &self.key
    }
}

/// Union of the operation kinds sharing the provider's pool.
pub enum CryptoOperation {
    Idle,
    Hash(HashOperation),
    Mac(MacOperation),
}

impl Default for CryptoOperation {
    fn default() -> Self {
        Self::Idle
    }
}

impl OperationState for CryptoOperation {
    fn scrub(&mut self) {
        if let Self::Mac(op) = self {
            op.wipe();
        }
        *self = Self::Idle;
    }
}

// ── Provider ──────────────────────────────────────────────────

/// Crypto call endpoint with a shared context pool for hash and mac
/// operations.
pub struct CryptoProvider {
    pool: ContextPool<CryptoOperation, CRYPTO_CONTEXT_POOL_SIZE>,
    hash_serializers: [Option<&'static dyn HashSerializer>; ENCODING_LIMIT],
    mac_serializers: [Option<&'static dyn MacSerializer>; ENCODING_LIMIT],
}

static DISPATCH: DispatchTable<CryptoProvider> = DispatchTable::new(&[
    ServiceHandler { opcode: opcode::HASH_SETUP, invoke: hash::setup },
    ServiceHandler { opcode: opcode::HASH_UPDATE, invoke: hash::update },
    ServiceHandler { opcode: opcode::HASH_FINISH, invoke: hash::finish },
    ServiceHandler { opcode: opcode::HASH_ABORT, invoke: hash::abort },
    ServiceHandler { opcode: opcode::MAC_SETUP, invoke: mac::setup },
    ServiceHandler { opcode: opcode::MAC_UPDATE, invoke: mac::update },
    ServiceHandler { opcode: opcode::MAC_SIGN, invoke: mac::sign },
    ServiceHandler { opcode: opcode::MAC_ABORT, invoke: mac::abort },
]);

impl CryptoProvider {
    pub fn new() -> Self {
        Self {
            pool: ContextPool::new(),
            hash_serializers: [None; ENCODING_LIMIT],
            mac_serializers: [None; ENCODING_LIMIT],
        }
    }

    pub fn register_hash_serializer(
        &mut self,
        encoding: u32,
        serializer: &'static dyn HashSerializer,
    ) {
        if (encoding as usize) < ENCODING_LIMIT {
            self.hash_serializers[encoding as usize] = Some(serializer);
        }
    }

    pub fn register_mac_serializer(
        &mut self,
        encoding: u32,
        serializer: &'static dyn MacSerializer,
    ) {
        if (encoding as usize) < ENCODING_LIMIT {
            self.mac_serializers[encoding as usize] = Some(serializer);
        }
    }

    /// Live operation contexts, all callers. Deployment health reporting.
    pub fn live_contexts(&self) -> usize {
        self.pool.in_use()
    }

    fn hash_serializer(&self, encoding: u32) -> Option<&'static dyn HashSerializer> {
        if (encoding as usize) < ENCODING_LIMIT {
            self.hash_serializers[encoding as usize]
        } else {
            None
        }
    }

    fn mac_serializer(&self, encoding: u32) -> Option<&'static dyn MacSerializer> {
        if (encoding as usize) < ENCODING_LIMIT {
            self.mac_serializers[encoding as usize]
        } else {
            None
        }
    }
}

impl Default for CryptoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CallEndpoint for CryptoProvider {
    fn receive(&mut self, req: &mut CallRequest<'_>) -> RpcResult {
        DISPATCH.dispatch(self, req)
    }
}
