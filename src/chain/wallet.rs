//! Wallet management and transaction signing.
//!
//! # Security
//! - The private key is loaded once at startup, from an environment variable
//! - Keys are never logged, serialized, or returned from any API
//! - The nonce counter is the single shared mutable resource of a signer:
//!   two in-flight transactions must never reuse a nonce

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::chain::types::{ChainError, ChainResult};

/// Environment variable name for the oracle signing key.
pub const PRIVATE_KEY_ENV_VAR: &str = "ORACLE_PRIVATE_KEY";

/// Signing identity with nonce management.
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Highest nonce handed out so far, shared across clones.
    nonce: Arc<AtomicU64>,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string
    /// (with or without 0x prefix). The key is never logged.
    pub fn from_private_key(private_key_hex: &str) -> ChainResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| ChainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), "Wallet initialized");

        Ok(Self {
            signer,
            nonce: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Load the wallet from `ORACLE_PRIVATE_KEY`.
    pub fn from_env() -> ChainResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            ChainError::Wallet(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Access the signer for transaction building.
    pub(crate) fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// Reserve the next nonce, given the sender's current nonce as reported
    /// by the chain.
    ///
    /// The counter only moves forward: `fetch_max` folds in the chain view,
    /// `fetch_add` hands out a value no concurrent caller can see again.
    pub fn reserve_nonce(&self, chain_nonce: u64) -> u64 {
        self.nonce.fetch_max(chain_nonce, Ordering::SeqCst);
        self.nonce.fetch_add(1, Ordering::SeqCst)
    }

    /// Hand back a reserved nonce that never reached the network, so the
    /// next reservation can reuse it instead of sitting one ahead of the
    /// chain forever.
    ///
    /// Succeeds only while no later reservation has been made; returns
    /// whether the counter was rolled back.
    pub fn unreserve_nonce(&self, nonce: u64) -> bool {
        self.nonce
            .compare_exchange(nonce + 1, nonce, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Current nonce without reserving.
    pub fn current_nonce(&self) -> u64 {
        self.nonce.load(Ordering::SeqCst)
    }
}

impl Clone for Wallet {
    fn clone(&self) -> Self {
        Self {
            signer: self.signer.clone(),
            nonce: self.nonce.clone(),
        }
    }
}

// Manual Debug: never expose key material.
impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.signer.address())
            .field("nonce", &self.current_nonce())
            .finish()
    }
}
