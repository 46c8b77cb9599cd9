//! Chain RPC client: connection, signer, and low-level read state.
//!
//! # Responsibilities
//! - Connect to a JSON-RPC endpoint and verify liveness + chain ID
//! - Hold the optional signing identity used for all writes
//! - Query chain state (block number, balances, nonces, gas price, receipts)
//! - Enforce a timeout on every RPC round trip
//!
//! Contract loading and call dispatch live in `contract.rs`; this file is
//! the transport layer underneath them.

use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::chain::contract::LoadedContract;
use crate::chain::types::{
    transport_error, ChainConfig, ChainError, ChainResult, TxReceipt,
};
use crate::chain::wallet::Wallet;

/// Single abstraction point for every on-chain interaction.
///
/// Created once at startup via [`ChainClient::connect`]; the RPC connection
/// is long-lived process-wide state with no per-call reconnect.
pub struct ChainClient {
    provider: Arc<dyn Provider + Send + Sync>,
    config: ChainConfig,
    /// Chain ID resolved from the endpoint at connect time.
    chain_id: u64,
    wallet: Option<Wallet>,
    pub(crate) contract: Option<LoadedContract>,
}

impl ChainClient {
    /// Connect to the configured RPC endpoint and verify it is live.
    ///
    /// Resolves and caches the chain ID; fails with
    /// [`ChainError::Connectivity`] if the endpoint is unreachable and with
    /// [`ChainError::ChainMismatch`] if it serves a different chain than
    /// configured. If a wallet is supplied, its address becomes the sender
    /// for all subsequent writes.
    pub async fn connect(config: ChainConfig, wallet: Option<Wallet>) -> ChainResult<Self> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            ChainError::Connectivity(format!("invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        let provider =
            Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>;

        let client = Self {
            provider,
            config,
            chain_id: 0,
            wallet,
            contract: None,
        };

        // Liveness probe doubles as chain ID resolution.
        let chain_id = client.fetch_chain_id().await?;
        if client.config.chain_id != 0 && chain_id != client.config.chain_id {
            return Err(ChainError::ChainMismatch {
                expected: client.config.chain_id,
                actual: chain_id,
            });
        }

        let client = Self { chain_id, ..client };

        tracing::info!(
            rpc_url = %client.config.rpc_url,
            chain_id = client.chain_id,
            signer = client.wallet.as_ref().map(|w| w.address().to_string()),
            "Chain client connected"
        );

        Ok(client)
    }

    /// Build a client without probing the endpoint. Unit-test seam only;
    /// production code goes through [`ChainClient::connect`].
    #[cfg(test)]
    pub(crate) fn connect_lazy(config: ChainConfig, wallet: Option<Wallet>) -> Self {
        let url: url::Url = config.rpc_url.parse().expect("test RPC URL");
        Self {
            provider: Arc::new(ProviderBuilder::new().connect_http(url))
                as Arc<dyn Provider + Send + Sync>,
            chain_id: config.chain_id,
            config,
            wallet,
            contract: None,
        }
    }

    /// Build a client over a scripted transport. Unit-test seam only.
    #[cfg(test)]
    pub(crate) fn connect_mocked(
        config: ChainConfig,
        wallet: Option<Wallet>,
        asserter: alloy::providers::mock::Asserter,
    ) -> Self {
        Self {
            provider: Arc::new(ProviderBuilder::new().connect_mocked_client(asserter))
                as Arc<dyn Provider + Send + Sync>,
            chain_id: config.chain_id,
            config,
            wallet,
            contract: None,
        }
    }

    async fn fetch_chain_id(&self) -> ChainResult<u64> {
        match timeout(self.rpc_timeout(), self.provider.get_chain_id()).await {
            Ok(Ok(id)) => Ok(id),
            Ok(Err(e)) => Err(ChainError::Connectivity(e.to_string())),
            Err(_) => Err(self.rpc_timed_out()),
        }
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> ChainResult<u64> {
        match timeout(self.rpc_timeout(), self.provider.get_block_number()).await {
            Ok(Ok(block)) => Ok(block),
            Ok(Err(e)) => Err(transport_error(e)),
            Err(_) => Err(self.rpc_timed_out()),
        }
    }

    /// Get the native-currency balance in wei for the given address, or the
    /// configured signer's address if omitted.
    pub async fn get_balance(&self, address: Option<Address>) -> ChainResult<U256> {
        let address = match address {
            Some(a) => a,
            None => self.signer_address().ok_or(ChainError::NoSigner)?,
        };
        match timeout(self.rpc_timeout(), self.provider.get_balance(address)).await {
            Ok(Ok(balance)) => Ok(balance),
            Ok(Err(e)) => Err(transport_error(e)),
            Err(_) => Err(self.rpc_timed_out()),
        }
    }

    /// Get the transaction count (next nonce) for an address.
    pub async fn get_nonce(&self, address: Address) -> ChainResult<u64> {
        match timeout(
            self.rpc_timeout(),
            self.provider.get_transaction_count(address),
        )
        .await
        {
            Ok(Ok(nonce)) => Ok(nonce),
            Ok(Err(e)) => Err(transport_error(e)),
            Err(_) => Err(self.rpc_timed_out()),
        }
    }

    /// Get the current network gas price in wei.
    pub async fn get_gas_price(&self) -> ChainResult<u128> {
        match timeout(self.rpc_timeout(), self.provider.get_gas_price()).await {
            Ok(Ok(price)) => Ok(price),
            Ok(Err(e)) => Err(transport_error(e)),
            Err(_) => Err(self.rpc_timed_out()),
        }
    }

    /// Fetch the receipt of a previously submitted transaction and map its
    /// status bit: 1 → Success, 0 → Failed.
    ///
    /// Fails with [`ChainError::NotFound`] if the node does not know the
    /// hash (not yet mined, or a different chain). Callers use this to
    /// reconcile a write that timed out with an unknown outcome.
    pub async fn get_transaction_status(&self, tx_hash: TxHash) -> ChainResult<TxReceipt> {
        let receipt = match timeout(
            self.rpc_timeout(),
            self.provider.get_transaction_receipt(tx_hash),
        )
        .await
        {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) => return Err(transport_error(e)),
            Err(_) => return Err(self.rpc_timed_out()),
        };

        match receipt {
            Some(r) => Ok(TxReceipt::from_rpc(&r)),
            None => Err(ChainError::NotFound(tx_hash)),
        }
    }

    /// Current gas price with the configured safety multiplier applied,
    /// rejected if it exceeds the configured gwei ceiling.
    pub(crate) async fn fee_per_gas(&self) -> ChainResult<u128> {
        let gas_price = self.get_gas_price().await?;
        let gas_price_gwei = gas_price / 1_000_000_000;

        if gas_price_gwei > self.config.max_gas_price_gwei as u128 {
            return Err(ChainError::GasPriceTooHigh {
                current_gwei: gas_price_gwei as u64,
                max_gwei: self.config.max_gas_price_gwei,
            });
        }

        Ok((gas_price as f64 * self.config.gas_price_multiplier) as u128)
    }

    /// Address of the configured signer, if any.
    pub fn signer_address(&self) -> Option<Address> {
        self.wallet.as_ref().map(|w| w.address())
    }

    /// The wallet, for operations that must sign.
    pub(crate) fn wallet(&self) -> ChainResult<&Wallet> {
        self.wallet.as_ref().ok_or(ChainError::NoSigner)
    }

    pub(crate) fn provider(&self) -> &(dyn Provider + Send + Sync) {
        self.provider.as_ref()
    }

    /// Chain ID resolved at connect time.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub(crate) fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.config.rpc_timeout_secs)
    }

    pub(crate) fn rpc_timed_out(&self) -> ChainError {
        ChainError::Timeout {
            seconds: self.config.rpc_timeout_secs,
            tx_hash: None,
        }
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.chain_id)
            .field("signer", &self.signer_address())
            .field("contract", &self.contract.as_ref().map(|c| c.address()))
            .finish()
    }
}
