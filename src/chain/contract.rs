//! Contract loading, call dispatch, and deployment.
//!
//! # Responsibilities
//! - Pair a checksummed contract address with its interface description
//! - Resolve function names to typed call descriptors at load time, so
//!   unknown functions and read/write mismatches fail before network I/O
//! - Encode arguments, estimate gas, sign, submit, and wait for receipts
//!
//! Transaction requests are built fresh per call and never reused: the
//! nonce is resolved at build time, so a stale request is unsafe to replay.

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Function, JsonAbi, StateMutability};
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::timeout;

use crate::chain::client::ChainClient;
use crate::chain::types::{call_error, ChainError, ChainResult, TxReceipt, TxStatus};
use crate::observability::metrics;

/// A contract address paired with its validated function table.
///
/// Built once per `load_contract`; lookups are pure map reads. Overloaded
/// functions resolve to the first declaration in the interface.
pub struct LoadedContract {
    address: Address,
    functions: HashMap<String, Function>,
}

impl LoadedContract {
    fn new(address: Address, abi: &JsonAbi) -> Self {
        let mut functions = HashMap::new();
        for function in abi.functions() {
            functions
                .entry(function.name.clone())
                .or_insert_with(|| function.clone());
        }
        Self { address, functions }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn function(&self, name: &str) -> ChainResult<&Function> {
        self.functions
            .get(name)
            .ok_or_else(|| ChainError::UnknownFunction(name.to_string()))
    }
}

/// Outcome of a successful deployment.
#[derive(Debug, Clone)]
pub struct DeployedContract {
    pub address: Address,
    pub receipt: TxReceipt,
}

impl ChainClient {
    /// Load a contract instance: normalize the address to its canonical
    /// checksummed form and resolve the interface into a function table.
    ///
    /// Idempotent: loading again replaces the active contract.
    pub fn load_contract(&mut self, address: &str, abi: JsonAbi) -> ChainResult<Address> {
        let address: Address = address
            .trim()
            .parse()
            .map_err(|_| ChainError::InvalidAddress(address.to_string()))?;

        let contract = LoadedContract::new(address, &abi);
        tracing::info!(
            contract = %address,
            functions = contract.functions.len(),
            "Contract loaded"
        );
        self.contract = Some(contract);
        Ok(address)
    }

    fn loaded_contract(&self) -> ChainResult<&LoadedContract> {
        self.contract.as_ref().ok_or(ChainError::ContractNotLoaded)
    }

    /// Invoke a non-mutating contract function via a local simulated call.
    /// No transaction, no gas, no mining wait.
    pub async fn call_read(
        &self,
        function_name: &str,
        args: &[DynSolValue],
    ) -> ChainResult<Vec<DynSolValue>> {
        let contract = self.loaded_contract()?;
        let function = contract.function(function_name)?;

        if matches!(
            function.state_mutability,
            StateMutability::NonPayable | StateMutability::Payable
        ) {
            return Err(ChainError::Abi {
                function: function_name.to_string(),
                message: "state-mutating function; use call_write".to_string(),
            });
        }

        let data = encode_input(function, args)?;
        let tx = TransactionRequest::default()
            .with_to(contract.address())
            .with_input(Bytes::from(data));

        let raw = match timeout(self.rpc_timeout(), self.provider().call(tx)).await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => return Err(call_error(function_name, e)),
            Err(_) => return Err(self.rpc_timed_out()),
        };

        function.abi_decode_output(&raw).map_err(|e| ChainError::Abi {
            function: function_name.to_string(),
            message: format!("failed to decode return data: {}", e),
        })
    }

    /// Invoke a state-changing contract function: estimate gas (unless a
    /// ceiling is supplied), resolve nonce and gas price, sign, submit, and
    /// block until a receipt is available.
    ///
    /// A failed gas estimation means the call would revert; it fails fast
    /// with [`ChainError::Reverted`] before anything reaches the network and
    /// no nonce is consumed. The returned receipt's status bit is the ground
    /// truth of success: a status-0 receipt is a committed-but-failed
    /// execution, which callers must report distinctly.
    pub async fn call_write(
        &self,
        function_name: &str,
        args: &[DynSolValue],
        value: U256,
        gas_ceiling: Option<u64>,
    ) -> ChainResult<TxReceipt> {
        let contract = self.loaded_contract()?;
        let wallet = self.wallet()?;
        let function = contract.function(function_name)?;

        match function.state_mutability {
            StateMutability::Pure | StateMutability::View => {
                return Err(ChainError::Abi {
                    function: function_name.to_string(),
                    message: "read-only function; use call_read".to_string(),
                });
            }
            StateMutability::NonPayable if !value.is_zero() => {
                return Err(ChainError::Abi {
                    function: function_name.to_string(),
                    message: "function is not payable but a value was supplied".to_string(),
                });
            }
            _ => {}
        }

        let data = encode_input(function, args)?;
        let tx = TransactionRequest::default()
            .with_from(wallet.address())
            .with_to(contract.address())
            .with_value(value)
            .with_input(Bytes::from(data));

        let gas_limit = match gas_ceiling {
            Some(limit) => limit,
            None => self.estimate_gas(function_name, tx.clone()).await?,
        };

        let receipt = self
            .submit_transaction(function_name, tx, gas_limit)
            .await?;

        if receipt.status == TxStatus::Failed {
            tracing::warn!(
                function = function_name,
                tx_hash = %receipt.tx_hash,
                gas_used = receipt.gas_used,
                "Transaction mined but failed"
            );
        } else {
            tracing::info!(
                function = function_name,
                tx_hash = %receipt.tx_hash,
                block = receipt.block_number,
                gas_used = receipt.gas_used,
                "Transaction confirmed"
            );
        }

        Ok(receipt)
    }

    /// Deploy a contract: bytecode plus ABI-encoded constructor arguments.
    ///
    /// Requires a configured signer. Blocks until mined; irreversible once
    /// it is. The new address is returned alongside the receipt; the client
    /// does not switch to it automatically.
    pub async fn deploy(
        &self,
        bytecode: &str,
        abi: &JsonAbi,
        constructor_args: &[DynSolValue],
        gas_ceiling: Option<u64>,
    ) -> ChainResult<DeployedContract> {
        let wallet = self.wallet()?;

        let mut code = alloy::hex::decode(bytecode.trim_start_matches("0x")).map_err(|e| {
            ChainError::Abi {
                function: "constructor".to_string(),
                message: format!("invalid bytecode hex: {}", e),
            }
        })?;

        match (&abi.constructor, constructor_args.is_empty()) {
            (Some(constructor), _) => {
                let encoded = constructor.abi_encode_input(constructor_args).map_err(|e| {
                    ChainError::Abi {
                        function: "constructor".to_string(),
                        message: e.to_string(),
                    }
                })?;
                code.extend_from_slice(&encoded);
            }
            (None, true) => {}
            (None, false) => {
                return Err(ChainError::Abi {
                    function: "constructor".to_string(),
                    message: "constructor arguments supplied but ABI has no constructor"
                        .to_string(),
                });
            }
        }

        let tx = TransactionRequest::default()
            .with_from(wallet.address())
            .with_deploy_code(Bytes::from(code));

        let gas_limit = match gas_ceiling {
            Some(limit) => limit,
            None => self.estimate_gas("constructor", tx.clone()).await?,
        };

        let (receipt, contract_address) = self
            .submit_transaction_raw("constructor", tx, gas_limit)
            .await?;

        let address = contract_address.ok_or_else(|| ChainError::Connectivity(
            "deployment receipt carried no contract address".to_string(),
        ))?;

        tracing::info!(
            contract = %address,
            tx_hash = %receipt.tx_hash,
            gas_used = receipt.gas_used,
            "Contract deployed"
        );

        Ok(DeployedContract { address, receipt })
    }

    /// Simulate the call to size its gas. An execution error here means the
    /// call would revert on-chain; surface that without submitting.
    async fn estimate_gas(
        &self,
        function_name: &str,
        tx: TransactionRequest,
    ) -> ChainResult<u64> {
        match timeout(self.rpc_timeout(), self.provider().estimate_gas(tx)).await {
            Ok(Ok(gas)) => Ok(gas),
            Ok(Err(e)) => Err(call_error(function_name, e)),
            Err(_) => Err(self.rpc_timed_out()),
        }
    }

    async fn submit_transaction(
        &self,
        function_name: &str,
        tx: TransactionRequest,
        gas_limit: u64,
    ) -> ChainResult<TxReceipt> {
        let (receipt, _) = self
            .submit_transaction_raw(function_name, tx, gas_limit)
            .await?;
        Ok(receipt)
    }

    /// Shared submit path: fees, nonce, signature, broadcast, receipt wait.
    async fn submit_transaction_raw(
        &self,
        function_name: &str,
        tx: TransactionRequest,
        gas_limit: u64,
    ) -> ChainResult<(TxReceipt, Option<Address>)> {
        let wallet = self.wallet()?;

        let gas_price = self.fee_per_gas().await?;
        let chain_nonce = self.get_nonce(wallet.address()).await?;
        let nonce = wallet.reserve_nonce(chain_nonce);

        let tx = tx
            .with_nonce(nonce)
            .with_gas_limit(gas_limit)
            .with_gas_price(gas_price)
            .with_chain_id(self.chain_id());

        let signer = EthereumWallet::from(wallet.signer().clone());
        let envelope = match tx.build(&signer).await {
            Ok(envelope) => envelope,
            Err(e) => {
                wallet.unreserve_nonce(nonce);
                return Err(ChainError::Wallet(format!(
                    "failed to sign transaction: {}",
                    e
                )));
            }
        };

        // The hash is fixed by the signature, so it is known before the
        // broadcast and survives a timeout on the send itself.
        let tx_hash = *envelope.tx_hash();

        let pending = match timeout(
            self.rpc_timeout(),
            self.provider().send_tx_envelope(envelope),
        )
        .await
        {
            Ok(Ok(pending)) => pending,
            Ok(Err(e)) => {
                // The node rejected the submission, so the reserved nonce
                // never reached the chain; hand it back for the next write.
                wallet.unreserve_nonce(nonce);
                metrics::record_tx_failed(function_name);
                return Err(call_error(function_name, e));
            }
            Err(_) => {
                // The request may have gone out before the deadline. The
                // nonce stays reserved and the hash lets callers reconcile
                // via get_transaction_status.
                return Err(ChainError::Timeout {
                    seconds: self.config().rpc_timeout_secs,
                    tx_hash: Some(tx_hash),
                });
            }
        };
        metrics::record_tx_submitted(function_name);
        tracing::debug!(function = function_name, tx_hash = %tx_hash, nonce, "Transaction submitted");

        // The transaction is broadcast and cannot be withdrawn. A timeout
        // here leaves its outcome unknown; callers reconcile via
        // get_transaction_status rather than assuming failure.
        let wait = Duration::from_secs(self.config().tx_wait_timeout_secs);
        match timeout(wait, pending.get_receipt()).await {
            Ok(Ok(receipt)) => Ok((
                TxReceipt::from_rpc(&receipt),
                receipt.contract_address,
            )),
            Ok(Err(e)) => Err(ChainError::Connectivity(format!(
                "lost track of transaction {}: {}",
                tx_hash, e
            ))),
            Err(_) => Err(ChainError::Timeout {
                seconds: self.config().tx_wait_timeout_secs,
                tx_hash: Some(tx_hash),
            }),
        }
    }
}

fn encode_input(function: &Function, args: &[DynSolValue]) -> ChainResult<Vec<u8>> {
    function.abi_encode_input(args).map_err(|e| ChainError::Abi {
        function: function.name.clone(),
        message: e.to_string(),
    })
}
