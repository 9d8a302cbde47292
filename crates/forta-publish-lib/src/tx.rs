//! Legacy (EIP-155) transactions: building, signing and submitting.

use std::thread;
use std::time::{Duration, Instant};

use k256::ecdsa::SigningKey;
use tracing::{debug, info};

use crate::crypto::{keccak256, sign_prehash, Address};
use crate::error::{Error, Result};
use crate::keystore::DeployKey;
use crate::rlp::{self, Item};
use crate::rpc::{CallRequest, EthRpc, Receipt};

const WEI_PER_GWEI: u128 = 1_000_000_000;
const GWEI_DECIMALS: usize = 9;

/// A pre-EIP-1559 transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: Address,
    pub value: u128,
    pub data: Vec<u8>,
}

impl LegacyTransaction {
    fn base_fields(&self) -> Vec<Item> {
        vec![
            Item::uint(u128::from(self.nonce)),
            Item::uint(self.gas_price),
            Item::uint(u128::from(self.gas_limit)),
            Item::bytes(self.to.as_bytes().to_vec()),
            Item::uint(self.value),
            Item::bytes(self.data.clone()),
        ]
    }

    /// Hash signed under EIP-155 replay protection.
    pub fn signing_hash(&self, chain_id: u64) -> [u8; 32] {
        let mut fields = self.base_fields();
        fields.extend([Item::uint(u128::from(chain_id)), Item::uint(0), Item::uint(0)]);
        keccak256(rlp::encode_list(&fields))
    }

    /// RLP-encoded signed transaction ready for `eth_sendRawTransaction`.
    pub fn sign(&self, key: &SigningKey, chain_id: u64) -> Result<Vec<u8>> {
        let signature = sign_prehash(key, &self.signing_hash(chain_id))?;
        let v = u128::from(signature.recovery_id) + 35 + 2 * u128::from(chain_id);

        let mut fields = self.base_fields();
        fields.extend([
            Item::uint(v),
            Item::uint_bytes(signature.r()),
            Item::uint_bytes(signature.s()),
        ]);
        Ok(rlp::encode_list(&fields))
    }
}

/// Parse the `--gas-price` flag.
///
/// Empty means "ask the node". Plain integers are wei; a `gwei` suffix
/// accepts up to nine decimal places (`1.5gwei`).
pub fn parse_gas_price(value: &str) -> Result<Option<u128>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let invalid = || Error::InvalidGasPrice {
        value: value.to_string(),
    };

    let lower = trimmed.to_ascii_lowercase();
    if let Some(amount) = lower.strip_suffix("gwei") {
        let amount = amount.trim();
        let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.len() > GWEI_DECIMALS || !all_digits(whole) || !all_digits(fraction) {
            return Err(invalid());
        }
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let fraction: u128 = if fraction.is_empty() {
            0
        } else {
            format!("{fraction:0<width$}", width = GWEI_DECIMALS)
                .parse()
                .map_err(|_| invalid())?
        };
        return whole
            .checked_mul(WEI_PER_GWEI)
            .and_then(|wei| wei.checked_add(fraction))
            .map(Some)
            .ok_or_else(invalid);
    }

    let amount = lower.strip_suffix("wei").unwrap_or(&lower).trim();
    if !all_digits(amount) || amount.is_empty() {
        return Err(invalid());
    }
    amount.parse().map(Some).map_err(|_| invalid())
}

fn all_digits(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_digit())
}

/// Result of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome {
    pub tx_hash: String,
    pub block_number: Option<u64>,
}

/// Signs and submits transactions from a deploy key, then waits for them to be mined.
pub struct TxSender<'a, R: EthRpc> {
    rpc: &'a R,
    key: &'a DeployKey,
    chain_id: u64,
    gas_price: Option<u128>,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl<'a, R: EthRpc> TxSender<'a, R> {
    pub fn new(rpc: &'a R, key: &'a DeployKey, chain_id: u64) -> Self {
        Self {
            rpc,
            key,
            chain_id,
            gas_price: None,
            poll_interval: Duration::from_secs(2),
            receipt_timeout: Duration::from_secs(180),
        }
    }

    /// Use a fixed gas price instead of `eth_gasPrice`.
    pub fn with_gas_price(mut self, gas_price: Option<u128>) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.receipt_timeout = timeout;
        self
    }

    /// Send `data` to `to` and wait for a successful receipt.
    ///
    /// Fails with [`Error::ChainIdMismatch`] before signing when the node is
    /// on another chain than `chain_id`.
    pub fn send(&self, to: Address, data: Vec<u8>, action: &str) -> Result<TxOutcome> {
        let node_chain_id = self.rpc.chain_id()?;
        if node_chain_id != self.chain_id {
            return Err(Error::ChainIdMismatch {
                expected: self.chain_id,
                actual: node_chain_id,
            });
        }

        let from = self.key.address();
        let nonce = self.rpc.transaction_count(from)?;
        let gas_price = match self.gas_price {
            Some(price) => price,
            None => self.rpc.gas_price()?,
        };
        let estimate = self.rpc.estimate_gas(&CallRequest {
            from: Some(from),
            to,
            data: data.clone(),
        })?;
        // 20% headroom over the node's estimate.
        let gas_limit = estimate.saturating_add(estimate / 5);

        let tx = LegacyTransaction {
            nonce,
            gas_price,
            gas_limit,
            to,
            value: 0,
            data,
        };
        let raw = tx.sign(self.key.signing_key(), self.chain_id)?;
        debug!(nonce, gas_price, gas_limit, chain_id = self.chain_id, "signed transaction");

        let tx_hash = self.rpc.send_raw_transaction(&raw)?;
        info!(action, tx_hash = %tx_hash, from = %from, "submitted transaction");

        let receipt = self.wait_for_receipt(&tx_hash)?;
        if !receipt.succeeded {
            return Err(Error::TransactionReverted { tx_hash });
        }
        info!(
            action,
            tx_hash = %tx_hash,
            block = receipt.block_number.unwrap_or_default(),
            "transaction mined"
        );

        Ok(TxOutcome {
            tx_hash,
            block_number: receipt.block_number,
        })
    }

    fn wait_for_receipt(&self, tx_hash: &str) -> Result<Receipt> {
        let started = Instant::now();
        loop {
            if let Some(receipt) = self.rpc.transaction_receipt(tx_hash)? {
                return Ok(receipt);
            }
            if started.elapsed() >= self.receipt_timeout {
                return Err(Error::ReceiptTimeout {
                    tx_hash: tx_hash.to_string(),
                });
            }
            debug!(tx_hash, "waiting for receipt");
            thread::sleep(self.poll_interval);
        }
    }
}
