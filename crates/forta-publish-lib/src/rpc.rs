use std::cell::Cell;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::crypto::{strip_hex_prefix, Address};
use crate::error::{Error, Result};

/// Parameters of an `eth_call` or `eth_estimateGas` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub data: Vec<u8>,
}

impl CallRequest {
    fn to_json(&self) -> Value {
        let mut object = json!({
            "to": self.to.to_checksum(),
            "data": format!("0x{}", hex::encode(&self.data)),
        });
        if let Some(from) = self.from {
            object["from"] = Value::String(from.to_checksum());
        }
        object
    }
}

/// The parts of a transaction receipt the publisher cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub succeeded: bool,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
}

/// The Ethereum JSON-RPC surface used by the publisher.
pub trait EthRpc {
    fn chain_id(&self) -> Result<u64>;
    /// Pending nonce for `address`.
    fn transaction_count(&self, address: Address) -> Result<u64>;
    fn gas_price(&self) -> Result<u128>;
    fn estimate_gas(&self, request: &CallRequest) -> Result<u64>;
    fn call(&self, request: &CallRequest) -> Result<Vec<u8>>;
    /// Broadcast a signed transaction and return its hash.
    fn send_raw_transaction(&self, raw: &[u8]) -> Result<String>;
    fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<Receipt>>;
}

/// JSON-RPC 2.0 client over blocking HTTP.
pub struct HttpRpc {
    client: Client,
    url: String,
    next_id: Cell<u64>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    gas_used: Option<String>,
}

impl HttpRpc {
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            url: url.to_string(),
            next_id: Cell::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        trace!(method, id, "sending rpc request");

        let response: RpcResponse = self
            .client
            .post(&self.url)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        if let Some(error) = response.error {
            debug!(method, code = error.code, message = %error.message, "rpc returned error");
            return Err(Error::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        serde_json::from_value(response.result).map_err(|e| Error::UnexpectedRpcResponse {
            method: method.to_string(),
            message: e.to_string(),
        })
    }

    fn quantity(&self, method: &str, params: Value) -> Result<u128> {
        let raw: String = self.request(method, params)?;
        parse_quantity(method, &raw)
    }
}

impl EthRpc for HttpRpc {
    fn chain_id(&self) -> Result<u64> {
        let value = self.quantity("eth_chainId", json!([]))?;
        narrow("eth_chainId", value)
    }

    fn transaction_count(&self, address: Address) -> Result<u64> {
        let value = self.quantity(
            "eth_getTransactionCount",
            json!([address.to_checksum(), "pending"]),
        )?;
        narrow("eth_getTransactionCount", value)
    }

    fn gas_price(&self) -> Result<u128> {
        self.quantity("eth_gasPrice", json!([]))
    }

    fn estimate_gas(&self, request: &CallRequest) -> Result<u64> {
        let value = self.quantity("eth_estimateGas", json!([request.to_json()]))?;
        narrow("eth_estimateGas", value)
    }

    fn call(&self, request: &CallRequest) -> Result<Vec<u8>> {
        let raw: String = self.request("eth_call", json!([request.to_json(), "latest"]))?;
        Ok(hex::decode(strip_hex_prefix(&raw))?)
    }

    fn send_raw_transaction(&self, raw: &[u8]) -> Result<String> {
        self.request(
            "eth_sendRawTransaction",
            json!([format!("0x{}", hex::encode(raw))]),
        )
    }

    fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<Receipt>> {
        let method = "eth_getTransactionReceipt";
        let raw: Option<RawReceipt> = self.request(method, json!([tx_hash]))?;
        let Some(raw) = raw else {
            return Ok(None);
        };

        let optional = |value: Option<String>| -> Result<Option<u64>> {
            value
                .map(|v| parse_quantity(method, &v).and_then(|q| narrow(method, q)))
                .transpose()
        };
        // Pre-Byzantium receipts carry no status; treat them as mined.
        let succeeded = match raw.status.as_deref() {
            Some(status) => parse_quantity(method, status)? == 1,
            None => true,
        };

        Ok(Some(Receipt {
            succeeded,
            block_number: optional(raw.block_number)?,
            gas_used: optional(raw.gas_used)?,
        }))
    }
}

/// Parse a hex `QUANTITY` such as `0x1a`.
pub fn parse_quantity(method: &str, raw: &str) -> Result<u128> {
    let digits = strip_hex_prefix(raw.trim());
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16).map_err(|e| Error::UnexpectedRpcResponse {
        method: method.to_string(),
        message: format!("invalid quantity '{raw}': {e}"),
    })
}

fn narrow(method: &str, value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| Error::UnexpectedRpcResponse {
        method: method.to_string(),
        message: format!("quantity {value} out of range"),
    })
}

pub(crate) fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(user_agent())
        .build()
        .map_err(Error::Http)
}

fn user_agent() -> String {
    format!(
        "forta-publish-lib/{version} ({repo})",
        version = env!("CARGO_PKG_VERSION"),
        repo = "https://github.com/forta-network/forta-publish-rs"
    )
}
