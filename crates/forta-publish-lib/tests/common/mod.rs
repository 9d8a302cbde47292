//! Common test utilities: an in-memory chain and content store.
//!
//! `FakeChain` answers the registry view calls from a small bot table and
//! records every gas estimate and raw transaction so tests can assert on
//! what would have been sent.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;

use forta_publish_lib::abi::{selector, word_from_u64};
use forta_publish_lib::crypto::keccak256;
use forta_publish_lib::registry::{IS_CREATED, IS_ENABLED, OWNER_OF};
use forta_publish_lib::{
    Address, BotId, CallRequest, ContentStore, DeployKey, Environment, EthRpc, NetworkConfig,
    Receipt, Result,
};
use k256::ecdsa::SigningKey;

/// Deterministic deploy key built from a repeated byte.
#[allow(dead_code)]
pub fn test_key(byte: u8) -> DeployKey {
    DeployKey::from_signing_key(SigningKey::from_slice(&[byte; 32]).expect("valid scalar"))
}

#[allow(dead_code)]
pub fn test_network() -> NetworkConfig {
    NetworkConfig::builtin(Environment::Dev).expect("builtin network")
}

#[derive(Debug, Clone, Copy)]
pub struct BotState {
    pub owner: Address,
    pub enabled: bool,
}

#[derive(Default)]
pub struct FakeChain {
    pub bots: RefCell<HashMap<BotId, BotState>>,
    pub estimates: RefCell<Vec<CallRequest>>,
    pub sent: RefCell<Vec<Vec<u8>>>,
    pub gas_price_queries: Cell<usize>,
    pub revert: Cell<bool>,
}

#[allow(dead_code)]
impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bot(self, bot_id: BotId, owner: Address, enabled: bool) -> Self {
        self.bots
            .borrow_mut()
            .insert(bot_id, BotState { owner, enabled });
        self
    }

    /// Selector of the most recent state-changing call.
    pub fn last_selector(&self) -> Option<[u8; 4]> {
        self.estimates.borrow().last().map(|request| {
            let mut out = [0u8; 4];
            out.copy_from_slice(&request.data[..4]);
            out
        })
    }

    pub fn sent_count(&self) -> usize {
        self.sent.borrow().len()
    }
}

fn bot_id_argument(data: &[u8]) -> BotId {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&data[4..36]);
    BotId::from_bytes(bytes)
}

impl EthRpc for FakeChain {
    fn chain_id(&self) -> Result<u64> {
        Ok(80001)
    }

    fn transaction_count(&self, _address: Address) -> Result<u64> {
        Ok(self.sent.borrow().len() as u64)
    }

    fn gas_price(&self) -> Result<u128> {
        self.gas_price_queries.set(self.gas_price_queries.get() + 1);
        Ok(30_000_000_000)
    }

    fn estimate_gas(&self, request: &CallRequest) -> Result<u64> {
        self.estimates.borrow_mut().push(request.clone());
        Ok(100_000)
    }

    fn call(&self, request: &CallRequest) -> Result<Vec<u8>> {
        let bot_id = bot_id_argument(&request.data);
        let bots = self.bots.borrow();
        let state = bots.get(&bot_id);
        let function = &request.data[..4];

        if function == selector(IS_CREATED) {
            return Ok(word_from_u64(u64::from(state.is_some())).to_vec());
        }
        if function == selector(IS_ENABLED) {
            return Ok(word_from_u64(u64::from(state.is_some_and(|s| s.enabled))).to_vec());
        }
        if function == selector(OWNER_OF) {
            let state = state.ok_or_else(|| forta_publish_lib::Error::Rpc {
                code: 3,
                message: "execution reverted: ERC721: invalid token ID".to_string(),
            })?;
            let mut word = vec![0u8; 12];
            word.extend_from_slice(state.owner.as_bytes());
            return Ok(word);
        }
        Err(forta_publish_lib::Error::Rpc {
            code: -32601,
            message: "unknown view".to_string(),
        })
    }

    fn send_raw_transaction(&self, raw: &[u8]) -> Result<String> {
        self.sent.borrow_mut().push(raw.to_vec());
        Ok(format!("0x{}", hex::encode(keccak256(raw))))
    }

    fn transaction_receipt(&self, _tx_hash: &str) -> Result<Option<Receipt>> {
        Ok(Some(Receipt {
            succeeded: !self.revert.get(),
            block_number: Some(42),
            gas_used: Some(60_000),
        }))
    }
}

/// Content store backed by a hash map.
#[derive(Default)]
pub struct MemoryStore {
    pub objects: RefCell<HashMap<String, Vec<u8>>>,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.borrow().len()
    }
}

impl ContentStore for MemoryStore {
    fn add(&self, _name: &str, bytes: &[u8]) -> Result<String> {
        let cid = format!("Qm{}", &hex::encode(keccak256(bytes))[..44]);
        self.objects.borrow_mut().insert(cid.clone(), bytes.to_vec());
        Ok(cid)
    }

    fn cat(&self, cid: &str) -> Result<Vec<u8>> {
        self.objects.borrow().get(cid).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{cid} not found")).into()
        })
    }
}
