use std::path::{Path, PathBuf};

use tracing::info;

use crate::bot_id::BotId;
use crate::crypto::Address;
use crate::error::{Error, Result};
use crate::keystore::DeployKey;
use crate::manifest::{resolve_bot_id, DEFAULT_BOT_MANIFEST};
use crate::network::NetworkConfig;
use crate::registry::{transfer_call, BotRegistry};
use crate::rpc::{EthRpc, HttpRpc};
use crate::tx::TxSender;

#[derive(Debug, Clone, Default)]
pub struct Params {
    pub environment: String,
    pub key_dir_path: PathBuf,
    pub passphrase: String,
    /// Address of the new owner.
    pub to: String,
    /// Empty to read `botId` from `manifest.json`.
    pub bot_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub bot_id: BotId,
    pub from: Address,
    pub to: Address,
    pub tx_hash: String,
}

/// Parse the `--to` flag.
pub fn parse_recipient(value: &str) -> Result<Address> {
    if value.trim().is_empty() {
        return Err(Error::MissingRecipient);
    }
    value.parse()
}

pub fn run(params: &Params) -> Result<Output> {
    let to = parse_recipient(&params.to)?;
    let network = NetworkConfig::for_env_name(&params.environment)?;
    let bot_id = resolve_bot_id(&params.bot_id, Path::new(DEFAULT_BOT_MANIFEST))?;
    let key = super::load_deploy_key(&params.key_dir_path, &params.passphrase)?;
    let rpc = HttpRpc::new(&network.rpc_url)?;
    run_with(bot_id, to, &key, &network, &rpc)
}

pub fn run_with<R: EthRpc>(
    bot_id: BotId,
    to: Address,
    key: &DeployKey,
    network: &NetworkConfig,
    rpc: &R,
) -> Result<Output> {
    let from = key.address();
    if to == from {
        return Err(Error::TransferToSelf {
            address: from.to_string(),
        });
    }

    let registry = BotRegistry::new(rpc, network.registry);
    if !registry.is_created(bot_id)? {
        return Err(Error::BotNotRegistered {
            bot_id: bot_id.to_string(),
        });
    }
    let owner = registry.owner_of(bot_id)?;
    if owner != from {
        return Err(Error::NotBotOwner {
            bot_id: bot_id.to_string(),
            owner: owner.to_string(),
            signer: from.to_string(),
        });
    }

    let outcome = TxSender::new(rpc, key, network.chain_id).send(
        network.registry,
        transfer_call(from, to, bot_id),
        "transfer bot",
    )?;

    info!(bot_id = %bot_id, from = %from, to = %to, tx_hash = %outcome.tx_hash, "bot transferred");
    Ok(Output {
        bot_id,
        from,
        to,
        tx_hash: outcome.tx_hash,
    })
}
