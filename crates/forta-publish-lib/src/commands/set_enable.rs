use std::path::{Path, PathBuf};

use tracing::info;

use crate::bot_id::BotId;
use crate::error::{Error, Result};
use crate::keystore::DeployKey;
use crate::manifest::{resolve_bot_id, DEFAULT_BOT_MANIFEST};
use crate::network::NetworkConfig;
use crate::registry::{set_enabled_call, BotRegistry};
use crate::rpc::{EthRpc, HttpRpc};
use crate::tx::TxSender;

#[derive(Debug, Clone, Default)]
pub struct Params {
    pub environment: String,
    pub key_dir_path: PathBuf,
    pub passphrase: String,
    /// Empty to read `botId` from `manifest.json`.
    pub bot_id: String,
    pub enable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub bot_id: BotId,
    pub enabled: bool,
    /// `None` when the bot was already in the requested state.
    pub tx_hash: Option<String>,
}

pub fn run(params: &Params) -> Result<Output> {
    let network = NetworkConfig::for_env_name(&params.environment)?;
    let bot_id = resolve_bot_id(&params.bot_id, Path::new(DEFAULT_BOT_MANIFEST))?;
    let key = super::load_deploy_key(&params.key_dir_path, &params.passphrase)?;
    let rpc = HttpRpc::new(&network.rpc_url)?;
    run_with(params.enable, bot_id, &key, &network, &rpc)
}

pub fn run_with<R: EthRpc>(
    enable: bool,
    bot_id: BotId,
    key: &DeployKey,
    network: &NetworkConfig,
    rpc: &R,
) -> Result<Output> {
    let registry = BotRegistry::new(rpc, network.registry);
    if !registry.is_created(bot_id)? {
        return Err(Error::BotNotRegistered {
            bot_id: bot_id.to_string(),
        });
    }

    let owner = registry.owner_of(bot_id)?;
    if owner != key.address() {
        return Err(Error::NotBotOwner {
            bot_id: bot_id.to_string(),
            owner: owner.to_string(),
            signer: key.address().to_string(),
        });
    }

    let state = if enable { "enabled" } else { "disabled" };
    if registry.is_enabled(bot_id)? == enable {
        info!(bot_id = %bot_id, state, "bot already in requested state; nothing to do");
        return Ok(Output {
            bot_id,
            enabled: enable,
            tx_hash: None,
        });
    }

    let action = if enable { "enable bot" } else { "disable bot" };
    let outcome = TxSender::new(rpc, key, network.chain_id).send(
        network.registry,
        set_enabled_call(bot_id, enable),
        action,
    )?;

    info!(bot_id = %bot_id, state, tx_hash = %outcome.tx_hash, "bot state updated");
    Ok(Output {
        bot_id,
        enabled: enable,
        tx_hash: Some(outcome.tx_hash),
    })
}
