use std::path::PathBuf;

use tracing::info;

use crate::bot_id::BotId;
use crate::error::{Error, Result};
use crate::ipfs::{ContentStore, IpfsGateway};
use crate::keystore::DeployKey;
use crate::manifest::SignedManifest;
use crate::network::NetworkConfig;
use crate::registry::{create_agent_call, update_agent_call, BotRegistry};
use crate::rpc::{EthRpc, HttpRpc};
use crate::tx::{parse_gas_price, TxSender};

#[derive(Debug, Clone, Default)]
pub struct Params {
    pub environment: String,
    pub key_dir_path: PathBuf,
    pub passphrase: String,
    /// CID of the signed manifest produced by `publish-metadata`.
    pub manifest: String,
    pub ipfs_gateway: String,
    /// Empty to use the node's gas price.
    pub gas_price: String,
}

/// Whether the registry entry was created or updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishAction {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub bot_id: BotId,
    pub action: PublishAction,
    pub tx_hash: String,
}

pub fn run(params: &Params) -> Result<Output> {
    let network = NetworkConfig::for_env_name(&params.environment)?;
    let gas_price = parse_gas_price(&params.gas_price)?;
    let key = super::load_deploy_key(&params.key_dir_path, &params.passphrase)?;
    let rpc = HttpRpc::new(&network.rpc_url)?;
    let store = IpfsGateway::new(&params.ipfs_gateway)?;
    info!(
        environment = %network.environment,
        rpc = %rpc.url(),
        registry = %network.registry,
        "publishing bot"
    );
    run_with(params, &key, &network, &rpc, &store, gas_price)
}

pub fn run_with<R: EthRpc, S: ContentStore>(
    params: &Params,
    key: &DeployKey,
    network: &NetworkConfig,
    rpc: &R,
    store: &S,
    gas_price: Option<u128>,
) -> Result<Output> {
    let cid = params.manifest.trim();
    if cid.is_empty() {
        return Err(Error::InvalidManifest {
            path: PathBuf::from(&params.manifest),
            message: "expected the metadata CID printed by publish-metadata".to_string(),
        });
    }

    let signed = SignedManifest::from_json(&store.cat(cid)?)?;
    let signer = signed.verify()?;
    if signer != key.address() {
        return Err(Error::ManifestSignerMismatch {
            signer: signer.to_string(),
            expected: key.address().to_string(),
        });
    }

    let manifest = &signed.manifest;
    let bot_id = manifest.agent_id_hash;
    let registry = BotRegistry::new(rpc, network.registry);

    let (action, data) = if registry.is_created(bot_id)? {
        let owner = registry.owner_of(bot_id)?;
        if owner != key.address() {
            return Err(Error::NotBotOwner {
                bot_id: bot_id.to_string(),
                owner: owner.to_string(),
                signer: key.address().to_string(),
            });
        }
        (
            PublishAction::Updated,
            update_agent_call(bot_id, cid, &manifest.chain_ids),
        )
    } else {
        (
            PublishAction::Created,
            create_agent_call(bot_id, key.address(), cid, &manifest.chain_ids),
        )
    };

    let label = match action {
        PublishAction::Created => "create bot",
        PublishAction::Updated => "update bot",
    };
    let outcome = TxSender::new(rpc, key, network.chain_id)
        .with_gas_price(gas_price)
        .send(network.registry, data, label)?;

    info!(bot_id = %bot_id, action = label, tx_hash = %outcome.tx_hash, "bot published");
    Ok(Output {
        bot_id,
        action,
        tx_hash: outcome.tx_hash,
    })
}
