use std::path::PathBuf;

use tracing::info;

use crate::bot_id::BotId;
use crate::error::{Error, Result};
use crate::ipfs::{ContentStore, IpfsGateway};
use crate::keystore::DeployKey;
use crate::manifest::{
    manifest_path_or_default, read_documentation, validate_image_reference, BotManifest, Manifest,
};
use crate::network::Environment;

use super::load_deploy_key;

#[derive(Debug, Clone, Default)]
pub struct Params {
    /// Accepted so every network-facing command takes `--env`; it is
    /// validated and logged but uploads go to `ipfs_gateway` regardless.
    pub environment: String,
    pub key_dir_path: PathBuf,
    pub passphrase: String,
    pub bot_manifest_path: PathBuf,
    pub ipfs_gateway: String,
    pub doc_file_path: PathBuf,
    /// Container image reference pinned by digest.
    pub image: String,
    /// Overrides the manifest's `botId` when non-empty.
    pub bot_id: String,
}

/// What `publish-metadata` uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub bot_id: BotId,
    pub documentation_cid: String,
    /// CID of the signed manifest; pass it to `publish --manifest`.
    pub metadata_cid: String,
}

/// Upload the documentation and signed manifest through `params.ipfs_gateway`.
///
/// Nothing here touches the chain, so the environment only has to parse.
pub fn run(params: &Params) -> Result<Output> {
    let environment: Environment = params.environment.parse()?;
    let key = load_deploy_key(&params.key_dir_path, &params.passphrase)?;
    let store = IpfsGateway::new(&params.ipfs_gateway)?;
    info!(%environment, gateway = %store.base_url(), "publishing bot metadata");
    run_with(params, &key, &store)
}

pub fn run_with<S: ContentStore>(params: &Params, key: &DeployKey, store: &S) -> Result<Output> {
    let manifest_path = manifest_path_or_default(&params.bot_manifest_path);
    let bot_manifest = BotManifest::load(&manifest_path)?;

    let bot_id = if params.bot_id.trim().is_empty() {
        bot_manifest
            .declared_bot_id(&manifest_path)?
            .ok_or_else(|| Error::MissingBotId {
                path: manifest_path.clone(),
            })?
    } else {
        params.bot_id.parse()?
    };

    validate_image_reference(&params.image)?;
    let documentation = read_documentation(&params.doc_file_path)?;

    let doc_name = params
        .doc_file_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "README.md".to_string());
    let documentation_cid = store.add(&doc_name, &documentation)?;

    let signed = Manifest::build(
        &bot_manifest,
        key.address(),
        bot_id,
        &params.image,
        &documentation_cid,
    )
    .sign(key.signing_key())?;
    let metadata_cid = store.add("manifest.json", &signed.to_json()?)?;

    info!(
        bot_id = %bot_id,
        metadata = %metadata_cid,
        documentation = %documentation_cid,
        "bot metadata published"
    );
    Ok(Output {
        bot_id,
        documentation_cid,
        metadata_cid,
    })
}
