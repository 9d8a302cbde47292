//! `publish-metadata`: upload documentation and the signed bot manifest.

use std::path::PathBuf;

use anyhow::{Context, Result};

use forta_publish_lib::commands::publish_metadata;

use crate::cli::{KeyArgs, NetworkArgs};
use crate::output::Report;

/// Flags specific to `publish-metadata`.
#[derive(Debug, Clone)]
pub struct MetadataArgs {
    pub manifest: PathBuf,
    pub image: String,
    pub doc_file: PathBuf,
    pub ipfs_gateway: String,
    pub bot_id: String,
}

pub fn handle_publish_metadata(
    network: &NetworkArgs,
    key: &KeyArgs,
    args: MetadataArgs,
) -> Result<()> {
    let params = publish_metadata::Params {
        environment: network.environment.clone(),
        key_dir_path: key.key_dir_path(),
        passphrase: key.passphrase.clone(),
        bot_manifest_path: args.manifest,
        ipfs_gateway: args.ipfs_gateway,
        doc_file_path: args.doc_file,
        image: args.image,
        bot_id: args.bot_id,
    };
    let output = publish_metadata::run(&params).with_context(|| {
        format!(
            "failed to publish metadata for {}",
            params.bot_manifest_path.display()
        )
    })?;

    Report::new("bot metadata uploaded")
        .field("bot id", output.bot_id)
        .field("documentation", &output.documentation_cid)
        .field("manifest", &output.metadata_cid)
        .print();
    Ok(())
}
