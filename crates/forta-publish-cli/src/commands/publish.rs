//! `publish`: register or update the bot on chain.

use anyhow::{Context, Result};

use forta_publish_lib::commands::publish::{self, PublishAction};

use crate::cli::{KeyArgs, NetworkArgs};
use crate::output::Report;

pub fn handle_publish(
    network: &NetworkArgs,
    key: &KeyArgs,
    manifest: String,
    ipfs_gateway: String,
    gas_price: String,
) -> Result<()> {
    let params = publish::Params {
        environment: network.environment.clone(),
        key_dir_path: key.key_dir_path(),
        passphrase: key.passphrase.clone(),
        manifest,
        ipfs_gateway,
        gas_price,
    };
    let output = publish::run(&params)
        .with_context(|| format!("failed to publish bot from manifest {}", params.manifest))?;

    let heading = match output.action {
        PublishAction::Created => "bot registered",
        PublishAction::Updated => "bot updated",
    };
    Report::new(heading)
        .field("bot id", output.bot_id)
        .field("transaction", &output.tx_hash)
        .print();
    Ok(())
}
