//! `transfer`: hand bot ownership to another address.

use anyhow::{Context, Result};

use forta_publish_lib::commands::transfer;

use crate::cli::{KeyArgs, NetworkArgs};
use crate::output::Report;

pub fn handle_transfer(network: &NetworkArgs, key: &KeyArgs, to: String) -> Result<()> {
    let params = transfer::Params {
        environment: network.environment.clone(),
        key_dir_path: key.key_dir_path(),
        passphrase: key.passphrase.clone(),
        to,
        bot_id: String::new(),
    };
    let output = transfer::run(&params).context("failed to transfer bot")?;

    Report::new("bot transferred")
        .field("bot id", output.bot_id)
        .field("from", output.from)
        .field("to", output.to)
        .field("transaction", &output.tx_hash)
        .print();
    Ok(())
}
