//! `enable` and `disable`.

use anyhow::{Context, Result};

use forta_publish_lib::commands::set_enable;

use crate::cli::{KeyArgs, NetworkArgs};
use crate::output::Report;

/// Toggle the bot; `bot_id` may be empty to use ./manifest.json.
pub fn handle_set_enabled(
    network: &NetworkArgs,
    key: &KeyArgs,
    bot_id: String,
    enable: bool,
) -> Result<()> {
    let verb = if enable { "enable" } else { "disable" };
    let params = set_enable::Params {
        environment: network.environment.clone(),
        key_dir_path: key.key_dir_path(),
        passphrase: key.passphrase.clone(),
        bot_id,
        enable,
    };
    let output = set_enable::run(&params).with_context(|| format!("failed to {verb} bot"))?;

    let state = if output.enabled { "enabled" } else { "disabled" };
    let report = match &output.tx_hash {
        Some(tx_hash) => Report::new(format!("bot {state}")).field("transaction", tx_hash),
        None => Report::new(format!("bot already {state}")).skipped(),
    };
    report.field("bot id", output.bot_id).print();
    Ok(())
}
