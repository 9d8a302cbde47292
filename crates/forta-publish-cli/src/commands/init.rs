//! `init`: create the deploy key.

use anyhow::{Context, Result};

use forta_publish_lib::commands::initialize;

use crate::cli::KeyArgs;
use crate::output::Report;

pub fn handle_init(key: &KeyArgs) -> Result<()> {
    let params = initialize::Params {
        key_dir_path: key.key_dir_path(),
        passphrase: key.passphrase.clone(),
    };
    let address = initialize::run(&params).context("failed to create the deploy key")?;

    Report::new("deploy key created")
        .field("address", address)
        .print();
    Ok(())
}
