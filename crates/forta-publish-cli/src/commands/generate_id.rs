//! `generate-id`: print a fresh bot ID.

use anyhow::{Context, Result};

use forta_publish_lib::commands::generate_id;

/// Prints only the ID so it can be captured by scripts.
pub fn handle_generate_id() -> Result<()> {
    let id = generate_id::run(&generate_id::Params::default())
        .context("failed to generate a bot ID")?;
    println!("{id}");
    Ok(())
}
