//! Handlers behind each CLI subcommand.
//!
//! Every handler takes a flat `Params` struct built from command-line flags.
//! `run` wires up the real key store, RPC endpoint and IPFS gateway;
//! `run_with` takes them as arguments so flows can be exercised in tests.

pub mod generate_id;
pub mod initialize;
pub mod publish;
pub mod publish_metadata;
pub mod set_enable;
pub mod transfer;

use std::path::Path;

use crate::error::Result;
use crate::keystore::{DeployKey, KeyStore};
use crate::paths::resolve_key_dir;

/// Load the deploy key from `key_dir`, or from the default location when it is empty.
pub(crate) fn load_deploy_key(key_dir: &Path, passphrase: &str) -> Result<DeployKey> {
    let dir = resolve_key_dir(Some(key_dir))?;
    KeyStore::new(dir).load(passphrase)
}
