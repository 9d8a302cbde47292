use std::path::PathBuf;

use tracing::info;

use crate::crypto::Address;
use crate::error::Result;
use crate::keystore::{KdfParams, KeyStore};
use crate::paths::resolve_key_dir;

#[derive(Debug, Clone, Default)]
pub struct Params {
    /// Key directory; empty means `~/.forta/.deploy-keys`.
    pub key_dir_path: PathBuf,
    pub passphrase: String,
}

/// Create a new deploy key and return its address.
pub fn run(params: &Params) -> Result<Address> {
    run_with(params, KdfParams::default())
}

pub fn run_with(params: &Params, kdf: KdfParams) -> Result<Address> {
    let dir = resolve_key_dir(Some(&params.key_dir_path))?;
    if params.passphrase.is_empty() {
        info!("no passphrase given; the deploy key will be encrypted with an empty passphrase");
    }

    let key = KeyStore::new(&dir).create(&params.passphrase, kdf)?;
    info!(
        address = %key.address(),
        dir = %dir.display(),
        "deploy key ready; fund this address before publishing"
    );
    Ok(key.address())
}
