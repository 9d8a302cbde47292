//! Forta bot publishing library entry points.
//!
//! This crate holds everything the `forta-publish` CLI does: managing the
//! encrypted deploy key, uploading signed bot metadata to IPFS, and sending
//! registry transactions to register, toggle or transfer a bot. Consumers
//! should go through the handlers in [`commands`] rather than stitching the
//! lower-level modules together themselves.
//!

#![deny(warnings)]

pub mod abi;
pub mod bot_id;
pub mod commands;
pub mod crypto;
pub mod error;
pub mod ipfs;
pub mod keystore;
pub mod manifest;
pub mod network;
pub mod paths;
pub mod registry;
pub mod rlp;
pub mod rpc;
pub mod tx;

pub use bot_id::BotId;
pub use crypto::Address;
pub use error::{Error, Result};
pub use ipfs::{ContentStore, IpfsGateway};
pub use keystore::{DeployKey, KdfParams, KeyStore};
pub use manifest::{BotManifest, Manifest, SignedManifest};
pub use network::{Environment, NetworkConfig, DEFAULT_IPFS_GATEWAY};
pub use paths::{deploy_key_path, deploy_key_path_in};
pub use rpc::{CallRequest, EthRpc, HttpRpc, Receipt};
