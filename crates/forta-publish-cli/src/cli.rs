//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use forta_publish_lib::manifest::DEFAULT_BOT_MANIFEST;
use forta_publish_lib::DEFAULT_IPFS_GATEWAY;

#[derive(Parser, Debug)]
#[command(
    name = "forta-publish",
    author,
    version,
    about = "Publish and manage bots on the Forta network"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

// Where the deploy key lives and how to unlock it.
#[derive(Args, Debug, Clone)]
pub struct KeyArgs {
    /// Directory holding the deploy key [default: ~/.forta/.deploy-keys]
    #[arg(long = "keydir", value_name = "DIR")]
    pub keydir: Option<PathBuf>,

    /// Passphrase protecting the deploy key.
    #[arg(
        long,
        env = "FORTA_PASSPHRASE",
        default_value = "",
        hide_default_value = true,
        hide_env_values = true
    )]
    pub passphrase: String,
}

impl KeyArgs {
    /// The key directory as the library expects it; empty means the default.
    pub fn key_dir_path(&self) -> PathBuf {
        self.keydir.clone().unwrap_or_default()
    }
}

// Which Forta network to talk to.
#[derive(Args, Debug, Clone)]
pub struct NetworkArgs {
    /// Target environment: prod (Polygon) or dev (Mumbai).
    #[arg(long = "env", value_name = "ENV", default_value = "prod")]
    pub environment: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the encrypted deploy key.
    Init {
        #[command(flatten)]
        key: KeyArgs,
    },
    /// Upload the bot documentation and signed metadata to IPFS.
    PublishMetadata {
        #[command(flatten)]
        network: NetworkArgs,
        #[command(flatten)]
        key: KeyArgs,
        /// Path to the bot manifest.
        #[arg(long, value_name = "FILE", default_value = DEFAULT_BOT_MANIFEST)]
        manifest: PathBuf,
        /// Container image reference pinned by digest (repo@sha256:...).
        #[arg(long, required = true)]
        image: String,
        /// Documentation file uploaded alongside the metadata.
        #[arg(long = "doc-file", value_name = "FILE", required = true)]
        doc_file: PathBuf,
        /// IPFS gateway used for uploads.
        #[arg(long = "ipfs-gateway", value_name = "URL", default_value = DEFAULT_IPFS_GATEWAY)]
        ipfs_gateway: String,
        /// Bot ID; overrides the manifest's botId.
        #[arg(long = "bot-id", default_value = "", hide_default_value = true)]
        bot_id: String,
    },
    /// Register or update the bot in the registry.
    Publish {
        #[command(flatten)]
        network: NetworkArgs,
        #[command(flatten)]
        key: KeyArgs,
        /// Metadata CID printed by publish-metadata.
        #[arg(long, value_name = "CID", required = true)]
        manifest: String,
        /// IPFS gateway used to fetch the metadata.
        #[arg(long = "ipfs-gateway", value_name = "URL", default_value = DEFAULT_IPFS_GATEWAY)]
        ipfs_gateway: String,
        /// Gas price in wei, or with a gwei suffix (e.g. 35gwei). Defaults to the node's price.
        #[arg(long = "gas-price", default_value = "", hide_default_value = true)]
        gas_price: String,
    },
    /// Enable a registered bot.
    Enable {
        #[command(flatten)]
        network: NetworkArgs,
        #[command(flatten)]
        key: KeyArgs,
        /// Bot ID; defaults to the botId in ./manifest.json.
        #[arg(long = "bot-id", default_value = "", hide_default_value = true)]
        bot_id: String,
    },
    /// Disable the bot declared in ./manifest.json.
    Disable {
        #[command(flatten)]
        network: NetworkArgs,
        #[command(flatten)]
        key: KeyArgs,
    },
    /// Transfer ownership of the bot declared in ./manifest.json.
    Transfer {
        #[command(flatten)]
        network: NetworkArgs,
        #[command(flatten)]
        key: KeyArgs,
        /// Address of the new owner.
        #[arg(long, value_name = "ADDRESS", default_value = "", hide_default_value = true)]
        to: String,
    },
    /// Print a new random bot ID.
    GenerateId,
}
