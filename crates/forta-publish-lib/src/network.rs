use std::env;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::crypto::Address;
use crate::error::{Error, Result};

const RPC_URL_ENV: &str = "FORTA_RPC_URL";
const REGISTRY_ENV: &str = "FORTA_REGISTRY_ADDRESS";
const CHAIN_ID_ENV: &str = "FORTA_CHAIN_ID";

const PROD_CHAIN_ID: u64 = 137;
const PROD_RPC_URL: &str = "https://polygon-rpc.com";
const PROD_REGISTRY: &str = "0x61447385B019187daa48e91c55c02AF1F1f3F863";

const DEV_CHAIN_ID: u64 = 80001;
const DEV_RPC_URL: &str = "https://rpc-mumbai.maticvigil.com";
const DEV_REGISTRY: &str = "0x4519Eac5d0C2d6dD1C4dfA9Ff96DBDCDA21B6C28";

/// Default IPFS gateway used for metadata uploads.
pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.forta.network";

/// Deployment environment selected with `--env`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Prod,
    Dev,
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Ok(Environment::Prod),
            "dev" | "development" => Ok(Environment::Dev),
            _ => Err(Error::UnknownEnvironment {
                name: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Prod => write!(f, "prod"),
            Environment::Dev => write!(f, "dev"),
        }
    }
}

/// Chain endpoints for one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub environment: Environment,
    pub chain_id: u64,
    pub rpc_url: String,
    /// Address of the bot registry contract.
    pub registry: Address,
}

impl NetworkConfig {
    /// Built-in endpoints for `environment`, ignoring overrides.
    pub fn builtin(environment: Environment) -> Result<Self> {
        let (chain_id, rpc_url, registry) = match environment {
            Environment::Prod => (PROD_CHAIN_ID, PROD_RPC_URL, PROD_REGISTRY),
            Environment::Dev => (DEV_CHAIN_ID, DEV_RPC_URL, DEV_REGISTRY),
        };
        Ok(Self {
            environment,
            chain_id,
            rpc_url: rpc_url.to_string(),
            registry: registry.parse()?,
        })
    }

    /// Endpoints for `environment` with `FORTA_RPC_URL`, `FORTA_REGISTRY_ADDRESS`
    /// and `FORTA_CHAIN_ID` applied on top.
    pub fn resolve(environment: Environment) -> Result<Self> {
        let mut config = Self::builtin(environment)?;

        if let Some(url) = non_empty_var(RPC_URL_ENV) {
            debug!(rpc_url = %url, "using rpc url override");
            config.rpc_url = url;
        }

        if let Some(raw) = non_empty_var(REGISTRY_ENV) {
            config.registry = raw.parse().map_err(|_| Error::InvalidNetworkOverride {
                variable: REGISTRY_ENV.to_string(),
                message: format!("'{raw}' is not an address"),
            })?;
            debug!(registry = %config.registry, "using registry override");
        }

        if let Some(raw) = non_empty_var(CHAIN_ID_ENV) {
            config.chain_id = raw.parse().map_err(|_| Error::InvalidNetworkOverride {
                variable: CHAIN_ID_ENV.to_string(),
                message: format!("'{raw}' is not a chain id"),
            })?;
            debug!(chain_id = config.chain_id, "using chain id override");
        }

        Ok(config)
    }

    /// Parse an `--env` value and resolve it.
    pub fn for_env_name(name: &str) -> Result<Self> {
        Self::resolve(name.parse()?)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
