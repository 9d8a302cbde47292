use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::rpc::build_client;

/// Content-addressed storage used for bot documentation and metadata.
pub trait ContentStore {
    /// Store `bytes` and return their content identifier.
    fn add(&self, name: &str, bytes: &[u8]) -> Result<String>;
    /// Fetch the content behind `cid`.
    fn cat(&self, cid: &str) -> Result<Vec<u8>>;
}

/// An IPFS HTTP gateway exposing `/api/v0/add` and `/ipfs/<cid>`.
pub struct IpfsGateway {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash", default)]
    hash: String,
}

impl IpfsGateway {
    pub fn new(gateway: &str) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: gateway.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ContentStore for IpfsGateway {
    fn add(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let url = format!("{}/api/v0/add?pin=true", self.base_url);
        let part = Part::bytes(bytes.to_vec()).file_name(name.to_string());
        let form = Form::new().part("file", part);

        debug!(url = %url, name, size = bytes.len(), "uploading to ipfs");
        let body = self
            .client
            .post(&url)
            .multipart(form)
            .send()?
            .error_for_status()?
            .text()?;

        // The add endpoint streams one JSON object per line; the last one
        // describes the root of what was added.
        let missing_hash = || Error::IpfsMissingHash {
            gateway: self.base_url.clone(),
        };
        let last = body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last()
            .ok_or_else(missing_hash)?;
        let response: AddResponse = serde_json::from_str(last)?;
        if response.hash.is_empty() {
            return Err(missing_hash());
        }

        info!(name, cid = %response.hash, "uploaded to ipfs");
        Ok(response.hash)
    }

    fn cat(&self, cid: &str) -> Result<Vec<u8>> {
        let url = format!("{}/ipfs/{}", self.base_url, cid.trim());
        debug!(url = %url, "fetching from ipfs");
        let bytes = self.client.get(&url).send()?.error_for_status()?.bytes()?;
        Ok(bytes.to_vec())
    }
}
