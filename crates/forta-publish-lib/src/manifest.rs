//! Bot manifests: the local `manifest.json` and the signed metadata
//! document that gets published to IPFS.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use k256::ecdsa::SigningKey;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bot_id::BotId;
use crate::crypto::{decode_signature_hex, keccak256, recover_message_signer, sign_message, Address};
use crate::error::{Error, Result};

/// Manifest file consulted when a command is not given an explicit bot ID.
pub const DEFAULT_BOT_MANIFEST: &str = "manifest.json";

const IMAGE_DIGEST_MARKER: &str = "@sha256:";

/// The developer-maintained description of a bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_url: Option<String>,
    #[serde(default)]
    pub chain_ids: Vec<u64>,
}

impl BotManifest {
    /// Read and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read(path)?;
        let manifest: Self =
            serde_json::from_slice(&contents).map_err(|e| invalid_manifest(path, e.to_string()))?;
        manifest.validate(path)?;
        debug!(path = %path.display(), name = %manifest.name, "loaded bot manifest");
        Ok(manifest)
    }

    /// Check required fields; `path` is only used for error messages.
    ///
    /// `botId` is left to [`Self::declared_bot_id`], which is only consulted
    /// when no explicit bot ID is given.
    pub fn validate(&self, path: &Path) -> Result<()> {
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("version", &self.version),
        ] {
            if value.trim().is_empty() {
                return Err(invalid_manifest(path, format!("{field} must not be empty")));
            }
        }
        if self.chain_ids.is_empty() {
            return Err(invalid_manifest(path, "chainIds must list at least one chain"));
        }
        if self.chain_ids.contains(&0) {
            return Err(invalid_manifest(path, "chainIds must not contain 0"));
        }
        Ok(())
    }

    /// The `botId` field, parsed.
    pub fn declared_bot_id(&self, path: &Path) -> Result<Option<BotId>> {
        match self.bot_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| invalid_manifest(path, format!("botId '{raw}' is not a valid bot ID"))),
        }
    }
}

fn invalid_manifest(path: &Path, message: impl Into<String>) -> Error {
    Error::InvalidManifest {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BotIdOnly {
    #[serde(default)]
    bot_id: Option<String>,
}

/// Pick the bot ID for a command.
///
/// A non-empty `flag` wins. Otherwise the `botId` field of the manifest at
/// `manifest_path` is used, when that file exists.
pub fn resolve_bot_id(flag: &str, manifest_path: &Path) -> Result<BotId> {
    if !flag.trim().is_empty() {
        return flag.parse();
    }

    let missing = || Error::MissingBotId {
        path: manifest_path.to_path_buf(),
    };
    if !manifest_path.exists() {
        return Err(missing());
    }

    let contents = fs::read(manifest_path)?;
    let partial: BotIdOnly = serde_json::from_slice(&contents)
        .map_err(|e| invalid_manifest(manifest_path, e.to_string()))?;
    match partial.bot_id.as_deref().map(str::trim) {
        None | Some("") => Err(missing()),
        Some(raw) => {
            let id = raw.parse()?;
            debug!(bot_id = %id, path = %manifest_path.display(), "using bot ID from manifest");
            Ok(id)
        }
    }
}

/// Require an image reference pinned by digest: `<repository>@sha256:<64 hex>`.
pub fn validate_image_reference(image: &str) -> Result<()> {
    let invalid = || Error::InvalidImageReference {
        value: image.to_string(),
    };
    let (repository, digest) = image.trim().split_once(IMAGE_DIGEST_MARKER).ok_or_else(invalid)?;
    if repository.is_empty() || repository.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    Ok(())
}

/// Read a documentation file, refusing empty ones.
pub fn read_documentation(path: &Path) -> Result<Vec<u8>> {
    let contents = fs::read(path)?;
    if String::from_utf8_lossy(&contents).trim().is_empty() {
        return Err(Error::EmptyDocumentation {
            path: path.to_path_buf(),
        });
    }
    Ok(contents)
}

/// The metadata document registered for a bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub from: Address,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    /// Human-readable bot name.
    pub agent_id: String,
    /// The bot ID as registered on chain.
    pub agent_id_hash: BotId,
    pub version: String,
    pub timestamp: String,
    pub image_reference: String,
    /// CID of the uploaded documentation file.
    pub documentation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_url: Option<String>,
    pub chain_ids: Vec<u64>,
}

impl Manifest {
    /// Compose the published manifest from the local one.
    pub fn build(
        source: &BotManifest,
        from: Address,
        bot_id: BotId,
        image_reference: &str,
        documentation_cid: &str,
    ) -> Self {
        Self {
            from,
            name: source.name.clone(),
            display_name: source.display_name.clone(),
            description: source.description.clone(),
            long_description: source.long_description.clone(),
            agent_id: source.name.clone(),
            agent_id_hash: bot_id,
            version: source.version.clone(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            image_reference: image_reference.trim().to_string(),
            documentation: documentation_cid.to_string(),
            repository: source.repository.clone(),
            license_url: source.license_url.clone(),
            promo_url: source.promo_url.clone(),
            chain_ids: source.chain_ids.clone(),
        }
    }

    /// keccak256 of the manifest's JSON serialization; this is what gets signed.
    pub fn digest(&self) -> Result<[u8; 32]> {
        Ok(keccak256(serde_json::to_vec(self)?))
    }

    pub fn sign(self, key: &SigningKey) -> Result<SignedManifest> {
        let signature = sign_message(key, &self.digest()?)?;
        Ok(SignedManifest {
            manifest: self,
            signature: signature.to_hex(),
        })
    }
}

/// A manifest with the publisher's `personal_sign` signature over its digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedManifest {
    pub manifest: Manifest,
    pub signature: String,
}

impl SignedManifest {
    pub fn recover_signer(&self) -> Result<Address> {
        let signature = decode_signature_hex(&self.signature)?;
        recover_message_signer(&self.manifest.digest()?, &signature)
    }

    /// Recover the signer and check it is the manifest's `from` address.
    pub fn verify(&self) -> Result<Address> {
        let signer = self.recover_signer()?;
        if signer != self.manifest.from {
            return Err(Error::InvalidSignature {
                message: format!(
                    "signed by {signer} but manifest claims to be from {}",
                    self.manifest.from
                ),
            });
        }
        Ok(signer)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Where `publish-metadata` reads the bot manifest from.
pub fn manifest_path_or_default(path: &Path) -> PathBuf {
    if path.as_os_str().is_empty() {
        PathBuf::from(DEFAULT_BOT_MANIFEST)
    } else {
        path.to_path_buf()
    }
}
