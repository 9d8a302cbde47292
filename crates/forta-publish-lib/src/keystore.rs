//! Encrypted deploy key storage in the Web3 Secret Storage (v3) format.
//!
//! Each key directory holds a single key file named
//! `UTC--<timestamp>--<address>`. The private key is encrypted with
//! AES-128-CTR under a scrypt-derived key and authenticated with a keccak256
//! MAC, which makes the files interchangeable with other Ethereum tooling.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use aes::Aes128;
use chrono::Utc;
use ctr::cipher::{KeyIvInit, StreamCipher};
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::crypto::{keccak256, strip_hex_prefix, Address};
use crate::error::{Error, Result};

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

const KEY_FILE_VERSION: u8 = 3;
const CIPHER: &str = "aes-128-ctr";
const KDF: &str = "scrypt";
const DERIVED_KEY_LEN: usize = 32;
const SALT_LEN: usize = 32;
const IV_LEN: usize = 16;

/// Scrypt cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Base-2 logarithm of the CPU/memory cost `n`.
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

impl KdfParams {
    /// The geth "standard" profile: `n = 2^18, r = 8, p = 1`.
    pub const STANDARD: Self = Self {
        log_n: 18,
        r: 8,
        p: 1,
    };

    /// A cheap profile for tests and throwaway keys.
    pub const LIGHT: Self = Self {
        log_n: 10,
        r: 8,
        p: 1,
    };
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct KeyFile {
    address: String,
    #[serde(alias = "Crypto")]
    crypto: CryptoSection,
    id: String,
    version: u8,
}

#[derive(Debug, Serialize, Deserialize)]
struct CryptoSection {
    cipher: String,
    ciphertext: String,
    cipherparams: CipherParams,
    kdf: String,
    kdfparams: ScryptParams,
    mac: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CipherParams {
    iv: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ScryptParams {
    dklen: usize,
    n: u64,
    p: u32,
    r: u32,
    salt: String,
}

/// A decrypted deploy key.
pub struct DeployKey {
    path: PathBuf,
    key: SigningKey,
    address: Address,
}

impl DeployKey {
    /// Wrap an in-memory key that is not backed by a file.
    pub fn from_signing_key(key: SigningKey) -> Self {
        let address = Address::from_signing_key(&key);
        Self {
            path: PathBuf::new(),
            key,
            address,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.key
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

impl std::fmt::Debug for DeployKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployKey")
            .field("path", &self.path)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// A directory of deploy keys.
#[derive(Debug, Clone)]
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Key files in the directory, sorted by name. A missing directory has none.
    pub fn key_files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with("UTC--") || name.ends_with(".json") {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Generate a new key and store it encrypted under `passphrase`.
    pub fn create(&self, passphrase: &str, params: KdfParams) -> Result<DeployKey> {
        if let Some(existing) = self.key_files()?.into_iter().next() {
            debug!(path = %existing.display(), "refusing to overwrite existing key");
            return Err(Error::KeyAlreadyExists {
                path: self.dir.clone(),
            });
        }

        create_private_dir(&self.dir)?;

        let key = SigningKey::random(&mut OsRng);
        let address = Address::from_signing_key(&key);
        let file = encrypt_key(&key, passphrase, params)?;

        let file_name = format!(
            "UTC--{}--{}",
            Utc::now().format("%Y-%m-%dT%H-%M-%S%.9fZ"),
            address.to_plain_hex()
        );
        let path = self.dir.join(file_name);
        write_file_atomic(&path, &serde_json::to_vec_pretty(&file)?)?;

        info!(address = %address, path = %path.display(), "created deploy key");
        Ok(DeployKey { path, key, address })
    }

    /// Decrypt the deploy key stored in the directory.
    ///
    /// When more than one key file is present the first in name order is used.
    pub fn load(&self, passphrase: &str) -> Result<DeployKey> {
        let files = self.key_files()?;
        let Some(path) = files.first() else {
            return Err(Error::NoKeyFound {
                path: self.dir.clone(),
            });
        };
        if files.len() > 1 {
            warn!(
                dir = %self.dir.display(),
                count = files.len(),
                using = %path.display(),
                "multiple key files found; using the first"
            );
        }

        let key = decrypt_key_file(path, passphrase)?;
        let address = Address::from_signing_key(&key);
        debug!(address = %address, path = %path.display(), "loaded deploy key");
        Ok(DeployKey {
            path: path.clone(),
            key,
            address,
        })
    }
}

fn encrypt_key(key: &SigningKey, passphrase: &str, params: KdfParams) -> Result<KeyFile> {
    let mut salt = [0u8; SALT_LEN];
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut iv);

    let derived = derive_key(passphrase, &salt, params, DERIVED_KEY_LEN, Path::new(""))?;
    let mut ciphertext = key.to_bytes().to_vec();
    apply_cipher(&derived[..16], &iv, &mut ciphertext, Path::new(""))?;
    let mac = keccak256([&derived[16..32], &ciphertext[..]].concat());

    Ok(KeyFile {
        address: Address::from_signing_key(key).to_plain_hex(),
        crypto: CryptoSection {
            cipher: CIPHER.to_string(),
            ciphertext: hex::encode(&ciphertext),
            cipherparams: CipherParams {
                iv: hex::encode(iv),
            },
            kdf: KDF.to_string(),
            kdfparams: ScryptParams {
                dklen: DERIVED_KEY_LEN,
                n: 1u64 << params.log_n,
                p: params.p,
                r: params.r,
                salt: hex::encode(salt),
            },
            mac: hex::encode(mac),
        },
        id: Uuid::new_v4().to_string(),
        version: KEY_FILE_VERSION,
    })
}

/// Decrypt a single key file.
pub fn decrypt_key_file(path: &Path, passphrase: &str) -> Result<SigningKey> {
    let invalid = |message: String| Error::InvalidKeyFile {
        path: path.to_path_buf(),
        message,
    };

    let contents = fs::read(path)?;
    let file: KeyFile = serde_json::from_slice(&contents).map_err(|e| invalid(e.to_string()))?;

    if file.version != KEY_FILE_VERSION {
        return Err(invalid(format!("unsupported version {}", file.version)));
    }
    let crypto = &file.crypto;
    if !crypto.cipher.eq_ignore_ascii_case(CIPHER) {
        return Err(invalid(format!("unsupported cipher {}", crypto.cipher)));
    }
    if !crypto.kdf.eq_ignore_ascii_case(KDF) {
        return Err(invalid(format!("unsupported kdf {}", crypto.kdf)));
    }

    let kdf = &crypto.kdfparams;
    if kdf.dklen < 32 {
        return Err(invalid(format!("derived key length {} too short", kdf.dklen)));
    }
    if !kdf.n.is_power_of_two() || kdf.n < 2 {
        return Err(invalid(format!("scrypt n {} is not a power of two", kdf.n)));
    }
    let params = KdfParams {
        log_n: kdf.n.trailing_zeros() as u8,
        r: kdf.r,
        p: kdf.p,
    };

    let salt = hex::decode(strip_hex_prefix(&kdf.salt)).map_err(|e| invalid(e.to_string()))?;
    let iv = hex::decode(strip_hex_prefix(&crypto.cipherparams.iv))
        .map_err(|e| invalid(e.to_string()))?;
    let mut ciphertext =
        hex::decode(strip_hex_prefix(&crypto.ciphertext)).map_err(|e| invalid(e.to_string()))?;
    let mac = hex::decode(strip_hex_prefix(&crypto.mac)).map_err(|e| invalid(e.to_string()))?;

    let derived = derive_key(passphrase, &salt, params, kdf.dklen, path)?;
    let expected_mac = keccak256([&derived[16..32], &ciphertext[..]].concat());
    if expected_mac[..] != mac[..] {
        return Err(Error::WrongPassphrase {
            path: path.to_path_buf(),
        });
    }

    apply_cipher(&derived[..16], &iv, &mut ciphertext, path)?;
    let key = SigningKey::from_slice(&ciphertext).map_err(|e| invalid(e.to_string()))?;

    let stored: Address = file.address.parse().map_err(|_| {
        invalid(format!("address field '{}' is malformed", file.address))
    })?;
    let derived_address = Address::from_signing_key(&key);
    if stored != derived_address {
        return Err(invalid(format!(
            "stored address {stored} does not match key address {derived_address}"
        )));
    }

    Ok(key)
}

fn derive_key(
    passphrase: &str,
    salt: &[u8],
    params: KdfParams,
    len: usize,
    path: &Path,
) -> Result<Vec<u8>> {
    let invalid = |message: String| Error::InvalidKeyFile {
        path: path.to_path_buf(),
        message,
    };
    let scrypt_params = scrypt::Params::new(params.log_n, params.r, params.p, len)
        .map_err(|e| invalid(format!("invalid scrypt parameters: {e}")))?;
    let mut out = vec![0u8; len];
    scrypt::scrypt(passphrase.as_bytes(), salt, &scrypt_params, &mut out)
        .map_err(|e| invalid(format!("scrypt failed: {e}")))?;
    Ok(out)
}

fn apply_cipher(key: &[u8], iv: &[u8], buffer: &mut [u8], path: &Path) -> Result<()> {
    let mut cipher = Aes128Ctr::new_from_slices(key, iv).map_err(|e| Error::InvalidKeyFile {
        path: path.to_path_buf(),
        message: format!("invalid cipher parameters: {e}"),
    })?;
    cipher.apply_keystream(buffer);
    Ok(())
}

fn create_private_dir(dir: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)?;
    Ok(())
}

fn write_file_atomic(destination: &Path, contents: &[u8]) -> Result<()> {
    let parent = destination.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(destination).map_err(|err| err.error)?;
    Ok(())
}
