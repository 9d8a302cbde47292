//! Ethereum-flavoured hashing, addresses and recoverable signatures.

use std::fmt;
use std::str::FromStr;

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::error::{Error, Result};

/// Prefix applied by `personal_sign` before hashing a message (EIP-191).
const MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Keccak-256 digest of `data`.
pub fn keccak256(data: impl AsRef<[u8]>) -> [u8; 32] {
    Keccak256::digest(data.as_ref()).into()
}

/// Strip an optional `0x`/`0X` prefix.
pub(crate) fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Derive the address controlled by a public key.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        // Skip the 0x04 uncompressed-point tag.
        let hash = keccak256(&point.as_bytes()[1..]);
        let mut out = [0u8; 20];
        out.copy_from_slice(&hash[12..]);
        Self(out)
    }

    pub fn from_signing_key(key: &SigningKey) -> Self {
        Self::from_verifying_key(key.verifying_key())
    }

    /// EIP-55 mixed-case checksum encoding.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Lowercase hex without prefix, as stored in key files.
    pub fn to_plain_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let invalid = || Error::InvalidAddress {
            value: value.to_string(),
        };
        let digits = strip_hex_prefix(value.trim());
        if digits.len() != 40 {
            return Err(invalid());
        }
        let bytes = hex::decode(digits).map_err(|_| invalid())?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A secp256k1 signature together with its recovery id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature {
    /// `r || s`, both 32 bytes big-endian.
    pub rs: [u8; 64],
    /// Recovery id, 0 or 1.
    pub recovery_id: u8,
}

impl RecoverableSignature {
    pub fn r(&self) -> &[u8] {
        &self.rs[..32]
    }

    pub fn s(&self) -> &[u8] {
        &self.rs[32..]
    }

    /// `r || s || v` with `v = 27 + recovery_id`, as produced by `personal_sign`.
    pub fn to_rsv_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&self.rs);
        out[64] = 27 + self.recovery_id;
        out
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_rsv_bytes()))
    }
}

/// Sign a 32-byte digest, producing a low-S recoverable signature.
pub fn sign_prehash(key: &SigningKey, hash: &[u8; 32]) -> Result<RecoverableSignature> {
    let (signature, recovery_id) = key.sign_prehash_recoverable(hash)?;
    let mut rs = [0u8; 64];
    rs.copy_from_slice(&signature.to_bytes());
    Ok(RecoverableSignature {
        rs,
        recovery_id: recovery_id.to_byte(),
    })
}

/// EIP-191 hash of `message`.
pub fn hash_message(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(format!("{MESSAGE_PREFIX}{}", message.len()).as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

/// Sign `message` the way `personal_sign` does.
pub fn sign_message(key: &SigningKey, message: &[u8]) -> Result<RecoverableSignature> {
    sign_prehash(key, &hash_message(message))
}

/// Recover the address that produced a 65-byte `personal_sign` signature.
pub fn recover_message_signer(message: &[u8], signature: &[u8]) -> Result<Address> {
    let invalid = |message: String| Error::InvalidSignature { message };

    if signature.len() != 65 {
        return Err(invalid(format!(
            "expected 65 bytes, got {}",
            signature.len()
        )));
    }
    let v = signature[64];
    let recovery_byte = match v {
        27 | 28 => v - 27,
        0 | 1 => v,
        other => return Err(invalid(format!("unsupported recovery byte {other}"))),
    };
    let recovery_id =
        RecoveryId::from_byte(recovery_byte).ok_or_else(|| invalid("bad recovery id".into()))?;
    let parsed = Signature::from_slice(&signature[..64]).map_err(|e| invalid(e.to_string()))?;
    let key = VerifyingKey::recover_from_prehash(&hash_message(message), &parsed, recovery_id)
        .map_err(|e| invalid(e.to_string()))?;
    Ok(Address::from_verifying_key(&key))
}

/// Decode a `0x`-prefixed signature string.
pub fn decode_signature_hex(value: &str) -> Result<Vec<u8>> {
    hex::decode(strip_hex_prefix(value.trim())).map_err(|e| Error::InvalidSignature {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_from_hex(value: &str) -> SigningKey {
        SigningKey::from_slice(&hex::decode(value).unwrap()).unwrap()
    }

    #[test]
    fn keccak_of_empty_input() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn checksum_matches_eip55_vectors() {
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let address: Address = expected.to_lowercase().parse().unwrap();
            assert_eq!(address.to_checksum(), expected);
        }
    }

    #[test]
    fn address_parsing_rejects_bad_lengths() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("zz".repeat(20).parse::<Address>().is_err());
        assert!("".parse::<Address>().is_err());
    }

    #[test]
    fn address_derived_from_private_key() {
        let key = key_from_hex("4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318");
        assert_eq!(
            Address::from_signing_key(&key).to_checksum(),
            "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"
        );
    }

    #[test]
    fn message_signature_recovers_signer() {
        let key = key_from_hex("4646464646464646464646464646464646464646464646464646464646464646");
        let signature = sign_message(&key, b"forta bot manifest").unwrap();
        let bytes = signature.to_rsv_bytes();
        assert!(bytes[64] == 27 || bytes[64] == 28);

        let signer = recover_message_signer(b"forta bot manifest", &bytes).unwrap();
        assert_eq!(signer, Address::from_signing_key(&key));

        let other = recover_message_signer(b"tampered", &bytes).unwrap();
        assert_ne!(other, signer);
    }

    #[test]
    fn recover_rejects_short_signature() {
        let err = recover_message_signer(b"msg", &[0u8; 10]).unwrap_err();
        assert!(matches!(err, Error::InvalidSignature { .. }));
    }
}
