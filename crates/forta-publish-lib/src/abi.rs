//! Minimal Solidity ABI encoding for registry calls.

use crate::crypto::{keccak256, Address};
use crate::error::{Error, Result};

/// Size of an ABI word.
const WORD: usize = 32;

/// A single call argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Any static integer type (`uint8` .. `uint256`), as a big-endian word.
    Uint([u8; 32]),
    Address(Address),
    String(String),
    /// `uint256[]`
    UintArray(Vec<[u8; 32]>),
}

impl Token {
    pub fn uint(value: u64) -> Self {
        Token::Uint(word_from_u64(value))
    }

    fn is_dynamic(&self) -> bool {
        matches!(self, Token::String(_) | Token::UintArray(_))
    }
}

/// Left-pad a `u64` into a word.
pub fn word_from_u64(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Four-byte function selector for a canonical signature such as `ownerOf(uint256)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Selector followed by the encoded arguments.
pub fn encode_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut out = selector(signature).to_vec();
    out.extend_from_slice(&encode_args(tokens));
    out
}

/// Head/tail encoding of a tuple of arguments.
pub fn encode_args(tokens: &[Token]) -> Vec<u8> {
    let mut head = Vec::with_capacity(tokens.len() * WORD);
    let mut tail = Vec::new();
    let head_len = tokens.len() * WORD;

    for token in tokens {
        if token.is_dynamic() {
            head.extend_from_slice(&word_from_u64((head_len + tail.len()) as u64));
            encode_tail(token, &mut tail);
        } else {
            encode_static(token, &mut head);
        }
    }

    head.extend_from_slice(&tail);
    head
}

fn encode_static(token: &Token, out: &mut Vec<u8>) {
    match token {
        Token::Uint(word) => out.extend_from_slice(word),
        Token::Address(address) => {
            out.extend_from_slice(&[0u8; 12]);
            out.extend_from_slice(address.as_bytes());
        }
        Token::String(_) | Token::UintArray(_) => unreachable!("dynamic token in head"),
    }
}

fn encode_tail(token: &Token, out: &mut Vec<u8>) {
    match token {
        Token::String(value) => {
            let bytes = value.as_bytes();
            out.extend_from_slice(&word_from_u64(bytes.len() as u64));
            out.extend_from_slice(bytes);
            let padding = (WORD - bytes.len() % WORD) % WORD;
            out.extend(std::iter::repeat(0u8).take(padding));
        }
        Token::UintArray(words) => {
            out.extend_from_slice(&word_from_u64(words.len() as u64));
            for word in words {
                out.extend_from_slice(word);
            }
        }
        Token::Uint(_) | Token::Address(_) => unreachable!("static token in tail"),
    }
}

fn first_word(data: &[u8]) -> Result<&[u8]> {
    data.get(..WORD).ok_or_else(|| Error::AbiDecode {
        message: format!("expected at least {WORD} bytes, got {}", data.len()),
    })
}

/// Decode a `bool` return value.
pub fn decode_bool(data: &[u8]) -> Result<bool> {
    let word = first_word(data)?;
    Ok(word.iter().any(|b| *b != 0))
}

/// Decode an `address` return value.
pub fn decode_address(data: &[u8]) -> Result<Address> {
    let word = first_word(data)?;
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[12..]);
    Ok(Address::from_bytes(bytes))
}
