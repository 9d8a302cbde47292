//! Recursive Length Prefix encoding, enough to serialize legacy transactions.

/// A value that can be RLP encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Bytes(Vec<u8>),
    List(Vec<Item>),
}

impl Item {
    /// Byte string item.
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Item::Bytes(value.into())
    }

    /// Unsigned integer as a minimal big-endian byte string (zero is empty).
    pub fn uint(value: u128) -> Self {
        Item::Bytes(trim_leading_zeros(&value.to_be_bytes()).to_vec())
    }

    /// Big-endian integer given as raw bytes, e.g. a signature scalar.
    pub fn uint_bytes(value: &[u8]) -> Self {
        Item::Bytes(trim_leading_zeros(value).to_vec())
    }
}

/// Drop leading zero bytes.
pub fn trim_leading_zeros(value: &[u8]) -> &[u8] {
    let first = value.iter().position(|b| *b != 0).unwrap_or(value.len());
    &value[first..]
}

/// Encode an item.
pub fn encode(item: &Item) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(item, &mut out);
    out
}

/// Encode a list of items.
pub fn encode_list(items: &[Item]) -> Vec<u8> {
    let mut payload = Vec::new();
    for item in items {
        encode_into(item, &mut payload);
    }
    let mut out = Vec::with_capacity(payload.len() + 9);
    push_length(&mut out, payload.len(), 0xc0);
    out.extend_from_slice(&payload);
    out
}

fn encode_into(item: &Item, out: &mut Vec<u8>) {
    match item {
        Item::Bytes(bytes) => {
            if bytes.len() == 1 && bytes[0] < 0x80 {
                out.push(bytes[0]);
            } else {
                push_length(out, bytes.len(), 0x80);
                out.extend_from_slice(bytes);
            }
        }
        Item::List(items) => out.extend_from_slice(&encode_list(items)),
    }
}

fn push_length(out: &mut Vec<u8>, len: usize, offset: u8) {
    if len < 56 {
        out.push(offset + len as u8);
    } else {
        let len_bytes = (len as u64).to_be_bytes();
        let len_bytes = trim_leading_zeros(&len_bytes);
        out.push(offset + 55 + len_bytes.len() as u8);
        out.extend_from_slice(len_bytes);
    }
}
