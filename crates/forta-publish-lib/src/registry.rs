//! Calls against the bot registry contract.
//!
//! The registry is an ERC-721 where the token id is the bot ID.

use crate::abi::{self, Token};
use crate::bot_id::BotId;
use crate::crypto::Address;
use crate::error::Result;
use crate::rpc::{CallRequest, EthRpc};

pub const IS_CREATED: &str = "isCreated(uint256)";
pub const IS_ENABLED: &str = "isEnabled(uint256)";
pub const OWNER_OF: &str = "ownerOf(uint256)";
pub const CREATE_AGENT: &str = "createAgent(uint256,address,string,uint256[])";
pub const UPDATE_AGENT: &str = "updateAgent(uint256,string,uint256[])";
pub const ENABLE_AGENT: &str = "enableAgent(uint256,uint8)";
pub const DISABLE_AGENT: &str = "disableAgent(uint256,uint8)";
pub const TRANSFER_FROM: &str = "transferFrom(address,address,uint256)";

/// Permission slot used when the owner toggles a bot.
pub const OWNER_PERMISSION: u64 = 1;

fn chain_id_words(chain_ids: &[u64]) -> Vec<[u8; 32]> {
    chain_ids.iter().map(|id| abi::word_from_u64(*id)).collect()
}

pub fn create_agent_call(bot_id: BotId, owner: Address, metadata: &str, chain_ids: &[u64]) -> Vec<u8> {
    abi::encode_call(
        CREATE_AGENT,
        &[
            Token::Uint(*bot_id.as_bytes()),
            Token::Address(owner),
            Token::String(metadata.to_string()),
            Token::UintArray(chain_id_words(chain_ids)),
        ],
    )
}

pub fn update_agent_call(bot_id: BotId, metadata: &str, chain_ids: &[u64]) -> Vec<u8> {
    abi::encode_call(
        UPDATE_AGENT,
        &[
            Token::Uint(*bot_id.as_bytes()),
            Token::String(metadata.to_string()),
            Token::UintArray(chain_id_words(chain_ids)),
        ],
    )
}

/// `enableAgent` or `disableAgent` for the owner permission.
pub fn set_enabled_call(bot_id: BotId, enable: bool) -> Vec<u8> {
    let signature = if enable { ENABLE_AGENT } else { DISABLE_AGENT };
    abi::encode_call(
        signature,
        &[Token::Uint(*bot_id.as_bytes()), Token::uint(OWNER_PERMISSION)],
    )
}

pub fn transfer_call(from: Address, to: Address, bot_id: BotId) -> Vec<u8> {
    abi::encode_call(
        TRANSFER_FROM,
        &[
            Token::Address(from),
            Token::Address(to),
            Token::Uint(*bot_id.as_bytes()),
        ],
    )
}

/// Read-only view of the registry.
pub struct BotRegistry<'a, R: EthRpc> {
    rpc: &'a R,
    address: Address,
}

impl<'a, R: EthRpc> BotRegistry<'a, R> {
    pub fn new(rpc: &'a R, address: Address) -> Self {
        Self { rpc, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn view(&self, signature: &str, bot_id: BotId) -> Result<Vec<u8>> {
        self.rpc.call(&CallRequest {
            from: None,
            to: self.address,
            data: abi::encode_call(signature, &[Token::Uint(*bot_id.as_bytes())]),
        })
    }

    pub fn is_created(&self, bot_id: BotId) -> Result<bool> {
        abi::decode_bool(&self.view(IS_CREATED, bot_id)?)
    }

    pub fn is_enabled(&self, bot_id: BotId) -> Result<bool> {
        abi::decode_bool(&self.view(IS_ENABLED, bot_id)?)
    }

    pub fn owner_of(&self, bot_id: BotId) -> Result<Address> {
        abi::decode_address(&self.view(OWNER_OF, bot_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_id() -> BotId {
        BotId::from_bytes([0xab; 32])
    }

    #[test]
    fn set_enabled_call_picks_function_and_permission() {
        let enable = set_enabled_call(sample_id(), true);
        let disable = set_enabled_call(sample_id(), false);
        assert_eq!(&enable[..4], &abi::selector(ENABLE_AGENT));
        assert_eq!(&disable[..4], &abi::selector(DISABLE_AGENT));
        assert_eq!(enable.len(), 4 + 64);
        assert_eq!(&enable[4..36], &[0xab; 32]);
        assert_eq!(enable[67], 1);
    }

    #[test]
    fn transfer_call_uses_erc721_selector() {
        let from = Address::from_bytes([1; 20]);
        let to = Address::from_bytes([2; 20]);
        let data = transfer_call(from, to, sample_id());
        assert_eq!(hex::encode(&data[..4]), "23b872dd");
        assert_eq!(&data[16..36], &[1; 20]);
        assert_eq!(&data[48..68], &[2; 20]);
        assert_eq!(&data[68..100], &[0xab; 32]);
    }

    #[test]
    fn create_call_embeds_metadata_and_chains() {
        let owner = Address::from_bytes([9; 20]);
        let data = create_agent_call(sample_id(), owner, "QmMetadata", &[1, 137]);
        assert_eq!(&data[..4], &abi::selector(CREATE_AGENT));
        let args = &data[4..];
        // 4 head words, string (len + 1 word), array (len + 2 words)
        assert_eq!(args.len(), 32 * (4 + 2 + 3));
        assert!(args.windows(10).any(|w| w == b"QmMetadata"));
    }
}
