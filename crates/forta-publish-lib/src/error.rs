use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the publishing library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The user's home directory could not be resolved for the default key path.
    #[error("failed to resolve the user home directory")]
    HomeDirUnavailable,

    /// Raised by `init` when the key directory already holds a key.
    #[error("a deploy key already exists in {path}")]
    KeyAlreadyExists { path: PathBuf },

    /// No key file was found in the key directory.
    #[error("no deploy key found in {path}; run `init` first")]
    NoKeyFound { path: PathBuf },

    /// The key file MAC did not match, which means the passphrase is wrong.
    #[error("wrong passphrase for key file {path}")]
    WrongPassphrase { path: PathBuf },

    /// The key file could not be understood.
    #[error("invalid key file {path}: {message}")]
    InvalidKeyFile { path: PathBuf, message: String },

    /// Raised for an `--env` value that names no known network.
    #[error("unknown environment '{name}'; expected one of: prod, dev")]
    UnknownEnvironment { name: String },

    /// Raised when a network override from the environment cannot be parsed.
    #[error("invalid value for {variable}: {message}")]
    InvalidNetworkOverride { variable: String, message: String },

    /// Raised when an address string is not 20 hex-encoded bytes.
    #[error("invalid address '{value}'")]
    InvalidAddress { value: String },

    /// Raised when a bot ID is not 32 hex-encoded bytes.
    #[error("invalid bot ID '{value}'; expected 0x followed by 64 hex characters")]
    InvalidBotId { value: String },

    /// No bot ID was supplied on the command line or in the manifest.
    #[error("no bot ID given; pass --bot-id or set botId in {path}")]
    MissingBotId { path: PathBuf },

    /// `transfer` was invoked without a recipient.
    #[error("no recipient given; pass --to with the new owner address")]
    MissingRecipient,

    /// `transfer` was asked to send the bot to its current owner.
    #[error("bot is already owned by {address}")]
    TransferToSelf { address: String },

    /// The bot has never been registered, so it cannot be modified.
    #[error("bot {bot_id} is not registered; publish it first")]
    BotNotRegistered { bot_id: String },

    /// The loaded key does not own the bot it is trying to modify.
    #[error("bot {bot_id} is owned by {owner}, not by {signer}")]
    NotBotOwner {
        bot_id: String,
        owner: String,
        signer: String,
    },

    /// The bot manifest failed validation.
    #[error("invalid manifest {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    /// Raised when the container image reference is not pinned by digest.
    #[error("invalid image reference '{value}'; expected <repository>@sha256:<64 hex digest>")]
    InvalidImageReference { value: String },

    /// The documentation file exists but has no content.
    #[error("documentation file {path} is empty")]
    EmptyDocumentation { path: PathBuf },

    /// The signature over a published manifest is malformed or does not verify.
    #[error("invalid manifest signature: {message}")]
    InvalidSignature { message: String },

    /// The published manifest was signed by a different key than the one loaded.
    #[error("manifest was signed by {signer} but the loaded key is {expected}")]
    ManifestSignerMismatch { signer: String, expected: String },

    /// Raised when the gas price flag cannot be parsed.
    #[error("invalid gas price '{value}'; expected wei or a value with a gwei suffix")]
    InvalidGasPrice { value: String },

    /// The JSON-RPC endpoint returned an error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The JSON-RPC endpoint returned a payload we could not interpret.
    #[error("unexpected rpc response for {method}: {message}")]
    UnexpectedRpcResponse { method: String, message: String },

    /// The IPFS gateway response did not contain a content identifier.
    #[error("ipfs gateway {gateway} returned no content hash")]
    IpfsMissingHash { gateway: String },

    /// The RPC node serves a different chain than the selected environment.
    #[error("rpc node reports chain id {actual} but the environment expects {expected}")]
    ChainIdMismatch { expected: u64, actual: u64 },

    /// Raised when a mined transaction reports a failed status.
    #[error("transaction {tx_hash} reverted")]
    TransactionReverted { tx_hash: String },

    /// Raised when no receipt arrives within the polling window.
    #[error("timed out waiting for receipt of transaction {tx_hash}")]
    ReceiptTimeout { tx_hash: String },

    /// Raised when ABI return data is shorter than expected.
    #[error("malformed contract return data: {message}")]
    AbiDecode { message: String },

    /// Wrapper for ECDSA failures.
    #[error("signing failed: {0}")]
    Signing(#[from] k256::ecdsa::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for JSON errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for hex decoding errors.
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),
}
