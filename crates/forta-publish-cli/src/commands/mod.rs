// Subcommand handlers.
//
// Each module turns parsed flags into the library's `Params`, runs the
// library handler and prints the result to stdout. `dispatch` is the single
// entry point used by main.rs.

pub mod enable;
pub mod generate_id;
pub mod init;
pub mod publish;
pub mod publish_metadata;
pub mod transfer;

use anyhow::Result;

use crate::cli::Command;

/// Run the handler for `command`.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Init { key } => init::handle_init(&key),
        Command::PublishMetadata {
            network,
            key,
            manifest,
            image,
            doc_file,
            ipfs_gateway,
            bot_id,
        } => publish_metadata::handle_publish_metadata(
            &network,
            &key,
            publish_metadata::MetadataArgs {
                manifest,
                image,
                doc_file,
                ipfs_gateway,
                bot_id,
            },
        ),
        Command::Publish {
            network,
            key,
            manifest,
            ipfs_gateway,
            gas_price,
        } => publish::handle_publish(&network, &key, manifest, ipfs_gateway, gas_price),
        Command::Enable {
            network,
            key,
            bot_id,
        } => enable::handle_set_enabled(&network, &key, bot_id, true),
        Command::Disable { network, key } => {
            enable::handle_set_enabled(&network, &key, String::new(), false)
        }
        Command::Transfer { network, key, to } => transfer::handle_transfer(&network, &key, to),
        Command::GenerateId => generate_id::handle_generate_id(),
    }
}
