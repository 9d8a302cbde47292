use tracing::debug;

use crate::bot_id::BotId;
use crate::error::Result;

/// `generate-id` takes no options.
#[derive(Debug, Clone, Default)]
pub struct Params {}

/// Produce a fresh random bot ID.
pub fn run(_params: &Params) -> Result<BotId> {
    let id = BotId::generate();
    debug!(bot_id = %id, "generated bot ID");
    Ok(id)
}
