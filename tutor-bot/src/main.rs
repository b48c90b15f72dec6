//! English tutor bot binary. Takes no arguments; configuration comes from the environment.

use anyhow::Result;
use tutor_bot::{run_bot, BotConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = BotConfig::load()?;
    run_bot(config).await
}
