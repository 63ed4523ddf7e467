use anyhow::Result;
use sezamo::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::start()?.execute().await
}
