use anyhow::Result;
use nrw_cli::{Cli, Parser};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.connection.init_tracing();
    cli.run().await
}
