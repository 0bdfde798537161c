//! Node-RED wrapper CLI library

pub mod connection;
pub mod flow;

// Re-export CLI types for testing
pub use clap::{Parser, Subcommand};

use anyhow::Result;

#[derive(Parser)]
#[command(name = "nrw")]
#[command(about = "Deploy, run and inspect Node-RED flows")]
#[command(version, author, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: connection::ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that Node-RED is reachable and healthy
    Health,
    /// Deploy a flow from a JSON file, or the built-in example flow
    Deploy(flow::DeployArgs),
    /// Execute a deployed flow
    Execute(flow::ExecuteArgs),
    /// Show a deployed flow
    Get(flow::FlowIdArgs),
    /// Delete a deployed flow
    Delete(flow::FlowIdArgs),
    /// Obtain an access token with admin credentials
    Auth(flow::AuthArgs),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let wrapper = self.connection.wrapper()?;

        match self.command {
            Commands::Health => flow::health(&wrapper).await,
            Commands::Deploy(args) => args.run(&wrapper).await,
            Commands::Execute(args) => args.run(&wrapper).await,
            Commands::Get(args) => args.get(&wrapper).await,
            Commands::Delete(args) => args.delete(&wrapper).await,
            Commands::Auth(args) => args.run(&wrapper).await,
        }
    }
}
