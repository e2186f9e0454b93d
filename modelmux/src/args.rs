use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// modelmux tag router
#[derive(Debug, Parser)]
#[command(name = "modelmux", about = "Route chat requests to local or hosted LLMs by tag")]
pub struct Args {
    /// Path to configuration file; environment defaults apply when omitted
    #[arg(short, long, global = true, env = "MODELMUX_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        /// Override the listen address
        #[arg(long, env = "MODELMUX_LISTEN")]
        listen: Option<SocketAddr>,
    },
    /// Send one prompt and print the reply
    Ask {
        prompt: String,

        /// Routing tag; repeat for several (e.g. `--tag code --tag alt`)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Optional system instruction
        #[arg(long)]
        system: Option<String>,
    },
}
