//! acton-render CLI tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::net::SocketAddr;
use std::path::PathBuf;

use acton_render_cli_lib::{CheckCommand, ServeCommand};
use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "acton-render")]
#[command(version)]
#[command(about = "Check and preview acton-render templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a template directory and report errors
    Check {
        /// Template directory
        #[arg(long, default_value = "./templates")]
        dir: PathBuf,
    },
    /// Serve a template directory for previewing
    Serve {
        /// Template directory (overrides `templates.template_dir`)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
        /// Parse templates once at startup instead of on every request
        #[arg(long)]
        no_reload: bool,
        /// Configuration file
        #[arg(long, default_value = "./config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { dir } => {
            CheckCommand::new(dir).execute()?;
        }
        Commands::Serve {
            dir,
            addr,
            no_reload,
            config,
        } => {
            let cmd = ServeCommand {
                dir,
                addr,
                no_reload,
                config,
            };
            cmd.execute().await?;
        }
    }

    Ok(())
}
