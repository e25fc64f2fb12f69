pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::abilities::Role;

#[derive(Parser)]
#[command(name = "franchise")]
#[command(about = "Franchise CLI - log in, inspect ability rules and navigation")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Server base URL (defaults to FRANCHISE_SERVER_URL or the last server used)")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and cached ability rules")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Show the navigation menu allowed by the cached rules")]
    Nav,

    #[command(about = "Show the ability rules granted to a role")]
    Abilities {
        #[arg(help = "admin, franchisor, franchisee, sales or broker")]
        role: Role,
    },

    #[command(about = "Password utilities")]
    Password {
        #[command(subcommand)]
        cmd: commands::password::PasswordCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Auth { cmd } => {
            let server_url = config::resolve_server_url(cli.server.as_deref())?;
            commands::auth::handle(cmd, server_url, output_format).await
        }
        Commands::Nav => commands::nav::handle(output_format).await,
        Commands::Abilities { role } => commands::abilities::handle(role, output_format).await,
        Commands::Password { cmd } => commands::password::handle(cmd, output_format).await,
    }
}
