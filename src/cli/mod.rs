pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "arkivctl")]
#[command(about = "Arkiv CLI - administration tasks for the archive backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Seed baseline groups, users and settings (idempotent)")]
    Seed {
        #[arg(long, help = "Apply pending migrations before seeding")]
        migrate: bool,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Migrate => commands::migrate::handle().await,
        Commands::Seed { migrate } => commands::seed::handle(migrate).await,
    }
}
