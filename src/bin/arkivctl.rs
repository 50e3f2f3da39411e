use clap::Parser;

use arkiv_api::cli::{run, Cli};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("arkivctl: {:#}", e);
        std::process::exit(1);
    }
}
