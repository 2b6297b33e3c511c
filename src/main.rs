use clap::Parser;
use codeloom::server::Cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("codeloom=info")))
        .init();

    let cli = Cli::parse();
    codeloom::server::run(cli).await
}
