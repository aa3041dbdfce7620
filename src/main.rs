use clap::Parser;
use slidekit::cli::Cli;
use slidekit::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json)?;
    cli.run().await
}
