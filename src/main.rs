use anyhow::Result;
use clap::Parser;
use ghdash::cli::Cli;

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    cli.execute()
}
