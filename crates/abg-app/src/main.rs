use anyhow::Result;
use clap::Parser;

pub mod app;
pub mod cli;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Convertir et écrire les sorties
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    app::run(&cli, &mut lock)?;
    Ok(())
}
