use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use skillink_core::config;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod onboard;
mod skills;

#[derive(Parser)]
#[command(name = "skillink")]
#[command(about = "skillink - Share skill bundles across projects via symlinks", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write ~/.skillink/config.toml interactively
    Init,
    #[command(flatten)]
    Skills(skills::SkillsCommands),
}

fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Init => {
            let onboard_config = onboard::run_onboard()?;
            config::save_config(&onboard_config)?;
            println!(
                "{} Config written to {}",
                style("✓").green().bold(),
                config::get_config_path().display()
            );
            Ok(())
        }
        Commands::Skills(command) => {
            let config = config::Config::load_or_init()?;
            skills::handle_command(command, &config)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", style("✗").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
