use clap::{Parser, Subcommand};
use pomotick_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pomotick", version, about = "Pomotick Pomodoro timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive timer
    Run(commands::run::RunArgs),
    /// Timer settings (durations, sound, auto-start)
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Runtime configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print the saved timer state as JSON
    Status,
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("warning: {e}; using default configuration");
            AppConfig::default()
        }
    };
    init_tracing(&config);

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Run(args) => commands::run::run(args, &config),
        Commands::Settings { action } => commands::settings::run(action, &config),
        Commands::Config { action } => commands::config::run(action, &config).map_err(Into::into),
        Commands::Status => commands::status::run(&config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
