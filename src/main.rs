use std::process;
use std::sync::Arc;

use tracing::{error, info};

use kvlinker::config::AppConfig;
use kvlinker::errors::KvLinkError;
use kvlinker::runtime::run_server;
use kvlinker::storage::StorageFactory;
use kvlinker::system::init_logging;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use kvlinker::cli::commands::{config_generate, password_clear, password_set, password_show};
#[cfg(feature = "cli")]
use kvlinker::cli::{Cli, CliError, Commands, ConfigCommands, PasswordCommands};

#[cfg(feature = "cli")]
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&cli.config).await,
        Commands::Config {
            action: ConfigCommands::Generate { output, force },
        } => exit_on_cli_error(config_generate(output, force).await),
        Commands::Password { action } => {
            let result = run_password_command(&cli.config, action).await;
            exit_on_cli_error(result)
        }
    }
}

/// 无 CLI 时只提供服务模式，配置路径取自 KVL_CONFIG_PATH
#[cfg(not(feature = "cli"))]
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config_path =
        std::env::var("KVL_CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    serve(&config_path).await
}

async fn serve(config_path: &str) -> anyhow::Result<()> {
    let config = match AppConfig::load(config_path) {
        Ok(config) => Arc::new(config),
        Err(e) => exit_on_startup_error(e),
    };

    // Guard 必须存活到进程结束
    let _log_guard = init_logging(&config.logging)?;
    info!("Configuration loaded from {}", config_path);

    let store = StorageFactory::create(&config.storage).await.map_err(|e| {
        error!("Storage initialization failed: {}", e);
        e
    })?;

    run_server(config, store).await
}

#[cfg(feature = "cli")]
fn exit_on_startup_error(err: KvLinkError) -> ! {
    eprintln!("{}", err.format_colored());
    process::exit(1);
}

#[cfg(not(feature = "cli"))]
fn exit_on_startup_error(err: KvLinkError) -> ! {
    eprintln!("{}", err.format_simple());
    process::exit(1);
}

#[cfg(feature = "cli")]
async fn run_password_command(
    config_path: &str,
    action: PasswordCommands,
) -> Result<(), CliError> {
    let config = AppConfig::load(config_path)?;
    let store = StorageFactory::create(&config.storage).await?;

    match action {
        PasswordCommands::Set { value, stdin } => {
            password_set(store.as_ref(), &config.keys, value, stdin).await
        }
        PasswordCommands::Clear => password_clear(store.as_ref(), &config.keys).await,
        PasswordCommands::Show => password_show(store.as_ref(), &config.keys).await,
    }
}

#[cfg(feature = "cli")]
fn exit_on_cli_error(result: Result<(), CliError>) -> anyhow::Result<()> {
    if let Err(e) = result {
        eprintln!("{}", e.format_colored());
        process::exit(1);
    }
    Ok(())
}
