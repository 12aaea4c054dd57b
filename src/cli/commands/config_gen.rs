//! Generate config command

use std::path::Path;

use colored::Colorize;

use crate::cli::CliError;
use crate::config::AppConfig;

/// Generate example configuration file
///
/// 不指定输出路径时打印到 stdout。
pub async fn config_generate(output: Option<String>, force: bool) -> Result<(), CliError> {
    let Some(path) = output else {
        print!("{}", AppConfig::generate_sample_config());
        return Ok(());
    };

    if !force && Path::new(&path).exists() {
        return Err(CliError::CommandError(format!(
            "File already exists: {} (use --force to overwrite)",
            path
        )));
    }

    println!(
        "{} {}",
        "Generating configuration file...".yellow(),
        path.blue()
    );

    AppConfig::default().save_to_file(&path).map_err(|e| {
        CliError::CommandError(format!("Unable to write configuration file: {}", e))
    })?;

    println!(
        "  {} {}",
        "Configuration file generated successfully".green(),
        path.blue()
    );
    Ok(())
}
