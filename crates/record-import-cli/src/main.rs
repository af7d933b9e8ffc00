use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use record_import_cli::cli::Cli;
use record_import_cli::output::Output;
use record_import_cli::{commands, config};
use record_import_client::{ApiError, RecordImportClientFactory};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries command output
    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .target(env_logger::Target::Stderr)
        .init();

    let file_settings = config::load_file_settings(cli.connection.config.as_deref()).await?;
    let client_config = config::resolve(file_settings, &cli.connection)?;
    log::debug!("Using record import API at {}", client_config.api_url);

    let client = RecordImportClientFactory::create_http_client(&client_config)?;
    let mut output = Output::stdout();

    match commands::run(cli.command, client.as_ref(), &mut output).await {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<ApiError>() {
            Some(api_error @ ApiError::Status { .. }) => {
                log::error!("{}", api_error);
                std::process::exit(1);
            }
            _ => Err(err),
        },
    }
}
