//! Frontdesk console - operator CLI for the library and hotel back ends

use std::io;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use frontdesk_console::{
    cli::{Cli, Console},
    config::{AppConfig, LoggingConfig},
    services::Services,
    shell::AppShell,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_tracing(&config.logging, cli.verbose);

    tracing::debug!(
        library = %config.library.base_url,
        hotel = %config.hotel.base_url,
        "Starting Frontdesk console v{}",
        env!("CARGO_PKG_VERSION")
    );

    let services = Services::from_config(&config)?;
    let mut console = Console::new(AppShell::new(services, config.lists.page_size));

    let stdout = io::stdout();
    let stdin = io::stdin();
    console
        .run(cli.command, &mut stdout.lock(), &mut stdin.lock(), chrono::Utc::now())
        .await
}

/// Install the global subscriber. Logs go to stderr so command output stays clean.
fn init_tracing(logging: &LoggingConfig, verbose: bool) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("frontdesk_console={}", level).into());

    let (file_layer, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "frontdesk-console.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    let json = logging.format.eq_ignore_ascii_case("json");
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(io::stderr)))
        .with(file_layer)
        .init();

    guard
}
