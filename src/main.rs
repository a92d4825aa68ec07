use clap::Parser;
use propedge::cli::output::OutputMode;
use propedge::cli::{commands, Cli};
use propedge::config::{AppConfig, LoggingConfig};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, load_error) = match AppConfig::load_from(&cli.config) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_logging(&config.logging);

    if let Some(e) = load_error {
        warn!("Failed to load config from {}: {}, using defaults", cli.config.display(), e);
    }
    if let Err(e) = config.validate() {
        // sizing degrades to zero stakes and counts are clamped
        warn!("{e}");
    }

    commands::run(cli.command, &config, OutputMode::from_json_flag(cli.json))
}

fn init_logging(logging: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},propedge=debug", logging.level))
    });

    // File logging only when PROPEDGE_LOG_DIR is set
    let file_layer = std::env::var("PROPEDGE_LOG_DIR").ok().and_then(|log_dir| {
        // `tracing_appender::rolling::daily` panics if it can't create the initial log file
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            eprintln!(
                "Warning: Could not create log directory {} ({}), file logging disabled",
                log_dir, e
            );
            return None;
        }
        let test_path = std::path::Path::new(&log_dir).join(".propedge_write_test");
        if let Err(e) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&test_path)
        {
            eprintln!(
                "Warning: Could not write to log directory {} ({}), file logging disabled",
                log_dir, e
            );
            return None;
        }
        let _ = std::fs::remove_file(&test_path);

        let file_appender = tracing_appender::rolling::daily(&log_dir, "propedge.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // flushed on process exit
        Box::leak(Box::new(guard));

        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
    });

    // Console logs on stderr; stdout carries command output
    let (console_text, console_json) = if logging.json {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            ),
        )
    } else {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            ),
            None,
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_text)
        .with(console_json)
        .with(file_layer)
        .init();
}
