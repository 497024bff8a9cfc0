use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_DIR: &str = "logs";
const LOG_NAME: &str = "cabinetry-backend";

/// Owns the appender guards; dropping it flushes and stops the file writers.
pub struct Logger {
    pub guards: Vec<WorkerGuard>,
}

impl Logger {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let guards = Self::setup_logging()?;
        Ok(Logger { guards })
    }

    pub fn setup_logging() -> Result<Vec<WorkerGuard>, Box<dyn std::error::Error>> {
        std::fs::create_dir_all(LOG_DIR)?;

        let console_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,cabinetry_backend=debug"));
        let file_log_level = std::env::var("FILE_LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());
        let error_file_log_level =
            std::env::var("ERROR_FILE_LOG_LEVEL").unwrap_or_else(|_| "error".to_string());

        let (general, general_guard) =
            non_blocking(rolling::daily(LOG_DIR, format!("{}.log", LOG_NAME)));
        let (errors, error_guard) =
            non_blocking(rolling::daily(format!("{}/error", LOG_DIR), format!("{}-error.log", LOG_NAME)));
        let (general_json, json_guard) =
            non_blocking(rolling::daily(format!("{}/json", LOG_DIR), format!("{}.json", LOG_NAME)));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_ansi(true)
                    .with_filter(console_filter),
            )
            .with(
                fmt::layer()
                    .with_writer(general)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&file_log_level)),
            )
            .with(
                fmt::layer()
                    .with_writer(errors)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&error_file_log_level)),
            )
            .with(
                fmt::layer()
                    .json()
                    .with_writer(general_json)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_filter(EnvFilter::new(&file_log_level)),
            )
            .try_init()?;

        Ok(vec![general_guard, error_guard, json_guard])
    }
}
