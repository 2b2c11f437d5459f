use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Console logging plus, when `DRAWDESK_LOG_DIR` names a writable directory,
/// a daily-rotated file. `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},drawdesk=debug", config.level)));

    // `tracing_appender::rolling::daily` panics if it cannot create the initial
    // file, so writability is checked first.
    let file_layer = std::env::var("DRAWDESK_LOG_DIR").ok().and_then(|log_dir| {
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            eprintln!("Warning: Could not create log directory {log_dir} ({e}), file logging disabled");
            return None;
        }
        let test_path = std::path::Path::new(&log_dir).join(".drawdesk_write_test");
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&test_path)
        {
            Ok(_) => {
                let _ = std::fs::remove_file(&test_path);

                let file_appender = tracing_appender::rolling::daily(&log_dir, "drawdesk.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

                // The guard flushes on drop; keep it for the life of the process.
                Box::leak(Box::new(guard));

                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true),
                )
            }
            Err(e) => {
                eprintln!(
                    "Warning: Could not write to log directory {log_dir} ({e}), file logging disabled"
                );
                None
            }
        }
    });

    let console_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed()
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
