use chrono::Local;
use eyre::Result;
use fern::Dispatch;
use log::LevelFilter;

/// Sets up the application logger with console output.
///
/// The level is taken from `RUST_LOG` (`error`, `warn`, `info`, `debug`, `trace`)
/// and defaults to `Info`. Noisy transport crates are capped at `Warn`.
///
/// # Errors
/// * If a global logger is already installed
pub fn setup_logger() -> Result<()> {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info);

    Dispatch::new()
        .level(level)
        .level_for("hyper", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .level_for("alloy_transport_http", LevelFilter::Warn)
        .chain(std::io::stdout())
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ));
        })
        .apply()?;
    Ok(())
}
