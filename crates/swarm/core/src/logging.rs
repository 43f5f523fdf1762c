//! Tracing setup and the debug printer used while streaming.

use crate::config::LoggingConfig;
use std::fmt::Display;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Install a global tracing subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
/// Fails when a global subscriber is already installed.
pub fn init_tracing(cfg: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));
    let registry = tracing_subscriber::registry().with(env_filter);

    if cfg.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}

/// Emit `message` stamped with local wall-clock time.
///
/// Does nothing unless `debug` is set. The event is logged at info level so
/// that the default `"info"` filter lets it through.
pub fn debug_print(debug: bool, message: impl Display) {
    if !debug {
        return;
    }
    let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
    tracing::info!(%timestamp, "{message}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// In-memory writer shared with a fmt layer.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` under a subscriber filtered by the default logging config.
    fn capture_with_default_level(f: impl FnOnce()) -> String {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(&LoggingConfig::default().level))
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(move || writer.clone()),
            );
        tracing::subscriber::with_default(subscriber, f);
        out.text()
    }

    #[test]
    fn timestamp_format_is_second_resolution() {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(7, 5, 1))
            .unwrap();
        assert_eq!(ts.format(TIMESTAMP_FORMAT).to_string(), "2024-03-09 07:05:01");
    }

    #[test]
    fn debug_print_is_silent_when_disabled() {
        let out = capture_with_default_level(|| debug_print(false, "hidden delta"));
        assert!(out.is_empty(), "unexpected output: {out}");
    }

    #[test]
    fn debug_print_passes_default_filter_with_timestamp() {
        let out = capture_with_default_level(|| {
            debug_print(true, format_args!("Received completion delta: {}", "hi"));
        });
        assert!(out.contains("Received completion delta: hi"), "got: {out}");

        let stamp = out
            .split("timestamp=")
            .nth(1)
            .and_then(|rest| rest.get(..19))
            .unwrap_or_else(|| panic!("no timestamp field in: {out}"));
        assert!(NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok(), "bad stamp {stamp}");
    }

    #[test]
    fn second_init_fails() {
        let cfg = LoggingConfig::default();
        let _ = init_tracing(&cfg);
        assert!(init_tracing(&cfg).is_err());
    }
}
