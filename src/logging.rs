use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Install the stdout subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_ansi(ansi_enabled(
            std::io::stdout().is_terminal(),
            std::env::var_os("NO_COLOR").is_some(),
        ))
        .with_filter(filter);

    tracing_subscriber::registry().with(stdout_layer).try_init()?;

    Ok(())
}

/// Colour only when stdout is a terminal and `NO_COLOR` is unset
fn ansi_enabled(is_terminal: bool, no_color: bool) -> bool {
    is_terminal && !no_color
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_level() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(init_logging("proxy_check=verbose").is_err());
        }
    }

    #[test]
    fn test_ansi_only_on_terminal() {
        assert!(ansi_enabled(true, false));
        assert!(!ansi_enabled(false, false));
        assert!(!ansi_enabled(true, true));
        assert!(!ansi_enabled(false, true));
    }
}
