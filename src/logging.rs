use std::error::Error;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Where log output goes. The chat UI owns the terminal, so it never logs to
/// stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    Discard,
}

impl LogTarget {
    pub fn for_terminal_ui(log_file: Option<PathBuf>) -> Self {
        log_file.map_or(LogTarget::Discard, LogTarget::File)
    }
}

/// Installs the global subscriber. The filter comes from `RUST_LOG` and
/// defaults to `info`.
pub fn init(target: LogTarget) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match target {
        LogTarget::Discard => Ok(()),
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(filter)
                .try_init()?;
            Ok(())
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_line_number(true),
                )
                .with(filter)
                .try_init()?;
            tracing::debug!(path = %path.display(), "File logging initialized");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_ui_logs_to_file_only_when_asked() {
        assert_eq!(LogTarget::for_terminal_ui(None), LogTarget::Discard);
        assert_eq!(
            LogTarget::for_terminal_ui(Some(PathBuf::from("portfolio.log"))),
            LogTarget::File(PathBuf::from("portfolio.log"))
        );
    }
}
