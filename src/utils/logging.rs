//! Diagnostic logging setup.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "PARLEY_LOG";
const DEFAULT_DIRECTIVE: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. Events go to `log_file` (appended) when
/// given, otherwise to stderr. Calling this twice is harmless.
pub fn init_tracing(log_file: Option<&Path>) -> io::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());
    let result = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(io::stderr).try_init(),
    };
    if let Err(err) = result {
        tracing::debug!(%err, "tracing subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn log_file_is_created() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("parley.log");
        init_tracing(Some(&path)).expect("init");
        assert!(path.exists());
    }

    #[test]
    fn unreadable_log_path_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("missing").join("parley.log");
        assert!(init_tracing(Some(&path)).is_err());
    }
}
