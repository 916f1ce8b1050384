use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `wortschatz=debug`.
pub const LOG_ENV: &str = "WORTSCHATZ_LOG";

const DEFAULT_FILTER: &str = "info";

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber, appending to `path`.
///
/// The terminal belongs to the UI, so logs never go to stdout or stderr.
pub fn init(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_events_to_the_log_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("wortschatz.log");

        init(&path).unwrap();
        tracing::info!(words = 3, "session started");

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("session started"));
        assert!(contents.contains("words=3"));

        // A second subscriber cannot be installed.
        assert!(init(&path).is_err());
    }
}
