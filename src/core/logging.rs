//! Logging initialization
//!
//! Console and file output through `simplelog`; all modules log through the
//! `log` facade.

use anyhow::Result;
use simplelog::*;
use std::fs::OpenOptions;

/// Initialize logger for both console and file output
///
/// The log file is opened in append mode so restarts keep history.
///
/// # Arguments
/// * `log_file_path` - Path to the log file
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file: {}", e))?;

    let config = ConfigBuilder::new()
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("reqwest")
        .build();

    CombinedLogger::init(vec![
        TermLogger::new(LevelFilter::Info, config.clone(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(LevelFilter::Debug, config, log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn test_init_logger_creates_log_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lexibot.log");

        // A second init in the same process fails, but the file is still created.
        let _ = init_logger(path.to_str().unwrap());

        assert!(path.exists());
    }

    #[test]
    fn test_init_logger_rejects_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("lexibot.log");

        assert!(init_logger(path.to_str().unwrap()).is_err());
    }
}
