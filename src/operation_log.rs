use anyhow::Result;
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Log file name
const OPERATION_LOG_FILE: &str = "operation_log.txt";

/// Get the directory where app data is stored (same as settings)
fn app_data_dir() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        let app_dir = config_dir.join("tokengate");
        if !app_dir.exists() {
            let _ = fs::create_dir_all(&app_dir);
        }
        app_dir
    } else {
        // Fall back to current directory
        PathBuf::from(".")
    }
}

fn log_path() -> PathBuf {
    app_data_dir().join(OPERATION_LOG_FILE)
}

/// Get the full path to the operation log file as a string for display
pub fn log_file_path() -> String {
    log_path().display().to_string()
}

/// Append a structured log entry describing a submitted operation.
pub fn append_log(operation: &str, chain_id: u64, details: impl AsRef<str>) -> Result<()> {
    append_to(&log_path(), operation, chain_id, details)
}

fn append_to(path: &Path, operation: &str, chain_id: u64, details: impl AsRef<str>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let timestamp = Utc::now().to_rfc3339();
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    writeln!(
        file,
        "[{}] chain_id={} operation={}",
        timestamp, chain_id, operation
    )?;

    let body = details.as_ref();
    if body.trim().is_empty() {
        writeln!(file, "  (no additional details)")?;
    } else {
        for line in body.lines() {
            if line.trim().is_empty() {
                writeln!(file)?;
            } else {
                writeln!(file, "  {}", line)?;
            }
        }
    }

    writeln!(file)?;
    Ok(())
}

/// Read the entire log file content
pub fn read_log() -> Result<String> {
    read_from(&log_path())
}

fn read_from(path: &Path) -> Result<String> {
    if path.exists() {
        Ok(fs::read_to_string(path)?)
    } else {
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log(name: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("tokengate_log_test_{}_{}", std::process::id(), name));
        let _ = fs::remove_file(&path);
        path
    }

    // ==================== append / read tests ====================

    #[test]
    fn test_append_then_read_contains_entries() {
        let path = temp_log("roundtrip");
        append_to(&path, "mint", 11155111, "amount=3").unwrap();
        append_to(&path, "claim", 11155111, "").unwrap();

        let content = read_from(&path).unwrap();
        assert!(content.contains("operation=mint"));
        assert!(content.contains("  amount=3"));
        assert!(content.contains("operation=claim"));
        assert!(content.contains("(no additional details)"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let path = temp_log("missing");
        assert_eq!(read_from(&path).unwrap(), "");
    }

    #[test]
    fn test_append_preserves_order() {
        let path = temp_log("order");
        append_to(&path, "first", 1, "").unwrap();
        append_to(&path, "second", 1, "").unwrap();

        let content = read_from(&path).unwrap();
        let first = content.find("operation=first").unwrap();
        let second = content.find("operation=second").unwrap();
        assert!(first < second);

        let _ = fs::remove_file(&path);
    }
}
