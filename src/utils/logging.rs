use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::Utc;

/// Append-only transcript logging for the `/log` command and `--log` flag.
///
/// Messages are written as they complete, one blank line between entries,
/// matching the spacing of the on-screen transcript. Logging can be paused
/// and resumed without losing the configured file.
pub struct LoggingState {
    file_path: Option<String>,
    is_active: bool,
}

impl LoggingState {
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut logging = LoggingState {
            file_path: log_file,
            is_active: false,
        };

        // A file given up front (via the CLI) enables logging immediately.
        if let Some(path) = logging.file_path.clone() {
            logging.test_file_access(&path)?;
            logging.is_active = true;
        }

        Ok(logging)
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn std::error::Error>> {
        self.test_file_access(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;
        self.log_session_start()?;

        Ok(format!("Logging enabled to: {}", path))
    }

    pub fn toggle_logging(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        match &self.file_path {
            Some(path) => {
                self.is_active = !self.is_active;
                if self.is_active {
                    Ok(format!("Logging resumed to: {}", path))
                } else {
                    Ok(format!("Logging paused (file: {})", path))
                }
            }
            None => {
                Err("No log file specified. Use /log <filename> to enable logging first.".into())
            }
        }
    }

    /// Stamp the log with the session start time.
    pub fn log_session_start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let timestamp = Utc::now().to_rfc3339();
        self.log_message(&format!("## Logging started at {}", timestamp))
    }

    pub fn log_message(&self, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = self.file_path.as_ref().filter(|_| self.is_active) else {
            return Ok(());
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;

        // Write each line of content, preserving the exact formatting
        for line in content.lines() {
            writeln!(file, "{}", line)?;
        }

        // Blank line between entries, matching the screen display
        writeln!(file)?;

        file.flush()?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn get_status_string(&self) -> String {
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!(
                "active ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
            (Some(path), false) => format!(
                "paused ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
        }
    }

    fn test_file_access(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        // Open in append mode so pointing at an existing log never truncates it.
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log_path(name: &str) -> std::path::PathBuf {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join(name);
        // Leak the dir so the file outlives the handle for the test body.
        std::mem::forget(dir);
        path
    }

    #[test]
    fn starts_inactive_without_a_file() {
        let logging = LoggingState::new(None).unwrap();
        assert!(!logging.is_active());
        assert_eq!(logging.get_status_string(), "disabled");
        // Logging without a file is a quiet no-op.
        logging.log_message("hello").unwrap();
    }

    #[test]
    fn toggle_without_a_file_is_an_error() {
        let mut logging = LoggingState::new(None).unwrap();
        assert!(logging.toggle_logging().is_err());
    }

    #[test]
    fn set_log_file_enables_and_stamps_the_session() {
        let path = temp_log_path("chat.md");
        let mut logging = LoggingState::new(None).unwrap();
        let status = logging
            .set_log_file(path.to_string_lossy().into_owned())
            .unwrap();
        assert!(status.starts_with("Logging enabled to:"));
        assert!(logging.is_active());

        logging.log_message("You: hi").unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("## Logging started at "));
        assert!(contents.contains("You: hi\n\n"));
    }

    #[test]
    fn toggle_pauses_and_resumes_writes() {
        let path = temp_log_path("chat.md");
        let mut logging = LoggingState::new(Some(path.to_string_lossy().into_owned())).unwrap();
        assert!(logging.is_active());

        let paused = logging.toggle_logging().unwrap();
        assert!(paused.starts_with("Logging paused"));
        logging.log_message("dropped while paused").unwrap();

        let resumed = logging.toggle_logging().unwrap();
        assert!(resumed.starts_with("Logging resumed"));
        logging.log_message("kept").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("dropped while paused"));
        assert!(contents.contains("kept"));
        assert!(logging.get_status_string().starts_with("active"));
    }
}
